use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

use dashtint::app::{bootstrap, bootstrap_in, load_custom_palette};
use dashtint::color::to_perceptual;
use dashtint::context;
use dashtint::dom::StyleDocument;
use dashtint::layout::{
    HeaderOption, LayoutPreferences, SidebarCollapsible, SidebarSide, SidebarVariant,
};
use dashtint::palette::{synthesize, Role, RoleMap};
use dashtint::theme::{Font, ManualColorScheme, ThemeMode};

#[derive(Parser, Debug)]
#[command(
    name = "dashtint",
    version,
    about = "Manage dashboard theme and layout preferences"
)]
struct Args {
    /// Directory holding config.json and preferences.json.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,

    /// Treat the OS color scheme as dark when resolving `system` mode.
    #[arg(long, global = true)]
    prefers_dark: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the current theme state.
    Show {
        /// Print the painted document as a CSS rule instead.
        #[arg(long)]
        css: bool,
    },
    /// Set the theme mode: light, dark, or system.
    Mode { mode: ThemeMode },
    /// Set the seed color (hex, rgb(), hsl(), oklch(), or oklab()).
    Seed { color: String },
    /// Set the corner radius in rem, clamped to [0, 1].
    Radius {
        #[arg(allow_negative_numbers = true)]
        value: f32,
    },
    /// Set the typeface: inter, manrope, or system.
    Font { font: Font },
    /// Manage a hand-authored palette that overrides the seed.
    Custom {
        #[command(subcommand)]
        action: CustomAction,
    },
    /// Print the palette synthesized from a color without saving anything.
    Palette {
        color: String,
        /// Also print each role as sRGB hex.
        #[arg(long)]
        hex: bool,
    },
    /// Show or change dashboard layout preferences.
    Layout {
        #[command(subcommand)]
        action: LayoutAction,
    },
}

#[derive(Subcommand, Debug)]
enum CustomAction {
    /// Load a palette JSON file and make it active.
    Import { file: PathBuf },
    /// Drop the custom palette and go back to the seed.
    Clear,
}

#[derive(Subcommand, Debug)]
enum LayoutAction {
    Show,
    Set {
        #[arg(long)]
        side: Option<SidebarSide>,
        #[arg(long)]
        variant: Option<SidebarVariant>,
        #[arg(long)]
        collapsible: Option<SidebarCollapsible>,
        #[arg(long, value_name = "BOOL")]
        breadcrumbs: Option<bool>,
    },
    /// Toggle a header option: sticky, showSearch, showThemeSwitch, showProfileMenu.
    Header {
        option: HeaderOption,
        #[arg(action = clap::ArgAction::Set)]
        enabled: bool,
    },
    /// Restore the default layout.
    Reset,
}

fn main() -> Result<()> {
    dashtint::logging::init();
    let Args {
        config_dir,
        prefers_dark,
        command,
    } = Args::parse();

    if let Command::Palette { color, hex } = &command {
        return print_palette(color, *hex);
    }

    let scheme = Rc::new(ManualColorScheme::new(prefers_dark));
    let document = Box::new(StyleDocument::new());
    let appearance = match &config_dir {
        Some(dir) => bootstrap_in(dir, scheme, document),
        None => bootstrap(scheme, document).context("failed to locate config directory")?,
    };
    context::install(appearance);

    let outcome = run(command);
    context::teardown();
    outcome
}

fn run(command: Command) -> Result<()> {
    let theme = context::theme();
    let layout = context::layout();
    match command {
        Command::Show { css } => {
            if css {
                print!("{}", theme.document().to_css());
            } else {
                print_theme();
            }
        }
        Command::Mode { mode } => theme.set_mode(mode).context("failed to save theme mode")?,
        Command::Seed { color } => {
            theme
                .set_seed_color(&color)
                .context("failed to save seed color")?;
            if !theme.current().seed.is_valid() {
                eprintln!("warning: `{color}` is not a recognized color; painting with the default seed");
            }
        }
        Command::Radius { value } => theme.set_radius(value).context("failed to save radius")?,
        Command::Font { font } => theme.set_font(font).context("failed to save font")?,
        Command::Custom { action } => match action {
            CustomAction::Import { file } => {
                let palette = load_custom_palette(&file)?;
                theme
                    .set_custom_palette(Some(palette))
                    .context("failed to save custom theme")?;
            }
            CustomAction::Clear => theme
                .set_custom_palette(None)
                .context("failed to clear custom theme")?,
        },
        Command::Layout { action } => match action {
            LayoutAction::Show => print_layout(),
            LayoutAction::Set {
                side,
                variant,
                collapsible,
                breadcrumbs,
            } => {
                let mut preferences = layout.current();
                if let Some(side) = side {
                    preferences.sidebar_side = side;
                }
                if let Some(variant) = variant {
                    preferences.sidebar_variant = variant;
                }
                if let Some(collapsible) = collapsible {
                    preferences.sidebar_collapsible = collapsible;
                }
                if let Some(show) = breadcrumbs {
                    preferences.show_breadcrumbs = show;
                }
                layout.save(preferences).context("failed to save layout")?;
            }
            LayoutAction::Header { option, enabled } => layout
                .set_header_option(option, enabled)
                .context("failed to save header option")?,
            LayoutAction::Reset => layout
                .save(LayoutPreferences::default())
                .context("failed to reset layout")?,
        },
        Command::Palette { color, hex } => print_palette(&color, hex)?,
    }
    Ok(())
}

fn print_theme() {
    let theme = context::theme();
    let state = theme.current();
    let seed = &state.seed;
    println!("mode:      {} (effective {})", state.mode, theme.effective_mode());
    println!(
        "seed:      {} -> {}{}",
        seed.original(),
        seed.perceptual().render(),
        if seed.is_valid() { "" } else { " (default)" }
    );
    println!("radius:    {}rem", state.radius);
    println!("font:      {}", state.font);
    println!(
        "palette:   {}",
        if state.custom_palette.is_some() {
            "custom"
        } else {
            "synthesized"
        }
    );
}

fn print_layout() {
    let preferences = context::layout().current();
    println!("sidebar:      {}", preferences.sidebar_side);
    println!("variant:      {}", preferences.sidebar_variant);
    println!("collapsible:  {}", preferences.sidebar_collapsible);
    println!("breadcrumbs:  {}", preferences.show_breadcrumbs);
    for option in HeaderOption::ALL {
        println!("{:<13} {}", format!("{option}:"), preferences.header.get(*option));
    }
}

fn print_palette(color: &str, hex: bool) -> Result<()> {
    let seed = to_perceptual(color).with_context(|| format!("cannot use `{color}` as a seed"))?;
    let palette = synthesize(seed);
    for (label, roles) in [("light", &palette.light), ("dark", &palette.dark)] {
        println!("[{label}]");
        print_roles(roles, hex)?;
    }
    Ok(())
}

fn print_roles(roles: &RoleMap, hex: bool) -> Result<()> {
    for role in Role::ALL {
        let value = roles.get(role);
        if hex {
            let rgb = to_perceptual(value)?.to_hex();
            println!("  {:<22} {value}  {rgb}", role.css_name());
        } else {
            println!("  {:<22} {value}", role.css_name());
        }
    }
    Ok(())
}
