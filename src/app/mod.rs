mod bootstrap;

pub use bootstrap::{bootstrap, bootstrap_in, load_custom_palette};
