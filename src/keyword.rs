//! Closed string-keyword enums shared by the theme and layout preferences.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}` (expected one of: {expected})")]
pub struct ParseKeywordError {
    pub(crate) kind: &'static str,
    pub(crate) value: String,
    pub(crate) expected: String,
}

/// Declares a closed keyword enum with its wire names, `FromStr`, and `Display`.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $keyword:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $keyword)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $keyword,)+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::keyword::ParseKeywordError;

            fn from_str(value: &str) -> ::std::result::Result<Self, Self::Err> {
                let trimmed = value.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| $crate::keyword::ParseKeywordError {
                        kind: $kind,
                        value: value.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|candidate| candidate.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use keyword_enum;
