//! Macro for implementing Display and FromStr for option enums
//!
//! Configuration enums are parsed from environment variables and CLI flags
//! and rendered back into log fields. The macro keeps both directions in one
//! mapping with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use rostersync_domain::impl_option_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Mode {
//!     Fast,
//!     Safe,
//! }
//!
//! impl_option_conversions!(Mode {
//!     Fast => "fast",
//!     Safe => "safe",
//! });
//!
//! assert_eq!("SAFE".parse::<Mode>().unwrap(), Mode::Safe);
//! ```

/// Implements Display and FromStr traits for option enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
///
/// Hyphens in the input are accepted in place of underscores, so
/// `dedupe-by-id` and `dedupe_by_id` parse the same.
#[macro_export]
macro_rules! impl_option_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl ::std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl ::std::str::FromStr for $enum_name {
            type Err = ::std::string::String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().replace('-', "_").as_str() {
                    $($str => ::std::result::Result::Ok(Self::$variant),)+
                    _ => ::std::result::Result::Err(::std::format!(
                        "Invalid {}: {}",
                        stringify!($enum_name),
                        s
                    )),
                }
            }
        }
    };
}
