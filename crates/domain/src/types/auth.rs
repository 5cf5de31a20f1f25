//! Session credential types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque credential returned by the roster API login.
///
/// `Debug` is redacted so tokens never end up in log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<redacted {} chars>)", self.0.len())
    }
}

/// Outcome of a registration request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Registration {
    Created,
    AlreadyExists,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_token() {
        let token = AccessToken::new("super-secret");
        let rendered = format!("{:?}", token);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("12 chars"));
    }
}
