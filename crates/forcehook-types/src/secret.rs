use std::fmt;

use serde::{Deserialize, Serialize};

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Use this for session tokens and OAuth credentials that pass through
/// domain types. The actual value is accessible via `.expose()`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() <= 4 {
            "****".to_string()
        } else {
            let tail: String = chars[chars.len() - 4..].iter().collect();
            format!("****{tail}")
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted_debug_hides_value() {
        let secret = Redacted::new("00Dxx0000001gPL!AQ4AQ");
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("AQ4AQ"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_redacted_display_hides_value() {
        let secret = Redacted::new("00Dxx0000001gPL!AQ4AQ");
        assert_eq!(secret.to_string(), "***");
    }

    #[test]
    fn test_redacted_masked() {
        assert_eq!(Redacted::new("sk-abc123xyz").masked(), "****3xyz");
        assert_eq!(Redacted::new("ab").masked(), "****");
    }
}
