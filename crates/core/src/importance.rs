//! Severity levels used throughout the diagnostic tree and report filtering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Importance {
    Debug,
    Info,
    Warn,
    Error,
    Critical,
}

impl Importance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Importance::Debug => "DEBUG",
            Importance::Info => "INFO",
            Importance::Warn => "WARN",
            Importance::Error => "ERROR",
            Importance::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for Importance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_by_severity() {
        assert!(Importance::Debug < Importance::Info);
        assert!(Importance::Info < Importance::Warn);
        assert!(Importance::Warn < Importance::Error);
        assert!(Importance::Error < Importance::Critical);
    }

    #[test]
    fn serializes_as_uppercase_tag() {
        let json = serde_json::to_string(&Importance::Warn).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(json, "\"WARN\"");
    }
}
