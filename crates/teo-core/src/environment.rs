//! Host identity recorded by an app builder
//!
//! The identity is diagnostic metadata only; nothing in the build or run
//! path depends on it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host language that created the builder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Go,
    Java,
    Rust,
    /// Any other identifier, kept verbatim
    Other(String),
}

impl Language {
    /// Parse a language identifier; never fails
    pub fn parse(id: &str) -> Self {
        match id.trim() {
            "C" | "c" => Language::C,
            "Go" | "go" | "golang" => Language::Go,
            "Java" | "java" => Language::Java,
            "Rust" | "rust" => Language::Rust,
            other => Language::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::C => write!(f, "C"),
            Language::Go => write!(f, "Go"),
            Language::Java => write!(f, "Java"),
            Language::Rust => write!(f, "Rust"),
            Language::Other(id) => write!(f, "{}", id),
        }
    }
}

/// Language and version of the embedding host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub language: Language,
    pub version: String,
}

impl Environment {
    pub fn new(lang_id: &str, lang_version: &str) -> Self {
        Self {
            language: Language::parse(lang_id),
            version: lang_version.to_string(),
        }
    }

    /// Identity of a native Rust host
    pub fn rust() -> Self {
        Self {
            language: Language::Rust,
            version: crate::VERSION.to_string(),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.language, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(Language::parse("C"), Language::C);
        assert_eq!(Language::parse("Go"), Language::Go);
        assert_eq!(Language::parse("java"), Language::Java);
    }

    #[test]
    fn test_unknown_language_is_kept() {
        let env = Environment::new("Zig", "0.13");
        assert_eq!(env.language, Language::Other("Zig".to_string()));
        assert_eq!(env.to_string(), "Zig 0.13");
    }

    #[test]
    fn test_display() {
        let env = Environment::new("C", "Apple clang 14.0.0");
        assert_eq!(env.to_string(), "C Apple clang 14.0.0");
    }
}
