//! Core data models used throughout algonote.
//!
//! These types represent the source file being analyzed, the note produced
//! from it, and the generation mode that decides how the note is built.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Language tag used when a file has no usable extension.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// One source file loaded into memory for a single run.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// File stem, used as a title fallback and for log context.
    pub name: String,
    /// Lower-cased file extension, or [`UNKNOWN_LANGUAGE`].
    pub language: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: normalize_language(&language.into()),
            text: text.into(),
        }
    }

    /// Build a unit from a path and its already-read contents.
    pub fn from_path(path: &Path, text: String) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self {
            name,
            language: language_from_path(path),
            text,
        }
    }
}

/// A worked example attached to a note.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub input: String,
    pub output: String,
    pub note: String,
}

impl Example {
    pub fn new(input: &str, output: &str, note: &str) -> Self {
        Self {
            input: input.to_string(),
            output: output.to_string(),
            note: note.to_string(),
        }
    }

    /// Examples with neither input nor output carry no information.
    pub fn is_meaningful(&self) -> bool {
        !self.input.trim().is_empty() || !self.output.trim().is_empty()
    }
}

/// The structured study note emitted for one source file.
///
/// Serialized with camelCase keys (`edgeCases`) so the JSON artifact matches
/// what the generative pipeline is asked to return.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub title: String,
    pub language: String,
    pub problem: String,
    pub approach: String,
    pub pseudocode: String,
    pub complexity: String,
    pub edge_cases: Vec<String>,
    pub examples: Vec<Example>,
    pub explanation: String,
    pub code: String,
}

/// How a note is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Local pattern detection only.
    #[default]
    Heuristic,
    /// Multi-stage generation; the heuristic path is the fallback.
    Llm,
    /// Heuristic note with prose fields refined by the generator.
    Hybrid,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Heuristic => "heuristic",
            Mode::Llm => "llm",
            Mode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heuristic" => Ok(Mode::Heuristic),
            "llm" | "ai" => Ok(Mode::Llm),
            "hybrid" => Ok(Mode::Hybrid),
            other => anyhow::bail!(
                "Unknown mode: '{}'. Use heuristic, llm, or hybrid.",
                other
            ),
        }
    }
}

/// Derive the language tag from a file extension.
pub fn language_from_path(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_language(&e.to_string_lossy()))
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string())
}

/// Reduce any language label to a short lower-case token.
///
/// Keeps `[a-z0-9+#]` so `C++` becomes `c++` and `C#` stays `c#`; anything
/// that reduces to nothing becomes [`UNKNOWN_LANGUAGE`].
pub fn normalize_language(raw: &str) -> String {
    let token: String = raw
        .trim()
        .trim_start_matches('.')
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '+' || *c == '#')
        .collect();
    if token.is_empty() {
        UNKNOWN_LANGUAGE.to_string()
    } else {
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_from_extension_is_lowercased() {
        assert_eq!(language_from_path(Path::new("a/Sort.CPP")), "cpp");
        assert_eq!(language_from_path(Path::new("solve.py")), "py");
    }

    #[test]
    fn language_without_extension_is_unknown() {
        assert_eq!(language_from_path(Path::new("Makefile")), UNKNOWN_LANGUAGE);
        assert_eq!(normalize_language("   "), UNKNOWN_LANGUAGE);
    }

    #[test]
    fn normalize_language_keeps_symbols() {
        assert_eq!(normalize_language(" C++ "), "c++");
        assert_eq!(normalize_language("C#"), "c#");
        assert_eq!(normalize_language(".rs"), "rs");
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Hybrid".parse::<Mode>().unwrap(), Mode::Hybrid);
        assert_eq!("llm".parse::<Mode>().unwrap(), Mode::Llm);
        assert!("magic".parse::<Mode>().is_err());
    }

    #[test]
    fn note_serializes_camel_case() {
        let note = Note {
            edge_cases: vec!["empty input".to_string()],
            ..Note::default()
        };
        let json = serde_json::to_value(&note).unwrap();
        assert!(json.get("edgeCases").is_some());
        assert!(json.get("edge_cases").is_none());
    }

    #[test]
    fn example_without_input_or_output_is_not_meaningful() {
        assert!(!Example::new("", " ", "just a note").is_meaningful());
        assert!(Example::new("[1]", "", "").is_meaningful());
    }

    #[test]
    fn source_unit_from_path_uses_stem() {
        let unit = SourceUnit::from_path(Path::new("dir/selection_sort.cpp"), String::new());
        assert_eq!(unit.name, "selection_sort");
        assert_eq!(unit.language, "cpp");
    }
}
