//! Naming-convention checks against the file path.

use crate::report::{Classification, Diagnostic};
use regex::{Regex, RegexBuilder};
use std::path::{Component, Path};

/// The three naming patterns, compiled once at rule-set construction.
pub struct NamingRules {
    forbidden: Regex,
    movie_year: Regex,
    tv_episode: Regex,
}

impl NamingRules {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            forbidden: case_insensitive(r#"[<>:"/\\|?*]"#)?,
            movie_year: case_insensitive(r"\(\d{4}\)")?,
            tv_episode: case_insensitive(r"S\d{2}E\d{2}")?,
        })
    }

    /// Run all path checks against one file path.
    pub fn check(&self, path: &Path) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        // Only normal components are checked; root and prefix
        // components are separators, not names.
        for component in path.components() {
            if let Component::Normal(name) = component {
                if self.forbidden.is_match(&name.to_string_lossy()) {
                    diagnostics.push(Diagnostic::new(
                        Classification::NamingForbidden,
                        "Forbidden characters in file path.",
                    ));
                    break;
                }
            }
        }

        let path_str = path.to_string_lossy();
        // Movie detection takes precedence when a path mentions both.
        if contains_ascii_ci(&path_str, "movies") {
            if !self.movie_year.is_match(&path_str) {
                diagnostics.push(Diagnostic::new(
                    Classification::NamingMovie,
                    "Movie year does not match (0000).",
                ));
            }
        } else if contains_ascii_ci(&path_str, "tv") && !self.tv_episode.is_match(&path_str) {
            diagnostics.push(Diagnostic::new(
                Classification::NamingTv,
                "TV episode does not match S00E00.",
            ));
        }

        diagnostics
    }
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

fn contains_ascii_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_ascii_lowercase().contains(needle)
}
