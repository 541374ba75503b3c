use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

const BUNDLED_DRUGS: &str = include_str!("../assets/drugs.txt");

/// The fixed list of drug identifiers a session draws from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<String>,
}

impl Catalog {
    /// Builds a catalog, keeping the first occurrence of any repeated name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let entries = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .filter(|name| seen.insert(name.clone()))
            .collect();
        Self { entries }
    }

    /// One identifier per line; blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.starts_with('#')),
        )
    }

    pub fn bundled() -> Self {
        Self::parse(BUNDLED_DRUGS)
    }

    /// Loads a user catalog file, falling back to the bundled list when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path)
                    .with_context(|| format!("reading catalog {}", path.display()))?;
                Ok(Self::parse(&content))
            }
            None => Ok(Self::bundled()),
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|entry| entry == identifier)
    }
}
