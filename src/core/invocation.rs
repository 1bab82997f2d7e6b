//! Purpose: Describe one solc invocation before it is validated or spawned.
//! Exports: `Invocation`, `OptionValue`.
//! Role: Ephemeral request built by callers and consumed by the invoker.
//! Invariants: Options keep insertion order; names are stored normalized (`-` separated).
//! Invariants: Nothing here consults the option table; validation happens in the invoker.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::options::normalize_name;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OptionValue {
    Flag(bool),
    Int(u64),
    Text(String),
    Path(PathBuf),
    List(Vec<String>),
}

impl OptionValue {
    /// Render the value as the single argv token solc expects.
    pub fn render(&self) -> String {
        match self {
            OptionValue::Flag(value) => value.to_string(),
            OptionValue::Int(value) => value.to_string(),
            OptionValue::Text(value) => value.clone(),
            OptionValue::Path(path) => path.to_string_lossy().into_owned(),
            OptionValue::List(items) => items.join(","),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Flag(value)
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(u64::from(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Text(value)
    }
}

impl From<PathBuf> for OptionValue {
    fn from(value: PathBuf) -> Self {
        OptionValue::Path(value)
    }
}

impl From<&Path> for OptionValue {
    fn from(value: &Path) -> Self {
        OptionValue::Path(value.to_path_buf())
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<&[&str]> for OptionValue {
    fn from(value: &[&str]) -> Self {
        OptionValue::List(value.iter().map(|item| item.to_string()).collect())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Invocation {
    options: Vec<(String, OptionValue)>,
    sources: Vec<PathBuf>,
    remappings: Vec<String>,
    stdin: Option<Vec<u8>>,
    success_code: i32,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::new()
    }
}

impl Invocation {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            sources: Vec::new(),
            remappings: Vec::new(),
            stdin: None,
            success_code: 0,
        }
    }

    /// Set a boolean flag (`--name`).
    pub fn flag(self, name: &str) -> Self {
        self.option(name, true)
    }

    /// Set an option; a repeated name replaces the earlier value in place.
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        let name = normalize_name(name);
        let value = value.into();
        match self.options.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.options.push((name, value)),
        }
        self
    }

    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    pub fn sources<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.sources.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Add an import remapping (`prefix=target`).
    pub fn remapping(mut self, remapping: impl Into<String>) -> Self {
        self.remappings.push(remapping.into());
        self
    }

    pub fn remappings(mut self, remappings: &BTreeMap<String, String>) -> Self {
        self.remappings.extend(
            remappings
                .iter()
                .map(|(prefix, target)| format!("{prefix}={target}")),
        );
        self
    }

    pub fn stdin(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(input.into());
        self
    }

    pub fn success_code(mut self, code: i32) -> Self {
        self.success_code = code;
        self
    }

    pub fn options(&self) -> &[(String, OptionValue)] {
        &self.options
    }

    pub fn source_files(&self) -> &[PathBuf] {
        &self.sources
    }

    pub fn import_remappings(&self) -> &[String] {
        &self.remappings
    }

    pub fn stdin_bytes(&self) -> Option<&[u8]> {
        self.stdin.as_deref()
    }

    pub fn expected_code(&self) -> i32 {
        self.success_code
    }

    pub fn has_option(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.options
            .iter()
            .any(|(existing, value)| *existing == name && *value != OptionValue::Flag(false))
    }
}
