//! Purpose: Static table of solc command-line options and their version windows.
//! Exports: `OptionSpec`, `Arity`, `ValueKind`, `Packing`, `EnumValue`, `Window`, `OPTIONS`, `lookup`.
//! Role: Single auditable source of which flags and enumerated values each solc release accepts.
//! Invariants: Windows are half-open: `introduced <= version < removed`.
//! Invariants: Gating compares only (major, minor, patch); pre-release tags are ignored.
//! Invariants: The table is immutable for the process lifetime.

use semver::Version;

pub type Triple = (u64, u64, u64);

pub fn triple(version: &Version) -> Triple {
    (version.major, version.minor, version.patch)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window {
    pub introduced: Option<Triple>,
    pub removed: Option<Triple>,
}

impl Window {
    pub const ALWAYS: Window = Window {
        introduced: None,
        removed: None,
    };

    pub const fn since(introduced: Triple) -> Self {
        Self {
            introduced: Some(introduced),
            removed: None,
        }
    }

    pub const fn until(removed: Triple) -> Self {
        Self {
            introduced: None,
            removed: Some(removed),
        }
    }

    pub const fn between(introduced: Triple, removed: Triple) -> Self {
        Self {
            introduced: Some(introduced),
            removed: Some(removed),
        }
    }

    pub fn contains(&self, version: &Version) -> bool {
        let version = triple(version);
        self.introduced.is_none_or(|introduced| version >= introduced)
            && self.removed.is_none_or(|removed| version < removed)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EnumValue {
    pub name: &'static str,
    pub window: Window,
}

const fn enum_value(name: &'static str, window: Window) -> EnumValue {
    EnumValue { name, window }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueKind {
    Int,
    Text,
    Path,
    /// Comma-joined list of free-form entries.
    List,
    Enum(&'static [EnumValue]),
    /// Comma-joined list where each entry must be an allowed value.
    EnumList(&'static [EnumValue]),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Arity {
    Flag,
    Value(ValueKind),
}

/// How a value-bearing option is rendered into argv.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Packing {
    /// `--flag value` as two tokens.
    Separate,
    /// `--flag=value` as one token.
    Joined,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OptionSpec {
    pub name: &'static str,
    pub flag: &'static str,
    pub arity: Arity,
    pub packing: Packing,
    pub window: Window,
}

impl OptionSpec {
    pub fn available_at(&self, version: &Version) -> bool {
        self.window.contains(version)
    }

    pub fn takes_value(&self) -> bool {
        matches!(self.arity, Arity::Value(_))
    }

    /// Enumerated values accepted by this option at `version`, if it is enumerated.
    pub fn allowed_values(&self, version: &Version) -> Option<Vec<&'static str>> {
        let values = match self.arity {
            Arity::Value(ValueKind::Enum(values)) | Arity::Value(ValueKind::EnumList(values)) => {
                values
            }
            _ => return None,
        };
        Some(
            values
                .iter()
                .filter(|value| value.window.contains(version))
                .map(|value| value.name)
                .collect(),
        )
    }
}

const fn flag(name: &'static str, flag: &'static str, window: Window) -> OptionSpec {
    OptionSpec {
        name,
        flag,
        arity: Arity::Flag,
        packing: Packing::Separate,
        window,
    }
}

const fn value(
    name: &'static str,
    flag: &'static str,
    kind: ValueKind,
    window: Window,
) -> OptionSpec {
    OptionSpec {
        name,
        flag,
        arity: Arity::Value(kind),
        packing: Packing::Separate,
        window,
    }
}

const fn joined(
    name: &'static str,
    flag: &'static str,
    kind: ValueKind,
    window: Window,
) -> OptionSpec {
    OptionSpec {
        name,
        flag,
        arity: Arity::Value(kind),
        packing: Packing::Joined,
        window,
    }
}

pub const EVM_VERSIONS: &[EnumValue] = &[
    enum_value("homestead", Window::since((0, 4, 21))),
    enum_value("tangerineWhistle", Window::since((0, 4, 21))),
    enum_value("spuriousDragon", Window::since((0, 4, 21))),
    enum_value("byzantium", Window::since((0, 4, 21))),
    enum_value("constantinople", Window::since((0, 4, 21))),
    enum_value("petersburg", Window::since((0, 5, 5))),
    enum_value("istanbul", Window::since((0, 5, 14))),
    enum_value("berlin", Window::since((0, 8, 5))),
    enum_value("london", Window::since((0, 8, 7))),
    enum_value("paris", Window::since((0, 8, 18))),
    enum_value("shanghai", Window::since((0, 8, 20))),
    enum_value("cancun", Window::since((0, 8, 24))),
    enum_value("prague", Window::since((0, 8, 27))),
];

pub const COMBINED_JSON_VALUES: &[EnumValue] = &[
    enum_value("abi", Window::ALWAYS),
    enum_value("asm", Window::ALWAYS),
    enum_value("ast", Window::ALWAYS),
    enum_value("bin", Window::ALWAYS),
    enum_value("bin-runtime", Window::ALWAYS),
    enum_value("devdoc", Window::ALWAYS),
    enum_value("hashes", Window::ALWAYS),
    enum_value("metadata", Window::ALWAYS),
    enum_value("opcodes", Window::ALWAYS),
    enum_value("srcmap", Window::ALWAYS),
    enum_value("srcmap-runtime", Window::ALWAYS),
    enum_value("userdoc", Window::ALWAYS),
    enum_value("clone-bin", Window::until((0, 5, 0))),
    enum_value("interface", Window::until((0, 5, 0))),
    enum_value("compact-format", Window::until((0, 8, 10))),
    enum_value("storage-layout", Window::since((0, 5, 13))),
    enum_value("generated-sources", Window::since((0, 8, 0))),
    enum_value("generated-sources-runtime", Window::since((0, 8, 0))),
    enum_value("function-debug", Window::since((0, 8, 3))),
    enum_value("function-debug-runtime", Window::since((0, 8, 3))),
];

pub const STOP_AFTER_VALUES: &[EnumValue] = &[enum_value("parsing", Window::ALWAYS)];

pub static OPTIONS: &[OptionSpec] = &[
    flag("help", "--help", Window::ALWAYS),
    flag("version", "--version", Window::ALWAYS),
    flag("license", "--license", Window::ALWAYS),
    flag("optimize", "--optimize", Window::ALWAYS),
    flag("gas", "--gas", Window::ALWAYS),
    flag("asm", "--asm", Window::ALWAYS),
    flag("asm-json", "--asm-json", Window::ALWAYS),
    flag("opcodes", "--opcodes", Window::ALWAYS),
    flag("bin", "--bin", Window::ALWAYS),
    flag("bin-runtime", "--bin-runtime", Window::ALWAYS),
    flag("abi", "--abi", Window::ALWAYS),
    flag("hashes", "--hashes", Window::ALWAYS),
    flag("userdoc", "--userdoc", Window::ALWAYS),
    flag("devdoc", "--devdoc", Window::ALWAYS),
    flag("metadata", "--metadata", Window::ALWAYS),
    flag("standard-json", "--standard-json", Window::ALWAYS),
    flag("overwrite", "--overwrite", Window::ALWAYS),
    flag("link", "--link", Window::ALWAYS),
    flag("assemble", "--assemble", Window::ALWAYS),
    flag("ast-compact-json", "--ast-compact-json", Window::since((0, 4, 12))),
    flag("storage-layout", "--storage-layout", Window::since((0, 5, 13))),
    flag("ir", "--ir", Window::since((0, 6, 0))),
    flag("via-ir", "--via-ir", Window::since((0, 8, 13))),
    flag("ast", "--ast", Window::until((0, 6, 0))),
    flag("clone-bin", "--clone-bin", Window::until((0, 5, 0))),
    flag("formal", "--formal", Window::until((0, 5, 0))),
    flag("ast-json", "--ast-json", Window::until((0, 8, 2))),
    value("optimize-runs", "--optimize-runs", ValueKind::Int, Window::ALWAYS),
    value("libraries", "--libraries", ValueKind::List, Window::ALWAYS),
    value("output-dir", "--output-dir", ValueKind::Path, Window::ALWAYS),
    value(
        "combined-json",
        "--combined-json",
        ValueKind::EnumList(COMBINED_JSON_VALUES),
        Window::ALWAYS,
    ),
    value("allow-paths", "--allow-paths", ValueKind::List, Window::ALWAYS),
    value("base-path", "--base-path", ValueKind::Path, Window::since((0, 6, 9))),
    value(
        "include-path",
        "--include-path",
        ValueKind::Path,
        Window::since((0, 8, 8)),
    ),
    value(
        "evm-version",
        "--evm-version",
        ValueKind::Enum(EVM_VERSIONS),
        Window::since((0, 4, 21)),
    ),
    joined(
        "stop-after",
        "--stop-after",
        ValueKind::Enum(STOP_AFTER_VALUES),
        Window::since((0, 7, 1)),
    ),
];

/// Canonical option name: leading dashes stripped, underscores as dashes.
pub fn normalize_name(name: &str) -> String {
    name.trim_start_matches('-').replace('_', "-")
}

pub fn lookup(name: &str) -> Option<&'static OptionSpec> {
    let name = normalize_name(name);
    OPTIONS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::{Arity, OPTIONS, Packing, ValueKind, Window, lookup, normalize_name};
    use semver::Version;

    fn v(text: &str) -> Version {
        Version::parse(text).expect("version")
    }

    #[test]
    fn names_are_unique_and_flags_match() {
        for (idx, spec) in OPTIONS.iter().enumerate() {
            assert_eq!(spec.flag, format!("--{}", spec.name));
            assert!(
                OPTIONS[idx + 1..].iter().all(|other| other.name != spec.name),
                "duplicate option {}",
                spec.name
            );
        }
    }

    #[test]
    fn windows_are_half_open() {
        let window = Window::between((0, 5, 0), (0, 6, 0));
        assert!(!window.contains(&v("0.4.26")));
        assert!(window.contains(&v("0.5.0")));
        assert!(window.contains(&v("0.5.17")));
        assert!(!window.contains(&v("0.6.0")));
    }

    #[test]
    fn prerelease_gates_like_release() {
        let ast_json = lookup("ast-json").expect("ast-json");
        assert!(!ast_json.available_at(&v("0.8.2-nightly.2021.2.1")));
        assert!(ast_json.available_at(&v("0.8.1")));
    }

    #[test]
    fn lookup_accepts_underscored_and_dashed_names() {
        assert_eq!(normalize_name("bin_runtime"), "bin-runtime");
        assert_eq!(normalize_name("--asm-json"), "asm-json");
        assert_eq!(lookup("asm_json").map(|spec| spec.flag), Some("--asm-json"));
        assert!(lookup("potato").is_none());
    }

    #[test]
    fn evm_version_set_grows_with_releases() {
        let spec = lookup("evm_version").expect("evm-version");
        assert!(!spec.available_at(&v("0.4.20")));
        let early = spec.allowed_values(&v("0.4.21")).expect("enum");
        assert!(early.contains(&"byzantium"));
        assert!(!early.contains(&"petersburg"));
        let late = spec.allowed_values(&v("0.8.24")).expect("enum");
        assert!(late.contains(&"cancun"));
        assert!(!late.contains(&"potato"));
    }

    #[test]
    fn combined_json_drops_removed_outputs() {
        let spec = lookup("combined-json").expect("combined-json");
        assert!(matches!(spec.arity, Arity::Value(ValueKind::EnumList(_))));
        let old = spec.allowed_values(&v("0.4.26")).expect("enum");
        assert!(old.contains(&"clone-bin"));
        let new = spec.allowed_values(&v("0.8.10")).expect("enum");
        assert!(!new.contains(&"clone-bin"));
        assert!(!new.contains(&"compact-format"));
        assert!(new.contains(&"generated-sources"));
        assert!(new.contains(&"function-debug-runtime"));
        let before_debug = spec.allowed_values(&v("0.8.2")).expect("enum");
        assert!(!before_debug.contains(&"function-debug"));
    }

    #[test]
    fn stop_after_packs_joined() {
        let spec = lookup("stop-after").expect("stop-after");
        assert_eq!(spec.packing, Packing::Joined);
        assert!(spec.takes_value());
        assert!(!lookup("bin").expect("bin").takes_value());
    }
}
