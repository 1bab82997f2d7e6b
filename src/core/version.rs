//! Purpose: Track the active solc binary (path + version) and detect binary versions.
//! Exports: `ActiveSolc`, `SolcRegistry`, `parse_version_output`, `expected_help_code`.
//! Role: Injectable context read by the invoker; no ambient global selection.
//! Invariants: Reading the active compiler never mutates the registry.
//! Invariants: `NotInstalled` is the only failure of `active()`.

use std::path::{Path, PathBuf};

use bstr::ByteSlice;
use semver::Version;
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::runner::{Argv, ProcessRunner};
use crate::solc_paths;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ActiveSolc {
    pub version: Version,
    pub path: PathBuf,
}

impl ActiveSolc {
    pub fn new(path: impl Into<PathBuf>, version: Version) -> Self {
        Self {
            version,
            path: path.into(),
        }
    }

    /// Run `<path> --version` and record what the binary reports.
    pub fn detect(path: impl Into<PathBuf>, runner: &impl ProcessRunner) -> Result<Self, Error> {
        let path = path.into();
        let version = detect_version(&path, runner)?;
        Ok(Self { version, path })
    }
}

#[derive(Clone, Debug, Default)]
pub struct SolcRegistry {
    active: Option<ActiveSolc>,
}

impl SolcRegistry {
    pub fn new() -> Self {
        Self { active: None }
    }

    pub fn with_active(path: impl Into<PathBuf>, version: Version) -> Self {
        Self {
            active: Some(ActiveSolc::new(path, version)),
        }
    }

    /// Pick `requested` (or the newest installed version) from an install directory.
    pub fn from_install_dir(dir: &Path, requested: Option<&Version>) -> Result<Self, Error> {
        let installed = solc_paths::installed_versions(dir)?;
        let version = match requested {
            Some(requested) => installed
                .into_iter()
                .find(|version| version == requested)
                .ok_or_else(|| {
                    Error::new(ErrorKind::NotInstalled)
                        .with_message(format!("solc {requested} is not installed"))
                        .with_path(dir)
                        .with_hint("Install it as solc-v<version> in the install directory.")
                })?,
            None => installed.into_iter().next().ok_or_else(|| {
                Error::new(ErrorKind::NotInstalled)
                    .with_message("no solc versions are installed")
                    .with_path(dir)
                    .with_hint("Pass --solc <path> or install a binary as solc-v<version>.")
            })?,
        };
        let path = solc_paths::binary_path(dir, &version);
        Ok(Self::with_active(path, version))
    }

    pub fn select(&mut self, active: ActiveSolc) {
        debug!(version = %active.version, path = %active.path.display(), "selected solc");
        self.active = Some(active);
    }

    pub fn active(&self) -> Result<&ActiveSolc, Error> {
        self.active.as_ref().ok_or_else(|| {
            Error::new(ErrorKind::NotInstalled)
                .with_message("no solc version has been selected")
                .with_hint("Select an installed compiler before invoking solc.")
        })
    }

    pub fn active_version(&self) -> Result<&Version, Error> {
        self.active().map(|active| &active.version)
    }
}

pub fn detect_version(path: &Path, runner: &impl ProcessRunner) -> Result<Version, Error> {
    let argv = Argv::new(path).arg("--version");
    let output = runner.run(&argv, None)?;
    let stdout = output.stdout.to_str_lossy();
    if output.exit_code != 0 {
        return Err(Error::new(ErrorKind::Solc)
            .with_message("`--version` exited unsuccessfully")
            .with_path(path)
            .with_exit_code(output.exit_code)
            .with_output(stdout, output.stderr.to_str_lossy())
            .with_argv(argv.to_strings()));
    }
    parse_version_output(&stdout).ok_or_else(|| {
        Error::new(ErrorKind::Solc)
            .with_message("no version found in `--version` output")
            .with_path(path)
            .with_output(stdout.clone(), output.stderr.to_str_lossy())
    })
}

/// Find the first `major.minor.patch` in solc's `--version` banner.
pub fn parse_version_output(output: &str) -> Option<Version> {
    let bytes = output.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() && (start == 0 || !bytes[start - 1].is_ascii_digit()) {
            if let Some(version) = triple_at(&output[start..]) {
                return Some(version);
            }
        }
        start += 1;
    }
    None
}

fn triple_at(text: &str) -> Option<Version> {
    let mut parts = [0u64; 3];
    let mut rest = text;
    for (idx, part) in parts.iter_mut().enumerate() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        *part = rest[..digits].parse().ok()?;
        rest = &rest[digits..];
        if idx < 2 {
            rest = rest.strip_prefix('.')?;
        }
    }
    Some(Version::new(parts[0], parts[1], parts[2]))
}

/// Exit code `solc --help` returns: 1 before 0.8.10, 0 from then on.
pub fn expected_help_code(version: &Version) -> i32 {
    if (version.major, version.minor, version.patch) < (0, 8, 10) {
        1
    } else {
        0
    }
}
