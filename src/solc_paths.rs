//! Purpose: Local install-directory and binary-name resolution for solc releases.
//! Exports: `default_install_dir`, `binary_path`, `installed_versions`.
//! Role: Keep CLI and registry path semantics aligned from one source.
//! Invariants: Default install directory is `$SOLCX_BINARY_PATH`, else `~/.solcx`.
//! Invariants: Binaries are named `solc-v<major>.<minor>.<patch>` (plus `.exe` on Windows).

use std::path::{Path, PathBuf};

use semver::Version;

use crate::core::error::{Error, ErrorKind};

pub const INSTALL_DIR_ENV: &str = "SOLCX_BINARY_PATH";

const BINARY_PREFIX: &str = "solc-v";

pub fn default_install_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(INSTALL_DIR_ENV) {
        return PathBuf::from(dir);
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .unwrap_or_default();
    PathBuf::from(home).join(".solcx")
}

pub fn binary_name(version: &Version) -> String {
    let name = format!(
        "{BINARY_PREFIX}{}.{}.{}",
        version.major, version.minor, version.patch
    );
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name
    }
}

pub fn binary_path(dir: &Path, version: &Version) -> PathBuf {
    dir.join(binary_name(version))
}

fn version_from_name(name: &str) -> Option<Version> {
    let rest = name.strip_prefix(BINARY_PREFIX)?;
    let rest = rest.strip_suffix(".exe").unwrap_or(rest);
    Version::parse(rest).ok().filter(|version| version.pre.is_empty())
}

/// Installed versions, newest first. A missing directory means nothing is installed.
pub fn installed_versions(dir: &Path) -> Result<Vec<Version>, Error> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => {
            return Err(Error::new(ErrorKind::Io)
                .with_message("failed to read install directory")
                .with_path(dir)
                .with_source(err));
        }
    };
    let mut versions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read install directory entry")
                .with_path(dir)
                .with_source(err)
        })?;
        if let Some(version) = entry.file_name().to_str().and_then(version_from_name) {
            versions.push(version);
        }
    }
    versions.sort_by(|a, b| b.cmp(a));
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::{binary_path, installed_versions, version_from_name};
    use semver::Version;
    use std::path::Path;

    #[test]
    fn parses_binary_names() {
        assert_eq!(version_from_name("solc-v0.8.10"), Some(Version::new(0, 8, 10)));
        assert_eq!(version_from_name("solc-v0.4.26.exe"), Some(Version::new(0, 4, 26)));
        assert_eq!(version_from_name("solc-0.8.10"), None);
        assert_eq!(version_from_name("solc-v0.8"), None);
        assert_eq!(version_from_name("solc-v0.8.10.lock"), None);
    }

    #[test]
    fn binary_path_joins_dir() {
        let path = binary_path(Path::new("/tmp/solcx"), &Version::new(0, 7, 6));
        assert!(path.starts_with("/tmp/solcx"));
        assert!(path.to_string_lossy().contains("solc-v0.7.6"));
    }

    #[test]
    fn lists_installed_newest_first() {
        let temp = tempfile::tempdir().expect("tempdir");
        let names = [
            "solc-v0.5.17",
            "solc-v0.8.10",
            "solc-v0.6.12",
            "README",
            "solc-v0.8.10.lock",
        ];
        for name in names {
            std::fs::write(temp.path().join(name), b"").expect("write");
        }
        let versions = installed_versions(temp.path()).expect("list");
        assert_eq!(
            versions,
            [
                Version::new(0, 8, 10),
                Version::new(0, 6, 12),
                Version::new(0, 5, 17)
            ]
        );
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let versions = installed_versions(&temp.path().join("absent")).expect("list");
        assert!(versions.is_empty());
    }
}
