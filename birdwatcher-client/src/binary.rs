//! Locating the birdwatcher executable.
//!
//! Resolution order: an explicit path, then `BIRDWATCHER_BIN`, then the first
//! executable named `birdwatcher` on `PATH`. Nothing is downloaded.

use crate::error::{BirdwatcherError, BirdwatcherResult};
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};

pub const BINARY_ENV: &str = "BIRDWATCHER_BIN";
pub const BINARY_NAME: &str = "birdwatcher";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOs {
    Linux,
    Darwin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostArch {
    Amd64,
    Arm64,
}

/// Platform the tool is published for, e.g. `linux-amd64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformTag {
    pub os: HostOs,
    pub arch: HostArch,
}

impl PlatformTag {
    pub fn current() -> BirdwatcherResult<Self> {
        Self::from_parts(std::env::consts::OS, std::env::consts::ARCH)
    }

    pub fn from_parts(os: &str, arch: &str) -> BirdwatcherResult<Self> {
        let unsupported = || BirdwatcherError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        };
        let host_os = match os.to_ascii_lowercase().as_str() {
            "linux" => HostOs::Linux,
            "macos" | "darwin" => HostOs::Darwin,
            _ => return Err(unsupported()),
        };
        let host_arch = match arch.to_ascii_lowercase().as_str() {
            "x86_64" | "amd64" => HostArch::Amd64,
            "aarch64" | "arm64" => HostArch::Arm64,
            _ => return Err(unsupported()),
        };
        Ok(Self {
            os: host_os,
            arch: host_arch,
        })
    }
}

impl fmt::Display for PlatformTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let os = match self.os {
            HostOs::Linux => "linux",
            HostOs::Darwin => "darwin",
        };
        let arch = match self.arch {
            HostArch::Amd64 => "amd64",
            HostArch::Arm64 => "arm64",
        };
        write!(f, "{}-{}", os, arch)
    }
}

/// Resolve the executable path.
///
/// An explicit path is returned as-is; a missing file surfaces later as
/// `BinaryMissing` when the process fails to start.
pub fn locate(explicit: Option<&Path>) -> BirdwatcherResult<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    let platform = PlatformTag::current()?;

    if let Some(path) = std::env::var_os(BINARY_ENV).filter(|v| !v.is_empty()) {
        tracing::debug!(path = ?path, "Using birdwatcher from {}", BINARY_ENV);
        return Ok(PathBuf::from(path));
    }

    match find_in_path(BINARY_NAME, std::env::var_os("PATH").as_deref()) {
        Some(path) => {
            tracing::debug!(path = %path.display(), %platform, "Found birdwatcher on PATH");
            Ok(path)
        }
        None => Err(BirdwatcherError::BinaryMissing {
            path: BINARY_NAME.to_string(),
            reason: format!("not set in {} and not found on PATH ({})", BINARY_ENV, platform),
        }),
    }
}

/// First executable file called `name` in a `PATH`-style list.
pub fn find_in_path(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let path_var = path_var?;
    std::env::split_paths(path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_tags() {
        let tag = PlatformTag::from_parts("linux", "x86_64").unwrap();
        assert_eq!(tag.to_string(), "linux-amd64");
        let tag = PlatformTag::from_parts("macos", "aarch64").unwrap();
        assert_eq!(tag.to_string(), "darwin-arm64");
    }

    #[test]
    fn test_unsupported_platforms() {
        assert!(matches!(
            PlatformTag::from_parts("windows", "x86_64"),
            Err(BirdwatcherError::UnsupportedPlatform { .. })
        ));
        assert!(PlatformTag::from_parts("linux", "riscv64").is_err());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = locate(Some(Path::new("/opt/milvus/bin/birdwatcher"))).unwrap();
        assert_eq!(path, PathBuf::from("/opt/milvus/bin/birdwatcher"));
    }

    #[test]
    fn test_find_in_path_none() {
        assert_eq!(find_in_path(BINARY_NAME, None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_skips_non_executables() {
        use std::os::unix::fs::PermissionsExt;

        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let plain = first.path().join(BINARY_NAME);
        std::fs::write(&plain, "not executable").unwrap();
        std::fs::set_permissions(&plain, std::fs::Permissions::from_mode(0o644)).unwrap();
        let exe = second.path().join(BINARY_NAME);
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let joined = std::env::join_paths([first.path(), second.path()]).unwrap();
        assert_eq!(find_in_path(BINARY_NAME, Some(joined.as_os_str())), Some(exe));
    }
}
