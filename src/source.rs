//! Where PerfData bytes come from.
//!
//! A running HotSpot JVM publishes its PerfData region as the file
//! `<tmp>/hsperfdata_<user>/<pid>` and keeps it mapped shared; mapping the
//! same file read-only gives a live view of its counters.

use memmap2::Mmap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::core::{GcmonError, Result};

/// Anything that can lend the bytes of a PerfData region.
pub trait PerfSource {
    /// The region's bytes as of this call.
    fn bytes(&self) -> &[u8];
}

impl PerfSource for [u8] {
    fn bytes(&self) -> &[u8] {
        self
    }
}

impl PerfSource for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }
}

/// Read-only memory map of an hsperfdata file.
pub struct MappedPerfData {
    path: PathBuf,
    map: Mmap,
}

impl MappedPerfData {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // The runtime rewrites counter values in place but never truncates the
        // file while it runs; every read of the map is bounds checked.
        let map = unsafe { Mmap::map(&file)? };
        tracing::debug!(path = %path.display(), len = map.len(), "Mapped PerfData file");
        Ok(Self {
            path: path.to_path_buf(),
            map,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PerfSource for MappedPerfData {
    fn bytes(&self) -> &[u8] {
        &self.map
    }
}

impl fmt::Debug for MappedPerfData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedPerfData")
            .field("path", &self.path)
            .field("len", &self.map.len())
            .finish()
    }
}

/// What the user asked to monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Pid(u32),
    Path(PathBuf),
}

impl FromStr for Target {
    type Err = GcmonError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(GcmonError::config("target must be a pid or an hsperfdata path"));
        }
        Ok(match s.parse::<u32>() {
            Ok(pid) => Target::Pid(pid),
            Err(_) => Target::Path(PathBuf::from(s)),
        })
    }
}

impl Target {
    /// Resolve to a file path, searching `root` (or the temp dir) for pids.
    pub fn locate(&self, root: Option<&Path>) -> Result<PathBuf> {
        match self {
            Target::Path(path) => Ok(path.clone()),
            Target::Pid(pid) => {
                let root = root.map_or_else(std::env::temp_dir, Path::to_path_buf);
                find_perf_data(*pid, &root)
            },
        }
    }
}

/// Find `<root>/hsperfdata_*/<pid>`.
pub fn find_perf_data(pid: u32, root: &Path) -> Result<PathBuf> {
    let file_name = pid.to_string();
    let entries = std::fs::read_dir(root)?;

    for entry in entries.flatten() {
        let is_perf_dir = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with("hsperfdata_"));
        if !is_perf_dir {
            continue;
        }

        let candidate = entry.path().join(&file_name);
        if candidate.is_file() {
            tracing::debug!(pid, path = %candidate.display(), "Found hsperfdata file");
            return Ok(candidate);
        }
    }

    Err(GcmonError::ProcessNotFound(pid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_target_parsing() {
        assert_eq!("1234".parse::<Target>().unwrap(), Target::Pid(1234));
        assert_eq!(
            "/tmp/hsperfdata_me/1234".parse::<Target>().unwrap(),
            Target::Path(PathBuf::from("/tmp/hsperfdata_me/1234"))
        );
        assert!("  ".parse::<Target>().is_err());
    }

    #[test]
    fn test_find_perf_data() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir(root.path().join("unrelated")).unwrap();
        let perf_dir = root.path().join("hsperfdata_tester");
        std::fs::create_dir(&perf_dir).unwrap();
        std::fs::write(perf_dir.join("4321"), b"x").unwrap();

        let found = find_perf_data(4321, root.path()).unwrap();
        assert_eq!(found, perf_dir.join("4321"));

        let missing = find_perf_data(1, root.path()).unwrap_err();
        assert!(matches!(missing, GcmonError::ProcessNotFound(1)));
    }

    #[test]
    fn test_mapped_file_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xca, 0xfe, 0xc0, 0xc0]).unwrap();
        file.flush().unwrap();

        let mapped = MappedPerfData::open(file.path()).unwrap();
        assert_eq!(mapped.bytes(), &[0xca, 0xfe, 0xc0, 0xc0]);
        assert_eq!(mapped.path(), file.path());
    }
}
