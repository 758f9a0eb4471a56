//! File-tree hashing for change detection
//!
//! Walks the app source tree, hashing every regular file with SHA-256 into a
//! sorted path → hex-digest map, and diffs two such maps symmetrically
//! (edits, additions, and removals all count as changes).

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use walkdir::WalkDir;

use super::ChangeError;

/// Hashing collaborator consumed by the change detector
pub trait FileHasher {
    /// Hash every regular file under `root`, keyed by root-relative path
    fn generate_hashes(&self, root: &Path) -> Result<BTreeMap<String, String>, ChangeError>;

    /// Paths whose hash differs between the two maps, including paths present
    /// in only one of them. Sorted, deduplicated.
    fn changed_paths(
        &self,
        current: &BTreeMap<String, String>,
        previous: &BTreeMap<String, String>,
    ) -> Vec<String> {
        let mut changed: Vec<String> = Vec::new();
        for (path, hash) in current {
            if previous.get(path) != Some(hash) {
                changed.push(path.clone());
            }
        }
        for path in previous.keys() {
            if !current.contains_key(path) {
                changed.push(path.clone());
            }
        }
        changed.sort();
        changed.dedup();
        changed
    }
}

/// SHA-256 hasher over a directory walk
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256FileHasher;

impl Sha256FileHasher {
    /// Hash one file's contents, streaming
    pub fn hash_file(path: &Path) -> io::Result<String> {
        let mut file = File::open(path)?;
        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];
        loop {
            let n = file.read(&mut buffer)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
        Ok(hex::encode(hasher.finalize()))
    }
}

impl FileHasher for Sha256FileHasher {
    fn generate_hashes(&self, root: &Path) -> Result<BTreeMap<String, String>, ChangeError> {
        let mut hashes = BTreeMap::new();
        if !root.exists() {
            return Ok(hashes);
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| ChangeError::Walk(e.to_string()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let hash = Self::hash_file(entry.path())?;
            hashes.insert(relative, hash);
        }
        Ok(hashes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_generate_hashes_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.js"), "one").unwrap();
        fs::write(dir.path().join("sub/b.js"), "two").unwrap();

        let hashes = Sha256FileHasher.generate_hashes(dir.path()).unwrap();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains_key("a.js"));
        assert!(hashes.contains_key("sub/b.js"));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let hashes = Sha256FileHasher
            .generate_hashes(Path::new("/nonexistent/app"))
            .unwrap();
        assert!(hashes.is_empty());
    }

    #[test]
    fn test_hash_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "content").unwrap();

        let first = Sha256FileHasher.generate_hashes(dir.path()).unwrap();
        let second = Sha256FileHasher.generate_hashes(dir.path()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_changed_paths_symmetric() {
        let mut previous = BTreeMap::new();
        previous.insert("kept.js".to_string(), "h1".to_string());
        previous.insert("edited.js".to_string(), "h2".to_string());
        previous.insert("removed.js".to_string(), "h3".to_string());

        let mut current = BTreeMap::new();
        current.insert("kept.js".to_string(), "h1".to_string());
        current.insert("edited.js".to_string(), "h2-new".to_string());
        current.insert("added.js".to_string(), "h4".to_string());

        let changed = Sha256FileHasher.changed_paths(&current, &previous);
        assert_eq!(changed, vec!["added.js", "edited.js", "removed.js"]);
    }

    #[test]
    fn test_changed_paths_identical_is_empty() {
        let mut map = BTreeMap::new();
        map.insert("a.js".to_string(), "h1".to_string());
        assert!(Sha256FileHasher.changed_paths(&map, &map).is_empty());
    }
}
