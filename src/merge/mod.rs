//! Shared types for multi-source configuration merges
//!
//! Every merger takes its contributing sources as an explicit ordered list of
//! [`ConfigFragment`]s, so precedence is a documented contract rather than a
//! side effect of storage order.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Precedence rank of a contributing fragment.
///
/// Ordering is lowest-to-highest precedence: injected defaults lose to any
/// plugin, plugins lose to the app's own fragment. Plugins carry their
/// enumeration index so two plugin fragments compare in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FragmentRank {
    /// Auto-derived defaults, applied only where no source set the key
    Default,
    /// A plugin fragment, in plugin enumeration order
    Plugin(usize),
    /// The app's own fragment, always wins
    App,
}

/// One source's contribution to a merge
#[derive(Debug, Clone)]
pub struct ConfigFragment {
    /// Where the fragment came from (used in markers and diagnostics)
    pub source_path: PathBuf,

    /// Raw fragment text
    pub content: String,

    /// Precedence of this fragment
    pub rank: FragmentRank,
}

impl ConfigFragment {
    pub fn new(source_path: impl Into<PathBuf>, content: impl Into<String>, rank: FragmentRank) -> Self {
        Self {
            source_path: source_path.into(),
            content: content.into(),
            rank,
        }
    }

    /// Read a fragment from disk. Returns `None` when the file is missing or
    /// unreadable; an absent source is skipped, never fatal.
    pub fn from_file(path: &Path, rank: FragmentRank) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Some(Self {
            source_path: path.to_path_buf(),
            content,
            rank,
        })
    }
}

/// A merged configuration artifact destined for one file
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    /// Destination path
    pub target_path: PathBuf,

    /// Full merged content
    pub content: String,
}

impl MergedArtifact {
    pub fn new(target_path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            target_path: target_path.into(),
            content: content.into(),
        }
    }

    /// Write the artifact, but only if it differs from what is on disk.
    ///
    /// Skipping identical writes keeps file mtimes stable so the native
    /// toolchain does not see a spurious input change. Returns whether a
    /// write happened.
    pub fn write_if_changed(&self) -> io::Result<bool> {
        if let Ok(existing) = fs::read_to_string(&self.target_path) {
            if existing == self.content {
                log::debug!("unchanged, skipping write: {}", self.target_path.display());
                return Ok(false);
            }
        }
        if let Some(parent) = self.target_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.target_path, &self.content)?;
        log::info!("wrote {}", self.target_path.display());
        Ok(true)
    }

    /// Delete the artifact file if present.
    pub fn delete(&self) -> io::Result<()> {
        match fs::remove_file(&self.target_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
