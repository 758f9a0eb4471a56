//! Entitlements merging
//!
//! Folds plugin entitlements documents into the app's own document as a
//! shallow union of top-level keys. Plugins apply in enumeration order, each
//! overwriting same-key values from earlier plugins; the app document applies
//! last, so an app-defined key always wins. Without an app document no
//! destination file is produced at all.

pub mod plist;

pub use plist::{PlistDict, PlistValue};

use std::fs;
use std::io;
use std::path::Path;

use crate::merge::MergedArtifact;

/// Fixed entitlements file name, for both the app and each plugin
pub const ENTITLEMENTS_FILE_NAME: &str = "app.entitlements";

/// Errors from entitlements merging
#[derive(Debug, thiserror::Error)]
pub enum EntitlementsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed plist {path}: {message}")]
    Parse { path: String, message: String },
}

/// Shallow top-level union: plugin documents in order, then the app document.
pub fn merge_documents(app: &PlistDict, plugins: &[PlistDict]) -> PlistDict {
    let mut merged = PlistDict::new();
    for plugin in plugins {
        for (key, value) in plugin {
            merged.insert(key.clone(), value.clone());
        }
    }
    for (key, value) in app {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Merge the app's entitlements file with plugin entitlements files and write
/// the result.
///
/// `plugin_paths` is the explicit enumeration order. Missing sources are
/// skipped; a present but malformed source aborts with a parse error naming
/// it. Returns whether a file was written; with no app document this is a
/// no-op regardless of plugin contributions.
pub fn merge_to_file(
    app_path: &Path,
    plugin_paths: &[&Path],
    target_path: &Path,
) -> Result<bool, EntitlementsError> {
    let Some(app) = read_dict(app_path)? else {
        log::debug!("no app entitlements, skipping {}", target_path.display());
        return Ok(false);
    };

    let mut plugins = Vec::new();
    for path in plugin_paths {
        if let Some(dict) = read_dict(path)? {
            plugins.push(dict);
        }
    }

    let merged = merge_documents(&app, &plugins);
    let artifact = MergedArtifact::new(target_path, plist::print_document(&merged));
    artifact.write_if_changed()?;
    Ok(true)
}

/// Read and parse one entitlements file; `None` when it does not exist.
fn read_dict(path: &Path) -> Result<Option<PlistDict>, EntitlementsError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    plist::parse_dict(&path.to_string_lossy(), &content).map(Some)
}
