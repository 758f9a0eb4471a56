//! Xcode build-settings (xcconfig) parsing and merging
//!
//! The grammar is permissive: each non-blank, non-`//`-comment line splits on
//! the first `=`, a trailing `;` is stripped, and a missing `=` or value
//! yields an empty value rather than an error. Merging resolves each key to
//! the highest-precedence source that set it; auto-derived defaults apply
//! only where no source set the key at all.

use std::fs;
use std::io;
use std::path::Path;

use crate::merge::{ConfigFragment, MergedArtifact};

/// Errors from xcconfig merge output
#[derive(Debug, thiserror::Error)]
pub enum XcconfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// One parsed `KEY = VALUE` property
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// Parse xcconfig text into properties, in line order.
///
/// Lines without a key (blank, comments) are dropped. A line without `=` is a
/// key with an empty value.
pub fn parse(content: &str) -> Vec<Property> {
    let mut properties = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), value.trim()),
            None => (line, ""),
        };
        if key.is_empty() {
            continue;
        }
        let value = value.strip_suffix(';').map(str::trim).unwrap_or(value);
        properties.push(Property {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    properties
}

/// Merge ordered fragments into one xcconfig document.
///
/// `fragments` must already be ordered lowest-to-highest precedence (plugin
/// enumeration order, the app's fragment last); a later fragment's value for
/// a key replaces an earlier one in place, so key order stays stable.
/// `defaults` fill in keys no fragment set, appended at the end.
///
/// An empty result is valid output: the caller still writes the file so a
/// baseline project reference resolves.
pub fn merge(fragments: &[ConfigFragment], defaults: &[(String, String)]) -> String {
    let mut merged: Vec<Property> = Vec::new();

    let mut ordered: Vec<&ConfigFragment> = fragments.iter().collect();
    ordered.sort_by_key(|f| f.rank);

    for fragment in ordered {
        for property in parse(&fragment.content) {
            match merged.iter_mut().find(|p| p.key == property.key) {
                Some(existing) => existing.value = property.value,
                None => merged.push(property),
            }
        }
    }

    for (key, value) in defaults {
        if !merged.iter().any(|p| p.key == *key) {
            merged.push(Property {
                key: key.clone(),
                value: value.clone(),
            });
        }
    }

    let mut out = String::new();
    for property in &merged {
        out.push_str(&property.key);
        out.push_str(" = ");
        out.push_str(&property.value);
        out.push('\n');
    }
    out
}

/// Merge fragments and write the result, one call per build configuration.
///
/// Writes only when the content differs from the file on disk; returns
/// whether a write happened. An empty merge still produces (an empty) file.
pub fn merge_to_file(
    fragments: &[ConfigFragment],
    defaults: &[(String, String)],
    target_path: &Path,
) -> Result<bool, XcconfigError> {
    let content = merge(fragments, defaults);
    let artifact = MergedArtifact::new(target_path, content);
    Ok(artifact.write_if_changed()?)
}

/// Read one property's value from an xcconfig file.
///
/// `None` when the file is absent or the key is absent or commented out.
pub fn read_property_value(path: &Path, key: &str) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    parse(&content)
        .into_iter()
        .rev()
        .find(|p| p.key == key)
        .map(|p| p.value)
}
