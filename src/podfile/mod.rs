//! Podfile assembly
//!
//! Maintains the single project Podfile from per-source blocks. Each
//! contributing source owns a delimited region inside one
//! `target "<project>" do … end` block; versioned `platform :ios` rows are
//! commented out in place and mirrored into trailing platform sections, one
//! per source, so the most recently applied section supplies the one live
//! platform directive. Add/replace/remove is keyed by source path and
//! idempotent; removing the last source deletes the Podfile.

pub mod hooks;

pub use hooks::{scan_hooks, HookBlock};

use regex_lite::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::merge::MergedArtifact;

/// Name of the generated file inside the native project root
pub const PODFILE_NAME: &str = "Podfile";

const END_MARKER: &str = "# End Podfile";
const PLATFORM_SECTION_END: &str = "# End NativeScriptPlatformSection";

fn begin_marker(source_path: &str) -> String {
    format!("# Begin Podfile - {source_path}")
}

fn platform_section_marker(source_path: &str, version: &str) -> String {
    format!("# NativeScriptPlatformSection {source_path} with {version}")
}

fn platform_section_prefix(source_path: &str) -> String {
    format!("# NativeScriptPlatformSection {source_path} with ")
}

/// Errors from Podfile assembly
#[derive(Debug, thiserror::Error)]
pub enum PodfileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed Podfile {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// One source's contribution to the merged Podfile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodfileBlock {
    /// Source the block came from, used as the region key
    pub source_path: String,

    /// Fragment body with platform rows commented out
    pub body: String,

    /// Version captured from the fragment's `platform :ios` row, if any
    pub platform_version: Option<String>,
}

impl PodfileBlock {
    /// Prepare one fragment for merging: comment out `platform :ios` rows in
    /// place and capture the declared version for the trailing section.
    pub fn prepare(source_path: &str, content: &str) -> Self {
        let platform_row =
            Regex::new(r#"^\s*platform\s+:ios\b(?:\s*,\s*['"]([^'"]+)['"])?"#).expect("platform regex");

        let mut platform_version = None;
        let mut body_lines = Vec::new();
        for line in content.lines() {
            match platform_row.captures(line) {
                Some(captures) => {
                    if let Some(version) = captures.get(1) {
                        platform_version = Some(version.as_str().to_string());
                    }
                    body_lines.push(format!("# {line}"));
                }
                None => body_lines.push(line.to_string()),
            }
        }

        Self {
            source_path: source_path.to_string(),
            body: body_lines.join("\n"),
            platform_version,
        }
    }

    fn region_lines(&self) -> Vec<String> {
        let mut lines = vec![begin_marker(&self.source_path)];
        lines.extend(self.body.lines().map(String::from));
        lines.push(END_MARKER.to_string());
        lines
    }
}

/// Assembles and maintains the project Podfile
#[derive(Debug, Clone)]
pub struct PodfileMerger {
    podfile_path: PathBuf,
    project_name: String,
}

impl PodfileMerger {
    pub fn new(native_root: &Path, project_name: impl Into<String>) -> Self {
        Self {
            podfile_path: native_root.join(PODFILE_NAME),
            project_name: project_name.into(),
        }
    }

    pub fn podfile_path(&self) -> &Path {
        &self.podfile_path
    }

    fn target_header(&self) -> String {
        format!("target \"{}\" do", self.project_name)
    }

    fn skeleton(&self) -> String {
        format!("use_frameworks!\n\n{}\nend", self.target_header())
    }

    /// Add or replace one source's contribution.
    ///
    /// Re-running with unchanged content reproduces byte-identical output and
    /// performs no write. Hook normalization runs over the assembled file
    /// after its previous pass has been unwound, so numbering always starts
    /// fresh.
    pub fn apply_podfile(&self, source_path: &str, content: &str) -> Result<(), PodfileError> {
        let block = PodfileBlock::prepare(source_path, content);

        let assembled = match fs::read_to_string(&self.podfile_path) {
            Ok(existing) => hooks::denormalize(&existing),
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.skeleton(),
            Err(e) => return Err(e.into()),
        };

        let mut lines: Vec<String> = assembled.lines().map(String::from).collect();
        self.replace_or_insert_region(&mut lines, &block)?;
        self.update_platform_section(&mut lines, &block);

        self.write(lines)?;
        Ok(())
    }

    /// Remove one source's contribution. Deletes the Podfile when no regions
    /// remain; missing Podfile or unknown source are no-ops.
    pub fn remove_podfile(&self, source_path: &str) -> Result<(), PodfileError> {
        let existing = match fs::read_to_string(&self.podfile_path) {
            Ok(existing) => existing,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        let assembled = hooks::denormalize(&existing);
        let mut lines: Vec<String> = assembled.lines().map(String::from).collect();

        if let Some((start, end)) = self.find_region(&lines, source_path)? {
            lines.drain(start..=end);
        }
        remove_platform_section(&mut lines, source_path);

        let any_region_left = lines.iter().any(|l| l.starts_with("# Begin Podfile - "));
        if !any_region_left {
            log::info!("no Podfile sources remain, deleting {}", self.podfile_path.display());
            MergedArtifact::new(&self.podfile_path, String::new()).delete()?;
            return Ok(());
        }

        self.write(lines)?;
        Ok(())
    }

    fn write(&self, lines: Vec<String>) -> Result<(), PodfileError> {
        let mut assembled = lines.join("\n");
        assembled.push('\n');
        let normalized = hooks::normalize(&assembled);
        MergedArtifact::new(&self.podfile_path, normalized).write_if_changed()?;
        Ok(())
    }

    fn find_region(
        &self,
        lines: &[String],
        source_path: &str,
    ) -> Result<Option<(usize, usize)>, PodfileError> {
        let marker = begin_marker(source_path);
        let Some(start) = lines.iter().position(|l| *l == marker) else {
            return Ok(None);
        };
        let end = lines[start..]
            .iter()
            .position(|l| *l == END_MARKER)
            .map(|offset| start + offset)
            .ok_or_else(|| PodfileError::Malformed {
                path: self.podfile_path.clone(),
                message: format!("unterminated region for {source_path}"),
            })?;
        Ok(Some((start, end)))
    }

    fn replace_or_insert_region(
        &self,
        lines: &mut Vec<String>,
        block: &PodfileBlock,
    ) -> Result<(), PodfileError> {
        let region = block.region_lines();
        if let Some((start, end)) = self.find_region(lines, &block.source_path)? {
            lines.splice(start..=end, region);
            return Ok(());
        }

        let header = self.target_header();
        let header_idx = lines.iter().position(|l| *l == header).ok_or_else(|| {
            PodfileError::Malformed {
                path: self.podfile_path.clone(),
                message: format!("missing {header:?} block"),
            }
        })?;
        lines.splice(header_idx + 1..header_idx + 1, region);
        Ok(())
    }

    fn update_platform_section(&self, lines: &mut Vec<String>, block: &PodfileBlock) {
        let section = block.platform_version.as_ref().map(|version| {
            vec![
                platform_section_marker(&block.source_path, version),
                format!("platform :ios, '{version}'"),
                PLATFORM_SECTION_END.to_string(),
            ]
        });

        let prefix = platform_section_prefix(&block.source_path);
        let existing = lines.iter().position(|l| l.starts_with(&prefix)).and_then(|start| {
            lines[start..]
                .iter()
                .position(|l| *l == PLATFORM_SECTION_END)
                .map(|offset| (start, start + offset))
        });

        match (existing, section) {
            (Some((start, end)), Some(section)) => {
                lines.splice(start..=end, section);
            }
            (Some(_), None) => remove_platform_section(lines, &block.source_path),
            (None, Some(section)) => {
                lines.push(String::new());
                lines.extend(section);
            }
            (None, None) => {}
        }
    }
}

/// Drop a source's platform section together with its separator blank line.
fn remove_platform_section(lines: &mut Vec<String>, source_path: &str) {
    let prefix = platform_section_prefix(source_path);
    let Some(mut start) = lines.iter().position(|l| l.starts_with(&prefix)) else {
        return;
    };
    let Some(end) = lines[start..]
        .iter()
        .position(|l| *l == PLATFORM_SECTION_END)
        .map(|offset| start + offset)
    else {
        return;
    };
    let blank_before = start > 0 && lines[start - 1].trim().is_empty();
    if blank_before {
        start -= 1;
    }
    lines.drain(start..=end);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merger(dir: &Path) -> PodfileMerger {
        PodfileMerger::new(dir, "testProject")
    }

    #[test]
    fn test_prepare_comments_platform_row() {
        let block = PodfileBlock::prepare("p/Podfile", "platform :ios, '8.1'\npod 'GoogleMaps'\n");
        assert_eq!(block.platform_version.as_deref(), Some("8.1"));
        assert_eq!(block.body, "# platform :ios, '8.1'\npod 'GoogleMaps'");
    }

    #[test]
    fn test_prepare_unversioned_platform_row() {
        let block = PodfileBlock::prepare("p/Podfile", "platform :ios\npod 'A'\n");
        assert_eq!(block.platform_version, None);
        assert!(block.body.starts_with("# platform :ios"));
    }

    #[test]
    fn test_first_apply_creates_podfile() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());

        merger
            .apply_podfile("plugin1/Podfile", "platform :ios, '8.1'\npod 'GoogleMaps'\n")
            .unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        let expected = "\
use_frameworks!

target \"testProject\" do
# Begin Podfile - plugin1/Podfile
# platform :ios, '8.1'
pod 'GoogleMaps'
# End Podfile
end

# NativeScriptPlatformSection plugin1/Podfile with 8.1
platform :ios, '8.1'
# End NativeScriptPlatformSection
";
        assert_eq!(content, expected);
    }

    #[test]
    fn test_reapply_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        let fragment = "platform :ios, '8.1'\npod 'GoogleMaps'\n";

        merger.apply_podfile("plugin1/Podfile", fragment).unwrap();
        let first = fs::read_to_string(merger.podfile_path()).unwrap();

        merger.apply_podfile("plugin1/Podfile", fragment).unwrap();
        let second = fs::read_to_string(merger.podfile_path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_replace_updates_only_that_region() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger.apply_podfile("a/Podfile", "pod 'A'\n").unwrap();
        merger.apply_podfile("b/Podfile", "pod 'B'\n").unwrap();

        merger.apply_podfile("a/Podfile", "pod 'A', '~> 2.0'\n").unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        assert!(content.contains("pod 'A', '~> 2.0'"));
        assert!(!content.contains("pod 'A'\n# End"));
        assert!(content.contains("pod 'B'"));
    }

    #[test]
    fn test_remove_last_source_deletes_podfile() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger.apply_podfile("a/Podfile", "platform :ios, '8.1'\npod 'A'\n").unwrap();

        merger.remove_podfile("a/Podfile").unwrap();
        assert!(!merger.podfile_path().exists());
    }

    #[test]
    fn test_remove_one_of_two_keeps_other() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger.apply_podfile("a/Podfile", "pod 'A'\n").unwrap();
        merger.apply_podfile("b/Podfile", "platform :ios, '9.0'\npod 'B'\n").unwrap();

        merger.remove_podfile("b/Podfile").unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        assert!(content.contains("pod 'A'"));
        assert!(!content.contains("pod 'B'"));
        assert!(!content.contains("NativeScriptPlatformSection b/Podfile"));
    }

    #[test]
    fn test_remove_missing_source_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        assert!(merger.remove_podfile("ghost/Podfile").is_ok());

        merger.apply_podfile("a/Podfile", "pod 'A'\n").unwrap();
        let before = fs::read_to_string(merger.podfile_path()).unwrap();
        merger.remove_podfile("ghost/Podfile").unwrap();
        assert_eq!(fs::read_to_string(merger.podfile_path()).unwrap(), before);
    }

    #[test]
    fn test_latest_platform_section_is_last() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger.apply_podfile("a/Podfile", "platform :ios, '8.1'\n").unwrap();
        merger.apply_podfile("b/Podfile", "platform :ios, '9.0'\n").unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        let a_pos = content.find("NativeScriptPlatformSection a/Podfile").unwrap();
        let b_pos = content.find("NativeScriptPlatformSection b/Podfile").unwrap();
        assert!(a_pos < b_pos);
        // Last live platform row carries b's version
        let last_platform = content.rfind("platform :ios, ").unwrap();
        assert_eq!(&content[last_platform..last_platform + 20], "platform :ios, '9.0'");
    }

    #[test]
    fn test_dropping_platform_row_drops_section() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger.apply_podfile("a/Podfile", "platform :ios, '8.1'\npod 'A'\n").unwrap();

        merger.apply_podfile("a/Podfile", "pod 'A'\n").unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        assert!(!content.contains("NativeScriptPlatformSection"));
    }

    #[test]
    fn test_hooks_from_two_sources_are_merged() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        merger
            .apply_podfile("a/Podfile", "pod 'A'\npost_install do |installer|\n  puts 'a'\nend\n")
            .unwrap();
        merger
            .apply_podfile("b/Podfile", "pod 'B'\npost_install do\n  puts 'b'\nend\n")
            .unwrap();

        let content = fs::read_to_string(merger.podfile_path()).unwrap();
        assert!(content.contains("def post_install1(installer)"));
        assert!(content.contains("def post_install2"));
        assert_eq!(scan_hooks(&content, "post_install").len(), 1);
    }

    #[test]
    fn test_hook_merge_survives_reapply() {
        let dir = tempfile::tempdir().unwrap();
        let merger = merger(dir.path());
        let a = "pod 'A'\npost_install do |installer|\n  puts 'a'\nend\n";
        let b = "pod 'B'\npost_install do\n  puts 'b'\nend\n";
        merger.apply_podfile("a/Podfile", a).unwrap();
        merger.apply_podfile("b/Podfile", b).unwrap();
        let first = fs::read_to_string(merger.podfile_path()).unwrap();

        merger.apply_podfile("a/Podfile", a).unwrap();
        merger.apply_podfile("b/Podfile", b).unwrap();
        let second = fs::read_to_string(merger.podfile_path()).unwrap();

        assert_eq!(first, second);
    }
}
