//! Change detection
//!
//! Aggregates file-hash deltas and platform-specific signals into one
//! [`ProjectChangesInfo`] verdict per platform. Detection is pure: persisting
//! the resulting state is the store's job, after regeneration succeeds.

mod hashes;

pub use hashes::{FileHasher, Sha256FileHasher};

use std::io;

use crate::platform::{NativeProject, PlatformData, ProjectData};
use crate::state::{self, NativePlatformStatus, PrepareInfo};

/// Requested prepare options, compared against the stored record
#[derive(Debug, Clone, Default)]
pub struct PrepareConfig {
    /// Requested provisioning profile (name or UUID)
    pub provision: Option<String>,

    /// Requested development team
    pub team_id: Option<String>,

    /// Release configuration requested
    pub release: bool,

    /// Bundling requested
    pub bundle: bool,
}

/// Transient change verdict for one platform, produced by one detection pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectChangesInfo {
    /// Some app source file was added, edited, or removed
    pub app_files_changed: bool,

    /// The watched configuration file changed
    pub config_changed: bool,

    /// Installed package set changed
    pub packages_changed: bool,

    /// Code-signing setup differs from what was requested
    pub signing_changed: bool,

    /// The native project itself (or build mode) changed
    pub native_changed: bool,

    /// Status the platform should move to as a result of this pass
    pub native_platform_status: Option<NativePlatformStatus>,
}

impl ProjectChangesInfo {
    /// Whether anything at all changed
    pub fn has_changes(&self) -> bool {
        self.app_files_changed
            || self.config_changed
            || self.packages_changed
            || self.signing_changed
            || self.native_changed
    }

    /// Whether the changes invalidate the last native build, not just the
    /// prepared sources
    pub fn changes_require_build(&self) -> bool {
        self.config_changed || self.signing_changed || self.native_changed
    }
}

/// Errors surfaced while computing a change verdict
#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("directory walk failed: {0}")]
    Walk(String),
}

/// Computes a change verdict for one platform
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    pub fn new() -> Self {
        Self
    }

    /// Run one detection pass.
    ///
    /// With no persisted record the platform was never prepared; everything
    /// is considered changed and the status is `RequiresPlatformAdd`.
    /// Otherwise the platform collaborator folds in its own signals, then
    /// the watched config file, the requested build options, and the app
    /// file hashes are compared against the stored record.
    pub fn check_for_changes(
        &self,
        native_project: &dyn NativeProject,
        platform: &PlatformData,
        project: &ProjectData,
        config: &PrepareConfig,
        hasher: &dyn FileHasher,
    ) -> Result<ProjectChangesInfo, ChangeError> {
        let mut info = ProjectChangesInfo::default();

        let prepare_info = state::prepare_info(platform);
        let Some(prior) = prepare_info else {
            log::debug!("{}: never prepared", platform.kind);
            info.app_files_changed = true;
            info.config_changed = true;
            info.native_changed = true;
            info.native_platform_status = Some(NativePlatformStatus::RequiresPlatformAdd);
            return Ok(info);
        };

        native_project.check_for_changes(&mut info, config, project, Some(&prior))?;

        if self.config_file_changed(platform, &prior)? {
            info.config_changed = true;
        }

        if config.release != prior.release || config.bundle != prior.bundle {
            log::debug!("{}: build options changed", platform.kind);
            info.native_changed = true;
        }

        let current = hasher.generate_hashes(&project.app_directory)?;
        let changed = hasher.changed_paths(&current, &prior.app_files_hashes);
        if !changed.is_empty() {
            log::debug!("{}: {} app file(s) changed", platform.kind, changed.len());
            info.app_files_changed = true;
        }

        info.native_platform_status = Some(if info.has_changes() {
            NativePlatformStatus::RequiresPrepare
        } else {
            NativePlatformStatus::AlreadyPrepared
        });

        Ok(info)
    }

    fn config_file_changed(
        &self,
        platform: &PlatformData,
        prior: &PrepareInfo,
    ) -> Result<bool, ChangeError> {
        let path = platform.project_root.join(&platform.config_file_name);
        if !path.exists() {
            // Nothing to watch; only a previously recorded hash counts as a change
            return Ok(prior.project_file_hash.is_some());
        }
        let hash = Sha256FileHasher::hash_file(&path)?;
        Ok(prior.project_file_hash.as_deref() != Some(hash.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{AndroidProject, PlatformKind};
    use crate::state::{save_prepare_info, PrepareInfo};
    use std::collections::BTreeMap;
    use std::fs;

    fn setup(dir: &std::path::Path) -> (PlatformData, ProjectData) {
        let platform = PlatformData::new(PlatformKind::Android, dir.join("platforms/android"), "app.gradle");
        fs::create_dir_all(&platform.project_root).unwrap();
        let app_dir = dir.join("app");
        fs::create_dir_all(&app_dir).unwrap();
        let project = ProjectData {
            project_name: "demo".to_string(),
            project_dir: dir.to_path_buf(),
            app_directory: app_dir,
        };
        (platform, project)
    }

    fn prepared_record(platform: &PlatformData, project: &ProjectData) -> PrepareInfo {
        let hashes = Sha256FileHasher.generate_hashes(&project.app_directory).unwrap();
        let mut info = PrepareInfo::with_status(NativePlatformStatus::AlreadyPrepared);
        info.app_files_hashes = hashes;
        let config_path = platform.project_root.join(&platform.config_file_name);
        if config_path.exists() {
            info.project_file_hash = Some(Sha256FileHasher::hash_file(&config_path).unwrap());
        }
        info
    }

    #[test]
    fn test_never_prepared_requires_platform_add() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        let native = AndroidProject::new(platform.clone());

        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &Sha256FileHasher)
            .unwrap();

        assert!(info.has_changes());
        assert_eq!(
            info.native_platform_status,
            Some(NativePlatformStatus::RequiresPlatformAdd)
        );
    }

    #[test]
    fn test_unchanged_project_is_already_prepared() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        fs::write(project.app_directory.join("main.js"), "app").unwrap();
        save_prepare_info(&platform, &prepared_record(&platform, &project)).unwrap();
        let native = AndroidProject::new(platform.clone());

        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &Sha256FileHasher)
            .unwrap();

        assert!(!info.has_changes());
        assert_eq!(
            info.native_platform_status,
            Some(NativePlatformStatus::AlreadyPrepared)
        );
    }

    #[test]
    fn test_edited_app_file_requires_prepare() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        fs::write(project.app_directory.join("main.js"), "app").unwrap();
        save_prepare_info(&platform, &prepared_record(&platform, &project)).unwrap();
        let native = AndroidProject::new(platform.clone());

        fs::write(project.app_directory.join("main.js"), "app v2").unwrap();

        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &Sha256FileHasher)
            .unwrap();

        assert!(info.app_files_changed);
        assert_eq!(
            info.native_platform_status,
            Some(NativePlatformStatus::RequiresPrepare)
        );
    }

    #[test]
    fn test_config_file_change_requires_build() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        fs::write(platform.project_root.join("app.gradle"), "android {}").unwrap();
        save_prepare_info(&platform, &prepared_record(&platform, &project)).unwrap();
        let native = AndroidProject::new(platform.clone());

        fs::write(platform.project_root.join("app.gradle"), "android { v2 }").unwrap();

        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &Sha256FileHasher)
            .unwrap();

        assert!(info.config_changed);
        assert!(info.changes_require_build());
    }

    #[test]
    fn test_release_flip_is_native_change() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        save_prepare_info(&platform, &prepared_record(&platform, &project)).unwrap();
        let native = AndroidProject::new(platform.clone());

        let config = PrepareConfig {
            release: true,
            ..PrepareConfig::default()
        };
        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &config, &Sha256FileHasher)
            .unwrap();

        assert!(info.native_changed);
        assert!(info.changes_require_build());
    }

    #[test]
    fn test_detection_does_not_mutate_store() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        let record = prepared_record(&platform, &project);
        save_prepare_info(&platform, &record).unwrap();
        let native = AndroidProject::new(platform.clone());

        fs::write(project.app_directory.join("new.js"), "x").unwrap();
        ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &Sha256FileHasher)
            .unwrap();

        // Store still holds the old record
        assert_eq!(state::prepare_info(&platform).unwrap(), record);
    }

    /// Hasher double: reports fixed hashes without touching disk
    struct FixedHasher(BTreeMap<String, String>);

    impl FileHasher for FixedHasher {
        fn generate_hashes(&self, _root: &std::path::Path) -> Result<BTreeMap<String, String>, ChangeError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_hasher_is_a_pluggable_collaborator() {
        let dir = tempfile::tempdir().unwrap();
        let (platform, project) = setup(dir.path());
        save_prepare_info(&platform, &prepared_record(&platform, &project)).unwrap();
        let native = AndroidProject::new(platform.clone());

        let mut fixed = BTreeMap::new();
        fixed.insert("injected.js".to_string(), "hash".to_string());
        let info = ChangeDetector::new()
            .check_for_changes(&native, &platform, &project, &PrepareConfig::default(), &FixedHasher(fixed))
            .unwrap();

        assert!(info.app_files_changed);
    }
}
