//! Android platform collaborator
//!
//! Android carries no signing state in this core; its only platform-specific
//! signal is whether the native project tree exists at all. Gradle file
//! generation and the rest of the Android toolchain are external.

use super::{NativeProject, PlatformData, PlatformKind, ProjectData};
use crate::changes::{ChangeError, PrepareConfig, ProjectChangesInfo};
use crate::state::PrepareInfo;

/// The Android platform collaborator
#[derive(Debug, Clone)]
pub struct AndroidProject {
    data: PlatformData,
}

impl AndroidProject {
    pub fn new(data: PlatformData) -> Self {
        Self { data }
    }
}

impl NativeProject for AndroidProject {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Android
    }

    fn check_for_changes(
        &self,
        info: &mut ProjectChangesInfo,
        _config: &PrepareConfig,
        _project: &ProjectData,
        _prepare_info: Option<&PrepareInfo>,
    ) -> Result<(), ChangeError> {
        if !self.data.project_root.exists() {
            log::debug!("android: native project missing");
            info.native_changed = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_project_flags_native_change() {
        let data = PlatformData::new(
            PlatformKind::Android,
            "/nonexistent/platforms/android",
            "app.gradle",
        );
        let project = AndroidProject::new(data);

        let mut info = ProjectChangesInfo::default();
        let config = PrepareConfig::default();
        let project_data = ProjectData {
            project_name: "demo".to_string(),
            project_dir: "/nonexistent".into(),
            app_directory: "/nonexistent/app".into(),
        };

        project
            .check_for_changes(&mut info, &config, &project_data, None)
            .unwrap();
        assert!(info.native_changed);
    }
}
