//! iOS platform collaborator
//!
//! Owns the signing-change rules: the change detector flags `signing_changed`
//! when the native project does not exist yet, when the project signs
//! automatically but an explicit profile or team was requested, or when
//! manual signing selects a different profile than the one requested.

use super::{NativeProject, PlatformData, PlatformKind, ProjectData};
use crate::changes::{ChangeError, PrepareConfig, ProjectChangesInfo};
use crate::state::PrepareInfo;

/// Signing style currently configured in the native project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningStyle {
    /// Xcode-managed signing, optionally pinned to a team
    Automatic { team_id: Option<String> },
    /// Manual signing with an explicitly selected provisioning profile
    Manual { profile_name: String },
}

/// Signing configuration read out of the native project by the caller.
///
/// Inspecting the Xcode project object graph is outside this core; the
/// preparation driver reads the current signing state and hands it in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSigning {
    pub style: SigningStyle,
}

/// The iOS platform collaborator
#[derive(Debug, Clone)]
pub struct IosProject {
    data: PlatformData,

    /// Signing state of the existing native project, `None` when the project
    /// has no signing configured (or does not exist)
    current_signing: Option<ProjectSigning>,
}

impl IosProject {
    pub fn new(data: PlatformData, current_signing: Option<ProjectSigning>) -> Self {
        Self {
            data,
            current_signing,
        }
    }

    /// True when the caller asked for explicit signing
    fn explicit_signing_requested(config: &PrepareConfig) -> bool {
        config.provision.is_some() || config.team_id.is_some()
    }

    fn signing_changed(&self, config: &PrepareConfig) -> bool {
        // No native project yet: everything, signing included, must be set up
        if !self.data.project_root.exists() {
            return true;
        }

        match &self.current_signing {
            None => Self::explicit_signing_requested(config),
            Some(signing) => match &signing.style {
                SigningStyle::Automatic { .. } => Self::explicit_signing_requested(config),
                SigningStyle::Manual { profile_name } => match &config.provision {
                    Some(requested) => profile_name != requested,
                    None => false,
                },
            },
        }
    }
}

impl NativeProject for IosProject {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Ios
    }

    fn check_for_changes(
        &self,
        info: &mut ProjectChangesInfo,
        config: &PrepareConfig,
        _project: &ProjectData,
        prepare_info: Option<&PrepareInfo>,
    ) -> Result<(), ChangeError> {
        if self.signing_changed(config) {
            log::debug!("ios: signing changed");
            info.signing_changed = true;
        }

        // A requested profile differing from the one recorded at the last
        // prepare also forces a rebuild, even if the project was never
        // reconfigured in between.
        if let (Some(requested), Some(prior)) = (&config.provision, prepare_info) {
            if let Some(uuid) = &prior.ios_provisioning_profile_uuid {
                if uuid != requested {
                    info.signing_changed = true;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform_data(root: &std::path::Path) -> PlatformData {
        PlatformData::new(PlatformKind::Ios, root, "build.xcconfig")
    }

    fn config_with_provision(provision: Option<&str>) -> PrepareConfig {
        PrepareConfig {
            provision: provision.map(str::to_string),
            team_id: None,
            release: false,
            bundle: false,
        }
    }

    #[test]
    fn test_missing_project_flags_signing() {
        let data = platform_data(std::path::Path::new("/nonexistent/platforms/ios"));
        let project = IosProject::new(data, None);
        assert!(project.signing_changed(&config_with_provision(None)));
    }

    #[test]
    fn test_automatic_signing_with_explicit_request() {
        let dir = tempfile::tempdir().unwrap();
        let project = IosProject::new(
            platform_data(dir.path()),
            Some(ProjectSigning {
                style: SigningStyle::Automatic { team_id: None },
            }),
        );

        assert!(project.signing_changed(&config_with_provision(Some("AdHoc Profile"))));
        assert!(!project.signing_changed(&config_with_provision(None)));
    }

    #[test]
    fn test_manual_signing_profile_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let project = IosProject::new(
            platform_data(dir.path()),
            Some(ProjectSigning {
                style: SigningStyle::Manual {
                    profile_name: "Dist Profile".to_string(),
                },
            }),
        );

        assert!(project.signing_changed(&config_with_provision(Some("Other Profile"))));
        assert!(!project.signing_changed(&config_with_provision(Some("Dist Profile"))));
        assert!(!project.signing_changed(&config_with_provision(None)));
    }

    #[test]
    fn test_no_signing_no_request_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let project = IosProject::new(platform_data(dir.path()), None);
        assert!(!project.signing_changed(&config_with_provision(None)));
        assert!(project.signing_changed(&config_with_provision(Some("Profile"))));
    }
}
