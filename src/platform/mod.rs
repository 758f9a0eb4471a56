//! Platform model
//!
//! Identifies the target native platforms and the capability interface the
//! change detector consults. Each platform is a tagged variant behind the
//! [`NativeProject`] trait rather than an ad hoc structurally-typed object.

mod android;
mod ios;

pub use android::AndroidProject;
pub use ios::{IosProject, ProjectSigning, SigningStyle};

use std::path::PathBuf;

use crate::changes::{ChangeError, PrepareConfig, ProjectChangesInfo};
use crate::state::PrepareInfo;

/// Supported native platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    Ios,
    Android,
}

impl PlatformKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Ios => "ios",
            PlatformKind::Android => "android",
        }
    }
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target platform of a project
#[derive(Debug, Clone)]
pub struct PlatformData {
    /// Which platform this is
    pub kind: PlatformKind,

    /// Root of the platform's native project tree
    /// (e.g. `platforms/ios`, `platforms/android`)
    pub project_root: PathBuf,

    /// Name of the watched configuration file inside the project dir
    /// (e.g. `build.xcconfig`, `app.gradle`)
    pub config_file_name: String,
}

impl PlatformData {
    pub fn new(kind: PlatformKind, project_root: impl Into<PathBuf>, config_file_name: impl Into<String>) -> Self {
        Self {
            kind,
            project_root: project_root.into(),
            config_file_name: config_file_name.into(),
        }
    }
}

/// Project-level metadata shared by all platforms
#[derive(Debug, Clone)]
pub struct ProjectData {
    /// Project name, used for the Podfile target block
    pub project_name: String,

    /// Project root directory
    pub project_dir: PathBuf,

    /// App source directory, the root of the file-hash scan
    pub app_directory: PathBuf,
}

/// Platform capability interface consulted during change detection.
///
/// Implementations only set flags on the passed [`ProjectChangesInfo`]; they
/// never touch persisted state.
pub trait NativeProject {
    /// The platform this project drives
    fn kind(&self) -> PlatformKind;

    /// Fold platform-specific change signals into `info`.
    fn check_for_changes(
        &self,
        info: &mut ProjectChangesInfo,
        config: &PrepareConfig,
        project: &ProjectData,
        prepare_info: Option<&PrepareInfo>,
    ) -> Result<(), ChangeError>;
}
