//! Prepare-info persistence
//!
//! The `.nsprepareinfo` file inside a platform's native root. Field names on
//! disk match the historical format so existing projects keep their state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::NativePlatformStatus;
use crate::platform::PlatformData;

/// Hidden file name inside the native project root
pub const PREPARE_INFO_FILE_NAME: &str = ".nsprepareinfo";

/// Record of the last successful prepare for one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareInfo {
    /// When the prepare completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<Utc>>,

    /// Whether the prepare ran with bundling enabled
    #[serde(default)]
    pub bundle: bool,

    /// Whether the prepare ran in release configuration
    #[serde(default)]
    pub release: bool,

    /// Status of the native project tree
    pub native_platform_status: NativePlatformStatus,

    /// Hash of every app source file at the last prepare, path → hex sha256
    #[serde(default)]
    pub app_files_hashes: BTreeMap<String, String>,

    /// Hash of the watched configuration file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_file_hash: Option<String>,

    /// Provisioning profile the iOS project was signed with
    #[serde(rename = "iOSProvisioningProfileUUID", skip_serializing_if = "Option::is_none")]
    pub ios_provisioning_profile_uuid: Option<String>,

    /// Whether the detected changes require a native rebuild
    #[serde(default)]
    pub changes_require_build: bool,

    /// When `changes_require_build` was last raised
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changes_require_build_time: Option<DateTime<Utc>>,
}

impl PrepareInfo {
    /// A record carrying only a status, with no bookkeeping
    pub fn with_status(status: NativePlatformStatus) -> Self {
        Self {
            time: None,
            bundle: false,
            release: false,
            native_platform_status: status,
            app_files_hashes: BTreeMap::new(),
            project_file_hash: None,
            ios_provisioning_profile_uuid: None,
            changes_require_build: false,
            changes_require_build_time: None,
        }
    }
}

/// Errors from prepare-info writes. Reads never fail, see [`prepare_info`].
#[derive(Debug, thiserror::Error)]
pub enum PrepareInfoError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deterministic path of the prepare-info file for a platform
pub fn prepare_info_file_path(platform: &PlatformData) -> PathBuf {
    platform.project_root.join(PREPARE_INFO_FILE_NAME)
}

/// Read the persisted record, or `None` when it is missing or unreadable.
///
/// An unparsable file is treated the same as a missing one: the next cycle
/// recomputes from scratch instead of trusting partial state.
pub fn prepare_info(platform: &PlatformData) -> Option<PrepareInfo> {
    let path = prepare_info_file_path(platform);
    let json = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&json) {
        Ok(info) => Some(info),
        Err(e) => {
            log::warn!("ignoring unreadable {}: {}", path.display(), e);
            None
        }
    }
}

/// Persist a status change.
///
/// `AlreadyPrepared` on top of an existing record updates only the status so
/// the stored hashes keep future diffing incremental. `RequiresPlatformAdd`
/// and `RequiresPrepare` discard all prior bookkeeping, forcing a full
/// recompute on the next pass.
pub fn set_native_platform_status(
    platform: &PlatformData,
    status: NativePlatformStatus,
) -> Result<(), PrepareInfoError> {
    let info = match prepare_info(platform) {
        Some(mut existing) if status == NativePlatformStatus::AlreadyPrepared => {
            existing.native_platform_status = status;
            existing
        }
        _ => PrepareInfo::with_status(status),
    };
    save_prepare_info(platform, &info)
}

/// Overwrite the record with a freshly computed one (write-then-rename).
pub fn save_prepare_info(platform: &PlatformData, info: &PrepareInfo) -> Result<(), PrepareInfoError> {
    let path = prepare_info_file_path(platform);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(info)?;

    // Write to temp file first, then atomic rename
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &json)?;
    fs::rename(&temp_path, &path)?;

    log::debug!("saved prepare info for {}", platform.kind);
    Ok(())
}
