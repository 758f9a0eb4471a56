//! Persisted per-platform prepare state
//!
//! One hidden JSON file per native platform directory records the outcome of
//! the last successful prepare. Absence of the file is the canonical
//! "never prepared" signal, never an error.

mod prepare_info;

pub use prepare_info::{
    prepare_info, prepare_info_file_path, save_prepare_info, set_native_platform_status,
    PrepareInfo, PrepareInfoError, PREPARE_INFO_FILE_NAME,
};

use serde::{Deserialize, Serialize};

/// Whether a platform's native tree must be created, regenerated, or is current.
///
/// Monotonic within one prepare cycle; regresses whenever inputs change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NativePlatformStatus {
    /// The native project tree does not exist and must be created
    RequiresPlatformAdd,
    /// The native project exists but its configuration is stale
    RequiresPrepare,
    /// The native project reflects the current inputs
    AlreadyPrepared,
}

impl NativePlatformStatus {
    /// True for the statuses that invalidate prior bookkeeping
    pub fn requires_work(&self) -> bool {
        matches!(
            self,
            NativePlatformStatus::RequiresPlatformAdd | NativePlatformStatus::RequiresPrepare
        )
    }
}
