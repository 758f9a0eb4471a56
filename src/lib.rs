//! native-prepare - Native-project synthesis and change tracking
//!
//! This crate implements the synthesis core of a cross-platform mobile build
//! tool: it decides whether a platform's on-disk native project is stale
//! relative to the app's source, plugins, and configuration, and when
//! regeneration is required it deterministically merges the native
//! configuration artifacts (Podfile, xcconfig overrides, entitlements).
//!
//! The external preparation driver runs one strict sequence per platform:
//! compute a [`changes::ProjectChangesInfo`], regenerate merged artifacts
//! through the three mergers, then persist the new [`state::PrepareInfo`].
//! A crash in between leaves the persisted record stale or absent, which the
//! next invocation treats as "needs work".

pub mod changes;
pub mod entitlements;
pub mod merge;
pub mod platform;
pub mod podfile;
pub mod state;
pub mod xcconfig;

pub use changes::{ChangeDetector, FileHasher, PrepareConfig, ProjectChangesInfo, Sha256FileHasher};
pub use merge::{ConfigFragment, FragmentRank, MergedArtifact};
pub use platform::{
    AndroidProject, IosProject, NativeProject, PlatformData, PlatformKind, ProjectData,
    ProjectSigning, SigningStyle,
};
pub use podfile::{HookBlock, PodfileBlock, PodfileMerger};
pub use state::{NativePlatformStatus, PrepareInfo};
