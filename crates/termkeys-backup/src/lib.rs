//! Save/restore primitives for state a test temporarily takes over:
//! filesystem paths and an external resource database.

mod backup_set;
mod error;
mod fs_utils;
mod path_backup;
mod resource_store;

pub use backup_set::{BackupAttempt, BackupSet};
pub use error::{BackupError, StoreError};
pub use fs_utils::{remove_path_if_exists, resolve_target_path};
pub use path_backup::{PathBackup, BACKUP_SUFFIX};
pub use resource_store::{ResourceStore, ResourceStoreSnapshot, XrdbStore};
