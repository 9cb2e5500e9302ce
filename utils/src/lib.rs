//! Shared infrastructure utilities for Yuri.
//!
//! - **`atomic_write`**: Crash-safe file replacement (temp + rename)

pub mod atomic_write;

pub use atomic_write::{
    AtomicWriteOptions, FileSyncPolicy, ParentDirSyncPolicy, atomic_write_with_options,
    recover_bak_file,
};
