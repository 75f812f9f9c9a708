//! Shared infrastructure utilities for rotask.
//!
//! - **`atomic_write`**: crash-safe replacement of result files (temp + rename)

pub mod atomic_write;

pub use atomic_write::{
    Durability, atomic_write, atomic_write_with, backup_path, recover_bak_file,
};
