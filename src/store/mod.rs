//! Crash-safe persistence: atomic artifact writes and unit checkpoints.

pub mod atomic;
pub mod checkpoint;

pub use atomic::{
    StagedWrite, read_json, read_json_if_exists, remove_if_exists, stage_bytes, temp_path_for,
    write_bytes_atomic, write_json_atomic,
};
pub use checkpoint::{CheckpointEntry, CheckpointStore};
