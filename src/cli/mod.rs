//! CLI command handlers

pub mod commands;

pub use commands::{
    add_drift_level, move_fixed_camera, organize_phone_camera, rename_roaming_camera, run,
    write_template, Operation, RunOutcome, Services,
};
