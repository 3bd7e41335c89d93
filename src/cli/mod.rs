//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction, GalleryAction, LookArgs, StickerArg};
pub use commands::{
    handle_config_action, handle_gallery_action, list_cameras, load_config, place_sticker, snap,
    upload, CliError, ConsoleEvents, StdinConfirm,
};
pub use enums::{Filter, Frame};
