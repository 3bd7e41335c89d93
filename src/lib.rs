//! photobooth library crate.
//!
//! A countdown photobooth: live camera stream, filters and frames, draggable
//! stickers, PNG export, and a small persisted gallery.

pub mod booth;
pub mod camera;
pub mod cli;
pub mod config;
pub mod gallery;
pub mod raster;
