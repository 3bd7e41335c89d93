//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::{Filter, Frame};
use crate::gallery::PhotoId;
use crate::raster::Point;

/// Birthday photobooth: countdown capture, filters, frames, and stickers
#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(version, about = "Birthday photobooth for the terminal", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Count down, take a photo, and export it
    Snap {
        /// Camera device index (overrides the config file)
        #[arg(long)]
        camera: Option<u32>,

        /// Use an image file as a virtual camera
        #[arg(long, value_name = "IMAGE")]
        virtual_camera: Option<PathBuf>,

        #[command(flatten)]
        look: LookArgs,

        /// Skip the countdown and shutter beeps
        #[arg(long)]
        no_sound: bool,
    },
    /// Load an image file as the photo and export it
    Upload {
        /// Image to load (PNG, JPEG, GIF, WebP, or BMP)
        path: PathBuf,

        #[command(flatten)]
        look: LookArgs,
    },
    /// Browse the saved photos
    Gallery {
        #[command(subcommand)]
        action: GalleryAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// How the photo is decorated and where the export goes.
#[derive(clap::Args, Debug, Clone)]
pub struct LookArgs {
    /// Color filter
    #[arg(long, short, default_value = "none")]
    pub filter: Filter,

    /// Frame decoration
    #[arg(long, default_value = "none")]
    pub frame: Frame,

    /// Place a sticker: GLYPH, or GLYPH@X,Y for a top-left offset on the
    /// overlay (repeatable)
    #[arg(long, short, value_parser = parse_sticker)]
    pub sticker: Vec<StickerArg>,

    /// Export directory (overrides the config file)
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Save to the gallery without exporting
    #[arg(long)]
    pub no_export: bool,
}

/// A sticker requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct StickerArg {
    pub glyph: String,
    /// Where to drag it; `None` leaves it centered
    pub at: Option<Point>,
}

/// Parse `GLYPH` or `GLYPH@X,Y`
fn parse_sticker(s: &str) -> Result<StickerArg, String> {
    let (glyph, at) = match s.rsplit_once('@') {
        Some((glyph, pos)) => {
            let (x, y) = pos
                .split_once(',')
                .ok_or_else(|| format!("Invalid sticker position '{}'. Use X,Y (e.g., 40,60)", pos))?;
            let x: f32 = x
                .trim()
                .parse()
                .map_err(|_| format!("Invalid x '{}' in sticker position", x))?;
            let y: f32 = y
                .trim()
                .parse()
                .map_err(|_| format!("Invalid y '{}' in sticker position", y))?;
            (glyph, Some(Point::new(x, y)))
        }
        None => (s, None),
    };
    if glyph.is_empty() {
        return Err("Sticker glyph must not be empty".to_string());
    }
    Ok(StickerArg {
        glyph: glyph.to_string(),
        at,
    })
}

#[derive(Subcommand, Debug, Clone)]
pub enum GalleryAction {
    /// List saved photos, newest first
    List,
    /// Show details of one photo
    Show { id: PhotoId },
    /// Write a photo's stored image to a file
    Download {
        id: PhotoId,
        /// Target directory (overrides the config file)
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Delete a photo
    Delete {
        id: PhotoId,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
    /// Render every photo into one contact sheet PNG
    Sheet {
        /// Output file
        #[arg(long, short, default_value = "contact-sheet.png")]
        out: PathBuf,
        /// Thumbnails per row
        #[arg(long, default_value = "4")]
        columns: u32,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_defaults() {
        let args = Args::parse_from(["photobooth", "snap"]);
        assert!(args.config.is_none());
        match args.command {
            Command::Snap {
                camera,
                virtual_camera,
                look,
                no_sound,
            } => {
                assert!(camera.is_none());
                assert!(virtual_camera.is_none());
                assert_eq!(look.filter, Filter::None);
                assert_eq!(look.frame, Frame::None);
                assert!(look.sticker.is_empty());
                assert!(look.out.is_none());
                assert!(!look.no_export);
                assert!(!no_sound);
            }
            other => panic!("Expected snap, got {:?}", other),
        }
    }

    #[test]
    fn test_snap_look_options() {
        let args = Args::parse_from([
            "photobooth",
            "snap",
            "--filter",
            "sepia",
            "--frame",
            "birthday",
            "-s",
            "🎈",
            "--sticker",
            "🎂@40,60.5",
            "--out",
            "/tmp/out",
        ]);
        let Command::Snap { look, .. } = args.command else {
            panic!("Expected snap");
        };
        assert_eq!(look.filter, Filter::Sepia);
        assert_eq!(look.frame, Frame::Birthday);
        assert_eq!(
            look.sticker,
            vec![
                StickerArg {
                    glyph: "🎈".to_string(),
                    at: None
                },
                StickerArg {
                    glyph: "🎂".to_string(),
                    at: Some(Point::new(40.0, 60.5))
                },
            ]
        );
        assert_eq!(look.out, Some(PathBuf::from("/tmp/out")));
    }

    #[test]
    fn test_parse_sticker_invalid() {
        assert!(parse_sticker("@1,2").is_err());
        assert!(parse_sticker("🎈@12").is_err());
        assert!(parse_sticker("🎈@a,2").is_err());
        assert!(parse_sticker("").is_err());
    }

    #[test]
    fn test_upload_requires_path() {
        assert!(Args::try_parse_from(["photobooth", "upload"]).is_err());
        let args = Args::parse_from(["photobooth", "upload", "face.jpg", "--no-export"]);
        match args.command {
            Command::Upload { path, look } => {
                assert_eq!(path, PathBuf::from("face.jpg"));
                assert!(look.no_export);
            }
            other => panic!("Expected upload, got {:?}", other),
        }
    }

    #[test]
    fn test_gallery_subcommands() {
        let args = Args::parse_from(["photobooth", "gallery", "delete", "17", "--yes"]);
        assert!(matches!(
            args.command,
            Command::Gallery {
                action: GalleryAction::Delete { id: 17, yes: true }
            }
        ));

        let args = Args::parse_from(["photobooth", "gallery", "sheet"]);
        match args.command {
            Command::Gallery {
                action: GalleryAction::Sheet { out, columns },
            } => {
                assert_eq!(out, PathBuf::from("contact-sheet.png"));
                assert_eq!(columns, 4);
            }
            other => panic!("Expected gallery sheet, got {:?}", other),
        }
    }

    #[test]
    fn test_global_config_option() {
        let args = Args::parse_from(["photobooth", "gallery", "list", "-c", "/tmp/test.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/test.toml")));
    }

    #[test]
    fn test_list_cameras_subcommand() {
        let args = Args::parse_from(["photobooth", "list-cameras"]);
        assert!(matches!(args.command, Command::ListCameras));
    }

    #[test]
    fn test_config_subcommands() {
        let args = Args::parse_from(["photobooth", "config", "show"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Show
            }
        ));
        let args = Args::parse_from(["photobooth", "config", "init"]);
        assert!(matches!(
            args.command,
            Command::Config {
                action: ConfigAction::Init
            }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["photobooth"]).is_err());
    }
}
