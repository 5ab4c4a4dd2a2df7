use std::path::PathBuf;

use clap::Parser;

/// Detection viewer - shows an image with labeled bounding boxes on top
#[derive(Parser, Debug)]
#[command(name = "detection-viewer", version)]
#[command(about = "Displays an image with detection boxes and text labels")]
pub struct Args {
    /// Image to display (png, jpeg or bmp); omitted shows overlays only
    pub image: Option<PathBuf>,

    /// TrueType font used for labels (default: first installed system font found)
    #[arg(long)]
    pub font: Option<PathBuf>,

    /// JSON file with detections; reloaded when it changes
    #[arg(long)]
    pub detections: Option<PathBuf>,

    /// Add the three built-in demo detections
    #[arg(long)]
    pub demo: bool,

    /// Append the score to each label
    #[arg(long)]
    pub scores: bool,

    /// Draw the elapsed time in seconds
    #[arg(long)]
    pub show_clock: bool,

    /// Label text scale relative to the 48 px glyph atlas
    #[arg(long, default_value_t = 0.35, value_parser = parse_scale)]
    pub label_scale: f32,

    /// Window title
    #[arg(long, default_value = "Detection Viewer")]
    pub title: String,

    /// Window width when no image is given
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Window height when no image is given
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_scale(s: &str) -> Result<f32, String> {
    let v: f32 = s.parse().map_err(|e| format!("{e}"))?;
    if v.is_finite() && v > 0.0 {
        Ok(v)
    } else {
        Err(format!("scale must be a positive number, got {s}"))
    }
}
