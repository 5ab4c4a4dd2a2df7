//! Detection viewer: shows an image with labeled detection boxes drawn over it.

mod cli;
mod detection;
mod font;
mod label;
mod window;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use winit::dpi::LogicalSize;

use overlay_engine::device::GpuInit;
use overlay_engine::logging::{init_logging, LoggingConfig};
use overlay_engine::text::{load_font_file, AtlasConfig, GlyphAtlas};
use overlay_engine::window::{Runtime, RuntimeConfig};

use crate::cli::Args;
use crate::detection::{demo_detections, FileSource, StaticSource};
use crate::label::LabelStyle;
use crate::window::{DetectionWindow, ViewerOptions};

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        default_level: if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        },
        ..LoggingConfig::default()
    });

    let image = args.image.as_deref().map(load_image).transpose()?;
    let (width, height) = image
        .as_ref()
        .map_or((args.width, args.height), |img| img.dimensions());

    let atlas_config = AtlasConfig::default();
    let font_path = font::resolve_font(args.font.as_deref())?;
    let font = load_font_file(&font_path, atlas_config.px_size)
        .with_context(|| format!("failed to load font {}", font_path.display()))?;
    let atlas = GlyphAtlas::from_font(&font, &atlas_config).context("failed to build glyph atlas")?;

    let options = ViewerOptions {
        title: args.title.clone(),
        label: LabelStyle {
            scale: args.label_scale,
            show_score: args.scores,
        },
        show_clock: args.show_clock,
    };
    let mut app = DetectionWindow::new(atlas, image, options);

    if args.demo {
        app.add_source(Box::new(StaticSource::new(demo_detections(width, height))));
    }
    if let Some(path) = args.detections.as_deref() {
        let source = FileSource::open(path).context("failed to load detections")?;
        app.add_source(Box::new(source));
    }

    let config = RuntimeConfig {
        title: args.title,
        initial_size: LogicalSize::new(width as f64, height as f64),
        ..RuntimeConfig::default()
    };
    // Colors and blending stay in encoded space, like the images themselves.
    let gpu_init = GpuInit {
        prefer_srgb: false,
        ..GpuInit::default()
    };

    Runtime::run(config, gpu_init, app)
}

fn load_image(path: &Path) -> Result<image::RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image {}", path.display()))?
        .to_rgba8();
    log::info!("loaded {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img)
}
