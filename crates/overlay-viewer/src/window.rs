use std::time::Instant;

use image::RgbaImage;
use overlay_engine::coords::{Vec2, Viewport};
use overlay_engine::core::{App, AppControl, FrameCtx};
use overlay_engine::input::Key;
use overlay_engine::paint::Color;
use overlay_engine::render::OverlayRenderer;
use overlay_engine::scene::{DrawList, ImageId, Stroke, ZIndex};
use overlay_engine::text::GlyphAtlas;

use crate::detection::{Detection, DetectionSource};
use crate::label::{layout_label, LabelStyle, OUTLINE_WIDTH};

const Z_IMAGE: ZIndex = ZIndex(0);
const Z_OUTLINES: ZIndex = ZIndex(1);
const Z_LABELS: ZIndex = ZIndex(2);
const Z_CLOCK: ZIndex = ZIndex(3);

const CLOCK_SCALE: f32 = 0.5;
const CLOCK_MARGIN: f32 = 10.0;

/// Display options chosen on the command line.
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    pub title: String,
    pub label: LabelStyle,
    pub show_clock: bool,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "Detection Viewer".to_string(),
            label: LabelStyle::default(),
            show_clock: false,
        }
    }
}

/// Window that shows one image with detection boxes and labels over it.
///
/// Detections are per frame: sources refill the list before each frame and
/// it is emptied once the frame is presented.
pub struct DetectionWindow {
    renderer: OverlayRenderer,
    draw_list: DrawList,
    image: Option<ImageId>,
    detections: Vec<Detection>,
    sources: Vec<Box<dyn DetectionSource>>,
    options: ViewerOptions,
    pending_title: Option<String>,
    /// Detection count shown in the title.
    shown_count: Option<usize>,
}

impl DetectionWindow {
    pub fn new(atlas: GlyphAtlas, image: Option<RgbaImage>, options: ViewerOptions) -> Self {
        let mut renderer = OverlayRenderer::new(atlas);
        let image = image.map(|img| renderer.register_image(img));
        Self {
            renderer,
            draw_list: DrawList::new(),
            image,
            detections: Vec::new(),
            sources: Vec::new(),
            options,
            pending_title: None,
            shown_count: None,
        }
    }

    pub fn add_source(&mut self, source: Box<dyn DetectionSource>) {
        self.sources.push(source);
    }

    pub fn add_detection(&mut self, det: Detection) {
        self.detections.push(det);
    }

    pub fn clear_detections(&mut self) {
        self.detections.clear();
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Changes the window title on the next frame.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.pending_title = Some(title.into());
    }

    /// Puts the detection count in the title whenever it changes.
    fn update_title(&mut self) {
        let count = self.detections().len();
        if self.shown_count == Some(count) || (self.shown_count.is_none() && count == 0) {
            return;
        }
        self.shown_count = Some(count);
        let title = match count {
            0 => self.options.title.clone(),
            1 => format!("{} - 1 detection", self.options.title),
            n => format!("{} - {n} detections", self.options.title),
        };
        self.set_title(title);
    }

    fn poll_sources(&mut self, now: Instant) {
        let polled: Vec<Detection> = self
            .sources
            .iter_mut()
            .flat_map(|source| source.poll(now).to_vec())
            .collect();
        for det in polled {
            self.add_detection(det);
        }
    }

    /// Records the frame: image, every outline, then each label's background
    /// followed by its text.
    fn compose(&mut self, viewport: Viewport, elapsed_secs: f32) {
        self.draw_list.clear();

        if let Some(image) = self.image {
            self.draw_list.push_image(Z_IMAGE, image, viewport.rect());
        }

        let atlas = self.renderer.atlas();
        let style = &self.options.label;
        let labels: Vec<_> = self
            .detections
            .iter()
            .map(|d| layout_label(d, viewport, atlas, style))
            .collect();

        for label in &labels {
            self.draw_list.push_rect_outline(
                Z_OUTLINES,
                label.outline,
                Stroke::new(OUTLINE_WIDTH, label.box_color),
            );
        }
        for label in labels {
            self.draw_list.push_rect(Z_LABELS, label.background, label.box_color);
            self.draw_list.push_text(
                Z_LABELS,
                label.text,
                label.baseline,
                style.scale,
                label.text_color,
            );
        }

        if self.options.show_clock {
            self.draw_list.push_text(
                Z_CLOCK,
                format!("{elapsed_secs:.2} sec"),
                Vec2::new(CLOCK_MARGIN, viewport.height - CLOCK_MARGIN),
                CLOCK_SCALE,
                Color::white(),
            );
        }
    }
}

impl App for DetectionWindow {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if ctx.input_frame.pressed(Key::Escape) {
            log::info!("escape pressed, closing");
            return AppControl::Exit;
        }

        self.poll_sources(Instant::now());
        self.update_title();
        if let Some(title) = self.pending_title.take() {
            ctx.runtime.set_title(title);
        }
        self.compose(ctx.window.viewport(), ctx.time.elapsed);

        let clear = Color::from_straight(0.2, 0.2, 0.2, 1.0);
        let (renderer, draw_list) = (&mut self.renderer, &mut self.draw_list);
        let control = ctx.render(clear, |rctx, target| {
            renderer.render(rctx, target, draw_list);
        });

        self.clear_detections();
        control
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{demo_detections, StaticSource};
    use overlay_engine::scene::{DrawCmd, DrawKind};
    use overlay_engine::text::GlyphBitmap;

    fn atlas() -> GlyphAtlas {
        let bitmaps = (' '..='~').map(|ch| GlyphBitmap {
            ch,
            width: if ch == ' ' { 0 } else { 4 },
            height: if ch == ' ' { 0 } else { 6 },
            bearing: [0, 6],
            advance: 5.0,
            coverage: if ch == ' ' { Vec::new() } else { vec![255; 24] },
        });
        GlyphAtlas::from_bitmaps(bitmaps, 48.0, 256, 1).unwrap()
    }

    fn kinds(w: &mut DetectionWindow) -> Vec<DrawKind> {
        w.draw_list
            .iter_in_paint_order()
            .map(|item| item.cmd.kind())
            .collect()
    }

    #[test]
    fn composes_image_outlines_then_labels() {
        let mut w =
            DetectionWindow::new(atlas(), Some(RgbaImage::new(4, 4)), ViewerOptions::default());
        for d in demo_detections(640, 480).into_iter().take(2) {
            w.add_detection(d);
        }
        w.compose(Viewport::new(640.0, 480.0), 0.0);

        use DrawKind::*;
        assert_eq!(
            kinds(&mut w),
            vec![
                Image,
                Rect, Rect, Rect, Rect,
                Rect, Rect, Rect, Rect,
                Rect, Text,
                Rect, Text,
            ]
        );
    }

    #[test]
    fn image_fills_viewport() {
        let mut w =
            DetectionWindow::new(atlas(), Some(RgbaImage::new(4, 4)), ViewerOptions::default());
        w.compose(Viewport::new(800.0, 600.0), 0.0);
        let first = w.draw_list.iter_in_paint_order().next().map(|i| i.cmd.clone());
        match first {
            Some(DrawCmd::Image(cmd)) => assert_eq!(cmd.rect, Viewport::new(800.0, 600.0).rect()),
            other => panic!("expected image, got {other:?}"),
        }
    }

    #[test]
    fn clock_text_shows_seconds() {
        let options = ViewerOptions {
            show_clock: true,
            ..ViewerOptions::default()
        };
        let mut w = DetectionWindow::new(atlas(), None, options);
        w.compose(Viewport::new(320.0, 240.0), 3.14159);
        let texts: Vec<String> = w
            .draw_list
            .iter_in_paint_order()
            .filter_map(|i| match &i.cmd {
                DrawCmd::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["3.14 sec".to_string()]);
    }

    #[test]
    fn sources_refill_each_frame() {
        let mut w = DetectionWindow::new(atlas(), None, ViewerOptions::default());
        w.add_source(Box::new(StaticSource::new(demo_detections(100, 100))));

        w.poll_sources(Instant::now());
        assert_eq!(w.detections().len(), 3);
        w.clear_detections();
        assert!(w.detections().is_empty());
        w.poll_sources(Instant::now());
        assert_eq!(w.detections().len(), 3);
    }

    #[test]
    fn title_tracks_detection_count() {
        let mut w = DetectionWindow::new(atlas(), None, ViewerOptions::default());
        w.update_title();
        assert_eq!(w.pending_title, None);

        w.add_detection(demo_detections(10, 10).remove(0));
        w.update_title();
        assert_eq!(w.pending_title.take().as_deref(), Some("Detection Viewer - 1 detection"));

        w.update_title();
        assert_eq!(w.pending_title, None);

        w.clear_detections();
        w.update_title();
        assert_eq!(w.pending_title.as_deref(), Some("Detection Viewer"));
    }

    #[test]
    fn empty_scene_records_nothing() {
        let mut w = DetectionWindow::new(atlas(), None, ViewerOptions::default());
        w.compose(Viewport::new(100.0, 100.0), 0.0);
        assert!(w.draw_list.is_empty());
    }
}
