use image::RgbaImage;

use crate::scene::{DrawCmd, DrawKind, DrawList, ImageCmd, ImageId, RectCmd, TextCmd};
use crate::text::GlyphAtlas;

use super::batch::{plan_batches, Batch};
use super::shapes::image::ImageRenderer;
use super::shapes::rect::RectRenderer;
use super::shapes::text::TextRenderer;
use super::{RenderCtx, RenderTarget};

/// Draws a whole [`DrawList`] with the image, rect and text renderers.
///
/// Commands keep their paint order across kinds: consecutive commands of one
/// kind form a batch, and all batches are issued in order inside a single
/// render pass that loads the already cleared target.
pub struct OverlayRenderer {
    images: ImageRenderer,
    rects: RectRenderer,
    text: TextRenderer,
    batches: Vec<Batch>,
}

impl OverlayRenderer {
    pub fn new(atlas: GlyphAtlas) -> Self {
        Self {
            images: ImageRenderer::new(),
            rects: RectRenderer::new(),
            text: TextRenderer::new(atlas),
            batches: Vec::new(),
        }
    }

    pub fn register_image(&mut self, image: RgbaImage) -> ImageId {
        self.images.register(image)
    }

    #[inline]
    pub fn atlas(&self) -> &GlyphAtlas {
        self.text.atlas()
    }

    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        draw_list: &mut DrawList,
    ) {
        let mut images: Vec<&ImageCmd> = Vec::new();
        let mut rects: Vec<&RectCmd> = Vec::new();
        let mut texts: Vec<&TextCmd> = Vec::new();
        let mut kinds: Vec<DrawKind> = Vec::with_capacity(draw_list.len());

        for item in draw_list.iter_in_paint_order() {
            kinds.push(item.cmd.kind());
            match &item.cmd {
                DrawCmd::Image(c) => images.push(c),
                DrawCmd::Rect(c) => rects.push(c),
                DrawCmd::Text(c) => texts.push(c),
            }
        }

        plan_batches(kinds, &mut self.batches);
        if self.batches.is_empty() {
            return;
        }

        if !images.is_empty() {
            self.images.prepare(ctx, &images);
        }
        if !rects.is_empty() {
            self.rects.prepare(ctx, &rects);
        }
        if !texts.is_empty() {
            self.text.prepare(ctx, &texts);
        }

        let mut rpass = target.begin_load_pass("overlay pass");

        for batch in &self.batches {
            let cmds = batch.cmds.clone();
            match batch.kind {
                DrawKind::Image => self.images.draw(&mut rpass, cmds),
                DrawKind::Rect => self.rects.draw(&mut rpass, cmds),
                DrawKind::Text => self.text.draw(&mut rpass, cmds),
            }
        }
    }
}
