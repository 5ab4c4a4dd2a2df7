use std::ops::Range;

use bytemuck::{Pod, Zeroable};
use image::RgbaImage;

use crate::render::RenderCtx;
use crate::scene::{ImageCmd, ImageId};

use super::common::{
    create_viewport_ubo, instances_before, linear_sampler, quad_pipeline, viewport_ubo_entry,
    write_viewport_ubo, InstanceBuffer, QuadGeometry,
};

/// CPU-side pixels waiting for upload, the GPU texture once uploaded, or an
/// image that can never be drawn.
enum ImageSlot {
    Pending(RgbaImage),
    Ready {
        _texture: wgpu::Texture,
        bind_group: wgpu::BindGroup,
    },
    Empty,
}

/// Renderer for `DrawCmd::Image`.
///
/// Images are registered up front and uploaded lazily on the first frame that
/// draws them. Each command draws one textured quad with its own bind group.
pub struct ImageRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    frame_layout: Option<wgpu::BindGroupLayout>,
    texture_layout: Option<wgpu::BindGroupLayout>,

    frame_bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    quad: Option<QuadGeometry>,
    instances: InstanceBuffer,

    images: Vec<ImageSlot>,
    /// Image of each prepared command; `None` marks a skipped command.
    prepared: Vec<Option<ImageId>>,
    scratch: Vec<ImageInstance>,
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            frame_layout: None,
            texture_layout: None,
            frame_bind_group: None,
            viewport_ubo: None,
            sampler: None,
            quad: None,
            instances: InstanceBuffer::new("overlay image instance vbo"),
            images: Vec::new(),
            prepared: Vec::new(),
            scratch: Vec::new(),
        }
    }
}

impl ImageRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers RGBA pixels (straight alpha, sRGB encoded) for drawing.
    ///
    /// Zero-sized images get an id but are never drawn.
    pub fn register(&mut self, image: RgbaImage) -> ImageId {
        let id = ImageId(self.images.len());
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            log::warn!("ImageRenderer: {id:?} has zero size ({w}x{h}), it will not be drawn");
            self.images.push(ImageSlot::Empty);
        } else {
            log::debug!("registered image {id:?} ({w}x{h})");
            self.images.push(ImageSlot::Pending(image));
        }
        id
    }

    /// Uploads pending textures and one instance per drawable command.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, cmds: &[&ImageCmd]) {
        self.ensure_pipeline(ctx);
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(ctx.device, "overlay image sampler"));
        }
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadGeometry::new(ctx.device, "overlay image"));
        }

        self.scratch.clear();
        self.prepared.clear();
        for cmd in cmds {
            let r = cmd.rect.normalized();
            if r.is_empty() || !r.is_finite() || !self.ensure_texture(ctx, cmd.image) {
                self.prepared.push(None);
                continue;
            }
            self.prepared.push(Some(cmd.image));
            self.scratch.push(ImageInstance {
                origin: r.origin.to_array(),
                size: r.size.to_array(),
            });
        }

        if let Some(ubo) = self.viewport_ubo.as_ref() {
            write_viewport_ubo(ctx, ubo);
        }
        self.instances.upload(ctx, &self.scratch);
    }

    /// Draws prepared commands `cmds`, one draw call each.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, cmds: Range<usize>) {
        let (Some(pipeline), Some(frame_bg), Some(quad), Some(instances)) = (
            self.pipeline.as_ref(),
            self.frame_bind_group.as_ref(),
            self.quad.as_ref(),
            self.instances.slice(),
        ) else {
            return;
        };

        let mut instance = instances_before(&self.prepared, cmds.start);

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, frame_bg, &[]);
        quad.bind(rpass);
        rpass.set_vertex_buffer(1, instances);

        for id in self.prepared.get(cmds).unwrap_or_default().iter().flatten() {
            if let Some(ImageSlot::Ready { bind_group, .. }) = self.images.get(id.0) {
                rpass.set_bind_group(1, bind_group, &[]);
                rpass.draw_indexed(0..6, 0, instance..instance + 1);
            }
            instance += 1;
        }
    }

    /// Uploads `id` if still pending. Returns `false` for unknown or empty ids.
    fn ensure_texture(&mut self, ctx: &RenderCtx<'_>, id: ImageId) -> bool {
        let Some(slot) = self.images.get_mut(id.0) else {
            log::warn!("ImageRenderer: unknown {id:?}, skipping");
            return false;
        };
        let pixels = match slot {
            ImageSlot::Pending(pixels) => pixels,
            ImageSlot::Ready { .. } => return true,
            ImageSlot::Empty => return false,
        };
        let Some(layout) = self.texture_layout.as_ref() else {
            return false;
        };

        *slot = upload_texture(ctx, layout, id, pixels);
        true
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let frame_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay image frame bgl"),
            entries: &[
                viewport_ubo_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let texture_layout = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay image texture bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            }],
        });

        let pipeline = quad_pipeline(
            ctx,
            "overlay image",
            include_str!("shaders/image.wgsl"),
            &[&frame_layout, &texture_layout],
            ImageInstance::layout(),
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.frame_layout = Some(frame_layout);
        self.texture_layout = Some(texture_layout);
        self.frame_bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.frame_bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(layout) = self.frame_layout.as_ref() else { return };
        let Some(sampler) = self.sampler.as_ref() else { return };

        let viewport_ubo = create_viewport_ubo(ctx.device, "overlay image viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay image frame bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.frame_bind_group = Some(bind_group);
    }
}

/// Creates a sampled texture for `image` and its bind group.
///
/// `image` must be non-empty; [`ImageRenderer::register`] keeps empty images out.
fn upload_texture(
    ctx: &RenderCtx<'_>,
    layout: &wgpu::BindGroupLayout,
    id: ImageId,
    image: &RgbaImage,
) -> ImageSlot {
    let max_dim = ctx.max_texture_dimension();
    let pixels = fit_to_max_dimension(image, max_dim);
    let (width, height) = pixels.dimensions();

    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let format = if ctx.surface_format.is_srgb() {
        wgpu::TextureFormat::Rgba8UnormSrgb
    } else {
        wgpu::TextureFormat::Rgba8Unorm
    };
    let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
        label: Some("overlay image texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    ctx.queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixels.as_raw(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        extent,
    );

    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("overlay image bind group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::TextureView(&view),
        }],
    });
    log::debug!("uploaded {id:?} as {width}x{height} {format:?}");

    ImageSlot::Ready {
        _texture: texture,
        bind_group,
    }
}

/// Downscales `image` so neither side exceeds `max_dim`, keeping aspect ratio.
fn fit_to_max_dimension(image: &RgbaImage, max_dim: u32) -> std::borrow::Cow<'_, RgbaImage> {
    let (w, h) = image.dimensions();
    let Some((nw, nh)) = fitted_size(w, h, max_dim) else {
        return std::borrow::Cow::Borrowed(image);
    };
    log::warn!("image {w}x{h} exceeds the GPU limit of {max_dim}px, downscaling to {nw}x{nh}");
    std::borrow::Cow::Owned(image::imageops::resize(
        image,
        nw,
        nh,
        image::imageops::FilterType::Triangle,
    ))
}

/// Target size when `w x h` exceeds `max_dim` on either side.
fn fitted_size(w: u32, h: u32, max_dim: u32) -> Option<(u32, u32)> {
    if w <= max_dim && h <= max_dim {
        return None;
    }
    let scale = max_dim as f64 / w.max(h) as f64;
    let nw = ((w as f64 * scale).round() as u32).clamp(1, max_dim);
    let nh = ((h as f64 * scale).round() as u32).clamp(1, max_dim);
    Some((nw, nh))
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ImageInstance {
    origin: [f32; 2],
    size: [f32; 2],
}

impl ImageInstance {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2  // size
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ImageInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(fitted_size(640, 480, 8192), None);
        assert_eq!(fitted_size(8192, 8192, 8192), None);
    }

    #[test]
    fn oversized_images_keep_aspect() {
        assert_eq!(fitted_size(16384, 8192, 8192), Some((8192, 4096)));
        assert_eq!(fitted_size(100, 20000, 2048), Some((10, 2048)));
    }

    #[test]
    fn extreme_aspect_never_collapses_to_zero() {
        assert_eq!(fitted_size(100_000, 1, 4096), Some((4096, 1)));
    }

    #[test]
    fn register_hands_out_sequential_ids() {
        let mut r = ImageRenderer::new();
        let a = r.register(RgbaImage::new(2, 2));
        let b = r.register(RgbaImage::new(3, 1));
        assert_eq!(a, ImageId(0));
        assert_eq!(b, ImageId(1));
    }

    #[test]
    fn zero_sized_images_are_marked_empty_once() {
        let mut r = ImageRenderer::new();
        let empty = r.register(RgbaImage::new(0, 5));
        let ok = r.register(RgbaImage::new(1, 1));
        assert_eq!(empty, ImageId(0));
        assert!(matches!(r.images[empty.0], ImageSlot::Empty));
        assert!(matches!(r.images[ok.0], ImageSlot::Pending(_)));
    }
}
