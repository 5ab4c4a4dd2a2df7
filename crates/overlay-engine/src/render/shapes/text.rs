use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::render::RenderCtx;
use crate::scene::TextCmd;
use crate::text::{layout_line, GlyphAtlas, GlyphQuad};

use super::common::{
    create_viewport_ubo, linear_sampler, quad_pipeline, span, viewport_ubo_entry,
    write_viewport_ubo, InstanceBuffer, QuadGeometry,
};

// ── renderer ──────────────────────────────────────────────────────────────

/// Renderer for `DrawCmd::Text`.
///
/// Owns a prebuilt [`GlyphAtlas`] and uploads it to an R8Unorm texture on
/// first use. Every visible glyph becomes one instanced quad; the fragment
/// shader multiplies the command color by the atlas coverage.
pub struct TextRenderer {
    atlas: GlyphAtlas,

    // pipeline
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,
    bind_group_layout: Option<wgpu::BindGroupLayout>,

    // bindings
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,
    sampler: Option<wgpu::Sampler>,

    // atlas texture
    atlas_texture: Option<wgpu::Texture>,
    atlas_view: Option<wgpu::TextureView>,

    // geometry
    quad: Option<QuadGeometry>,
    instances: InstanceBuffer,
    ranges: Vec<Range<u32>>,
    scratch: Vec<GlyphInstance>,
    quads: Vec<GlyphQuad>,
}

impl TextRenderer {
    pub fn new(atlas: GlyphAtlas) -> Self {
        Self {
            atlas,
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            viewport_ubo: None,
            sampler: None,
            atlas_texture: None,
            atlas_view: None,
            quad: None,
            instances: InstanceBuffer::new("overlay text instance vbo"),
            ranges: Vec::new(),
            scratch: Vec::new(),
            quads: Vec::new(),
        }
    }

    /// Glyph metrics used for layout; callers measure labels with it.
    #[inline]
    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Lays out every command and uploads the resulting glyph instances.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, cmds: &[&TextCmd]) {
        self.ensure_pipeline(ctx);
        self.ensure_atlas(ctx);
        if self.sampler.is_none() {
            self.sampler = Some(linear_sampler(ctx.device, "overlay text sampler"));
        }
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadGeometry::new(ctx.device, "overlay text"));
        }

        self.scratch.clear();
        self.ranges.clear();
        for cmd in cmds {
            let start = self.scratch.len() as u32;
            if cmd.scale > 0.0 && cmd.origin.is_finite() && cmd.color.is_finite() {
                self.quads.clear();
                layout_line(&self.atlas, &cmd.text, cmd.origin, cmd.scale, &mut self.quads);
                let color = cmd.color.to_array();
                self.scratch.extend(self.quads.iter().map(|q| GlyphInstance {
                    dst_min: q.rect.min().to_array(),
                    dst_max: q.rect.max().to_array(),
                    uv_min: q.uv_min,
                    uv_max: q.uv_max,
                    color,
                }));
            }
            self.ranges.push(start..self.scratch.len() as u32);
        }

        if let Some(ubo) = self.viewport_ubo.as_ref() {
            write_viewport_ubo(ctx, ubo);
        }
        self.instances.upload(ctx, &self.scratch);
    }

    /// Draws the glyphs of prepared commands `cmds` into an open render pass.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, cmds: Range<usize>) {
        let range = span(&self.ranges, cmds);
        if range.is_empty() {
            return;
        }
        let (Some(pipeline), Some(bind_group), Some(quad), Some(instances)) = (
            self.pipeline.as_ref(),
            self.bind_group.as_ref(),
            self.quad.as_ref(),
            self.instances.slice(),
        ) else {
            return;
        };

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        quad.bind(rpass);
        rpass.set_vertex_buffer(1, instances);
        rpass.draw_indexed(0..6, 0, range);
    }

    // ── lazy-init helpers ──────────────────────────────────────────────────

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let bgl = ctx.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("overlay text bgl"),
            entries: &[
                viewport_ubo_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline = quad_pipeline(
            ctx,
            "overlay text",
            include_str!("shaders/text.wgsl"),
            &[&bgl],
            GlyphInstance::layout(),
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bgl);
        self.bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_atlas(&mut self, ctx: &RenderCtx<'_>) {
        if self.atlas_texture.is_some() {
            return;
        }

        let size = self.atlas.size();
        let extent = wgpu::Extent3d {
            width: size,
            height: size,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("overlay text atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
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
            self.atlas.pixels(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(size),
                rows_per_image: Some(size),
            },
            extent,
        );
        log::debug!("uploaded {size}x{size} glyph atlas ({} glyphs)", self.atlas.len());

        self.atlas_view = Some(texture.create_view(&wgpu::TextureViewDescriptor::default()));
        self.atlas_texture = Some(texture);
        self.bind_group = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }

        let Some(bgl)        = self.bind_group_layout.as_ref() else { return; };
        let Some(atlas_view) = self.atlas_view.as_ref()        else { return; };
        let Some(sampler)    = self.sampler.as_ref()            else { return; };

        let viewport_ubo = create_viewport_ubo(ctx.device, "overlay text viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay text bind group"),
            layout: bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: viewport_ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group   = Some(bind_group);
    }
}

// ── GPU types ─────────────────────────────────────────────────────────────

/// Instance data layout (48 bytes):
///
///  offset  0  dst_min  [f32; 2]   loc 1
///  offset  8  dst_max  [f32; 2]   loc 2
///  offset 16  uv_min   [f32; 2]   loc 3
///  offset 24  uv_max   [f32; 2]   loc 4
///  offset 32  color    [f32; 4]   loc 5
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct GlyphInstance {
    dst_min: [f32; 2],
    dst_max: [f32; 2],
    uv_min:  [f32; 2],
    uv_max:  [f32; 2],
    color:   [f32; 4],
}

impl GlyphInstance {
    const ATTRS: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        1 => Float32x2, // dst_min
        2 => Float32x2, // dst_max
        3 => Float32x2, // uv_min
        4 => Float32x2, // uv_max
        5 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<GlyphInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
