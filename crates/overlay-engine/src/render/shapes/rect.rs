use std::ops::Range;

use bytemuck::{Pod, Zeroable};

use crate::render::RenderCtx;
use crate::scene::RectCmd;

use super::common::{
    create_viewport_ubo, quad_pipeline, span, viewport_ubo_entry, write_viewport_ubo,
    InstanceBuffer, QuadGeometry,
};

/// Solid rectangle renderer.
///
/// Geometry is provided as logical pixels, converted to NDC in the vertex shader using viewport.
/// Color is expected to be linear premultiplied RGBA (`paint::Color`).
pub struct RectRenderer {
    pipeline_format: Option<wgpu::TextureFormat>,
    pipeline: Option<wgpu::RenderPipeline>,

    bind_group_layout: Option<wgpu::BindGroupLayout>,
    bind_group: Option<wgpu::BindGroup>,
    viewport_ubo: Option<wgpu::Buffer>,

    quad: Option<QuadGeometry>,
    instances: InstanceBuffer,

    /// Instance range of each command passed to the last `prepare`.
    ranges: Vec<Range<u32>>,
    scratch: Vec<RectInstance>,
}

impl Default for RectRenderer {
    fn default() -> Self {
        Self {
            pipeline_format: None,
            pipeline: None,
            bind_group_layout: None,
            bind_group: None,
            viewport_ubo: None,
            quad: None,
            instances: InstanceBuffer::new("overlay rect instance vbo"),
            ranges: Vec::new(),
            scratch: Vec::new(),
        }
    }
}

impl RectRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads one instance per non-empty rectangle in `cmds`.
    ///
    /// Must be called once per frame before any [`draw`](Self::draw); command
    /// indices passed to `draw` refer to positions in `cmds`.
    pub fn prepare(&mut self, ctx: &RenderCtx<'_>, cmds: &[&RectCmd]) {
        self.ensure_pipeline(ctx);
        self.ensure_bindings(ctx);
        if self.quad.is_none() {
            self.quad = Some(QuadGeometry::new(ctx.device, "overlay rect"));
        }

        self.scratch.clear();
        self.ranges.clear();
        for cmd in cmds {
            let start = self.scratch.len() as u32;
            let r = cmd.rect.normalized();
            if !r.is_empty() && r.is_finite() && cmd.color.is_finite() {
                self.scratch.push(RectInstance {
                    origin: r.origin.to_array(),
                    size: r.size.to_array(),
                    color: cmd.color.to_array(),
                });
            }
            self.ranges.push(start..self.scratch.len() as u32);
        }

        if let Some(ubo) = self.viewport_ubo.as_ref() {
            write_viewport_ubo(ctx, ubo);
        }
        self.instances.upload(ctx, &self.scratch);
    }

    /// Draws the prepared commands `cmds` into an open render pass.
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

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        if self.pipeline_format == Some(ctx.surface_format) && self.pipeline.is_some() {
            return;
        }

        let bind_group_layout =
            ctx.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("overlay rect bgl"),
                    entries: &[viewport_ubo_entry(0)],
                });

        let pipeline = quad_pipeline(
            ctx,
            "overlay rect",
            include_str!("shaders/rect.wgsl"),
            &[&bind_group_layout],
            RectInstance::layout(),
        );

        self.pipeline_format = Some(ctx.surface_format);
        self.pipeline = Some(pipeline);
        self.bind_group_layout = Some(bind_group_layout);

        self.bind_group = None;
        self.viewport_ubo = None;
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() && self.viewport_ubo.is_some() {
            return;
        }
        let Some(bgl) = self.bind_group_layout.as_ref() else { return };

        let viewport_ubo = create_viewport_ubo(ctx.device, "overlay rect viewport ubo");
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("overlay rect bind group"),
            layout: bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        self.viewport_ubo = Some(viewport_ubo);
        self.bind_group = Some(bind_group);
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct RectInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl RectInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}
