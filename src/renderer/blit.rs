use crate::renderer::framebuffer::PixelBuffer;
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, PipelineBuilder, create_fullscreen_vertices, create_vertex_2d_layout,
};

/// Presents the CPU-composed frame by stretching it over the whole surface.
///
/// The compose buffer is uploaded into a GPU texture once per frame and drawn
/// as a fullscreen quad. Sampling is nearest-neighbor so the chunky pixels
/// survive whatever size the window ends up at.
pub struct FrameBlitter {
    /// GPU-side copy of the compose buffer.
    pub texture: wgpu::Texture,
    /// Bind group containing the frame texture and sampler bindings.
    pub bind_group: wgpu::BindGroup,
    /// The render pipeline for the blit pass.
    pub pipeline: wgpu::RenderPipeline,
    /// Vertex buffer containing the fullscreen quad geometry.
    pub vertex_buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl FrameBlitter {
    /// Creates a blitter for a compose buffer of the given pixel size.
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Frame Texture"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let bind_group_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Frame Bind Group Layout")
            .with_texture(0, wgpu::ShaderStages::FRAGMENT)
            .with_sampler(1, wgpu::ShaderStages::FRAGMENT)
            .build();

        let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
            label: Some("Frame Bind Group"),
        });

        let pipeline = PipelineBuilder::new(device, surface_format)
            .with_label("Frame Blit Pipeline")
            .with_shader(include_str!("shaders/frame_blit.wgsl"))
            .with_vertex_buffer(create_vertex_2d_layout())
            .with_bind_group_layout(&bind_group_layout)
            .build();

        let vertex_buffer = create_fullscreen_vertices(device);

        Self {
            texture,
            bind_group,
            pipeline,
            vertex_buffer,
            width,
            height,
        }
    }

    /// Copies the composed frame into the GPU texture.
    pub fn upload(&self, queue: &wgpu::Queue, frame: &PixelBuffer) {
        debug_assert_eq!(frame.w as u32, self.width);
        debug_assert_eq!(frame.h as u32, self.height);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                aspect: wgpu::TextureAspect::All,
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
            },
            frame.bytes(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * self.width),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Draws the frame over the full render target.
    pub fn render(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.draw(0..6, 0..1);
    }
}
