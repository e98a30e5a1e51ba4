use std::collections::HashMap;
use std::sync::Arc;

use ab_glyph::{Font as _, FontArc, Glyph, GlyphId, PxScale, ScaleFont};
use anyhow::{Result, anyhow};
use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use wgpu::SurfaceError;
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use super::platform::Drawable;
use super::resources::ResourceManager;

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const ATLAS_WIDTH: u32 = 256;

pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    /// Drawing coordinates span this many pixels regardless of the surface size.
    view_size: Vec2,
    clear_color: wgpu::Color,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    resources: ResourceManager,
    textures: HashMap<String, GpuTexture>,
    atlases: HashMap<(String, u32), GlyphAtlas>,
    batches: Vec<Batch>,
    frame_count: u64,
}

struct GpuTexture {
    bind_group: wgpu::BindGroup,
    width: u32,
    height: u32,
}

enum BatchSource {
    Texture(String),
    Glyphs(String, u32),
}

struct Batch {
    source: BatchSource,
    vertices: Vec<SpriteVertex>,
}

impl Renderer {
    pub async fn new(
        window: Arc<Window>,
        view_size: Vec2,
        resources: ResourceManager,
    ) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(|err| anyhow!("failed to create surface: {err}"))?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapters found"))?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("fixstep-device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::CompositeAlphaMode::Opaque)
            .or_else(|| surface_caps.alpha_modes.first().copied())
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoNoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fixstep-sprite-shader"),
            source: wgpu::ShaderSource::Wgsl(SPRITE_SHADER.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("fixstep-texture-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("fixstep-sprite-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("fixstep-sprite-pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[SpriteVertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("fixstep-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            view_size,
            clear_color: wgpu::Color::BLACK,
            pipeline,
            bind_group_layout,
            sampler,
            resources,
            textures: HashMap::new(),
            atlases: HashMap::new(),
            batches: Vec::new(),
            frame_count: 0,
        })
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }

        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn begin_frame(&mut self) {
        self.batches.clear();
        tracing::trace!(frame = self.frame_count, "begin frame");
    }

    pub fn queue_drawable(&mut self, drawable: &Drawable<'_>) {
        match drawable {
            Drawable::Sprite { texture, position } => self.queue_sprite(texture, *position),
            Drawable::Text {
                font,
                content,
                position,
                size,
            } => self.queue_text(font, content, *position, *size),
        }
    }

    fn queue_sprite(&mut self, key: &str, position: Vec2) {
        if !self.ensure_texture(key) {
            return;
        }
        let Some(texture) = self.textures.get(key) else {
            return;
        };
        let size = Vec2::new(texture.width as f32, texture.height as f32);
        let mut vertices = Vec::with_capacity(6);
        push_quad(
            &mut vertices,
            self.view_size,
            position,
            size,
            [0.0, 0.0],
            [1.0, 1.0],
            WHITE,
        );
        self.batches.push(Batch {
            source: BatchSource::Texture(key.to_string()),
            vertices,
        });
    }

    fn queue_text(&mut self, font_key: &str, content: &str, position: Vec2, size: u32) {
        if content.is_empty() || !self.ensure_atlas(font_key, size) {
            return;
        }
        let atlas_key = (font_key.to_string(), size);
        let Some(atlas) = self.atlases.get(&atlas_key) else {
            return;
        };
        let vertices = atlas.layout(content, position, self.view_size, WHITE);
        if vertices.is_empty() {
            return;
        }
        self.batches.push(Batch {
            source: BatchSource::Glyphs(font_key.to_string(), size),
            vertices,
        });
    }

    /// Uploads the named texture on first use. Returns false for placeholders.
    fn ensure_texture(&mut self, key: &str) -> bool {
        if self.textures.contains_key(key) {
            return true;
        }
        let Some(texture) = self.resources.texture(key) else {
            tracing::trace!(%key, "unknown texture");
            return false;
        };
        if texture.is_empty() {
            return false;
        }

        let (width, height) = (texture.width(), texture.height());
        let bind_group = self.upload_rgba(key, width, height, texture.pixels());
        self.textures.insert(
            key.to_string(),
            GpuTexture {
                bind_group,
                width,
                height,
            },
        );
        true
    }

    fn ensure_atlas(&mut self, font_key: &str, size: u32) -> bool {
        let atlas_key = (font_key.to_string(), size);
        if self.atlases.contains_key(&atlas_key) {
            return true;
        }
        let Some(font) = self.resources.font(font_key).and_then(|font| font.get()) else {
            return false;
        };

        let mut atlas = GlyphAtlas::build(font, size as f32);
        let label = format!("{font_key}-{size}px-atlas");
        atlas.bind_group = Some(self.upload_rgba(&label, atlas.width, atlas.height, &atlas.pixels));
        tracing::debug!(font = %font_key, size, glyphs = atlas.glyphs.len(), "built glyph atlas");
        self.atlases.insert(atlas_key, atlas);
        true
    }

    fn upload_rgba(&self, label: &str, width: u32, height: u32, pixels: &[u8]) -> wgpu::BindGroup {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        self.queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            extent,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    pub fn end_frame(&mut self) -> Result<(), SurfaceError> {
        let frame = self.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let vertices: Vec<SpriteVertex> = self
            .batches
            .iter()
            .flat_map(|batch| batch.vertices.iter().copied())
            .collect();
        let vertex_buffer = if !vertices.is_empty() {
            Some(
                self.device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("fixstep-vertex-buffer"),
                        contents: bytemuck::cast_slice(&vertices),
                        usage: wgpu::BufferUsages::VERTEX,
                    }),
            )
        } else {
            None
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("fixstep-render-encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("fixstep-render-pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            if let Some(buffer) = vertex_buffer.as_ref() {
                render_pass.set_pipeline(&self.pipeline);
                render_pass.set_vertex_buffer(0, buffer.slice(..));
                let mut first = 0u32;
                for batch in &self.batches {
                    let count = batch.vertices.len() as u32;
                    let bind_group = match &batch.source {
                        BatchSource::Texture(key) => {
                            self.textures.get(key).map(|texture| &texture.bind_group)
                        }
                        BatchSource::Glyphs(font, size) => self
                            .atlases
                            .get(&(font.clone(), *size))
                            .and_then(|atlas| atlas.bind_group.as_ref()),
                    };
                    if let Some(bind_group) = bind_group {
                        render_pass.set_bind_group(0, bind_group, &[]);
                        render_pass.draw(first..first + count, 0..1);
                    }
                    first += count;
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        self.batches.clear();
        self.frame_count += 1;
        tracing::trace!(frame = self.frame_count, "end frame");
        Ok(())
    }
}

struct GlyphInfo {
    id: GlyphId,
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    /// Offset of the bitmap from the pen position on the baseline.
    offset: Vec2,
    size: Vec2,
    advance: f32,
}

/// Printable ASCII rasterized once per font and pixel size.
struct GlyphAtlas {
    font: FontArc,
    scale: PxScale,
    ascent: f32,
    line_height: f32,
    glyphs: HashMap<char, GlyphInfo>,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlyphAtlas {
    fn build(font: &FontArc, px: f32) -> Self {
        let scale = PxScale::from(px.max(1.0));
        let scaled = font.as_scaled(scale);
        let ascent = scaled.ascent();
        let line_height = scaled.height() + scaled.line_gap();

        // Coverage first, expanded to white RGBA once the atlas height is known.
        let mut coverage = vec![0u8; ATLAS_WIDTH as usize];
        let mut height = 1u32;
        let mut cursor_x = 1u32;
        let mut cursor_y = 1u32;
        let mut row_h = 0u32;
        let mut glyphs = HashMap::new();

        for ch in (0x20u8..0x7f).map(char::from) {
            let id = font.glyph_id(ch);
            let advance = scaled.h_advance(id);
            let glyph = Glyph {
                id,
                scale,
                position: ab_glyph::point(0.0, 0.0),
            };
            let Some(outlined) = font.outline_glyph(glyph) else {
                glyphs.insert(
                    ch,
                    GlyphInfo {
                        id,
                        uv_min: [0.0, 0.0],
                        uv_max: [0.0, 0.0],
                        offset: Vec2::ZERO,
                        size: Vec2::ZERO,
                        advance,
                    },
                );
                continue;
            };

            let bounds = outlined.px_bounds();
            let gw = (bounds.width().ceil() as u32).max(1);
            let gh = (bounds.height().ceil() as u32).max(1);
            if cursor_x + gw + 1 >= ATLAS_WIDTH {
                cursor_x = 1;
                cursor_y += row_h + 1;
                row_h = 0;
            }
            let needed = cursor_y + gh + 1;
            if needed > height {
                height = needed;
                coverage.resize((ATLAS_WIDTH * height) as usize, 0);
            }

            let (ox, oy) = (cursor_x, cursor_y);
            outlined.draw(|x, y, v| {
                let idx = ((oy + y) * ATLAS_WIDTH + ox + x) as usize;
                if let Some(px) = coverage.get_mut(idx) {
                    *px = (*px).max((v.clamp(0.0, 1.0) * 255.0) as u8);
                }
            });

            glyphs.insert(
                ch,
                GlyphInfo {
                    id,
                    uv_min: [ox as f32, oy as f32],
                    uv_max: [(ox + gw) as f32, (oy + gh) as f32],
                    offset: Vec2::new(bounds.min.x, bounds.min.y),
                    size: Vec2::new(gw as f32, gh as f32),
                    advance,
                },
            );
            cursor_x += gw + 1;
            row_h = row_h.max(gh);
        }

        for info in glyphs.values_mut() {
            info.uv_min = [
                info.uv_min[0] / ATLAS_WIDTH as f32,
                info.uv_min[1] / height as f32,
            ];
            info.uv_max = [
                info.uv_max[0] / ATLAS_WIDTH as f32,
                info.uv_max[1] / height as f32,
            ];
        }

        let pixels = coverage
            .iter()
            .flat_map(|&alpha| [255, 255, 255, alpha])
            .collect();

        Self {
            font: font.clone(),
            scale,
            ascent,
            line_height,
            glyphs,
            width: ATLAS_WIDTH,
            height,
            pixels,
            bind_group: None,
        }
    }

    /// Lays out `content` with its top-left corner at `origin`, one line per `\n`.
    fn layout(&self, content: &str, origin: Vec2, view: Vec2, color: [f32; 4]) -> Vec<SpriteVertex> {
        let scaled = self.font.as_scaled(self.scale);
        let mut vertices = Vec::new();
        let mut baseline = origin.y + self.ascent;

        for line in content.split('\n') {
            let mut pen_x = origin.x;
            let mut prev: Option<GlyphId> = None;
            for ch in line.chars() {
                let Some(info) = self.glyphs.get(&ch) else {
                    continue;
                };
                if let Some(prev) = prev {
                    pen_x += scaled.kern(prev, info.id);
                }
                if info.size != Vec2::ZERO {
                    let top_left = Vec2::new(pen_x, baseline) + info.offset;
                    push_quad(
                        &mut vertices,
                        view,
                        top_left,
                        info.size,
                        info.uv_min,
                        info.uv_max,
                        color,
                    );
                }
                pen_x += info.advance;
                prev = Some(info.id);
            }
            baseline += self.line_height;
        }
        vertices
    }
}

fn px_to_ndc(point: Vec2, view: Vec2) -> [f32; 2] {
    [
        (point.x / view.x) * 2.0 - 1.0,
        1.0 - (point.y / view.y) * 2.0,
    ]
}

fn push_quad(
    out: &mut Vec<SpriteVertex>,
    view: Vec2,
    top_left: Vec2,
    size: Vec2,
    uv_min: [f32; 2],
    uv_max: [f32; 2],
    color: [f32; 4],
) {
    if view.x <= 0.0 || view.y <= 0.0 {
        return;
    }
    let bottom_right = top_left + size;
    let v0 = SpriteVertex::new(px_to_ndc(top_left, view), uv_min, color);
    let v1 = SpriteVertex::new(
        px_to_ndc(Vec2::new(bottom_right.x, top_left.y), view),
        [uv_max[0], uv_min[1]],
        color,
    );
    let v2 = SpriteVertex::new(px_to_ndc(bottom_right, view), uv_max, color);
    let v3 = SpriteVertex::new(
        px_to_ndc(Vec2::new(top_left.x, bottom_right.y), view),
        [uv_min[0], uv_max[1]],
        color,
    );

    out.extend_from_slice(&[v0, v2, v1, v0, v3, v2]);
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
struct SpriteVertex {
    position: [f32; 2],
    uv: [f32; 2],
    color: [f32; 4],
}

impl SpriteVertex {
    fn new(position: [f32; 2], uv: [f32; 2], color: [f32; 4]) -> Self {
        Self {
            position,
            uv,
            color,
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2, 2 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

const SPRITE_SHADER: &str = r#"
struct VsIn {
    @location(0) position: vec2<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
};

struct VsOut {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
};

@group(0) @binding(0) var sprite_texture: texture_2d<f32>;
@group(0) @binding(1) var sprite_sampler: sampler;

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    out.position = vec4<f32>(in.position, 0.0, 1.0);
    out.uv = in.uv;
    out.color = in.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    return textureSample(sprite_texture, sprite_sampler, in.uv) * in.color;
}
"#;
