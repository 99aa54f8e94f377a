use crate::shaders;
use crate::texture::create_checker_texture;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use orbitframe_render::{
    Lighting, Material, Mesh, SPRITE_SIZE, SceneState, SceneTransforms, Vertex, sphere_mesh,
    sprite_mesh,
};
use wgpu::util::DeviceExt;

const SPHERE_SUBDIVISION: u32 = 16;
const TEXTURE_SIZE: u32 = 256;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct TransformationMatrix {
    wvp: [[f32; 4]; 4],
    world: [[f32; 4]; 4],
}

impl TransformationMatrix {
    fn new(wvp: Mat4, world: Mat4) -> Self {
        Self {
            wvp: wvp.to_cols_array_2d(),
            world: world.to_cols_array_2d(),
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MaterialUniform {
    color: [f32; 4],
    enable_lighting: u32,
    _pad: [u32; 3],
}

impl From<&Material> for MaterialUniform {
    fn from(m: &Material) -> Self {
        Self {
            color: m.color,
            enable_lighting: m.lit as u32,
            _pad: [0; 3],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct LightUniform {
    color: [f32; 4],
    direction: [f32; 3],
    intensity: f32,
}

impl From<&Lighting> for LightUniform {
    fn from(l: &Lighting) -> Self {
        Self {
            color: l.color,
            direction: l.direction.normalize_or_zero().to_array(),
            intensity: l.intensity,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct GpuVertex {
    position: [f32; 4],
    texcoord: [f32; 2],
    normal: [f32; 3],
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position,
            texcoord: v.texcoord,
            normal: v.normal,
        }
    }
}

/// Geometry plus the per-object constant buffers and bind group.
struct DrawObject {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    transform_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl DrawObject {
    fn new(
        device: &wgpu::Device,
        label: &str,
        mesh: &Mesh,
        material: &Material,
        layout: &wgpu::BindGroupLayout,
        light_buffer: &wgpu::Buffer,
        texture: &wgpu::TextureView,
        sampler: &wgpu::Sampler,
    ) -> Self {
        let vertices: Vec<GpuVertex> = mesh.vertices.iter().map(GpuVertex::from).collect();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_transform_buffer")),
            contents: bytemuck::bytes_of(&TransformationMatrix::new(Mat4::IDENTITY, Mat4::IDENTITY)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_material_buffer")),
            contents: bytemuck::bytes_of(&MaterialUniform::from(material)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label}_bind_group")),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: transform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: material_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: light_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
            transform_buffer,
            material_buffer,
            bind_group,
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>, pipeline: &wgpu::RenderPipeline) {
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

/// Draws the sphere and the sprite.
pub struct DemoRenderer {
    sphere_pipeline: wgpu::RenderPipeline,
    sprite_pipeline: wgpu::RenderPipeline,
    sphere: DrawObject,
    sprite: DrawObject,
    light_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
}

impl DemoRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let scene = SceneState::default();

        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light_buffer"),
            contents: bytemuck::bytes_of(&LightUniform::from(&scene.lighting)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[
                uniform_entry(0, wgpu::ShaderStages::VERTEX),
                uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
                uniform_entry(2, wgpu::ShaderStages::FRAGMENT),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("object_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("object_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::OBJECT_SHADER.into()),
        });

        let sphere_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Sphere,
        );
        let sprite_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            surface_format,
            PipelineKind::Sprite,
        );

        let texture = create_checker_texture(device, queue, TEXTURE_SIZE);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("object_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sphere = DrawObject::new(
            device,
            "sphere",
            &sphere_mesh(SPHERE_SUBDIVISION),
            &scene.sphere_material,
            &bind_group_layout,
            &light_buffer,
            &texture,
            &sampler,
        );
        let sprite = DrawObject::new(
            device,
            "sprite",
            &sprite_mesh(SPRITE_SIZE[0], SPRITE_SIZE[1]),
            &scene.sprite_material,
            &bind_group_layout,
            &light_buffer,
            &texture,
            &sampler,
        );

        let depth_texture = Self::create_depth_texture(device, width, height);
        tracing::debug!(
            sphere_indices = sphere.index_count,
            sprite_indices = sprite.index_count,
            "demo renderer ready"
        );

        Self {
            sphere_pipeline,
            sprite_pipeline,
            sphere,
            sprite,
            light_buffer,
            depth_texture,
            surface_format,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Copy this frame's matrices, materials and light into the constant buffers.
    ///
    /// Writes are staged by the queue and land before the next submission.
    pub fn write_constants(
        &self,
        queue: &wgpu::Queue,
        transforms: &SceneTransforms,
        scene: &SceneState,
    ) {
        queue.write_buffer(
            &self.sphere.transform_buffer,
            0,
            bytemuck::bytes_of(&TransformationMatrix::new(
                transforms.sphere.wvp,
                transforms.sphere.world,
            )),
        );
        queue.write_buffer(
            &self.sprite.transform_buffer,
            0,
            bytemuck::bytes_of(&TransformationMatrix::new(
                transforms.sprite.wvp,
                transforms.sprite.world,
            )),
        );
        queue.write_buffer(
            &self.sphere.material_buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform::from(&scene.sphere_material)),
        );
        queue.write_buffer(
            &self.sprite.material_buffer,
            0,
            bytemuck::bytes_of(&MaterialUniform::from(&scene.sprite_material)),
        );
        queue.write_buffer(
            &self.light_buffer,
            0,
            bytemuck::bytes_of(&LightUniform::from(&scene.lighting)),
        );
    }

    /// Record the scene pass into `encoder`: clear, sphere, then sprite on top.
    pub fn record(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        show_sprite: bool,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: 0.1,
                        g: 0.25,
                        b: 0.5,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });

        self.sphere.draw(&mut pass, &self.sphere_pipeline);
        if show_sprite {
            self.sprite.draw(&mut pass, &self.sprite_pipeline);
        }
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    /// Depth-tested, back faces culled.
    Sphere,
    /// Always on top, no depth writes, both faces drawn.
    Sprite,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    surface_format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    let (label, cull_mode, depth_write_enabled, depth_compare) = match kind {
        PipelineKind::Sphere => (
            "sphere_pipeline",
            Some(wgpu::Face::Back),
            true,
            wgpu::CompareFunction::LessEqual,
        ),
        PipelineKind::Sprite => ("sprite_pipeline", None, false, wgpu::CompareFunction::Always),
    };

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GpuVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x4,
                    1 => Float32x2,
                    2 => Float32x3,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            // Left-handed scene: clockwise triangles face the viewer.
            front_face: wgpu::FrontFace::Cw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: Default::default(),
            bias: Default::default(),
        }),
        multisample: Default::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<TransformationMatrix>(), 128);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
        assert_eq!(std::mem::size_of::<LightUniform>(), 32);
        assert_eq!(std::mem::size_of::<GpuVertex>(), 36);
    }

    #[test]
    fn material_flag_converts() {
        let lit = MaterialUniform::from(&Material::default());
        assert_eq!(lit.enable_lighting, 1);
        let unlit = MaterialUniform::from(&Material::unlit());
        assert_eq!(unlit.enable_lighting, 0);
    }

    #[test]
    fn light_direction_is_normalized() {
        let light = LightUniform::from(&Lighting {
            direction: Vec3::new(0.0, -4.0, 3.0),
            ..Lighting::default()
        });
        let d = Vec3::from_array(light.direction);
        assert!((d.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn transformation_matrix_is_column_major() {
        let m = TransformationMatrix::new(
            Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            Mat4::IDENTITY,
        );
        assert_eq!(m.wvp[3], [1.0, 2.0, 3.0, 1.0]);
    }
}
