//! GPU shader programs.
//!
//! [`Shader`] drives the full construction pipeline: the CPU-side compile,
//! link and reflection step from [`program`](super::program), followed by
//! synchronous creation of the GPU objects (stage modules, bind group
//! layouts, uniform buffers and the render pipeline). Stage modules are
//! dropped as soon as the pipeline exists; only the linked program remains.

use wgpu::util::DeviceExt;

use crate::context::InitContext;
use crate::resources::texture::{self, Texture};

use super::program::{Attribute, AttributeLocation, LinkedProgram, Uniform, UniformLocation};
use super::{ShaderData, ShaderError, UniformType, UniformValue};

/// A compiled and linked GPU program with name-indexed uniform staging.
///
/// Constructed once per distinct program; there is no recompilation path.
/// `set` stages values CPU-side, `flush` uploads everything dirty right
/// before the shader is used to draw.
pub struct Shader {
    name: String,
    program: LinkedProgram,
    pipeline: wgpu::RenderPipeline,
    vertex_stride: u64,
    /// One uniform buffer per located non-sampler uniform, parallel to the
    /// program's uniform list.
    buffers: Vec<Option<wgpu::Buffer>>,
    /// Bind group layouts and groups indexed by group number.
    group_layouts: Vec<wgpu::BindGroupLayout>,
    bind_groups: Vec<wgpu::BindGroup>,
    default_texture: Option<Texture>,
    default_sampler: Option<wgpu::Sampler>,
}

impl Shader {
    /// Compiles, links and reflects `data`, then builds the GPU objects.
    ///
    /// Construction either yields a fully usable shader or fails with a
    /// [`ShaderError`]; there is no partially-initialized state to observe.
    pub fn new(gpu: &InitContext, data: ShaderData) -> Result<Self, ShaderError> {
        let program = LinkedProgram::link(&data)?;

        // The stage modules only live until the pipeline is created below.
        let vert_module = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} vertex stage", data.name)),
            source: wgpu::ShaderSource::Wgsl(data.vert.as_str().into()),
        });
        let frag_module = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{} fragment stage", data.name)),
            source: wgpu::ShaderSource::Wgsl(data.frag.as_str().into()),
        });

        // Interleaved vertex layout in declaration order. Unresolved
        // attributes keep their place in the stride but get no slot.
        let mut vertex_attributes = Vec::new();
        let mut vertex_stride = 0u64;
        for attribute in program.attributes() {
            if let AttributeLocation::Located(slot) = attribute.location() {
                vertex_attributes.push(wgpu::VertexAttribute {
                    offset: vertex_stride,
                    shader_location: slot,
                    format: attribute.ty().vertex_format(),
                });
            }
            vertex_stride += attribute.ty().size();
        }

        let mut buffers = Vec::with_capacity(program.uniforms().len());
        for uniform in program.uniforms() {
            buffers.push(create_uniform_buffer(&gpu.device, &data.name, uniform));
        }

        let needs_texture_defaults = program.uniforms().iter().any(|u| {
            u.ty() == UniformType::Sampler2D
                && matches!(u.location(), UniformLocation::Located { .. })
        });
        let (default_texture, default_sampler) = if needs_texture_defaults {
            (
                Some(Texture::default_white(&gpu.device, &gpu.queue)),
                Some(texture::create_default_sampler(&gpu.device)),
            )
        } else {
            (None, None)
        };

        let group_layouts = create_group_layouts(&gpu.device, &data.name, &program);
        let bind_groups = create_bind_groups(
            &gpu.device,
            &data.name,
            &program,
            &buffers,
            &group_layouts,
            default_texture.as_ref(),
            default_sampler.as_ref(),
        );

        let layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();
        let pipeline_layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some(&format!("{} pipeline layout", data.name)),
                bind_group_layouts: &layout_refs,
                push_constant_ranges: &[],
            });

        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: vertex_stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &vertex_attributes,
        }];
        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                cache: None,
                label: Some(&format!("{} pipeline", data.name)),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vert_module,
                    entry_point: Some(program.vertex_entry()),
                    buffers: if vertex_stride == 0 { &[] } else { &vertex_buffers },
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &frag_module,
                    entry_point: Some(program.fragment_entry()),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: gpu.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState {
                    count: 1,
                    mask: !0,
                    alpha_to_coverage_enabled: false,
                },
                multiview: None,
            });

        Ok(Self {
            name: data.name,
            program,
            pipeline,
            vertex_stride,
            buffers,
            group_layouts,
            bind_groups,
            default_texture,
            default_sampler,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Byte stride of one interleaved vertex as described by the declared
    /// attribute list.
    pub fn vertex_stride(&self) -> u64 {
        self.vertex_stride
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }

    /// Stages a uniform value. See [`LinkedProgram::set`]; nothing reaches
    /// the GPU until [`flush`](Self::flush) runs.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        self.program.set(name, value)
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.program.uniform(name)
    }

    pub fn attributes(&self) -> &[Attribute] {
        self.program.attributes()
    }

    /// The designated texture-sampler uniform, if one was declared.
    pub fn sampler2d(&self) -> Option<&Uniform> {
        self.program.sampler2d()
    }

    /// Uploads every dirty staged value.
    ///
    /// Scalar and matrix values are written into their uniform buffers;
    /// texture changes rebuild the affected bind groups. Called by the
    /// renderer's prepare walk immediately before each draw that uses this
    /// shader. Unresolved uniforms are skipped.
    pub fn flush(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        let mut rebuild_groups = false;
        for (index, uniform) in self.program.uniforms_mut().iter_mut().enumerate() {
            if !uniform.dirty {
                continue;
            }
            uniform.dirty = false;

            if let UniformLocation::Unresolved = uniform.location() {
                continue;
            }
            if uniform.ty() == UniformType::Sampler2D {
                rebuild_groups = true;
                continue;
            }

            let Some(value) = uniform.value() else { continue };
            match value.as_bytes() {
                Some(bytes) if bytes.len() as u64 == uniform.ty().size() => {
                    if let Some(buffer) = &self.buffers[index] {
                        queue.write_buffer(buffer, 0, &bytes);
                    }
                }
                _ => log::warn!(
                    "staged value for uniform `{}` in shader `{}` does not match its declared type",
                    uniform.name(),
                    self.name
                ),
            }
        }

        if rebuild_groups {
            self.bind_groups = create_bind_groups(
                device,
                &self.name,
                &self.program,
                &self.buffers,
                &self.group_layouts,
                self.default_texture.as_ref(),
                self.default_sampler.as_ref(),
            );
        }
    }

    /// Sets the pipeline and all bind groups on the pass.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        for (group, bind_group) in self.bind_groups.iter().enumerate() {
            pass.set_bind_group(group as u32, bind_group, &[]);
        }
    }
}

impl std::fmt::Debug for Shader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shader").field("name", &self.name).finish()
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    shader: &str,
    uniform: &Uniform,
) -> Option<wgpu::Buffer> {
    if uniform.ty() == UniformType::Sampler2D {
        return None;
    }
    let UniformLocation::Located { .. } = uniform.location() else {
        return None;
    };

    let mut contents = vec![0u8; uniform.ty().size() as usize];
    match uniform.value().and_then(UniformValue::as_bytes) {
        Some(bytes) if bytes.len() == contents.len() => contents = bytes,
        Some(_) => log::warn!(
            "initial value for uniform `{}` in shader `{shader}` does not match its declared type",
            uniform.name()
        ),
        None => {}
    }

    Some(
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{shader} uniform `{}`", uniform.name())),
            contents: &contents,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        }),
    )
}

fn stage_visibility(uniform: &Uniform) -> wgpu::ShaderStages {
    let mut visibility = wgpu::ShaderStages::NONE;
    if uniform.in_vertex {
        visibility |= wgpu::ShaderStages::VERTEX;
    }
    if uniform.in_fragment {
        visibility |= wgpu::ShaderStages::FRAGMENT;
    }
    visibility
}

fn create_group_layouts(
    device: &wgpu::Device,
    shader: &str,
    program: &LinkedProgram,
) -> Vec<wgpu::BindGroupLayout> {
    let mut max_group = None;
    for uniform in program.uniforms() {
        if let UniformLocation::Located { group, .. } = uniform.location() {
            max_group = Some(max_group.map_or(group, |m: u32| m.max(group)));
        }
    }
    let Some(max_group) = max_group else {
        return Vec::new();
    };

    (0..=max_group)
        .map(|group| {
            let mut entries = Vec::new();
            for uniform in program.uniforms() {
                let UniformLocation::Located { group: g, binding } = uniform.location() else {
                    continue;
                };
                if g != group {
                    continue;
                }
                let visibility = stage_visibility(uniform);
                match uniform.ty() {
                    UniformType::Sampler2D => {
                        entries.push(wgpu::BindGroupLayoutEntry {
                            binding,
                            visibility,
                            ty: wgpu::BindingType::Texture {
                                multisampled: false,
                                view_dimension: wgpu::TextureViewDimension::D2,
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                            },
                            count: None,
                        });
                        if uniform.has_companion_sampler {
                            entries.push(wgpu::BindGroupLayoutEntry {
                                binding: binding + 1,
                                visibility,
                                ty: wgpu::BindingType::Sampler(
                                    wgpu::SamplerBindingType::Filtering,
                                ),
                                count: None,
                            });
                        }
                    }
                    _ => entries.push(wgpu::BindGroupLayoutEntry {
                        binding,
                        visibility,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }),
                }
            }
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &entries,
                label: Some(&format!("{shader} bind group layout {group}")),
            })
        })
        .collect()
}

fn create_bind_groups(
    device: &wgpu::Device,
    shader: &str,
    program: &LinkedProgram,
    buffers: &[Option<wgpu::Buffer>],
    group_layouts: &[wgpu::BindGroupLayout],
    default_texture: Option<&Texture>,
    default_sampler: Option<&wgpu::Sampler>,
) -> Vec<wgpu::BindGroup> {
    group_layouts
        .iter()
        .enumerate()
        .map(|(group, layout)| {
            let mut entries = Vec::new();
            for (index, uniform) in program.uniforms().iter().enumerate() {
                let UniformLocation::Located { group: g, binding } = uniform.location() else {
                    continue;
                };
                if g != group as u32 {
                    continue;
                }
                match uniform.ty() {
                    UniformType::Sampler2D => {
                        let staged = match uniform.value() {
                            Some(UniformValue::Texture(texture)) => Some(texture),
                            Some(_) => {
                                log::warn!(
                                    "uniform `{}` in shader `{shader}` is a sampler but holds a non-texture value",
                                    uniform.name()
                                );
                                None
                            }
                            None => None,
                        };
                        let Some(texture) = staged.or(default_texture) else {
                            continue;
                        };
                        entries.push(wgpu::BindGroupEntry {
                            binding,
                            resource: wgpu::BindingResource::TextureView(&texture.view),
                        });
                        if uniform.has_companion_sampler {
                            if let Some(sampler) =
                                texture.sampler.as_ref().or(default_sampler)
                            {
                                entries.push(wgpu::BindGroupEntry {
                                    binding: binding + 1,
                                    resource: wgpu::BindingResource::Sampler(sampler),
                                });
                            }
                        }
                    }
                    _ => {
                        if let Some(buffer) = &buffers[index] {
                            entries.push(wgpu::BindGroupEntry {
                                binding,
                                resource: buffer.as_entire_binding(),
                            });
                        }
                    }
                }
            }
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout,
                entries: &entries,
                label: Some(&format!("{shader} bind group {group}")),
            })
        })
        .collect()
}
