//! Scenes, systems and the drawable node tree.
//!
//! A [`Scene`] is the unit the game loop drives: asynchronous setup once,
//! `update(dt)` every frame, and a drawable root node the renderer walks.
//! [`System`]s are optional per-frame plugins injected into the loop at
//! construction and run in order ahead of the scene.
//!
//! Nodes follow a write-then-draw split: the renderer first walks the tree
//! mutably so nodes can flush staged GPU state (`prepare`), then records the
//! actual draw calls from an immutable walk (`draw`).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use wgpu::util::DeviceExt;

use crate::context::InitContext;
use crate::graphics::Shader;

/// Boxed setup future used by [`Scene`] and [`System`].
pub type SetupFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

/// A renderable game state driven by the loop.
pub trait Scene {
    /// Asynchronous initialization, awaited once by the loop's `start`
    /// before the first frame. Ready immediately by default.
    fn setup(&mut self) -> SetupFuture<'_> {
        Box::pin(async { anyhow::Ok(()) })
    }

    /// Advance the scene by `dt`.
    fn update(&mut self, dt: Duration);

    /// The drawable root the renderer walks each frame.
    fn root(&self) -> &dyn SceneNode;

    fn root_mut(&mut self) -> &mut dyn SceneNode;
}

/// A per-frame capability plugged into the game loop.
///
/// Systems are injected at construction as an ordered list and are invoked
/// during setup and on every frame, before the scene's own update.
pub trait System {
    fn setup(&mut self) -> SetupFuture<'_> {
        Box::pin(async { anyhow::Ok(()) })
    }

    fn update(&mut self, dt: Duration);
}

/// A node in the drawable tree.
pub trait SceneNode {
    fn children(&self) -> &[Box<dyn SceneNode>];

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children_mut().push(child);
    }

    /// Pre-draw pass: flush staged uniform values and other GPU state.
    fn prepare(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        for child in self.children_mut() {
            child.prepare(queue, device);
        }
    }

    /// Record draw calls for this node and its children.
    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        for child in self.children() {
            child.draw(pass);
        }
    }
}

/// A grouping node with no drawable content of its own.
#[derive(Default)]
pub struct ContainerNode {
    children: Vec<Box<dyn SceneNode>>,
}

impl ContainerNode {
    pub fn new() -> Self {
        Self { children: vec![] }
    }
}

impl SceneNode for ContainerNode {
    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }
}

/// A drawable node owning its shader and an interleaved vertex buffer.
///
/// The vertex data layout is whatever the shader's declared attribute list
/// says it is; the node just counts vertices by the shader's stride.
pub struct MeshNode {
    children: Vec<Box<dyn SceneNode>>,
    shader: Shader,
    vertex_buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl MeshNode {
    pub fn new(gpu: &InitContext, shader: Shader, vertices: &[u8]) -> Self {
        let stride = shader.vertex_stride();
        let vertex_count = if stride == 0 {
            0
        } else {
            if vertices.len() as u64 % stride != 0 {
                log::warn!(
                    "vertex data for shader `{}` is not a whole number of vertices",
                    shader.name()
                );
            }
            (vertices.len() as u64 / stride) as u32
        };

        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{} vertex buffer", shader.name())),
                contents: vertices,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });

        Self {
            children: vec![],
            shader,
            vertex_buffer,
            vertex_count,
        }
    }

    pub fn shader(&self) -> &Shader {
        &self.shader
    }

    pub fn shader_mut(&mut self) -> &mut Shader {
        &mut self.shader
    }
}

impl SceneNode for MeshNode {
    fn children(&self) -> &[Box<dyn SceneNode>] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut Vec<Box<dyn SceneNode>> {
        &mut self.children
    }

    fn prepare(&mut self, queue: &wgpu::Queue, device: &wgpu::Device) {
        self.shader.flush(queue, device);
        for child in self.children_mut() {
            child.prepare(queue, device);
        }
    }

    fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.vertex_count == 0 {
            log::warn!("you attempted to render a mesh with zero vertices");
        } else {
            self.shader.bind(pass);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.draw(0..self.vertex_count, 0..1);
        }
        for child in self.children() {
            child.draw(pass);
        }
    }
}
