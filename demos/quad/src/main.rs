//! Minimal sprite-ngin scene: a pulsing colored quad.

use std::time::Duration;

use sprite_ngin::context::{GameConfig, InitContext};
use sprite_ngin::game::{SceneConstructor, run};
use sprite_ngin::graphics::{
    AttributeData, AttributeType, Shader, ShaderData, UniformData, UniformType,
};
use sprite_ngin::scene::{MeshNode, Scene, SceneNode};

const VERT: &str = "
    @vertex
    fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
        return vec4<f32>(position, 1.0);
    }
";

const FRAG: &str = "
    @group(0) @binding(0) var<uniform> color: vec4<f32>;

    @fragment
    fn fs_main() -> @location(0) vec4<f32> {
        return color;
    }
";

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
}

const QUAD: [Vertex; 6] = [
    Vertex { position: [-0.5, -0.5, 0.0] },
    Vertex { position: [0.5, -0.5, 0.0] },
    Vertex { position: [0.5, 0.5, 0.0] },
    Vertex { position: [-0.5, -0.5, 0.0] },
    Vertex { position: [0.5, 0.5, 0.0] },
    Vertex { position: [-0.5, 0.5, 0.0] },
];

struct QuadScene {
    root: MeshNode,
    elapsed: f32,
}

impl QuadScene {
    fn new(gpu: &InitContext) -> anyhow::Result<Self> {
        let shader = Shader::new(
            gpu,
            ShaderData {
                name: "quad".to_string(),
                vert: VERT.to_string(),
                frag: FRAG.to_string(),
                uniforms: vec![UniformData::with_value(
                    "color",
                    UniformType::Vec4,
                    [1.0f32, 0.2, 0.2, 1.0],
                )],
                attributes: vec![AttributeData::new("position", AttributeType::Vec3)],
            },
        )?;
        let root = MeshNode::new(gpu, shader, bytemuck::cast_slice(&QUAD));
        Ok(Self { root, elapsed: 0.0 })
    }
}

impl Scene for QuadScene {
    fn update(&mut self, dt: Duration) {
        self.elapsed += dt.as_secs_f32();
        let pulse = 0.5 + 0.5 * self.elapsed.sin();
        if let Err(e) = self
            .root
            .shader_mut()
            .set("color", [1.0 - pulse, pulse, 0.2, 1.0])
        {
            eprintln!("{e}");
        }
    }

    fn root(&self) -> &dyn SceneNode {
        &self.root
    }

    fn root_mut(&mut self) -> &mut dyn SceneNode {
        &mut self.root
    }
}

fn main() -> anyhow::Result<()> {
    let constructor: SceneConstructor = Box::new(|gpu| {
        Box::pin(async move {
            let scene = QuadScene::new(&gpu)?;
            Ok(Box::new(scene) as Box<dyn Scene>)
        })
    });

    run(
        GameConfig {
            title: "quad".to_string(),
            ..Default::default()
        },
        constructor,
    )
}
