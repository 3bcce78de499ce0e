//! Contract tests for the declarative shader surface, exercised at the
//! compile/link/reflection level so no GPU device is required.

use sprite_ngin::graphics::{
    AttributeData, AttributeType, LinkedProgram, ShaderData, ShaderError, ShaderStage,
    UniformData, UniformLocation, UniformType, UniformValue,
};

const BASIC_VERT: &str = "
    @vertex
    fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
        return vec4<f32>(position, 1.0);
    }
";

const BASIC_FRAG: &str = "
    @group(0) @binding(0) var<uniform> color: vec4<f32>;

    @fragment
    fn fs_main() -> @location(0) vec4<f32> {
        return color;
    }
";

fn basic_shader_data() -> ShaderData {
    ShaderData {
        name: "basic".to_string(),
        vert: BASIC_VERT.to_string(),
        frag: BASIC_FRAG.to_string(),
        uniforms: vec![UniformData::with_value(
            "color",
            UniformType::Vec4,
            [1.0f32, 0.0, 0.0, 1.0],
        )],
        attributes: vec![AttributeData::new("position", AttributeType::Vec3)],
    }
}

#[test]
fn basic_shader_links_and_resolves_its_declarations() {
    let program = LinkedProgram::link(&basic_shader_data()).unwrap();

    assert_eq!(program.vertex_entry(), "vs_main");
    assert_eq!(program.fragment_entry(), "fs_main");

    let color = program.uniform("color").unwrap();
    assert_eq!(
        color.location(),
        UniformLocation::Located {
            group: 0,
            binding: 0
        }
    );
    match color.value() {
        Some(UniformValue::Vec4(v)) => assert_eq!(*v, [1.0, 0.0, 0.0, 1.0]),
        other => panic!("unexpected initial value {other:?}"),
    }
}

#[test]
fn set_restages_existing_uniforms_and_rejects_unknown_names() {
    let mut program = LinkedProgram::link(&basic_shader_data()).unwrap();

    program.set("color", [0.0f32, 1.0, 0.0, 1.0]).unwrap();
    match program.uniform("color").unwrap().value() {
        Some(UniformValue::Vec4(v)) => assert_eq!(*v, [0.0, 1.0, 0.0, 1.0]),
        other => panic!("unexpected staged value {other:?}"),
    }

    let err = program.set("opacity", 0.5f32).unwrap_err();
    assert!(matches!(err, ShaderError::UnknownUniform(name) if name == "opacity"));

    // The failed set left the staged value untouched.
    match program.uniform("color").unwrap().value() {
        Some(UniformValue::Vec4(v)) => assert_eq!(*v, [0.0, 1.0, 0.0, 1.0]),
        other => panic!("unexpected staged value {other:?}"),
    }
}

#[test]
fn syntactically_invalid_stages_fail_with_a_compilation_error() {
    let mut data = basic_shader_data();
    data.vert = "this is not wgsl".to_string();
    match LinkedProgram::link(&data).unwrap_err() {
        ShaderError::Compilation { stage, log, .. } => {
            assert_eq!(stage, ShaderStage::Vertex);
            assert!(!log.is_empty());
        }
        other => panic!("expected a compilation error, got {other:?}"),
    }

    let mut data = basic_shader_data();
    data.frag = "@fragment fn broken(".to_string();
    match LinkedProgram::link(&data).unwrap_err() {
        ShaderError::Compilation { stage, .. } => assert_eq!(stage, ShaderStage::Fragment),
        other => panic!("expected a compilation error, got {other:?}"),
    }
}

#[test]
fn valid_stages_with_mismatched_interfaces_fail_with_a_link_error() {
    let mut data = basic_shader_data();
    // The fragment stage consumes a varying the vertex stage never writes.
    data.frag = "
        @fragment
        fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
            return tint;
        }
    "
    .to_string();
    data.uniforms = vec![];

    match LinkedProgram::link(&data).unwrap_err() {
        ShaderError::Link { log, .. } => assert!(log.contains("not written by the vertex stage")),
        other => panic!("expected a link error, got {other:?}"),
    }
}

#[test]
fn first_declared_sampler_is_the_designated_one() {
    let vert = "
        struct VsOut {
            @builtin(position) pos: vec4<f32>,
            @location(0) uv: vec2<f32>,
        }

        @vertex
        fn vs_main(@location(0) position: vec3<f32>, @location(1) uv: vec2<f32>) -> VsOut {
            var out: VsOut;
            out.pos = vec4<f32>(position, 1.0);
            out.uv = uv;
            return out;
        }
    ";
    let frag = "
        @group(0) @binding(0) var t_diffuse: texture_2d<f32>;
        @group(0) @binding(1) var s_diffuse: sampler;
        @group(0) @binding(2) var t_overlay: texture_2d<f32>;
        @group(0) @binding(3) var s_overlay: sampler;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return textureSample(t_diffuse, s_diffuse, uv) * textureSample(t_overlay, s_overlay, uv);
        }
    ";
    let data = ShaderData {
        name: "sprites".to_string(),
        vert: vert.to_string(),
        frag: frag.to_string(),
        uniforms: vec![
            UniformData::new("t_diffuse", UniformType::Sampler2D),
            UniformData::new("t_overlay", UniformType::Sampler2D),
        ],
        attributes: vec![
            AttributeData::new("position", AttributeType::Vec3),
            AttributeData::new("uv", AttributeType::Vec2),
        ],
    };

    let mut program = LinkedProgram::link(&data).unwrap();
    assert_eq!(program.sampler2d().unwrap().name(), "t_diffuse");

    // The runner-up keeps working through `set`, it just lost the role.
    assert!(program.set("t_overlay", 7i32).is_ok());
    assert_eq!(program.sampler2d().unwrap().name(), "t_diffuse");
}
