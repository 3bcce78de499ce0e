//! Shader programs and uniform binding.
//!
//! A shader is described declaratively: two WGSL stage sources plus ordered
//! lists of the attributes and uniforms the host intends to bind. The
//! description is consumed once by [`Shader::new`](shader::Shader::new),
//! which compiles and links the stages, resolves every declared name against
//! the program and builds the GPU-side pipeline. Uniform values are staged
//! with [`Shader::set`](shader::Shader::set) and flushed to the GPU right
//! before each draw that uses the shader.

pub mod error;
pub mod program;
pub mod shader;

use crate::resources::texture::Texture;

pub use error::ShaderError;
pub use program::{Attribute, AttributeLocation, LinkedProgram, Uniform, UniformLocation};
pub use shader::Shader;

/// One half of a shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Semantic type of a declared uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    Int,
    Sampler2D,
}

impl UniformType {
    /// Byte size of the uniform's data as stored in its GPU buffer.
    /// Sampler uniforms carry no buffer data.
    pub fn size(&self) -> u64 {
        match self {
            UniformType::Float | UniformType::Int => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat4 => 64,
            UniformType::Sampler2D => 0,
        }
    }
}

/// Semantic type of a declared per-vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl AttributeType {
    pub fn size(&self) -> u64 {
        match self {
            AttributeType::Float => 4,
            AttributeType::Vec2 => 8,
            AttributeType::Vec3 => 12,
            AttributeType::Vec4 => 16,
        }
    }

    pub(crate) fn vertex_format(&self) -> wgpu::VertexFormat {
        match self {
            AttributeType::Float => wgpu::VertexFormat::Float32,
            AttributeType::Vec2 => wgpu::VertexFormat::Float32x2,
            AttributeType::Vec3 => wgpu::VertexFormat::Float32x3,
            AttributeType::Vec4 => wgpu::VertexFormat::Float32x4,
        }
    }
}

/// A uniform value staged on the CPU side.
///
/// Scalar and matrix values are plain bytes destined for a uniform buffer;
/// `Texture` rebinds the texture unit of a sampler-2D uniform.
#[derive(Debug, Clone)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat4([[f32; 4]; 4]),
    Int(i32),
    Texture(Texture),
}

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::Float(_) => UniformType::Float,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat4(_) => UniformType::Mat4,
            UniformValue::Int(_) => UniformType::Int,
            UniformValue::Texture(_) => UniformType::Sampler2D,
        }
    }

    /// Raw bytes for the uniform buffer upload. `None` for texture values.
    pub(crate) fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            UniformValue::Float(v) => Some(bytemuck::bytes_of(v).to_vec()),
            UniformValue::Vec2(v) => Some(bytemuck::cast_slice(v).to_vec()),
            UniformValue::Vec3(v) => Some(bytemuck::cast_slice(v).to_vec()),
            UniformValue::Vec4(v) => Some(bytemuck::cast_slice(v).to_vec()),
            UniformValue::Mat4(v) => Some(bytemuck::cast_slice(v).to_vec()),
            UniformValue::Int(v) => Some(bytemuck::bytes_of(v).to_vec()),
            UniformValue::Texture(_) => None,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        UniformValue::Int(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<[[f32; 4]; 4]> for UniformValue {
    fn from(v: [[f32; 4]; 4]) -> Self {
        UniformValue::Mat4(v)
    }
}

impl From<cgmath::Vector2<f32>> for UniformValue {
    fn from(v: cgmath::Vector2<f32>) -> Self {
        UniformValue::Vec2(v.into())
    }
}

impl From<cgmath::Vector3<f32>> for UniformValue {
    fn from(v: cgmath::Vector3<f32>) -> Self {
        UniformValue::Vec3(v.into())
    }
}

impl From<cgmath::Vector4<f32>> for UniformValue {
    fn from(v: cgmath::Vector4<f32>) -> Self {
        UniformValue::Vec4(v.into())
    }
}

impl From<cgmath::Matrix4<f32>> for UniformValue {
    fn from(v: cgmath::Matrix4<f32>) -> Self {
        UniformValue::Mat4(v.into())
    }
}

impl From<Texture> for UniformValue {
    fn from(v: Texture) -> Self {
        UniformValue::Texture(v)
    }
}

/// Declaration of one uniform: a name, its semantic type and an optional
/// initial value.
#[derive(Debug, Clone)]
pub struct UniformData {
    pub name: String,
    pub ty: UniformType,
    pub value: Option<UniformValue>,
}

impl UniformData {
    pub fn new(name: impl Into<String>, ty: UniformType) -> Self {
        Self {
            name: name.into(),
            ty,
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, ty: UniformType, value: impl Into<UniformValue>) -> Self {
        Self {
            name: name.into(),
            ty,
            value: Some(value.into()),
        }
    }
}

/// Declaration of one per-vertex attribute.
#[derive(Debug, Clone)]
pub struct AttributeData {
    pub name: String,
    pub ty: AttributeType,
}

impl AttributeData {
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Immutable description of a shader program, consumed once at construction.
///
/// `vert` and `frag` are WGSL source texts; `attributes` describes the
/// interleaved vertex buffer layout in declaration order and `uniforms`
/// the values the host intends to stage.
#[derive(Debug, Clone)]
pub struct ShaderData {
    pub name: String,
    pub vert: String,
    pub frag: String,
    pub uniforms: Vec<UniformData>,
    pub attributes: Vec<AttributeData>,
}
