//! Stage compilation, program linking and reflection.
//!
//! Everything in this module runs on the CPU: WGSL sources are parsed and
//! validated through naga, the two stage interfaces are checked against each
//! other, and the declared attribute/uniform names are resolved to concrete
//! binding slots. The GPU objects are created afterwards by
//! [`Shader`](super::shader::Shader) from the reflection data collected here.

use std::collections::{HashMap, HashSet};

use super::{
    AttributeType, ShaderData, ShaderError, ShaderStage, UniformType, UniformValue,
};

/// Resolved slot of a vertex attribute.
///
/// A declared attribute the program does not consume stays `Unresolved`
/// instead of silently carrying a null handle; the vertex layout skips it
/// and a warning is logged at link time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeLocation {
    Located(u32),
    Unresolved,
}

/// Resolved binding of a uniform.
///
/// Same policy as [`AttributeLocation`]: a name the program never declares
/// resolves to `Unresolved`, is warned about once, and is ignored when
/// staged values are flushed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformLocation {
    Located { group: u32, binding: u32 },
    Unresolved,
}

/// A declared per-vertex attribute with its resolved slot.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    ty: AttributeType,
    location: AttributeLocation,
}

impl Attribute {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> AttributeType {
        self.ty
    }

    pub fn location(&self) -> AttributeLocation {
        self.location
    }
}

/// A declared uniform with its resolved binding and staged value.
#[derive(Debug, Clone)]
pub struct Uniform {
    name: String,
    ty: UniformType,
    value: Option<UniformValue>,
    location: UniformLocation,
    pub(crate) in_vertex: bool,
    pub(crate) in_fragment: bool,
    pub(crate) has_companion_sampler: bool,
    pub(crate) dirty: bool,
}

impl Uniform {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> UniformType {
        self.ty
    }

    pub fn location(&self) -> UniformLocation {
        self.location
    }

    /// The currently staged value, if any. Staged values only reach the GPU
    /// through the shader's flush step, never through `set` itself.
    pub fn value(&self) -> Option<&UniformValue> {
        self.value.as_ref()
    }
}

/// A compiled, linked and reflected program description.
///
/// Owns the per-uniform staging records and the by-name index used by
/// [`set`](Self::set). The stage IR built during linking is dropped as soon
/// as reflection finishes.
#[derive(Debug)]
pub struct LinkedProgram {
    vertex_entry: String,
    fragment_entry: String,
    attributes: Vec<Attribute>,
    uniforms: Vec<Uniform>,
    by_name: HashMap<String, usize>,
    sampler2d: Option<usize>,
}

impl LinkedProgram {
    /// Compiles both stages, links them and resolves every declared name.
    ///
    /// Each stage is parsed and validated independently; either failure is a
    /// [`ShaderError::Compilation`] carrying that stage's diagnostic log.
    /// Linking then requires a vertex and a fragment entry point, a fragment
    /// input interface fully written by the vertex stage, unique declaration
    /// names, consistent bindings across stages, and a declaration for every
    /// resource binding the sources use.
    pub fn link(data: &ShaderData) -> Result<Self, ShaderError> {
        let vert = compile_stage(&data.name, ShaderStage::Vertex, &data.vert)?;
        let frag = compile_stage(&data.name, ShaderStage::Fragment, &data.frag)?;

        let link_err = |log: String| ShaderError::Link {
            name: data.name.clone(),
            log,
        };

        let vertex_entry = entry_point(&vert, naga::ShaderStage::Vertex)
            .ok_or_else(|| link_err("vertex stage has no vertex entry point".into()))?;
        let fragment_entry = entry_point(&frag, naga::ShaderStage::Fragment)
            .ok_or_else(|| link_err("fragment stage has no fragment entry point".into()))?;

        // Stage interface: every fragment input must be fed by a vertex output.
        let outputs = entry_outputs(&vert, vertex_entry);
        for (name, location) in entry_inputs(&frag, fragment_entry) {
            if !outputs.contains(&location) {
                return Err(link_err(format!(
                    "fragment input `{name}` at location {location} is not written by the vertex stage"
                )));
            }
        }

        let mut seen = HashSet::new();
        for uniform in &data.uniforms {
            if !seen.insert(uniform.name.as_str()) {
                return Err(link_err(format!(
                    "duplicate uniform declaration `{}`",
                    uniform.name
                )));
            }
        }
        seen.clear();
        for attribute in &data.attributes {
            if !seen.insert(attribute.name.as_str()) {
                return Err(link_err(format!(
                    "duplicate attribute declaration `{}`",
                    attribute.name
                )));
            }
        }

        let inputs = entry_inputs(&vert, vertex_entry);
        let attributes = data
            .attributes
            .iter()
            .map(|a| {
                let location = inputs
                    .iter()
                    .find(|(name, _)| name == &a.name)
                    .map(|(_, slot)| AttributeLocation::Located(*slot))
                    .unwrap_or_else(|| {
                        log::warn!(
                            "attribute `{}` in shader `{}` is not consumed by the vertex stage",
                            a.name,
                            data.name
                        );
                        AttributeLocation::Unresolved
                    });
                Attribute {
                    name: a.name.clone(),
                    ty: a.ty,
                    location,
                }
            })
            .collect::<Vec<_>>();

        let vert_globals = resource_globals(&vert);
        let frag_globals = resource_globals(&frag);

        let mut uniforms = Vec::with_capacity(data.uniforms.len());
        let mut by_name = HashMap::new();
        let mut sampler2d = None;
        for (index, u) in data.uniforms.iter().enumerate() {
            let in_vert = find_global(&vert_globals, &u.name);
            let in_frag = find_global(&frag_globals, &u.name);

            let location = match (in_vert, in_frag) {
                (Some(v), Some(f)) if (v.group, v.binding) != (f.group, f.binding) => {
                    return Err(link_err(format!(
                        "uniform `{}` is bound at group {} binding {} in the vertex stage \
                         and group {} binding {} in the fragment stage",
                        u.name, v.group, v.binding, f.group, f.binding
                    )));
                }
                (Some(g), _) | (None, Some(g)) => UniformLocation::Located {
                    group: g.group,
                    binding: g.binding,
                },
                (None, None) => {
                    log::warn!(
                        "uniform `{}` in shader `{}` did not resolve to a binding",
                        u.name,
                        data.name
                    );
                    UniformLocation::Unresolved
                }
            };

            // The texture's filtering sampler is expected at the next binding
            // slot in the same group.
            let has_companion_sampler = match (u.ty, location) {
                (UniformType::Sampler2D, UniformLocation::Located { group, binding }) => {
                    has_sampler_at(&vert_globals, group, binding + 1)
                        || has_sampler_at(&frag_globals, group, binding + 1)
                }
                _ => false,
            };

            if u.ty == UniformType::Sampler2D && sampler2d.is_none() {
                sampler2d = Some(index);
            }

            by_name.insert(u.name.clone(), index);
            uniforms.push(Uniform {
                name: u.name.clone(),
                ty: u.ty,
                value: u.value.clone(),
                location,
                in_vertex: in_vert.is_some(),
                in_fragment: in_frag.is_some(),
                has_companion_sampler,
                dirty: false,
            });
        }

        // Two declarations fighting over one binding cannot form a layout.
        for (i, a) in uniforms.iter().enumerate() {
            for b in &uniforms[i + 1..] {
                if let (
                    UniformLocation::Located { group, binding },
                    UniformLocation::Located {
                        group: other_group,
                        binding: other_binding,
                    },
                ) = (a.location, b.location)
                {
                    if (group, binding) == (other_group, other_binding) {
                        return Err(link_err(format!(
                            "uniforms `{}` and `{}` share group {group} binding {binding}",
                            a.name, b.name
                        )));
                    }
                }
            }
        }

        // Every binding the sources use must be declared, or it could never
        // be bound and the first draw would fail deep inside the backend.
        for (stage, globals) in [
            (ShaderStage::Vertex, &vert_globals),
            (ShaderStage::Fragment, &frag_globals),
        ] {
            check_declared(&data.name, stage, globals, &uniforms)?;
        }

        Ok(Self {
            vertex_entry: vertex_entry.name.clone(),
            fragment_entry: fragment_entry.name.clone(),
            attributes,
            uniforms,
            by_name,
            sampler2d,
        })
    }

    /// Stages `value` on the uniform named `name`.
    ///
    /// Fails with [`ShaderError::UnknownUniform`] for unregistered names and
    /// leaves every existing staged value untouched in that case. The GPU is
    /// not involved; upload happens in the shader's flush step.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ShaderError> {
        let Some(&index) = self.by_name.get(name) else {
            return Err(ShaderError::UnknownUniform(name.to_string()));
        };
        let uniform = &mut self.uniforms[index];
        uniform.value = Some(value.into());
        uniform.dirty = true;
        Ok(())
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.by_name.get(name).map(|&i| &self.uniforms[i])
    }

    pub fn uniforms(&self) -> &[Uniform] {
        &self.uniforms
    }

    pub(crate) fn uniforms_mut(&mut self) -> &mut [Uniform] {
        &mut self.uniforms
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The designated texture-sampler uniform: the first declared with the
    /// sampler-2D type. Later sampler uniforms stay usable through `set` but
    /// do not take over the role.
    pub fn sampler2d(&self) -> Option<&Uniform> {
        self.sampler2d.map(|i| &self.uniforms[i])
    }

    pub fn vertex_entry(&self) -> &str {
        &self.vertex_entry
    }

    pub fn fragment_entry(&self) -> &str {
        &self.fragment_entry
    }
}

/// Parses and validates one stage. The returned module only lives until
/// reflection is done.
fn compile_stage(
    shader: &str,
    stage: ShaderStage,
    source: &str,
) -> Result<naga::Module, ShaderError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Compilation {
        name: shader.to_string(),
        stage,
        log: e.emit_to_string(source),
    })?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    );
    validator
        .validate(&module)
        .map_err(|e| ShaderError::Compilation {
            name: shader.to_string(),
            stage,
            log: format!("{e:?}"),
        })?;

    Ok(module)
}

fn entry_point(module: &naga::Module, stage: naga::ShaderStage) -> Option<&naga::EntryPoint> {
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

/// Named `@location` inputs of an entry point, covering both direct
/// arguments and members of struct arguments.
fn entry_inputs(module: &naga::Module, entry: &naga::EntryPoint) -> Vec<(String, u32)> {
    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        match &arg.binding {
            Some(naga::Binding::Location { location, .. }) => {
                if let Some(name) = &arg.name {
                    inputs.push((name.clone(), *location));
                }
            }
            Some(naga::Binding::BuiltIn(_)) => {}
            None => {
                if let naga::TypeInner::Struct { members, .. } = &module.types[arg.ty].inner {
                    for member in members {
                        if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                            if let Some(name) = &member.name {
                                inputs.push((name.clone(), *location));
                            }
                        }
                    }
                }
            }
        }
    }
    inputs
}

/// `@location` slots written by an entry point's result.
fn entry_outputs(module: &naga::Module, entry: &naga::EntryPoint) -> Vec<u32> {
    let mut outputs = Vec::new();
    let Some(result) = &entry.function.result else {
        return outputs;
    };
    match &result.binding {
        Some(naga::Binding::Location { location, .. }) => outputs.push(*location),
        Some(naga::Binding::BuiltIn(_)) => {}
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[result.ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        outputs.push(*location);
                    }
                }
            }
        }
    }
    outputs
}

#[derive(Debug, Clone)]
struct ResourceGlobal {
    name: Option<String>,
    group: u32,
    binding: u32,
    is_sampler: bool,
}

fn resource_globals(module: &naga::Module) -> Vec<ResourceGlobal> {
    module
        .global_variables
        .iter()
        .filter_map(|(_, var)| {
            let rb = var.binding.as_ref()?;
            let is_sampler = matches!(
                module.types[var.ty].inner,
                naga::TypeInner::Sampler { .. }
            );
            Some(ResourceGlobal {
                name: var.name.clone(),
                group: rb.group,
                binding: rb.binding,
                is_sampler,
            })
        })
        .collect()
}

fn find_global<'a>(globals: &'a [ResourceGlobal], name: &str) -> Option<&'a ResourceGlobal> {
    globals.iter().find(|g| g.name.as_deref() == Some(name))
}

fn has_sampler_at(globals: &[ResourceGlobal], group: u32, binding: u32) -> bool {
    globals
        .iter()
        .any(|g| g.is_sampler && g.group == group && g.binding == binding)
}

fn check_declared(
    shader: &str,
    stage: ShaderStage,
    globals: &[ResourceGlobal],
    uniforms: &[Uniform],
) -> Result<(), ShaderError> {
    for global in globals {
        let declared = uniforms.iter().any(|u| match u.location {
            UniformLocation::Located { group, binding } => {
                (global.group, global.binding) == (group, binding)
                    || (u.has_companion_sampler
                        && global.is_sampler
                        && (global.group, global.binding) == (group, binding + 1))
            }
            UniformLocation::Unresolved => false,
        });
        if !declared {
            let name = global.name.as_deref().unwrap_or("<anonymous>");
            return Err(ShaderError::Link {
                name: shader.to_string(),
                log: format!(
                    "global `{name}` at group {} binding {} in the {stage} stage is not declared",
                    global.group, global.binding
                ),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::{AttributeData, UniformData};

    const VERT: &str = "
        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position, 1.0);
        }
    ";

    const VERT_UV: &str = "
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

    const VERT_OFFSET: &str = "
        @group(0) @binding(1) var<uniform> offset: vec2<f32>;

        @vertex
        fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
            return vec4<f32>(position.xy + offset, position.z, 1.0);
        }
    ";

    const FRAG_COLOR: &str = "
        @group(0) @binding(0) var<uniform> color: vec4<f32>;

        @fragment
        fn fs_main() -> @location(0) vec4<f32> {
            return color;
        }
    ";

    const FRAG_TEX: &str = "
        @group(0) @binding(0) var t_sprite: texture_2d<f32>;
        @group(0) @binding(1) var s_sprite: sampler;

        @fragment
        fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
            return textureSample(t_sprite, s_sprite, uv);
        }
    ";

    const FRAG_TINT_INPUT: &str = "
        @fragment
        fn fs_main(@location(0) tint: vec4<f32>) -> @location(0) vec4<f32> {
            return tint;
        }
    ";

    fn data(
        vert: &str,
        frag: &str,
        uniforms: Vec<UniformData>,
        attributes: Vec<AttributeData>,
    ) -> ShaderData {
        ShaderData {
            name: "test".to_string(),
            vert: vert.to_string(),
            frag: frag.to_string(),
            uniforms,
            attributes,
        }
    }

    #[test]
    fn resolves_attribute_slots_in_declaration_order() {
        let program = LinkedProgram::link(&data(
            VERT_UV,
            FRAG_TEX,
            vec![UniformData::new("t_sprite", UniformType::Sampler2D)],
            vec![
                AttributeData::new("uv", AttributeType::Vec2),
                AttributeData::new("position", AttributeType::Vec3),
            ],
        ))
        .unwrap();

        let attributes = program.attributes();
        assert_eq!(attributes[0].location(), AttributeLocation::Located(1));
        assert_eq!(attributes[1].location(), AttributeLocation::Located(0));
    }

    #[test]
    fn unconsumed_attribute_stays_unresolved() {
        let program = LinkedProgram::link(&data(
            VERT,
            FRAG_COLOR,
            vec![UniformData::new("color", UniformType::Vec4)],
            vec![
                AttributeData::new("position", AttributeType::Vec3),
                AttributeData::new("normal", AttributeType::Vec3),
            ],
        ))
        .unwrap();

        assert_eq!(
            program.attributes()[1].location(),
            AttributeLocation::Unresolved
        );
    }

    #[test]
    fn resolves_uniform_bindings_and_stage_visibility() {
        let program = LinkedProgram::link(&data(
            VERT_OFFSET,
            FRAG_COLOR,
            vec![
                UniformData::new("offset", UniformType::Vec2),
                UniformData::new("color", UniformType::Vec4),
            ],
            vec![AttributeData::new("position", AttributeType::Vec3)],
        ))
        .unwrap();

        let offset = program.uniform("offset").unwrap();
        assert_eq!(
            offset.location(),
            UniformLocation::Located { group: 0, binding: 1 }
        );
        assert!(offset.in_vertex && !offset.in_fragment);

        let color = program.uniform("color").unwrap();
        assert_eq!(
            color.location(),
            UniformLocation::Located { group: 0, binding: 0 }
        );
        assert!(!color.in_vertex && color.in_fragment);
    }

    #[test]
    fn undeclared_uniform_resolves_to_unresolved() {
        let program = LinkedProgram::link(&data(
            VERT,
            FRAG_COLOR,
            vec![
                UniformData::new("color", UniformType::Vec4),
                UniformData::new("opacity", UniformType::Float),
            ],
            vec![AttributeData::new("position", AttributeType::Vec3)],
        ))
        .unwrap();

        assert_eq!(
            program.uniform("opacity").unwrap().location(),
            UniformLocation::Unresolved
        );
        // Staging still works; the flush step is what skips it.
        let mut program = program;
        program.set("opacity", 0.5).unwrap();
    }

    #[test]
    fn texture_uniform_finds_its_companion_sampler() {
        let program = LinkedProgram::link(&data(
            VERT_UV,
            FRAG_TEX,
            vec![UniformData::new("t_sprite", UniformType::Sampler2D)],
            vec![
                AttributeData::new("position", AttributeType::Vec3),
                AttributeData::new("uv", AttributeType::Vec2),
            ],
        ))
        .unwrap();

        let sprite = program.uniform("t_sprite").unwrap();
        assert!(sprite.has_companion_sampler);
        assert_eq!(program.sampler2d().unwrap().name(), "t_sprite");
    }

    #[test]
    fn invalid_vertex_source_is_a_vertex_compilation_error() {
        let err = LinkedProgram::link(&data("definitely not wgsl", FRAG_COLOR, vec![], vec![]))
            .unwrap_err();
        match err {
            ShaderError::Compilation { stage, log, .. } => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected a compilation error, got {other:?}"),
        }
    }

    #[test]
    fn invalid_fragment_source_is_a_fragment_compilation_error() {
        let err =
            LinkedProgram::link(&data(VERT, "fn broken( {", vec![], vec![])).unwrap_err();
        match err {
            ShaderError::Compilation { stage, .. } => assert_eq!(stage, ShaderStage::Fragment),
            other => panic!("expected a compilation error, got {other:?}"),
        }
    }

    #[test]
    fn missing_vertex_entry_point_fails_to_link() {
        let err = LinkedProgram::link(&data(FRAG_COLOR, FRAG_COLOR, vec![], vec![])).unwrap_err();
        match err {
            ShaderError::Link { log, .. } => assert!(log.contains("vertex entry point")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn unmatched_fragment_input_fails_to_link() {
        let err = LinkedProgram::link(&data(
            VERT,
            FRAG_TINT_INPUT,
            vec![],
            vec![AttributeData::new("position", AttributeType::Vec3)],
        ))
        .unwrap_err();
        match err {
            ShaderError::Link { log, .. } => {
                assert!(log.contains("tint"));
                assert!(log.contains("not written by the vertex stage"));
            }
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_uniform_declaration_fails_to_link() {
        let err = LinkedProgram::link(&data(
            VERT,
            FRAG_COLOR,
            vec![
                UniformData::new("color", UniformType::Vec4),
                UniformData::new("color", UniformType::Vec4),
            ],
            vec![],
        ))
        .unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn duplicate_attribute_declaration_fails_to_link() {
        let err = LinkedProgram::link(&data(
            VERT,
            FRAG_COLOR,
            vec![UniformData::new("color", UniformType::Vec4)],
            vec![
                AttributeData::new("position", AttributeType::Vec3),
                AttributeData::new("position", AttributeType::Vec3),
            ],
        ))
        .unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
    }

    #[test]
    fn conflicting_bindings_across_stages_fail_to_link() {
        // `offset` (vertex) and `color` (fragment) both claim binding 1.
        let frag = "
            @group(0) @binding(1) var<uniform> color: vec4<f32>;

            @fragment
            fn fs_main() -> @location(0) vec4<f32> {
                return color;
            }
        ";
        let err = LinkedProgram::link(&data(
            VERT_OFFSET,
            frag,
            vec![
                UniformData::new("offset", UniformType::Vec2),
                UniformData::new("color", UniformType::Vec4),
            ],
            vec![AttributeData::new("position", AttributeType::Vec3)],
        ))
        .unwrap_err();
        match err {
            ShaderError::Link { log, .. } => assert!(log.contains("share group 0 binding 1")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_global_fails_to_link() {
        // FRAG_COLOR binds `color`, but the declaration list omits it.
        let err = LinkedProgram::link(&data(VERT, FRAG_COLOR, vec![], vec![])).unwrap_err();
        match err {
            ShaderError::Link { log, .. } => assert!(log.contains("color")),
            other => panic!("expected a link error, got {other:?}"),
        }
    }

    #[test]
    fn set_stages_a_value_without_touching_others() {
        let mut program = LinkedProgram::link(&data(
            VERT_OFFSET,
            FRAG_COLOR,
            vec![
                UniformData::with_value("offset", UniformType::Vec2, [0.0f32, 0.0]),
                UniformData::with_value("color", UniformType::Vec4, [1.0f32, 0.0, 0.0, 1.0]),
            ],
            vec![AttributeData::new("position", AttributeType::Vec3)],
        ))
        .unwrap();

        program.set("color", [0.0f32, 1.0, 0.0, 1.0]).unwrap();
        match program.uniform("color").unwrap().value() {
            Some(UniformValue::Vec4(v)) => assert_eq!(*v, [0.0, 1.0, 0.0, 1.0]),
            other => panic!("unexpected staged value {other:?}"),
        }

        let err = program.set("missing", 1.0f32).unwrap_err();
        assert!(matches!(err, ShaderError::UnknownUniform(name) if name == "missing"));

        // The failed set left both staged values alone.
        match program.uniform("offset").unwrap().value() {
            Some(UniformValue::Vec2(v)) => assert_eq!(*v, [0.0, 0.0]),
            other => panic!("unexpected staged value {other:?}"),
        }
        match program.uniform("color").unwrap().value() {
            Some(UniformValue::Vec4(v)) => assert_eq!(*v, [0.0, 1.0, 0.0, 1.0]),
            other => panic!("unexpected staged value {other:?}"),
        }
    }

    #[test]
    fn first_declared_sampler_takes_the_designated_role() {
        let frag = "
            @group(0) @binding(0) var t_a: texture_2d<f32>;
            @group(0) @binding(1) var s_a: sampler;
            @group(0) @binding(2) var t_b: texture_2d<f32>;
            @group(0) @binding(3) var s_b: sampler;

            @fragment
            fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
                return textureSample(t_a, s_a, uv) + textureSample(t_b, s_b, uv);
            }
        ";
        let program = LinkedProgram::link(&data(
            VERT_UV,
            frag,
            vec![
                UniformData::new("t_a", UniformType::Sampler2D),
                UniformData::new("t_b", UniformType::Sampler2D),
            ],
            vec![
                AttributeData::new("position", AttributeType::Vec3),
                AttributeData::new("uv", AttributeType::Vec2),
            ],
        ))
        .unwrap();

        assert_eq!(program.sampler2d().unwrap().name(), "t_a");
    }
}
