use super::ShaderStage;

/// Errors raised while building or driving a shader program.
///
/// Compilation and link failures are unrecoverable for the shader being
/// constructed: no partially-usable program is ever handed out.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    /// A stage's source failed to parse or validate. `log` carries the
    /// stage's diagnostic output.
    #[error("shader `{name}`: {stage} stage failed to compile: {log}")]
    Compilation {
        name: String,
        stage: ShaderStage,
        log: String,
    },

    /// Both stages compiled but do not form a program (missing entry point,
    /// interface mismatch, conflicting or duplicate bindings).
    #[error("shader `{name}`: unable to link program: {log}")]
    Link { name: String, log: String },

    /// `set` was called with a name no declaration registered.
    #[error("uniform `{0}` does not exist on this shader")]
    UnknownUniform(String),
}
