/// Renderer setup parameters.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Size in bytes of the per-instance data buffer.
    ///
    /// Instanced draws are capped at `instance_buffer_size / instance layout stride`.
    pub instance_buffer_size: u64,

    /// Compile and register the `DebugSimple` shader during setup.
    pub compile_debug_shader: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            instance_buffer_size: 1024 * 1024,
            compile_debug_shader: true,
        }
    }
}
