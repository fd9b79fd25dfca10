use std::collections::HashMap;

use crate::backend::{Backend, BackendError, ProgramId};
use crate::resources::{Handle, Shader};

/// Name under which the built-in debug shader is registered.
pub const DEBUG_SHADER_NAME: &str = "DebugSimple";

/// Named shaders owned or published by the renderer.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    shaders: HashMap<String, Handle<Shader>>,
}

impl ShaderLibrary {
    pub fn register(&mut self, name: impl Into<String>, shader: Handle<Shader>) {
        let name = name.into();
        log::debug!("shader '{}' registered", name);
        self.shaders.insert(name, shader);
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<Handle<Shader>> {
        self.shaders.get(name).copied()
    }

    pub fn unregister(&mut self, name: &str) -> Option<Handle<Shader>> {
        self.shaders.remove(name)
    }

    /// Drops every name bound to a released shader.
    pub fn forget(&mut self, shader: Handle<Shader>) {
        self.shaders.retain(|_, h| *h != shader);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}

const CORE_VERTEX: &str = "#version 140
in vec3 VertexPosition;
uniform mat4 WorldViewProjMatrix;
void main()
{
    gl_Position = WorldViewProjMatrix * vec4(VertexPosition, 1.0);
}
";

const CORE_FRAGMENT: &str = "#version 140
out vec4 RenderTarget0;
uniform vec4 Color;
void main()
{
    RenderTarget0 = Color;
}
";

const COMPAT_VERTEX: &str = "#version 110
attribute vec3 VertexPosition;
uniform mat4 WorldViewProjMatrix;
void main()
{
    gl_Position = WorldViewProjMatrix * vec4(VertexPosition, 1.0);
}
";

const COMPAT_FRAGMENT: &str = "#version 110
uniform vec4 Color;
void main()
{
    gl_FragColor = Color;
}
";

/// Vertex and fragment sources of the debug shader for a GLSL version.
///
/// Core profile from 140 on, compatibility profile below.
pub fn debug_shader_sources(glsl_version: u32) -> (&'static str, &'static str) {
    if glsl_version >= 140 {
        (CORE_VERTEX, CORE_FRAGMENT)
    } else {
        (COMPAT_VERTEX, COMPAT_FRAGMENT)
    }
}

pub fn compile_debug_shader<B: Backend>(backend: &mut B, glsl_version: u32) -> Result<ProgramId, BackendError> {
    let (vertex, fragment) = debug_shader_sources(glsl_version);
    backend.create_program(vertex, fragment)
}
