use crate::model::{MeshDraw, Primitive};
use crate::shader::{LightingUniform, ObjectUniform, ShaderState, ShaderUniforms, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub primitive: Primitive,
    pub object: ObjectUniform,
}

/// Collects one frame's draw calls together with the uniform state each was
/// issued under. Uniform values survive `begin_frame`, draws do not.
#[derive(Debug, Default)]
pub struct FrameRecorder {
    shader: ShaderState,
    draws: Vec<DrawCall>,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn shader(&self) -> &ShaderState {
        &self.shader
    }

    pub fn lighting(&self) -> LightingUniform {
        self.shader.lighting_uniform()
    }
}

impl ShaderUniforms for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.shader.set_uniform(name, value);
    }
}

impl MeshDraw for FrameRecorder {
    fn draw(&mut self, primitive: Primitive) {
        self.draws.push(DrawCall {
            primitive,
            object: self.shader.object_uniform(),
        });
    }
}
