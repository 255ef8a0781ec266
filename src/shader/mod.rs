use std::collections::HashMap;
use bytemuck::Zeroable;
use glam::{Mat4, Vec2, Vec3, Vec4};

pub const MODEL: &str = "model";
pub const OBJECT_COLOR: &str = "objectColor";
pub const OBJECT_TEXTURE: &str = "objectTexture";
pub const USE_TEXTURE: &str = "bUseTexture";
pub const USE_LIGHTING: &str = "bUseLighting";
pub const UV_SCALE: &str = "UVscale";

pub const MATERIAL_AMBIENT_COLOR: &str = "material.ambientColor";
pub const MATERIAL_AMBIENT_STRENGTH: &str = "material.ambientStrength";
pub const MATERIAL_DIFFUSE_COLOR: &str = "material.diffuseColor";
pub const MATERIAL_SPECULAR_COLOR: &str = "material.specularColor";
pub const MATERIAL_SHININESS: &str = "material.shininess";

/// Number of `lightSources[i]` entries the scene shader understands.
pub const MAX_LIGHTS: usize = 4;

pub fn light_uniform_name(index: usize, field: &str) -> String {
    format!("lightSources[{}].{}", index, field)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Bool(bool),
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Sampler2D(i32),
}

/// By-name uniform interface the scene code talks to.
pub trait ShaderUniforms {
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value));
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value));
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value));
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value));
    }

    fn set_sampler2d(&mut self, name: &str, slot: i32) {
        self.set_uniform(name, UniformValue::Sampler2D(slot));
    }
}

/// Per-draw block, laid out to match `ObjectUniform` in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub color: [f32; 4],
    pub uv_scale: [f32; 4],
    // rgb = ambient color, w = ambient strength
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    // rgb = specular color, w = shininess
    pub specular: [f32; 4],
    // x = use texture, y = texture slot
    pub flags: [i32; 4],
}

impl ObjectUniform {
    pub fn uses_texture(&self) -> bool {
        self.flags[0] != 0
    }

    pub fn texture_slot(&self) -> Option<usize> {
        usize::try_from(self.flags[1]).ok()
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    // x = focal strength, y = specular intensity, z = enabled
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub lights: [LightUniform; MAX_LIGHTS],
    // x = use lighting
    pub flags: [u32; 4],
}

/// Keeps the current value of every uniform that has been set, the way a
/// linked shader program keeps its uniforms between draws.
#[derive(Debug, Default, Clone)]
pub struct ShaderState {
    values: HashMap<String, UniformValue>,
}

impl ShaderState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn flag(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(UniformValue::Bool(b)) => *b,
            Some(UniformValue::Int(i)) => *i != 0,
            _ => false,
        }
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        match self.values.get(name) {
            Some(UniformValue::Float(f)) => Some(*f),
            _ => None,
        }
    }

    pub fn vec2(&self, name: &str) -> Option<Vec2> {
        match self.values.get(name) {
            Some(UniformValue::Vec2(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vec3(&self, name: &str) -> Option<Vec3> {
        match self.values.get(name) {
            Some(UniformValue::Vec3(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn vec4(&self, name: &str) -> Option<Vec4> {
        match self.values.get(name) {
            Some(UniformValue::Vec4(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn mat4(&self, name: &str) -> Option<Mat4> {
        match self.values.get(name) {
            Some(UniformValue::Mat4(m)) => Some(*m),
            _ => None,
        }
    }

    pub fn sampler(&self, name: &str) -> Option<i32> {
        match self.values.get(name) {
            Some(UniformValue::Sampler2D(slot)) | Some(UniformValue::Int(slot)) => Some(*slot),
            _ => None,
        }
    }

    pub fn object_uniform(&self) -> ObjectUniform {
        let model = self.mat4(MODEL).unwrap_or(Mat4::IDENTITY);
        let normal_matrix = if model.determinant().abs() > f32::EPSILON {
            model.inverse().transpose()
        } else {
            Mat4::IDENTITY
        };
        let uv_scale = self.vec2(UV_SCALE).unwrap_or(Vec2::ONE);
        let ambient = self.vec3(MATERIAL_AMBIENT_COLOR).unwrap_or(Vec3::ZERO);
        let diffuse = self.vec3(MATERIAL_DIFFUSE_COLOR).unwrap_or(Vec3::ZERO);
        let specular = self.vec3(MATERIAL_SPECULAR_COLOR).unwrap_or(Vec3::ZERO);

        ObjectUniform {
            model: model.to_cols_array_2d(),
            normal_matrix: normal_matrix.to_cols_array_2d(),
            color: self.vec4(OBJECT_COLOR).unwrap_or(Vec4::ONE).to_array(),
            uv_scale: [uv_scale.x, uv_scale.y, 0.0, 0.0],
            ambient: ambient.extend(self.float(MATERIAL_AMBIENT_STRENGTH).unwrap_or(0.0)).to_array(),
            diffuse: diffuse.extend(0.0).to_array(),
            specular: specular.extend(self.float(MATERIAL_SHININESS).unwrap_or(0.0)).to_array(),
            flags: [
                self.flag(USE_TEXTURE) as i32,
                self.sampler(OBJECT_TEXTURE).unwrap_or(-1),
                0,
                0,
            ],
        }
    }

    pub fn lighting_uniform(&self) -> LightingUniform {
        let mut lights = [LightUniform::zeroed(); MAX_LIGHTS];
        for (index, light) in lights.iter_mut().enumerate() {
            let Some(position) = self.vec3(&light_uniform_name(index, "position")) else {
                continue;
            };
            let color = |field: &str| {
                self.vec3(&light_uniform_name(index, field))
                    .unwrap_or(Vec3::ZERO)
                    .extend(0.0)
                    .to_array()
            };
            *light = LightUniform {
                position: position.extend(1.0).to_array(),
                ambient: color("ambientColor"),
                diffuse: color("diffuseColor"),
                specular: color("specularColor"),
                params: [
                    self.float(&light_uniform_name(index, "focalStrength")).unwrap_or(1.0),
                    self.float(&light_uniform_name(index, "specularIntensity")).unwrap_or(0.0),
                    1.0,
                    0.0,
                ],
            };
        }

        LightingUniform {
            lights,
            flags: [self.flag(USE_LIGHTING) as u32, 0, 0, 0],
        }
    }
}

impl ShaderUniforms for ShaderState {
    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        match self.values.get_mut(name) {
            Some(slot) => *slot = value,
            None => {
                self.values.insert(name.to_string(), value);
            }
        }
    }
}
