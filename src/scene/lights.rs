use glam::Vec3;

use crate::shader::{light_uniform_name, ShaderUniforms};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSource {
    pub position: Vec3,
    pub ambient_color: Vec3,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub focal_strength: f32,
    pub specular_intensity: f32,
}

impl LightSource {
    /// Writes this light into `lightSources[index]`.
    pub fn apply(&self, index: usize, shader: &mut impl ShaderUniforms) {
        shader.set_vec3(&light_uniform_name(index, "position"), self.position);
        shader.set_vec3(&light_uniform_name(index, "ambientColor"), self.ambient_color);
        shader.set_vec3(&light_uniform_name(index, "diffuseColor"), self.diffuse_color);
        shader.set_vec3(&light_uniform_name(index, "specularColor"), self.specular_color);
        shader.set_float(&light_uniform_name(index, "focalStrength"), self.focal_strength);
        shader.set_float(
            &light_uniform_name(index, "specularIntensity"),
            self.specular_intensity,
        );
    }
}

/// Ceiling light followed by the desk lamp bulb.
pub fn scene_lights() -> [LightSource; 2] {
    [
        LightSource {
            position: Vec3::new(0.0, 42.0, 0.0),
            ambient_color: Vec3::splat(0.01),
            diffuse_color: Vec3::splat(0.01),
            specular_color: Vec3::splat(0.5),
            focal_strength: 32.0,
            specular_intensity: 0.2,
        },
        LightSource {
            position: Vec3::new(-5.85, 20.0, -12.95),
            ambient_color: Vec3::splat(0.01),
            diffuse_color: Vec3::splat(0.4),
            specular_color: Vec3::ZERO,
            focal_strength: 32.0,
            specular_intensity: 0.2,
        },
    ]
}
