use glam::Vec3;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient_color: Vec3,
    pub ambient_strength: f32,
    pub diffuse_color: Vec3,
    pub specular_color: Vec3,
    pub shininess: f32,
}

/// Append-only list of tagged materials. Lookups scan in definition order,
/// so a repeated tag never replaces the first definition.
#[derive(Debug, Default)]
pub struct MaterialRegistry {
    materials: Vec<(String, Material)>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, tag: impl Into<String>, material: Material) {
        let tag = tag.into();
        if self.find(&tag).is_some() {
            log::warn!("Material '{}' is already defined; the new definition is shadowed", tag);
        }
        self.materials.push((tag, material));
    }

    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|(name, _)| name == tag)
            .map(|(_, material)| material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.materials.iter().map(|(tag, _)| tag.as_str())
    }
}
