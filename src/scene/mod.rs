pub mod camera;
pub mod frame;
pub mod lights;
pub mod transform;

pub use camera::Camera;
pub use frame::{DrawCall, FrameRecorder};
pub use lights::{scene_lights, LightSource};
pub use transform::Transform;

use std::path::{Path, PathBuf};

use glam::{Vec2, Vec3, Vec4};

use crate::error::SceneError;
use crate::model::{
    BoxSide, CylinderParts, DecodedImage, Material, MaterialRegistry, MeshDraw, Primitive,
    ShapeMeshes, TextureRegistry, TextureUpload,
};
use crate::shader::{self, ShaderUniforms};

/// Image file and tag of every texture the scene uses, in slot order.
pub const SCENE_TEXTURES: [(&str, &str); 9] = [
    ("Ancient Flooring.JPG", "Floor"),
    ("backdrop.jpg", "Wall"),
    ("Wood_Floor.jpg", "Table"),
    ("keyboard.jpg", "keyboard"),
    ("Light.jpg", "light"),
    ("CanTop.jpg", "cantop"),
    ("CanSide.jpg", "canside"),
    ("book.jpg", "bookcover"),
    ("paperpages.jpg", "bookpages"),
];

const PLACEHOLDER_SIZE: u32 = 64;
const PLACEHOLDER_SQUARES: u32 = 8;

const LAPTOP_GREY: Vec4 = Vec4::new(0.627, 0.627, 0.627, 1.0);
const LAMP_BLACK: Vec4 = Vec4::new(0.031, 0.031, 0.031, 1.0);

/// Builds the desk scene: owns the texture and material tables and the
/// primitive meshes, and replays the fixed list of draws every frame.
pub struct SceneManager {
    texture_dir: PathBuf,
    strict_textures: bool,
    textures: TextureRegistry,
    materials: MaterialRegistry,
    meshes: ShapeMeshes,
}

impl SceneManager {
    pub fn new(texture_dir: impl Into<PathBuf>) -> Self {
        Self {
            texture_dir: texture_dir.into(),
            strict_textures: false,
            textures: TextureRegistry::new(),
            materials: MaterialRegistry::new(),
            meshes: ShapeMeshes::new(),
        }
    }

    /// When set, a scene texture that fails to load aborts `prepare_scene`
    /// instead of being replaced by a placeholder.
    pub fn with_strict_textures(mut self, strict: bool) -> Self {
        self.strict_textures = strict;
        self
    }

    pub fn texture_dir(&self) -> &Path {
        &self.texture_dir
    }

    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn materials(&self) -> &MaterialRegistry {
        &self.materials
    }

    pub fn meshes(&self) -> &ShapeMeshes {
        &self.meshes
    }

    /// Loads everything the scene needs. Call once before the first frame.
    pub fn prepare_scene(
        &mut self,
        shader: &mut impl ShaderUniforms,
        uploader: &mut impl TextureUpload,
    ) -> Result<(), SceneError> {
        self.load_scene_textures(uploader)?;
        self.define_object_materials();
        self.setup_scene_lights(shader);

        self.meshes.load_plane_mesh();
        self.meshes.load_box_mesh();
        self.meshes.load_sphere_mesh();
        self.meshes.load_pyramid3_mesh();
        self.meshes.load_pyramid4_mesh();
        self.meshes.load_cylinder_mesh();
        self.meshes.load_torus_mesh(0.1);
        self.meshes.load_tapered_cylinder_mesh();

        log::info!(
            "Scene prepared: {} textures, {} materials, {} meshes",
            self.textures.len(),
            self.materials.len(),
            self.meshes.iter().count()
        );
        Ok(())
    }

    pub fn load_scene_textures(&mut self, uploader: &mut impl TextureUpload) -> Result<(), SceneError> {
        for (file, tag) in SCENE_TEXTURES {
            let path = self.texture_dir.join(file);
            if let Err(err) = self.textures.load(&path, tag, uploader) {
                if self.strict_textures {
                    return Err(err.into());
                }
                log::warn!("Using placeholder for texture '{}': {}", tag, err);
                let placeholder = DecodedImage::checkerboard(PLACEHOLDER_SIZE, PLACEHOLDER_SQUARES);
                self.textures.register(tag, &placeholder, uploader)?;
            }
        }
        self.textures.bind_all(uploader);
        Ok(())
    }

    pub fn define_object_materials(&mut self) {
        self.materials.define(
            "wood",
            Material {
                ambient_color: Vec3::splat(0.1),
                ambient_strength: 0.2,
                diffuse_color: Vec3::splat(0.3),
                specular_color: Vec3::splat(0.1),
                shininess: 10.0,
            },
        );
        self.materials.define(
            "glass",
            Material {
                ambient_color: Vec3::splat(0.4),
                ambient_strength: 0.3,
                diffuse_color: Vec3::splat(0.3),
                specular_color: Vec3::splat(0.6),
                shininess: 85.0,
            },
        );
        self.materials.define(
            "wall",
            Material {
                ambient_color: Vec3::splat(0.6),
                ambient_strength: 0.6,
                diffuse_color: Vec3::new(0.6, 0.5, 0.1),
                specular_color: Vec3::ZERO,
                shininess: 0.0,
            },
        );
        self.materials.define(
            "floor",
            Material {
                ambient_color: Vec3::splat(0.6),
                ambient_strength: 0.6,
                diffuse_color: Vec3::new(0.2, 0.2, 0.1),
                specular_color: Vec3::ZERO,
                shininess: 0.0,
            },
        );
        self.materials.define(
            "metal",
            Material {
                ambient_color: Vec3::splat(0.3),
                ambient_strength: 0.3,
                diffuse_color: Vec3::splat(0.2),
                specular_color: Vec3::splat(0.5),
                shininess: 22.0,
            },
        );
        self.materials.define(
            "book",
            Material {
                ambient_color: Vec3::splat(0.4),
                ambient_strength: 0.2,
                diffuse_color: Vec3::splat(0.4),
                specular_color: Vec3::splat(0.1),
                shininess: 10.0,
            },
        );
    }

    pub fn setup_scene_lights(&self, shader: &mut impl ShaderUniforms) {
        shader.set_bool(shader::USE_LIGHTING, true);
        for (index, light) in scene_lights().iter().enumerate() {
            light.apply(index, shader);
        }
    }

    /// Releases every texture the scene uploaded.
    pub fn release_textures(&mut self, uploader: &mut impl TextureUpload) {
        self.textures.release_all(uploader);
    }

    pub fn set_transformations(
        &self,
        shader: &mut impl ShaderUniforms,
        scale: Vec3,
        x_rotation_degrees: f32,
        y_rotation_degrees: f32,
        z_rotation_degrees: f32,
        position: Vec3,
    ) {
        let rotation = Vec3::new(x_rotation_degrees, y_rotation_degrees, z_rotation_degrees);
        let model = Transform::from_parts(scale, rotation, position).to_matrix();
        shader.set_mat4(shader::MODEL, model);
    }

    pub fn set_shader_color(&self, shader: &mut impl ShaderUniforms, color: Vec4) {
        shader.set_bool(shader::USE_TEXTURE, false);
        shader.set_vec4(shader::OBJECT_COLOR, color);
    }

    pub fn set_shader_texture(
        &self,
        shader: &mut impl ShaderUniforms,
        tag: &str,
    ) -> Result<(), SceneError> {
        let slot = self
            .textures
            .find_slot(tag)
            .ok_or_else(|| SceneError::UnknownTexture(tag.to_string()))?;
        shader.set_bool(shader::USE_TEXTURE, true);
        shader.set_sampler2d(shader::OBJECT_TEXTURE, slot as i32);
        Ok(())
    }

    pub fn set_texture_uv_scale(&self, shader: &mut impl ShaderUniforms, u: f32, v: f32) {
        shader.set_vec2(shader::UV_SCALE, Vec2::new(u, v));
    }

    pub fn set_shader_material(
        &self,
        shader: &mut impl ShaderUniforms,
        tag: &str,
    ) -> Result<(), SceneError> {
        let material = self
            .materials
            .find(tag)
            .ok_or_else(|| SceneError::UnknownMaterial(tag.to_string()))?;
        shader.set_vec3(shader::MATERIAL_AMBIENT_COLOR, material.ambient_color);
        shader.set_float(shader::MATERIAL_AMBIENT_STRENGTH, material.ambient_strength);
        shader.set_vec3(shader::MATERIAL_DIFFUSE_COLOR, material.diffuse_color);
        shader.set_vec3(shader::MATERIAL_SPECULAR_COLOR, material.specular_color);
        shader.set_float(shader::MATERIAL_SHININESS, material.shininess);
        Ok(())
    }

    /// Issues the draws for one frame.
    pub fn render_scene<C>(&self, ctx: &mut C) -> Result<(), SceneError>
    where
        C: ShaderUniforms + MeshDraw,
    {
        self.render_room(ctx)?;
        self.render_ceiling_light(ctx)?;
        self.render_table(ctx)?;
        self.render_laptop(ctx)?;
        self.render_lamp(ctx)?;
        self.render_can(ctx)?;
        self.render_books(ctx)?;
        Ok(())
    }

    fn render_room<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        let room = Vec3::new(21.0, 1.0, 21.0);

        // floor
        self.set_transformations(ctx, room, 0.0, 0.0, 0.0, Vec3::ZERO);
        self.set_shader_texture(ctx, "Floor")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "floor")?;
        ctx.draw(Primitive::Plane);

        // ceiling
        self.set_transformations(ctx, room, 0.0, 0.0, 0.0, Vec3::new(0.0, 42.0, 0.0));
        self.set_shader_texture(ctx, "Floor")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "floor")?;
        ctx.draw(Primitive::Plane);

        let walls = [
            (0.0, Vec3::new(0.0, 21.0, -21.0)),
            (0.0, Vec3::new(0.0, 21.0, 21.0)),
            (90.0, Vec3::new(-21.0, 21.0, 0.0)),
            (90.0, Vec3::new(21.0, 21.0, 0.0)),
        ];
        for (y_rotation, position) in walls {
            self.set_transformations(ctx, room, 90.0, y_rotation, 0.0, position);
            self.set_shader_texture(ctx, "Wall")?;
            self.set_texture_uv_scale(ctx, 1.0, 1.0);
            self.set_shader_material(ctx, "wall")?;
            ctx.draw(Primitive::Plane);
        }
        Ok(())
    }

    fn render_ceiling_light<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        self.set_transformations(ctx, Vec3::splat(3.0), 0.0, 0.0, 0.0, Vec3::new(0.0, 42.0, 0.0));
        self.set_shader_color(ctx, Vec4::ONE);
        self.set_shader_material(ctx, "glass")?;
        ctx.draw(Primitive::Sphere);
        Ok(())
    }

    fn render_table<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        self.set_transformations(ctx, Vec3::new(28.0, 1.0, 14.0), 0.0, 0.0, 0.0, Vec3::new(0.0, 14.0, -14.0));
        self.set_shader_texture(ctx, "Table")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "wood")?;
        ctx.draw(Primitive::Box);

        for x in [-12.0, 12.0] {
            self.set_transformations(ctx, Vec3::new(3.0, 28.0, 3.0), 0.0, 0.0, 0.0, Vec3::new(x, 0.0, -14.0));
            self.set_shader_texture(ctx, "Table")?;
            self.set_texture_uv_scale(ctx, 1.0, 1.0);
            self.set_shader_material(ctx, "wood")?;
            ctx.draw(Primitive::Box);
        }
        Ok(())
    }

    fn render_laptop<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        // base: keyboard on top of a grey slab
        self.set_transformations(ctx, Vec3::new(7.0, 0.5, 6.0), 0.0, 0.0, 0.0, Vec3::new(0.0, 14.5, -14.0));
        self.set_shader_texture(ctx, "keyboard")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::BoxSide(BoxSide::Top));

        self.set_shader_color(ctx, LAPTOP_GREY);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Box);

        // lid: black screen facing the viewer
        self.set_transformations(ctx, Vec3::new(7.0, 0.25, 6.0), 90.0, 0.0, 0.0, Vec3::new(0.0, 17.5, -17.121));
        self.set_shader_color(ctx, Vec4::new(0.0, 0.0, 0.0, 1.0));
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::BoxSide(BoxSide::Top));

        self.set_shader_color(ctx, LAPTOP_GREY);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Box);
        Ok(())
    }

    fn render_lamp<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        let connector = Vec3::new(0.5, 0.66, 0.5);

        // base
        self.set_transformations(ctx, Vec3::new(4.0, 1.0, 4.0), 0.0, 45.0, 0.0, Vec3::new(-8.0, 15.0, -15.0));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Pyramid4);

        // rod
        self.set_transformations(ctx, Vec3::new(0.33, 8.0, 0.33), 0.0, 0.0, 0.0, Vec3::new(-8.0, 14.5, -15.0));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Cylinder(CylinderParts::ALL));

        self.set_transformations(ctx, connector, 0.0, 0.0, 0.0, Vec3::new(-8.0, 22.5, -15.0));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Cylinder(CylinderParts::ALL));

        // arm
        self.set_transformations(ctx, Vec3::splat(1.5), 0.0, 135.0, 0.0, Vec3::new(-6.95, 23.0, -14.0));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::HalfTorus);

        self.set_transformations(ctx, connector, 0.0, 0.0, 0.0, Vec3::new(-5.85, 22.5, -12.95));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Cylinder(CylinderParts::ALL));

        // shade
        self.set_transformations(ctx, Vec3::splat(3.0), 0.0, 0.0, 0.0, Vec3::new(-5.85, 21.5, -12.95));
        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Pyramid4);

        // bulb
        self.set_transformations(ctx, Vec3::new(3.0, 0.1, 3.0), 0.0, 0.0, 0.0, Vec3::new(-5.85, 20.0, -12.95));
        self.set_shader_texture(ctx, "light")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "glass")?;
        ctx.draw(Primitive::BoxSide(BoxSide::Bottom));

        self.set_shader_color(ctx, LAMP_BLACK);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Box);
        Ok(())
    }

    fn render_can<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        self.set_transformations(ctx, Vec3::new(0.75, 3.0, 0.75), 0.0, 90.0, 0.0, Vec3::new(5.0, 14.51, -14.0));
        self.set_shader_texture(ctx, "canside")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Cylinder(CylinderParts::SIDES));

        self.set_shader_texture(ctx, "cantop")?;
        self.set_texture_uv_scale(ctx, 1.0, 1.0);
        self.set_shader_material(ctx, "metal")?;
        ctx.draw(Primitive::Cylinder(CylinderParts::TOP));

        // rims
        for y in [14.5, 17.5] {
            self.set_transformations(ctx, Vec3::new(0.7, 0.7, 0.33), 90.0, 0.0, 0.0, Vec3::new(5.0, y, -14.0));
            self.set_shader_color(ctx, LAPTOP_GREY);
            self.set_shader_material(ctx, "metal")?;
            ctx.draw(Primitive::Torus);
        }
        Ok(())
    }

    fn render_books<C: ShaderUniforms + MeshDraw>(&self, ctx: &mut C) -> Result<(), SceneError> {
        self.set_transformations(ctx, Vec3::new(3.0, 1.0, 4.0), 0.0, 45.0, 0.0, Vec3::new(9.0, 15.0, -16.0));

        let faces = [
            ("bookcover", Primitive::BoxSide(BoxSide::Left)),
            ("bookcover", Primitive::BoxSide(BoxSide::Top)),
            ("bookpages", Primitive::Box),
        ];
        for (texture, primitive) in faces {
            self.set_shader_texture(ctx, texture)?;
            self.set_texture_uv_scale(ctx, 1.0, 1.0);
            self.set_shader_material(ctx, "book")?;
            ctx.draw(primitive);
        }
        Ok(())
    }
}
