use super::*;
use crate::error::TextureError;
use crate::test_utils::{write_gray_image, write_rgb_image, write_rgba_image, RecordingUploader};
use approx::assert_relative_eq;
use glam::Vec3;
use image::RgbImage;

#[test]
fn test_model_vertex_size() {
    assert_eq!(
        std::mem::size_of::<ModelVertex>(),
        32,  // 3 * 4 (position) + 2 * 4 (tex_coords) + 3 * 4 (normal) = 32 bytes
        "ModelVertex size should be 32 bytes"
    );
}

#[test]
fn test_vertex_buffer_layout() {
    let layout = ModelVertex::desc();
    assert_eq!(layout.array_stride, 32);
    assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
    assert_eq!(layout.attributes.len(), 3);
}

#[test]
fn test_decode_rgb_image() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = write_rgb_image(temp.path(), "rgb.png", 4, 2);

    let image = DecodedImage::decode(&path).unwrap();
    assert_eq!(image.format(), PixelFormat::Rgb8);
    assert_eq!((image.width(), image.height()), (4, 2));
    assert_eq!(image.pixels().len(), 4 * 2 * 3);
}

#[test]
fn test_decode_rgba_image() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = write_rgba_image(temp.path(), "rgba.png", 2, 2);

    let image = DecodedImage::decode(&path).unwrap();
    assert_eq!(image.format(), PixelFormat::Rgba8);
    assert_eq!(image.pixels().len(), 2 * 2 * 4);
}

#[test]
fn test_decode_rejects_grayscale() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = write_gray_image(temp.path(), "gray.png", 2, 2);

    match DecodedImage::decode(&path) {
        Err(TextureError::UnsupportedChannels { channels, .. }) => assert_eq!(channels, 1),
        other => panic!("expected UnsupportedChannels, got {:?}", other.map(|i| i.format())),
    }
}

#[test]
fn test_decode_flips_rows() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = temp.path().join("stripes.png");
    let mut stripes = RgbImage::new(1, 2);
    stripes.put_pixel(0, 0, image::Rgb([255, 0, 0]));
    stripes.put_pixel(0, 1, image::Rgb([0, 0, 255]));
    stripes.save(&path).unwrap();

    let image = DecodedImage::decode(&path).unwrap();
    // Bottom row of the file comes first after loading.
    assert_eq!(&image.pixels()[0..3], &[0, 0, 255]);
    assert_eq!(&image.pixels()[3..6], &[255, 0, 0]);
}

#[test]
fn test_mip_chain_halves_down_to_one_pixel() {
    let image = DecodedImage::from_rgba(image::RgbaImage::new(8, 4));
    let chain = image.mip_chain();

    let sizes: Vec<(u32, u32)> = chain.iter().map(|level| level.dimensions()).collect();
    assert_eq!(sizes, vec![(8, 4), (4, 2), (2, 1), (1, 1)]);
    assert_eq!(image.mip_level_count() as usize, chain.len());
}

#[test]
fn test_checkerboard_placeholder() {
    let image = DecodedImage::checkerboard(64, 8);
    assert_eq!((image.width(), image.height()), (64, 64));
    assert_eq!(image.format(), PixelFormat::Rgba8);
    let rgba = image.to_rgba8();
    assert_ne!(rgba.get_pixel(0, 0), rgba.get_pixel(8, 0));
    assert_eq!(rgba.get_pixel(0, 0), rgba.get_pixel(8, 8));
}

#[test]
fn test_registry_load_and_lookup() {
    let temp = assert_fs::TempDir::new().unwrap();
    let floor = write_rgb_image(temp.path(), "floor.png", 2, 2);
    let wall = write_rgba_image(temp.path(), "wall.png", 2, 2);
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();

    let floor_handle = registry.load(&floor, "Floor", &mut uploader).unwrap();
    let wall_handle = registry.load(&wall, "Wall", &mut uploader).unwrap();

    assert_eq!(registry.find_handle("Floor"), Some(floor_handle));
    assert_eq!(registry.find_handle("Wall"), Some(wall_handle));
    assert_eq!(registry.find_slot("Floor"), Some(0));
    assert_eq!(registry.find_slot("Wall"), Some(1));
    assert_eq!(registry.find_handle("Ceiling"), None);
    assert_eq!(registry.find_slot("Ceiling"), None);
    assert_eq!(uploader.uploads[1].3, PixelFormat::Rgba8);
}

#[test]
fn test_registry_lookup_is_first_match() {
    let temp = assert_fs::TempDir::new().unwrap();
    let path = write_rgb_image(temp.path(), "a.png", 1, 1);
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();

    let first = registry.load(&path, "dup", &mut uploader).unwrap();
    let second = registry.load(&path, "dup", &mut uploader).unwrap();

    assert_ne!(first, second);
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.find_handle("dup"), Some(first));
    assert_eq!(registry.find_slot("dup"), Some(0));
}

#[test]
fn test_registry_rejected_image_is_not_registered() {
    let temp = assert_fs::TempDir::new().unwrap();
    let gray = write_gray_image(temp.path(), "gray.png", 2, 2);
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();

    assert!(registry.load(&gray, "gray", &mut uploader).is_err());
    assert!(registry
        .load(&temp.path().join("missing.png"), "missing", &mut uploader)
        .is_err());

    assert!(registry.is_empty());
    assert!(uploader.uploads.is_empty());
    assert_eq!(registry.find_slot("gray"), None);
}

#[test]
fn test_registry_slot_limit() {
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();
    let image = DecodedImage::checkerboard(2, 1);

    for i in 0..MAX_TEXTURE_SLOTS {
        registry.register(&format!("t{}", i), &image, &mut uploader).unwrap();
    }
    let overflow = registry.register("one_too_many", &image, &mut uploader);
    assert!(matches!(overflow, Err(TextureError::SlotsExhausted { .. })));
    assert_eq!(registry.len(), MAX_TEXTURE_SLOTS);
}

#[test]
fn test_bind_all_uses_registry_order() {
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();
    let image = DecodedImage::checkerboard(2, 1);
    let a = registry.register("a", &image, &mut uploader).unwrap();
    let b = registry.register("b", &image, &mut uploader).unwrap();

    registry.bind_all(&mut uploader);
    assert_eq!(uploader.bound, vec![(0, a), (1, b)]);
}

#[test]
fn test_release_all_frees_every_texture() {
    let mut uploader = RecordingUploader::default();
    let mut registry = TextureRegistry::new();
    let image = DecodedImage::checkerboard(2, 1);
    let a = registry.register("a", &image, &mut uploader).unwrap();
    let b = registry.register("b", &image, &mut uploader).unwrap();

    registry.release_all(&mut uploader);
    assert_eq!(uploader.released, vec![a, b]);
    assert!(registry.is_empty());
    assert_eq!(registry.find_handle("a"), None);
}

#[test]
fn test_material_registry_lookup() {
    let mut registry = MaterialRegistry::new();
    assert!(registry.find("wood").is_none());

    let wood = Material {
        ambient_color: Vec3::splat(0.1),
        ambient_strength: 0.2,
        diffuse_color: Vec3::splat(0.3),
        specular_color: Vec3::splat(0.1),
        shininess: 10.0,
    };
    let shadow = Material {
        shininess: 99.0,
        ..wood
    };
    registry.define("wood", wood);
    registry.define("wood", shadow);

    assert_eq!(registry.len(), 2);
    assert_eq!(registry.find("wood"), Some(&wood));
    assert!(registry.find("glass").is_none());
    assert_eq!(registry.tags().collect::<Vec<_>>(), vec!["wood", "wood"]);
}

#[test]
fn test_box_generation() {
    let cube = generate_box();
    assert_eq!(cube.vertices.len(), 24);
    assert_eq!(cube.indices.len(), 36);

    for side in BoxSide::ALL {
        let range = cube.part(MeshPart::Side(side)).unwrap();
        assert_eq!(range.len(), 6);
        for index in &cube.indices[range.start as usize..range.end as usize] {
            let vertex = cube.vertices[*index as usize];
            assert_eq!(Vec3::from(vertex.normal), side.normal());
            // Every vertex of a side lies on that side's plane.
            assert_relative_eq!(Vec3::from(vertex.position).dot(side.normal()), 0.5);
        }
    }
}

#[test]
fn test_plane_generation() {
    let plane = generate_plane();
    assert_eq!(plane.vertices.len(), 4);
    assert_eq!(plane.triangle_count(), 2);
    for vertex in &plane.vertices {
        assert_eq!(vertex.position[1], 0.0);
        assert_eq!(vertex.position[0].abs(), 1.0);
        assert_eq!(vertex.position[2].abs(), 1.0);
        assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
    }
}

#[test]
fn test_sphere_generation() {
    let sphere = generate_sphere(4, 8);
    assert_eq!(sphere.vertices.len(), 5 * 9);
    assert_eq!(sphere.triangle_count(), 4 * 8 * 2);
    for vertex in &sphere.vertices {
        assert_relative_eq!(Vec3::from(vertex.position).length(), 1.0, epsilon = 1e-5);
    }
}

#[test]
fn test_cylinder_parts_cover_the_index_buffer() {
    let cylinder = generate_cylinder(1.0, 1.0, 12);
    let top = cylinder.part(MeshPart::Top).unwrap();
    let bottom = cylinder.part(MeshPart::Bottom).unwrap();
    let sides = cylinder.part(MeshPart::Sides).unwrap();

    assert_eq!(top.len(), 12 * 3);
    assert_eq!(bottom.len(), 12 * 3);
    assert_eq!(sides.len(), 12 * 6);
    assert_eq!(top.len() + bottom.len() + sides.len(), cylinder.indices.len());

    for index in &cylinder.indices[top.start as usize..top.end as usize] {
        assert_eq!(cylinder.vertices[*index as usize].position[1], 1.0);
    }
}

#[test]
fn test_tapered_cylinder_top_is_narrower() {
    let tapered = generate_cylinder(1.0, 0.5, 12);
    let top = tapered.part(MeshPart::Top).unwrap();
    let widest = tapered.indices[top.start as usize..top.end as usize]
        .iter()
        .map(|i| tapered.vertices[*i as usize].position[0].abs())
        .fold(0.0f32, f32::max);
    assert_relative_eq!(widest, 0.5, epsilon = 1e-5);
}

#[test]
fn test_half_torus_is_upper_half() {
    let torus = generate_torus(0.1, 8, 6);
    let half = torus.part(MeshPart::Half).unwrap();
    assert_eq!(half.len() * 2, torus.indices.len());
    for index in &torus.indices[half.start as usize..half.end as usize] {
        assert!(torus.vertices[*index as usize].position[1] >= -1e-5);
    }
}

#[test]
fn test_pyramid_generation() {
    let pyramid3 = generate_pyramid3();
    let pyramid4 = generate_pyramid4();
    assert_eq!(pyramid3.triangle_count(), 4);
    assert_eq!(pyramid4.triangle_count(), 6);

    for vertex in pyramid4.vertices.iter().chain(pyramid3.vertices.iter()) {
        assert!(vertex.position[1] == 0.5 || vertex.position[1] == -0.5);
    }
    // Side faces lean outward, never down.
    for vertex in &pyramid4.vertices[..12] {
        assert!(vertex.normal[1] > 0.0);
    }
}

#[test]
fn test_shape_meshes_index_ranges() {
    let mut meshes = ShapeMeshes::new();
    assert_eq!(meshes.index_ranges(Primitive::Box), None);

    meshes.load_box_mesh();
    meshes.load_cylinder_mesh();
    meshes.load_torus_mesh(0.1);

    assert_eq!(meshes.index_ranges(Primitive::Box), Some(vec![0..36]));
    let top_side = meshes.index_ranges(Primitive::BoxSide(BoxSide::Top)).unwrap();
    assert_eq!(top_side.len(), 1);
    assert_eq!(top_side[0].len(), 6);

    let cylinder = meshes.mesh(MeshKind::Cylinder).unwrap();
    assert_eq!(
        meshes.index_ranges(Primitive::Cylinder(CylinderParts::SIDES)),
        Some(vec![cylinder.part(MeshPart::Sides).unwrap()])
    );
    assert_eq!(
        meshes.index_ranges(Primitive::Cylinder(CylinderParts::ALL)).unwrap().len(),
        3
    );

    let torus = meshes.mesh(MeshKind::Torus).unwrap();
    let half = meshes.index_ranges(Primitive::HalfTorus).unwrap();
    assert_eq!(half[0].len() * 2, torus.indices.len());

    assert!(meshes.index_ranges(Primitive::Pyramid4).is_none());
    assert!(!meshes.is_loaded(MeshKind::Sphere));
}
