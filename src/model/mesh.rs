use std::collections::BTreeMap;
use std::f32::consts::{PI, TAU};
use std::ops::Range;
use glam::Vec3;

use super::ModelVertex;

const SPHERE_STACKS: u32 = 16;
const SPHERE_SLICES: u32 = 32;
const CYLINDER_SLICES: u32 = 36;
const TORUS_MAIN_SEGMENTS: u32 = 40;
const TORUS_TUBE_SEGMENTS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MeshKind {
    Plane,
    Box,
    Sphere,
    Cylinder,
    TaperedCylinder,
    Torus,
    Pyramid3,
    Pyramid4,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoxSide {
    Back,
    Bottom,
    Left,
    Right,
    Top,
    Front,
}

impl BoxSide {
    pub const ALL: [BoxSide; 6] = [
        BoxSide::Back,
        BoxSide::Bottom,
        BoxSide::Left,
        BoxSide::Right,
        BoxSide::Top,
        BoxSide::Front,
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            BoxSide::Back => Vec3::NEG_Z,
            BoxSide::Bottom => Vec3::NEG_Y,
            BoxSide::Left => Vec3::NEG_X,
            BoxSide::Right => Vec3::X,
            BoxSide::Top => Vec3::Y,
            BoxSide::Front => Vec3::Z,
        }
    }

    // In-face axes, chosen so that u x v points along the outward normal.
    fn axes(self) -> (Vec3, Vec3) {
        match self {
            BoxSide::Back => (Vec3::NEG_X, Vec3::Y),
            BoxSide::Bottom => (Vec3::X, Vec3::Z),
            BoxSide::Left => (Vec3::Z, Vec3::Y),
            BoxSide::Right => (Vec3::NEG_Z, Vec3::Y),
            BoxSide::Top => (Vec3::X, Vec3::NEG_Z),
            BoxSide::Front => (Vec3::X, Vec3::Y),
        }
    }
}

/// Which pieces of a cylinder to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CylinderParts {
    pub top: bool,
    pub bottom: bool,
    pub sides: bool,
}

impl CylinderParts {
    pub const ALL: CylinderParts = CylinderParts {
        top: true,
        bottom: true,
        sides: true,
    };

    pub const SIDES: CylinderParts = CylinderParts {
        top: false,
        bottom: false,
        sides: true,
    };

    pub const TOP: CylinderParts = CylinderParts {
        top: true,
        bottom: false,
        sides: false,
    };
}

impl Default for CylinderParts {
    fn default() -> Self {
        Self::ALL
    }
}

/// One draw request against the shape library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Plane,
    Box,
    BoxSide(BoxSide),
    Sphere,
    Cylinder(CylinderParts),
    TaperedCylinder(CylinderParts),
    Torus,
    HalfTorus,
    Pyramid3,
    Pyramid4,
}

impl Primitive {
    pub fn mesh_kind(&self) -> MeshKind {
        match self {
            Primitive::Plane => MeshKind::Plane,
            Primitive::Box | Primitive::BoxSide(_) => MeshKind::Box,
            Primitive::Sphere => MeshKind::Sphere,
            Primitive::Cylinder(_) => MeshKind::Cylinder,
            Primitive::TaperedCylinder(_) => MeshKind::TaperedCylinder,
            Primitive::Torus | Primitive::HalfTorus => MeshKind::Torus,
            Primitive::Pyramid3 => MeshKind::Pyramid3,
            Primitive::Pyramid4 => MeshKind::Pyramid4,
        }
    }
}

/// Receiver of draw requests; the scene issues exactly one per visible part.
pub trait MeshDraw {
    fn draw(&mut self, primitive: Primitive);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshPart {
    Whole,
    Side(BoxSide),
    Top,
    Bottom,
    Sides,
    Half,
}

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    parts: Vec<(MeshPart, Range<u32>)>,
}

impl MeshData {
    pub fn part(&self, part: MeshPart) -> Option<Range<u32>> {
        if part == MeshPart::Whole {
            return Some(0..self.indices.len() as u32);
        }
        self.parts
            .iter()
            .find(|(candidate, _)| *candidate == part)
            .map(|(_, range)| range.clone())
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    fn next_index(&self) -> u32 {
        self.indices.len() as u32
    }

    fn mark(&mut self, part: MeshPart, start: u32) {
        let end = self.next_index();
        self.parts.push((part, start..end));
    }

    // Quad spanning center +/- half_u +/- half_v, wound counter-clockwise
    // around half_u x half_v.
    fn push_quad(&mut self, center: Vec3, half_u: Vec3, half_v: Vec3, normal: Vec3) {
        let base = self.vertices.len() as u32;
        let corners = [
            (center - half_u - half_v, [0.0, 0.0]),
            (center + half_u - half_v, [1.0, 0.0]),
            (center + half_u + half_v, [1.0, 1.0]),
            (center - half_u + half_v, [0.0, 1.0]),
        ];
        for (position, uv) in corners {
            self.vertices
                .push(ModelVertex::new(position.to_array(), uv, normal.to_array()));
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_flat_triangle(&mut self, corners: [(Vec3, [f32; 2]); 3]) {
        let [(a, _), (b, _), (c, _)] = corners;
        let normal = (b - a).cross(c - a).normalize_or_zero();
        let base = self.vertices.len() as u32;
        for (position, uv) in corners {
            self.vertices
                .push(ModelVertex::new(position.to_array(), uv, normal.to_array()));
        }
        self.indices.extend_from_slice(&[base, base + 1, base + 2]);
    }
}

/// Plane of 2x2 units on XZ at y = 0, facing +Y.
pub fn generate_plane() -> MeshData {
    let mut data = MeshData::default();
    data.push_quad(Vec3::ZERO, Vec3::X, Vec3::NEG_Z, Vec3::Y);
    data
}

/// Unit cube centred on the origin, one 6-index range per side.
pub fn generate_box() -> MeshData {
    let mut data = MeshData::default();
    for side in BoxSide::ALL {
        let start = data.next_index();
        let (u, v) = side.axes();
        data.push_quad(side.normal() * 0.5, u * 0.5, v * 0.5, side.normal());
        data.mark(MeshPart::Side(side), start);
    }
    data
}

/// UV sphere of radius 1.
pub fn generate_sphere(stacks: u32, slices: u32) -> MeshData {
    let mut data = MeshData::default();
    let stacks = stacks.max(2);
    let slices = slices.max(3);

    for stack in 0..=stacks {
        let theta = stack as f32 * PI / stacks as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        for slice in 0..=slices {
            let phi = slice as f32 * TAU / slices as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();
            let normal = [sin_theta * cos_phi, cos_theta, sin_theta * sin_phi];
            let uv = [slice as f32 / slices as f32, 1.0 - stack as f32 / stacks as f32];
            data.vertices.push(ModelVertex::new(normal, uv, normal));
        }
    }

    for stack in 0..stacks {
        for slice in 0..slices {
            let first = stack * (slices + 1) + slice;
            let second = first + slices + 1;
            data.indices
                .extend_from_slice(&[first, first + 1, second, second, first + 1, second + 1]);
        }
    }
    data
}

/// Cylinder standing on y = 0 with height 1. Index ranges for the top cap,
/// bottom cap and sides are recorded separately.
pub fn generate_cylinder(bottom_radius: f32, top_radius: f32, slices: u32) -> MeshData {
    let mut data = MeshData::default();
    let slices = slices.max(3);

    for (part, y, radius, normal) in [
        (MeshPart::Top, 1.0, top_radius, Vec3::Y),
        (MeshPart::Bottom, 0.0, bottom_radius, Vec3::NEG_Y),
    ] {
        let start = data.next_index();
        let center = data.vertices.len() as u32;
        data.vertices
            .push(ModelVertex::new([0.0, y, 0.0], [0.5, 0.5], normal.to_array()));
        for slice in 0..=slices {
            let (sin, cos) = (slice as f32 * TAU / slices as f32).sin_cos();
            data.vertices.push(ModelVertex::new(
                [radius * cos, y, radius * sin],
                [0.5 + 0.5 * cos, 0.5 + 0.5 * sin],
                normal.to_array(),
            ));
        }
        for slice in 0..slices {
            let current = center + 1 + slice;
            if normal.y > 0.0 {
                data.indices.extend_from_slice(&[center, current + 1, current]);
            } else {
                data.indices.extend_from_slice(&[center, current, current + 1]);
            }
        }
        data.mark(part, start);
    }

    let start = data.next_index();
    let ring = data.vertices.len() as u32;
    let slope = bottom_radius - top_radius;
    for slice in 0..=slices {
        let u = slice as f32 / slices as f32;
        let (sin, cos) = (u * TAU).sin_cos();
        let normal = Vec3::new(cos, slope, sin).normalize_or_zero().to_array();
        data.vertices.push(ModelVertex::new(
            [bottom_radius * cos, 0.0, bottom_radius * sin],
            [u, 0.0],
            normal,
        ));
        data.vertices
            .push(ModelVertex::new([top_radius * cos, 1.0, top_radius * sin], [u, 1.0], normal));
    }
    for slice in 0..slices {
        let bottom = ring + slice * 2;
        let top = bottom + 1;
        let next_bottom = bottom + 2;
        let next_top = bottom + 3;
        data.indices
            .extend_from_slice(&[bottom, top, next_bottom, top, next_top, next_bottom]);
    }
    data.mark(MeshPart::Sides, start);

    data
}

/// Torus with main radius 1 in the XY plane. The first half of the index
/// buffer covers the half with y >= 0.
pub fn generate_torus(thickness: f32, main_segments: u32, tube_segments: u32) -> MeshData {
    let mut data = MeshData::default();
    let main_segments = main_segments.max(4) & !1;
    let tube_segments = tube_segments.max(3);

    for main in 0..=main_segments {
        let (sin_theta, cos_theta) = (main as f32 * TAU / main_segments as f32).sin_cos();
        for tube in 0..=tube_segments {
            let (sin_phi, cos_phi) = (tube as f32 * TAU / tube_segments as f32).sin_cos();
            let ring = 1.0 + thickness * cos_phi;
            data.vertices.push(ModelVertex::new(
                [ring * cos_theta, ring * sin_theta, thickness * sin_phi],
                [
                    main as f32 / main_segments as f32,
                    tube as f32 / tube_segments as f32,
                ],
                [cos_phi * cos_theta, cos_phi * sin_theta, sin_phi],
            ));
        }
    }

    let row = tube_segments + 1;
    for main in 0..main_segments {
        for tube in 0..tube_segments {
            let a = main * row + tube;
            let b = a + row;
            data.indices
                .extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
        if main + 1 == main_segments / 2 {
            data.mark(MeshPart::Half, 0);
        }
    }
    data
}

/// Pyramid with an equilateral base at y = -0.5 and apex at y = 0.5.
pub fn generate_pyramid3() -> MeshData {
    let mut data = MeshData::default();
    let apex = Vec3::new(0.0, 0.5, 0.0);
    let base: Vec<Vec3> = (0..3)
        .map(|i| {
            let (sin, cos) = (i as f32 * TAU / 3.0 + PI / 2.0).sin_cos();
            Vec3::new(0.5 * cos, -0.5, 0.5 * sin)
        })
        .collect();

    for i in 0..3 {
        let a = base[i];
        let b = base[(i + 1) % 3];
        data.push_flat_triangle([(b, [0.0, 0.0]), (a, [1.0, 0.0]), (apex, [0.5, 1.0])]);
    }
    data.push_flat_triangle([
        (base[0], [0.5, 1.0]),
        (base[1], [0.0, 0.0]),
        (base[2], [1.0, 0.0]),
    ]);
    data
}

/// Square pyramid with a unit base at y = -0.5 and apex at y = 0.5.
pub fn generate_pyramid4() -> MeshData {
    let mut data = MeshData::default();
    let apex = Vec3::new(0.0, 0.5, 0.0);
    let base = [
        Vec3::new(-0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, 0.5),
        Vec3::new(0.5, -0.5, -0.5),
        Vec3::new(-0.5, -0.5, -0.5),
    ];

    for i in 0..4 {
        let a = base[i];
        let b = base[(i + 1) % 4];
        data.push_flat_triangle([(a, [0.0, 0.0]), (b, [1.0, 0.0]), (apex, [0.5, 1.0])]);
    }
    data.push_quad(
        Vec3::new(0.0, -0.5, 0.0),
        Vec3::X * 0.5,
        Vec3::Z * 0.5,
        Vec3::NEG_Y,
    );
    data
}

/// Library of generated primitive meshes. Each kind is generated once,
/// however many times it is drawn.
#[derive(Debug, Default)]
pub struct ShapeMeshes {
    meshes: BTreeMap<MeshKind, MeshData>,
}

impl ShapeMeshes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_plane_mesh(&mut self) {
        self.meshes.insert(MeshKind::Plane, generate_plane());
    }

    pub fn load_box_mesh(&mut self) {
        self.meshes.insert(MeshKind::Box, generate_box());
    }

    pub fn load_sphere_mesh(&mut self) {
        self.meshes
            .insert(MeshKind::Sphere, generate_sphere(SPHERE_STACKS, SPHERE_SLICES));
    }

    pub fn load_cylinder_mesh(&mut self) {
        self.meshes
            .insert(MeshKind::Cylinder, generate_cylinder(1.0, 1.0, CYLINDER_SLICES));
    }

    pub fn load_tapered_cylinder_mesh(&mut self) {
        self.meshes.insert(
            MeshKind::TaperedCylinder,
            generate_cylinder(1.0, 0.5, CYLINDER_SLICES),
        );
    }

    pub fn load_torus_mesh(&mut self, thickness: f32) {
        self.meshes.insert(
            MeshKind::Torus,
            generate_torus(thickness, TORUS_MAIN_SEGMENTS, TORUS_TUBE_SEGMENTS),
        );
    }

    pub fn load_pyramid3_mesh(&mut self) {
        self.meshes.insert(MeshKind::Pyramid3, generate_pyramid3());
    }

    pub fn load_pyramid4_mesh(&mut self) {
        self.meshes.insert(MeshKind::Pyramid4, generate_pyramid4());
    }

    pub fn mesh(&self, kind: MeshKind) -> Option<&MeshData> {
        self.meshes.get(&kind)
    }

    pub fn is_loaded(&self, kind: MeshKind) -> bool {
        self.meshes.contains_key(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshKind, &MeshData)> {
        self.meshes.iter().map(|(kind, data)| (*kind, data))
    }

    /// Index ranges of the mesh that `primitive` covers, or `None` when its
    /// mesh has not been loaded.
    pub fn index_ranges(&self, primitive: Primitive) -> Option<Vec<Range<u32>>> {
        let mesh = self.mesh(primitive.mesh_kind())?;
        let parts = match primitive {
            Primitive::BoxSide(side) => vec![MeshPart::Side(side)],
            Primitive::HalfTorus => vec![MeshPart::Half],
            Primitive::Cylinder(parts) | Primitive::TaperedCylinder(parts) => {
                let mut selected = Vec::new();
                if parts.top {
                    selected.push(MeshPart::Top);
                }
                if parts.bottom {
                    selected.push(MeshPart::Bottom);
                }
                if parts.sides {
                    selected.push(MeshPart::Sides);
                }
                selected
            }
            _ => vec![MeshPart::Whole],
        };
        parts.into_iter().map(|part| mesh.part(part)).collect()
    }
}
