mod texture;
mod material;
mod mesh;
mod vertex;

pub use texture::{
    DecodedImage, PixelFormat, Texture, TextureEntry, TextureHandle, TextureRegistry,
    TextureUpload, MAX_TEXTURE_SLOTS,
};
pub use material::{Material, MaterialRegistry};
pub use mesh::{
    generate_box, generate_cylinder, generate_plane, generate_pyramid3, generate_pyramid4,
    generate_sphere, generate_torus, BoxSide, CylinderParts, MeshData, MeshDraw, MeshKind,
    MeshPart, Primitive, ShapeMeshes,
};
pub use vertex::ModelVertex;

#[cfg(test)]
mod tests;
