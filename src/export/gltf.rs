//! glTF/GLB export.

use super::GLASS_OPACITY;
use crate::error::{MesherError, Result};
use crate::mesh_output::{MeshLayer, ParcelMesh};
use crate::types::Layer;
use gltf_json as json;
use json::validation::Checked::Valid;
use json::validation::USize64;

/// GLB export options.
#[derive(Debug, Clone, Default)]
pub struct GlbOptions {
    /// Write each parcel's placement as its node transform.
    pub world_placement: bool,
    /// PNG bytes of the atlas texture to embed for the solid material.
    pub atlas_png: Option<Vec<u8>>,
}

/// Export one parcel to GLB format (binary glTF).
/// Solid and glass geometry become separate primitives with opaque and blended materials.
pub fn export_glb(mesh: &ParcelMesh, options: &GlbOptions) -> Result<Vec<u8>> {
    export_scene_glb(std::slice::from_ref(mesh), options)
}

/// Export several parcels into one GLB, one node per parcel.
pub fn export_scene_glb(meshes: &[ParcelMesh], options: &GlbOptions) -> Result<Vec<u8>> {
    if meshes.iter().all(|m| m.is_empty()) {
        return Err(MesherError::Export("Cannot export empty mesh".to_string()));
    }

    // Build the binary buffer incrementally
    let mut buffer_data: Vec<u8> = Vec::new();

    let mut accessors = Vec::new();
    let mut buffer_views = Vec::new();
    let mut images = Vec::new();
    let mut textures = Vec::new();
    let mut samplers = Vec::new();
    let mut gltf_meshes = Vec::new();
    let mut nodes = Vec::new();

    // Material 0: solid (optionally atlas-textured), material 1: glass
    let solid_texture = match &options.atlas_png {
        Some(png) => {
            let offset = append_aligned(&mut buffer_data, png);
            buffer_views.push(create_buffer_view(offset, png.len(), None));
            images.push(json::Image {
                buffer_view: Some(json::Index::new(buffer_views.len() as u32 - 1)),
                mime_type: Some(json::image::MimeType("image/png".to_string())),
                uri: None,
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            samplers.push(json::texture::Sampler {
                mag_filter: Some(Valid(json::texture::MagFilter::Nearest)),
                min_filter: Some(Valid(json::texture::MinFilter::Nearest)),
                wrap_s: Valid(json::texture::WrappingMode::ClampToEdge),
                wrap_t: Valid(json::texture::WrappingMode::ClampToEdge),
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            textures.push(json::Texture {
                sampler: Some(json::Index::new(0)),
                source: json::Index::new(0),
                name: None,
                extensions: Default::default(),
                extras: Default::default(),
            });
            Some(0)
        }
        None => None,
    };
    let materials = vec![
        create_material(json::material::AlphaMode::Opaque, solid_texture, 1.0),
        create_material(json::material::AlphaMode::Blend, None, GLASS_OPACITY),
    ];

    for parcel in meshes {
        if parcel.is_empty() {
            continue;
        }

        let mut primitives = Vec::new();
        for (layer, layer_mesh) in parcel.layers() {
            let material = match layer {
                Layer::Solid => 0,
                Layer::Transparent => 1,
            };
            let accessor_start =
                append_layer(&mut buffer_data, &mut buffer_views, &mut accessors, layer_mesh);
            primitives.push(create_primitive(accessor_start, material));
        }

        let name = match parcel.parcel_id {
            Some(id) => format!("parcel-{id}"),
            None => "parcel".to_string(),
        };

        let (translation, scale) = match (&parcel.placement, options.world_placement) {
            (Some(placement), true) => (
                Some(placement.translation()),
                Some([placement.scale; 3]),
            ),
            _ => (None, None),
        };

        gltf_meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: Some(name.clone()),
            primitives,
            weights: None,
        });
        nodes.push(json::Node {
            camera: None,
            children: None,
            extensions: Default::default(),
            extras: Default::default(),
            matrix: None,
            mesh: Some(json::Index::new(gltf_meshes.len() as u32 - 1)),
            name: Some(name),
            rotation: None,
            scale,
            translation,
            skin: None,
            weights: None,
        });
    }

    let total_buffer_size = buffer_data.len();
    let scene_nodes = (0..nodes.len() as u32).map(json::Index::new).collect();

    // Build glTF JSON
    let root = json::Root {
        accessors,
        buffers: vec![json::Buffer {
            byte_length: USize64(total_buffer_size as u64),
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            uri: None,
        }],
        buffer_views,
        images,
        samplers,
        textures,
        materials,
        meshes: gltf_meshes,
        nodes,
        scenes: vec![json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            nodes: scene_nodes,
        }],
        scene: Some(json::Index::new(0)),
        ..Default::default()
    };

    // Serialize JSON
    let json_string = json::serialize::to_string(&root)
        .map_err(|e| MesherError::Export(format!("Failed to serialize glTF JSON: {}", e)))?;
    let json_bytes = json_string.as_bytes();

    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let padded_json_len = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let padded_buffer_len = buffer_data.len() + buffer_padding;

    // Calculate total size
    let total_size = 12 + // GLB header
        8 + padded_json_len + // JSON chunk
        8 + padded_buffer_len; // BIN chunk

    let mut glb = Vec::with_capacity(total_size);

    // GLB Header
    glb.extend_from_slice(b"glTF"); // magic
    glb.extend_from_slice(&2u32.to_le_bytes()); // version
    glb.extend_from_slice(&(total_size as u32).to_le_bytes()); // length

    // JSON Chunk
    glb.extend_from_slice(&(padded_json_len as u32).to_le_bytes()); // chunk length
    glb.extend_from_slice(&0x4E4F534Au32.to_le_bytes()); // chunk type: JSON
    glb.extend_from_slice(json_bytes);
    glb.extend_from_slice(&vec![0x20u8; json_padding]); // padding (spaces)

    // BIN Chunk
    glb.extend_from_slice(&(padded_buffer_len as u32).to_le_bytes()); // chunk length
    glb.extend_from_slice(&0x004E4942u32.to_le_bytes()); // chunk type: BIN
    glb.extend_from_slice(&buffer_data);
    glb.extend_from_slice(&vec![0u8; buffer_padding]); // padding (zeros)

    log::debug!(
        "exported {} parcels to GLB ({} bytes)",
        meshes.len(),
        glb.len()
    );
    Ok(glb)
}

/// Append bytes at a 4-byte aligned offset and return that offset.
fn append_aligned(buffer: &mut Vec<u8>, bytes: &[u8]) -> usize {
    let padding = (4 - (buffer.len() % 4)) % 4;
    buffer.extend(std::iter::repeat(0u8).take(padding));
    let offset = buffer.len();
    buffer.extend_from_slice(bytes);
    offset
}

/// Write one layer's attributes and indices, adding 5 buffer views and 5 accessors.
/// Returns the index of the positions accessor.
fn append_layer(
    buffer: &mut Vec<u8>,
    buffer_views: &mut Vec<json::buffer::View>,
    accessors: &mut Vec<json::Accessor>,
    mesh: &MeshLayer,
) -> u32 {
    use json::accessor::{ComponentType, Type};
    use json::buffer::Target;

    let accessor_start = accessors.len() as u32;
    let vertex_count = mesh.vertex_count();
    let (min, max) = match mesh.bounds() {
        Some(bounds) => (Some(bounds.min), Some(bounds.max)),
        None => (None, None),
    };

    let attributes: [(&[u8], Type, Option<Target>, usize); 5] = [
        (mesh.positions_bytes(), Type::Vec3, Some(Target::ArrayBuffer), vertex_count),
        (mesh.normals_bytes(), Type::Vec3, Some(Target::ArrayBuffer), vertex_count),
        (mesh.uvs_bytes(), Type::Vec2, Some(Target::ArrayBuffer), vertex_count),
        (mesh.colors_bytes(), Type::Vec4, Some(Target::ArrayBuffer), vertex_count),
        (mesh.indices_bytes(), Type::Scalar, Some(Target::ElementArrayBuffer), mesh.indices.len()),
    ];

    for (i, (bytes, type_, target, count)) in attributes.into_iter().enumerate() {
        let offset = append_aligned(buffer, bytes);
        buffer_views.push(create_buffer_view(offset, bytes.len(), target));
        let view = buffer_views.len() as u32 - 1;

        let component_type = if matches!(type_, Type::Scalar) {
            ComponentType::U32
        } else {
            ComponentType::F32
        };
        let (min, max) = if i == 0 { (min, max) } else { (None, None) };
        accessors.push(create_accessor(view, count, type_, component_type, min, max));
    }

    accessor_start
}

/// Create a buffer view.
fn create_buffer_view(
    offset: usize,
    size: usize,
    target: Option<json::buffer::Target>,
) -> json::buffer::View {
    json::buffer::View {
        buffer: json::Index::new(0),
        byte_length: USize64(size as u64),
        byte_offset: Some(USize64(offset as u64)),
        byte_stride: None,
        extensions: Default::default(),
        extras: Default::default(),
        name: None,
        target: target.map(Valid),
    }
}

/// Create an accessor.
fn create_accessor(
    buffer_view: u32,
    count: usize,
    type_: json::accessor::Type,
    component_type: json::accessor::ComponentType,
    min: Option<[f32; 3]>,
    max: Option<[f32; 3]>,
) -> json::Accessor {
    json::Accessor {
        buffer_view: Some(json::Index::new(buffer_view)),
        byte_offset: Some(USize64(0)),
        count: USize64(count as u64),
        component_type: Valid(json::accessor::GenericComponentType(component_type)),
        extensions: Default::default(),
        extras: Default::default(),
        type_: Valid(type_),
        min: min.map(|m| json::Value::from(m.to_vec())),
        max: max.map(|m| json::Value::from(m.to_vec())),
        name: None,
        normalized: false,
        sparse: None,
    }
}

/// Create a primitive whose 5 accessors start at `positions_accessor`.
fn create_primitive(positions_accessor: u32, material: u32) -> json::mesh::Primitive {
    let mut attributes = std::collections::BTreeMap::new();
    attributes.insert(
        Valid(json::mesh::Semantic::Positions),
        json::Index::new(positions_accessor),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Normals),
        json::Index::new(positions_accessor + 1),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::TexCoords(0)),
        json::Index::new(positions_accessor + 2),
    );
    attributes.insert(
        Valid(json::mesh::Semantic::Colors(0)),
        json::Index::new(positions_accessor + 3),
    );

    json::mesh::Primitive {
        attributes,
        extensions: Default::default(),
        extras: Default::default(),
        indices: Some(json::Index::new(positions_accessor + 4)),
        material: Some(json::Index::new(material)),
        mode: Valid(json::mesh::Mode::Triangles),
        targets: None,
    }
}

/// Create a material with the specified alpha mode and optional base texture.
fn create_material(
    alpha_mode: json::material::AlphaMode,
    texture_idx: Option<u32>,
    alpha: f32,
) -> json::Material {
    json::Material {
        pbr_metallic_roughness: json::material::PbrMetallicRoughness {
            base_color_texture: texture_idx.map(|index| json::texture::Info {
                index: json::Index::new(index),
                tex_coord: 0,
                extensions: Default::default(),
                extras: Default::default(),
            }),
            base_color_factor: json::material::PbrBaseColorFactor([1.0, 1.0, 1.0, alpha]),
            metallic_factor: json::material::StrengthFactor(0.0),
            roughness_factor: json::material::StrengthFactor(1.0),
            metallic_roughness_texture: None,
            extensions: Default::default(),
            extras: Default::default(),
        },
        alpha_mode: Valid(alpha_mode),
        alpha_cutoff: None,
        double_sided: false,
        name: None,
        normal_texture: None,
        occlusion_texture: None,
        emissive_texture: None,
        emissive_factor: json::material::EmissiveFactor([0.0, 0.0, 0.0]),
        extensions: Default::default(),
        extras: Default::default(),
    }
}
