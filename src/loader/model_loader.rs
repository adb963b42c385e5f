use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::loader::texture_loader::TextureLoader;
use crate::manifest::ModelDescriptor;
use crate::resources::scene::{
    AnimationClip, AnimationTable, GeometryBuffer, GeometryData, Material, Mesh, SceneGraph,
    SceneNode,
};

/// On-disk model document: a node tree with inline mesh data plus the
/// animation clips authored for this resource. Shared by models, characters
/// and the selected player model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelFile {
    #[serde(default)]
    name: Option<String>,
    nodes: Vec<NodeDef>,
    #[serde(default)]
    animations: Vec<ClipDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDef {
    name: String,
    #[serde(default)]
    translation: [f32; 3],
    /// x y z w.
    #[serde(default = "identity_rotation")]
    rotation: [f32; 4],
    #[serde(default = "unit_scale")]
    scale: [f32; 3],
    #[serde(default)]
    mesh: Option<MeshDef>,
    #[serde(default)]
    children: Vec<NodeDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeshDef {
    #[serde(default)]
    name: Option<String>,
    positions: Vec<f32>,
    #[serde(default)]
    normals: Option<Vec<f32>>,
    #[serde(default)]
    uvs: Option<Vec<f32>>,
    #[serde(default)]
    indices: Option<Vec<u32>>,
    #[serde(default)]
    material: MaterialDef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDef {
    #[serde(default = "white")]
    base_color: [f32; 4],
    #[serde(default)]
    metallic: f32,
    #[serde(default = "one")]
    roughness: f32,
    #[serde(default)]
    double_sided: bool,
    /// Locator of a texture intrinsic to this material, fetched with the
    /// model and owned by its entry.
    #[serde(default)]
    texture: Option<String>,
}

impl Default for MaterialDef {
    fn default() -> Self {
        Self {
            base_color: white(),
            metallic: 0.0,
            roughness: one(),
            double_sided: false,
            texture: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClipDef {
    name: String,
    duration: f32,
}

fn identity_rotation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn unit_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn one() -> f32 {
    1.0
}

pub struct ModelLoader {}

impl ModelLoader {
    pub fn load(
        descriptor: &ModelDescriptor,
        source: &dyn AssetSource,
    ) -> Result<SceneGraph, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let file: ModelFile = serde_json::from_slice(&bytes)
            .map_err(|e| decode_error(format!("model parse: {}", e)))?;

        if file.nodes.is_empty() {
            return Err(decode_error("model has no nodes"));
        }

        let mut children = Vec::with_capacity(file.nodes.len());
        for node in &file.nodes {
            children.push(Self::build_node(node, descriptor.cast_shadows, source)?);
        }

        // The uniform scale goes on the synthetic root so the authored node
        // transforms stay untouched.
        let root_transform = match descriptor.scale {
            Some(scale) => Mat4::from_scale(Vec3::splat(scale)),
            None => Mat4::IDENTITY,
        };
        let root = SceneNode {
            name: file.name.clone().unwrap_or_else(|| descriptor.name.clone()),
            transform: root_transform,
            meshes: Vec::new(),
            children,
        };

        let animations = if file.animations.is_empty() {
            None
        } else {
            Some(AnimationTable::new(file.animations.iter().map(|clip| {
                AnimationClip {
                    name: clip.name.clone(),
                    duration: clip.duration,
                }
            })))
        };

        Ok(SceneGraph::new(root, animations))
    }

    fn build_node(
        def: &NodeDef,
        cast_shadows: bool,
        source: &dyn AssetSource,
    ) -> Result<SceneNode, LoadErrorKind> {
        let transform = Mat4::from_scale_rotation_translation(
            Vec3::from_array(def.scale),
            Quat::from_xyzw(
                def.rotation[0],
                def.rotation[1],
                def.rotation[2],
                def.rotation[3],
            )
            .normalize(),
            Vec3::from_array(def.translation),
        );

        let mut meshes = Vec::new();
        if let Some(mesh) = &def.mesh {
            meshes.push(Self::build_mesh(mesh, &def.name, cast_shadows, source)?);
        }

        let mut children = Vec::with_capacity(def.children.len());
        for child in &def.children {
            children.push(Self::build_node(child, cast_shadows, source)?);
        }

        Ok(SceneNode {
            name: def.name.clone(),
            transform,
            meshes,
            children,
        })
    }

    fn build_mesh(
        def: &MeshDef,
        node_name: &str,
        cast_shadows: bool,
        source: &dyn AssetSource,
    ) -> Result<Mesh, LoadErrorKind> {
        if def.positions.is_empty() || def.positions.len() % 3 != 0 {
            return Err(decode_error(format!(
                "mesh on node {} has {} position components, expected a non-empty multiple of 3",
                node_name,
                def.positions.len()
            )));
        }
        let vertex_count = def.positions.len() / 3;

        if let Some(normals) = &def.normals {
            if normals.len() != def.positions.len() {
                return Err(decode_error(format!(
                    "mesh on node {} has mismatched normal count",
                    node_name
                )));
            }
        }
        if let Some(uvs) = &def.uvs {
            if uvs.len() != vertex_count * 2 {
                return Err(decode_error(format!(
                    "mesh on node {} has mismatched uv count",
                    node_name
                )));
            }
        }
        if let Some(indices) = &def.indices {
            if let Some(out_of_range) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(decode_error(format!(
                    "mesh on node {} indexes vertex {} of {}",
                    node_name, out_of_range, vertex_count
                )));
            }
        }

        let texture = match &def.material.texture {
            Some(locator) => {
                let bytes = source.fetch(locator)?;
                Some(TextureLoader::decode_rgba8(&bytes)?)
            }
            None => None,
        };

        Ok(Mesh {
            name: def
                .name
                .clone()
                .unwrap_or_else(|| format!("{}_mesh", node_name)),
            geometry: GeometryBuffer::new(GeometryData {
                positions: def.positions.clone(),
                normals: def.normals.clone(),
                uvs: def.uvs.clone(),
                indices: def.indices.clone(),
            }),
            material: Material {
                base_color: def.material.base_color,
                metallic: def.material.metallic,
                roughness: def.material.roughness,
                double_sided: def.material.double_sided,
                texture,
            },
            cast_shadows,
        })
    }
}
