use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use glam::Mat4;

use crate::resources::image::GpuImage;

/// CPU-side vertex/index data backing a [`GeometryBuffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryData {
    /// Interleaved xyz positions.
    pub positions: Vec<f32>,
    pub normals: Option<Vec<f32>>,
    pub uvs: Option<Vec<f32>>,
    pub indices: Option<Vec<u32>>,
}

/// Geometry handle as the renderer and physics collaborators see it. The
/// buffer data lives until released; the counts survive release so stats and
/// logs stay meaningful.
#[derive(Debug)]
pub struct GeometryBuffer {
    vertex_count: u32,
    index_count: u32,
    data: RwLock<Option<Arc<GeometryData>>>,
    released: AtomicBool,
}

impl GeometryBuffer {
    pub fn new(data: GeometryData) -> Self {
        let vertex_count = (data.positions.len() / 3) as u32;
        let index_count = data.indices.as_ref().map(|i| i.len() as u32).unwrap_or(0);
        Self {
            vertex_count,
            index_count,
            data: RwLock::new(Some(Arc::new(data))),
            released: AtomicBool::new(false),
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// The backing data, `None` once released. Collaborators must re-fetch
    /// through the cache each frame instead of holding onto this.
    pub fn data(&self) -> Option<Arc<GeometryData>> {
        self.data
            .read()
            .expect("Get the read lock on the geometry data")
            .clone()
    }

    pub fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            *self
                .data
                .write()
                .expect("Get the write lock on the geometry data") = None;
        }
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct Material {
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub double_sided: bool,
    /// Decoded at model load when the material references one; owned by the
    /// entry, released with it.
    pub texture: Option<GpuImage>,
}

impl Material {
    pub fn release(&self) {
        if let Some(texture) = &self.texture {
            texture.release();
        }
    }
}

#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub geometry: GeometryBuffer,
    pub material: Material,
    pub cast_shadows: bool,
}

#[derive(Debug)]
pub struct SceneNode {
    pub name: String,
    pub transform: Mat4,
    pub meshes: Vec<Mesh>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    fn find(&self, name: &str) -> Option<&SceneNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    fn for_each_mesh<'a>(&'a self, visit: &mut impl FnMut(&'a Mesh)) {
        for mesh in &self.meshes {
            visit(mesh);
        }
        for child in &self.children {
            child.for_each_mesh(visit);
        }
    }
}

/// Mixer time is advanced once per frame by the animation collaborator, not
/// by the cache.
#[derive(Debug, Default)]
pub struct AnimationMixer {
    time: Mutex<f32>,
}

impl AnimationMixer {
    pub fn advance(&self, delta: f32) -> f32 {
        let mut time = self.time.lock().expect("Get the lock on the mixer time");
        *time += delta;
        *time
    }

    pub fn time(&self) -> f32 {
        *self.time.lock().expect("Get the lock on the mixer time")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
}

/// Clip-name-indexed action table bound to a single mixer for one resource
/// instance.
#[derive(Debug)]
pub struct AnimationTable {
    mixer: AnimationMixer,
    actions: HashMap<String, AnimationClip>,
}

impl AnimationTable {
    pub fn new(clips: impl IntoIterator<Item = AnimationClip>) -> Self {
        Self {
            mixer: AnimationMixer::default(),
            actions: clips
                .into_iter()
                .map(|clip| (clip.name.clone(), clip))
                .collect(),
        }
    }

    pub fn mixer(&self) -> &AnimationMixer {
        &self.mixer
    }

    pub fn action(&self, clip_name: &str) -> Option<&AnimationClip> {
        self.actions.get(clip_name)
    }

    pub fn clip_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// A resolved model or character: the node tree plus the optional animation
/// table. Disposal recursively releases every mesh's geometry and material
/// (including any bound image), then the graph root is dropped with the entry.
#[derive(Debug)]
pub struct SceneGraph {
    pub root: SceneNode,
    pub animations: Option<AnimationTable>,
    disposed: AtomicBool,
}

impl SceneGraph {
    pub fn new(root: SceneNode, animations: Option<AnimationTable>) -> Self {
        Self {
            root,
            animations,
            disposed: AtomicBool::new(false),
        }
    }

    /// Named-node lookup for callers expecting a specific sub-resource;
    /// absence is the caller's `MissingNamedNode` condition, not ours.
    pub fn find_node(&self, name: &str) -> Option<&SceneNode> {
        self.root.find(name)
    }

    pub fn for_each_mesh<'a>(&'a self, mut visit: impl FnMut(&'a Mesh)) {
        self.root.for_each_mesh(&mut visit);
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.for_each_mesh(|_| count += 1);
        count
    }

    pub fn dispose(&self) {
        if !self.disposed.swap(true, Ordering::SeqCst) {
            self.for_each_mesh(|mesh| {
                mesh.geometry.release();
                mesh.material.release();
            });
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}
