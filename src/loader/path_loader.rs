use std::collections::HashMap;

use glam::Vec3;
use log::warn;
use serde::Deserialize;

use crate::error::{LoadErrorKind, decode_error};
use crate::io::source::AssetSource;
use crate::manifest::PathDescriptor;
use crate::resources::misc::PathSet;

/// One path file holds any number of named paths; a path is either a flat
/// point list, a list of curve segments, or both (points first).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathsFile {
    paths: Vec<PathDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PathDef {
    name: String,
    #[serde(default)]
    points: Vec<[f32; 3]>,
    #[serde(default)]
    curves: Vec<CurveDef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurveDef {
    points: Vec<[f32; 3]>,
}

pub struct PathLoader {}

impl PathLoader {
    /// Flattens every path's nested curve structure into one ordered point
    /// sequence, then applies the descriptor's inversion and offset.
    pub fn load(
        descriptor: &PathDescriptor,
        source: &dyn AssetSource,
    ) -> Result<PathSet, LoadErrorKind> {
        let bytes = source.fetch(&descriptor.locator)?;
        let file: PathsFile = serde_json::from_slice(&bytes)
            .map_err(|e| decode_error(format!("path file parse: {}", e)))?;

        let offset = Vec3::from_array(descriptor.offset);
        let mut paths: HashMap<String, Vec<Vec3>> = HashMap::with_capacity(file.paths.len());
        for path in &file.paths {
            let flattened = path
                .points
                .iter()
                .chain(path.curves.iter().flat_map(|curve| curve.points.iter()))
                .map(|&[x, y, z]| {
                    let x = if descriptor.invert_x { -x } else { x };
                    Vec3::new(x, y, z) + offset
                })
                .collect::<Vec<_>>();

            if flattened.is_empty() {
                warn!("Path {} in {} has no points", path.name, descriptor.locator);
            }
            if paths.insert(path.name.clone(), flattened).is_some() {
                return Err(decode_error(format!(
                    "duplicate path name {} in {}",
                    path.name, descriptor.locator
                )));
            }
        }

        Ok(PathSet::new(paths))
    }
}
