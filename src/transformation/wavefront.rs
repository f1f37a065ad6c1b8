use crate::transformation::hacd::Decomposition;
use obj::{Group, IndexTuple, ObjData, ObjError, Object, SimplePolygon};
use std::path::Path;

/// Errors that can occur while exporting a mesh to a file.
#[derive(thiserror::Error, Debug)]
pub enum MeshExportError {
    /// The output file could not be created.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The Wavefront serializer failed.
    #[error(transparent)]
    Obj(#[from] ObjError),
}

impl Decomposition {
    /// Outputs a Wavefront (`.obj`) file at the given path, with one named
    /// object per convex cluster (or a single anonymous object if
    /// `uni_color` is set).
    ///
    /// At most `cluster_limit` clusters are written when the limit is given.
    ///
    /// This function is enabled by the `wavefront` feature flag.
    pub fn to_obj_file(
        &self,
        path: &Path,
        uni_color: bool,
        cluster_limit: Option<usize>,
    ) -> Result<(), MeshExportError> {
        let mut file = std::fs::File::create(path)?;

        let n_clusters = match cluster_limit {
            Some(limit) => limit.min(self.clusters().len()),
            None => self.clusters().len(),
        };
        let clusters = &self.clusters()[..n_clusters];

        let mut position = Vec::new();
        let mut objects = Vec::new();
        let mut base = 0usize;

        for (cid, cluster) in clusters.iter().enumerate() {
            position.extend(
                cluster
                    .points
                    .iter()
                    .map(|pt| [pt.x as f32, pt.y as f32, pt.z as f32]),
            );

            let polys = cluster
                .triangles
                .iter()
                .map(|tri| {
                    SimplePolygon(vec![
                        IndexTuple(base + tri[0] as usize, None, None),
                        IndexTuple(base + tri[1] as usize, None, None),
                        IndexTuple(base + tri[2] as usize, None, None),
                    ])
                })
                .collect();
            base += cluster.points.len();

            let name = if uni_color {
                String::new()
            } else {
                format!("cluster_{:03}", cid)
            };

            objects.push(Object {
                groups: vec![Group {
                    polys,
                    name: name.clone(),
                    index: 0,
                    material: None,
                }],
                name,
            });
        }

        if uni_color {
            // A single anonymous object holding every polygon.
            let polys = objects
                .drain(..)
                .flat_map(|o| o.groups.into_iter().flat_map(|g| g.polys))
                .collect();
            objects = vec![Object {
                groups: vec![Group {
                    polys,
                    name: String::new(),
                    index: 0,
                    material: None,
                }],
                name: String::new(),
            }];
        }

        ObjData {
            position,
            objects,
            ..Default::default()
        }
        .write_to_buf(&mut file)?;

        Ok(())
    }
}
