//! Triangle mesh primitive.
//!
//! A mesh is one scene primitive that owns its triangles and a private BVH
//! over them, so the scene-level tree stays small even for dense geometry.

use std::sync::Arc;

use lumen_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::bvh::BvhTree;
use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::{Material, RenderError, RenderResult, Triangle};

/// A triangle mesh with a single material.
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    tree: BvhTree,
    material: Arc<dyn Material>,
}

impl TriangleMesh {
    /// Create a mesh from vertex positions and triangle indices.
    ///
    /// Every 3 indices form a triangle; a trailing partial triangle is
    /// ignored.
    pub fn new(
        positions: &[Vec3],
        indices: &[u32],
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        if indices.len() % 3 != 0 {
            log::warn!(
                "Mesh index count {} is not a multiple of 3, dropping the remainder",
                indices.len()
            );
        }

        let vertex = |index: u32| {
            positions
                .get(index as usize)
                .copied()
                .ok_or_else(|| RenderError::InvalidMeshIndex {
                    index,
                    vertex_count: positions.len(),
                })
        };

        let triangles = indices
            .chunks_exact(3)
            .map(|tri| -> RenderResult<Triangle> {
                Ok(Triangle::new(
                    vertex(tri[0])?,
                    vertex(tri[1])?,
                    vertex(tri[2])?,
                    material.clone(),
                ))
            })
            .collect::<RenderResult<Vec<_>>>()?;

        if triangles.is_empty() {
            return Err(RenderError::EmptyMesh);
        }

        let tree = BvhTree::build(&triangles)?;
        log::debug!(
            "Built mesh BVH: {} triangles, depth {}",
            triangles.len(),
            tree.depth()
        );

        Ok(Self {
            triangles,
            tree,
            material,
        })
    }

    /// A planar quad spanning `corner + s * edge_u + t * edge_v` for `s, t` in `[0, 1]`.
    ///
    /// The face normal is `edge_u x edge_v`.
    pub fn quad(
        corner: Vec3,
        edge_u: Vec3,
        edge_v: Vec3,
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        let positions = [
            corner,
            corner + edge_u,
            corner + edge_u + edge_v,
            corner + edge_v,
        ];
        Self::new(&positions, &[0, 1, 2, 0, 2, 3], material)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Primitive for TriangleMesh {
    fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        self.tree.intersect(&self.triangles, ray, ray_t)
    }

    fn bounding_box(&self) -> Aabb {
        self.tree.bounding_box()
    }

    fn area(&self) -> f32 {
        self.tree.area()
    }

    fn sample(&self, rng: &mut dyn RngCore) -> SurfaceSample {
        self.tree.sample(&self.triangles, rng)
    }

    fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }
}
