//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over a caller-owned slice of primitives. Leaves store an
//! index into that slice rather than the primitive itself, so the same
//! primitives stay reachable through the flat collection; every query takes
//! the slice the tree was built from.

use std::collections::VecDeque;

use lumen_math::{Aabb, Interval, Ray};
use rand::RngCore;

use crate::primitive::{Intersection, Primitive, SurfaceSample};
use crate::sampling::gen_f32;
use crate::{RenderError, RenderResult};

/// BVH node - either an interior node with two children or a leaf with one primitive.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two children.
    Interior {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
        /// Sum of the children's areas
        area: f32,
    },
    /// Leaf node referencing exactly one primitive.
    Leaf {
        primitive: usize,
        bbox: Aabb,
        area: f32,
    },
}

impl BvhNode {
    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Interior { bbox, .. } | BvhNode::Leaf { bbox, .. } => *bbox,
        }
    }

    /// Surface area of every primitive below this node.
    pub fn area(&self) -> f32 {
        match self {
            BvhNode::Interior { area, .. } | BvhNode::Leaf { area, .. } => *area,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, BvhNode::Leaf { .. })
    }

    pub fn children(&self) -> Option<(&BvhNode, &BvhNode)> {
        match self {
            BvhNode::Interior { left, right, .. } => Some((&**left, &**right)),
            BvhNode::Leaf { .. } => None,
        }
    }

    /// Index of the referenced primitive for a leaf.
    pub fn primitive(&self) -> Option<usize> {
        match self {
            BvhNode::Leaf { primitive, .. } => Some(*primitive),
            BvhNode::Interior { .. } => None,
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.depth().max(right.depth()),
            None => 1,
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
            None => 1,
        }
    }

    /// Recursive median-split construction over `indices`.
    ///
    /// Sorts by centroid on the axis where the centroids spread the most
    /// and splits at the middle index, which keeps depth at about log2(n).
    fn build(indices: &mut [usize], bounds: &[Aabb], areas: &[f32]) -> Self {
        if let [primitive] = *indices {
            return BvhNode::Leaf {
                primitive,
                bbox: bounds[primitive],
                area: areas[primitive],
            };
        }

        // Compute centroid bounds to choose split axis
        let centroid_bounds = indices.iter().fold(Aabb::EMPTY, |acc, &i| {
            Aabb::surrounding(&acc, &Aabb::from_point(bounds[i].centroid()))
        });
        let axis = centroid_bounds.longest_axis();

        indices.sort_unstable_by(|&a, &b| {
            bounds[a].centroid()[axis].total_cmp(&bounds[b].centroid()[axis])
        });

        // Split at midpoint
        let mid = indices.len() / 2;
        let (left_indices, right_indices) = indices.split_at_mut(mid);
        let left = Self::build(left_indices, bounds, areas);
        let right = Self::build(right_indices, bounds, areas);

        BvhNode::Interior {
            bbox: Aabb::surrounding(&left.bounding_box(), &right.bounding_box()),
            area: left.area() + right.area(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

/// Immutable BVH over a slice of primitives.
#[derive(Debug)]
pub struct BvhTree {
    root: BvhNode,
}

impl BvhTree {
    /// Build a tree over `primitives`.
    ///
    /// Fails with [`RenderError::EmptyScene`] if there is nothing to index.
    pub fn build<P: Primitive>(primitives: &[P]) -> RenderResult<Self> {
        if primitives.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let bounds: Vec<Aabb> = primitives.iter().map(|p| p.bounding_box()).collect();
        let areas: Vec<f32> = primitives.iter().map(|p| p.area()).collect();
        let mut indices: Vec<usize> = (0..primitives.len()).collect();

        let root = BvhNode::build(&mut indices, &bounds, &areas);
        Ok(Self { root })
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    pub fn area(&self) -> f32 {
        self.root.area()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Closest intersection of `ray` with any primitive inside `ray_t`.
    ///
    /// Breadth-first with an explicit queue, so deep trees cannot exhaust
    /// the stack. Boxes are tested against the query window with its upper
    /// bound lowered to the closest hit found so far.
    pub fn intersect<'a, P: Primitive>(
        &self,
        primitives: &'a [P],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<Intersection<'a>> {
        let mut closest: Option<Intersection<'a>> = None;
        let mut queue = VecDeque::new();
        queue.push_back(&self.root);

        while let Some(node) = queue.pop_front() {
            let window = match &closest {
                Some(hit) => ray_t.with_max(hit.t),
                None => ray_t,
            };
            if !node.bounding_box().hit(ray, window) {
                continue;
            }

            match node {
                BvhNode::Leaf { primitive, .. } => {
                    if let Some(hit) = primitives[*primitive].intersect(ray, window) {
                        if closest.map_or(true, |best| hit.t < best.t) {
                            closest = Some(hit);
                        }
                    }
                }
                BvhNode::Interior { left, right, .. } => {
                    for child in [left, right] {
                        if child.bounding_box().hit(ray, window) {
                            queue.push_back(&**child);
                        }
                    }
                }
            }
        }

        closest
    }

    /// Draw a point uniformly by area over all primitives in the tree.
    ///
    /// Descends by cumulative node area, so a primitive is chosen with
    /// probability proportional to its area; the returned pdf is
    /// `1 / total area`.
    pub fn sample<P: Primitive>(&self, primitives: &[P], rng: &mut dyn RngCore) -> SurfaceSample {
        let total = self.root.area();
        let mut pick = gen_f32(rng) * total;
        let mut node = &self.root;

        loop {
            match node {
                BvhNode::Leaf { primitive, .. } => {
                    let sample = primitives[*primitive].sample(rng);
                    return SurfaceSample {
                        pdf: 1.0 / total.max(f32::MIN_POSITIVE),
                        ..sample
                    };
                }
                BvhNode::Interior { left, right, .. } => {
                    if pick < left.area() {
                        node = &**left;
                    } else {
                        pick -= left.area();
                        node = &**right;
                    }
                }
            }
        }
    }
}
