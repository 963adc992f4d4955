//! Scene lifecycle: collect primitives, then build once.
//!
//! [`Scene`] is the mutable collection. [`Scene::build`] consumes it and
//! returns a [`BuiltScene`] whose BVH always matches its primitives, so no
//! query can ever see a stale tree.

use lumen_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::bvh::BvhTree;
use crate::primitive::{Intersection, Primitive};
use crate::sampling::gen_f32;
use crate::{Camera, Color, RenderError, RenderResult};

/// A primitive stored in a scene.
pub type PrimitiveBox = Box<dyn Primitive>;

/// Scene under construction.
#[derive(Default)]
pub struct Scene {
    primitives: Vec<PrimitiveBox>,
    camera: Camera,
}

impl Scene {
    pub fn new(camera: Camera) -> Self {
        Self {
            primitives: Vec::new(),
            camera,
        }
    }

    /// Add a primitive to the scene.
    pub fn add_primitive(&mut self, primitive: impl Primitive + 'static) {
        self.primitives.push(Box::new(primitive));
    }

    pub fn add_boxed(&mut self, primitive: PrimitiveBox) {
        self.primitives.push(primitive);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Build the BVH and freeze the scene.
    ///
    /// Fails with [`RenderError::EmptyScene`] if no primitives were added.
    pub fn build(self) -> RenderResult<BuiltScene> {
        let Scene {
            primitives,
            mut camera,
        } = self;

        let start = std::time::Instant::now();
        let tree = BvhTree::build(&primitives)?;
        camera.initialize();

        let emissive: Vec<usize> = primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| p.material().has_emission())
            .map(|(i, _)| i)
            .collect();
        let emissive_area = emissive.iter().map(|&i| primitives[i].area()).sum();

        log::info!(
            "Built scene BVH in {:?}: {} primitives ({} emissive, area {:.3}), depth {}",
            start.elapsed(),
            primitives.len(),
            emissive.len(),
            emissive_area,
            tree.depth()
        );
        if emissive.is_empty() {
            log::warn!("Scene has no emissive primitives; direct lighting will be zero");
        }

        Ok(BuiltScene {
            primitives,
            tree,
            camera,
            emissive,
            emissive_area,
        })
    }
}

/// A point sampled on a light, with the emission it carries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSample {
    pub point: Vec3,
    /// Outward normal of the light surface at `point`
    pub normal: Vec3,
    pub emission: Color,
    /// Density with respect to area over all emissive surfaces
    pub pdf: f32,
}

/// An immutable scene with its BVH, safe to share across render workers.
pub struct BuiltScene {
    primitives: Vec<PrimitiveBox>,
    tree: BvhTree,
    camera: Camera,
    /// Indices of emissive primitives, in insertion order
    emissive: Vec<usize>,
    emissive_area: f32,
}

impl BuiltScene {
    /// Closest intersection inside `ray_t`.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval) -> Option<Intersection<'_>> {
        self.tree.intersect(&self.primitives, ray, ray_t)
    }

    pub fn has_lights(&self) -> bool {
        self.emissive_area > 0.0
    }

    pub fn emissive_area(&self) -> f32 {
        self.emissive_area
    }

    /// Pick a point on an emissive surface, uniformly by area.
    ///
    /// A light is chosen with probability proportional to its area and then
    /// sampled uniformly, so the combined pdf is `1 / emissive_area`.
    pub fn sample_light(&self, rng: &mut dyn RngCore) -> RenderResult<LightSample> {
        if !self.has_lights() {
            return Err(RenderError::NoEmissiveSurfaces);
        }

        let mut pick = gen_f32(rng) * self.emissive_area;
        let mut chosen = self.emissive[self.emissive.len() - 1];
        for &index in &self.emissive {
            let area = self.primitives[index].area();
            if pick < area {
                chosen = index;
                break;
            }
            pick -= area;
        }

        let light = &self.primitives[chosen];
        let sample = light.sample(rng);
        Ok(LightSample {
            point: sample.point,
            normal: sample.normal,
            emission: light.material().emission(),
            pdf: 1.0 / self.emissive_area,
        })
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn tree(&self) -> &BvhTree {
        &self.tree
    }

    pub fn primitives(&self) -> &[PrimitiveBox] {
        &self.primitives
    }
}
