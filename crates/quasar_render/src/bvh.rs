//! Bounding volume hierarchy over a triangle array.
//!
//! The tree is stored as a flat node array plus a reordered index array into
//! the triangle slice it was built from. Construction is top-down median
//! split on the longest axis; traversal is iterative with a fixed-capacity
//! stack, so query cost never depends on call-stack depth.

use quasar_math::{Aabb, Ray, Vec3};

use crate::triangle::Triangle;

/// Maximum triangles per leaf before splitting.
const LEAF_MAX_TRIANGLES: usize = 4;
/// Maximum tree depth during construction.
const MAX_BUILD_DEPTH: u32 = 12;
/// Traversal stack capacity. Must stay >= MAX_BUILD_DEPTH plus margin.
const MAX_TRAVERSAL_DEPTH: usize = 16;

/// Hits closer than this are treated as self-intersection and skipped.
const T_EPSILON: f32 = 1e-3;

/// A single BVH node.
///
/// Leaves store a range into the reordered index array; internal nodes store
/// their two child node indices. `primitive_count > 0` marks a leaf.
#[derive(Debug, Clone, Copy)]
struct BvhNode {
    bounds: Aabb,
    /// Leaf: offset of the first triangle index. Internal: left child index.
    first: u32,
    /// Number of triangles in a leaf, 0 for internal nodes.
    primitive_count: u32,
    /// Right child index (internal nodes only).
    right_child: u32,
    /// Split axis (0=X, 1=Y, 2=Z) for internal nodes.
    split_axis: u8,
}

impl BvhNode {
    fn is_leaf(&self) -> bool {
        self.primitive_count > 0
    }
}

/// A triangle wrapped with its bounds and centroid for construction.
struct BuildPrimitive {
    triangle_index: u32,
    centroid: Vec3,
    bounds: Aabb,
}

impl BuildPrimitive {
    fn new(triangle_index: u32, triangle: &Triangle) -> Self {
        let bounds = triangle.bounding_box();
        Self {
            triangle_index,
            centroid: bounds.center(),
            bounds,
        }
    }
}

/// The closest triangle hit found by a BVH query.
#[derive(Debug, Copy, Clone)]
pub struct BvhHit {
    pub t: f32,
    pub point: Vec3,
    /// Unit geometric normal, oriented toward the ray origin.
    pub normal: Vec3,
    pub barycentric: Vec3,
    pub triangle_index: u32,
}

/// Immutable spatial index over a triangle array.
///
/// The index stores triangle *indices* only; `intersect` must be given the
/// same slice that `build` consumed. Mutating the triangles invalidates the
/// index and requires a rebuild.
#[derive(Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    triangle_indices: Vec<u32>,
    root: u32,
}

#[derive(Debug, Copy, Clone)]
struct TraversalState {
    node_index: u32,
    t_min: f32,
}

impl Bvh {
    /// Build an index over `triangles`. An empty slice produces an empty
    /// index whose queries report no hit.
    pub fn build(triangles: &[Triangle]) -> Self {
        if triangles.is_empty() {
            return Self::default();
        }

        let mut primitives: Vec<BuildPrimitive> = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| BuildPrimitive::new(i as u32, t))
            .collect();

        let mut bvh = Self {
            nodes: Vec::new(),
            triangle_indices: Vec::with_capacity(triangles.len()),
            root: 0,
        };
        bvh.root = bvh.build_recursive(&mut primitives, 0);

        log::info!(
            "BVH built: {} nodes over {} triangles (max depth {})",
            bvh.nodes.len(),
            triangles.len(),
            MAX_BUILD_DEPTH
        );

        bvh
    }

    /// True when the index holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Find the closest hit with `t` in `(epsilon, inf)`.
    ///
    /// `triangles` must be the slice this index was built from.
    pub fn intersect(&self, ray: &Ray, triangles: &[Triangle]) -> Option<BvhHit> {
        if self.nodes.is_empty() {
            return None;
        }

        let root_hit = self.nodes[self.root as usize].bounds.intersect(ray)?;

        let mut stack = [TraversalState {
            node_index: self.root,
            t_min: root_hit.min,
        }; MAX_TRAVERSAL_DEPTH];
        let mut stack_len = 1usize;

        let mut closest_t = f32::INFINITY;
        let mut best_hit: Option<BvhHit> = None;

        while stack_len > 0 {
            stack_len -= 1;
            let current = stack[stack_len];

            // Everything in this subtree is farther than the best hit
            if current.t_min > closest_t {
                continue;
            }

            let node = self.nodes[current.node_index as usize];

            if node.is_leaf() {
                for i in 0..node.primitive_count {
                    let triangle_index = self.triangle_indices[(node.first + i) as usize];
                    let triangle = &triangles[triangle_index as usize];

                    if let Some(hit) = triangle.intersect(ray) {
                        if hit.t > T_EPSILON && hit.t < closest_t {
                            closest_t = hit.t;

                            let mut normal = triangle.normal();
                            if normal.dot(ray.origin - hit.point) < 0.0 {
                                normal = -normal;
                            }

                            best_hit = Some(BvhHit {
                                t: hit.t,
                                point: hit.point,
                                normal,
                                barycentric: hit.barycentric,
                                triangle_index,
                            });
                        }
                    }
                }
            } else {
                // Push the far child first so the near one is popped first,
                // letting the closest-hit prune cut the far subtree
                let (near, far) = if ray.direction[node.split_axis as usize] < 0.0 {
                    (node.right_child, node.first)
                } else {
                    (node.first, node.right_child)
                };
                for child in [far, near] {
                    let child_bounds = &self.nodes[child as usize].bounds;
                    if let Some(slab) = child_bounds.intersect(ray) {
                        if slab.min < closest_t {
                            if stack_len >= MAX_TRAVERSAL_DEPTH {
                                log::warn!("BVH traversal stack exhausted, truncating query");
                                break;
                            }
                            stack[stack_len] = TraversalState {
                                node_index: child,
                                t_min: slab.min,
                            };
                            stack_len += 1;
                        }
                    }
                }
            }
        }

        best_hit
    }

    fn build_recursive(&mut self, primitives: &mut [BuildPrimitive], depth: u32) -> u32 {
        debug_assert!(!primitives.is_empty());

        let mut bounds = Aabb::EMPTY;
        for p in primitives.iter() {
            bounds.expand_box(&p.bounds);
        }

        let node_index = self.nodes.len() as u32;
        self.nodes.push(BvhNode {
            bounds,
            first: 0,
            primitive_count: 0,
            right_child: 0,
            split_axis: 0,
        });

        let count = primitives.len();
        if count <= LEAF_MAX_TRIANGLES || depth >= MAX_BUILD_DEPTH {
            let first = self.triangle_indices.len() as u32;
            self.triangle_indices
                .extend(primitives.iter().map(|p| p.triangle_index));

            let node = &mut self.nodes[node_index as usize];
            node.first = first;
            node.primitive_count = count as u32;
            return node_index;
        }

        // Median split along the widest axis of the node bounds
        let axis = bounds.longest_axis();
        primitives.sort_by(|a, b| a.centroid[axis].total_cmp(&b.centroid[axis]));

        let mid = count / 2;
        let (left_half, right_half) = primitives.split_at_mut(mid);
        let left_child = self.build_recursive(left_half, depth + 1);
        let right_child = self.build_recursive(right_half, depth + 1);

        let node = &mut self.nodes[node_index as usize];
        node.first = left_child;
        node.right_child = right_child;
        node.primitive_count = 0;
        node.split_axis = axis as u8;

        node_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn brute_force(ray: &Ray, triangles: &[Triangle]) -> Option<(f32, usize)> {
        let mut best: Option<(f32, usize)> = None;
        for (i, triangle) in triangles.iter().enumerate() {
            if let Some(hit) = triangle.intersect(ray) {
                if hit.t > T_EPSILON && best.map_or(true, |(t, _)| hit.t < t) {
                    best = Some((hit.t, i));
                }
            }
        }
        best
    }

    fn random_triangle_soup(rng: &mut StdRng, count: usize) -> Vec<Triangle> {
        (0..count)
            .map(|_| {
                let base = Vec3::new(
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                    rng.gen_range(-10.0..10.0),
                );
                let offset = |rng: &mut StdRng| {
                    Vec3::new(
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                        rng.gen_range(-1.0..1.0),
                    )
                };
                Triangle::new(base, base + offset(rng), base + offset(rng))
            })
            .collect()
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());

        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(bvh.intersect(&ray, &[]).is_none());
    }

    #[test]
    fn test_single_triangle() {
        let triangles = vec![Triangle::new(
            Vec3::new(-1.0, -1.0, -5.0),
            Vec3::new(1.0, -1.0, -5.0),
            Vec3::new(0.0, 1.0, -5.0),
        )];
        let bvh = Bvh::build(&triangles);
        assert_eq!(bvh.node_count(), 1);

        let ray = Ray::new(Vec3::ZERO, -Vec3::Z);
        let hit = bvh.intersect(&ray, &triangles).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
        assert_eq!(hit.triangle_index, 0);

        let miss = Ray::new(Vec3::ZERO, Vec3::Z);
        assert!(bvh.intersect(&miss, &triangles).is_none());
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);

        for count in [1usize, 2, 5, 33, 200] {
            let triangles = random_triangle_soup(&mut rng, count);
            let bvh = Bvh::build(&triangles);

            for _ in 0..200 {
                let origin = Vec3::new(
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                    rng.gen_range(-15.0..15.0),
                );
                let direction = Vec3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                );
                if direction.length_squared() < 1e-6 {
                    continue;
                }
                let ray = Ray::new(origin, direction);

                let expected = brute_force(&ray, &triangles);
                let actual = bvh.intersect(&ray, &triangles);

                match (expected, actual) {
                    (None, None) => {}
                    (Some((t, index)), Some(hit)) => {
                        assert!((hit.t - t).abs() < 1e-4, "t mismatch: {} vs {}", hit.t, t);
                        assert_eq!(hit.triangle_index as usize, index);
                    }
                    (expected, actual) => {
                        panic!("hit mismatch: expected {expected:?}, got {actual:?}")
                    }
                }
            }
        }
    }

    #[test]
    fn test_bvh_normal_faces_ray_origin() {
        let triangles = vec![Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        )];
        let bvh = Bvh::build(&triangles);

        // Approach from both sides: the reported normal must face the origin
        let front = Ray::new(Vec3::new(0.0, 0.0, 5.0), -Vec3::Z);
        let hit = bvh.intersect(&front, &triangles).unwrap();
        assert!(hit.normal.z > 0.0);

        let back = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let hit = bvh.intersect(&back, &triangles).unwrap();
        assert!(hit.normal.z < 0.0);
    }

    #[test]
    fn test_degenerate_triangles_survive_build() {
        // Zero-area triangles must build into leaves without crashing
        let triangles: Vec<Triangle> = (0..16)
            .map(|i| {
                let p = Vec3::splat(i as f32);
                Triangle::new(p, p, p)
            })
            .collect();

        let bvh = Bvh::build(&triangles);
        assert!(!bvh.is_empty());

        let ray = Ray::new(Vec3::new(-5.0, 0.0, 0.0), Vec3::X);
        assert!(bvh.intersect(&ray, &triangles).is_none());
    }

    #[test]
    fn test_identical_centroids_terminate() {
        // All centroids equal: median split cannot separate, depth bound
        // still terminates construction
        let p0 = Vec3::new(-1.0, 0.0, 0.0);
        let p1 = Vec3::new(1.0, 0.0, 0.0);
        let p2 = Vec3::new(0.0, 1.0, 0.0);
        let triangles: Vec<Triangle> = (0..64).map(|_| Triangle::new(p0, p1, p2)).collect();

        let bvh = Bvh::build(&triangles);
        let ray = Ray::new(Vec3::new(0.0, 0.5, 5.0), -Vec3::Z);
        let hit = bvh.intersect(&ray, &triangles).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-4);
    }
}
