use super::bbox::{Aabb, Axis};
use crate::math::{Point3, Ray};

const LEAF_THRESHOLD: usize = 4;
const SAH_BUCKETS: usize = 12;
const TRAVERSAL_COST: f64 = 0.5;

/// Anything the BVH can store a leaf for: a bounding box plus a centroid
/// for SAH binning (spec §4.2's "array of primitive references with
/// precomputed bbox and centroid"). `Ctx` threads per-call state through
/// to `intersect` without the trait knowing what it is — bottom-level
/// triangles need none (`Ctx = ()`), but top-level instances need a
/// sampler to draw the free-flight distance for volume variants.
pub trait Primitive {
    type Hit;
    type Ctx;
    fn bbox(&self) -> Aabb;
    fn centroid(&self) -> Point3 {
        self.bbox().center()
    }
    fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, ctx: &mut Self::Ctx) -> Option<(f64, Self::Hit)>;
}

struct BuildNode {
    bbox: Aabb,
    /// Leaf: `Some((first, count))` indexing into the reordered primitive
    /// array. Interior: `None`, with children appended immediately after
    /// in `nodes` (left is `self_index + 1`; `second_child` names right).
    leaf_range: Option<(u32, u32)>,
    second_child: u32,
    axis: Axis,
}

/// Two-level-capable SAH BVH (spec §4.2), generic over whatever it's
/// indexing — bottom-level meshes store `Bvh<Polygon>`, the top level
/// stores `Bvh<Instance>`. Traversal is iterative with an explicit stack;
/// only the build recurses, per the spec's explicit split between the two.
pub struct Bvh<P: Primitive> {
    nodes: Vec<BuildNode>,
    primitives: Vec<P>,
}

impl<P: Primitive> Bvh<P> {
    /// An empty, always-miss BVH — the "null BVH" sentinel for scenes with
    /// no primitives of this kind (spec §4.2's failure mode).
    pub fn empty() -> Self {
        Self {
            nodes: Vec::new(),
            primitives: Vec::new(),
        }
    }

    pub fn build(primitives: Vec<P>) -> Self {
        if primitives.is_empty() {
            return Self::empty();
        }
        let mut info: Vec<PrimInfo> = primitives
            .iter()
            .enumerate()
            .map(|(i, p)| PrimInfo {
                index: i as u32,
                bbox: p.bbox(),
                centroid: p.centroid(),
            })
            .collect();

        let mut nodes = Vec::new();
        let mut ordered_index = Vec::with_capacity(primitives.len());
        build_recursive(&mut info, &mut nodes, &mut ordered_index);

        let mut slots: Vec<Option<P>> = primitives.into_iter().map(Some).collect();
        let ordered = ordered_index
            .into_iter()
            .map(|i| slots[i as usize].take().unwrap())
            .collect();

        Self {
            nodes,
            primitives: ordered,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn bbox(&self) -> Aabb {
        self.nodes.first().map(|n| n.bbox).unwrap_or_else(Aabb::empty)
    }

    /// Looks up a primitive by the index returned from [`Bvh::intersect`]
    /// (which is an index into build order, not the caller's original
    /// ordering).
    pub fn primitive(&self, index: u32) -> &P {
        &self.primitives[index as usize]
    }

    /// Returns `(primitive index in build order, t, hit)` of the nearest
    /// intersection, if any. Iterative traversal with an explicit stack:
    /// visit the nearer child first, push the farther child only if its
    /// entry `t` still beats the current best (spec §4.2).
    pub fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, ctx: &mut P::Ctx) -> Option<(u32, f64, P::Hit)> {
        if self.nodes.is_empty() {
            return None;
        }
        let mut best_t = t_max;
        let mut best: Option<(u32, f64, P::Hit)> = None;
        let mut stack: Vec<u32> = Vec::with_capacity(64);
        stack.push(0);

        while let Some(node_idx) = stack.pop() {
            let node = &self.nodes[node_idx as usize];
            let (hit_box, box_t_min) = node.bbox.intersects(ray, t_min, best_t);
            if !hit_box || box_t_min > best_t {
                continue;
            }
            match node.leaf_range {
                Some((first, count)) => {
                    for i in first..first + count {
                        if let Some((t, hit)) = self.primitives[i as usize].intersect(ray, t_min, best_t, ctx) {
                            best_t = t;
                            best = Some((i, t, hit));
                        }
                    }
                }
                None => {
                    let left_idx = node_idx + 1;
                    let right_idx = node.second_child;
                    let left_box = self.nodes[left_idx as usize].bbox;
                    let right_box = self.nodes[right_idx as usize].bbox;
                    let (left_hit, left_t) = left_box.intersects(ray, t_min, best_t);
                    let (right_hit, right_t) = right_box.intersects(ray, t_min, best_t);
                    // Push farther first so the nearer child pops (and is
                    // visited) first.
                    if left_hit && right_hit {
                        if left_t <= right_t {
                            stack.push(right_idx);
                            stack.push(left_idx);
                        } else {
                            stack.push(left_idx);
                            stack.push(right_idx);
                        }
                    } else if left_hit {
                        stack.push(left_idx);
                    } else if right_hit {
                        stack.push(right_idx);
                    }
                }
            }
        }
        best
    }
}

struct PrimInfo {
    index: u32,
    bbox: Aabb,
    centroid: Point3,
}

fn build_recursive(info: &mut [PrimInfo], nodes: &mut Vec<BuildNode>, ordered: &mut Vec<u32>) -> u32 {
    let bbox = info.iter().map(|p| p.bbox).fold(Aabb::empty(), |a, b| Aabb::union(&a, &b));
    let node_idx = nodes.len() as u32;

    if info.len() <= LEAF_THRESHOLD {
        return push_leaf(info, bbox, nodes, ordered);
    }

    let centroid_bbox = info
        .iter()
        .fold(Aabb::empty(), |a, p| {
            let mut b = a;
            b.grow(p.centroid);
            b
        });

    for axis in centroid_bbox.longest_axis_order() {
        if let Some(mid) = find_sah_split(info, centroid_bbox, axis, bbox) {
            nodes.push(BuildNode {
                bbox,
                leaf_range: None,
                second_child: 0,
                axis,
            });
            let (left, right) = info.split_at_mut(mid);
            build_recursive(left, nodes, ordered);
            let right_idx = build_recursive(right, nodes, ordered);
            nodes[node_idx as usize].second_child = right_idx;
            return node_idx;
        }
    }

    push_leaf(info, bbox, nodes, ordered)
}

fn push_leaf(info: &[PrimInfo], bbox: Aabb, nodes: &mut Vec<BuildNode>, ordered: &mut Vec<u32>) -> u32 {
    let first = ordered.len() as u32;
    for p in info {
        ordered.push(p.index);
    }
    let node_idx = nodes.len() as u32;
    nodes.push(BuildNode {
        bbox,
        leaf_range: Some((first, info.len() as u32)),
        second_child: 0,
        axis: Axis::X,
    });
    node_idx
}

/// Bins centroids along `axis` into [`SAH_BUCKETS`], evaluates the
/// surface-area-heuristic cost at each bucket boundary, and partitions
/// `info` in place around the minimum if it beats the cost of a leaf.
/// Returns the partition point, or `None` if no split is worthwhile.
fn find_sah_split(info: &mut [PrimInfo], centroid_bbox: Aabb, axis: Axis, parent_bbox: Aabb) -> Option<usize> {
    let extent = centroid_bbox.extent()[axis as usize];
    if extent <= 0.0 {
        return None;
    }
    let axis_idx = axis as usize;
    let c_min = centroid_bbox.min[axis_idx];

    let bucket_of = |c: Point3| -> usize {
        let b = (SAH_BUCKETS as f64 * (c[axis_idx] - c_min) / extent) as usize;
        b.min(SAH_BUCKETS - 1)
    };

    let mut bucket_bbox = vec![Aabb::empty(); SAH_BUCKETS];
    let mut bucket_count = vec![0u32; SAH_BUCKETS];
    for p in info.iter() {
        let b = bucket_of(p.centroid);
        bucket_bbox[b] = Aabb::union(&bucket_bbox[b], &p.bbox);
        bucket_count[b] += 1;
    }

    let parent_area = parent_bbox.surface_area();
    if parent_area <= 0.0 {
        return None;
    }

    let mut best_cost = f64::INFINITY;
    let mut best_split = None;
    for split in 0..SAH_BUCKETS - 1 {
        let mut left_box = Aabb::empty();
        let mut left_count = 0u32;
        for bb in bucket_bbox.iter().take(split + 1) {
            left_box = Aabb::union(&left_box, bb);
        }
        for c in bucket_count.iter().take(split + 1) {
            left_count += *c;
        }
        let mut right_box = Aabb::empty();
        let mut right_count = 0u32;
        for bb in bucket_bbox.iter().skip(split + 1) {
            right_box = Aabb::union(&right_box, bb);
        }
        for c in bucket_count.iter().skip(split + 1) {
            right_count += *c;
        }
        if left_count == 0 || right_count == 0 {
            continue;
        }
        let cost = TRAVERSAL_COST
            + (left_box.surface_area() * left_count as f64 + right_box.surface_area() * right_count as f64)
                / parent_area;
        if cost < best_cost {
            best_cost = cost;
            best_split = Some(split);
        }
    }

    let leaf_cost = info.len() as f64;
    let split = best_split?;
    if best_cost >= leaf_cost {
        return None;
    }

    // Partition in place: everything in buckets `0..=split` goes left.
    let mid = itertools_partition(info, |p| bucket_of(p.centroid) <= split);
    if mid == 0 || mid == info.len() {
        return None;
    }
    Some(mid)
}

/// `Vec::partition_point`-style in-place stable-ish partition (std's
/// `slice::partition_point` only works on already-partitioned data, so
/// this does the partitioning itself — equivalent to `Iterator::partition`
/// but without allocating a second `Vec`).
fn itertools_partition<T>(slice: &mut [T], mut pred: impl FnMut(&T) -> bool) -> usize {
    let mut i = 0;
    for j in 0..slice.len() {
        if pred(&slice[j]) {
            slice.swap(i, j);
            i += 1;
        }
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec3;

    struct TestSphere {
        center: Point3,
        radius: f64,
    }

    impl Primitive for TestSphere {
        type Hit = ();
        type Ctx = ();
        fn bbox(&self) -> Aabb {
            let r = Vec3::splat(self.radius);
            Aabb::new(self.center - r, self.center + r)
        }
        fn intersect(&self, ray: &Ray, t_min: f64, t_max: f64, _ctx: &mut ()) -> Option<(f64, ())> {
            let oc = ray.origin - self.center;
            let a = ray.direction.length_squared();
            let half_b = oc.dot(ray.direction);
            let c = oc.length_squared() - self.radius * self.radius;
            let disc = half_b * half_b - a * c;
            if disc < 0.0 {
                return None;
            }
            let root = (-half_b - disc.sqrt()) / a;
            if root < t_min || root > t_max {
                return None;
            }
            Some((root, ()))
        }
    }

    #[test]
    fn empty_bvh_always_misses() {
        let bvh: Bvh<TestSphere> = Bvh::empty();
        let ray = Ray::new(Point3::zero(), Vec3::unit_z());
        assert!(bvh.intersect(&ray, 0.0, f64::INFINITY, &mut ()).is_none());
    }

    #[test]
    fn finds_nearest_of_many_spheres() {
        let spheres: Vec<TestSphere> = (0..50)
            .map(|i| TestSphere {
                center: Point3::new(i as f64 * 3.0, 0.0, 10.0),
                radius: 1.0,
            })
            .collect();
        let bvh = Bvh::build(spheres);
        let ray = Ray::new(Point3::new(15.0, 0.0, 0.0), Vec3::unit_z());
        let hit = bvh.intersect(&ray, 0.0, f64::INFINITY, &mut ());
        assert!(hit.is_some());
        let (_, t, _) = hit.unwrap();
        assert!((t - 9.0).abs() < 1e-6);
    }

    #[test]
    fn ray_missing_all_primitives_reports_none() {
        let spheres: Vec<TestSphere> = (0..20)
            .map(|i| TestSphere {
                center: Point3::new(i as f64 * 3.0, 0.0, 10.0),
                radius: 1.0,
            })
            .collect();
        let bvh = Bvh::build(spheres);
        let ray = Ray::new(Point3::new(1000.0, 1000.0, 0.0), Vec3::unit_z());
        assert!(bvh.intersect(&ray, 0.0, f64::INFINITY, &mut ()).is_none());
    }
}
