use crate::math::{Point3, Ray, Vec3};

/// Axis index into a bbox/vector, used when picking a split axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis {
    pub fn all_longest_first(extents: [f64; 3]) -> [Axis; 3] {
        let mut idx = [0usize, 1, 2];
        idx.sort_by(|&a, &b| extents[b].partial_cmp(&extents[a]).unwrap());
        [
            Axis::from_index(idx[0]),
            Axis::from_index(idx[1]),
            Axis::from_index(idx[2]),
        ]
    }

    fn from_index(i: usize) -> Axis {
        match i {
            0 => Axis::X,
            1 => Axis::Y,
            _ => Axis::Z,
        }
    }
}

/// Axis-aligned bounding box. Empty boxes use `+inf, -inf` so that unioning
/// with any real box produces that box unchanged (spec §3).
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub const fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }

    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Point3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn surface_area(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        let e = self.extent();
        2.0 * (e.x * e.y + e.y * e.z + e.z * e.x)
    }

    pub fn longest_axis(&self) -> Axis {
        let e = self.extent();
        if e.x > e.y && e.x > e.z {
            Axis::X
        } else if e.y > e.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    pub fn longest_axis_order(&self) -> [Axis; 3] {
        let e = self.extent();
        Axis::all_longest_first([e.x, e.y, e.z])
    }

    pub fn union(a: &Aabb, b: &Aabb) -> Aabb {
        Aabb::new(
            Point3::new(a.min.x.min(b.min.x), a.min.y.min(b.min.y), a.min.z.min(b.min.z)),
            Point3::new(a.max.x.max(b.max.x), a.max.y.max(b.max.y), a.max.z.max(b.max.z)),
        )
    }

    pub fn grow(&mut self, p: Point3) {
        self.min = Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    pub fn diagonal_length(&self) -> f64 {
        self.extent().length()
    }

    /// Slab-method ray/AABB test. Returns `(hit, t_min)` so BVH traversal
    /// can order children by entry distance. `t_max ≥ 0 ∧ t_min ≤ t_max`
    /// is the hit condition (spec §4.2); tangent rays (`t_min == t_max`)
    /// count as a hit.
    pub fn intersects(&self, ray: &Ray, t_min_bound: f64, t_max_bound: f64) -> (bool, f64) {
        let mut t_min = t_min_bound;
        let mut t_max = t_max_bound;
        for axis in 0..3 {
            let inv_d = 1.0 / ray.direction[axis];
            let mut t0 = (self.min[axis] - ray.origin[axis]) * inv_d;
            let mut t1 = (self.max[axis] - ray.origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t0.max(t_min);
            t_max = t1.min(t_max);
            if t_max < t_min {
                return (false, t_min);
            }
        }
        (true, t_min)
    }

    /// Transforms the eight corners of the box by `m` and returns the
    /// bounding box of the result — the general-case path used when a
    /// transform isn't a pure translate/rotate (see `instance.rs`).
    pub fn transformed(&self, transform_point: impl Fn(Point3) -> Point3) -> Aabb {
        let mut out = Aabb::empty();
        for i in 0..8 {
            let p = Point3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            out.grow(transform_point(p));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tangent_ray_reports_hit_with_tmin_eq_tmax() {
        let bbox = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        // Ray grazing the top face y=1, traveling in +x, tangent at y=1.
        let ray = Ray::new(Point3::new(-2.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        let (hit, _) = bbox.intersects(&ray, 0.0, f64::INFINITY);
        assert!(hit);
    }

    #[test]
    fn union_of_empty_and_real_is_real() {
        let real = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let u = Aabb::union(&Aabb::empty(), &real);
        assert!((u.min.x - real.min.x).abs() < 1e-12);
        assert!((u.max.x - real.max.x).abs() < 1e-12);
    }

    #[test]
    fn longest_axis_order_covers_all_three_axes() {
        let bbox = Aabb::new(Point3::zero(), Point3::new(3.0, 2.0, 1.0));
        let order = bbox.longest_axis_order();
        assert_eq!(order, [Axis::X, Axis::Y, Axis::Z]);
    }
}
