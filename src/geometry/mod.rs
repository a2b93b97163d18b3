pub mod bbox;
pub mod bvh;
pub mod polygon;
pub mod sphere;
pub mod vertex_buffer;

pub use bbox::{Aabb, Axis};
pub use bvh::{Bvh, Primitive};
pub use polygon::{PolyHit, Polygon};
pub use sphere::{Sphere, SphereHit};
pub use vertex_buffer::VertexBuffer;
