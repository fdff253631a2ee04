pub mod features;
pub mod property;

pub use features::{derive, RenderableCollection, RenderableFeature};
pub use property::{Coordinate, DrawnPolygon, Geometry, GeometryCollection, PropertyRecord};
