use crate::domain::{Coordinate, Geometry, GeometryCollection};
use crate::sync::DrawingTool;
use std::sync::{Arc, Mutex, MutexGuard};

/// Shapes typed in at the prompt. Clones share the same shapes, so the input
/// thread draws while the controller reads.
#[derive(Debug, Clone, Default)]
pub struct ConsoleDrawingTool {
    shapes: Arc<Mutex<GeometryCollection>>,
}

impl ConsoleDrawingTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a polygon, closing the ring the way a drawing tool does on finish.
    pub fn draw_polygon(&self, mut vertices: Vec<Coordinate>) {
        if let (Some(first), Some(last)) = (vertices.first().copied(), vertices.last().copied()) {
            if first != last {
                vertices.push(first);
            }
        }

        self.shapes().push(Geometry::Polygon {
            coordinates: vec![vertices],
        });
    }

    pub fn shape_count(&self) -> usize {
        self.shapes().len()
    }

    fn shapes(&self) -> MutexGuard<'_, GeometryCollection> {
        self.shapes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl DrawingTool for ConsoleDrawingTool {
    fn drawn_geometries(&self) -> GeometryCollection {
        self.shapes().clone()
    }

    fn delete_all(&mut self) {
        self.shapes().clear();
    }
}
