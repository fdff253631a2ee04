// Terminal stand-in for the map engine: grid clustering, a viewport, printed popups.

use crate::domain::{Coordinate, Geometry, RenderableCollection, RenderableFeature};
use crate::errors::SyncError;
use crate::sync::{
    ClickedFeature, ClusterHit, ClusterId, RenderingSurface, SurfaceEvent, SurfaceEvents,
};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard};

pub const MAX_ZOOM: f64 = 20.0;

// Grid cells across the world at zoom 0. Each zoom level halves the cell size.
const CELLS_AT_ZOOM_0: f64 = 8.0;

type Cell = (i64, i64);

#[derive(Debug)]
struct SurfaceModel {
    features: Vec<RenderableFeature>,
    center: Coordinate,
    zoom: f64,
    events: Option<SurfaceEvents>,
    source_initialized: bool,
}

/// Owned by the controller. Shares its model with [`SurfacePointer`].
#[derive(Debug)]
pub struct ConsoleSurface {
    model: Arc<Mutex<SurfaceModel>>,
}

/// The user's side of the surface: clicks, zoom, readiness.
#[derive(Debug, Clone)]
pub struct SurfacePointer {
    model: Arc<Mutex<SurfaceModel>>,
}

fn lock(model: &Mutex<SurfaceModel>) -> MutexGuard<'_, SurfaceModel> {
    model.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn cell_size(zoom: f64) -> f64 {
    360.0 / (CELLS_AT_ZOOM_0 * 2f64.powf(zoom.floor()))
}

fn cell_of(c: Coordinate, zoom: f64) -> Cell {
    let size = cell_size(zoom);
    ((c.lon / size).floor() as i64, (c.lat / size).floor() as i64)
}

fn cluster_id(zoom: f64, cell: Cell) -> ClusterId {
    let mut hasher = DefaultHasher::new();
    (zoom.floor() as i64, cell).hash(&mut hasher);
    ClusterId(hasher.finish())
}

fn point_of(feature: &RenderableFeature) -> Option<Coordinate> {
    match feature.geometry {
        Geometry::Point { coordinates } => Some(coordinates),
        _ => None,
    }
}

fn centroid(points: &[Coordinate]) -> Coordinate {
    let n = points.len().max(1) as f64;
    let (lon, lat) = points
        .iter()
        .fold((0.0, 0.0), |(lon, lat), c| (lon + c.lon, lat + c.lat));
    Coordinate::new(lon / n, lat / n)
}

impl SurfaceModel {
    fn cells(&self) -> HashMap<Cell, Vec<&RenderableFeature>> {
        let mut cells: HashMap<Cell, Vec<&RenderableFeature>> = HashMap::new();
        for feature in &self.features {
            if let Some(point) = point_of(feature) {
                cells.entry(cell_of(point, self.zoom)).or_default().push(feature);
            }
        }
        cells
    }

    fn cluster_at(&self, at: Coordinate) -> Option<ClusterHit> {
        let cell = cell_of(at, self.zoom);
        let members = self.cells().remove(&cell)?;
        if members.len() < 2 {
            return None;
        }

        let points: Vec<Coordinate> = members.iter().filter_map(|f| point_of(f)).collect();
        Some(ClusterHit {
            id: cluster_id(self.zoom, cell),
            center: centroid(&points),
        })
    }

    fn expansion_zoom(&self, id: ClusterId) -> Result<f64, SyncError> {
        let members: Vec<Coordinate> = self
            .cells()
            .into_iter()
            .find(|(cell, members)| members.len() > 1 && cluster_id(self.zoom, *cell) == id)
            .map(|(_, members)| members.iter().filter_map(|f| point_of(f)).collect())
            .ok_or_else(|| SyncError::ClusterLookup(format!("unknown cluster {}", id.0)))?;

        let mut zoom = self.zoom.floor() + 1.0;
        while zoom < MAX_ZOOM {
            let first = cell_of(members[0], zoom);
            if members.iter().any(|m| cell_of(*m, zoom) != first) {
                return Ok(zoom);
            }
            zoom += 1.0;
        }
        Ok(MAX_ZOOM)
    }

    fn summary(&self) -> String {
        let cells = self.cells();
        let clusters = cells.values().filter(|m| m.len() > 1).count();
        let singles = cells.values().filter(|m| m.len() == 1).count();
        format!(
            "{} points ({} clusters, {} single) at zoom {}",
            self.features.len(),
            clusters,
            singles,
            self.zoom
        )
    }
}

impl ConsoleSurface {
    pub fn new(center: Coordinate, zoom: f64) -> Self {
        Self {
            model: Arc::new(Mutex::new(SurfaceModel {
                features: Vec::new(),
                center,
                zoom: zoom.clamp(0.0, MAX_ZOOM),
                events: None,
                source_initialized: false,
            })),
        }
    }

    pub fn pointer(&self) -> SurfacePointer {
        SurfacePointer {
            model: self.model.clone(),
        }
    }

    pub fn viewport(&self) -> (Coordinate, f64) {
        let model = lock(&self.model);
        (model.center, model.zoom)
    }

    pub fn point_count(&self) -> usize {
        lock(&self.model).features.len()
    }
}

impl RenderingSurface for ConsoleSurface {
    fn subscribe(&mut self, events: SurfaceEvents) {
        lock(&self.model).events = Some(events);
    }

    fn initialize_source(&mut self, collection: &RenderableCollection) {
        let mut model = lock(&self.model);
        model.features = collection.features.clone();
        model.source_initialized = true;
        println!("🗺️  Source initialized: {}", model.summary());
    }

    fn update_source(&mut self, collection: &RenderableCollection) {
        let mut model = lock(&self.model);
        model.features = collection.features.clone();
        println!("🔄 Source updated: {}", model.summary());
    }

    fn query_cluster_at(&self, at: Coordinate) -> Option<ClusterHit> {
        lock(&self.model).cluster_at(at)
    }

    fn cluster_expansion_zoom(&self, cluster: ClusterId) -> Result<f64, SyncError> {
        lock(&self.model).expansion_zoom(cluster)
    }

    fn animate_to(&mut self, center: Coordinate, zoom: f64) {
        let mut model = lock(&self.model);
        model.center = center;
        model.zoom = zoom.clamp(0.0, MAX_ZOOM);
        println!(
            "🧭 Viewport -> ({:.5}, {:.5}) zoom {}",
            center.lon, center.lat, model.zoom
        );
    }

    fn show_popup(&mut self, at: Coordinate, html: String) {
        println!("💬 Popup at ({:.5}, {:.5}): {html}", at.lon, at.lat);
    }
}

impl SurfacePointer {
    /// Style and source are ready; tell the controller.
    pub fn mark_loaded(&self) -> bool {
        self.emit(SurfaceEvent::Loaded)
    }

    /// Hit-tests a click. Clusters win over single points; empty cells do nothing.
    pub fn click(&self, at: Coordinate) -> bool {
        let event = {
            let model = lock(&self.model);
            if model.cluster_at(at).is_some() {
                Some(SurfaceEvent::ClusterClicked { at })
            } else {
                let cell = cell_of(at, model.zoom);
                model
                    .features
                    .iter()
                    .find(|f| point_of(f).map(|p| cell_of(p, model.zoom)) == Some(cell))
                    .and_then(|f| {
                        let coordinates = point_of(f)?;
                        let properties = serde_json::to_value(&f.properties)
                            .ok()?
                            .as_object()
                            .cloned()?;
                        Some(SurfaceEvent::PointClicked(ClickedFeature {
                            coordinates,
                            properties,
                        }))
                    })
            }
        };

        match event {
            Some(event) => self.emit(event),
            None => {
                println!("Nothing at ({:.5}, {:.5})", at.lon, at.lat);
                false
            }
        }
    }

    pub fn set_zoom(&self, zoom: f64) {
        let mut model = lock(&self.model);
        model.zoom = zoom.clamp(0.0, MAX_ZOOM);
        println!("🔍 Zoom {}: {}", model.zoom, model.summary());
    }

    pub fn describe(&self) -> String {
        let model = lock(&self.model);
        if !model.source_initialized {
            return "Map source not initialized yet".to_string();
        }

        let mut lines = vec![model.summary()];
        for feature in &model.features {
            if let Some(p) = point_of(feature) {
                lines.push(format!(
                    "  {} {} [{}] at ({:.5}, {:.5})",
                    feature.properties.id, feature.properties.title, feature.properties.price, p.lon, p.lat
                ));
            }
        }
        lines.join("\n")
    }

    fn emit(&self, event: SurfaceEvent) -> bool {
        match &lock(&self.model).events {
            Some(events) => events.emit(event),
            None => false,
        }
    }
}
