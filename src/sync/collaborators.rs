// Interfaces the controller needs from the map engine and the drawing tool.

use crate::domain::{features::format_price, Coordinate, GeometryCollection, RenderableCollection};
use crate::errors::SyncError;
use crate::sync::controller::Message;
use serde_json::{Map, Value};
use std::sync::mpsc::Sender;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(pub u64);

/// A cluster found under a click, with the point the viewport should move to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterHit {
    pub id: ClusterId,
    pub center: Coordinate,
}

/// A single (unclustered) point as the surface reports it on click.
#[derive(Debug, Clone, PartialEq)]
pub struct ClickedFeature {
    pub coordinates: Coordinate,
    pub properties: Map<String, Value>,
}

impl ClickedFeature {
    pub fn title(&self) -> String {
        match self.properties.get("title") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Blank when missing; numbers go through the same formatting as derived features.
    pub fn price(&self) -> String {
        match self.properties.get("price") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => format_price(n.as_f64()),
            _ => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Style and backing source can accept data from now on.
    Loaded,
    ClusterClicked { at: Coordinate },
    PointClicked(ClickedFeature),
}

/// Subscription handed to the surface once, at mount. Events land in the
/// controller's inbox and are handled on the control thread.
#[derive(Debug, Clone)]
pub struct SurfaceEvents {
    tx: Sender<Message>,
}

impl SurfaceEvents {
    pub(crate) fn new(tx: Sender<Message>) -> Self {
        Self { tx }
    }

    /// Returns false once the controller is gone.
    pub fn emit(&self, event: SurfaceEvent) -> bool {
        self.tx.send(Message::Surface(event)).is_ok()
    }
}

pub trait RenderingSurface {
    fn subscribe(&mut self, events: SurfaceEvents);
    fn initialize_source(&mut self, collection: &RenderableCollection);
    fn update_source(&mut self, collection: &RenderableCollection);
    fn query_cluster_at(&self, at: Coordinate) -> Option<ClusterHit>;
    fn cluster_expansion_zoom(&self, cluster: ClusterId) -> Result<f64, SyncError>;
    fn animate_to(&mut self, center: Coordinate, zoom: f64);
    fn show_popup(&mut self, at: Coordinate, html: String);
}

pub trait DrawingTool {
    fn drawn_geometries(&self) -> GeometryCollection;
    fn delete_all(&mut self);
}
