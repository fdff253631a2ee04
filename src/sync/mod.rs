pub mod collaborators;
pub mod controller;

pub use collaborators::{
    ClickedFeature, ClusterHit, ClusterId, DrawingTool, RenderingSurface, SurfaceEvent,
    SurfaceEvents,
};
pub use controller::{ControllerHandle, MapSyncController, StalePolicy};
