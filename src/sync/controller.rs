// Keeps the dataset, the rendering surface, and the drawn query shape in step.

use crate::domain::{Coordinate, DrawnPolygon, PropertyRecord, RenderableCollection};
use crate::errors::SyncError;
use crate::query::PropertyQuery;
use crate::store::DatasetStore;
use crate::sync::collaborators::{
    ClickedFeature, DrawingTool, RenderingSurface, SurfaceEvent, SurfaceEvents,
};
use crate::templates::property_popup;
use clap::ValueEnum;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use tracing::{debug, error, info, warn};

/// How completions that race each other are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StalePolicy {
    /// Each fetch carries a generation; a completion older than the newest
    /// one already applied is dropped.
    #[default]
    LatestIssued,
    /// Whatever finishes last is what the map shows.
    LastCompleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Initializing,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Initial,
    Search,
    Clear,
}

#[derive(Debug)]
pub struct Completion {
    pub generation: u64,
    pub origin: FetchOrigin,
    pub result: Result<Vec<PropertyRecord>, SyncError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Search,
    Clear,
    Status,
    Shutdown,
}

/// Everything that can wake the control thread.
#[derive(Debug)]
pub enum Message {
    Fetched(Completion),
    Surface(SurfaceEvent),
    User(UserAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Where the surface's backing source stands. Until `Loaded` arrives the latest
/// collection waits in `deferred`; only the newest one matters because each is a
/// pure function of the dataset at the time.
#[derive(Debug)]
enum SurfaceState {
    Pending {
        deferred: Option<Arc<RenderableCollection>>,
    },
    Ready {
        source_initialized: bool,
    },
}

/// Cloneable way for other threads (stdin reader, UI) to post user actions.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: Sender<Message>,
}

impl ControllerHandle {
    pub fn request_search(&self) -> bool {
        self.tx.send(Message::User(UserAction::Search)).is_ok()
    }

    pub fn request_clear(&self) -> bool {
        self.tx.send(Message::User(UserAction::Clear)).is_ok()
    }

    pub fn request_status(&self) -> bool {
        self.tx.send(Message::User(UserAction::Status)).is_ok()
    }

    pub fn shutdown(&self) -> bool {
        self.tx.send(Message::User(UserAction::Shutdown)).is_ok()
    }
}

/// Owns the dataset and, for its whole lifetime, the rendering surface and
/// drawing tool. All mutation happens on the thread that drives the inbox.
pub struct MapSyncController<S, D> {
    store: DatasetStore,
    query: Arc<dyn PropertyQuery>,
    surface: S,
    drawing: D,
    policy: StalePolicy,
    lifecycle: Lifecycle,
    surface_state: SurfaceState,
    next_generation: u64,
    highest_applied: u64,
    in_flight: usize,
    tx: Sender<Message>,
    rx: Receiver<Message>,
}

impl<S: RenderingSurface, D: DrawingTool> MapSyncController<S, D> {
    /// Takes ownership of the collaborators, subscribes to surface events and
    /// starts the initial unfiltered fetch.
    pub fn mount(
        query: Arc<dyn PropertyQuery>,
        mut surface: S,
        drawing: D,
        policy: StalePolicy,
    ) -> Self {
        let (tx, rx) = mpsc::channel();
        surface.subscribe(SurfaceEvents::new(tx.clone()));

        let mut controller = Self {
            store: DatasetStore::new(),
            query,
            surface,
            drawing,
            policy,
            lifecycle: Lifecycle::Initializing,
            surface_state: SurfaceState::Pending { deferred: None },
            next_generation: 0,
            highest_applied: 0,
            in_flight: 0,
            tx,
            rx,
        };

        info!(?policy, "mounting map sync controller");
        controller.issue(FetchOrigin::Initial, |query| query.fetch_all());
        controller
    }

    /// Releases the surface and drawing tool back to the caller.
    pub fn teardown(self) -> (S, D) {
        info!(in_flight = self.in_flight, "tearing down map sync controller");
        (self.surface, self.drawing)
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn dataset(&self) -> Arc<[PropertyRecord]> {
        self.store.current()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Reads the drawn shape and queries within it. Returns the generation of the
    /// issued fetch, or `None` when there was nothing usable to search with.
    pub fn on_search_requested(&mut self) -> Option<u64> {
        let geometries = self.drawing.drawn_geometries();
        let polygon = match DrawnPolygon::from_geometries(&geometries) {
            Ok(polygon) => polygon,
            Err(e) => {
                debug!(reason = %e, "search ignored");
                return None;
            }
        };

        if let Err(e) = polygon.validate() {
            warn!(error = %e, "search ignored, drawn polygon is not usable");
            return None;
        }

        Some(self.issue(FetchOrigin::Search, move |query| {
            query.fetch_within(&polygon)
        }))
    }

    /// Drops whatever is drawn and goes back to the unfiltered dataset.
    pub fn on_clear_requested(&mut self) -> u64 {
        self.drawing.delete_all();
        self.issue(FetchOrigin::Clear, |query| query.fetch_all())
    }

    pub fn on_cluster_clicked(&mut self, at: Coordinate) {
        let Some(hit) = self.surface.query_cluster_at(at) else {
            debug!(lon = at.lon, lat = at.lat, "no cluster under click");
            return;
        };

        match self.surface.cluster_expansion_zoom(hit.id) {
            Ok(zoom) => self.surface.animate_to(hit.center, zoom),
            Err(e) => debug!(cluster = hit.id.0, error = %e, "cluster click ignored"),
        }
    }

    pub fn on_point_clicked(&mut self, feature: ClickedFeature) {
        let html = property_popup(&feature.title(), &feature.price()).into_string();
        self.surface.show_popup(feature.coordinates, html);
    }

    /// Drives the controller until a shutdown action arrives.
    pub fn run(&mut self) {
        // The controller holds a sender itself, so recv only errs if it is dropped.
        while let Ok(message) = self.rx.recv() {
            if self.dispatch(message) == Flow::Stop {
                break;
            }
        }
        info!("map sync controller stopped");
    }

    fn dispatch(&mut self, message: Message) -> Flow {
        match message {
            Message::Fetched(completion) => self.apply_completion(completion),
            Message::Surface(SurfaceEvent::Loaded) => self.on_surface_loaded(),
            Message::Surface(SurfaceEvent::ClusterClicked { at }) => self.on_cluster_clicked(at),
            Message::Surface(SurfaceEvent::PointClicked(feature)) => {
                self.on_point_clicked(feature)
            }
            Message::User(UserAction::Search) => {
                self.on_search_requested();
            }
            Message::User(UserAction::Clear) => {
                self.on_clear_requested();
            }
            Message::User(UserAction::Status) => self.report_status(),
            Message::User(UserAction::Shutdown) => return Flow::Stop,
        }
        Flow::Continue
    }

    fn report_status(&self) {
        let dataset = self.dataset();
        let with_price = dataset.iter().filter(|r| r.price.is_some()).count();
        println!(
            "📊 {:?}{}: {} properties ({} priced), newest applied fetch #{}",
            self.lifecycle(),
            if self.is_loading() { ", loading" } else { "" },
            dataset.len(),
            with_price,
            self.highest_applied
        );
    }

    fn issue<F>(&mut self, origin: FetchOrigin, fetch: F) -> u64
    where
        F: FnOnce(&dyn PropertyQuery) -> Result<Vec<PropertyRecord>, SyncError> + Send + 'static,
    {
        self.next_generation += 1;
        self.in_flight += 1;

        let generation = self.next_generation;
        let query = Arc::clone(&self.query);
        let tx = self.tx.clone();

        thread::spawn(move || {
            let result = fetch(query.as_ref());
            // The controller may already be torn down; nothing to do then.
            let _ = tx.send(Message::Fetched(Completion {
                generation,
                origin,
                result,
            }));
        });

        debug!(generation, ?origin, "fetch issued");
        generation
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Completion {
            generation,
            origin,
            result,
        } = completion;
        self.in_flight = self.in_flight.saturating_sub(1);

        match result {
            Ok(records) => {
                if self.policy == StalePolicy::LatestIssued && generation < self.highest_applied {
                    debug!(
                        generation,
                        applied = self.highest_applied,
                        ?origin,
                        "stale fetch discarded"
                    );
                } else {
                    info!(generation, ?origin, count = records.len(), "dataset replaced");
                    self.highest_applied = self.highest_applied.max(generation);
                    self.store.replace(records);
                    self.publish(self.store.derive());
                }
            }
            Err(SyncError::Geometry(e)) => {
                warn!(generation, ?origin, error = %e, "polygon rejected");
            }
            Err(e) => {
                error!(generation, ?origin, error = %e, "fetch failed, keeping last good dataset");
                if origin == FetchOrigin::Initial {
                    // Degraded start: the surface still gets a (empty) source
                    self.publish(self.store.derive());
                }
            }
        }

        if origin == FetchOrigin::Initial && self.lifecycle == Lifecycle::Initializing {
            self.lifecycle = Lifecycle::Ready;
            info!(count = self.store.len(), "map sync controller ready");
        }
    }

    fn on_surface_loaded(&mut self) {
        let deferred = match &mut self.surface_state {
            SurfaceState::Pending { deferred } => deferred.take(),
            SurfaceState::Ready { .. } => {
                debug!("surface reported loaded twice");
                return;
            }
        };

        self.surface_state = SurfaceState::Ready {
            source_initialized: false,
        };
        debug!(deferred = deferred.is_some(), "surface ready");

        if let Some(collection) = deferred {
            self.publish(collection);
        }
    }

    fn publish(&mut self, collection: Arc<RenderableCollection>) {
        match &mut self.surface_state {
            SurfaceState::Pending { deferred } => {
                debug!(count = collection.len(), "surface not ready, deferring update");
                *deferred = Some(collection);
            }
            SurfaceState::Ready { source_initialized } => {
                if *source_initialized {
                    self.surface.update_source(&collection);
                } else {
                    *source_initialized = true;
                    self.surface.initialize_source(&collection);
                }
            }
        }
    }
}

// Drivers for stepping the inbox by hand.
#[cfg(test)]
impl<S: RenderingSurface, D: DrawingTool> MapSyncController<S, D> {
    pub fn derived(&self) -> Arc<RenderableCollection> {
        self.store.derive()
    }

    /// Handles everything already waiting in the inbox without blocking.
    pub fn pump(&mut self) -> Flow {
        while let Ok(message) = self.rx.try_recv() {
            if self.dispatch(message) == Flow::Stop {
                return Flow::Stop;
            }
        }
        Flow::Continue
    }

    /// Blocks for at most `timeout` for one message. `None` when nothing came.
    pub fn wait_next(&mut self, timeout: std::time::Duration) -> Option<Flow> {
        match self.rx.recv_timeout(timeout) {
            Ok(message) => Some(self.dispatch(message)),
            Err(_) => None,
        }
    }

    /// Processes messages until every outstanding fetch has completed.
    /// Returns false if `timeout` ran out first.
    pub fn settle(&mut self, timeout: std::time::Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        self.pump();

        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(std::time::Instant::now());
            if remaining.is_zero() || self.wait_next(remaining).is_none() {
                return false;
            }
        }
        true
    }
}
