use crate::domain::{DrawnPolygon, PropertyRecord};
use crate::errors::SyncError;
use crate::query::models::{ItemsResponse, SearchBody};
use crate::query::transport::Transport;
use tracing::debug;

const PROPERTIES_PATH: &str = "/api/properties";
const SEARCH_PATH: &str = "/api/properties/search";

/// The two reads the map needs from the backend.
/// Calls are independent and may run concurrently from worker threads.
pub trait PropertyQuery: Send + Sync {
    fn fetch_all(&self) -> Result<Vec<PropertyRecord>, SyncError>;
    fn fetch_within(&self, polygon: &DrawnPolygon) -> Result<Vec<PropertyRecord>, SyncError>;
}

pub struct SpatialQueryClient<T> {
    transport: T,
}

impl<T: Transport> SpatialQueryClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    fn decode_items(body: &str) -> Result<Vec<PropertyRecord>, SyncError> {
        let response: ItemsResponse =
            serde_json::from_str(body).map_err(|e| SyncError::Decode(e.to_string()))?;

        response
            .items
            .into_iter()
            .map(PropertyRecord::try_from)
            .collect()
    }
}

impl<T: Transport> PropertyQuery for SpatialQueryClient<T> {
    fn fetch_all(&self) -> Result<Vec<PropertyRecord>, SyncError> {
        let body = self.transport.get(PROPERTIES_PATH)?;
        let records = Self::decode_items(&body)?;
        debug!(count = records.len(), "fetched all properties");
        Ok(records)
    }

    fn fetch_within(&self, polygon: &DrawnPolygon) -> Result<Vec<PropertyRecord>, SyncError> {
        // Reject bad rings before anything goes over the wire
        polygon.validate()?;

        let body = serde_json::to_value(SearchBody {
            polygon: polygon.to_geometry(),
        })
        .map_err(|e| SyncError::Decode(e.to_string()))?;

        let text = self.transport.post_json(SEARCH_PATH, &body)?;
        let records = Self::decode_items(&text)?;
        debug!(count = records.len(), "fetched properties within polygon");
        Ok(records)
    }
}
