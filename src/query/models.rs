use crate::domain::{Geometry, PropertyRecord};
use crate::errors::SyncError;
use serde::{Deserialize, Serialize};

// GET  /api/properties          -> { items: [...] }
// POST /api/properties/search   -> { items: [...] }
//
// item
//  ├── id        string | integer
//  ├── title     string
//  ├── price     number | null | absent
//  └── location  { type: "Point", coordinates: [lon, lat] }

#[derive(Debug, Deserialize)]
pub struct ItemsResponse {
    pub items: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
pub struct WireRecord {
    pub id: WireId,
    pub title: String,
    #[serde(default)]
    pub price: Option<f64>,
    pub location: Geometry,
}

/// Some backends hand out numeric ids; both forms end up as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchBody {
    pub polygon: Geometry,
}

impl TryFrom<WireRecord> for PropertyRecord {
    type Error = SyncError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let id = String::from(wire.id);
        let location = match wire.location {
            Geometry::Point { coordinates } => coordinates,
            other => {
                return Err(SyncError::Decode(format!(
                    "property {id}: location must be a Point, got {other:?}"
                )))
            }
        };

        Ok(PropertyRecord {
            id,
            title: wire.title,
            price: wire.price,
            location,
        })
    }
}
