// src/domain/features.rs

use crate::domain::property::{Geometry, PropertyRecord};
use serde::Serialize;

/// GeoJSON `FeatureCollection` handed to the rendering surface.
/// Always a pure function of one dataset; never edited in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct RenderableCollection {
    pub features: Vec<RenderableFeature>,
}

impl RenderableCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct RenderableFeature {
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

/// What a point click needs to build its popup.
/// `price` is already formatted; an absent price is the empty string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureProperties {
    pub id: String,
    pub title: String,
    pub price: String,
}

/// Projects the dataset into renderable point features, in dataset order.
pub fn derive(records: &[PropertyRecord]) -> RenderableCollection {
    let features = records
        .iter()
        .map(|record| RenderableFeature {
            geometry: Geometry::Point {
                coordinates: record.location,
            },
            properties: FeatureProperties {
                id: record.id.clone(),
                title: record.title.clone(),
                price: format_price(record.price),
            },
        })
        .collect();

    RenderableCollection { features }
}

/// Whole-number prices print without a fractional part ("100", not "100.0").
pub fn format_price(price: Option<f64>) -> String {
    match price {
        None => String::new(),
        Some(p) if p.fract() == 0.0 && p.abs() < 1e15 => format!("{}", p as i64),
        Some(p) => p.to_string(),
    }
}
