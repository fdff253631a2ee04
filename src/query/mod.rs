mod client;
mod models;
mod transport;

pub use client::{PropertyQuery, SpatialQueryClient};
pub use transport::HttpTransport;
