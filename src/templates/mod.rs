pub mod popup;

pub use popup::property_popup;
