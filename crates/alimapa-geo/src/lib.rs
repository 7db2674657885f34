//! Geocoding layer: fills in missing school coordinates from a
//! Nominatim-compatible service.

mod client;

pub use client::{CITY_CENTER, FillSummary, GeoError, GeocodeClient, clean_address};
