//! Record types shared by the datasets, the store, and the HTTP API.
//!
//! Wire names are camelCase to match the dataset files and the map client.

use serde::{Deserialize, Deserializer, Serialize};

/// A school on the map.
///
/// Coordinates are optional: some dataset rows ship without them and are
/// filled in later by geocoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub is_visited: bool,
    pub has_quota: bool,
    pub comments: String,
    #[serde(default, deserialize_with = "de_coord", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de_coord", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl School {
    /// Both coordinates, if the record can be placed on the map.
    pub fn coords(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some((lat, lng)),
            _ => None,
        }
    }
}

/// A school as it appears in the seed dataset: no id yet, and any field
/// beyond the name may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolSeed {
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub has_quota: bool,
    #[serde(default)]
    pub comments: String,
    #[serde(default, deserialize_with = "de_coord", skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, deserialize_with = "de_coord", skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl SchoolSeed {
    pub fn has_coords(&self) -> bool {
        self.lat.is_some() && self.lng.is_some()
    }
}

/// A rental house. Unlike schools, houses always carry coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct House {
    pub id: u32,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// Monthly rent.
    pub price: f64,
    pub warranty_months: u32,
    pub require_insurance: bool,
    pub comments: String,
    /// Position of the listing agent in the agents dataset (1-based). May
    /// point at nobody; the map then shows the house without agent details.
    pub agent_id: u32,
    pub is_visited: bool,
    pub is_not_available: bool,
    pub priority: Priority,
}

/// A house row from the houses dataset, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseSeed {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub price: f64,
    pub warranty_months: u32,
    #[serde(default)]
    pub require_insurance: bool,
    #[serde(default)]
    pub comments: String,
    pub agent_id: u32,
    #[serde(default)]
    pub is_visited: bool,
    #[serde(default)]
    pub is_not_available: bool,
    #[serde(default)]
    pub priority: Priority,
}

/// Viewing priority, as written in the dataset (`"HIGH"` / `"LOW"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    High,
    #[default]
    Low,
}

/// A rental agent or agency contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub web: String,
}

/// An agent row from the houses dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSeed {
    pub name: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub web: String,
}

/// Shape of the houses dataset file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HousesFile {
    pub houses: Vec<HouseSeed>,
    #[serde(default)]
    pub agents: Vec<AgentSeed>,
}

/// Partial update for a school. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_quota: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Partial update for a house.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_visited: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_not_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

/// Parse a coordinate that may arrive as text. Non-numeric or non-finite
/// input counts as missing, never as an error.
pub fn parse_coord(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Datasets are inconsistent about coordinates: some rows carry numbers,
/// some carry the same numbers as strings. Accept both, reject the rest.
fn de_coord<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    let parsed = match Option::<Raw>::deserialize(deserializer)? {
        None => None,
        Some(Raw::Num(n)) => Some(n).filter(|v| v.is_finite()),
        Some(Raw::Text(s)) => parse_coord(&s),
    };
    Ok(parsed)
}
