//! Status filters for the two marker layers.
//!
//! Each filter is a pure per-record predicate; filtering never re-orders,
//! derives, or mutates records. The school partitions are deliberately
//! asymmetric: `Visited` means visited *with* quota, `WithoutQuota` means
//! visited without it, and unvisited schools only ever show under `All`.

use crate::model::{House, School};

/// School marker filter, as encoded in the `schoolFilter` URL parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchoolFilter {
    #[default]
    All,
    Visited,
    WithoutQuota,
}

impl SchoolFilter {
    /// Parse a URL parameter value. Absent or unrecognized input falls back
    /// to [`SchoolFilter::All`]; there is no error case.
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("visited") => Self::Visited,
            Some("withoutQuota") => Self::WithoutQuota,
            _ => Self::All,
        }
    }

    /// The URL parameter value. `None` for [`SchoolFilter::All`], which is
    /// encoded by leaving the parameter out entirely.
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Visited => Some("visited"),
            Self::WithoutQuota => Some("withoutQuota"),
        }
    }

    pub fn matches(self, school: &School) -> bool {
        match self {
            Self::All => true,
            Self::Visited => school.is_visited && school.has_quota,
            Self::WithoutQuota => school.is_visited && !school.has_quota,
        }
    }
}

/// House marker filter, as encoded in the `houseFilter` URL parameter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HouseFilter {
    #[default]
    All,
    Visited,
    NotAvailable,
}

impl HouseFilter {
    pub fn from_param(value: Option<&str>) -> Self {
        match value {
            Some("visited") => Self::Visited,
            Some("notAvailable") => Self::NotAvailable,
            _ => Self::All,
        }
    }

    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Self::All => None,
            Self::Visited => Some("visited"),
            Self::NotAvailable => Some("notAvailable"),
        }
    }

    /// Availability takes precedence: a house both visited and withdrawn
    /// shows only under [`HouseFilter::NotAvailable`].
    pub fn matches(self, house: &House) -> bool {
        match self {
            Self::All => true,
            Self::Visited => house.is_visited && !house.is_not_available,
            Self::NotAvailable => house.is_not_available,
        }
    }
}

/// Schools matching `filter`, in input order.
pub fn filter_schools(schools: Vec<School>, filter: SchoolFilter) -> Vec<School> {
    match filter {
        SchoolFilter::All => schools,
        _ => schools.into_iter().filter(|s| filter.matches(s)).collect(),
    }
}

/// Houses matching `filter`, in input order.
pub fn filter_houses(houses: Vec<House>, filter: HouseFilter) -> Vec<House> {
    match filter {
        HouseFilter::All => houses,
        _ => houses.into_iter().filter(|h| filter.matches(h)).collect(),
    }
}
