//! Filter state encoded in the URL query string.
//!
//! The query string is the single source of truth for the two filters, so a
//! filtered view survives reload and can be shared as a plain link. The
//! default (`all`) is encoded by *absence*: a canonical query never contains
//! `schoolFilter=all`, and writing the default removes the parameter.
//!
//! Writes always *replace* the current history entry rather than pushing a
//! new one; flipping filters must not grow the back/forward stack. That rule
//! lives in the [`UrlPort`] interface, which has no push operation at all.

use url::form_urlencoded;

use crate::filter::{HouseFilter, SchoolFilter};

/// Query parameter carrying the school filter.
pub const SCHOOL_PARAM: &str = "schoolFilter";
/// Query parameter carrying the house filter.
pub const HOUSE_PARAM: &str = "houseFilter";

/// The pair of independent marker filters a URL encodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterState {
    pub school: SchoolFilter,
    pub house: HouseFilter,
}

impl FilterState {
    pub fn new(school: SchoolFilter, house: HouseFilter) -> Self {
        Self { school, house }
    }

    /// Parse a raw query string (without the leading `?`). Missing or
    /// unrecognized values silently mean `all`; parsing cannot fail.
    /// On duplicated parameters the first occurrence wins.
    pub fn from_query(query: &str) -> Self {
        let mut school = None;
        let mut house = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SCHOOL_PARAM if school.is_none() => {
                    school = Some(SchoolFilter::from_param(Some(value.as_ref())));
                }
                HOUSE_PARAM if house.is_none() => {
                    house = Some(HouseFilter::from_param(Some(value.as_ref())));
                }
                _ => {}
            }
        }
        Self {
            school: school.unwrap_or_default(),
            house: house.unwrap_or_default(),
        }
    }

    /// Rewrite `query` to encode this state: each filter parameter is set in
    /// place if present, removed if the filter is the default, and appended
    /// otherwise. Unrelated parameters survive in their original order
    /// (re-encoded, so `%20` may come back as `+`).
    pub fn apply_to_query(&self, query: &str) -> String {
        let mut out = form_urlencoded::Serializer::new(String::new());
        let mut school_seen = false;
        let mut house_seen = false;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                SCHOOL_PARAM => {
                    if !school_seen && let Some(v) = self.school.as_param() {
                        out.append_pair(SCHOOL_PARAM, v);
                    }
                    school_seen = true;
                }
                HOUSE_PARAM => {
                    if !house_seen && let Some(v) = self.house.as_param() {
                        out.append_pair(HOUSE_PARAM, v);
                    }
                    house_seen = true;
                }
                _ => {
                    out.append_pair(&key, &value);
                }
            }
        }
        if !school_seen && let Some(v) = self.school.as_param() {
            out.append_pair(SCHOOL_PARAM, v);
        }
        if !house_seen && let Some(v) = self.house.as_param() {
            out.append_pair(HOUSE_PARAM, v);
        }
        out.finish()
    }

    /// The canonical minimal query for this state alone. Empty when both
    /// filters are at their defaults.
    pub fn to_query(&self) -> String {
        self.apply_to_query("")
    }
}

/// Where the query string lives.
///
/// The real implementation wraps the host environment's location and history;
/// [`MemoryUrl`] substitutes in tests and headless tools. `replace` is the
/// only write: callers cannot accidentally push history entries.
pub trait UrlPort {
    /// The current query string, without the leading `?`.
    fn read(&self) -> String;
    /// Replace the query string of the current entry in place.
    fn replace(&mut self, query: String);
}

/// Filter state kept in lockstep with a [`UrlPort`].
#[derive(Debug)]
pub struct UrlFilters<P: UrlPort> {
    port: P,
    state: FilterState,
}

impl<P: UrlPort> UrlFilters<P> {
    /// Adopt whatever state the URL currently encodes.
    pub fn new(port: P) -> Self {
        let state = FilterState::from_query(&port.read());
        Self { port, state }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn school(&self) -> SchoolFilter {
        self.state.school
    }

    pub fn house(&self) -> HouseFilter {
        self.state.house
    }

    /// Change the school filter. The house parameter is left untouched.
    pub fn set_school(&mut self, filter: SchoolFilter) {
        self.state.school = filter;
        self.write();
    }

    /// Change the house filter. The school parameter is left untouched.
    pub fn set_house(&mut self, filter: HouseFilter) {
        self.state.house = filter;
        self.write();
    }

    /// Re-read the URL after it changed by other means (back/forward
    /// navigation). The URL wins; in-memory state is discarded.
    pub fn resync(&mut self) {
        self.state = FilterState::from_query(&self.port.read());
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    fn write(&mut self) {
        let query = self.state.apply_to_query(&self.port.read());
        self.port.replace(query);
    }
}

/// An in-memory query string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryUrl {
    query: String,
}

impl MemoryUrl {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into() }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Simulate the query string changing from outside, as a history
    /// navigation would.
    pub fn navigate(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }
}

impl UrlPort for MemoryUrl {
    fn read(&self) -> String {
        self.query.clone()
    }

    fn replace(&mut self, query: String) {
        self.query = query;
    }
}
