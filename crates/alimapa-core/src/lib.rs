pub mod filter;
pub mod model;
pub mod urlstate;

pub use filter::{HouseFilter, SchoolFilter, filter_houses, filter_schools};
pub use model::{Agent, House, HousePatch, Priority, School, SchoolPatch, parse_coord};
pub use urlstate::{FilterState, MemoryUrl, UrlFilters, UrlPort};
