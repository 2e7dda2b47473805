//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod region_code;
mod station_id;

pub use geo_location::GeoLocation;
pub use region_code::RegionCode;
pub use station_id::StationId;
