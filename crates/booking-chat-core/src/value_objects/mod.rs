//! Value objects - immutable types that represent domain concepts

mod geo_point;
mod media_path;
mod snowflake;

pub use geo_point::GeoPoint;
pub use media_path::{is_valid_media_path, MediaPath, MAX_FILENAME_LEN, MEDIA_NAMESPACE};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
