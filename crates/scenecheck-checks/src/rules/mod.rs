//! The built-in rule set

mod frame_range;
mod locator_prefix;
mod locator_shape;
mod prop_suffix;
mod references;
mod sound_offset;
mod uninstance;
mod unique_names;

pub use frame_range::ShotFrameRange;
pub use locator_prefix::LocatorPrefix;
pub use locator_shape::LocatorShapeName;
pub use prop_suffix::PropSuffix;
pub use references::DanglingReferences;
pub use sound_offset::{SoundOffset, OFFSET_ATTR};
pub use uninstance::Uninstance;
pub use unique_names::UniqueNames;

/// Numeric value of an attribute, accepting integers and floats
pub(crate) fn as_number(value: &toml::Value) -> Option<f64> {
    match value {
        toml::Value::Integer(i) => Some(*i as f64),
        toml::Value::Float(f) => Some(*f),
        _ => None,
    }
}
