//! Value types shared by the stipple crates.

pub mod color;

pub use color::{Color, ColorParseError};
