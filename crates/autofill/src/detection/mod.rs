pub mod field_detector;
pub mod label_matcher;

pub use field_detector::*;
pub use label_matcher::*;
