pub mod errors;
pub mod math;
pub mod serde_utils;
pub mod time;
