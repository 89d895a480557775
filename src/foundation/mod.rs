pub mod archive;
pub mod core;
pub mod error;
pub mod math;
