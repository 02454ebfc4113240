pub mod config;
pub mod constants;
pub mod geo;
pub mod map;
pub mod mode;
pub mod transform;
