pub mod adapter;
pub mod config;
pub mod data_type;
pub mod params;
pub mod utils;
