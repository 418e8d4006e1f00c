pub mod offload;
pub mod scoring;
pub mod summary;
