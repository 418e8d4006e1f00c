pub mod scorer;
pub mod sink;
