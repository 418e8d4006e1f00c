pub mod derived;
pub mod payload;
pub mod response;
