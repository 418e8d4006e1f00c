pub mod assembler;
pub mod chunker;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod retry;
pub mod scorer;
pub mod writer;
