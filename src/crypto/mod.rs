pub mod block;
pub mod kdf;
pub mod padding;
