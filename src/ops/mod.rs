pub mod filter;
pub mod preset_ops;
pub mod quantity;
pub mod render;
pub mod resolve;
pub mod sample;
pub mod sort;
