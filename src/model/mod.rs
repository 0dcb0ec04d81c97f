pub mod collection;
pub mod config;
pub mod item;
pub mod report;
pub mod sort;

pub use collection::*;
pub use config::*;
pub use item::*;
pub use report::*;
pub use sort::*;
