pub mod catalog;
pub mod plan;
pub mod seed;

pub use catalog::*;
pub use plan::*;
pub use seed::*;
