pub mod repositories;
pub mod store;

pub use store::*;
