pub mod product_repository;
pub mod quote_repository;
pub mod service_repository;

pub use product_repository::*;
pub use quote_repository::*;
pub use service_repository::*;
