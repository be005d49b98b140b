pub mod cart_service;
pub mod confirmation;
pub mod form_service;
pub mod payment_service;
pub mod quote_service;
pub mod selection_service;

pub use cart_service::*;
pub use confirmation::*;
pub use form_service::*;
pub use payment_service::*;
pub use quote_service::*;
pub use selection_service::*;
