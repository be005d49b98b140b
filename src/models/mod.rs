pub mod catalog;
pub mod form;
pub mod line_item;
pub mod view;

pub use catalog::*;
pub use form::*;
pub use line_item::*;
pub use view::*;
