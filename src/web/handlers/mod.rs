pub mod contact_handlers;
pub mod page_handlers;

pub use contact_handlers::*;
pub use page_handlers::*;
