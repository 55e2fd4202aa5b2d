pub mod confirm_order;
pub mod place_order;
pub mod update_status;

pub use confirm_order::confirm_order;
pub use place_order::{validate, OrderOrchestrator};
pub use update_status::update_order_status;
