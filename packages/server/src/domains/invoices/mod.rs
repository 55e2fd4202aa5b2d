pub mod activities;
pub mod credit;
pub mod models;

pub use credit::{CreditEvaluator, CreditStanding, CREDIT_LIMIT};
