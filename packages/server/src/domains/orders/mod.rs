pub mod activities;
pub mod data;
pub mod errors;
pub mod models;

pub use errors::OrderError;
