pub mod mark_paid;

pub use mark_paid::mark_invoice_paid;
