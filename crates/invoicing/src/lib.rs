//! `ordergate-invoicing` — invoice domain model.

pub mod invoice;

pub use invoice::{Invoice, InvoiceId, InvoiceState};
