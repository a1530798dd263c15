//! `ordergate-sales` — sales order domain model.

pub mod order;

pub use order::{
    InvoicePolicy, InvoiceStatus, LineDraft, Order, OrderId, OrderLine, OrderState,
};
