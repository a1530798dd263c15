//! `ordergate-fulfillment` — the order fulfillment flow.
//!
//! [`FulfillmentService`] drives a validated order request through
//! create → confirm → deliver → (return) → invoice against the three store
//! boundaries defined in [`stores`]. Each step mutates real state; nothing is
//! retried or rolled back — a failed call leaves the order (and whatever
//! pickings already advanced) persisted and only the response reports the
//! failure.

pub mod orchestrator;
pub mod request;
pub mod stores;

pub use orchestrator::{FulfillmentOutcome, FulfillmentService};
pub use request::{OrderRequest, RequestLine};
pub use stores::{InvoicingStore, OrderPage, OrderPatch, OrderStore, StockStore};
