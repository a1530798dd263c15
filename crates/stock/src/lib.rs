//! `ordergate-stock` — delivery (picking) domain model.
//!
//! A picking is the delivery unit materialized when an order is confirmed;
//! a return picking is the reverse delivery created when part of a delivery
//! must be given back.

pub mod picking;
pub mod returns;

pub use picking::{Move, MoveId, MoveLine, MoveLineId, Picking, PickingId, PickingState};
pub use returns::{ReturnMove, ReturnPicking, ReturnPickingId, ReturnState};
