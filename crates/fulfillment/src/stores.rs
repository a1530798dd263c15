//! Store boundaries consumed by the orchestrator.
//!
//! Framework-free traits; each call is assumed to be individually atomic.
//! No storage technology is implied — `ordergate-infra` ships an in-memory
//! backend, production deployments bind these to whatever actually persists
//! orders, pickings and invoices.

use std::sync::Arc;

use ordergate_core::{DomainResult, PartnerId};
use ordergate_invoicing::{Invoice, InvoiceId};
use ordergate_sales::{InvoicePolicy, LineDraft, Order, OrderId};
use ordergate_stock::{MoveId, MoveLineId, Picking, PickingId, ReturnPicking, ReturnPickingId};

/// One page of orders plus the total count across all pages.
#[derive(Debug, Clone)]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub total: u64,
}

/// Changes applied by the naive update operation: optional partner swap plus
/// appended lines.
#[derive(Debug, Clone, Default)]
pub struct OrderPatch {
    pub partner_id: Option<PartnerId>,
    pub extra_lines: Vec<LineDraft>,
}

/// Persists orders and their owned lines.
pub trait OrderStore: Send + Sync {
    /// New order in draft.
    fn create(
        &self,
        partner_id: PartnerId,
        lines: Vec<LineDraft>,
        invoice_policy: InvoicePolicy,
    ) -> DomainResult<Order>;

    fn get(&self, id: OrderId) -> DomainResult<Order>;

    /// `page` is 1-based.
    fn list(&self, page: u32, per_page: u32) -> DomainResult<OrderPage>;

    fn update(&self, id: OrderId, patch: OrderPatch) -> DomainResult<Order>;

    fn delete(&self, id: OrderId) -> DomainResult<()>;

    /// draft|sent → sale. Materializes the order's pickings as a side effect.
    fn confirm(&self, id: OrderId) -> DomainResult<Order>;
}

/// Persists pickings and return pickings and owns their lifecycle.
pub trait StockStore: Send + Sync {
    /// The order's pickings, in stable store order.
    fn pickings_for(&self, order_id: OrderId) -> DomainResult<Vec<Picking>>;

    fn confirm_picking(&self, id: PickingId) -> DomainResult<Picking>;

    /// Reserve stock for the whole picking. Insufficient availability is a
    /// `StateConflict`, not a silent partial state.
    fn assign_picking(&self, id: PickingId) -> DomainResult<Picking>;

    /// Record the quantity actually moved on one move line.
    fn record_done(
        &self,
        picking_id: PickingId,
        move_id: MoveId,
        line_id: MoveLineId,
        qty: u64,
    ) -> DomainResult<()>;

    /// Complete the delivery: assigned → done.
    fn validate_picking(&self, id: PickingId) -> DomainResult<Picking>;

    /// New return picking seeded from a completed picking.
    fn create_return(&self, picking_id: PickingId) -> DomainResult<ReturnPicking>;

    fn set_return_quantity(
        &self,
        return_id: ReturnPickingId,
        origin_move: MoveId,
        qty: u64,
    ) -> DomainResult<()>;

    fn confirm_return(&self, return_id: ReturnPickingId) -> DomainResult<ReturnPicking>;
}

/// Derives and posts invoices.
pub trait InvoicingStore: Send + Sync {
    /// Draft invoice from an eligible order.
    fn create_invoice(&self, order_id: OrderId) -> DomainResult<Invoice>;

    fn post_invoice(&self, id: InvoiceId) -> DomainResult<Invoice>;
}

impl<S> OrderStore for Arc<S>
where
    S: OrderStore + ?Sized,
{
    fn create(
        &self,
        partner_id: PartnerId,
        lines: Vec<LineDraft>,
        invoice_policy: InvoicePolicy,
    ) -> DomainResult<Order> {
        (**self).create(partner_id, lines, invoice_policy)
    }

    fn get(&self, id: OrderId) -> DomainResult<Order> {
        (**self).get(id)
    }

    fn list(&self, page: u32, per_page: u32) -> DomainResult<OrderPage> {
        (**self).list(page, per_page)
    }

    fn update(&self, id: OrderId, patch: OrderPatch) -> DomainResult<Order> {
        (**self).update(id, patch)
    }

    fn delete(&self, id: OrderId) -> DomainResult<()> {
        (**self).delete(id)
    }

    fn confirm(&self, id: OrderId) -> DomainResult<Order> {
        (**self).confirm(id)
    }
}

impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    fn pickings_for(&self, order_id: OrderId) -> DomainResult<Vec<Picking>> {
        (**self).pickings_for(order_id)
    }

    fn confirm_picking(&self, id: PickingId) -> DomainResult<Picking> {
        (**self).confirm_picking(id)
    }

    fn assign_picking(&self, id: PickingId) -> DomainResult<Picking> {
        (**self).assign_picking(id)
    }

    fn record_done(
        &self,
        picking_id: PickingId,
        move_id: MoveId,
        line_id: MoveLineId,
        qty: u64,
    ) -> DomainResult<()> {
        (**self).record_done(picking_id, move_id, line_id, qty)
    }

    fn validate_picking(&self, id: PickingId) -> DomainResult<Picking> {
        (**self).validate_picking(id)
    }

    fn create_return(&self, picking_id: PickingId) -> DomainResult<ReturnPicking> {
        (**self).create_return(picking_id)
    }

    fn set_return_quantity(
        &self,
        return_id: ReturnPickingId,
        origin_move: MoveId,
        qty: u64,
    ) -> DomainResult<()> {
        (**self).set_return_quantity(return_id, origin_move, qty)
    }

    fn confirm_return(&self, return_id: ReturnPickingId) -> DomainResult<ReturnPicking> {
        (**self).confirm_return(return_id)
    }
}

impl<S> InvoicingStore for Arc<S>
where
    S: InvoicingStore + ?Sized,
{
    fn create_invoice(&self, order_id: OrderId) -> DomainResult<Invoice> {
        (**self).create_invoice(order_id)
    }

    fn post_invoice(&self, id: InvoiceId) -> DomainResult<Invoice> {
        (**self).post_invoice(id)
    }
}
