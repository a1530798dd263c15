//! The fulfillment flow: create → confirm → deliver → (return) → invoice.

use ordergate_core::{DomainError, DomainResult};
use ordergate_invoicing::InvoiceId;
use ordergate_sales::{InvoiceStatus, Order, OrderId};
use ordergate_stock::{MoveId, Picking, PickingId, PickingState, ReturnPickingId};

use crate::request::OrderRequest;
use crate::stores::{InvoicingStore, OrderStore, StockStore};

/// Consolidated result of one successful fulfillment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FulfillmentOutcome {
    pub order_id: OrderId,
    /// None when the order's invoice status is `no`.
    pub invoice_id: Option<InvoiceId>,
    /// The order's delivery pickings, in store order.
    pub picking_ids: Vec<PickingId>,
    /// Return pickings created by this call, in creation order.
    pub return_picking_ids: Vec<ReturnPickingId>,
}

/// Sequential driver over the three store boundaries.
///
/// Strictly synchronous: one store call at a time, no retries, no
/// compensation. State written by completed steps survives a later failure;
/// only the returned result is all-or-nothing.
pub struct FulfillmentService<O, S, I> {
    orders: O,
    stock: S,
    invoicing: I,
}

impl<O, S, I> FulfillmentService<O, S, I>
where
    O: OrderStore,
    S: StockStore,
    I: InvoicingStore,
{
    pub fn new(orders: O, stock: S, invoicing: I) -> Self {
        Self {
            orders,
            stock,
            invoicing,
        }
    }

    /// Create and confirm an order without driving its deliveries.
    pub fn create_order(&self, request: &OrderRequest) -> DomainResult<Order> {
        request.validate()?;

        let order = self.orders.create(
            request.partner_id,
            request.line_drafts(),
            request.invoice_policy,
        )?;
        let order = self.orders.confirm(order.id_typed())?;
        tracing::info!(order = %order.name(), "order created and confirmed");
        Ok(order)
    }

    /// Run the full flow and return the consolidated outcome.
    pub fn fulfill(&self, request: &OrderRequest) -> DomainResult<FulfillmentOutcome> {
        request.validate()?;

        let order = self.orders.create(
            request.partner_id,
            request.line_drafts(),
            request.invoice_policy,
        )?;
        let order_id = order.id_typed();
        let order = self.orders.confirm(order_id)?;

        let pickings = self.stock.pickings_for(order_id)?;
        tracing::info!(
            order = %order.name(),
            pickings = pickings.len(),
            "order confirmed, driving deliveries"
        );

        let mut return_picking_ids = Vec::new();
        for picking in pickings {
            self.drive_picking(request, picking, &mut return_picking_ids)?;
        }

        // Re-read: the gate must see the states the store reports now, not
        // what this call believes it achieved.
        let pickings = self.stock.pickings_for(order_id)?;
        let all_done = pickings.iter().all(Picking::is_done);
        let picking_ids: Vec<PickingId> = pickings.iter().map(Picking::id_typed).collect();

        let order = self.orders.get(order_id)?;
        let invoice_id = if order.invoice_status() != InvoiceStatus::No {
            if !all_done {
                return Err(DomainError::InvoiceGate);
            }
            let invoice = self.invoicing.create_invoice(order_id)?;
            let invoice = self.invoicing.post_invoice(invoice.id_typed())?;
            tracing::info!(order = %order.name(), invoice = %invoice.id_typed(), "invoice posted");
            Some(invoice.id_typed())
        } else {
            None
        };

        Ok(FulfillmentOutcome {
            order_id,
            invoice_id,
            picking_ids,
            return_picking_ids,
        })
    }

    /// Advance one picking toward `done`, creating a return picking when the
    /// request flags any of its products for return.
    fn drive_picking(
        &self,
        request: &OrderRequest,
        mut picking: Picking,
        return_picking_ids: &mut Vec<ReturnPickingId>,
    ) -> DomainResult<()> {
        if picking.state() == PickingState::Draft {
            picking = self.stock.confirm_picking(picking.id_typed())?;
        }

        if matches!(
            picking.state(),
            PickingState::Confirmed | PickingState::Waiting | PickingState::Assigned
        ) {
            picking = self.stock.assign_picking(picking.id_typed())?;
        }

        if picking.state() != PickingState::Assigned {
            return Ok(());
        }

        // Moves flagged for return skip the quantity write here; their
        // absolute return quantity is applied to the return picking instead.
        let mut deferred: Vec<(MoveId, u64)> = Vec::new();
        for mv in picking.moves() {
            match request.returns.get(&mv.product_id) {
                Some(&qty) => deferred.push((mv.id, qty)),
                None => {
                    for line in &mv.lines {
                        self.stock
                            .record_done(picking.id_typed(), mv.id, line.id, mv.demand)?;
                    }
                }
            }
        }

        let picking = self.stock.validate_picking(picking.id_typed())?;

        if !deferred.is_empty() {
            let ret = self.stock.create_return(picking.id_typed())?;
            for rm in ret.moves() {
                if let Some((_, qty)) = deferred.iter().find(|(m, _)| *m == rm.origin_move) {
                    self.stock
                        .set_return_quantity(ret.id_typed(), rm.origin_move, *qty)?;
                }
            }
            let ret = self.stock.confirm_return(ret.id_typed())?;
            tracing::info!(
                picking = %picking.id_typed(),
                return_picking = %ret.id_typed(),
                "return picking confirmed"
            );
            return_picking_ids.push(ret.id_typed());
        }

        Ok(())
    }
}
