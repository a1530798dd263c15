//! In-memory store backend.
//!
//! Intended for tests/dev. Not optimized for performance. Every trait call
//! takes the write lock for its whole body, which is what gives the
//! per-call atomicity the flow assumes; no lock is held across calls.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use ordergate_core::{DomainError, DomainResult, EntityId, PartnerId, ProductId};
use ordergate_fulfillment::{InvoicingStore, OrderPage, OrderPatch, OrderStore, StockStore};
use ordergate_invoicing::{Invoice, InvoiceId};
use ordergate_sales::{InvoicePolicy, LineDraft, Order, OrderId};
use ordergate_stock::{
    Move, MoveId, MoveLine, MoveLineId, Picking, PickingId, ReturnPicking, ReturnPickingId,
};

#[derive(Debug, Default)]
struct State {
    orders: HashMap<OrderId, Order>,
    /// Insertion order, for stable listing/pagination.
    order_seq: Vec<OrderId>,
    order_counter: u32,
    pickings: HashMap<PickingId, Picking>,
    /// Picking ids per order, in materialization order.
    order_pickings: HashMap<OrderId, Vec<PickingId>>,
    returns: HashMap<ReturnPickingId, ReturnPicking>,
    invoices: HashMap<InvoiceId, Invoice>,
    /// On-hand quantity per product. Products without an entry are
    /// unconstrained.
    stock_levels: HashMap<ProductId, u64>,
}

impl State {
    fn order(&self, id: OrderId) -> DomainResult<&Order> {
        self.orders
            .get(&id)
            .ok_or_else(|| DomainError::not_found("order", id))
    }

    fn order_mut(&mut self, id: OrderId) -> DomainResult<&mut Order> {
        self.orders
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("order", id))
    }

    fn picking_mut(&mut self, id: PickingId) -> DomainResult<&mut Picking> {
        self.pickings
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("picking", id))
    }

    fn return_mut(&mut self, id: ReturnPickingId) -> DomainResult<&mut ReturnPicking> {
        self.returns
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("return picking", id))
    }

    fn all_pickings_done(&self, order_id: OrderId) -> bool {
        self.order_pickings
            .get(&order_id)
            .map(|ids| {
                ids.iter()
                    .all(|id| self.pickings.get(id).is_some_and(Picking::is_done))
            })
            .unwrap_or(true)
    }

    fn refresh_invoice_status(&mut self, order_id: OrderId) {
        let all_done = self.all_pickings_done(order_id);
        if let Some(order) = self.orders.get_mut(&order_id) {
            order.refresh_invoice_status(all_done);
        }
    }
}

/// One backend behind all three store boundaries.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pin the on-hand quantity of a product. Products never pinned are
    /// treated as always available.
    pub fn set_stock(&self, product_id: ProductId, qty: u64) {
        if let Ok(mut state) = self.state.write() {
            state.stock_levels.insert(product_id, qty);
        }
    }

    pub fn stock_level(&self, product_id: ProductId) -> Option<u64> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.stock_levels.get(&product_id).copied())
    }

    pub fn invoice_count(&self) -> usize {
        self.state.read().map(|state| state.invoices.len()).unwrap_or(0)
    }

    pub fn get_invoice(&self, id: InvoiceId) -> Option<Invoice> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.invoices.get(&id).cloned())
    }

    pub fn get_return(&self, id: ReturnPickingId) -> Option<ReturnPicking> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.returns.get(&id).cloned())
    }

    pub fn get_picking(&self, id: PickingId) -> Option<Picking> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.pickings.get(&id).cloned())
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| DomainError::unavailable("lock poisoned"))
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| DomainError::unavailable("lock poisoned"))
    }
}

impl OrderStore for MemoryStore {
    fn create(
        &self,
        partner_id: PartnerId,
        lines: Vec<LineDraft>,
        invoice_policy: InvoicePolicy,
    ) -> DomainResult<Order> {
        let mut state = self.write()?;

        state.order_counter += 1;
        let name = format!("SO{:04}", state.order_counter);
        let id = OrderId::new(EntityId::new());
        let order = Order::new(id, name, partner_id, lines, invoice_policy, Utc::now())?;

        state.orders.insert(id, order.clone());
        state.order_seq.push(id);
        tracing::debug!(order = %order.name(), "order created");
        Ok(order)
    }

    fn get(&self, id: OrderId) -> DomainResult<Order> {
        self.read()?.order(id).cloned()
    }

    fn list(&self, page: u32, per_page: u32) -> DomainResult<OrderPage> {
        let state = self.read()?;

        let page = page.max(1) as usize;
        let per_page = per_page as usize;
        let offset = (page - 1) * per_page;

        let orders = state
            .order_seq
            .iter()
            .skip(offset)
            .take(per_page)
            .filter_map(|id| state.orders.get(id).cloned())
            .collect();

        Ok(OrderPage {
            orders,
            total: state.order_seq.len() as u64,
        })
    }

    fn update(&self, id: OrderId, patch: OrderPatch) -> DomainResult<Order> {
        let mut state = self.write()?;
        let order = state.order_mut(id)?;
        order.apply_update(patch.partner_id, patch.extra_lines, Utc::now())?;
        Ok(order.clone())
    }

    fn delete(&self, id: OrderId) -> DomainResult<()> {
        let mut state = self.write()?;
        if state.orders.remove(&id).is_none() {
            return Err(DomainError::not_found("order", id));
        }
        state.order_seq.retain(|oid| *oid != id);
        if let Some(picking_ids) = state.order_pickings.remove(&id) {
            for pid in picking_ids {
                state.pickings.remove(&pid);
            }
        }
        state.returns.retain(|_, r| r.order_id() != id);
        Ok(())
    }

    fn confirm(&self, id: OrderId) -> DomainResult<Order> {
        let mut state = self.write()?;

        let now = Utc::now();
        let order = state.order_mut(id)?;
        order.confirm(now)?;

        // Confirmation materializes the delivery: one picking for the order,
        // one move per line with the absolute quantity as demand.
        let moves: Vec<Move> = state
            .order(id)?
            .lines()
            .iter()
            .map(|line| Move {
                id: MoveId::new(EntityId::new()),
                product_id: line.product_id,
                demand: line.quantity.unsigned_abs(),
                lines: vec![MoveLine {
                    id: MoveLineId::new(EntityId::new()),
                    reserved: 0,
                    qty_done: None,
                }],
            })
            .collect();

        let picking_id = PickingId::new(EntityId::new());
        let picking = Picking::new(picking_id, id, moves);
        state.pickings.insert(picking_id, picking);
        state.order_pickings.entry(id).or_default().push(picking_id);

        state.refresh_invoice_status(id);
        state.order(id).cloned()
    }
}

impl StockStore for MemoryStore {
    fn pickings_for(&self, order_id: OrderId) -> DomainResult<Vec<Picking>> {
        let state = self.read()?;
        state.order(order_id)?;

        Ok(state
            .order_pickings
            .get(&order_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| state.pickings.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn confirm_picking(&self, id: PickingId) -> DomainResult<Picking> {
        let mut state = self.write()?;
        let picking = state.picking_mut(id)?;
        picking.confirm()?;
        Ok(picking.clone())
    }

    fn assign_picking(&self, id: PickingId) -> DomainResult<Picking> {
        let mut state = self.write()?;

        // Availability first, without mutating anything.
        let picking = state
            .pickings
            .get(&id)
            .ok_or_else(|| DomainError::not_found("picking", id))?;
        for mv in picking.moves() {
            if let Some(&available) = state.stock_levels.get(&mv.product_id) {
                if available < mv.demand {
                    return Err(DomainError::state_conflict(format!(
                        "cannot assign picking {}: product {} has {} on hand, {} requested",
                        id, mv.product_id, available, mv.demand
                    )));
                }
            }
        }

        let picking = state.picking_mut(id)?;
        picking.assign_full()?;
        let picking = picking.clone();

        for mv in picking.moves() {
            if let Some(available) = state.stock_levels.get_mut(&mv.product_id) {
                *available -= mv.demand;
            }
        }

        Ok(picking)
    }

    fn record_done(
        &self,
        picking_id: PickingId,
        move_id: MoveId,
        line_id: MoveLineId,
        qty: u64,
    ) -> DomainResult<()> {
        let mut state = self.write()?;
        state.picking_mut(picking_id)?.record_done(move_id, line_id, qty)
    }

    fn validate_picking(&self, id: PickingId) -> DomainResult<Picking> {
        let mut state = self.write()?;
        let picking = state.picking_mut(id)?;
        picking.validate()?;
        let order_id = picking.order_id();
        let picking = picking.clone();

        // Delivery progress feeds eligibility.
        state.refresh_invoice_status(order_id);
        Ok(picking)
    }

    fn create_return(&self, picking_id: PickingId) -> DomainResult<ReturnPicking> {
        let mut state = self.write()?;
        let picking = state
            .pickings
            .get(&picking_id)
            .ok_or_else(|| DomainError::not_found("picking", picking_id))?;

        let ret = ReturnPicking::from_picking(ReturnPickingId::new(EntityId::new()), picking)?;
        state.returns.insert(ret.id_typed(), ret.clone());
        Ok(ret)
    }

    fn set_return_quantity(
        &self,
        return_id: ReturnPickingId,
        origin_move: MoveId,
        qty: u64,
    ) -> DomainResult<()> {
        let mut state = self.write()?;
        state.return_mut(return_id)?.set_quantity(origin_move, qty)
    }

    fn confirm_return(&self, return_id: ReturnPickingId) -> DomainResult<ReturnPicking> {
        let mut state = self.write()?;
        let ret = state.return_mut(return_id)?;
        ret.confirm()?;
        let ret = ret.clone();

        // Confirmed returns put tracked products back on hand.
        for mv in ret.moves() {
            if let Some(available) = state.stock_levels.get_mut(&mv.product_id) {
                *available += mv.quantity;
            }
        }

        Ok(ret)
    }
}

impl InvoicingStore for MemoryStore {
    fn create_invoice(&self, order_id: OrderId) -> DomainResult<Invoice> {
        let mut state = self.write()?;

        let now = Utc::now();
        let order = state.order_mut(order_id)?;
        order.mark_invoiced(now)?;

        let invoice = Invoice::new(
            InvoiceId::new(EntityId::new()),
            order_id,
            order.partner_id(),
            order.amount_total(),
            now,
        );
        state.invoices.insert(invoice.id_typed(), invoice.clone());
        tracing::debug!(order = %order_id, invoice = %invoice.id_typed(), "invoice created");
        Ok(invoice)
    }

    fn post_invoice(&self, id: InvoiceId) -> DomainResult<Invoice> {
        let mut state = self.write()?;
        let invoice = state
            .invoices
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("invoice", id))?;
        invoice.post()?;
        Ok(invoice.clone())
    }
}
