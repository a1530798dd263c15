use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ordergate_core::{DomainError, DomainResult, Entity, EntityId, PartnerId, ProductId};

/// Sales order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub EntityId);

impl OrderId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for OrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sales order status lifecycle.
///
/// Advances monotonically; the only writers are the explicit transition
/// methods on [`Order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    Draft,
    Sent,
    Sale,
    Done,
    Cancel,
}

impl OrderState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::Draft => "draft",
            OrderState::Sent => "sent",
            OrderState::Sale => "sale",
            OrderState::Done => "done",
            OrderState::Cancel => "cancel",
        }
    }
}

/// Invoice eligibility, derived from policy + order/delivery progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    No,
    ToInvoice,
    Invoiced,
}

/// When an order becomes eligible for invoicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoicePolicy {
    /// Eligible as soon as the order is confirmed.
    #[default]
    Order,
    /// Eligible only once every delivery of the order is done.
    Delivery,
}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    /// Signed: positive is a normal sale, negative records return intent.
    /// Never zero.
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

/// Line contents before they are numbered and attached to an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDraft {
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: u64,
}

/// A sales order and its owned lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    /// Human-facing sequence name ("SO0007").
    name: String,
    partner_id: PartnerId,
    lines: Vec<OrderLine>,
    state: OrderState,
    invoice_status: InvoiceStatus,
    invoice_policy: InvoicePolicy,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Build a draft order from line drafts. Lines are numbered 1..n.
    pub fn new(
        id: OrderId,
        name: impl Into<String>,
        partner_id: PartnerId,
        drafts: Vec<LineDraft>,
        invoice_policy: InvoicePolicy,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if drafts.is_empty() {
            return Err(DomainError::validation_on(
                "order_line",
                "Order lines are required.",
            ));
        }

        let mut order = Self {
            id,
            name: name.into(),
            partner_id,
            lines: Vec::with_capacity(drafts.len()),
            state: OrderState::Draft,
            invoice_status: InvoiceStatus::No,
            invoice_policy,
            created_at: now,
            updated_at: now,
        };
        order.append_lines(drafts, now)?;
        Ok(order)
    }

    pub fn id_typed(&self) -> OrderId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn state(&self) -> OrderState {
        self.state
    }

    pub fn invoice_status(&self) -> InvoiceStatus {
        self.invoice_status
    }

    pub fn invoice_policy(&self) -> InvoicePolicy {
        self.invoice_policy
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Order total in smallest currency unit. Signed, since lines can carry
    /// negative (return-intent) quantities.
    pub fn amount_total(&self) -> i64 {
        self.lines
            .iter()
            .map(|l| l.quantity.saturating_mul(l.unit_price as i64))
            .sum()
    }

    /// Confirm the order: draft|sent → sale.
    ///
    /// The caller (store) is responsible for materializing the deliveries
    /// that confirmation triggers.
    pub fn confirm(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.state {
            OrderState::Draft | OrderState::Sent => {
                self.state = OrderState::Sale;
                self.updated_at = now;
                Ok(())
            }
            other => Err(DomainError::state_conflict(format!(
                "order {} cannot be confirmed from state '{}'",
                self.name,
                other.as_str()
            ))),
        }
    }

    /// Recompute invoice eligibility from the policy and delivery progress.
    /// `Invoiced` is sticky; a zero-total order has nothing billable and
    /// stays at `no`.
    pub fn refresh_invoice_status(&mut self, all_pickings_done: bool) {
        if self.invoice_status == InvoiceStatus::Invoiced {
            return;
        }
        if self.amount_total() == 0 {
            self.invoice_status = InvoiceStatus::No;
            return;
        }
        self.invoice_status = match self.state {
            OrderState::Sale | OrderState::Done => match self.invoice_policy {
                InvoicePolicy::Order => InvoiceStatus::ToInvoice,
                InvoicePolicy::Delivery if all_pickings_done => InvoiceStatus::ToInvoice,
                InvoicePolicy::Delivery => InvoiceStatus::No,
            },
            _ => InvoiceStatus::No,
        };
    }

    pub fn mark_invoiced(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.invoice_status != InvoiceStatus::ToInvoice {
            return Err(DomainError::state_conflict(format!(
                "order {} is not eligible for invoicing",
                self.name
            )));
        }
        self.invoice_status = InvoiceStatus::Invoiced;
        self.updated_at = now;
        Ok(())
    }

    /// Naive update used by the PUT endpoint: optional partner swap plus
    /// appended lines. No state branching — the caller already checked
    /// existence, nothing else is enforced here.
    pub fn apply_update(
        &mut self,
        partner_id: Option<PartnerId>,
        extra_lines: Vec<LineDraft>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(partner) = partner_id {
            self.partner_id = partner;
        }
        self.append_lines(extra_lines, now)?;
        self.updated_at = now;
        Ok(())
    }

    fn append_lines(&mut self, drafts: Vec<LineDraft>, now: DateTime<Utc>) -> DomainResult<()> {
        for draft in drafts {
            if draft.quantity == 0 {
                return Err(DomainError::validation_on(
                    "order_line",
                    "Quantity must not be zero.",
                ));
            }
            let line_no = (self.lines.len() as u32) + 1;
            self.lines.push(OrderLine {
                line_no,
                product_id: draft.product_id,
                quantity: draft.quantity,
                unit_price: draft.unit_price,
            });
        }
        self.updated_at = now;
        Ok(())
    }
}

impl Entity for Order {
    type Id = OrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_order_id() -> OrderId {
        OrderId::new(EntityId::new())
    }

    fn test_partner_id() -> PartnerId {
        PartnerId::new()
    }

    fn line(quantity: i64, unit_price: u64) -> LineDraft {
        LineDraft {
            product_id: ProductId::new(),
            quantity,
            unit_price,
        }
    }

    fn draft_order(drafts: Vec<LineDraft>) -> DomainResult<Order> {
        Order::new(
            test_order_id(),
            "SO0001",
            test_partner_id(),
            drafts,
            InvoicePolicy::Order,
            Utc::now(),
        )
    }

    #[test]
    fn new_order_starts_draft_with_numbered_lines() {
        let order = draft_order(vec![line(5, 100), line(2, 250)]).unwrap();

        assert_eq!(order.state(), OrderState::Draft);
        assert_eq!(order.invoice_status(), InvoiceStatus::No);
        assert_eq!(order.lines()[0].line_no, 1);
        assert_eq!(order.lines()[1].line_no, 2);
        assert_eq!(order.amount_total(), 5 * 100 + 2 * 250);
    }

    #[test]
    fn new_order_rejects_empty_lines() {
        let err = draft_order(vec![]).unwrap_err();
        match err {
            DomainError::Validation(map) => {
                assert!(map.get("order_line").is_some());
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn new_order_rejects_zero_quantity() {
        let err = draft_order(vec![line(5, 100), line(0, 100)]).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn negative_quantities_subtract_from_the_total() {
        let order = draft_order(vec![line(5, 100), line(-2, 100)]).unwrap();
        assert_eq!(order.amount_total(), 300);
    }

    #[test]
    fn confirm_moves_draft_to_sale() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        order.confirm(Utc::now()).unwrap();
        assert_eq!(order.state(), OrderState::Sale);
    }

    #[test]
    fn confirm_twice_is_a_state_conflict() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        order.confirm(Utc::now()).unwrap();
        let err = order.confirm(Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::StateConflict(_)));
    }

    #[test]
    fn invoice_status_follows_order_policy() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        order.refresh_invoice_status(false);
        assert_eq!(order.invoice_status(), InvoiceStatus::No);

        order.confirm(Utc::now()).unwrap();
        order.refresh_invoice_status(false);
        assert_eq!(order.invoice_status(), InvoiceStatus::ToInvoice);
    }

    #[test]
    fn invoice_status_with_delivery_policy_waits_for_pickings() {
        let mut order = Order::new(
            test_order_id(),
            "SO0002",
            test_partner_id(),
            vec![line(1, 100)],
            InvoicePolicy::Delivery,
            Utc::now(),
        )
        .unwrap();
        order.confirm(Utc::now()).unwrap();

        order.refresh_invoice_status(false);
        assert_eq!(order.invoice_status(), InvoiceStatus::No);

        order.refresh_invoice_status(true);
        assert_eq!(order.invoice_status(), InvoiceStatus::ToInvoice);
    }

    #[test]
    fn zero_total_orders_are_never_eligible() {
        let mut order = draft_order(vec![line(5, 0)]).unwrap();
        order.confirm(Utc::now()).unwrap();
        order.refresh_invoice_status(true);
        assert_eq!(order.invoice_status(), InvoiceStatus::No);
    }

    #[test]
    fn mark_invoiced_requires_eligibility_and_sticks() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        assert!(order.mark_invoiced(Utc::now()).is_err());

        order.confirm(Utc::now()).unwrap();
        order.refresh_invoice_status(true);
        order.mark_invoiced(Utc::now()).unwrap();
        assert_eq!(order.invoice_status(), InvoiceStatus::Invoiced);

        // Refresh never downgrades an invoiced order.
        order.refresh_invoice_status(false);
        assert_eq!(order.invoice_status(), InvoiceStatus::Invoiced);
    }

    #[test]
    fn apply_update_swaps_partner_and_appends_lines() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        let new_partner = test_partner_id();

        order
            .apply_update(Some(new_partner), vec![line(3, 50)], Utc::now())
            .unwrap();

        assert_eq!(order.partner_id(), new_partner);
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.lines()[1].line_no, 2);
    }

    #[test]
    fn apply_update_rejects_zero_quantity_lines() {
        let mut order = draft_order(vec![line(1, 100)]).unwrap();
        let err = order
            .apply_update(None, vec![line(0, 50)], Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn draft_strategy() -> impl Strategy<Value = LineDraft> {
            (-1000i64..1000, 0u64..100_000)
                .prop_map(|(quantity, unit_price)| line(quantity, unit_price))
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Property: an order is never created from a line set containing
            /// a zero quantity.
            #[test]
            fn zero_quantity_lines_never_pass(
                drafts in proptest::collection::vec(draft_strategy(), 1..8),
                zero_at in 0usize..8,
            ) {
                let mut drafts = drafts;
                let idx = zero_at % drafts.len();
                drafts[idx].quantity = 0;

                prop_assert!(draft_order(drafts).is_err());
            }

            /// Property: for accepted line sets the total is the plain sum of
            /// quantity × unit price.
            #[test]
            fn amount_total_matches_line_sum(
                drafts in proptest::collection::vec(draft_strategy(), 1..8),
            ) {
                prop_assume!(drafts.iter().all(|d| d.quantity != 0));

                let expected: i64 = drafts
                    .iter()
                    .map(|d| d.quantity * d.unit_price as i64)
                    .sum();
                let order = draft_order(drafts).unwrap();
                prop_assert_eq!(order.amount_total(), expected);
            }
        }
    }
}
