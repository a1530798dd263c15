use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ordergate_core::{DomainError, DomainResult, Entity, EntityId, PartnerId};
use ordergate_sales::OrderId;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub EntityId);

impl InvoiceId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Invoice status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Draft,
    Posted,
}

/// An invoice derived from one sales order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    order_id: OrderId,
    partner_id: PartnerId,
    /// Amount in smallest currency unit, taken from the order total at
    /// creation time.
    amount: i64,
    state: InvoiceState,
    created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn new(
        id: InvoiceId,
        order_id: OrderId,
        partner_id: PartnerId,
        amount: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id,
            partner_id,
            amount,
            state: InvoiceState::Draft,
            created_at: now,
        }
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn partner_id(&self) -> PartnerId {
        self.partner_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn state(&self) -> InvoiceState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// draft → posted.
    pub fn post(&mut self) -> DomainResult<()> {
        match self.state {
            InvoiceState::Draft => {
                self.state = InvoiceState::Posted;
                Ok(())
            }
            InvoiceState::Posted => Err(DomainError::state_conflict(format!(
                "invoice {} is already posted",
                self.id
            ))),
        }
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
