use serde::{Deserialize, Serialize};

use ordergate_core::{DomainError, DomainResult, Entity, EntityId, ProductId};
use ordergate_sales::OrderId;

use crate::picking::{MoveId, Picking, PickingId};

/// Return picking identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnPickingId(pub EntityId);

impl ReturnPickingId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ReturnPickingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Return picking lifecycle: created → confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnState {
    Created,
    Confirmed,
}

/// One product to give back, linked to the move that delivered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMove {
    pub origin_move: MoveId,
    pub product_id: ProductId,
    /// Always positive; callers convert return intent to an absolute value
    /// before it reaches this type.
    pub quantity: u64,
}

/// Reverse delivery for a completed picking.
///
/// A sibling artifact of its origin picking — linked back to it, not owned
/// by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnPicking {
    id: ReturnPickingId,
    origin: PickingId,
    order_id: OrderId,
    moves: Vec<ReturnMove>,
    state: ReturnState,
}

impl ReturnPicking {
    /// Seed a return from a completed picking: one return move per origin
    /// move, quantity defaulting to what was actually delivered.
    pub fn from_picking(id: ReturnPickingId, picking: &Picking) -> DomainResult<Self> {
        if !picking.is_done() {
            return Err(DomainError::state_conflict(format!(
                "cannot return picking {} in state '{}'",
                picking.id_typed(),
                picking.state().as_str()
            )));
        }

        let moves = picking
            .moves()
            .iter()
            .map(|mv| ReturnMove {
                origin_move: mv.id,
                product_id: mv.product_id,
                quantity: mv.delivered(),
            })
            .collect();

        Ok(Self {
            id,
            origin: picking.id_typed(),
            order_id: picking.order_id(),
            moves,
            state: ReturnState::Created,
        })
    }

    pub fn id_typed(&self) -> ReturnPickingId {
        self.id
    }

    pub fn origin(&self) -> PickingId {
        self.origin
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn moves(&self) -> &[ReturnMove] {
        &self.moves
    }

    pub fn state(&self) -> ReturnState {
        self.state
    }

    /// Overwrite the quantity of the return move originating from
    /// `origin_move`. Only legal before confirmation.
    pub fn set_quantity(&mut self, origin_move: MoveId, quantity: u64) -> DomainResult<()> {
        if self.state != ReturnState::Created {
            return Err(DomainError::state_conflict(format!(
                "return picking {} is already confirmed",
                self.id
            )));
        }
        let mv = self
            .moves
            .iter_mut()
            .find(|m| m.origin_move == origin_move)
            .ok_or_else(|| DomainError::not_found("return move", origin_move))?;
        mv.quantity = quantity;
        Ok(())
    }

    /// created → confirmed.
    pub fn confirm(&mut self) -> DomainResult<()> {
        match self.state {
            ReturnState::Created => {
                self.state = ReturnState::Confirmed;
                Ok(())
            }
            ReturnState::Confirmed => Err(DomainError::state_conflict(format!(
                "return picking {} is already confirmed",
                self.id
            ))),
        }
    }
}

impl Entity for ReturnPicking {
    type Id = ReturnPickingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
