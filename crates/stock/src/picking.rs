use serde::{Deserialize, Serialize};

use ordergate_core::{DomainError, DomainResult, Entity, EntityId, ProductId};
use ordergate_sales::OrderId;

/// Picking identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickingId(pub EntityId);

/// Stock move identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub EntityId);

/// Move line identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveLineId(pub EntityId);

impl PickingId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl MoveId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl MoveLineId {
    pub fn new(id: EntityId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PickingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Display for MoveId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Picking status lifecycle.
///
/// `draft → confirmed → {waiting|assigned} → assigned → done`; `cancel` is a
/// terminal side exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingState {
    Draft,
    Confirmed,
    Waiting,
    Assigned,
    Done,
    Cancel,
}

impl PickingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickingState::Draft => "draft",
            PickingState::Confirmed => "confirmed",
            PickingState::Waiting => "waiting",
            PickingState::Assigned => "assigned",
            PickingState::Done => "done",
            PickingState::Cancel => "cancel",
        }
    }
}

/// Requested vs. actually-moved quantities within a move.
///
/// `qty_done` stays unset until a caller records it; `validate` falls back to
/// the reserved quantity for unset lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveLine {
    pub id: MoveLineId,
    pub reserved: u64,
    pub qty_done: Option<u64>,
}

/// One product movement inside a picking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub id: MoveId,
    pub product_id: ProductId,
    /// Requested quantity — always the absolute value of the order line
    /// quantity.
    pub demand: u64,
    pub lines: Vec<MoveLine>,
}

impl Move {
    /// Quantity actually moved, summed over lines with a recorded (or, after
    /// validation, filled-in) `qty_done`.
    pub fn delivered(&self) -> u64 {
        self.lines.iter().filter_map(|l| l.qty_done).sum()
    }
}

/// A delivery unit owned by an order for the duration of fulfillment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Picking {
    id: PickingId,
    order_id: OrderId,
    state: PickingState,
    moves: Vec<Move>,
}

impl Picking {
    /// A fresh draft picking. Moves are seeded by the store from the order
    /// lines, one line each with nothing reserved yet.
    pub fn new(id: PickingId, order_id: OrderId, moves: Vec<Move>) -> Self {
        Self {
            id,
            order_id,
            state: PickingState::Draft,
            moves,
        }
    }

    pub fn id_typed(&self) -> PickingId {
        self.id
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn state(&self) -> PickingState {
        self.state
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn is_done(&self) -> bool {
        self.state == PickingState::Done
    }

    /// draft → confirmed.
    pub fn confirm(&mut self) -> DomainResult<()> {
        match self.state {
            PickingState::Draft => {
                self.state = PickingState::Confirmed;
                Ok(())
            }
            other => Err(self.transition_conflict("confirm", other)),
        }
    }

    /// Reserve the full demand of every move: confirmed|waiting|assigned →
    /// assigned.
    ///
    /// Availability is the store's concern; by the time this runs the stock
    /// has already been checked and decremented.
    pub fn assign_full(&mut self) -> DomainResult<()> {
        match self.state {
            PickingState::Confirmed | PickingState::Waiting | PickingState::Assigned => {
                for mv in &mut self.moves {
                    let mut remaining = mv.demand;
                    for line in &mut mv.lines {
                        line.reserved = remaining;
                        remaining = 0;
                    }
                }
                self.state = PickingState::Assigned;
                Ok(())
            }
            other => Err(self.transition_conflict("assign", other)),
        }
    }

    /// Record the quantity actually moved on one line. Only legal while the
    /// picking is assigned.
    pub fn record_done(
        &mut self,
        move_id: MoveId,
        line_id: MoveLineId,
        qty: u64,
    ) -> DomainResult<()> {
        if self.state != PickingState::Assigned {
            let state = self.state;
            return Err(self.transition_conflict("record quantities on", state));
        }
        let mv = self
            .moves
            .iter_mut()
            .find(|m| m.id == move_id)
            .ok_or_else(|| DomainError::not_found("move", move_id))?;
        let line = mv
            .lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or_else(|| DomainError::not_found("move line", line_id.0))?;
        line.qty_done = Some(qty);
        Ok(())
    }

    /// Complete the delivery: assigned → done.
    ///
    /// Lines without a recorded quantity are treated as fully delivered at
    /// their reserved quantity.
    pub fn validate(&mut self) -> DomainResult<()> {
        match self.state {
            PickingState::Assigned => {
                for mv in &mut self.moves {
                    for line in &mut mv.lines {
                        if line.qty_done.is_none() {
                            line.qty_done = Some(line.reserved);
                        }
                    }
                }
                self.state = PickingState::Done;
                Ok(())
            }
            other => Err(self.transition_conflict("validate", other)),
        }
    }

    fn transition_conflict(&self, action: &str, from: PickingState) -> DomainError {
        DomainError::state_conflict(format!(
            "cannot {action} picking {} in state '{}'",
            self.id,
            from.as_str()
        ))
    }
}

impl Entity for Picking {
    type Id = PickingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
