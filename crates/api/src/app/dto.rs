use serde::Deserialize;

use ordergate_fulfillment::FulfillmentOutcome;
use ordergate_sales::{InvoiceStatus, Order};

// -------------------------
// Request DTOs
// -------------------------
//
// Everything is optional at the wire level; `validate.rs` turns these into
// typed requests and reports what is missing field by field.

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub partner_id: Option<String>,
    pub order_line: Option<Vec<OrderLineRequest>>,
    /// Order-level return override, kept for wire compatibility: a negative
    /// value flags every line for return handling. Prefer the per-line
    /// `qty_done`.
    pub qty_done: Option<i64>,
    pub invoice_policy: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    /// Price in smallest currency unit.
    pub price_unit: Option<i64>,
    /// Per-line return override; negative flags this line's product for
    /// return handling with the absolute value.
    pub qty_done: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    pub partner_id: Option<String>,
    #[serde(default)]
    pub order_lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn invoice_status_str(status: InvoiceStatus) -> &'static str {
    match status {
        InvoiceStatus::No => "no",
        InvoiceStatus::ToInvoice => "to_invoice",
        InvoiceStatus::Invoiced => "invoiced",
    }
}

pub fn order_to_json(order: &Order) -> serde_json::Value {
    serde_json::json!({
        "_id": order.id_typed().to_string(),
        "order_name": order.name(),
        "amount_total": order.amount_total(),
        "state": order.state().as_str(),
        "invoice_status": invoice_status_str(order.invoice_status()),
        "partner_id": order.partner_id().to_string(),
        "createdAt": order.created_at().to_rfc3339(),
        "updatedAt": order.updated_at().to_rfc3339(),
        "lines": order.lines().iter().map(|l| serde_json::json!({
            "line_no": l.line_no,
            "product_id": l.product_id.to_string(),
            "quantity": l.quantity,
            "price_unit": l.unit_price,
        })).collect::<Vec<_>>(),
    })
}

pub fn outcome_to_json(outcome: &FulfillmentOutcome) -> serde_json::Value {
    serde_json::json!({
        "status": "success",
        "order_id": outcome.order_id.to_string(),
        "invoice_id": outcome.invoice_id.map(|id| id.to_string()),
        "picking_ids": outcome
            .picking_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
        "return_picking_ids": outcome
            .return_picking_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
}
