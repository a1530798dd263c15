//! Validated input for the fulfillment flow.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ordergate_core::{DomainResult, FieldErrors, PartnerId, ProductId};
use ordergate_sales::{InvoicePolicy, LineDraft};

/// One requested order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLine {
    pub product_id: ProductId,
    /// Signed, never zero.
    pub quantity: i64,
    /// Price in smallest currency unit.
    pub unit_price: u64,
}

/// A normalized order-creation request.
///
/// The HTTP validator produces this from the wire payload; library callers
/// can build it directly. Either way [`OrderRequest::validate`] runs again
/// inside the flow before any store is touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub partner_id: PartnerId,
    pub lines: Vec<RequestLine>,
    /// Absolute quantities to hand back, per product. Resolved from the
    /// per-line (or legacy order-level) `qty_done` overrides: a negative
    /// override flags the product here with its absolute value.
    #[serde(default)]
    pub returns: BTreeMap<ProductId, u64>,
    #[serde(default)]
    pub invoice_policy: InvoicePolicy,
}

impl OrderRequest {
    pub fn new(partner_id: PartnerId, lines: Vec<RequestLine>) -> Self {
        Self {
            partner_id,
            lines,
            returns: BTreeMap::new(),
            invoice_policy: InvoicePolicy::default(),
        }
    }

    pub fn with_return(mut self, product_id: ProductId, qty: u64) -> Self {
        self.returns.insert(product_id, qty);
        self
    }

    pub fn with_policy(mut self, invoice_policy: InvoicePolicy) -> Self {
        self.invoice_policy = invoice_policy;
        self
    }

    /// Check the structural constraints: at least one line, no zero
    /// quantities, no zero return overrides.
    pub fn validate(&self) -> DomainResult<()> {
        let mut errors = FieldErrors::new();

        if self.lines.is_empty() {
            errors.push("order_line", "Order lines are required.");
        }
        for (idx, line) in self.lines.iter().enumerate() {
            if line.quantity == 0 {
                errors.push(
                    format!("order_line.{idx}.quantity"),
                    "Quantity must not be zero.",
                );
            }
        }
        for (product_id, qty) in &self.returns {
            if *qty == 0 {
                errors.push("qty_done", format!("Return quantity for product {product_id} must not be zero."));
            }
        }

        errors.into_result()
    }

    /// The lines in the shape the order store takes them.
    pub fn line_drafts(&self) -> Vec<LineDraft> {
        self.lines
            .iter()
            .map(|l| LineDraft {
                product_id: l.product_id,
                quantity: l.quantity,
                unit_price: l.unit_price,
            })
            .collect()
    }
}
