//! Inbound payload validation.
//!
//! Turns the all-optional wire DTOs into typed requests, collecting a
//! field-level error map instead of failing on the first problem.

use std::collections::BTreeMap;

use ordergate_core::{FieldErrors, PartnerId, ProductId};
use ordergate_fulfillment::{OrderPatch, OrderRequest, RequestLine};
use ordergate_sales::{InvoicePolicy, LineDraft};

use crate::app::dto::{CreateOrderRequest, OrderLineRequest, UpdateOrderRequest};

pub fn validate_create_order(payload: &CreateOrderRequest) -> Result<OrderRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let partner_id = required_partner(payload.partner_id.as_deref(), &mut errors);

    let mut lines = Vec::new();
    let mut returns: BTreeMap<ProductId, u64> = BTreeMap::new();

    match payload.order_line.as_deref() {
        None | Some([]) => errors.push("order_line", "Order lines are required."),
        Some(raw_lines) => {
            for (idx, raw) in raw_lines.iter().enumerate() {
                let Some(line) = validate_line(idx, raw, &mut errors) else {
                    continue;
                };

                // A per-line override wins over the order-level one; negative
                // values flag the product for return handling.
                let override_qty = raw.qty_done.or(payload.qty_done);
                if let Some(qty) = override_qty {
                    if qty < 0 {
                        returns.insert(line.product_id, qty.unsigned_abs());
                    }
                }
                lines.push(line);
            }
        }
    }

    let invoice_policy = match payload.invoice_policy.as_deref() {
        None => InvoicePolicy::default(),
        Some("order") => InvoicePolicy::Order,
        Some("delivery") => InvoicePolicy::Delivery,
        Some(_) => {
            errors.push(
                "invoice_policy",
                "Invoice policy must be one of: order, delivery.",
            );
            InvoicePolicy::default()
        }
    };

    errors.into_result().map_err(unwrap_validation)?;

    Ok(OrderRequest {
        // Holds: a missing/invalid partner pushed an error above.
        partner_id: partner_id.expect("partner_id validated"),
        lines,
        returns,
        invoice_policy,
    })
}

pub fn validate_update_order(payload: &UpdateOrderRequest) -> Result<OrderPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    let partner_id = match payload.partner_id.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<PartnerId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("partner_id", "Partner ID must be a valid UUID.");
                None
            }
        },
    };

    let mut extra_lines = Vec::new();
    for (idx, raw) in payload.order_lines.iter().enumerate() {
        if let Some(line) = validate_line(idx, raw, &mut errors) {
            extra_lines.push(LineDraft {
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }
    }

    errors.into_result().map_err(unwrap_validation)?;

    Ok(OrderPatch {
        partner_id,
        extra_lines,
    })
}

fn required_partner(raw: Option<&str>, errors: &mut FieldErrors) -> Option<PartnerId> {
    match raw {
        None => {
            errors.push("partner_id", "Partner ID is required.");
            None
        }
        Some(raw) => match raw.parse::<PartnerId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("partner_id", "Partner ID must be a valid UUID.");
                None
            }
        },
    }
}

fn validate_line(
    idx: usize,
    raw: &OrderLineRequest,
    errors: &mut FieldErrors,
) -> Option<RequestLine> {
    let product_id = match raw.product_id.as_deref() {
        None => {
            errors.push(
                format!("order_line.{idx}.product_id"),
                "Product ID is required.",
            );
            None
        }
        Some(raw) => match raw.parse::<ProductId>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(
                    format!("order_line.{idx}.product_id"),
                    "Product ID must be a valid UUID.",
                );
                None
            }
        },
    };

    let quantity = match raw.quantity {
        None => {
            errors.push(format!("order_line.{idx}.quantity"), "Quantity is required.");
            None
        }
        Some(0) => {
            errors.push(
                format!("order_line.{idx}.quantity"),
                "Quantity must not be zero.",
            );
            None
        }
        Some(q) => Some(q),
    };

    let unit_price = match raw.price_unit {
        None => {
            errors.push(
                format!("order_line.{idx}.price_unit"),
                "Price unit is required.",
            );
            None
        }
        Some(p) if p < 0 => {
            errors.push(
                format!("order_line.{idx}.price_unit"),
                "Price unit must not be negative.",
            );
            None
        }
        Some(p) => Some(p as u64),
    };

    Some(RequestLine {
        product_id: product_id?,
        quantity: quantity?,
        unit_price: unit_price?,
    })
}

fn unwrap_validation(err: ordergate_core::DomainError) -> FieldErrors {
    match err {
        ordergate_core::DomainError::Validation(map) => map,
        // into_result only ever builds Validation.
        _ => FieldErrors::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn raw_line(quantity: Option<i64>) -> OrderLineRequest {
        OrderLineRequest {
            product_id: Some(Uuid::now_v7().to_string()),
            quantity,
            price_unit: Some(100),
            qty_done: None,
        }
    }

    fn valid_payload() -> CreateOrderRequest {
        CreateOrderRequest {
            partner_id: Some(Uuid::now_v7().to_string()),
            order_line: Some(vec![raw_line(Some(5))]),
            qty_done: None,
            invoice_policy: None,
        }
    }

    #[test]
    fn empty_payload_reports_every_missing_field() {
        let payload = CreateOrderRequest {
            partner_id: None,
            order_line: None,
            qty_done: None,
            invoice_policy: None,
        };

        let errors = validate_create_order(&payload).unwrap_err();
        assert_eq!(
            errors.get("partner_id").unwrap(),
            &["Partner ID is required.".to_string()]
        );
        assert_eq!(
            errors.get("order_line").unwrap(),
            &["Order lines are required.".to_string()]
        );
    }

    #[test]
    fn line_errors_are_keyed_by_index() {
        let mut payload = valid_payload();
        payload.order_line = Some(vec![raw_line(Some(5)), raw_line(None)]);

        let errors = validate_create_order(&payload).unwrap_err();
        assert_eq!(
            errors.get("order_line.1.quantity").unwrap(),
            &["Quantity is required.".to_string()]
        );
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut payload = valid_payload();
        payload.order_line = Some(vec![raw_line(Some(0))]);

        let errors = validate_create_order(&payload).unwrap_err();
        assert!(errors.get("order_line.0.quantity").is_some());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut payload = valid_payload();
        payload.order_line.as_mut().unwrap()[0].price_unit = Some(-1);

        let errors = validate_create_order(&payload).unwrap_err();
        assert!(errors.get("order_line.0.price_unit").is_some());
    }

    #[test]
    fn per_line_negative_override_flags_the_product() {
        let mut payload = valid_payload();
        payload.order_line.as_mut().unwrap()[0].qty_done = Some(-2);

        let request = validate_create_order(&payload).unwrap();
        let product_id = request.lines[0].product_id;
        assert_eq!(request.returns.get(&product_id), Some(&2));
    }

    #[test]
    fn order_level_override_broadcasts_to_every_line() {
        let mut payload = valid_payload();
        payload.order_line = Some(vec![raw_line(Some(5)), raw_line(Some(3))]);
        payload.qty_done = Some(-1);

        let request = validate_create_order(&payload).unwrap();
        assert_eq!(request.returns.len(), 2);
        assert!(request.returns.values().all(|qty| *qty == 1));
    }

    #[test]
    fn per_line_override_wins_over_the_order_level_one() {
        let mut payload = valid_payload();
        payload.qty_done = Some(-4);
        payload.order_line.as_mut().unwrap()[0].qty_done = Some(2);

        // The positive per-line value suppresses the order-level return flag.
        let request = validate_create_order(&payload).unwrap();
        assert!(request.returns.is_empty());
    }

    #[test]
    fn unknown_invoice_policy_is_rejected() {
        let mut payload = valid_payload();
        payload.invoice_policy = Some("timesheet".to_string());

        let errors = validate_create_order(&payload).unwrap_err();
        assert!(errors.get("invoice_policy").is_some());
    }

    #[test]
    fn known_invoice_policies_parse() {
        let mut payload = valid_payload();
        payload.invoice_policy = Some("delivery".to_string());

        let request = validate_create_order(&payload).unwrap();
        assert_eq!(request.invoice_policy, InvoicePolicy::Delivery);
    }

    #[test]
    fn update_accepts_partial_payloads() {
        let payload = UpdateOrderRequest {
            partner_id: None,
            order_lines: vec![],
        };

        let patch = validate_update_order(&payload).unwrap();
        assert!(patch.partner_id.is_none());
        assert!(patch.extra_lines.is_empty());
    }

    #[test]
    fn update_rejects_malformed_partner() {
        let payload = UpdateOrderRequest {
            partner_id: Some("not-a-uuid".to_string()),
            order_lines: vec![],
        };

        let errors = validate_update_order(&payload).unwrap_err();
        assert!(errors.get("partner_id").is_some());
    }
}
