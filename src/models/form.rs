use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use super::catalog::{ProductId, QuotedServiceId, ServiceId};
use crate::utils::validation::{
    normalize_price_text, validate_not_blank, validate_price_text, validate_stock_text,
};

pub const SALE_ACTION: &str = "/ventas/cobrar-productos/";
pub const PAYMENT_METHOD_CASH: &str = "efectivo";

/// A form post handed to the server. The managers build these; they never
/// send them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSubmission {
    pub id: Uuid,
    pub action: String,
    pub method: String,
    pub fields: BTreeMap<String, String>,
    pub submitted_at: DateTime<Utc>,
}

impl FormSubmission {
    pub fn post<I, K, V>(action: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            method: "POST".to_string(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            submitted_at: Utc::now(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Cash sale produced by a confirmed checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleForm {
    pub carrito_data: String,
    pub metodo_pago: String,
    pub total: Decimal,
    pub cashier: Option<String>,
}

impl SaleForm {
    pub fn to_submission(&self) -> FormSubmission {
        let mut fields = vec![
            ("carrito_data", self.carrito_data.clone()),
            ("metodo_pago", self.metodo_pago.clone()),
        ];
        if let Some(cashier) = &self.cashier {
            fields.push(("cajero", cashier.clone()));
        }
        FormSubmission::post(SALE_ACTION, fields)
    }
}

/// Cash payment of a quoted service, produced by a confirmed payment.
#[derive(Debug, Clone, PartialEq)]
pub struct ServicePaymentForm {
    pub quote_id: QuotedServiceId,
    pub total: Decimal,
}

impl ServicePaymentForm {
    pub fn action(&self) -> String {
        format!("/ventas/pagar-servicio/{}/", self.quote_id)
    }

    pub fn to_submission(&self) -> FormSubmission {
        FormSubmission::post(self.action(), std::iter::empty::<(String, String)>())
    }
}

// request dto
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct QuoteForm {
    #[serde(skip)]
    pub service_id: ServiceId,

    #[validate(length(min = 1, max = 200, message = "Customer name must be 1-200 characters"))]
    #[validate(custom = "validate_not_blank")]
    pub nombre_cliente: String,

    pub productos_json: String,

    #[serde(skip)]
    pub total: Decimal,
}

impl QuoteForm {
    pub fn action(&self) -> String {
        format!("/servicios/cotizar/{}/", self.service_id)
    }

    pub fn to_submission(&self) -> FormSubmission {
        FormSubmission::post(
            self.action(),
            [
                ("nombre_cliente", self.nombre_cliente.trim().to_string()),
                ("productos_json", self.productos_json.clone()),
            ],
        )
    }
}

/// Edit dialog payload for an inventory row. Values stay as text until the
/// server accepts them, exactly as a browser form would post them.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct ProductEditForm {
    #[serde(skip)]
    pub id: ProductId,

    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    #[validate(custom = "validate_not_blank")]
    pub nombre: String,

    pub descripcion: String,

    #[validate(custom = "validate_price_text")]
    pub precio: String,

    #[validate(custom = "validate_stock_text")]
    pub cantidad_stock: String,
}

impl ProductEditForm {
    pub fn to_submission(&self) -> FormSubmission {
        FormSubmission::post(
            format!("/inventario/modificar/{}/", self.id),
            [
                ("nombre", self.nombre.trim().to_string()),
                ("descripcion", self.descripcion.clone()),
                ("precio", normalize_price_text(&self.precio)),
                ("cantidad_stock", self.cantidad_stock.trim().to_string()),
            ],
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct ServiceEditForm {
    #[serde(skip)]
    pub id: ServiceId,

    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    #[validate(custom = "validate_not_blank")]
    pub nombre: String,

    pub descripcion: String,

    #[validate(custom = "validate_price_text")]
    pub costo_servicio: String,
}

impl ServiceEditForm {
    pub fn to_submission(&self) -> FormSubmission {
        FormSubmission::post(
            format!("/servicios/modificar/{}/", self.id),
            [
                ("nombre", self.nombre.trim().to_string()),
                ("descripcion", self.descripcion.clone()),
                ("costo_servicio", normalize_price_text(&self.costo_servicio)),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_form_rejects_blank_customer() {
        let form = QuoteForm {
            service_id: ServiceId(3),
            nombre_cliente: "   ".to_string(),
            productos_json: "[]".to_string(),
            total: Decimal::ZERO,
        };
        assert!(form.validate().is_err());

        let form = QuoteForm {
            nombre_cliente: "Ana".to_string(),
            ..form
        };
        assert!(form.validate().is_ok());
        assert_eq!(form.action(), "/servicios/cotizar/3/");
    }

    #[test]
    fn test_product_edit_form_validation() {
        let mut form = ProductEditForm {
            id: ProductId(1),
            nombre: "Mouse".to_string(),
            descripcion: String::new(),
            precio: "12,90".to_string(),
            cantidad_stock: "4".to_string(),
        };
        assert!(form.validate().is_ok());

        let submission = form.to_submission();
        assert_eq!(submission.action, "/inventario/modificar/1/");
        assert_eq!(submission.field("precio"), Some("12.90"));

        form.cantidad_stock = "-2".to_string();
        assert!(form.validate().is_err());
    }

    #[test]
    fn test_edit_forms_post_plain_decimal_prices() {
        let product = ProductEditForm {
            id: ProductId(2),
            nombre: "Charger".to_string(),
            descripcion: String::new(),
            precio: "$14.50".to_string(),
            cantidad_stock: "3".to_string(),
        };
        assert!(product.validate().is_ok());
        assert_eq!(product.to_submission().field("precio"), Some("14.50"));

        let service = ServiceEditForm {
            id: ServiceId(4),
            nombre: "Cleaning".to_string(),
            descripcion: String::new(),
            costo_servicio: " $150,00 ".to_string(),
        };
        assert!(service.validate().is_ok());
        assert_eq!(service.to_submission().field("costo_servicio"), Some("150.00"));
    }

    #[test]
    fn test_sale_form_submission_fields() {
        let form = SaleForm {
            carrito_data: "[]".to_string(),
            metodo_pago: PAYMENT_METHOD_CASH.to_string(),
            total: Decimal::ZERO,
            cashier: None,
        };
        let submission = form.to_submission();

        assert_eq!(submission.action, SALE_ACTION);
        assert_eq!(submission.method, "POST");
        assert_eq!(submission.field("metodo_pago"), Some("efectivo"));
        assert_eq!(submission.field("cajero"), None);
    }
}
