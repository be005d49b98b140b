use rust_decimal::Decimal;
use serde::Serialize;

use super::catalog::ProductId;
use super::line_item::LineItem;

pub const EMPTY_CART_MESSAGE: &str = "The cart is empty. Select products to begin.";
pub const EMPTY_QUOTE_MESSAGE: &str = "No products added";

/// A painted row of the cart or quote list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub stock_ceiling: u32,
    pub subtotal: Decimal,
}

impl From<&LineItem> for LineView {
    fn from(item: &LineItem) -> Self {
        Self {
            product_id: item.product_id,
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity: item.quantity,
            stock_ceiling: item.stock_ceiling,
            subtotal: item.subtotal(),
        }
    }
}

/// Everything the register screen shows for the current cart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartView {
    pub lines: Vec<LineView>,
    pub empty_message: Option<&'static str>,
    pub subtotal: Decimal,
    pub total: Decimal,
    pub checkout_enabled: bool,
    /// Value of the hidden `carrito_data` field.
    pub hidden_field: String,
}

impl Default for CartView {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            empty_message: Some(EMPTY_CART_MESSAGE),
            subtotal: Decimal::ZERO,
            total: Decimal::ZERO,
            checkout_enabled: false,
            hidden_field: "[]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteView {
    pub service_name: String,
    pub lines: Vec<LineView>,
    pub empty_message: Option<&'static str>,
    pub service_price: Decimal,
    pub products_total: Decimal,
    pub total: Decimal,
    /// Value of the hidden `productos_json` field.
    pub hidden_field: String,
}
