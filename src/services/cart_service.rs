use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    models::{
        CartView, LineItem, LineItems, LineView, ProductCard, ProductId, SaleForm,
        EMPTY_CART_MESSAGE, PAYMENT_METHOD_CASH,
    },
    services::confirmation::Confirmation,
    utils::{
        formatting::format_money,
        validation::{parse_price, parse_quantity, parse_stock, InputError},
    },
};

/// Which stock check rejected a request. Each one reads differently to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockContext {
    /// One more unit of an item already in the cart.
    Increment,
    /// Quantity typed into an existing cart line.
    SetQuantity,
    /// First addition of a product.
    NewItem,
    /// Topping up a quote line that already holds some units.
    TopUp { already_added: u32 },
}

fn stock_notice(context: &StockContext, available: &u32) -> String {
    match context {
        StockContext::Increment => "No more stock available for this product".to_string(),
        StockContext::SetQuantity => "Not enough stock available".to_string(),
        StockContext::NewItem => format!("Not enough stock. Available: {}", available),
        StockContext::TopUp { already_added } => format!(
            "Not enough stock. Available: {}, already added: {}",
            available, already_added
        ),
    }
}

#[derive(Error, Debug)]
pub enum CartError {
    #[error("{}", stock_notice(.context, .available))]
    StockExceeded {
        product_id: ProductId,
        requested: u64,
        available: u32,
        context: StockContext,
    },

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Confirmation prompt failed: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<InputError> for CartError {
    fn from(e: InputError) -> Self {
        CartError::InvalidInput {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartState {
    /// Checkout disabled.
    Empty,
    /// Checkout enabled.
    NonEmpty,
}

/// Register cart: the ordered line items of the sale being rung up.
///
/// Every successful mutation re-renders [`CartView`], so the view, the
/// totals and the hidden `carrito_data` field never lag behind the items.
/// Rejected operations leave both untouched.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    items: LineItems,
    view: CartView,
    cashier: Option<String>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cart whose sales are recorded against `cashier`.
    pub fn with_cashier(cashier: Option<String>) -> Self {
        Self {
            cashier,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &LineItems {
        &self.items
    }

    pub fn view(&self) -> &CartView {
        &self.view
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    pub fn total(&self) -> Decimal {
        self.items.total()
    }

    /// Add one unit of a product, merging into its existing line.
    ///
    /// Returns the line's quantity after the addition.
    pub fn add(
        &mut self,
        product_id: ProductId,
        name: &str,
        price_text: &str,
        stock_ceiling: u32,
    ) -> Result<u32, CartError> {
        let unit_price = parse_price(price_text)?;

        let quantity = match self.items.get_mut(product_id) {
            Some(item) => {
                if item.quantity >= stock_ceiling {
                    warn!(
                        "Rejected add of product {}: {} already in cart, stock {}",
                        product_id, item.quantity, stock_ceiling
                    );
                    return Err(CartError::StockExceeded {
                        product_id,
                        requested: u64::from(item.quantity) + 1,
                        available: stock_ceiling,
                        context: StockContext::Increment,
                    });
                }
                item.quantity += 1;
                // The line follows the ceiling its last accepted add was checked against.
                item.stock_ceiling = stock_ceiling;
                item.quantity
            }
            None => {
                // Zero-stock products are rejected rather than silently skipped.
                if stock_ceiling == 0 {
                    warn!("Rejected add of product {}: out of stock", product_id);
                    return Err(CartError::StockExceeded {
                        product_id,
                        requested: 1,
                        available: 0,
                        context: StockContext::NewItem,
                    });
                }
                self.items.push(LineItem::new(
                    product_id,
                    name.to_string(),
                    unit_price,
                    stock_ceiling,
                ));
                1
            }
        };

        debug!("Product {} now has quantity {}", product_id, quantity);
        self.render();
        Ok(quantity)
    }

    /// Add from the text attributes of a catalog card.
    pub fn add_card(&mut self, card: &ProductCard) -> Result<u32, CartError> {
        let product_id: ProductId = card.id.parse()?;
        let stock_ceiling = parse_stock(&card.stock)?;
        self.add(product_id, &card.name, &card.price, stock_ceiling)
    }

    /// Set a line's quantity.
    ///
    /// Absent products and quantities below one are ignored without a
    /// notice; a decrement at quantity one therefore keeps the line.
    pub fn set_quantity(&mut self, product_id: ProductId, new_quantity: i64) -> Result<(), CartError> {
        let Some(item) = self.items.get_mut(product_id) else {
            debug!("Ignoring quantity change for product {} not in cart", product_id);
            return Ok(());
        };

        if new_quantity <= 0 {
            debug!("Ignoring non-positive quantity {} for product {}", new_quantity, product_id);
            return Ok(());
        }

        if new_quantity > i64::from(item.stock_ceiling) {
            warn!(
                "Rejected quantity {} for product {}: stock {}",
                new_quantity, product_id, item.stock_ceiling
            );
            return Err(CartError::StockExceeded {
                product_id,
                requested: new_quantity as u64,
                available: item.stock_ceiling,
                context: StockContext::SetQuantity,
            });
        }

        // Bounded by the stock ceiling above, so it fits in a u32.
        item.quantity = new_quantity as u32;
        self.render();
        Ok(())
    }

    /// Quantity typed as text into a line's number input.
    pub fn set_quantity_text(&mut self, product_id: ProductId, text: &str) -> Result<(), CartError> {
        let quantity = parse_quantity(text)?;
        self.set_quantity(product_id, quantity)
    }

    pub fn increment(&mut self, product_id: ProductId) -> Result<(), CartError> {
        match self.items.get(product_id).map(|item| item.quantity) {
            Some(current) => self.set_quantity(product_id, i64::from(current) + 1),
            None => Ok(()),
        }
    }

    pub fn decrement(&mut self, product_id: ProductId) -> Result<(), CartError> {
        match self.items.get(product_id).map(|item| item.quantity) {
            Some(current) => self.set_quantity(product_id, i64::from(current) - 1),
            None => Ok(()),
        }
    }

    /// Drop a product's line. Returns whether anything was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let removed = self.items.remove(product_id).is_some();
        if removed {
            info!("Removed product {} from cart", product_id);
        }
        self.render();
        removed
    }

    /// Empty the cart after confirmation. An empty cart is left alone and
    /// no prompt is shown.
    pub fn clear(&mut self, confirmation: &dyn Confirmation) -> Result<bool, CartError> {
        if self.items.is_empty() {
            return Ok(false);
        }

        if !confirmation.confirm("Are you sure you want to clear the cart?")? {
            debug!("Cart clear cancelled");
            return Ok(false);
        }

        self.items.clear();
        self.render();
        info!("Cart cleared");
        Ok(true)
    }

    /// Confirm the sale total and produce the form to submit.
    ///
    /// Returns `None` when the cart is empty (checkout is disabled) or the
    /// cashier declines.
    pub fn checkout(&self, confirmation: &dyn Confirmation) -> Result<Option<SaleForm>, CartError> {
        if !self.view.checkout_enabled {
            debug!("Checkout requested on an empty cart");
            return Ok(None);
        }

        let total = self.total();
        let prompt = format!("Confirm cash sale for {}?", format_money(total));
        if !confirmation.confirm(&prompt)? {
            debug!("Checkout cancelled");
            return Ok(None);
        }

        info!("Checkout confirmed: {} lines, total {}", self.items.len(), total);
        Ok(Some(SaleForm {
            carrito_data: self.view.hidden_field.clone(),
            metodo_pago: PAYMENT_METHOD_CASH.to_string(),
            total,
            cashier: self.cashier.clone(),
        }))
    }

    fn render(&mut self) {
        let lines: Vec<LineView> = self.items.iter().map(LineView::from).collect();
        let total: Decimal = lines.iter().map(|line| line.subtotal).sum();

        let hidden_field = serde_json::to_string(&self.items).unwrap_or_else(|e| {
            error!("Failed to serialize cart: {}", e);
            "[]".to_string()
        });

        self.view = CartView {
            empty_message: lines.is_empty().then_some(EMPTY_CART_MESSAGE),
            checkout_enabled: !lines.is_empty(),
            lines,
            subtotal: total,
            total,
            hidden_field,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::confirmation::PresetConfirmation;

    fn widget_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add(ProductId(7), "Widget", "10.50", 3).unwrap();
        cart
    }

    #[test]
    fn test_new_cart_is_empty() {
        let cart = Cart::new();
        assert_eq!(cart.state(), CartState::Empty);
        assert!(!cart.view().checkout_enabled);
        assert_eq!(cart.view().empty_message, Some(EMPTY_CART_MESSAGE));
        assert_eq!(cart.view().hidden_field, "[]");
    }

    #[test]
    fn test_widget_scenario() {
        let mut cart = widget_cart();
        assert_eq!(cart.items().len(), 1);
        assert_eq!(format_money(cart.view().total), "$10.50");
        assert_eq!(cart.state(), CartState::NonEmpty);

        assert_eq!(cart.add(ProductId(7), "Widget", "10.50", 3).unwrap(), 2);
        assert_eq!(format_money(cart.view().total), "$21.00");

        let err = cart.set_quantity(ProductId(7), 5).unwrap_err();
        assert!(matches!(
            err,
            CartError::StockExceeded { requested: 5, available: 3, .. }
        ));
        assert_eq!(cart.items().get(ProductId(7)).unwrap().quantity, 2);

        assert!(cart.remove(ProductId(7)));
        assert!(cart.items().is_empty());
        assert_eq!(cart.state(), CartState::Empty);
        assert!(!cart.view().checkout_enabled);
    }

    #[test]
    fn test_repeated_adds_merge_up_to_stock() {
        let mut cart = Cart::new();
        let mut successes = 0;
        for _ in 0..5 {
            if cart.add(ProductId(1), "Cable", "2.00", 3).is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 3);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items().get(ProductId(1)).unwrap().quantity, 3);

        let err = cart.add(ProductId(1), "Cable", "2.00", 3).unwrap_err();
        assert_eq!(err.to_string(), "No more stock available for this product");
    }

    #[test]
    fn test_merge_with_changed_ceiling_keeps_quantity_within_stock() {
        let mut cart = Cart::new();
        cart.add(ProductId(7), "Widget", "10.50", 1).unwrap();
        assert_eq!(cart.add(ProductId(7), "Widget", "10.50", 5).unwrap(), 2);

        let item = cart.items().get(ProductId(7)).unwrap();
        assert_eq!(item.stock_ceiling, 5);
        assert!(item.quantity <= item.stock_ceiling);

        cart.add(ProductId(7), "Widget", "10.50", 5).unwrap();
        let err = cart.add(ProductId(7), "Widget", "10.50", 2).unwrap_err();
        assert!(matches!(err, CartError::StockExceeded { available: 2, .. }));

        let item = cart.items().get(ProductId(7)).unwrap();
        assert_eq!(item.quantity, 3);
        assert!(item.quantity <= item.stock_ceiling);
        assert!(cart.view().hidden_field.contains(r#""cantidad":3,"stock_disponible":5"#));
    }

    #[test]
    fn test_add_rejects_malformed_price() {
        let mut cart = Cart::new();
        let err = cart.add(ProductId(1), "Cable", "abc", 3).unwrap_err();

        assert!(matches!(err, CartError::InvalidInput { .. }));
        assert!(cart.items().is_empty());
        assert_eq!(cart.view().hidden_field, "[]");
    }

    #[test]
    fn test_add_rejects_zero_stock() {
        let mut cart = Cart::new();
        let err = cart.add(ProductId(9), "Sold out", "5.00", 0).unwrap_err();

        assert!(matches!(
            err,
            CartError::StockExceeded { available: 0, context: StockContext::NewItem, .. }
        ));
        assert_eq!(cart.state(), CartState::Empty);
    }

    #[test]
    fn test_add_card_parses_attributes() {
        let mut cart = Cart::new();
        let card = ProductCard {
            id: "12".to_string(),
            name: "Keyboard".to_string(),
            price: "25,00".to_string(),
            stock: "2".to_string(),
        };
        assert_eq!(cart.add_card(&card).unwrap(), 1);
        assert_eq!(cart.total(), Decimal::from(25));

        let bad = ProductCard {
            stock: "lots".to_string(),
            ..card
        };
        assert!(matches!(cart.add_card(&bad), Err(CartError::InvalidInput { .. })));
        assert_eq!(cart.items().get(ProductId(12)).unwrap().quantity, 1);
    }

    #[test]
    fn test_set_quantity_bounds() {
        let mut cart = widget_cart();

        cart.set_quantity(ProductId(7), 3).unwrap();
        assert_eq!(cart.items().get(ProductId(7)).unwrap().quantity, 3);

        cart.set_quantity(ProductId(7), 0).unwrap();
        cart.set_quantity(ProductId(7), -4).unwrap();
        assert_eq!(cart.items().get(ProductId(7)).unwrap().quantity, 3);

        // Unknown products are ignored.
        cart.set_quantity(ProductId(99), 2).unwrap();
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_decrement_at_one_keeps_line() {
        let mut cart = widget_cart();
        cart.decrement(ProductId(7)).unwrap();

        let item = cart.items().get(ProductId(7)).unwrap();
        assert_eq!(item.quantity, 1);

        cart.increment(ProductId(7)).unwrap();
        cart.increment(ProductId(7)).unwrap();
        assert!(cart.increment(ProductId(7)).is_err());
        assert_eq!(cart.items().get(ProductId(7)).unwrap().quantity, 3);
    }

    #[test]
    fn test_set_quantity_text_rejects_garbage() {
        let mut cart = widget_cart();
        let err = cart.set_quantity_text(ProductId(7), "two").unwrap_err();
        assert_eq!(err.to_string(), "Invalid quantity: 'two'");
        assert_eq!(cart.items().get(ProductId(7)).unwrap().quantity, 1);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let mut cart = Cart::new();
        cart.add(ProductId(1), "A", "1.25", 10).unwrap();
        cart.add(ProductId(2), "B", "3.10", 10).unwrap();
        cart.set_quantity(ProductId(1), 4).unwrap();
        assert_eq!(cart.view().total, Decimal::new(810, 2));

        cart.remove(ProductId(2));
        assert_eq!(cart.view().total, Decimal::from(5));
        assert_eq!(cart.view().subtotal, cart.view().total);
        assert_eq!(cart.view().lines.len(), 1);
        assert_eq!(cart.view().lines[0].subtotal, Decimal::from(5));
    }

    #[test]
    fn test_hidden_field_mirrors_items() {
        let cart = widget_cart();
        let json: serde_json::Value = serde_json::from_str(&cart.view().hidden_field).unwrap();
        assert_eq!(json[0]["producto_id"], 7);
        assert_eq!(json[0]["cantidad"], 1);
        assert_eq!(json[0]["stock_disponible"], 3);
    }

    #[test]
    fn test_clear_on_empty_cart_never_prompts() {
        for confirmation in [PresetConfirmation::accept(), PresetConfirmation::decline()] {
            let mut cart = Cart::new();
            assert!(!cart.clear(&confirmation).unwrap());
            assert!(confirmation.prompts().is_empty());
            assert_eq!(cart.state(), CartState::Empty);
        }
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut cart = widget_cart();

        assert!(!cart.clear(&PresetConfirmation::decline()).unwrap());
        assert_eq!(cart.items().len(), 1);

        assert!(cart.clear(&PresetConfirmation::accept()).unwrap());
        assert_eq!(cart.state(), CartState::Empty);
        assert_eq!(cart.view().hidden_field, "[]");
    }

    #[test]
    fn test_checkout_prompts_with_total() {
        let mut cart = Cart::with_cashier(Some("caja1".to_string()));
        cart.add(ProductId(7), "Widget", "10.50", 3).unwrap();
        cart.add(ProductId(7), "Widget", "10.50", 3).unwrap();

        let confirmation = PresetConfirmation::accept();
        let form = cart.checkout(&confirmation).unwrap().unwrap();

        assert_eq!(confirmation.prompts(), vec!["Confirm cash sale for $21.00?".to_string()]);
        assert_eq!(form.metodo_pago, "efectivo");
        assert_eq!(form.total, Decimal::from(21));
        assert_eq!(form.carrito_data, cart.view().hidden_field);
        assert_eq!(form.cashier.as_deref(), Some("caja1"));
    }

    #[test]
    fn test_checkout_disabled_or_declined() {
        let confirmation = PresetConfirmation::accept();
        assert!(Cart::new().checkout(&confirmation).unwrap().is_none());
        assert!(confirmation.prompts().is_empty());

        let cart = widget_cart();
        assert!(cart.checkout(&PresetConfirmation::decline()).unwrap().is_none());
    }
}
