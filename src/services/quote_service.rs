use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use validator::Validate;

use crate::{
    models::{
        LineItem, LineItems, LineView, ProductCard, ProductId, QuoteForm, QuoteView, Service,
        ServiceId, EMPTY_QUOTE_MESSAGE,
    },
    services::{
        cart_service::{CartError, CartState, StockContext},
        confirmation::Confirmation,
    },
    utils::{
        formatting::format_money,
        validation::{parse_price, parse_quantity, parse_stock},
    },
};

/// Element of the hidden `productos_json` field.
#[derive(Debug, Serialize)]
struct QuotedProduct {
    producto_id: ProductId,
    cantidad: u32,
}

/// Quote for one service plus add-on products.
///
/// Same contract as the register cart, except that the service cost is a
/// fixed amount added on top of the product lines and `add` takes an
/// explicit quantity that is checked against stock up front.
#[derive(Debug, Clone)]
pub struct Quote {
    service_id: ServiceId,
    service_name: String,
    service_price: Decimal,
    items: LineItems,
    view: QuoteView,
}

impl Quote {
    pub fn new(service: &Service) -> Self {
        let mut quote = Self {
            service_id: service.id,
            service_name: service.name.clone(),
            service_price: service.cost,
            items: LineItems::new(),
            view: QuoteView {
                service_name: service.name.clone(),
                lines: Vec::new(),
                empty_message: Some(EMPTY_QUOTE_MESSAGE),
                service_price: service.cost,
                products_total: Decimal::ZERO,
                total: service.cost,
                hidden_field: "[]".to_string(),
            },
        };
        quote.render();
        quote
    }

    pub fn service_id(&self) -> ServiceId {
        self.service_id
    }

    pub fn items(&self) -> &LineItems {
        &self.items
    }

    pub fn view(&self) -> &QuoteView {
        &self.view
    }

    pub fn state(&self) -> CartState {
        if self.items.is_empty() {
            CartState::Empty
        } else {
            CartState::NonEmpty
        }
    }

    pub fn products_total(&self) -> Decimal {
        self.items.total()
    }

    pub fn total(&self) -> Decimal {
        self.service_price + self.products_total()
    }

    /// Add `quantity_text` units of the selected product.
    ///
    /// `selected` is `None` when nothing is chosen in the product picker.
    /// Returns the line's quantity after the addition.
    pub fn add(&mut self, selected: Option<&ProductCard>, quantity_text: &str) -> Result<u32, CartError> {
        let card = match selected {
            Some(card) if !card.id.trim().is_empty() => card,
            _ => {
                return Err(CartError::InvalidInput {
                    message: "Please select a product".to_string(),
                })
            }
        };

        let requested = parse_quantity(quantity_text)?;
        if requested <= 0 {
            return Err(CartError::InvalidInput {
                message: "Quantity must be greater than 0".to_string(),
            });
        }

        let product_id: ProductId = card.id.parse()?;
        let stock = parse_stock(&card.stock)?;
        let unit_price = parse_price(&card.price)?;

        if requested > i64::from(stock) {
            warn!(
                "Rejected {} units of product {} for quote: stock {}",
                requested, product_id, stock
            );
            return Err(CartError::StockExceeded {
                product_id,
                requested: requested as u64,
                available: stock,
                context: StockContext::NewItem,
            });
        }
        // Bounded by the stock check above.
        let requested = requested as u32;

        let quantity = match self.items.get_mut(product_id) {
            Some(item) => {
                let combined = item.quantity.saturating_add(requested);
                if combined > stock {
                    warn!(
                        "Rejected top-up of product {} to {}: stock {}",
                        product_id, combined, stock
                    );
                    return Err(CartError::StockExceeded {
                        product_id,
                        requested: u64::from(combined),
                        available: stock,
                        context: StockContext::TopUp {
                            already_added: item.quantity,
                        },
                    });
                }
                item.quantity = combined;
                item.stock_ceiling = stock;
                combined
            }
            None => {
                let mut item = LineItem::new(product_id, card.name.clone(), unit_price, stock);
                item.quantity = requested;
                self.items.push(item);
                requested
            }
        };

        debug!("Quote product {} now has quantity {}", product_id, quantity);
        self.render();
        Ok(quantity)
    }

    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let removed = self.items.remove(product_id).is_some();
        if removed {
            info!("Removed product {} from quote", product_id);
        }
        self.render();
        removed
    }

    pub fn clear(&mut self, confirmation: &dyn Confirmation) -> Result<bool, CartError> {
        if self.items.is_empty() {
            return Ok(false);
        }

        if !confirmation.confirm("Remove all products from this quote?")? {
            return Ok(false);
        }

        self.items.clear();
        self.render();
        info!("Quote products cleared");
        Ok(true)
    }

    /// Validate the customer, confirm the total and produce the quote form.
    /// Quotes without add-on products are allowed.
    pub fn submit(
        &self,
        customer_name: &str,
        confirmation: &dyn Confirmation,
    ) -> Result<Option<QuoteForm>, CartError> {
        let form = QuoteForm {
            service_id: self.service_id,
            nombre_cliente: customer_name.trim().to_string(),
            productos_json: self.view.hidden_field.clone(),
            total: self.total(),
        };

        form.validate().map_err(|e| {
            debug!("Quote form rejected: {}", e);
            CartError::InvalidInput {
                message: "Please enter the customer name".to_string(),
            }
        })?;

        let prompt = format!(
            "Create quote for {} totalling {}?",
            form.nombre_cliente,
            format_money(form.total)
        );
        if !confirmation.confirm(&prompt)? {
            debug!("Quote submission cancelled");
            return Ok(None);
        }

        info!(
            "Quote for service '{}' confirmed: {} products, total {}",
            self.service_name,
            self.items.len(),
            form.total
        );
        Ok(Some(form))
    }

    fn render(&mut self) {
        let lines: Vec<LineView> = self.items.iter().map(LineView::from).collect();
        let products_total: Decimal = lines.iter().map(|line| line.subtotal).sum();

        let payload: Vec<QuotedProduct> = self
            .items
            .iter()
            .map(|item| QuotedProduct {
                producto_id: item.product_id,
                cantidad: item.quantity,
            })
            .collect();
        let hidden_field = serde_json::to_string(&payload).unwrap_or_else(|e| {
            error!("Failed to serialize quote products: {}", e);
            "[]".to_string()
        });

        self.view = QuoteView {
            service_name: self.service_name.clone(),
            empty_message: lines.is_empty().then_some(EMPTY_QUOTE_MESSAGE),
            lines,
            service_price: self.service_price,
            products_total,
            total: self.service_price + products_total,
            hidden_field,
        };
    }
}
