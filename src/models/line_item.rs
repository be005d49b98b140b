use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::ProductId;

/// One product entry of a cart or quote.
///
/// Field names follow the hidden `carrito_data` field the sales endpoint
/// reads, so serializing the collection yields the submitted payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "producto_id")]
    pub product_id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precio", with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
    #[serde(rename = "stock_disponible")]
    pub stock_ceiling: u32,
}

impl LineItem {
    pub fn new(product_id: ProductId, name: String, unit_price: Decimal, stock_ceiling: u32) -> Self {
        Self {
            product_id,
            name,
            unit_price,
            quantity: 1,
            stock_ceiling,
        }
    }

    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Ordered, id-unique collection of line items.
///
/// Mutation is crate-private: the cart and quote managers are the only
/// places allowed to change quantities, and they enforce the stock ceiling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LineItems {
    items: Vec<LineItem>,
}

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    pub fn get(&self, product_id: ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn contains(&self, product_id: ProductId) -> bool {
        self.get(product_id).is_some()
    }

    /// Sum of every item's subtotal, computed on demand.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    pub(crate) fn get_mut(&mut self, product_id: ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.product_id == product_id)
    }

    pub(crate) fn push(&mut self, item: LineItem) {
        debug_assert!(!self.contains(item.product_id), "duplicate line item {}", item.product_id);
        self.items.push(item);
    }

    pub(crate) fn remove(&mut self, product_id: ProductId) -> Option<LineItem> {
        let index = self.items.iter().position(|item| item.product_id == product_id)?;
        Some(self.items.remove(index))
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a> IntoIterator for &'a LineItems {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, price: Decimal, quantity: u32) -> LineItem {
        LineItem {
            product_id: ProductId(id),
            name: format!("Product {}", id),
            unit_price: price,
            quantity,
            stock_ceiling: 10,
        }
    }

    #[test]
    fn test_total_sums_subtotals() {
        let mut items = LineItems::new();
        items.push(item(1, Decimal::new(1050, 2), 2));
        items.push(item(2, Decimal::new(199, 2), 3));

        assert_eq!(items.total(), Decimal::new(2697, 2));
    }

    #[test]
    fn test_remove_keeps_insertion_order() {
        let mut items = LineItems::new();
        for id in 1..=3 {
            items.push(item(id, Decimal::ONE, 1));
        }

        assert!(items.remove(ProductId(2)).is_some());
        assert!(items.remove(ProductId(2)).is_none());

        let ids: Vec<u64> = items.iter().map(|i| i.product_id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_serializes_as_hidden_field_array() {
        let mut items = LineItems::new();
        items.push(item(7, Decimal::new(1050, 2), 2));

        let json = serde_json::to_value(&items).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{
                "producto_id": 7,
                "nombre": "Product 7",
                "precio": 10.5,
                "cantidad": 2,
                "stock_disponible": 10
            }])
        );
    }
}
