use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ProductId)
            .map_err(|_| InputError::new("product id", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u64);

impl std::fmt::Display for ServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ServiceId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(ServiceId)
            .map_err(|_| InputError::new("service id", s))
    }
}

/// A row of the inventory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: Option<String>,
    #[serde(rename = "precio")]
    pub price: Decimal,
    #[serde(rename = "cantidad_stock", default)]
    pub stock: u32,
}

impl Product {
    /// The attributes a catalog entry exposes to the register, as text.
    pub fn card(&self) -> ProductCard {
        ProductCard {
            id: self.id.to_string(),
            name: self.name.clone(),
            price: format!("{:.2}", self.price),
            stock: self.stock.to_string(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }
}

/// A service offered by the shop. Its cost is the fixed part of a quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "costo")]
    pub cost: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuotedServiceId(pub u64);

impl std::fmt::Display for QuotedServiceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuoteStatus {
    /// Quoted and waiting for payment.
    #[default]
    #[serde(rename = "cotizado")]
    Quoted,
    #[serde(rename = "pagado")]
    Paid,
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteStatus::Quoted => write!(f, "quoted"),
            QuoteStatus::Paid => write!(f, "paid"),
        }
    }
}

/// A quote issued to a customer, from creation until it is paid at the
/// counter. Amounts are the ones fixed when the quote was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotedService {
    pub id: QuotedServiceId,
    #[serde(rename = "servicio_id")]
    pub service_id: ServiceId,
    /// Filled from the services table when the catalog loads.
    #[serde(skip)]
    pub service_name: String,
    #[serde(rename = "nombre_cliente")]
    pub customer_name: String,
    #[serde(rename = "precio_servicio")]
    pub service_price: Decimal,
    #[serde(rename = "precio_productos", default)]
    pub products_price: Decimal,
    #[serde(rename = "precio_total")]
    pub total: Decimal,
    #[serde(rename = "estado", default)]
    pub status: QuoteStatus,
    #[serde(rename = "fecha_creacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "fecha_pago", default)]
    pub paid_at: Option<DateTime<Utc>>,
}

impl QuotedService {
    pub fn is_paid(&self) -> bool {
        self.status == QuoteStatus::Paid
    }
}

/// Text attributes attached to a catalog affordance (`data-id`,
/// `data-nombre`, `data-precio`, `data-stock`). Nothing here is trusted
/// until the managers parse it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub stock: String,
}
