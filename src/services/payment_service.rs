use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    models::{QuoteStatus, QuotedService, QuotedServiceId, ServicePaymentForm},
    services::confirmation::Confirmation,
    utils::formatting::format_money,
};

#[derive(Error, Debug)]
pub enum PaymentError {
    #[error("Quote {id} not found")]
    QuoteNotFound { id: QuotedServiceId },

    #[error("Quote {id} has already been paid")]
    AlreadyPaid { id: QuotedServiceId },

    #[error("Confirmation prompt failed: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Counter where quoted services are paid in cash.
///
/// Holds the quotes shown on the payment screen. A quote only moves to
/// paid once its payment form was delivered, see [`PaymentDesk::mark_paid`].
#[derive(Debug, Clone, Default)]
pub struct PaymentDesk {
    quotes: Vec<QuotedService>,
}

impl PaymentDesk {
    pub fn new(quotes: Vec<QuotedService>) -> Self {
        Self { quotes }
    }

    pub fn quotes(&self) -> &[QuotedService] {
        &self.quotes
    }

    pub fn pending(&self) -> Vec<&QuotedService> {
        self.quotes.iter().filter(|q| !q.is_paid()).collect()
    }

    /// Ask for confirmation of the quote's total and produce the payment
    /// form. `None` if the cashier declines.
    pub fn pay(
        &self,
        id: QuotedServiceId,
        confirmation: &dyn Confirmation,
    ) -> Result<Option<ServicePaymentForm>, PaymentError> {
        let quote = self
            .quotes
            .iter()
            .find(|q| q.id == id)
            .ok_or(PaymentError::QuoteNotFound { id })?;

        if quote.is_paid() {
            return Err(PaymentError::AlreadyPaid { id });
        }

        let prompt = format!(
            "Are you sure you want to process the cash payment of {}?\n\nThis action cannot be undone.",
            format_money(quote.total)
        );
        if !confirmation.confirm(&prompt)? {
            debug!("Payment of quote {} cancelled", id);
            return Ok(None);
        }

        info!("Payment of quote {} confirmed: {}", id, quote.total);
        Ok(Some(ServicePaymentForm {
            quote_id: id,
            total: quote.total,
        }))
    }

    /// Record a delivered payment. Returns whether the quote was pending.
    pub fn mark_paid(&mut self, id: QuotedServiceId, paid_at: DateTime<Utc>) -> bool {
        match self.quotes.iter_mut().find(|q| q.id == id && !q.is_paid()) {
            Some(quote) => {
                quote.status = QuoteStatus::Paid;
                quote.paid_at = Some(paid_at);
                true
            }
            None => false,
        }
    }
}
