use chrono::{DateTime, Local, Utc};
use console::style;
use rust_decimal::Decimal;
use tabled::{Table, Tabled, settings::{Style, Alignment}};

use crate::models::{CartView, FormSubmission, LineView, Product, QuoteView, QuotedService, Service};

#[derive(Tabled)]
struct LineTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Product")]
    name: String,
    #[tabled(rename = "Unit price")]
    unit_price: String,
    #[tabled(rename = "Qty")]
    quantity: String,
    #[tabled(rename = "Subtotal")]
    subtotal: String,
}

#[derive(Tabled)]
struct ProductTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Stock")]
    stock: String,
}

#[derive(Tabled)]
struct ServiceTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Cost")]
    cost: String,
}

#[derive(Tabled)]
struct QuotedServiceTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Customer")]
    customer: String,
    #[tabled(rename = "Service")]
    service: String,
    #[tabled(rename = "Service price")]
    service_price: String,
    #[tabled(rename = "Products")]
    products_price: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Date")]
    date: String,
}

/// `$` followed by the amount rounded to cents.
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

fn format_lines(lines: &[LineView]) -> String {
    let rows: Vec<LineTableRow> = lines
        .iter()
        .map(|line| LineTableRow {
            id: line.product_id.to_string(),
            name: truncate(&line.name, 30),
            unit_price: format!("{} ea.", format_money(line.unit_price)),
            quantity: format!("{} / {}", line.quantity, line.stock_ceiling),
            subtotal: format_money(line.subtotal),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

pub fn format_cart_view(view: &CartView) -> String {
    let mut output = String::new();

    match view.empty_message {
        Some(message) => output.push_str(&format!("{}\n", style(message).dim())),
        None => output.push_str(&format!("{}\n", format_lines(&view.lines))),
    }

    output.push_str(&format!("{}: {}\n", style("Subtotal").bold(), format_money(view.subtotal)));
    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_money(view.total)).cyan().bold()
    ));

    let checkout = if view.checkout_enabled {
        style("enabled").green()
    } else {
        style("disabled").dim()
    };
    output.push_str(&format!("{}: {}\n", style("Checkout").bold(), checkout));

    output
}

pub fn format_quote_view(view: &QuoteView) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", style("Service").bold(), style(&view.service_name).green()));
    match view.empty_message {
        Some(message) => output.push_str(&format!("{}\n", style(message).dim())),
        None => output.push_str(&format!("{}\n", format_lines(&view.lines))),
    }

    output.push_str(&format!("{}: {}\n", style("Service price").bold(), format_money(view.service_price)));
    output.push_str(&format!("{}: {}\n", style("Products").bold(), format_money(view.products_total)));
    output.push_str(&format!(
        "{}: {}\n",
        style("Total").bold(),
        style(format_money(view.total)).cyan().bold()
    ));

    output
}

pub fn format_product_table(products: &[Product]) -> String {
    if products.is_empty() {
        return String::new();
    }

    let rows: Vec<ProductTableRow> = products
        .iter()
        .map(|product| ProductTableRow {
            id: product.id.to_string(),
            name: truncate(&product.name, 30),
            description: product
                .description
                .as_deref()
                .map(|d| truncate(d, 40))
                .unwrap_or_else(|| "-".to_string()),
            price: format_money(product.price),
            stock: if product.is_available() {
                product.stock.to_string()
            } else {
                style("out of stock").red().to_string()
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

pub fn format_service_table(services: &[Service]) -> String {
    if services.is_empty() {
        return String::new();
    }

    let rows: Vec<ServiceTableRow> = services
        .iter()
        .map(|service| ServiceTableRow {
            id: service.id.to_string(),
            name: truncate(&service.name, 30),
            description: truncate(&service.description, 40),
            cost: format_money(service.cost),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

/// Pending quotes show their creation date, paid ones their payment date.
pub fn format_quoted_service_table(quotes: &[QuotedService]) -> String {
    if quotes.is_empty() {
        return String::new();
    }

    let rows: Vec<QuotedServiceTableRow> = quotes
        .iter()
        .map(|quote| QuotedServiceTableRow {
            id: quote.id.to_string(),
            customer: truncate(&quote.customer_name, 30),
            service: truncate(&quote.service_name, 30),
            service_price: format_money(quote.service_price),
            products_price: format_money(quote.products_price),
            total: format_money(quote.total),
            date: match quote.paid_at {
                Some(paid_at) if quote.is_paid() => format_date(&paid_at),
                _ => format_date(&quote.created_at),
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Alignment::left());

    table.to_string()
}

pub fn format_submission(submission: &FormSubmission) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}: {}\n", style("Form").bold(), style(&submission.id).cyan()));
    output.push_str(&format!(
        "{}: {} {}\n",
        style("Action").bold(),
        submission.method,
        style(&submission.action).green()
    ));
    for (name, value) in &submission.fields {
        output.push_str(&format!("  {}: {}\n", style(name).dim(), truncate(value, 60)));
    }
    output.push_str(&format!(
        "{}: {}\n",
        style("Submitted").bold(),
        style(format_date(&submission.submitted_at)).dim()
    ));

    output
}

pub fn format_date(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductId;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::new(1050, 2)), "$10.50");
        assert_eq!(format_money(Decimal::from(21)), "$21.00");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::new(33335, 4)), "$3.33");
    }

    #[test]
    fn test_truncate_long_names() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
    }

    #[test]
    fn test_product_table_lists_rows() {
        let products = vec![Product {
            id: ProductId(3),
            name: "Charger".to_string(),
            description: None,
            price: Decimal::new(2500, 2),
            stock: 2,
        }];

        let table = format_product_table(&products);
        assert!(table.contains("Charger"));
        assert!(table.contains("$25.00"));
        assert!(format_product_table(&[]).is_empty());
    }
}
