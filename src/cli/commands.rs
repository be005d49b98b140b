use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use console::{style, Emoji};
use dialoguer::{Input, Select, theme::ColorfulTheme};

use tracing::{error, info, warn};

use crate::{
    catalog::{
        Catalog,
        repositories::{
            CatalogProductRepository, CatalogQuotedServiceRepository, CatalogServiceRepository,
            ProductRepository, QuotedServiceRepository, ServiceRepository,
        },
    },
    cli::{args::*, prompt::TerminalConfirmation},
    models::{
        FormSubmission, Product, ProductEditForm, ProductId, QuoteStatus, Service, ServiceEditForm,
        ServiceId,
    },
    services::{
        Cart, CartError, Confirmation, FormTarget, OutboxFormTarget, PaymentDesk, PresetConfirmation,
        Quote, StdoutFormTarget, TableRow, TableSelection,
    },
    utils::{
        formatting::{
            format_cart_view, format_money, format_product_table, format_quote_view,
            format_quoted_service_table, format_service_table, format_submission,
        },
        validation::{parse_price, parse_stock},
        Config,
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "");

/// Edit dialog fields that can be filled in at the terminal.
pub trait PromptEdit: Sized {
    fn prompt(self, theme: &ColorfulTheme) -> Result<Self>;
}

impl PromptEdit for ProductEditForm {
    fn prompt(mut self, theme: &ColorfulTheme) -> Result<Self> {
        self.nombre = Input::with_theme(theme)
            .with_prompt("Name")
            .with_initial_text(self.nombre.clone())
            .interact_text()?;

        self.descripcion = Input::with_theme(theme)
            .with_prompt("Description")
            .with_initial_text(self.descripcion.clone())
            .allow_empty(true)
            .interact_text()?;

        self.precio = Input::with_theme(theme)
            .with_prompt("Price")
            .with_initial_text(self.precio.clone())
            .validate_with(|input: &String| -> Result<(), &str> {
                parse_price(input)
                    .map(|_| ())
                    .map_err(|_| "Enter a price like 12.50")
            })
            .interact_text()?;

        self.cantidad_stock = Input::with_theme(theme)
            .with_prompt("Quantity in stock")
            .with_initial_text(self.cantidad_stock.clone())
            .validate_with(|input: &String| -> Result<(), &str> {
                parse_stock(input)
                    .map(|_| ())
                    .map_err(|_| "Stock must be a whole number of 0 or more")
            })
            .interact_text()?;

        Ok(self)
    }
}

impl PromptEdit for ServiceEditForm {
    fn prompt(mut self, theme: &ColorfulTheme) -> Result<Self> {
        self.nombre = Input::with_theme(theme)
            .with_prompt("Name")
            .with_initial_text(self.nombre.clone())
            .interact_text()?;

        self.descripcion = Input::with_theme(theme)
            .with_prompt("Description")
            .with_initial_text(self.descripcion.clone())
            .allow_empty(true)
            .interact_text()?;

        self.costo_servicio = Input::with_theme(theme)
            .with_prompt("Price")
            .with_initial_text(self.costo_servicio.clone())
            .validate_with(|input: &String| -> Result<(), &str> {
                parse_price(input)
                    .map(|_| ())
                    .map_err(|_| "Enter a price like 150.00")
            })
            .interact_text()?;

        Ok(self)
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum RowAction {
    Edit,
    Delete,
    Quote,
    Back,
}

impl RowAction {
    fn label(self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
            RowAction::Quote => "Quote",
            RowAction::Back => "Back",
        }
    }
}

fn show_notice(e: &CartError) {
    match e {
        CartError::Internal(inner) => {
            println!("{} {}", CROSS, style(e).red());
            error!("Prompt failed: {}", inner);
        }
        _ => {
            println!("{} {}", WARNING, style(e).yellow());
            warn!("Rejected: {}", e);
        }
    }
}

pub struct CliApp {
    config: Config,
    product_repository: Arc<dyn ProductRepository>,
    service_repository: Arc<dyn ServiceRepository>,
    quote_repository: Arc<dyn QuotedServiceRepository>,
    form_target: Arc<dyn FormTarget>,
    confirmation: Box<dyn Confirmation>,
    theme: ColorfulTheme,
}

impl CliApp {
    pub async fn new(config: Config, assume_yes: bool) -> Result<Self> {
        let catalog = Catalog::from_path(&config.catalog_path)
            .await
            .context("Failed to load catalog")?;

        let health = catalog.health_check();
        info!(
            "Catalog health: {} products ({} out of stock), {} services, {} quotes awaiting payment",
            health.products, health.out_of_stock, health.services, health.pending_quotes
        );

        let form_target: Arc<dyn FormTarget> = match &config.outbox_path {
            Some(path) => Arc::new(OutboxFormTarget::new(path)),
            None => Arc::new(StdoutFormTarget),
        };

        let confirmation: Box<dyn Confirmation> = if assume_yes {
            Box::new(PresetConfirmation::accept())
        } else {
            Box::new(TerminalConfirmation::new())
        };

        Ok(Self {
            product_repository: Arc::new(CatalogProductRepository::new(&catalog)),
            service_repository: Arc::new(CatalogServiceRepository::new(&catalog)),
            quote_repository: Arc::new(CatalogQuotedServiceRepository::new(&catalog)),
            form_target,
            confirmation,
            config,
            theme: ColorfulTheme::default(),
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Sell => self.handle_sell().await,
            Commands::Quote { service_id } => self.handle_quote(ServiceId(service_id)).await,
            Commands::Inventory => self.handle_inventory().await,
            Commands::Services => self.handle_services().await,
            Commands::Payments { search, paid } => self.handle_payments(search, paid).await,
            Commands::Products { search, available } => self.handle_products(search, available).await,
        }
    }

    fn read_line(&self, prompt: &str) -> Result<String> {
        let line: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(line)
    }

    async fn submit_form(&self, submission: &FormSubmission) -> Result<bool> {
        match self.form_target.submit(submission).await {
            Ok(()) => {
                println!("{} Form submitted", CHECKMARK);
                println!("{}", format_submission(submission));
                info!("Submitted form {} to {}", submission.id, submission.action);
                Ok(true)
            }
            Err(e) => {
                println!("{} Failed to submit form: {}", CROSS, style(&e).red());
                error!("Failed to submit form {}: {}", submission.id, e);
                Ok(false)
            }
        }
    }

    // Register
    async fn handle_sell(&self) -> Result<()> {
        println!("{} {}", ROCKET, style("Register").bold().cyan());
        println!("Type {} to list the register commands", style("help").cyan());

        let mut cart = Cart::with_cashier(self.config.cashier.clone());
        println!("{}", format_cart_view(cart.view()));

        loop {
            let line = self.read_line("register")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match SaleLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    e.print()?;
                    continue;
                }
            };

            match command {
                SaleCommand::Add { id } => self.handle_sell_add(&mut cart, ProductId(id)).await?,
                SaleCommand::Qty { id, quantity } => {
                    let result = cart.set_quantity_text(ProductId(id), &quantity);
                    self.show_cart_result(result, &cart);
                }
                SaleCommand::Inc { id } => {
                    let result = cart.increment(ProductId(id));
                    self.show_cart_result(result, &cart);
                }
                SaleCommand::Dec { id } => {
                    let result = cart.decrement(ProductId(id));
                    self.show_cart_result(result, &cart);
                }
                SaleCommand::Rm { id } => {
                    if !cart.remove(ProductId(id)) {
                        println!("{} Product {} is not in the cart", INFO, id);
                    }
                    println!("{}", format_cart_view(cart.view()));
                }
                SaleCommand::Search { term } => {
                    let products = self.product_repository.search(&term.join(" ")).await?;
                    self.print_products(&products);
                }
                SaleCommand::Products => {
                    let products = self.product_repository.find_all().await?;
                    self.print_products(&products);
                }
                SaleCommand::Show => println!("{}", format_cart_view(cart.view())),
                SaleCommand::Clear => match cart.clear(self.confirmation.as_ref()) {
                    Ok(true) => {
                        println!("{} Cart cleared", CHECKMARK);
                        println!("{}", format_cart_view(cart.view()));
                    }
                    Ok(false) => {}
                    Err(e) => show_notice(&e),
                },
                SaleCommand::Checkout => {
                    if self.handle_checkout(&cart).await? {
                        // A submitted sale starts a fresh register page.
                        cart = Cart::with_cashier(self.config.cashier.clone());
                        println!("{}", format_cart_view(cart.view()));
                    }
                }
                SaleCommand::Quit => break,
            }
        }

        Ok(())
    }

    fn show_cart_result(&self, result: Result<(), CartError>, cart: &Cart) {
        match result {
            Ok(()) => println!("{}", format_cart_view(cart.view())),
            Err(e) => show_notice(&e),
        }
    }

    async fn handle_sell_add(&self, cart: &mut Cart, id: ProductId) -> Result<()> {
        let Some(product) = self.product_repository.find_by_id(id).await? else {
            println!("{} Product {} not found", CROSS, id);
            return Ok(());
        };

        match cart.add_card(&product.card()) {
            Ok(quantity) => {
                println!("{} {} x{}", CHECKMARK, style(&product.name).green(), quantity);
                println!("{}", format_cart_view(cart.view()));
            }
            Err(e) => show_notice(&e),
        }

        Ok(())
    }

    async fn handle_checkout(&self, cart: &Cart) -> Result<bool> {
        match cart.checkout(self.confirmation.as_ref()) {
            Ok(Some(form)) => {
                let submitted = self.submit_form(&form.to_submission()).await?;
                if submitted {
                    println!("{} Sale of {} recorded", CHECKMARK, style(format_money(form.total)).green());
                }
                Ok(submitted)
            }
            Ok(None) => {
                if cart.view().checkout_enabled {
                    println!("Sale cancelled");
                } else {
                    println!("{} The cart is empty", INFO);
                }
                Ok(false)
            }
            Err(e) => {
                show_notice(&e);
                Ok(false)
            }
        }
    }

    // Quotes
    async fn handle_quote(&self, service_id: ServiceId) -> Result<()> {
        let Some(service) = self.service_repository.find_by_id(service_id).await? else {
            println!("{} Service {} not found", CROSS, service_id);
            return Ok(());
        };

        println!("{} {}", ROCKET, style(format!("Quote: {}", service.name)).bold().cyan());
        println!("Type {} to list the quote commands", style("help").cyan());

        let mut quote = Quote::new(&service);
        println!("{}", format_quote_view(quote.view()));

        loop {
            let line = self.read_line("quote")?;
            if line.trim().is_empty() {
                continue;
            }

            let command = match QuoteLine::try_parse_from(line.split_whitespace()) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    e.print()?;
                    continue;
                }
            };

            match command {
                QuoteCommand::Add { id, quantity } => {
                    let card = self
                        .product_repository
                        .find_by_id(ProductId(id))
                        .await?
                        .map(|product| product.card());

                    match quote.add(card.as_ref(), &quantity) {
                        Ok(total) => {
                            println!("{} Product {} x{}", CHECKMARK, id, total);
                            println!("{}", format_quote_view(quote.view()));
                        }
                        Err(e) => show_notice(&e),
                    }
                }
                QuoteCommand::Rm { id } => {
                    if !quote.remove(ProductId(id)) {
                        println!("{} Product {} is not in the quote", INFO, id);
                    }
                    println!("{}", format_quote_view(quote.view()));
                }
                QuoteCommand::Products => {
                    let products = self.product_repository.find_available().await?;
                    self.print_products(&products);
                }
                QuoteCommand::Show => println!("{}", format_quote_view(quote.view())),
                QuoteCommand::Clear => match quote.clear(self.confirmation.as_ref()) {
                    Ok(true) => println!("{}", format_quote_view(quote.view())),
                    Ok(false) => {}
                    Err(e) => show_notice(&e),
                },
                QuoteCommand::Submit => {
                    let customer = self.read_line("Customer name")?;
                    match quote.submit(&customer, self.confirmation.as_ref()) {
                        Ok(Some(form)) => {
                            if self.submit_form(&form.to_submission()).await? {
                                println!(
                                    "{} Quote created. Total: {}",
                                    CHECKMARK,
                                    style(format_money(form.total)).green()
                                );
                                break;
                            }
                        }
                        Ok(None) => println!("Quote not submitted"),
                        Err(e) => show_notice(&e),
                    }
                }
                QuoteCommand::Quit => break,
            }
        }

        Ok(())
    }

    // Management tables
    async fn handle_inventory(&self) -> Result<()> {
        let products = self.product_repository.find_all().await?;
        if products.is_empty() {
            println!("{} No products in inventory", INFO);
            return Ok(());
        }

        println!("{} {}", INFO, style("Inventory").bold().cyan());
        self.manage_table(TableSelection::new(products), |rows: &[Product]| format_product_table(rows))
            .await?;
        Ok(())
    }

    async fn handle_services(&self) -> Result<()> {
        let services = self.service_repository.find_all().await?;
        if services.is_empty() {
            println!("{} No services registered", INFO);
            return Ok(());
        }

        println!("{} {}", INFO, style("Services").bold().cyan());
        if let Some(service_id) = self
            .manage_table(TableSelection::new(services), |rows: &[Service]| format_service_table(rows))
            .await?
        {
            self.handle_quote(service_id).await?;
        }
        Ok(())
    }

    /// Select rows and act on them until the user goes back. Returns the row
    /// to quote when the quote action is chosen.
    async fn manage_table<R>(
        &self,
        mut table: TableSelection<R>,
        render: impl Fn(&[R]) -> String,
    ) -> Result<Option<R::Id>>
    where
        R: TableRow,
        R::Form: PromptEdit,
    {
        loop {
            println!("{}", render(table.rows()));

            let mut choices: Vec<String> = table
                .rows()
                .iter()
                .map(|row| format!("{} - {}", row.row_id(), row.label()))
                .collect();
            choices.push("Back".to_string());

            let index = Select::with_theme(&self.theme)
                .with_prompt("Select a row")
                .items(&choices)
                .default(0)
                .interact()?;
            let Some(row_id) = table.rows().get(index).map(|row| row.row_id()) else {
                return Ok(None);
            };
            table.select(row_id)?;

            let enabled = table.actions();
            let mut actions = Vec::new();
            if enabled.edit {
                actions.push(RowAction::Edit);
            }
            if enabled.delete {
                actions.push(RowAction::Delete);
            }
            if enabled.quote {
                actions.push(RowAction::Quote);
            }
            actions.push(RowAction::Back);

            let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
            let choice = Select::with_theme(&self.theme)
                .with_prompt(format!("Action for row {}", row_id))
                .items(&labels)
                .default(0)
                .interact()?;

            match actions[choice] {
                RowAction::Edit => {
                    let dialog = table.edit_dialog()?;
                    println!("{} Editing {}", INFO, style(&dialog.action).dim());
                    let form = dialog.form.prompt(&self.theme)?;
                    match table.submit_edit(&form) {
                        Ok(submission) => {
                            self.submit_form(&submission).await?;
                        }
                        Err(e) => println!("{} {}", CROSS, style(&e).red()),
                    }
                }
                RowAction::Delete => match table.confirm_delete(self.confirmation.as_ref()) {
                    Ok(Some(submission)) => {
                        self.submit_form(&submission).await?;
                    }
                    Ok(None) => println!("Deletion cancelled"),
                    Err(e) => println!("{} {}", CROSS, style(&e).red()),
                },
                RowAction::Quote => {
                    if let Some(target) = table.quote_target() {
                        info!("Opening quote page {}", target);
                    }
                    return Ok(Some(row_id));
                }
                RowAction::Back => {}
            }
        }
    }

    // Service payments
    async fn handle_payments(&self, search: Option<String>, paid: bool) -> Result<()> {
        let status = if paid { QuoteStatus::Paid } else { QuoteStatus::Quoted };
        let quotes = self
            .quote_repository
            .find_by_status(status, search.as_deref())
            .await?;

        if paid {
            if quotes.is_empty() {
                println!("{} No paid services found", INFO);
            } else {
                println!("{} {}", INFO, style("Paid services").bold().cyan());
                println!("{}", format_quoted_service_table(&quotes));
            }
            return Ok(());
        }

        let mut desk = PaymentDesk::new(quotes);
        loop {
            let pending = desk.pending();
            if pending.is_empty() {
                println!("{} No services awaiting payment", INFO);
                return Ok(());
            }

            println!("{} {}", INFO, style("Services awaiting payment").bold().cyan());
            let rows: Vec<_> = pending.iter().map(|quote| (*quote).clone()).collect();
            println!("{}", format_quoted_service_table(&rows));

            let mut choices: Vec<String> = rows
                .iter()
                .map(|quote| {
                    format!(
                        "{} - {} ({}) {}",
                        quote.id,
                        quote.customer_name,
                        quote.service_name,
                        format_money(quote.total)
                    )
                })
                .collect();
            choices.push("Back".to_string());

            let index = Select::with_theme(&self.theme)
                .with_prompt("Select a service to pay")
                .items(&choices)
                .default(0)
                .interact()?;
            let Some(quote) = rows.get(index) else {
                return Ok(());
            };

            match desk.pay(quote.id, self.confirmation.as_ref()) {
                Ok(Some(form)) => {
                    if self.submit_form(&form.to_submission()).await? {
                        desk.mark_paid(quote.id, chrono::Utc::now());
                        println!(
                            "{} Service \"{}\" paid. Total: {}",
                            CHECKMARK,
                            quote.service_name,
                            style(format_money(form.total)).green()
                        );
                    }
                }
                Ok(None) => println!("Payment cancelled"),
                Err(e) => {
                    println!("{} {}", CROSS, style(&e).red());
                    warn!("Payment rejected: {}", e);
                }
            }
        }
    }

    async fn handle_products(&self, search: Option<String>, available: bool) -> Result<()> {
        let mut products = match search {
            Some(term) => self.product_repository.search(&term).await?,
            None => self.product_repository.find_all().await?,
        };
        if available {
            products.retain(Product::is_available);
        }

        self.print_products(&products);
        Ok(())
    }

    fn print_products(&self, products: &[Product]) {
        if products.is_empty() {
            println!("{} No products found", INFO);
        } else {
            println!("{} {}", INFO, style(format!("Found {} products", products.len())).bold());
            println!("{}", format_product_table(products));
        }
    }
}
