use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "todolap-pos")]
#[command(about = "Point-of-sale register for the TodoLap shop")]
#[command(version = "0.1.0")]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Catalog file (JSON with `productos` and `servicios`)
    #[arg(short, long, global = true)]
    pub catalog: Option<String>,

    /// Append submitted forms to this file instead of printing them
    #[arg(short, long, global = true)]
    pub outbox: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ring up a product sale
    Sell,
    /// Quote a service with add-on products
    Quote {
        /// Service ID
        service_id: u64,
    },
    /// Manage inventory rows
    Inventory,
    /// Manage services rows
    Services,
    /// Take cash payments for quoted services
    Payments {
        /// Filter by customer or service name
        #[arg(short, long)]
        search: Option<String>,
        /// Show the history of paid services instead
        #[arg(long)]
        paid: bool,
    },
    /// List catalog products
    Products {
        /// Filter by name
        #[arg(short, long)]
        search: Option<String>,
        /// Show only products with stock left
        #[arg(short, long)]
        available: bool,
    },
}

/// One line typed at the register prompt.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct SaleLine {
    #[command(subcommand)]
    pub command: SaleCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SaleCommand {
    /// Add one unit of a product
    Add { id: u64 },
    /// Set a line's quantity
    Qty {
        id: u64,
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },
    /// One more unit
    Inc { id: u64 },
    /// One less unit (never below one)
    Dec { id: u64 },
    /// Remove a line
    Rm { id: u64 },
    /// Search products by name
    Search { term: Vec<String> },
    /// List products
    Products,
    /// Show the cart
    Show,
    /// Empty the cart
    Clear,
    /// Confirm and submit the sale
    Checkout,
    /// Leave the register
    #[command(alias = "exit")]
    Quit,
}

/// One line typed at the quote prompt.
#[derive(Parser, Debug)]
#[command(multicall = true)]
pub struct QuoteLine {
    #[command(subcommand)]
    pub command: QuoteCommand,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum QuoteCommand {
    /// Add units of a product
    Add {
        id: u64,
        #[arg(default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },
    /// Remove a product
    Rm { id: u64 },
    /// List products with stock
    Products,
    /// Show the quote
    Show,
    /// Remove all products
    Clear,
    /// Enter the customer and submit the quote
    Submit,
    /// Leave without submitting
    #[command(alias = "exit")]
    Quit,
}
