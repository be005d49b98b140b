use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub catalog_path: String,
    pub outbox_path: Option<String>,
    pub cashier: Option<String>,
    pub log_level: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog_path: "catalog.json".to_string(),
            outbox_path: None,
            cashier: None,
            log_level: "warn".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();
        let defaults = Config::default();
        let config = Config {
            catalog_path: env::var("POS_CATALOG_PATH").unwrap_or(defaults.catalog_path),
            outbox_path: env::var("POS_OUTBOX_PATH").ok().filter(|p| !p.trim().is_empty()),
            cashier: env::var("POS_CASHIER").ok().filter(|c| !c.trim().is_empty()),
            log_level: env::var("LOG_LEVEL").unwrap_or(defaults.log_level),
            environment: env::var("APP_ENV").unwrap_or(defaults.environment),
        };

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides and re-validate.
    pub fn with_overrides(
        mut self,
        catalog_path: Option<String>,
        outbox_path: Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(path) = catalog_path {
            self.catalog_path = path;
        }
        if let Some(path) = outbox_path {
            self.outbox_path = Some(path);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.catalog_path.trim().is_empty() {
            return Err(anyhow::anyhow!("POS_CATALOG_PATH is not set"));
        }

        if !self.catalog_path.ends_with(".json") {
            return Err(anyhow::anyhow!("POS_CATALOG_PATH must point to a .json file"));
        }

        // Forms printed to a terminal are lost; production needs an outbox.
        if self.is_production() && self.outbox_path.is_none() {
            return Err(anyhow::anyhow!("POS_OUTBOX_PATH is not set in production"));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
