use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct VentoraConfig {
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    /// Tax rate applied to every sale line, e.g. 0.19 for 19%.
    pub tax_rate: f64,
    /// Hard cap on the credit term; None means any positive term.
    #[serde(default)]
    pub max_term_months: Option<u32>,
    #[serde(default = "default_min_threshold")]
    pub stock_min_threshold: i64,
    #[serde(default = "default_max_threshold")]
    pub stock_max_threshold: i64,
}

fn default_min_threshold() -> i64 {
    2
}

fn default_max_threshold() -> i64 {
    100
}

impl VentoraConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file
            // Default to 'development' env
            // Note that this file is _optional_
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add in a local configuration file
            // This file shouldn't be checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of VENTORA)
            // Eg.. `VENTORA__BUSINESS_RULES__TAX_RATE=0.21`
            .add_source(config::Environment::with_prefix("VENTORA").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
