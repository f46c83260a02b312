use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider_base_url: String,
    pub provider_api_key: String,
    /// Per-sub-scorer call budget in milliseconds.
    pub provider_timeout_ms: u64,
    /// Default region for MSISDN hint validation (ISO 3166-1 alpha-2).
    pub phone_region: String,
    /// Expense ratio assumed when the caller supplies no expense figure.
    pub default_expense_ratio: f64,
    /// Share of disposable income available for a loan payment.
    pub affordability_payment_ratio: f64,
    /// Months of payments in the maximum affordable loan envelope.
    pub affordability_loan_multiple: u32,
    /// Debt-to-income ratio above which a user is flagged over-leveraged.
    pub over_leverage_threshold: f64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            provider_base_url: std::env::var("ALT_DATA_BASE_URL")
                .map_err(|_| {
                    anyhow::anyhow!("ALT_DATA_BASE_URL environment variable required")
                })
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("ALT_DATA_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("ALT_DATA_BASE_URL must start with http:// or https://");
                    }
                    Ok(url)
                })?,
            provider_api_key: std::env::var("ALT_DATA_API_KEY")
                .map_err(|_| anyhow::anyhow!("ALT_DATA_API_KEY environment variable required"))
                .and_then(|key| {
                    if key.trim().is_empty() {
                        anyhow::bail!("ALT_DATA_API_KEY cannot be empty");
                    }
                    Ok(key)
                })?,
            provider_timeout_ms: std::env::var("ALT_DATA_TIMEOUT_MS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("ALT_DATA_TIMEOUT_MS must be a valid number"))?,
            phone_region: std::env::var("PHONE_REGION").unwrap_or_else(|_| "GH".to_string()),
            default_expense_ratio: std::env::var("DEFAULT_EXPENSE_RATIO")
                .unwrap_or_else(|_| "0.70".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DEFAULT_EXPENSE_RATIO must be a valid number"))
                .and_then(|r: f64| {
                    if !(0.0..=1.0).contains(&r) {
                        anyhow::bail!("DEFAULT_EXPENSE_RATIO must be between 0 and 1");
                    }
                    Ok(r)
                })?,
            affordability_payment_ratio: std::env::var("AFFORDABILITY_PAYMENT_RATIO")
                .unwrap_or_else(|_| "0.35".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("AFFORDABILITY_PAYMENT_RATIO must be a valid number")
                })
                .and_then(|r: f64| {
                    if !(0.0..=1.0).contains(&r) {
                        anyhow::bail!("AFFORDABILITY_PAYMENT_RATIO must be between 0 and 1");
                    }
                    Ok(r)
                })?,
            affordability_loan_multiple: std::env::var("AFFORDABILITY_LOAN_MULTIPLE")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| {
                    anyhow::anyhow!("AFFORDABILITY_LOAN_MULTIPLE must be a valid number")
                })?,
            over_leverage_threshold: std::env::var("OVER_LEVERAGE_THRESHOLD")
                .unwrap_or_else(|_| "0.40".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("OVER_LEVERAGE_THRESHOLD must be a valid number"))?,
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Alt-data base URL: {}", config.provider_base_url);
        tracing::debug!("Provider timeout: {}ms", config.provider_timeout_ms);
        tracing::debug!("Phone region: {}", config.phone_region);
        tracing::debug!(
            "Affordability: expense ratio {}, payment ratio {}, loan multiple {}",
            config.default_expense_ratio,
            config.affordability_payment_ratio,
            config.affordability_loan_multiple
        );

        Ok(config)
    }
}
