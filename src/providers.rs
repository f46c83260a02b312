use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::circuit_breaker::{create_provider_circuit_breaker, ProviderCircuitBreaker};
use crate::config::Config;
use crate::errors::{ResultExt, ScoringError};
use crate::identity::IdentityHints;
use crate::models::*;

/// One method per alternative-data signal category.
///
/// This is the seam between the aggregation logic and real integrations:
/// the scoring engine only ever sees `{score, insights}` per category, so
/// telecom APIs, employment registries, or fixtures can be swapped in
/// without touching the blend.
#[async_trait]
pub trait AlternativeDataProvider: Send + Sync {
    async fn mobile_money(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<MobileMoneyInsights>, ScoringError>;

    async fn telecom(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<TelecomInsights>, ScoringError>;

    async fn utility(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<UtilityInsights>, ScoringError>;

    async fn employment(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<EmploymentInsights>, ScoringError>;

    async fn education(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<EducationInsights>, ScoringError>;

    async fn social(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<SocialInsights>, ScoringError>;

    async fn location(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<LocationInsights>, ScoringError>;

    async fn digital_footprint(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<DigitalFootprintInsights>, ScoringError>;
}

// ============ HTTP-backed provider ============

/// Maximum attempts per signal lookup (1 initial + 2 retries).
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for the retry backoff, doubled per attempt.
const RETRY_BASE_DELAY_MS: u64 = 150;

/// Provider client backed by the alternative-data gateway HTTP API.
///
/// Retries with exponential backoff and the circuit breaker live here, in
/// the client, never in the scoring engine: the engine only sees one
/// `Result` per signal and degrades on `Err`.
pub struct HttpDataProvider {
    client: Client,
    base_url: String,
    api_key: String,
    breaker: ProviderCircuitBreaker,
}

impl HttpDataProvider {
    /// Creates a new `HttpDataProvider` from configuration.
    pub fn new(config: &Config) -> Result<Self, ScoringError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.provider_timeout_ms))
            .build()
            .map_err(|e| {
                ScoringError::ProviderError(format!("Failed to create provider client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.provider_base_url.clone(),
            api_key: config.provider_api_key.clone(),
            breaker: create_provider_circuit_breaker(),
        })
    }

    /// Fetch one signal segment, retrying transient failures with backoff.
    async fn fetch_signal<I: DeserializeOwned>(
        &self,
        segment: &str,
        identity: &IdentityHints,
    ) -> Result<SignalScore<I>, ScoringError> {
        let mut params: Vec<(&str, &str)> = vec![("key", self.api_key.as_str())];
        if let Some(phone) = identity.phone_number.as_deref() {
            params.push(("phone", phone));
        }
        if let Some(national_id) = identity.national_id.as_deref() {
            params.push(("nationalId", national_id));
        }

        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/signals/{}", self.base_url, segment),
            &params,
        )
        .map_err(|e| ScoringError::ProviderError(format!("Failed to build URL: {}", e)))?;

        // Redact key from logs to prevent credential exposure
        tracing::debug!(
            "Signal lookup: {}/v1/signals/{}?key=[REDACTED]",
            self.base_url,
            segment
        );

        let mut last_err =
            ScoringError::ProviderError(format!("{} lookup never attempted", segment));

        for attempt in 0..MAX_ATTEMPTS {
            if attempt > 0 {
                let delay = RETRY_BASE_DELAY_MS * 2u64.pow(attempt - 1);
                tracing::debug!(
                    "Retrying {} lookup (attempt {}/{}) after {}ms",
                    segment,
                    attempt + 1,
                    MAX_ATTEMPTS,
                    delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.attempt_fetch(segment, url.clone()).await {
                Ok(signal) => return Ok(signal),
                Err(e) => {
                    tracing::warn!(
                        "⚠ Signal lookup '{}' attempt {} failed: {}",
                        segment,
                        attempt + 1,
                        e
                    );
                    let transient = matches!(
                        e,
                        ScoringError::ProviderTimeout(_) | ScoringError::ProviderError(_)
                    );
                    last_err = e;
                    if !transient {
                        break;
                    }
                }
            }
        }

        Err(last_err)
    }

    /// A single guarded HTTP attempt.
    async fn attempt_fetch<I: DeserializeOwned>(
        &self,
        segment: &str,
        url: reqwest::Url,
    ) -> Result<SignalScore<I>, ScoringError> {
        use failsafe::futures::CircuitBreaker;

        let fut = async {
            let response = self.client.get(url).send().await?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(ScoringError::ProviderError(format!(
                    "Provider returned status {}: {}",
                    status, error_text
                )));
            }

            let signal: SignalScore<I> = response.json().await.map_err(|e| {
                ScoringError::ProviderError(format!(
                    "Failed to parse {} response: {}",
                    segment, e
                ))
            })?;

            Ok(signal)
        };

        match self.breaker.call(fut).await {
            Ok(mut signal) => {
                signal.score = signal.score.clamp(0.0, 100.0);
                Ok(signal)
            }
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => Err(ScoringError::ProviderError(format!(
                "Circuit open for {} lookups",
                segment
            ))),
        }
    }

    fn require_phone<'a>(
        identity: &'a IdentityHints,
        segment: &str,
    ) -> Result<&'a str, ScoringError> {
        identity.phone_number.as_deref().ok_or_else(|| {
            ScoringError::ProviderError(format!("{} lookup requires a phone hint", segment))
        })
    }

    fn require_national_id<'a>(
        identity: &'a IdentityHints,
        segment: &str,
    ) -> Result<&'a str, ScoringError> {
        identity.national_id.as_deref().ok_or_else(|| {
            ScoringError::ProviderError(format!("{} lookup requires a national id hint", segment))
        })
    }
}

#[async_trait]
impl AlternativeDataProvider for HttpDataProvider {
    async fn mobile_money(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<MobileMoneyInsights>, ScoringError> {
        Self::require_phone(identity, "mobile-money")?;
        self.fetch_signal("mobile-money", identity)
            .await
            .context("mobile-money lookup")
    }

    async fn telecom(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<TelecomInsights>, ScoringError> {
        Self::require_phone(identity, "telecom")?;
        self.fetch_signal("telecom", identity)
            .await
            .context("telecom lookup")
    }

    async fn utility(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<UtilityInsights>, ScoringError> {
        self.fetch_signal("utility", identity).await
    }

    async fn employment(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<EmploymentInsights>, ScoringError> {
        Self::require_national_id(identity, "employment")?;
        self.fetch_signal("employment", identity)
            .await
            .context("employment lookup")
    }

    async fn education(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<EducationInsights>, ScoringError> {
        Self::require_national_id(identity, "education")?;
        self.fetch_signal("education", identity)
            .await
            .context("education lookup")
    }

    async fn social(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<SocialInsights>, ScoringError> {
        self.fetch_signal("social", identity).await
    }

    async fn location(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<LocationInsights>, ScoringError> {
        self.fetch_signal("location", identity).await
    }

    async fn digital_footprint(
        &self,
        identity: &IdentityHints,
    ) -> Result<SignalScore<DigitalFootprintInsights>, ScoringError> {
        self.fetch_signal("digital-footprint", identity).await
    }
}

// ============ Static reference provider ============

/// Deterministic provider returning fixed reference values.
///
/// Stands in for the real integrations in tests and offline environments;
/// swap in `HttpDataProvider` behind the same trait for production.
#[derive(Debug, Clone)]
pub struct StaticDataProvider {
    uniform_score: Option<f64>,
}

impl StaticDataProvider {
    pub fn new() -> Self {
        Self {
            uniform_score: None,
        }
    }

    /// All eight sub-scores report the same value. Handy for asserting the
    /// blend arithmetic against worked examples.
    pub fn with_uniform_score(score: f64) -> Self {
        Self {
            uniform_score: Some(score.clamp(0.0, 100.0)),
        }
    }

    fn score_or(&self, reference: f64) -> f64 {
        self.uniform_score.unwrap_or(reference)
    }
}

impl Default for StaticDataProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlternativeDataProvider for StaticDataProvider {
    async fn mobile_money(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<MobileMoneyInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(75.0),
            insights: MobileMoneyInsights {
                monthly_transaction_count: 45.0,
                monthly_volume: 1850.0,
                account_age_months: 36,
                agent_diversity: 8,
            },
        })
    }

    async fn telecom(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<TelecomInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(68.0),
            insights: TelecomInsights {
                monthly_airtime_spend: 25.0,
                topups_per_month: 7.0,
                tenure_months: 48,
                data_usage_mb: 2200.0,
            },
        })
    }

    async fn utility(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<UtilityInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(72.0),
            insights: UtilityInsights {
                on_time_payment_rate: 0.92,
                active_accounts: 2,
                months_of_history: 24,
            },
        })
    }

    async fn employment(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<EmploymentInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(70.0),
            insights: EmploymentInsights {
                status: "EMPLOYED".to_string(),
                tenure_months: 28,
                employer_verified: true,
            },
        })
    }

    async fn education(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<EducationInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(65.0),
            insights: EducationInsights {
                highest_level: "TERTIARY".to_string(),
                institution_verified: true,
            },
        })
    }

    async fn social(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<SocialInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(60.0),
            insights: SocialInsights {
                network_size: 340,
                account_age_months: 60,
                mutual_connections: 45,
            },
        })
    }

    async fn location(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<LocationInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(66.0),
            insights: LocationInsights {
                months_at_current_address: 30,
                address_changes_last_two_years: 1,
            },
        })
    }

    async fn digital_footprint(
        &self,
        _identity: &IdentityHints,
    ) -> Result<SignalScore<DigitalFootprintInsights>, ScoringError> {
        Ok(SignalScore {
            score: self.score_or(58.0),
            insights: DigitalFootprintInsights {
                active_platforms: 4,
                email_age_months: 72,
                device_count: 2,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_provider_is_deterministic() {
        let provider = StaticDataProvider::new();
        let hints = IdentityHints::default();
        let a = provider.mobile_money(&hints).await.unwrap();
        let b = provider.mobile_money(&hints).await.unwrap();
        assert_eq!(a.score, b.score);
        assert_eq!(a.insights.monthly_volume, b.insights.monthly_volume);
    }

    #[tokio::test]
    async fn uniform_score_applies_to_all_signals() {
        let provider = StaticDataProvider::with_uniform_score(80.0);
        let hints = IdentityHints::default();
        assert_eq!(provider.mobile_money(&hints).await.unwrap().score, 80.0);
        assert_eq!(provider.telecom(&hints).await.unwrap().score, 80.0);
        assert_eq!(provider.education(&hints).await.unwrap().score, 80.0);
        assert_eq!(
            provider.digital_footprint(&hints).await.unwrap().score,
            80.0
        );
    }

    #[tokio::test]
    async fn uniform_score_is_clamped() {
        let provider = StaticDataProvider::with_uniform_score(140.0);
        let hints = IdentityHints::default();
        assert_eq!(provider.utility(&hints).await.unwrap().score, 100.0);
    }
}
