/// Credit scoring engine: traditional transaction-history scoring blended
/// with consent-gated alternative-data signals.
///
/// The flow per request:
/// 1. Check the fingerprint cache (identical inputs return the cached record)
/// 2. Compute the traditional score from enriched transactions
/// 3. If consented, fan out to the eight alternative-data sub-scorers
/// 4. Blend, derive band/grade/percentile/default probability
/// 5. Attach the recommendation and explainability factors
use chrono::{Datelike, Duration as ChronoDuration, Utc};
use moka::future::Cache;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ScoringError;
use crate::fingerprint::{scoring_fingerprint, ValidatedCacheEntry};
use crate::identity::IdentityHints;
use crate::models::*;
use crate::providers::AlternativeDataProvider;
use crate::stats::StatisticalMethods;

/// Version tag stamped on every produced record.
pub const MODEL_VERSION: &str = "reshadx-score-1.2.0";

/// Normalized score bounds.
pub const SCORE_FLOOR: u16 = 300;
pub const SCORE_CEILING: u16 = 850;

/// Scores expire 90 days after computation.
const SCORE_TTL_DAYS: i64 = 90;

/// Blend weights when alternative data is present.
const TRADITIONAL_WEIGHT: f64 = 0.4;
const ALTERNATIVE_WEIGHT: f64 = 0.6;

/// A scoring request as handed over by the API layer.
#[derive(Debug, Clone)]
pub struct ScoringRequest {
    /// The user being scored. Must be non-blank.
    pub user_id: String,
    /// Enriched transaction history from the upstream pipeline.
    pub transactions: Vec<EnrichedTransaction>,
    /// Routing hints for alternative-data lookups.
    pub identity: IdentityHints,
    /// Consent flag. Without it no sub-scorer runs, ever.
    pub include_alternative_data: bool,
}

/// Per-component breakdown of the traditional score.
#[derive(Debug, Clone, Default)]
pub struct TraditionalBreakdown {
    pub payment_history: f64,
    pub transaction_pattern: f64,
    pub balance_stability: f64,
    pub income_consistency: f64,
    pub account_activity: f64,
}

impl TraditionalBreakdown {
    /// Base 300 plus all components, clamped to the score bounds.
    pub fn total(&self) -> f64 {
        let raw = SCORE_FLOOR as f64
            + self.payment_history
            + self.transaction_pattern
            + self.balance_stability
            + self.income_consistency
            + self.account_activity;
        raw.clamp(SCORE_FLOOR as f64, SCORE_CEILING as f64)
    }
}

/// Fixed recommendation per score band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LendingRecommendation {
    pub credit_limit: f64,
    pub interest_rate: f64,
    pub loan_term_months: u32,
}

/// The scoring engine. Stateless apart from the fingerprint cache;
/// construct one per process and pass it by reference.
pub struct ScoringEngine {
    config: Config,
    provider: Arc<dyn AlternativeDataProvider>,
    score_cache: Cache<String, String>,
}

impl ScoringEngine {
    pub fn new(config: Config, provider: Arc<dyn AlternativeDataProvider>) -> Self {
        // Fingerprint -> serialized record. TTL matches record expiry, so a
        // cache hit can never return an expired score.
        let score_cache = Cache::builder()
            .time_to_live(Duration::from_secs(SCORE_TTL_DAYS as u64 * 24 * 3600))
            .max_capacity(50_000)
            .build();

        Self {
            config,
            provider,
            score_cache,
        }
    }

    /// Compute a `CreditScore` for one user.
    ///
    /// Never fails for missing data: an empty transaction list yields the
    /// floor score with reduced confidence. The only caller-visible error
    /// is a blank `user_id`.
    pub async fn score(&self, request: &ScoringRequest) -> Result<CreditScore, ScoringError> {
        if request.user_id.trim().is_empty() {
            return Err(ScoringError::InvalidRequest(
                "user_id is required".to_string(),
            ));
        }

        let identity = request.identity.normalized(&self.config.phone_region);

        // Malformed amounts are rejected per transaction, never per batch.
        let usable: Vec<&EnrichedTransaction> = request
            .transactions
            .iter()
            .filter(|tx| {
                if tx.is_well_formed() {
                    true
                } else {
                    tracing::warn!(
                        "❌ Skipping malformed transaction (amount {}) for user {}",
                        tx.amount,
                        request.user_id
                    );
                    false
                }
            })
            .collect();

        let fingerprint = scoring_fingerprint(
            &request.user_id,
            &usable,
            request.include_alternative_data,
            &identity,
        );

        if let Some(serialized) = self.score_cache.get(&fingerprint).await {
            if let Some(data) = ValidatedCacheEntry::deserialize_and_validate(&serialized) {
                if let Ok(cached) = serde_json::from_str::<CreditScore>(&data) {
                    tracing::info!(
                        "✓ Returning cached score for user {} ({})",
                        request.user_id,
                        cached.credit_score
                    );
                    return Ok(cached);
                }
            }
            tracing::warn!("Cached score failed validation, rescoring");
        }

        let breakdown = traditional_breakdown(&usable);
        let traditional = breakdown.total();
        tracing::debug!(
            "Traditional score for user {}: {:.1} over {} transactions",
            request.user_id,
            traditional,
            usable.len()
        );

        let (alternative, failed_signals) = if request.include_alternative_data {
            let (alt, failed) = self.collect_alternative_signals(&identity).await;
            if alt.is_empty() {
                tracing::error!(
                    "❌ All alternative-data sub-scorers failed for user {}, \
                     falling back to traditional-only score",
                    request.user_id
                );
                (None, failed)
            } else {
                (Some(alt), failed)
            }
        } else {
            (None, 0)
        };

        let final_score = match &alternative {
            Some(alt) => blend_scores(traditional, rescale_alternative(alt.composite_score)),
            None => clamp_score(traditional.round()),
        };

        let band = ScoreBand::from_score(final_score);
        let recommendation = recommendation_for(band);
        let factors = generate_factors(&breakdown, alternative.as_ref(), usable.len());
        let confidence = model_confidence(
            usable.len(),
            request.include_alternative_data,
            failed_signals,
        );

        let scored_at = Utc::now();
        let record = CreditScore {
            request_id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            credit_score: final_score,
            score_band: band,
            percentile: percentile_for(final_score),
            default_probability: default_probability_for(final_score),
            risk_grade: RiskGrade::from_score(final_score),
            recommended_credit_limit: recommendation.credit_limit,
            recommended_interest_rate: recommendation.interest_rate,
            recommended_loan_term_months: recommendation.loan_term_months,
            score_factors: factors,
            alternative_data_score: alternative,
            model_version: MODEL_VERSION.to_string(),
            model_confidence: confidence,
            scored_at,
            expires_at: scored_at + ChronoDuration::days(SCORE_TTL_DAYS),
        };

        if let Ok(serialized) = serde_json::to_string(&record) {
            self.score_cache
                .insert(fingerprint, ValidatedCacheEntry::new(serialized).serialize())
                .await;
        }

        tracing::info!(
            "✓ Scored user {}: {} ({:?}, grade {:?}, confidence {:.2})",
            request.user_id,
            record.credit_score,
            record.score_band,
            record.risk_grade,
            record.model_confidence
        );

        Ok(record)
    }

    /// Fan out to the eight sub-scorers concurrently; each call is
    /// timeout-bounded and a failure degrades that sub-score to missing.
    async fn collect_alternative_signals(
        &self,
        identity: &IdentityHints,
    ) -> (AlternativeDataScore, usize) {
        // Budget covers the provider client's internal retry attempts.
        let budget = Duration::from_millis(self.config.provider_timeout_ms * 4);
        let p = &self.provider;

        let (mobile_money, telecom, utility, employment, education, social, location, digital) =
            tokio::join!(
                timeout(budget, p.mobile_money(identity)),
                timeout(budget, p.telecom(identity)),
                timeout(budget, p.utility(identity)),
                timeout(budget, p.employment(identity)),
                timeout(budget, p.education(identity)),
                timeout(budget, p.social(identity)),
                timeout(budget, p.location(identity)),
                timeout(budget, p.digital_footprint(identity)),
            );

        let mut alt = AlternativeDataScore {
            mobile_money: degrade(SignalCategory::MobileMoney, mobile_money, budget),
            telecom: degrade(SignalCategory::Telecom, telecom, budget),
            utility: degrade(SignalCategory::Utility, utility, budget),
            employment: degrade(SignalCategory::Employment, employment, budget),
            education: degrade(SignalCategory::Education, education, budget),
            social: degrade(SignalCategory::Social, social, budget),
            location: degrade(SignalCategory::Location, location, budget),
            digital_footprint: degrade(SignalCategory::DigitalFootprint, digital, budget),
            composite_score: 0.0,
        };

        let available = alt.available();
        let failed = SignalCategory::ALL.len() - available.len();

        // Average only the sub-scores that actually arrived.
        let scores: Vec<f64> = available.iter().map(|(_, s)| *s).collect();
        alt.composite_score = scores.mean();

        if failed > 0 {
            tracing::warn!(
                "⚠ {}/{} alternative-data sub-scorers degraded",
                failed,
                SignalCategory::ALL.len()
            );
        }

        (alt, failed)
    }
}

/// Collapse a timed, fallible sub-scorer result into an optional signal.
fn degrade<I>(
    category: SignalCategory,
    result: Result<Result<SignalScore<I>, ScoringError>, tokio::time::error::Elapsed>,
    budget: Duration,
) -> Option<SignalScore<I>> {
    match result {
        Ok(Ok(signal)) => {
            tracing::debug!("✓ {} sub-score: {:.1}", category.label(), signal.score);
            Some(signal)
        }
        Ok(Err(e)) => {
            tracing::warn!("⚠ {} sub-scorer failed: {}", category.label(), e);
            None
        }
        Err(_) => {
            tracing::warn!(
                "⚠ {} sub-scorer timed out after {:?}",
                category.label(),
                budget
            );
            None
        }
    }
}

// ============ Traditional score components ============

/// Compute all five traditional components. Zero usable transactions means
/// every component is zero and the total is exactly the floor.
pub fn traditional_breakdown(transactions: &[&EnrichedTransaction]) -> TraditionalBreakdown {
    if transactions.is_empty() {
        return TraditionalBreakdown::default();
    }

    TraditionalBreakdown {
        payment_history: payment_history_component(transactions),
        transaction_pattern: transaction_pattern_component(transactions),
        balance_stability: balance_stability_component(transactions),
        income_consistency: income_consistency_component(transactions),
        account_activity: account_activity_component(transactions),
    }
}

/// Payment history, weight 30: on-time fraction times 30. Without due-date
/// data the presence of loan/utility payments is proxied as 95% on time.
pub fn payment_history_component(transactions: &[&EnrichedTransaction]) -> f64 {
    let has_payment_history = transactions.iter().any(|tx| {
        matches!(
            tx.category.primary,
            TransactionCategory::LoanPayments | TransactionCategory::RentAndUtilities
        )
    });

    let on_time_rate = if has_payment_history { 0.95 } else { 0.0 };
    on_time_rate * 30.0
}

/// Transaction pattern, weight 25: activity volume, merchant diversity and
/// a low share of micro transactions.
pub fn transaction_pattern_component(transactions: &[&EnrichedTransaction]) -> f64 {
    let months = months_spanned(transactions).max(1) as f64;
    let mut component = 0.0;

    let monthly_count = transactions.len() as f64 / months;
    if monthly_count >= 10.0 {
        component += 10.0;
    }

    let distinct_merchants: HashSet<&str> = transactions
        .iter()
        .filter_map(|tx| tx.merchant.name.as_deref())
        .collect();
    if distinct_merchants.len() >= 15 {
        component += 10.0;
    }

    let micro = transactions
        .iter()
        .filter(|tx| tx.amount.abs() < 5.0)
        .count() as f64;
    if micro / (transactions.len() as f64) < 0.20 {
        component += 5.0;
    }

    component
}

/// Balance stability, weight 20: coefficient of variation of amounts on a
/// four-step scale.
pub fn balance_stability_component(transactions: &[&EnrichedTransaction]) -> f64 {
    let amounts: Vec<f64> = transactions.iter().map(|tx| tx.amount).collect();
    let cv = amounts.coefficient_of_variation();

    match cv {
        cv if cv < 0.5 => 20.0,
        cv if cv < 1.0 => 15.0,
        cv if cv < 1.5 => 10.0,
        _ => 5.0,
    }
}

/// Income consistency, weight 15: average monthly INCOME inflow on a
/// four-step scale; no income transactions at all scores zero.
pub fn income_consistency_component(transactions: &[&EnrichedTransaction]) -> f64 {
    let income: Vec<f64> = transactions
        .iter()
        .filter(|tx| tx.category.primary == TransactionCategory::Income && tx.amount > 0.0)
        .map(|tx| tx.amount)
        .collect();

    if income.is_empty() {
        return 0.0;
    }

    let months = months_spanned(transactions).max(1) as f64;
    let monthly_income = income.iter().sum::<f64>() / months;

    match monthly_income {
        m if m >= 2000.0 => 15.0,
        m if m >= 1000.0 => 12.0,
        m if m >= 500.0 => 8.0,
        _ => 5.0,
    }
}

/// Account activity, weight 10: total transaction count on a four-step scale.
pub fn account_activity_component(transactions: &[&EnrichedTransaction]) -> f64 {
    match transactions.len() {
        n if n >= 100 => 10.0,
        n if n >= 50 => 7.0,
        n if n >= 20 => 5.0,
        _ => 2.0,
    }
}

/// Calendar months covered by the transaction window, inclusive.
pub(crate) fn months_spanned(transactions: &[&EnrichedTransaction]) -> i64 {
    let first = transactions.iter().map(|tx| tx.date).min();
    let last = transactions.iter().map(|tx| tx.date).max();
    match (first, last) {
        (Some(first), Some(last)) => {
            let span = (last.year() as i64 * 12 + last.month() as i64)
                - (first.year() as i64 * 12 + first.month() as i64);
            span + 1
        }
        _ => 1,
    }
}

// ============ Blending and derivations ============

/// Rescale an average sub-score from [0, 100] to the [300, 850] range.
pub fn rescale_alternative(average: f64) -> f64 {
    SCORE_FLOOR as f64 + (average / 100.0) * 550.0
}

/// Blend the traditional and rescaled alternative scores 40/60.
pub fn blend_scores(traditional: f64, alt_scaled: f64) -> u16 {
    let blended = traditional * TRADITIONAL_WEIGHT + alt_scaled * ALTERNATIVE_WEIGHT;
    clamp_score(blended.round())
}

fn clamp_score(score: f64) -> u16 {
    score.clamp(SCORE_FLOOR as f64, SCORE_CEILING as f64) as u16
}

/// Percentile in [1, 99], linear over the score range.
pub fn percentile_for(score: u16) -> u8 {
    let pct = ((score as f64 - 300.0) / 550.0 * 100.0).round();
    pct.clamp(1.0, 99.0) as u8
}

/// Logistic default-probability mapping with its crossover at 650,
/// clamped to [0.01, 0.99]. Non-increasing in score.
pub fn default_probability_for(score: u16) -> f64 {
    let p = 1.0 / (1.0 + ((score as f64 - 650.0) / 100.0).exp());
    p.clamp(0.01, 0.99)
}

/// Fixed recommendation lookup per band.
pub fn recommendation_for(band: ScoreBand) -> LendingRecommendation {
    match band {
        ScoreBand::Excellent => LendingRecommendation {
            credit_limit: 50_000.0,
            interest_rate: 12.0,
            loan_term_months: 36,
        },
        ScoreBand::VeryGood => LendingRecommendation {
            credit_limit: 30_000.0,
            interest_rate: 15.0,
            loan_term_months: 24,
        },
        ScoreBand::Good => LendingRecommendation {
            credit_limit: 15_000.0,
            interest_rate: 18.0,
            loan_term_months: 18,
        },
        ScoreBand::Fair => LendingRecommendation {
            credit_limit: 7_500.0,
            interest_rate: 22.0,
            loan_term_months: 12,
        },
        ScoreBand::Poor => LendingRecommendation {
            credit_limit: 2_500.0,
            interest_rate: 28.0,
            loan_term_months: 6,
        },
    }
}

// ============ Confidence and explainability ============

/// Confidence from data volume, degraded by sub-scorer failures.
pub fn model_confidence(tx_count: usize, alt_requested: bool, failed_signals: usize) -> f64 {
    let base = match tx_count {
        0 => 0.3,
        n if n >= 50 => 0.9,
        n if n >= 20 => 0.75,
        _ => 0.6,
    };

    if !alt_requested {
        return base;
    }

    let total = SignalCategory::ALL.len();
    let failed_fraction = failed_signals as f64 / total as f64;
    let mut confidence = base * (1.0 - failed_fraction / 2.0);
    if failed_signals == total {
        // Consent was given but nothing arrived; the record silently fell
        // back to traditional-only, so confidence takes an extra cut.
        confidence *= 0.5;
    }
    confidence
}

/// Build the ordered explainability list from fixed thresholds.
pub fn generate_factors(
    breakdown: &TraditionalBreakdown,
    alternative: Option<&AlternativeDataScore>,
    tx_count: usize,
) -> Vec<ScoreFactor> {
    let mut factors = Vec::new();

    if tx_count == 0 {
        factors.push(ScoreFactor {
            category: "Limited History".to_string(),
            direction: FactorDirection::Negative,
            weight: 30,
            description: "No transaction history available; score reflects the minimum baseline."
                .to_string(),
        });
    } else {
        if breakdown.payment_history >= 25.0 {
            factors.push(ScoreFactor {
                category: "Payment History".to_string(),
                direction: FactorDirection::Positive,
                weight: 30,
                description: "Loan and utility payments are made on time.".to_string(),
            });
        } else {
            factors.push(ScoreFactor {
                category: "Payment History".to_string(),
                direction: FactorDirection::Negative,
                weight: 30,
                description: "No loan or utility payment history found.".to_string(),
            });
        }

        if breakdown.transaction_pattern >= 20.0 {
            factors.push(ScoreFactor {
                category: "Transaction Activity".to_string(),
                direction: FactorDirection::Positive,
                weight: 25,
                description: "Active account with a diverse set of merchants.".to_string(),
            });
        }

        if breakdown.balance_stability >= 15.0 {
            factors.push(ScoreFactor {
                category: "Balance Stability".to_string(),
                direction: FactorDirection::Positive,
                weight: 20,
                description: "Transaction amounts are stable over time.".to_string(),
            });
        } else if breakdown.balance_stability <= 5.0 {
            factors.push(ScoreFactor {
                category: "Balance Stability".to_string(),
                direction: FactorDirection::Negative,
                weight: 20,
                description: "Transaction amounts vary widely.".to_string(),
            });
        }

        if breakdown.income_consistency >= 12.0 {
            factors.push(ScoreFactor {
                category: "Income Consistency".to_string(),
                direction: FactorDirection::Positive,
                weight: 15,
                description: "Regular monthly income deposits detected.".to_string(),
            });
        }

        if breakdown.account_activity >= 7.0 {
            factors.push(ScoreFactor {
                category: "Account Activity".to_string(),
                direction: FactorDirection::Positive,
                weight: 10,
                description: "Substantial account usage history.".to_string(),
            });
        }
    }

    if let Some(alt) = alternative {
        for (category, score) in alt.available() {
            if score >= 70.0 {
                factors.push(ScoreFactor {
                    category: category.label().to_string(),
                    direction: FactorDirection::Positive,
                    weight: category.factor_weight(),
                    description: alternative_factor_description(category),
                });
            }
        }
    }

    // Stable sort keeps insertion order within equal weights, so output is
    // deterministic for identical inputs.
    factors.sort_by(|a, b| b.weight.cmp(&a.weight));
    factors
}

fn alternative_factor_description(category: SignalCategory) -> String {
    match category {
        SignalCategory::MobileMoney => {
            "Consistent mobile-money activity indicates healthy cash flow.".to_string()
        }
        SignalCategory::Telecom => {
            "Regular airtime and data purchases show payment capacity.".to_string()
        }
        SignalCategory::Utility => "Utility bills are paid reliably.".to_string(),
        SignalCategory::Employment => "Verified stable employment.".to_string(),
        SignalCategory::Education => "Verified education background.".to_string(),
        SignalCategory::Social => "Stable, established social network.".to_string(),
        SignalCategory::Location => "Long residence at the current address.".to_string(),
        SignalCategory::DigitalFootprint => {
            "Established digital presence across platforms.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn tx(amount: f64, category: TransactionCategory, day: u32) -> EnrichedTransaction {
        EnrichedTransaction {
            amount,
            date: Utc.with_ymd_and_hms(2025, 6, day.min(28), 12, 0, 0).unwrap(),
            category: CategoryInfo {
                primary: category,
                detailed: None,
            },
            merchant: MerchantInfo { name: None },
        }
    }

    #[test]
    fn blend_matches_worked_example() {
        // traditional 600, all sub-scores 80: alt scales to 740, blend to 684
        assert_eq!(rescale_alternative(80.0), 740.0);
        assert_eq!(blend_scores(600.0, 740.0), 684);
        assert_eq!(ScoreBand::from_score(684), ScoreBand::Good);
        assert_eq!(RiskGrade::from_score(684), RiskGrade::C);
    }

    #[test]
    fn percentile_formula_and_bounds() {
        assert_eq!(percentile_for(300), 1);
        assert_eq!(percentile_for(850), 99);
        assert_eq!(percentile_for(575), 50);
    }

    #[test]
    fn default_probability_clamped_and_non_increasing() {
        let mut previous = f64::INFINITY;
        for score in SCORE_FLOOR..=SCORE_CEILING {
            let p = default_probability_for(score);
            assert!((0.01..=0.99).contains(&p));
            assert!(p <= previous);
            previous = p;
        }
    }

    #[test]
    fn empty_breakdown_totals_floor() {
        let breakdown = traditional_breakdown(&[]);
        assert_eq!(breakdown.total(), 300.0);
    }

    #[test]
    fn payment_history_proxy() {
        let loan = tx(-150.0, TransactionCategory::LoanPayments, 5);
        let food = tx(-20.0, TransactionCategory::FoodAndDrink, 6);
        let with_history: Vec<&EnrichedTransaction> = vec![&loan, &food];
        assert!((payment_history_component(&with_history) - 28.5).abs() < 1e-9);

        let without: Vec<&EnrichedTransaction> = vec![&food];
        assert_eq!(payment_history_component(&without), 0.0);
    }

    #[test]
    fn income_component_steps() {
        let salary = tx(2500.0, TransactionCategory::Income, 1);
        let txs: Vec<&EnrichedTransaction> = vec![&salary];
        assert_eq!(income_consistency_component(&txs), 15.0);

        let small = tx(600.0, TransactionCategory::Income, 1);
        let txs: Vec<&EnrichedTransaction> = vec![&small];
        assert_eq!(income_consistency_component(&txs), 8.0);

        let none = tx(-600.0, TransactionCategory::FoodAndDrink, 1);
        let txs: Vec<&EnrichedTransaction> = vec![&none];
        assert_eq!(income_consistency_component(&txs), 0.0);
    }

    #[test]
    fn account_activity_steps() {
        let base = tx(-10.0, TransactionCategory::FoodAndDrink, 1);
        let owned: Vec<EnrichedTransaction> = (0..120).map(|_| base.clone()).collect();
        let refs: Vec<&EnrichedTransaction> = owned.iter().collect();
        assert_eq!(account_activity_component(&refs[..120]), 10.0);
        assert_eq!(account_activity_component(&refs[..60]), 7.0);
        assert_eq!(account_activity_component(&refs[..20]), 5.0);
        assert_eq!(account_activity_component(&refs[..3]), 2.0);
    }

    #[test]
    fn confidence_degrades_with_failures() {
        let none_failed = model_confidence(100, true, 0);
        let half_failed = model_confidence(100, true, 4);
        let all_failed = model_confidence(100, true, 8);
        assert!(none_failed > half_failed);
        assert!(half_failed > all_failed);
        assert!((none_failed - 0.9).abs() < 1e-9);
        assert!((all_failed - 0.9 * 0.5 * 0.5).abs() < 1e-9);
    }

    #[test]
    fn recommendation_table_is_exhaustive() {
        assert_eq!(
            recommendation_for(ScoreBand::Excellent),
            LendingRecommendation {
                credit_limit: 50_000.0,
                interest_rate: 12.0,
                loan_term_months: 36
            }
        );
        assert_eq!(recommendation_for(ScoreBand::Poor).loan_term_months, 6);
    }

    #[test]
    fn factors_sorted_by_weight_and_flag_empty_history() {
        let factors = generate_factors(&TraditionalBreakdown::default(), None, 0);
        assert_eq!(factors.len(), 1);
        assert_eq!(factors[0].category, "Limited History");
        assert_eq!(factors[0].direction, FactorDirection::Negative);

        let breakdown = TraditionalBreakdown {
            payment_history: 28.5,
            transaction_pattern: 25.0,
            balance_stability: 20.0,
            income_consistency: 15.0,
            account_activity: 10.0,
        };
        let factors = generate_factors(&breakdown, None, 80);
        let weights: Vec<u8> = factors.iter().map(|f| f.weight).collect();
        let mut sorted = weights.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(weights, sorted);
    }
}
