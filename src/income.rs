/// Income verification engine: derives discrete income streams, a monthly
/// income series, stability and trend classifications, and an affordability
/// analysis from the same enriched transactions the scoring engine consumes.
///
/// Pure computation over its inputs; no I/O, no retries, no shared state.
use chrono::{DateTime, Datelike, Utc};
use regex::Regex;
use std::collections::HashMap;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::ScoringError;
use crate::models::*;
use crate::scoring::months_spanned;
use crate::stats::{median, StatisticalMethods};

/// Consistency assigned to streams with too few observations to measure.
const THIN_STREAM_CONSISTENCY: f64 = 25.0;

pub struct IncomeVerificationEngine {
    config: Config,
}

impl IncomeVerificationEngine {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Derive an `IncomeVerification` from enriched transactions.
    ///
    /// `monthly_expenses` is the externally supplied expense figure; when
    /// absent the configured default expense ratio of income is assumed.
    pub fn verify_income(
        &self,
        user_id: &str,
        transactions: &[EnrichedTransaction],
        monthly_expenses: Option<f64>,
    ) -> Result<IncomeVerification, ScoringError> {
        if user_id.trim().is_empty() {
            return Err(ScoringError::InvalidRequest(
                "user_id is required".to_string(),
            ));
        }

        let usable: Vec<&EnrichedTransaction> = transactions
            .iter()
            .filter(|tx| {
                if tx.is_well_formed() {
                    true
                } else {
                    tracing::warn!(
                        "❌ Skipping malformed transaction (amount {}) for user {}",
                        tx.amount,
                        user_id
                    );
                    false
                }
            })
            .collect();

        let inflows: Vec<&EnrichedTransaction> =
            usable.iter().copied().filter(|tx| tx.amount > 0.0).collect();

        let streams = detect_streams(&inflows);
        let estimated_monthly_income: f64 = streams.iter().map(|s| s.monthly_amount).sum();

        let series = monthly_income_series(&inflows, 12);
        let last_6 = series[6..].to_vec();

        // Stability is measured over the months the user actually has data
        // for; padding a short history with empty months would misread a
        // steady earner as irregular.
        let stability = if inflows.is_empty() {
            IncomeStability::Irregular
        } else {
            classify_stability(monthly_sums(&inflows).coefficient_of_variation())
        };

        let recent = series[9..].mean();
        let prior = series[6..9].mean();
        let trend = classify_trend(recent, prior);

        let breakdown = category_breakdown(&streams);
        let confidence = income_confidence(&streams, inflows.len());
        let affordability =
            self.affordability_analysis(estimated_monthly_income, monthly_expenses, &usable);

        tracing::info!(
            "✓ Verified income for user {}: {:.2}/month, {:?}, {:?}, {} stream(s)",
            user_id,
            estimated_monthly_income,
            stability,
            trend,
            streams.len()
        );

        Ok(IncomeVerification {
            request_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            estimated_monthly_income,
            income_confidence: confidence,
            income_stability: stability,
            income_streams: streams,
            last_6_months_income: last_6,
            last_12_months_income: series,
            income_trend: trend,
            breakdown,
            affordability,
            verified_at: Utc::now(),
        })
    }

    /// Disposable income, debt-to-income and the affordable loan envelope.
    fn affordability_analysis(
        &self,
        monthly_income: f64,
        monthly_expenses: Option<f64>,
        transactions: &[&EnrichedTransaction],
    ) -> AffordabilityAnalysis {
        let expenses = monthly_expenses
            .unwrap_or(monthly_income * self.config.default_expense_ratio)
            .max(0.0);
        let disposable = monthly_income - expenses;

        let monthly_debt = monthly_debt_payments(transactions);
        let debt_to_income = if monthly_income > 0.0 {
            monthly_debt / monthly_income
        } else if monthly_debt > 0.0 {
            1.0
        } else {
            0.0
        };

        let max_payment = disposable.max(0.0) * self.config.affordability_payment_ratio;
        let max_loan = max_payment * self.config.affordability_loan_multiple as f64;

        let outflow_series = monthly_outflow_series(transactions);
        let high_expense_volatility =
            outflow_series.len() >= 2 && outflow_series.coefficient_of_variation() > 0.5;

        AffordabilityAnalysis {
            monthly_income,
            monthly_expenses: expenses,
            disposable_income: disposable,
            debt_to_income_ratio: debt_to_income,
            max_affordable_payment: max_payment,
            max_affordable_loan_amount: max_loan,
            over_leveraged: debt_to_income > self.config.over_leverage_threshold,
            high_expense_volatility,
        }
    }
}

// ============ Stream detection ============

/// Group inflows into income streams by normalized source label.
pub fn detect_streams(inflows: &[&EnrichedTransaction]) -> Vec<IncomeStream> {
    let mut groups: HashMap<String, Vec<&EnrichedTransaction>> = HashMap::new();
    for tx in inflows {
        groups.entry(stream_label(tx)).or_default().push(tx);
    }

    let mut streams: Vec<IncomeStream> = groups
        .into_iter()
        .map(|(label, group)| build_stream(label, &group))
        .collect();

    // Largest stream first; label breaks ties so output is deterministic.
    streams.sort_by(|a, b| {
        b.monthly_amount
            .partial_cmp(&a.monthly_amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.detected_from.cmp(&b.detected_from))
    });
    streams
}

fn build_stream(label: String, group: &[&EnrichedTransaction]) -> IncomeStream {
    let total: f64 = group.iter().map(|tx| tx.amount).sum();
    let months = months_spanned(group).max(1) as f64;

    let mut dates: Vec<DateTime<Utc>> = group.iter().map(|tx| tx.date).collect();
    dates.sort();
    let first_observed = dates[0];
    let last_observed = dates[dates.len() - 1];

    let mut gaps: Vec<f64> = dates
        .windows(2)
        .map(|w| (w[1] - w[0]).num_days() as f64)
        .collect();
    let frequency = if gaps.is_empty() {
        PaymentFrequency::Irregular
    } else {
        frequency_from_median_gap(median(&mut gaps))
    };

    let consistency = if group.len() < 2 {
        THIN_STREAM_CONSISTENCY
    } else {
        let monthly_sums = monthly_sums(group);
        consistency_from_cv(monthly_sums.coefficient_of_variation())
    };

    IncomeStream {
        stream_type: classify_stream(group, &label),
        monthly_amount: total / months,
        frequency,
        consistency_score: consistency,
        detected_from: label,
        first_observed,
        last_observed,
    }
}

/// Normalized grouping label: merchant name stripped of reference digits,
/// falling back to the detailed or primary category.
pub fn stream_label(tx: &EnrichedTransaction) -> String {
    let raw = tx
        .merchant
        .name
        .as_deref()
        .or(tx.category.detailed.as_deref())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{:?}", tx.category.primary));
    normalize_label(&raw)
}

/// Lowercase, drop reference numbers and punctuation, collapse whitespace.
pub fn normalize_label(raw: &str) -> String {
    let strip = Regex::new(r"[#:/\d]+").unwrap();
    let collapse = Regex::new(r"\s+").unwrap();
    let lowered = raw.to_lowercase();
    let stripped = strip.replace_all(&lowered, " ");
    collapse.replace_all(stripped.trim(), " ").to_string()
}

/// Classify a stream from its label keywords, then its dominant category.
pub fn classify_stream(group: &[&EnrichedTransaction], label: &str) -> StreamType {
    const KEYWORDS: [(&str, StreamType); 14] = [
        ("salary", StreamType::Employment),
        ("payroll", StreamType::Employment),
        ("wages", StreamType::Employment),
        ("rent", StreamType::Rental),
        ("dividend", StreamType::Investment),
        ("interest", StreamType::Investment),
        ("yield", StreamType::Investment),
        ("remit", StreamType::Remittance),
        ("western union", StreamType::Remittance),
        ("moneygram", StreamType::Remittance),
        ("pension", StreamType::Benefits),
        ("benefit", StreamType::Benefits),
        ("invoice", StreamType::Business),
        ("pos sales", StreamType::Business),
    ];

    for (keyword, stream_type) in KEYWORDS {
        if label.contains(keyword) {
            return stream_type;
        }
    }

    let income_count = group
        .iter()
        .filter(|tx| tx.category.primary == TransactionCategory::Income)
        .count();
    let transfer_count = group
        .iter()
        .filter(|tx| tx.category.primary == TransactionCategory::TransferIn)
        .count();

    if income_count * 2 > group.len() {
        StreamType::Employment
    } else if transfer_count * 2 > group.len() {
        StreamType::Remittance
    } else {
        StreamType::Other
    }
}

/// Cadence from the median gap between consecutive payments, in days.
pub fn frequency_from_median_gap(days: f64) -> PaymentFrequency {
    match days {
        d if d <= 9.0 => PaymentFrequency::Weekly,
        d if d <= 18.0 => PaymentFrequency::Biweekly,
        d if d <= 45.0 => PaymentFrequency::Monthly,
        _ => PaymentFrequency::Irregular,
    }
}

/// Regularity in [0, 100] from the CV of a stream's monthly sums.
pub fn consistency_from_cv(cv: f64) -> f64 {
    (100.0 * (1.0 - cv)).clamp(0.0, 100.0)
}

// ============ Series and classification ============

/// Per-calendar-month sums for one stream, covering its observed span.
fn monthly_sums(group: &[&EnrichedTransaction]) -> Vec<f64> {
    let mut by_month: HashMap<i64, f64> = HashMap::new();
    for tx in group {
        *by_month.entry(month_index(tx.date)).or_insert(0.0) += tx.amount;
    }
    let first = by_month.keys().min().copied().unwrap_or(0);
    let last = by_month.keys().max().copied().unwrap_or(0);
    (first..=last)
        .map(|m| by_month.get(&m).copied().unwrap_or(0.0))
        .collect()
}

/// Trailing monthly inflow series, oldest first, anchored at the latest
/// observed transaction month so the output is a pure function of input.
pub fn monthly_income_series(inflows: &[&EnrichedTransaction], months: usize) -> Vec<f64> {
    let mut series = vec![0.0; months];
    let anchor = match inflows.iter().map(|tx| tx.date).max() {
        Some(latest) => month_index(latest),
        None => return series,
    };

    for tx in inflows {
        let offset = anchor - month_index(tx.date);
        if (0..months as i64).contains(&offset) {
            series[months - 1 - offset as usize] += tx.amount;
        }
    }
    series
}

fn month_index(date: DateTime<Utc>) -> i64 {
    date.year() as i64 * 12 + date.month() as i64
}

/// Stability thresholds over the CV of the monthly series.
pub fn classify_stability(cv: f64) -> IncomeStability {
    match cv {
        cv if cv < 0.10 => IncomeStability::VeryStable,
        cv if cv < 0.25 => IncomeStability::Stable,
        cv if cv < 0.50 => IncomeStability::Variable,
        _ => IncomeStability::Irregular,
    }
}

/// Trend from the mean of the last 3 months vs the prior 3 months.
pub fn classify_trend(recent: f64, prior: f64) -> IncomeTrend {
    if prior <= 0.0 {
        return if recent > 0.0 {
            IncomeTrend::Increasing
        } else {
            IncomeTrend::Stable
        };
    }

    let change = (recent - prior) / prior;
    if change > 0.10 {
        IncomeTrend::Increasing
    } else if change < -0.10 {
        IncomeTrend::Decreasing
    } else {
        IncomeTrend::Stable
    }
}

fn category_breakdown(streams: &[IncomeStream]) -> IncomeBreakdown {
    let mut breakdown = IncomeBreakdown::default();
    for stream in streams {
        let slot = match stream.stream_type {
            StreamType::Employment => &mut breakdown.employment,
            StreamType::Business => &mut breakdown.business,
            StreamType::Rental => &mut breakdown.rental,
            StreamType::Investment => &mut breakdown.investment,
            StreamType::Remittance => &mut breakdown.remittance,
            StreamType::Benefits => &mut breakdown.benefits,
            StreamType::Other => &mut breakdown.other,
        };
        *slot += stream.monthly_amount;
    }
    breakdown
}

/// Amount-weighted mean stream consistency, scaled down for thin histories.
fn income_confidence(streams: &[IncomeStream], observations: usize) -> f64 {
    let total: f64 = streams.iter().map(|s| s.monthly_amount).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = streams
        .iter()
        .map(|s| (s.consistency_score / 100.0) * (s.monthly_amount / total))
        .sum();
    let history_factor = (observations as f64 / 3.0).min(1.0);
    weighted * history_factor
}

/// Monthly average of loan-payment outflows across the observed window.
fn monthly_debt_payments(transactions: &[&EnrichedTransaction]) -> f64 {
    let debt: Vec<&EnrichedTransaction> = transactions
        .iter()
        .copied()
        .filter(|tx| tx.category.primary == TransactionCategory::LoanPayments && tx.amount < 0.0)
        .collect();
    if debt.is_empty() {
        return 0.0;
    }
    let months = months_spanned(transactions).max(1) as f64;
    debt.iter().map(|tx| tx.amount.abs()).sum::<f64>() / months
}

/// Per-month total outflows, for the expense-volatility flag.
fn monthly_outflow_series(transactions: &[&EnrichedTransaction]) -> Vec<f64> {
    let outflows: Vec<&EnrichedTransaction> = transactions
        .iter()
        .copied()
        .filter(|tx| tx.amount < 0.0)
        .collect();
    if outflows.is_empty() {
        return Vec::new();
    }
    let mut by_month: HashMap<i64, f64> = HashMap::new();
    for tx in &outflows {
        *by_month.entry(month_index(tx.date)).or_insert(0.0) += tx.amount.abs();
    }
    let first = by_month.keys().min().copied().unwrap_or(0);
    let last = by_month.keys().max().copied().unwrap_or(0);
    (first..=last)
        .map(|m| by_month.get(&m).copied().unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn inflow(amount: f64, year: i32, month: u32, day: u32, merchant: &str) -> EnrichedTransaction {
        EnrichedTransaction {
            amount,
            date: Utc.with_ymd_and_hms(year, month, day, 9, 0, 0).unwrap(),
            category: CategoryInfo {
                primary: TransactionCategory::Income,
                detailed: None,
            },
            merchant: MerchantInfo {
                name: Some(merchant.to_string()),
            },
        }
    }

    #[test]
    fn stability_thresholds_match_contract() {
        assert_eq!(classify_stability(0.05), IncomeStability::VeryStable);
        assert_eq!(classify_stability(0.10), IncomeStability::Stable);
        assert_eq!(classify_stability(0.30), IncomeStability::Variable);
        assert_eq!(classify_stability(0.80), IncomeStability::Irregular);
    }

    #[test]
    fn trend_thresholds_match_contract() {
        // 1200 vs 1000 is a +20% change
        assert_eq!(classify_trend(1200.0, 1000.0), IncomeTrend::Increasing);
        assert_eq!(classify_trend(1000.0, 1000.0), IncomeTrend::Stable);
        assert_eq!(classify_trend(850.0, 1000.0), IncomeTrend::Decreasing);
        assert_eq!(classify_trend(1050.0, 1000.0), IncomeTrend::Stable);
    }

    #[test]
    fn trend_handles_zero_prior() {
        assert_eq!(classify_trend(500.0, 0.0), IncomeTrend::Increasing);
        assert_eq!(classify_trend(0.0, 0.0), IncomeTrend::Stable);
    }

    #[test]
    fn label_normalization_strips_references() {
        assert_eq!(normalize_label("ACME PAYROLL #4821"), "acme payroll");
        assert_eq!(normalize_label("MTN MoMo 024/991"), "mtn momo");
        assert_eq!(normalize_label("  Rent:Unit 12  "), "rent unit");
    }

    #[test]
    fn frequency_from_gaps() {
        assert_eq!(frequency_from_median_gap(7.0), PaymentFrequency::Weekly);
        assert_eq!(frequency_from_median_gap(14.0), PaymentFrequency::Biweekly);
        assert_eq!(frequency_from_median_gap(30.0), PaymentFrequency::Monthly);
        assert_eq!(frequency_from_median_gap(70.0), PaymentFrequency::Irregular);
    }

    #[test]
    fn consistency_clamped_to_percentage() {
        assert_eq!(consistency_from_cv(0.0), 100.0);
        assert!((consistency_from_cv(0.4) - 60.0).abs() < 1e-9);
        assert_eq!(consistency_from_cv(1.5), 0.0);
    }

    #[test]
    fn detects_monthly_salary_stream() {
        let txs: Vec<EnrichedTransaction> = (1..=6)
            .map(|m| inflow(2400.0, 2025, m, 25, "Acme Payroll #100"))
            .collect();
        let refs: Vec<&EnrichedTransaction> = txs.iter().collect();

        let streams = detect_streams(&refs);
        assert_eq!(streams.len(), 1);
        let stream = &streams[0];
        assert_eq!(stream.stream_type, StreamType::Employment);
        assert_eq!(stream.frequency, PaymentFrequency::Monthly);
        assert!((stream.monthly_amount - 2400.0).abs() < 1e-9);
        assert!(stream.consistency_score > 95.0);
        assert_eq!(stream.detected_from, "acme payroll");
    }

    #[test]
    fn series_anchors_at_latest_month() {
        let txs = vec![
            inflow(1000.0, 2025, 4, 25, "Acme Payroll"),
            inflow(1000.0, 2025, 5, 25, "Acme Payroll"),
            inflow(1000.0, 2025, 6, 25, "Acme Payroll"),
        ];
        let refs: Vec<&EnrichedTransaction> = txs.iter().collect();
        let series = monthly_income_series(&refs, 12);
        assert_eq!(series.len(), 12);
        assert_eq!(series[11], 1000.0);
        assert_eq!(series[10], 1000.0);
        assert_eq!(series[9], 1000.0);
        assert_eq!(series[..9].iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn no_inflows_yield_zero_series() {
        let series = monthly_income_series(&[], 12);
        assert_eq!(series, vec![0.0; 12]);
    }
}
