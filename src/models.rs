use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============ Transaction Input (owned upstream) ============

/// Primary category assigned by the transaction-enrichment pipeline.
///
/// Closed taxonomy; unknown upstream labels map to `Other` at the edge so the
/// scoring core never sees open strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionCategory {
    Income,
    TransferIn,
    TransferOut,
    LoanPayments,
    BankFees,
    Entertainment,
    FoodAndDrink,
    GeneralMerchandise,
    GeneralServices,
    Medical,
    PersonalCare,
    RentAndUtilities,
    Transportation,
    Travel,
    Other,
}

/// Category block of an enriched transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
    /// Primary category from the fixed taxonomy.
    pub primary: TransactionCategory,
    /// Optional finer-grained label from the enrichment pipeline.
    pub detailed: Option<String>,
}

/// Merchant block of an enriched transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantInfo {
    /// Matched merchant name, if the enrichment pipeline resolved one.
    pub name: Option<String>,
}

/// A single categorized transaction, produced by the upstream enrichment
/// component. Read-only input to both engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTransaction {
    /// Signed amount. Positive values are inflows.
    pub amount: f64,
    /// Transaction date.
    pub date: DateTime<Utc>,
    /// Category assigned upstream.
    pub category: CategoryInfo,
    /// Merchant match assigned upstream.
    pub merchant: MerchantInfo,
}

impl EnrichedTransaction {
    /// Amounts must be finite to enter statistical aggregates. NaN or
    /// infinite amounts from a broken upstream feed are skipped, not fatal.
    pub fn is_well_formed(&self) -> bool {
        self.amount.is_finite()
    }
}

// ============ Credit Score Output ============

/// Coarse qualitative bucket derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScoreBand {
    Poor,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl ScoreBand {
    /// Band boundaries: ≥750 EXCELLENT, ≥700 VERY_GOOD, ≥650 GOOD,
    /// ≥600 FAIR, otherwise POOR.
    pub fn from_score(score: u16) -> Self {
        match score {
            s if s >= 750 => ScoreBand::Excellent,
            s if s >= 700 => ScoreBand::VeryGood,
            s if s >= 650 => ScoreBand::Good,
            s if s >= 600 => ScoreBand::Fair,
            _ => ScoreBand::Poor,
        }
    }
}

/// Letter grade used by lending/underwriting consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskGrade {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl RiskGrade {
    /// Grade boundaries: ≥750 A, ≥700 B, ≥650 C, ≥600 D, ≥550 E, else F.
    pub fn from_score(score: u16) -> Self {
        match score {
            s if s >= 750 => RiskGrade::A,
            s if s >= 700 => RiskGrade::B,
            s if s >= 650 => RiskGrade::C,
            s if s >= 600 => RiskGrade::D,
            s if s >= 550 => RiskGrade::E,
            _ => RiskGrade::F,
        }
    }
}

/// Direction of a score factor's contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorDirection {
    Positive,
    Negative,
}

/// One explainability entry shown to end users and underwriters.
///
/// Advisory text only; never feeds back into any computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactor {
    /// Factor category label (e.g. "Payment History", "Mobile Money Usage").
    pub category: String,
    /// Whether the factor pushed the score up or down.
    pub direction: FactorDirection,
    /// Importance weight for display ordering.
    pub weight: u8,
    /// Human-readable description.
    pub description: String,
}

/// The normalized creditworthiness record produced by the scoring engine.
///
/// Created once per scoring request and immutable thereafter. Expires 90
/// days after `scored_at`; consumers must re-score after expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditScore {
    /// Correlation id for this scoring request.
    pub request_id: Uuid,
    /// The user the score belongs to.
    pub user_id: String,
    /// Normalized score in [300, 850].
    pub credit_score: u16,
    /// Qualitative band, pure function of `credit_score`.
    pub score_band: ScoreBand,
    /// Percentile in [1, 99], pure function of `credit_score`.
    pub percentile: u8,
    /// Estimated default probability in [0.01, 0.99], non-increasing in score.
    pub default_probability: f64,
    /// Letter grade, pure function of `credit_score`.
    pub risk_grade: RiskGrade,
    /// Recommended credit limit, from the band lookup table.
    pub recommended_credit_limit: f64,
    /// Recommended annual interest rate in percent.
    pub recommended_interest_rate: f64,
    /// Recommended loan term in months.
    pub recommended_loan_term_months: u32,
    /// Ordered explainability entries, most important first.
    pub score_factors: Vec<ScoreFactor>,
    /// Alternative-data breakdown; present only when the caller consented
    /// to alternative data and at least one sub-scorer succeeded.
    pub alternative_data_score: Option<AlternativeDataScore>,
    /// Version of the scoring model that produced this record.
    pub model_version: String,
    /// Confidence in the score given data volume and signal coverage.
    pub model_confidence: f64,
    /// When the score was computed.
    pub scored_at: DateTime<Utc>,
    /// When the score stops being valid (scored_at + 90 days).
    pub expires_at: DateTime<Utc>,
}

// ============ Alternative Data ============

/// The eight alternative-data signal categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalCategory {
    MobileMoney,
    Telecom,
    Utility,
    Employment,
    Education,
    Social,
    Location,
    DigitalFootprint,
}

impl SignalCategory {
    pub const ALL: [SignalCategory; 8] = [
        SignalCategory::MobileMoney,
        SignalCategory::Telecom,
        SignalCategory::Utility,
        SignalCategory::Employment,
        SignalCategory::Education,
        SignalCategory::Social,
        SignalCategory::Location,
        SignalCategory::DigitalFootprint,
    ];

    /// Display label used in explainability factors.
    pub fn label(&self) -> &'static str {
        match self {
            SignalCategory::MobileMoney => "Mobile Money Usage",
            SignalCategory::Telecom => "Telecom Behavior",
            SignalCategory::Utility => "Utility Payments",
            SignalCategory::Employment => "Employment Verification",
            SignalCategory::Education => "Education Background",
            SignalCategory::Social => "Social Stability",
            SignalCategory::Location => "Location Stability",
            SignalCategory::DigitalFootprint => "Digital Footprint",
        }
    }

    /// Importance weight the factor generator assigns when this signal is
    /// strong enough to emit a factor.
    pub fn factor_weight(&self) -> u8 {
        match self {
            SignalCategory::MobileMoney => 25,
            SignalCategory::Telecom => 20,
            SignalCategory::Utility => 20,
            SignalCategory::Employment => 25,
            SignalCategory::Education => 10,
            SignalCategory::Social => 10,
            SignalCategory::Location => 15,
            SignalCategory::DigitalFootprint => 10,
        }
    }
}

/// A sub-score together with its category-specific insight payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScore<I> {
    /// Sub-score in [0, 100].
    pub score: f64,
    /// Category-specific insights backing the sub-score.
    pub insights: I,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileMoneyInsights {
    pub monthly_transaction_count: f64,
    pub monthly_volume: f64,
    pub account_age_months: u32,
    pub agent_diversity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelecomInsights {
    pub monthly_airtime_spend: f64,
    pub topups_per_month: f64,
    pub tenure_months: u32,
    pub data_usage_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtilityInsights {
    pub on_time_payment_rate: f64,
    pub active_accounts: u32,
    pub months_of_history: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentInsights {
    pub status: String,
    pub tenure_months: u32,
    pub employer_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationInsights {
    pub highest_level: String,
    pub institution_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialInsights {
    pub network_size: u32,
    pub account_age_months: u32,
    pub mutual_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInsights {
    pub months_at_current_address: u32,
    pub address_changes_last_two_years: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalFootprintInsights {
    pub active_platforms: u32,
    pub email_age_months: u32,
    pub device_count: u32,
}

/// The fixed set of eight alternative-data sub-scores.
///
/// Value object embedded in `CreditScore`; a `None` sub-score means that
/// provider failed or timed out and was excluded from the composite.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeDataScore {
    pub mobile_money: Option<SignalScore<MobileMoneyInsights>>,
    pub telecom: Option<SignalScore<TelecomInsights>>,
    pub utility: Option<SignalScore<UtilityInsights>>,
    pub employment: Option<SignalScore<EmploymentInsights>>,
    pub education: Option<SignalScore<EducationInsights>>,
    pub social: Option<SignalScore<SocialInsights>>,
    pub location: Option<SignalScore<LocationInsights>>,
    pub digital_footprint: Option<SignalScore<DigitalFootprintInsights>>,
    /// Average of the available sub-scores, in [0, 100].
    pub composite_score: f64,
}

impl AlternativeDataScore {
    /// Sub-scores that actually arrived, with their categories.
    pub fn available(&self) -> Vec<(SignalCategory, f64)> {
        let mut out = Vec::new();
        if let Some(s) = &self.mobile_money {
            out.push((SignalCategory::MobileMoney, s.score));
        }
        if let Some(s) = &self.telecom {
            out.push((SignalCategory::Telecom, s.score));
        }
        if let Some(s) = &self.utility {
            out.push((SignalCategory::Utility, s.score));
        }
        if let Some(s) = &self.employment {
            out.push((SignalCategory::Employment, s.score));
        }
        if let Some(s) = &self.education {
            out.push((SignalCategory::Education, s.score));
        }
        if let Some(s) = &self.social {
            out.push((SignalCategory::Social, s.score));
        }
        if let Some(s) = &self.location {
            out.push((SignalCategory::Location, s.score));
        }
        if let Some(s) = &self.digital_footprint {
            out.push((SignalCategory::DigitalFootprint, s.score));
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.available().is_empty()
    }
}

// ============ Income Verification Output ============

/// Stability classification of the monthly income series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeStability {
    VeryStable,
    Stable,
    Variable,
    Irregular,
}

/// Direction of recent income movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IncomeTrend {
    Increasing,
    Stable,
    Decreasing,
}

/// Kind of income stream detected from the inflow history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamType {
    Employment,
    Business,
    Rental,
    Investment,
    Remittance,
    Benefits,
    Other,
}

/// Inferred payment cadence of an income stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    Monthly,
    Irregular,
}

/// One detected recurring income source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStream {
    /// Classified kind of the stream.
    pub stream_type: StreamType,
    /// Average monthly amount attributed to this stream.
    pub monthly_amount: f64,
    /// Inferred payment cadence.
    pub frequency: PaymentFrequency,
    /// Regularity measure in [0, 100].
    pub consistency_score: f64,
    /// Provenance: the normalized source label the stream was grouped by.
    pub detected_from: String,
    /// First observation in the input window.
    pub first_observed: DateTime<Utc>,
    /// Last observation in the input window.
    pub last_observed: DateTime<Utc>,
}

/// Monthly income totals by stream category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeBreakdown {
    pub employment: f64,
    pub business: f64,
    pub rental: f64,
    pub investment: f64,
    pub remittance: f64,
    pub benefits: f64,
    pub other: f64,
}

/// Income-vs-expense figures used to size a lending recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AffordabilityAnalysis {
    /// Estimated total monthly income.
    pub monthly_income: f64,
    /// Supplied or assumed total monthly expenses.
    pub monthly_expenses: f64,
    /// Income minus expenses.
    pub disposable_income: f64,
    /// Monthly debt payments over monthly income.
    pub debt_to_income_ratio: f64,
    /// Largest monthly payment the user can carry.
    pub max_affordable_payment: f64,
    /// Largest loan envelope at the fixed affordability multiple.
    pub max_affordable_loan_amount: f64,
    /// Debt-to-income above the over-leverage threshold.
    pub over_leveraged: bool,
    /// Monthly outflows vary enough to flag expense volatility.
    pub high_expense_volatility: bool,
}

/// The income-verification record. Independent lifecycle from `CreditScore`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeVerification {
    /// Correlation id for this verification request.
    pub request_id: Uuid,
    /// The user the verification belongs to.
    pub user_id: String,
    /// Sum of detected stream monthly amounts.
    pub estimated_monthly_income: f64,
    /// Confidence in the estimate, in [0, 1].
    pub income_confidence: f64,
    /// Stability classification of the monthly series.
    pub income_stability: IncomeStability,
    /// Detected recurring income sources.
    pub income_streams: Vec<IncomeStream>,
    /// Trailing 6-month income series, oldest first. Always length 6.
    pub last_6_months_income: Vec<f64>,
    /// Trailing 12-month income series, oldest first. Always length 12.
    pub last_12_months_income: Vec<f64>,
    /// Recent trend: last 3 months vs the prior 3.
    pub income_trend: IncomeTrend,
    /// Monthly totals by stream category.
    pub breakdown: IncomeBreakdown,
    /// Derived affordability figures.
    pub affordability: AffordabilityAnalysis,
    /// When the verification was computed.
    pub verified_at: DateTime<Utc>,
}
