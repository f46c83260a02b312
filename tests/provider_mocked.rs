/// Integration tests with mocked alternative-data providers
/// Exercises the HTTP provider client and the scoring engine's degradation
/// behavior without hitting real external services.
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reshadx_scoring::config::Config;
use reshadx_scoring::identity::IdentityHints;
use reshadx_scoring::models::*;
use reshadx_scoring::providers::{AlternativeDataProvider, HttpDataProvider};
use reshadx_scoring::scoring::{ScoringEngine, ScoringRequest};

/// Helper function to create test config
fn create_test_config(provider_base_url: String) -> Config {
    Config {
        provider_base_url,
        provider_api_key: "test_key".to_string(),
        provider_timeout_ms: 200,
        phone_region: "GH".to_string(),
        default_expense_ratio: 0.70,
        affordability_payment_ratio: 0.35,
        affordability_loan_multiple: 24,
        over_leverage_threshold: 0.40,
    }
}

fn full_hints() -> IdentityHints {
    IdentityHints {
        phone_number: Some("+233241234567".to_string()),
        national_id: Some("GHA-000123456-7".to_string()),
    }
}

fn signal_body(segment: &str) -> serde_json::Value {
    match segment {
        "mobile-money" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "monthlyTransactionCount": 40.0,
                "monthlyVolume": 1500.0,
                "accountAgeMonths": 24,
                "agentDiversity": 6
            }
        }),
        "telecom" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "monthlyAirtimeSpend": 20.0,
                "topupsPerMonth": 6.0,
                "tenureMonths": 36,
                "dataUsageMb": 1800.0
            }
        }),
        "utility" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "onTimePaymentRate": 0.95,
                "activeAccounts": 2,
                "monthsOfHistory": 20
            }
        }),
        "employment" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "status": "EMPLOYED",
                "tenureMonths": 30,
                "employerVerified": true
            }
        }),
        "education" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "highestLevel": "TERTIARY",
                "institutionVerified": true
            }
        }),
        "social" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "networkSize": 250,
                "accountAgeMonths": 48,
                "mutualConnections": 30
            }
        }),
        "location" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "monthsAtCurrentAddress": 26,
                "addressChangesLastTwoYears": 1
            }
        }),
        "digital-footprint" => serde_json::json!({
            "score": 80.0,
            "insights": {
                "activePlatforms": 3,
                "emailAgeMonths": 60,
                "deviceCount": 2
            }
        }),
        _ => panic!("unknown segment {}", segment),
    }
}

const ALL_SEGMENTS: [&str; 8] = [
    "mobile-money",
    "telecom",
    "utility",
    "employment",
    "education",
    "social",
    "location",
    "digital-footprint",
];

async fn mount_segment(server: &MockServer, segment: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/signals/{}", segment)))
        .and(query_param("key", "test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(signal_body(segment)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_utility_signal_success() {
    let mock_server = MockServer::start().await;
    mount_segment(&mock_server, "utility").await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let signal = provider.utility(&full_hints()).await.unwrap();
    assert_eq!(signal.score, 80.0);
    assert_eq!(signal.insights.active_accounts, 2);
    assert!((signal.insights.on_time_payment_rate - 0.95).abs() < 1e-9);
}

#[tokio::test]
async fn test_out_of_range_scores_are_clamped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/signals/utility"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "score": 250.0,
            "insights": {
                "onTimePaymentRate": 1.0,
                "activeAccounts": 3,
                "monthsOfHistory": 40
            }
        })))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let signal = provider.utility(&full_hints()).await.unwrap();
    assert_eq!(signal.score, 100.0);
}

#[tokio::test]
async fn test_server_error_exhausts_retries() {
    let mock_server = MockServer::start().await;

    // 1 initial attempt + 2 retries
    Mock::given(method("GET"))
        .and(path("/v1/signals/utility"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let result = provider.utility(&full_hints()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/signals/social"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(signal_body("social"))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let result = provider.social(&full_hints()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_malformed_payload_is_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/signals/location"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let result = provider.location(&full_hints()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_missing_phone_hint_fails_without_http_call() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/signals/mobile-money"))
        .respond_with(ResponseTemplate::new(200).set_body_json(signal_body("mobile-money")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = HttpDataProvider::new(&config).unwrap();

    let result = provider.mobile_money(&IdentityHints::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_engine_blends_mocked_signals_for_thin_file() {
    let mock_server = MockServer::start().await;
    for segment in ALL_SEGMENTS {
        mount_segment(&mock_server, segment).await;
    }

    let config = create_test_config(mock_server.uri());
    let provider = Arc::new(HttpDataProvider::new(&config).unwrap());
    let engine = ScoringEngine::new(config, provider);

    // No transactions at all: traditional floor 300, alternative average 80
    // rescales to 740, blend is round(300*0.4 + 740*0.6) = 564.
    let request = ScoringRequest {
        user_id: "thin-file-user".to_string(),
        transactions: vec![],
        identity: full_hints(),
        include_alternative_data: true,
    };

    let score = engine.score(&request).await.unwrap();
    assert_eq!(score.credit_score, 564);
    assert_eq!(score.score_band, ScoreBand::Poor);
    assert_eq!(score.risk_grade, RiskGrade::E);

    let alt = score.alternative_data_score.as_ref().unwrap();
    assert_eq!(alt.available().len(), 8);
    assert!((alt.composite_score - 80.0).abs() < 1e-9);

    // Thin file, but full signal coverage: confidence is the volume base.
    assert!((score.model_confidence - 0.3).abs() < 1e-9);
}

#[tokio::test]
async fn test_engine_tolerates_one_dead_provider() {
    let mock_server = MockServer::start().await;
    for segment in ALL_SEGMENTS {
        if segment != "education" {
            mount_segment(&mock_server, segment).await;
        }
    }
    Mock::given(method("GET"))
        .and(path("/v1/signals/education"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(mock_server.uri());
    let provider = Arc::new(HttpDataProvider::new(&config).unwrap());
    let engine = ScoringEngine::new(config, provider);

    let request = ScoringRequest {
        user_id: "thin-file-user".to_string(),
        transactions: vec![],
        identity: full_hints(),
        include_alternative_data: true,
    };

    let score = engine.score(&request).await.unwrap();

    let alt = score.alternative_data_score.as_ref().unwrap();
    assert_eq!(alt.available().len(), 7);
    assert!(alt.education.is_none());

    // Seven identical sub-scores still average to 80.
    assert!((alt.composite_score - 80.0).abs() < 1e-9);
    assert_eq!(score.credit_score, 564);

    // One failed sub-scorer trims confidence below the full-coverage run.
    assert!(score.model_confidence < 0.3);
}

#[tokio::test]
async fn test_concurrent_scoring_requests() {
    let mock_server = MockServer::start().await;
    for segment in ALL_SEGMENTS {
        mount_segment(&mock_server, segment).await;
    }

    let config = create_test_config(mock_server.uri());
    let provider = Arc::new(HttpDataProvider::new(&config).unwrap());
    let engine = Arc::new(ScoringEngine::new(config, provider));

    let mut handles = vec![];
    for i in 0..10 {
        let engine_clone = engine.clone();
        let handle = tokio::spawn(async move {
            let request = ScoringRequest {
                user_id: format!("user-{}", i),
                transactions: vec![],
                identity: full_hints(),
                include_alternative_data: true,
            };
            engine_clone.score(&request).await
        });
        handles.push(handle);
    }

    for handle in handles {
        let score = handle.await.unwrap().unwrap();
        assert_eq!(score.credit_score, 564);
    }
}
