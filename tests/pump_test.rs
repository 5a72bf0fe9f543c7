use serde_json::{Value, json};
use splunk_pump::pump::{DeliveryPolicy, PUMP_NAME, Pump, SplunkPump};
use splunk_pump::sender::{COLLECTOR_PATH, ClientError, SendError};
use splunk_pump::{AnalyticsRecord, PumpConfig, PumpError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, method, path},
};

fn record(path: &str) -> AnalyticsRecord {
    AnalyticsRecord {
        method: "GET".to_string(),
        path: path.to_string(),
        response_code: 200,
        api_key: "1234567890".to_string(),
        timestamp: "2024-05-01T12:34:56Z".parse().unwrap(),
        api_version: "v1".to_string(),
        api_name: "orders".to_string(),
        api_id: "api-1".to_string(),
        org_id: "org-1".to_string(),
        oauth_id: String::new(),
        raw_request: "R0VUIC94".to_string(),
        raw_response: "SFRUUC8xLjEgMjAwIE9L".to_string(),
        request_time: 42,
        ip_address: "10.0.0.1".to_string(),
    }
}

fn config_for(server: &MockServer) -> PumpConfig {
    PumpConfig {
        collector_token: "tok".to_string(),
        collector_url: server.uri(),
        ssl_insecure_skip_verify: true,
        ..Default::default()
    }
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(COLLECTOR_PATH))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Requests for records with path `/slow` outlive the 200ms request timeout.
async fn mount_slow_path(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"event": {"path": "/slow"}})))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .with_priority(1)
        .mount(server)
        .await;
}

async fn received_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["event"]["path"].as_str().unwrap_or_default().to_string()
        })
        .collect()
}

#[tokio::test]
async fn test_init_rejects_empty_token() {
    let config = PumpConfig {
        collector_url: "https://h:8088".to_string(),
        ssl_insecure_skip_verify: true,
        ..Default::default()
    };

    let err = SplunkPump::init(&config).unwrap_err();
    assert!(matches!(
        err,
        PumpError::Client(ClientError::InvalidSettings(_))
    ));
}

#[tokio::test]
async fn test_init_rejects_invalid_config() {
    let config = PumpConfig {
        collector_token: "tok".to_string(),
        collector_url: "https://h:8088".to_string(),
        ssl_insecure_skip_verify: true,
        max_in_flight: 0,
        ..Default::default()
    };

    assert!(matches!(
        SplunkPump::init(&config),
        Err(PumpError::Config(_))
    ));
}

#[tokio::test]
async fn test_name() {
    let mock_server = MockServer::start().await;
    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();
    assert_eq!(pump.name(), PUMP_NAME);
    assert_eq!(pump.name(), "Splunk Pump");
}

#[tokio::test]
async fn test_default_projection_on_the_wire() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;

    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();
    let report = pump
        .write_data(&CancellationToken::new(), &[record("/x")])
        .await
        .unwrap();
    assert!(report.is_complete());

    let requests = mock_server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    let event = body["event"].as_object().unwrap();

    assert_eq!(body["time"], json!(1_714_566_896));
    assert_eq!(event.len(), 14);
    assert_eq!(event["method"], json!("GET"));
    assert_eq!(event["response_code"], json!(200));
    assert_eq!(event["api_key"], json!("1234567890"));
    assert_eq!(event["time_stamp"], json!("2024-05-01T12:34:56Z"));
    assert_eq!(event["oauth_id"], json!(""));
}

#[tokio::test]
async fn test_explicit_projection_with_redaction_on_the_wire() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_json(json!({
            "time": 1_714_566_896,
            "event": {"api_key": "****7890", "method": "GET"}
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = PumpConfig {
        fields: vec![
            "api_key".to_string(),
            "method".to_string(),
            "not_a_field".to_string(),
        ],
        obfuscate_api_keys: true,
        obfuscate_api_keys_length: 4,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();

    let report = pump
        .write_data(&CancellationToken::new(), &[record("/x")])
        .await
        .unwrap();

    assert_eq!(report.delivered, 1);
}

#[tokio::test]
async fn test_events_are_sent_in_input_order() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;

    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();
    let records: Vec<_> = ["/a", "/b", "/c", "/d"].into_iter().map(record).collect();

    let report = pump
        .write_data(&CancellationToken::new(), &records)
        .await
        .unwrap();

    assert_eq!(report.attempted, 4);
    assert_eq!(report.delivered, 4);
    assert_eq!(received_paths(&mock_server).await, vec!["/a", "/b", "/c", "/d"]);
}

#[tokio::test]
async fn test_empty_batch() {
    let mock_server = MockServer::start().await;
    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();

    let report = pump
        .write_data(&CancellationToken::new(), &[])
        .await
        .unwrap();

    assert_eq!(report.attempted, 0);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_fire_and_forget_swallows_item_failure() {
    let mock_server = MockServer::start().await;
    mount_slow_path(&mock_server).await;
    mount_ok(&mock_server).await;

    let config = PumpConfig {
        request_timeout_ms: Some(200),
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();
    let records = vec![record("/a"), record("/slow"), record("/c")];

    let report = pump
        .write_data(&CancellationToken::new(), &records)
        .await
        .unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(report.failures[0].error.is_timeout());
}

#[tokio::test]
async fn test_aggregate_reports_item_failure() {
    let mock_server = MockServer::start().await;
    mount_slow_path(&mock_server).await;
    mount_ok(&mock_server).await;

    let config = PumpConfig {
        request_timeout_ms: Some(200),
        delivery_policy: DeliveryPolicy::Aggregate,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();
    let records = vec![record("/a"), record("/slow"), record("/c")];

    let err = pump
        .write_data(&CancellationToken::new(), &records)
        .await
        .unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].index, 1);
    assert_eq!(err.report.delivered, 2);
    assert_eq!(err.to_string(), "1 of 3 events failed to deliver");
}

#[tokio::test]
async fn test_aggregate_succeeds_when_everything_is_delivered() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;

    let config = PumpConfig {
        delivery_policy: DeliveryPolicy::Aggregate,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();

    let report = pump
        .write_data(&CancellationToken::new(), &[record("/a"), record("/b")])
        .await
        .unwrap();

    assert!(report.is_complete());
}

#[tokio::test]
async fn test_http_errors_are_not_failures_by_default() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = PumpConfig {
        delivery_policy: DeliveryPolicy::Aggregate,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();

    let report = pump
        .write_data(&CancellationToken::new(), &[record("/a")])
        .await
        .unwrap();

    assert_eq!(report.delivered, 1);
}

#[tokio::test]
async fn test_strict_status_counts_http_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"event": {"path": "/bad"}})))
        .respond_with(ResponseTemplate::new(400))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    mount_ok(&mock_server).await;

    let config = PumpConfig {
        delivery_policy: DeliveryPolicy::Aggregate,
        strict_status: true,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();

    let err = pump
        .write_data(
            &CancellationToken::new(),
            &[record("/a"), record("/b"), record("/bad")],
        )
        .await
        .unwrap_err();

    assert_eq!(err.failures().len(), 1);
    assert_eq!(err.failures()[0].index, 2);
    assert!(matches!(
        err.failures()[0].error,
        SendError::Status { status: 400 }
    ));
}

#[tokio::test]
async fn test_cancelled_batch_sends_nothing() {
    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;

    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let report = pump
        .write_data(&cancel, &[record("/a"), record("/b"), record("/c")])
        .await
        .unwrap();

    assert_eq!(report.delivered, 0);
    assert_eq!(report.cancelled(), 3);
    assert!(received_paths(&mock_server).await.is_empty());
}

#[tokio::test]
async fn test_cancel_mid_batch_stops_remaining_sends() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();
    let records: Vec<_> = (0..5).map(|i| record(&format!("/{i}"))).collect();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        trigger.cancel();
    });

    let report = pump.write_data(&cancel, &records).await.unwrap();

    assert_eq!(report.attempted, 5);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.cancelled(), 4);
    let indices: Vec<_> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4]);
    assert!(report.failures.iter().all(|f| f.error.is_cancelled()));
    let sent = received_paths(&mock_server).await;
    assert!(sent.iter().all(|p| p == "/0" || p == "/1"));
}

#[tokio::test]
async fn test_bounded_concurrency_overlaps_sends() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&mock_server)
        .await;

    let config = PumpConfig {
        max_in_flight: 4,
        ..config_for(&mock_server)
    };
    let pump = SplunkPump::init(&config).unwrap();
    let records: Vec<_> = (0..8).map(|i| record(&format!("/{i}"))).collect();

    let start = Instant::now();
    let report = pump
        .write_data(&CancellationToken::new(), &records)
        .await
        .unwrap();

    assert_eq!(report.delivered, 8);
    // Sequential delivery would need at least 2.4s.
    assert!(start.elapsed() < Duration::from_millis(2000));
}

#[tokio::test]
async fn test_generic_pump_usage() {
    async fn write_through<P: Pump>(pump: &P, records: &[AnalyticsRecord]) -> usize {
        pump.write_data(&CancellationToken::new(), records)
            .await
            .map(|report| report.delivered)
            .unwrap_or_default()
    }

    let mock_server = MockServer::start().await;
    mount_ok(&mock_server).await;
    let pump = SplunkPump::init(&config_for(&mock_server)).unwrap();

    assert_eq!(write_through(&pump, &[record("/a"), record("/b")]).await, 2);
}
