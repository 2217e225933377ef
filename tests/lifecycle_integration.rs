//! End-to-end lifecycle tests: real provider, gateway and file sink against a
//! wiremock platform, with a manual clock for the poll waits.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use ledger_report_core::{
    FileSink, HttpReportGateway, LifecycleOrchestrator, LifecycleState, ManualClock,
    OutcomeCategory, PollPolicy,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::{SUBSCRIPTION_KEY, base_url, client, manual_clock, token_provider};

struct Platform {
    server: MockServer,
    clock: Arc<ManualClock>,
    output: TempDir,
}

impl Platform {
    async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            clock: manual_clock(),
            output: TempDir::new().unwrap(),
        }
    }

    fn orchestrator(&self) -> LifecycleOrchestrator {
        let gateway = HttpReportGateway::new(client(), &base_url(&self.server), SUBSCRIPTION_KEY);
        LifecycleOrchestrator::new(
            Arc::new(token_provider(&self.server, Arc::clone(&self.clock))),
            Arc::new(gateway),
            Arc::new(FileSink::new(self.output.path())),
            self.clock.clone(),
        )
    }

    async fn mount_token(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/accessToken/get"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "access_token": "abc", "expires_in": 3600 })),
            )
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    async fn mount_create(&self, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/vipps-report/v1/report"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reportId": "R1" })))
            .expect(expected_calls)
            .mount(&self.server)
            .await;
    }

    async fn mount_status(&self, body: serde_json::Value, times: Option<u64>, expected_calls: u64) {
        let mut mock = Mock::given(method("GET"))
            .and(path("/vipps-report/v1/report/R1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body));
        if let Some(times) = times {
            mock = mock.up_to_n_times(times);
        }
        mock.expect(expected_calls).mount(&self.server).await;
    }
}

fn january() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

#[tokio::test]
async fn test_report_pending_then_completed_is_stored_verbatim() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    platform.mount_create(1).await;
    platform
        .mount_status(json!({ "status": "PENDING" }), Some(1), 1)
        .await;
    let download_url = format!("{}/files/r1.csv", platform.server.uri());
    platform
        .mount_status(
            json!({ "status": "COMPLETED", "reportUrl": download_url }),
            None,
            1,
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r1.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2".to_vec()))
        .expect(1)
        .mount(&platform.server)
        .await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert!(outcome.is_success(), "unexpected outcome: {outcome}");
    assert_eq!(outcome.state(), LifecycleState::Done);
    let locator = outcome.locator().unwrap();
    assert!(locator.is_absolute());
    assert!(locator.ends_with("ledger_report_R1.csv"));
    assert_eq!(std::fs::read(locator).unwrap(), b"a,b\n1,2");
    assert_eq!(platform.clock.sleeps(), vec![Duration::from_secs(5)]);
}

#[tokio::test]
async fn test_auth_rejected_never_creates_report() {
    let platform = Platform::start().await;
    Mock::given(method("POST"))
        .and(path("/accessToken/get"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .expect(1)
        .mount(&platform.server)
        .await;
    platform.mount_create(0).await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert_eq!(outcome.state(), LifecycleState::AuthFailed);
    assert_eq!(outcome.category(), OutcomeCategory::AuthenticationFailure);
    assert!(outcome.detail().unwrap().contains("401"));
}

#[tokio::test]
async fn test_create_rejected_never_polls() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    Mock::given(method("POST"))
        .and(path("/vipps-report/v1/report"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad range"))
        .expect(1)
        .mount(&platform.server)
        .await;
    platform
        .mount_status(json!({ "status": "PENDING" }), None, 0)
        .await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert_eq!(outcome.state(), LifecycleState::RequestFailed);
    assert_eq!(outcome.category(), OutcomeCategory::RetrievalFailure);
    let detail = outcome.detail().unwrap();
    assert!(detail.contains("400"), "detail: {detail}");
    assert!(detail.contains("bad range"), "detail: {detail}");
}

#[tokio::test]
async fn test_always_pending_exhausts_after_ten_checks() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    platform.mount_create(1).await;
    platform
        .mount_status(json!({ "status": "PENDING" }), None, 10)
        .await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert_eq!(outcome.state(), LifecycleState::PollExhausted);
    assert_eq!(platform.clock.sleeps(), vec![Duration::from_secs(5); 9]);
    assert!(std::fs::read_dir(platform.output.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn test_failed_status_stops_after_one_check() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    platform.mount_create(1).await;
    platform
        .mount_status(json!({ "status": "FAILED" }), None, 1)
        .await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert_eq!(outcome.state(), LifecycleState::PollExhausted);
    assert!(platform.clock.sleeps().is_empty());
}

#[tokio::test]
async fn test_transient_status_errors_are_retried() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    platform.mount_create(1).await;
    Mock::given(method("GET"))
        .and(path("/vipps-report/v1/report/R1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&platform.server)
        .await;
    let download_url = format!("{}/files/r1.csv", platform.server.uri());
    platform
        .mount_status(
            json!({ "status": "COMPLETED", "reportUrl": download_url }),
            None,
            1,
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r1.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"x".to_vec()))
        .mount(&platform.server)
        .await;

    let (start, end) = january();
    let outcome = platform
        .orchestrator()
        .with_poll_policy(PollPolicy::fixed(3, Duration::from_secs(1)))
        .run(start, end)
        .await;

    assert!(outcome.is_success(), "unexpected outcome: {outcome}");
    assert_eq!(platform.clock.sleeps(), vec![Duration::from_secs(1); 2]);
}

#[tokio::test]
async fn test_download_rejected_is_download_failed() {
    let platform = Platform::start().await;
    platform.mount_token(1).await;
    platform.mount_create(1).await;
    let download_url = format!("{}/files/r1.csv", platform.server.uri());
    platform
        .mount_status(
            json!({ "status": "COMPLETED", "reportUrl": download_url }),
            None,
            1,
        )
        .await;
    Mock::given(method("GET"))
        .and(path("/files/r1.csv"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&platform.server)
        .await;

    let (start, end) = january();
    let outcome = platform.orchestrator().run(start, end).await;

    assert_eq!(outcome.state(), LifecycleState::DownloadFailed);
    assert!(outcome.detail().unwrap().contains("404"));
}
