use crate::core::{ConfigProvider, NumberLookup};
use crate::domain::model::{LookupOutcome, NormalizedRecord, Query};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 單次上游請求的結果，以標記值取代例外流程
#[derive(Debug)]
pub enum AttemptOutcome {
    Success(Vec<NormalizedRecord>),
    Retry(RetryReason),
}

/// 觸發重試的原因
#[derive(Debug)]
pub enum RetryReason {
    Transport(String),
    BadStatus(StatusCode),
    MalformedBody(String),
    EmptyResults,
}

impl std::fmt::Display for RetryReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetryReason::Transport(detail) => write!(f, "request failed: {}", detail),
            RetryReason::BadStatus(status) => write!(f, "upstream returned {}", status),
            RetryReason::MalformedBody(detail) => write!(f, "data parsing error: {}", detail),
            RetryReason::EmptyResults => write!(f, "no results found"),
        }
    }
}

/// 號碼查詢代理：呼叫上游服務並重試暫時性的失敗
pub struct LookupProxy<C: ConfigProvider> {
    config: C,
    client: Client,
}

impl<C: ConfigProvider> LookupProxy<C> {
    pub fn new(config: C) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// 執行單次上游請求並分類結果
    async fn attempt(&self, query: &Query) -> AttemptOutcome {
        // 構建請求
        let mut request = self
            .client
            .get(self.config.upstream_url())
            .query(&[("num", query.as_str())])
            .header("User-Agent", BROWSER_USER_AGENT)
            .header("Accept", "application/json")
            .timeout(self.config.request_timeout());

        // 添加自定義標頭
        if let Some(headers) = self.config.upstream_headers() {
            for (key, value) in headers {
                request = request.header(key, value);
            }
        }

        tracing::debug!("Making upstream request to: {}", self.config.upstream_url());

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return AttemptOutcome::Retry(RetryReason::Transport(e.to_string())),
        };

        tracing::debug!("Upstream response status: {}", response.status());

        if !response.status().is_success() {
            return AttemptOutcome::Retry(RetryReason::BadStatus(response.status()));
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return AttemptOutcome::Retry(RetryReason::MalformedBody(e.to_string())),
        };

        // 只有非空的 results 陣列才算成功
        match body.get("results").and_then(|v| v.as_array()) {
            Some(items) if !items.is_empty() => {
                let records = items
                    .iter()
                    .map(|item| NormalizedRecord::from_raw(item, query))
                    .collect();
                AttemptOutcome::Success(records)
            }
            Some(_) => AttemptOutcome::Retry(RetryReason::EmptyResults),
            None => AttemptOutcome::Retry(RetryReason::MalformedBody(
                "missing 'results' array".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<C: ConfigProvider> NumberLookup for LookupProxy<C> {
    async fn lookup(&self, query: &Query) -> LookupOutcome {
        let max_retries = self.config.max_retries();

        for attempt in 1..=max_retries {
            tracing::info!("🔍 Attempt {} for number: {}", attempt, query);

            match self.attempt(query).await {
                AttemptOutcome::Success(records) => {
                    tracing::info!(
                        "✅ Upstream returned {} records on attempt {}",
                        records.len(),
                        attempt
                    );
                    return LookupOutcome::Found(records);
                }
                AttemptOutcome::Retry(reason) => {
                    tracing::warn!("⚠️ Attempt {} failed: {}", attempt, reason);
                }
            }

            // 最後一次嘗試之後不再等待
            if attempt < max_retries {
                tokio::time::sleep(self.config.retry_delay()).await;
            }
        }

        tracing::warn!(
            "❌ All {} attempts exhausted for number: {}",
            max_retries,
            query
        );
        LookupOutcome::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashMap;
    use std::time::Duration;

    struct TestConfig {
        upstream_url: String,
        max_retries: u32,
        retry_delay: Duration,
        request_timeout: Duration,
        upstream_headers: Option<HashMap<String, String>>,
    }

    impl TestConfig {
        fn new(upstream_url: String) -> Self {
            Self {
                upstream_url,
                max_retries: 5,
                retry_delay: Duration::from_millis(10),
                request_timeout: Duration::from_secs(5),
                upstream_headers: None,
            }
        }

        fn with_max_retries(mut self, max_retries: u32) -> Self {
            self.max_retries = max_retries;
            self
        }

        fn with_request_timeout(mut self, timeout: Duration) -> Self {
            self.request_timeout = timeout;
            self
        }

        fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
            self.upstream_headers = Some(headers);
            self
        }
    }

    impl ConfigProvider for TestConfig {
        fn host(&self) -> &str {
            "127.0.0.1"
        }

        fn port(&self) -> u16 {
            0
        }

        fn upstream_url(&self) -> &str {
            &self.upstream_url
        }

        fn max_retries(&self) -> u32 {
            self.max_retries
        }

        fn retry_delay(&self) -> Duration {
            self.retry_delay
        }

        fn request_timeout(&self) -> Duration {
            self.request_timeout
        }

        fn upstream_headers(&self) -> Option<&HashMap<String, String>> {
            self.upstream_headers.as_ref()
        }
    }

    fn query(num: &str) -> Query {
        Query::parse(num).unwrap()
    }

    #[tokio::test]
    async fn test_lookup_first_attempt_success() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/").query_param("num", "9999999999");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {"mobile": "9999999999", "name": "Test Person", "circle": "Delhi"}
                    ]
                }));
        });

        let proxy = LookupProxy::new(TestConfig::new(server.url("/")));
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert(); // exactly one upstream call
        match outcome {
            LookupOutcome::Found(records) => {
                assert_eq!(records.len(), 1);
                assert_eq!(records[0].mobile, "9999999999");
                assert_eq!(records[0].name, "Test Person");
                assert_eq!(records[0].circle, "Delhi");
                assert_eq!(records[0].email, "");
            }
            LookupOutcome::Exhausted => panic!("expected records on first attempt"),
        }
    }

    #[tokio::test]
    async fn test_lookup_server_error_exhausts_all_attempts() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(500);
        });

        let proxy = LookupProxy::new(TestConfig::new(server.url("/")));
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert_hits(5);
        assert_eq!(outcome, LookupOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_lookup_empty_results_triggers_retry() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": []}));
        });

        let config = TestConfig::new(server.url("/")).with_max_retries(3);
        let proxy = LookupProxy::new(config);
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert_hits(3);
        assert_eq!(outcome, LookupOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_lookup_malformed_json_triggers_retry() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("not json at all");
        });

        let config = TestConfig::new(server.url("/")).with_max_retries(2);
        let proxy = LookupProxy::new(config);
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert_hits(2);
        assert_eq!(outcome, LookupOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_lookup_missing_results_key_triggers_retry() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"records": [{"mobile": "9999999999"}]}));
        });

        let config = TestConfig::new(server.url("/")).with_max_retries(2);
        let proxy = LookupProxy::new(config);
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert_hits(2);
        assert_eq!(outcome, LookupOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_lookup_timeout_treated_as_transport_failure() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": [{"mobile": "9999999999"}]}))
                .delay(Duration::from_millis(500));
        });

        let config = TestConfig::new(server.url("/"))
            .with_max_retries(2)
            .with_request_timeout(Duration::from_millis(50));
        let proxy = LookupProxy::new(config);
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert_hits(2);
        assert_eq!(outcome, LookupOutcome::Exhausted);
    }

    #[tokio::test]
    async fn test_lookup_sends_browser_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/")
                .header("User-Agent", BROWSER_USER_AGENT)
                .header("Accept", "application/json");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": [{"mobile": "9999999999"}]}));
        });

        let proxy = LookupProxy::new(TestConfig::new(server.url("/")));
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert();
        assert!(matches!(outcome, LookupOutcome::Found(_)));
    }

    #[tokio::test]
    async fn test_lookup_sends_configured_extra_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/").header("X-Api-Key", "secret");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({"results": [{"mobile": "9999999999"}]}));
        });

        let mut headers = HashMap::new();
        headers.insert("X-Api-Key".to_string(), "secret".to_string());
        let config = TestConfig::new(server.url("/")).with_headers(headers);
        let proxy = LookupProxy::new(config);
        let outcome = proxy.lookup(&query("9999999999")).await;

        api_mock.assert();
        assert!(matches!(outcome, LookupOutcome::Found(_)));
    }

    #[tokio::test]
    async fn test_lookup_maps_every_raw_record() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!({
                    "results": [
                        {"mobile": "9999999999", "name": "First"},
                        {"name": "Second"},
                        {"mobile": "8888888888", "email": "second@example.com"}
                    ]
                }));
        });

        let proxy = LookupProxy::new(TestConfig::new(server.url("/")));
        let outcome = proxy.lookup(&query("9999999999")).await;

        match outcome {
            LookupOutcome::Found(records) => {
                assert_eq!(records.len(), 3);
                assert_eq!(records[0].name, "First");
                // mobile 缺漏時補回查詢號碼
                assert_eq!(records[1].mobile, "9999999999");
                assert_eq!(records[2].email, "second@example.com");
            }
            LookupOutcome::Exhausted => panic!("expected mapped records"),
        }
    }
}
