// src/fetch/client.rs
// =============================================================================
// The HTTP client every network call in the tool goes through.
//
// Key functionality:
// - A single reqwest Client (connection pooling) with our user agent
// - fetch(): pause for the configured delay, then send one request
// - fetch_with_retry(): same, but retries transient failures with backoff
//
// What counts as transient:
// - Transport failures (connection refused, DNS, reset) and timeouts
// - HTTP 429 Too Many Requests
// - Any 5xx server error
// Every other 4xx is returned to the caller straight away.
// =============================================================================

use std::time::Duration;

use reqwest::header::RETRY_AFTER;
use reqwest::{Client, Method, Response};
use tracing::{debug, info, warn};

use super::backoff::{parse_retry_after, BackoffPolicy};
use crate::error::{FetchError, InitError};

/// Sent with every request so site owners can recognise us.
pub const USER_AGENT: &str = concat!("sheet-guardian/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Redirects reqwest follows on its own before giving up.
const MAX_REDIRECTS: usize = 10;

/// What to send. Kept separate from reqwest's RequestBuilder because a
/// builder is consumed by send() and we may need to send it several times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }

    pub fn head(url: impl Into<String>) -> Self {
        Self {
            method: Method::HEAD,
            url: url.into(),
        }
    }
}

// Cloning is cheap: reqwest::Client is a reference-counted handle.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
    policy: BackoffPolicy,
}

impl FetchClient {
    /// Builds the client. Failure here aborts the run.
    pub fn new(policy: BackoffPolicy) -> Result<Self, InitError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(InitError::HttpClient)?;

        Ok(Self { client, policy })
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    /// Waits `delay`, then sends the request once.
    ///
    /// Any HTTP status comes back as Ok(response); only failures to get a
    /// response at all are errors.
    pub async fn fetch(&self, request: &RequestSpec, delay: Duration) -> Result<Response, FetchError> {
        tokio::time::sleep(delay).await;

        debug!(method = %request.method, url = %request.url, "sending request");

        self.client
            .request(request.method.clone(), &request.url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&request.url, e))
    }

    /// Like fetch(), but only returns Ok for a 2xx response.
    ///
    /// Transient failures are retried up to the policy's attempt cap; the
    /// last error is returned once attempts run out. Non-retryable statuses
    /// fail on the first attempt.
    pub async fn fetch_with_retry(
        &self,
        request: &RequestSpec,
        delay: Duration,
    ) -> Result<Response, FetchError> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            let error = match self.fetch(request, delay).await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => status_error(&request.url, &response),
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!(url = %request.url, %error, "not retrying");
                return Err(error);
            }

            if attempt >= self.policy.max_attempts() {
                warn!(url = %request.url, attempt, %error, "retries exhausted");
                return Err(error);
            }

            let wait = self.policy.wait_for(attempt, error.retry_after());
            info!(
                url = %request.url,
                attempt = attempt + 1,
                max_attempts = self.policy.max_attempts(),
                delay_ms = wait.as_millis() as u64,
                %error,
                "retrying request"
            );
            tokio::time::sleep(wait).await;
        }
    }
}

// Turns a non-2xx response into an error, keeping any Retry-After hint.
fn status_error(url: &str, response: &Response) -> FetchError {
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);

    FetchError::http_status(url, response.status().as_u16(), retry_after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NO_DELAY: Duration = Duration::from_millis(1);

    fn fast_client(max_attempts: u32) -> FetchClient {
        FetchClient::new(BackoffPolicy::new(Duration::from_millis(1), max_attempts)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_error_status_as_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = fast_client(5);
        let request = RequestSpec::get(format!("{}/missing", server.uri()));
        let response = client.fetch(&request, NO_DELAY).await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(1);
        let request = RequestSpec::get(server.uri());
        let response = client.fetch_with_retry(&request, NO_DELAY).await.unwrap();
        assert!(response.status().is_success());
    }

    #[tokio::test]
    async fn test_retries_server_errors_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = fast_client(5);
        let request = RequestSpec::get(server.uri());
        let response = client.fetch_with_retry(&request, NO_DELAY).await.unwrap();

        assert!(response.status().is_success());
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 3);
    }

    #[tokio::test]
    async fn test_does_not_retry_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = fast_client(5);
        let request = RequestSpec::get(server.uri());
        let error = client.fetch_with_retry(&request, NO_DELAY).await.unwrap_err();

        assert!(matches!(error, FetchError::HttpStatus { status: 404, .. }));
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = fast_client(3);
        let request = RequestSpec::get(server.uri());
        let error = client.fetch_with_retry(&request, NO_DELAY).await.unwrap_err();

        assert!(matches!(error, FetchError::HttpStatus { status: 500, .. }));
        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 3);
    }

    #[tokio::test]
    async fn test_rate_limit_honours_retry_after() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        // A huge base delay proves the Retry-After of 0 replaced it.
        let client = FetchClient::new(BackoffPolicy::new(Duration::from_secs(600), 5)).unwrap();
        let request = RequestSpec::get(server.uri());
        let response = tokio::time::timeout(
            Duration::from_secs(10),
            client.fetch_with_retry(&request, NO_DELAY),
        )
        .await
        .expect("Retry-After should have shortened the wait")
        .unwrap();

        assert!(response.status().is_success());
    }

    // Binds an ephemeral port and releases it, leaving nothing listening.
    async fn closed_port_uri() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_connection_refused_retries_every_attempt() {
        let uri = closed_port_uri().await;

        // Waits of 20ms then 40ms before attempts 2 and 3.
        let client = FetchClient::new(BackoffPolicy::new(Duration::from_millis(20), 3)).unwrap();
        let request = RequestSpec::get(uri);

        let started = std::time::Instant::now();
        let error = client.fetch_with_retry(&request, NO_DELAY).await.unwrap_err();

        assert!(
            matches!(error, FetchError::Transport { .. } | FetchError::Timeout { .. }),
            "unexpected error: {:?}",
            error
        );
        assert!(error.is_retryable());
        assert!(started.elapsed() >= Duration::from_millis(60));
    }
}
