// src/scheduler/mod.rs
// =============================================================================
// This module runs the URL validator over a whole batch.
//
// Submodules:
// - pool: The bounded worker pool (shared cursor, result map)
//
// validate_batch() is the one call main.rs needs: it starts the render
// backend, builds a UrlValidator and feeds every URL through the pool.
// =============================================================================

mod pool;

pub use pool::run;

use std::collections::HashMap;

use tracing::info;

use crate::checker::{DocumentationExtractor, UrlValidator, ValidationOutcome};
use crate::config::RunConfig;
use crate::error::InitError;
use crate::fetch::FetchClient;
use crate::render::{PageRenderer, RenderBackend};

/// Validates every URL and returns one outcome per URL.
///
/// Fails only if the render backend cannot start; per-URL problems are
/// always reported as KO outcomes instead.
pub async fn validate_batch<R: PageRenderer + 'static>(
    urls: &[String],
    config: &RunConfig,
    backend: &RenderBackend<R>,
    fetcher: &FetchClient,
    extractor: &DocumentationExtractor,
    on_outcome: Option<&dyn Fn(&ValidationOutcome)>,
) -> Result<HashMap<String, ValidationOutcome>, InitError> {
    if urls.is_empty() {
        return Ok(HashMap::new());
    }

    let renderer = backend.acquire().await?;
    let validator = UrlValidator::new(renderer, fetcher, extractor, config);

    info!(
        urls = urls.len(),
        concurrency = config.concurrency,
        validate_pdf_links = config.validate_pdf_links,
        "validating batch"
    );

    let results = run(
        urls,
        config.concurrency,
        |url| {
            let validator = &validator;
            async move { validator.validate(&url).await }
        },
        on_outcome,
    )
    .await;

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Verdict;
    use crate::config::DocumentationSignature;
    use crate::fetch::BackoffPolicy;
    use crate::render::HttpRenderer;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GOOD_PAGE: &str = r#"
        <html><body>
          <div class="product-documents documents-list">
            <a class="doc-link doc-link--safety" href="/files/sds.pdf">SDS</a>
            <a class="doc-link doc-link--technical" href="/files/tds.pdf">TDS</a>
          </div>
        </body></html>
    "#;

    const HALF_PAGE: &str = r#"
        <div class="product-documents documents-list">
          <a class="doc-link doc-link--safety" href="/files/gone.pdf">SDS</a>
        </div>
    "#;

    fn fetcher() -> FetchClient {
        FetchClient::new(BackoffPolicy::new(Duration::from_millis(1), 2)).unwrap()
    }

    async fn shop() -> MockServer {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/products/good"))
            .respond_with(ResponseTemplate::new(200).set_body_string(GOOD_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/half"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HALF_PAGE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products/moved"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Home</h1>"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/files/sds.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/files/tds.pdf"))
            .respond_with(ResponseTemplate::new(200).insert_header("content-type", "application/pdf"))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        server
    }

    #[tokio::test]
    async fn test_validate_batch_end_to_end() {
        let server = shop().await;
        let base = server.uri();
        let urls = vec![
            format!("{}/products/good", base),
            format!("{}/products/half", base),
            format!("{}/products/moved", base),
            format!("{}/products/missing", base),
            "not-a-url".to_string(),
        ];

        let fetcher = fetcher();
        let renderer_fetcher = fetcher.clone();
        let backend = RenderBackend::new(move || Ok(HttpRenderer::new(renderer_fetcher.clone())));
        let extractor = DocumentationExtractor::new(DocumentationSignature::default()).unwrap();
        let config = RunConfig::new(true, 1, 3).unwrap();

        let results = validate_batch(&urls, &config, &backend, &fetcher, &extractor, None)
            .await
            .unwrap();
        backend.shutdown().await;

        assert_eq!(results.len(), urls.len());

        let good = &results[&urls[0]];
        assert_eq!(good.result, Verdict::Ok);
        assert_eq!(good.comments, "");

        assert_eq!(
            results[&urls[1]].comments,
            "safety sheet link invalid ; technical sheet missing"
        );
        assert_eq!(results[&urls[2]].comments, format!("redirected to {}/", base));
        assert_eq!(results[&urls[3]].comments, "page load failed (HTTP 404)");
        assert_eq!(results[&urls[4]].comments, "invalid URL/protocol");
    }

    #[tokio::test]
    async fn test_backend_failure_aborts_batch() {
        let backend: RenderBackend<HttpRenderer> =
            RenderBackend::new(|| Err(InitError::InvalidConfig("renderer unavailable".to_string())));
        let extractor = DocumentationExtractor::new(DocumentationSignature::default()).unwrap();
        let config = RunConfig::default();
        let urls = vec!["https://shop.example/products/a".to_string()];

        let result = validate_batch(&urls, &config, &backend, &fetcher(), &extractor, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_does_not_start_backend() {
        let backend = RenderBackend::new(|| Ok(HttpRenderer::new(fetcher())));
        let extractor = DocumentationExtractor::new(DocumentationSignature::default()).unwrap();
        let config = RunConfig::default();

        let results = validate_batch(&[], &config, &backend, &fetcher(), &extractor, None)
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(!backend.is_started());
    }
}
