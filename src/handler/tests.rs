use super::*;
use crate::config::{SiteConfig, StaticRoutesConfig};
use crate::content::Post;
use crate::i18n::I18n;
use crate::routes::StaticRoutes;
use async_trait::async_trait;
use axum::body::to_bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

/// What the fake upstream does for every call
#[derive(Clone)]
enum Upstream {
    Post(Post),
    NotFound,
    Hang,
    Network,
    Status(u16),
    InvalidPayload,
}

struct FakeSource {
    behaviour: Upstream,
    calls: AtomicUsize,
    last_request: Mutex<Option<(ContentType, String, Lang)>>,
}

impl FakeSource {
    fn new(behaviour: Upstream) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentSource for FakeSource {
    async fn fetch_post(
        &self,
        content_type: ContentType,
        slug: &str,
        lang: Lang,
    ) -> Result<FetchOutcome, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some((content_type, slug.to_string(), lang));
        match &self.behaviour {
            Upstream::Post(post) => Ok(FetchOutcome::Found(post.clone())),
            Upstream::NotFound => Ok(FetchOutcome::NotFound),
            Upstream::Hang => {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(FetchOutcome::NotFound)
            }
            Upstream::Network => Err(FetchError::Network(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))),
            Upstream::Status(code) => Err(FetchError::Status {
                status: *code,
                text: "Bad Gateway".to_string(),
            }),
            Upstream::InvalidPayload => Err(FetchError::InvalidPayload { source: None }),
        }
    }
}

fn handler_with(source: Arc<FakeSource>) -> ArticleHandler {
    let config = SiteConfig {
        title: "Acme Logistics".to_string(),
        url: "https://acme.test".to_string(),
        ..SiteConfig::default()
    };
    let renderer = PageRenderer::new(&config, I18n::builtin(Lang::Vn).unwrap()).unwrap();
    let routes = StaticRoutes::from_config(&StaticRoutesConfig::default());
    ArticleHandler::new(renderer, source, Arc::new(routes), config.fetch_timeout())
}

fn titled(title: &str) -> Post {
    Post {
        title: Some(title.to_string()),
        created_at: Some("2024-03-01T00:00:00Z".to_string()),
        ..Post::default()
    }
}

/// Collects the fields of every error-level event
#[derive(Clone, Default)]
struct ErrorEvents(Arc<Mutex<Vec<HashMap<String, String>>>>);

impl ErrorEvents {
    fn take(&self) -> Vec<HashMap<String, String>> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

struct FieldMap<'a>(&'a mut HashMap<String, String>);

impl Visit for FieldMap<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

impl<S: tracing::Subscriber> Layer<S> for ErrorEvents {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() != tracing::Level::ERROR {
            return;
        }
        let mut fields = HashMap::new();
        event.record(&mut FieldMap(&mut fields));
        self.0.lock().unwrap().push(fields);
    }
}

fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_static_slug_redirects_without_fetching() {
    let source = FakeSource::new(Upstream::NotFound);
    let handler = handler_with(source.clone());

    for lang in [None, Some("en"), Some("zh")] {
        let response = handler
            .handle(ContentType::News, Some("sea-freight-service-launch"), lang)
            .await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            header(&response, "location"),
            Some("/news/sea-freight-service-launch/")
        );
        assert_eq!(header(&response, "cache-control"), Some("public, max-age=300"));
        assert_eq!(header(&response, "x-static-redirect"), Some("true"));
    }
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_static_list_is_per_content_type() {
    let source = FakeSource::new(Upstream::NotFound);
    let handler = handler_with(source.clone());

    let response = handler
        .handle(ContentType::Knowledge, Some("sea-freight-service-launch"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_missing_or_empty_slug_is_rejected_before_fetch() {
    let source = FakeSource::new(Upstream::Post(titled("X")));
    let handler = handler_with(source.clone());

    for slug in [None, Some("")] {
        let response = handler.handle(ContentType::Knowledge, slug, Some("en")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(header(&response, "content-type")
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(body_string(response).await, "Invalid slug");
    }
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_found_renders_article() {
    let source = FakeSource::new(Upstream::Post(titled("X")));
    let handler = handler_with(source.clone());

    let response = handler
        .handle(ContentType::Knowledge, Some("what-is-fcl"), Some("en"))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "content-type"),
        Some("text/html; charset=utf-8")
    );
    assert!(header(&response, "cache-control")
        .unwrap()
        .contains("max-age=1800"));
    assert_eq!(header(&response, "cache-control"), Some(CACHE_ARTICLE));
    assert_eq!(header(&response, "vary"), Some("Accept-Language"));
    assert_eq!(header(&response, "x-content-type-options"), Some("nosniff"));
    assert_eq!(header(&response, "x-frame-options"), Some("SAMEORIGIN"));
    assert_eq!(
        header(&response, "referrer-policy"),
        Some("strict-origin-when-cross-origin")
    );

    let body = body_string(response).await;
    assert!(body.contains("<title>X | Acme Logistics</title>"));
    assert!(body.contains("<h1>X</h1>"));

    assert_eq!(source.calls(), 1);
    assert_eq!(
        *source.last_request.lock().unwrap(),
        Some((ContentType::Knowledge, "what-is-fcl".to_string(), Lang::En))
    );
}

#[tokio::test]
async fn test_lang_defaults_to_vn() {
    let source = FakeSource::new(Upstream::Post(titled("X")));
    let handler = handler_with(source.clone());

    for lang in [None, Some(""), Some("klingon")] {
        handler.handle(ContentType::News, Some("a"), lang).await;
        let last = source.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(last.2, Lang::Vn);
    }
}

#[tokio::test]
async fn test_upstream_not_found() {
    let handler = handler_with(FakeSource::new(Upstream::NotFound));

    let response = handler.handle(ContentType::News, Some("gone"), Some("zh")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "cache-control"), Some("public, max-age=300"));
    assert!(header(&response, "retry-after").is_none());

    let body = body_string(response).await;
    assert!(body.contains("Not Found"));
    assert!(body.contains(r#"<html lang="zh-CN">"#));
    assert!(body.contains("未找到文章"));
}

#[tokio::test(start_paused = true)]
async fn test_hanging_upstream_times_out_at_deadline() {
    let source = FakeSource::new(Upstream::Hang);
    let handler = handler_with(source.clone());

    let started = tokio::time::Instant::now();
    let response = handler.handle(ContentType::News, Some("slow"), None).await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_secs(10), "aborted early: {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(10_010), "aborted late: {:?}", elapsed);
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(header(&response, "retry-after"), Some("300"));
    assert_eq!(
        header(&response, "cache-control"),
        Some("no-cache, no-store, must-revalidate")
    );
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_all_failures_share_one_503_page() {
    let mut bodies = Vec::new();
    for upstream in [
        Upstream::Network,
        Upstream::InvalidPayload,
        Upstream::Status(502),
    ] {
        let handler = handler_with(FakeSource::new(upstream));
        let response = handler.handle(ContentType::News, Some("a"), Some("en")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(header(&response, "retry-after"), Some("300"));
        assert!(header(&response, "vary").is_none());
        bodies.push(body_string(response).await);
    }

    assert!(bodies[0].contains("Service Unavailable"));
    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[1], bodies[2]);
}

#[tokio::test]
async fn test_repeated_requests_are_byte_identical() {
    let handler = handler_with(FakeSource::new(Upstream::Post(titled("Stable"))));

    let first = body_string(handler.handle(ContentType::News, Some("a"), Some("vn")).await).await;
    let second = body_string(handler.handle(ContentType::News, Some("a"), Some("vn")).await).await;
    assert_eq!(first, second);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_logged_with_kind() {
    let events = ErrorEvents::default();
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(events.clone()),
    );

    for (upstream, kind) in [
        (Upstream::Hang, "timeout"),
        (Upstream::Network, "network"),
        (Upstream::Status(502), "status"),
        (Upstream::InvalidPayload, "invalid_payload"),
    ] {
        let handler = handler_with(FakeSource::new(upstream));
        let response = handler.handle(ContentType::News, Some("port-update"), Some("en")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let logged = events.take();
        assert_eq!(logged.len(), 1, "one error entry for {}", kind);
        let entry = &logged[0];
        assert_eq!(entry["kind"], kind);
        assert_eq!(entry["slug"], "port-update");
        assert_eq!(entry["lang"], "en");
        assert_eq!(entry["content_type"], "news");
        assert!(entry.contains_key("error"));
        assert!(entry.contains_key("source"));
        assert!(entry.contains_key("timestamp"));
    }

    let handler = handler_with(FakeSource::new(Upstream::NotFound));
    let response = handler.handle(ContentType::News, Some("gone"), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(events.take().is_empty());
}

#[test]
fn test_error_chain() {
    let err = FetchError::Network(Box::new(std::io::Error::new(
        std::io::ErrorKind::TimedOut,
        "socket timed out",
    )));
    assert_eq!(error_chain(&err), "socket timed out");
    assert_eq!(error_chain(&FetchError::InvalidPayload { source: None }), "");
}
