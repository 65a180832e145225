use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use hi5_server::config::Config;
use hi5_server::App;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;
use wiremock::matchers::{any, body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";
const API_KEY: &str = "test-key";
const SEARCH_PATH: &str = "/v3/businesses/search";
const CALLBACK_PATH: &str = "/commands/T1/callback";

struct Harness {
    router: Router,
    search: MockServer,
    slack: MockServer,
}

impl Harness {
    async fn new() -> Self {
        let search = MockServer::start().await;
        let slack = MockServer::start().await;

        let config = Config {
            bind_address: "127.0.0.1:0".to_string(),
            slack_token: TOKEN.to_string(),
            search_api_key: API_KEY.to_string(),
            search_api_base: format!("{}{}", search.uri(), SEARCH_PATH),
            allowed_origin: "hooks.slack.com".to_string(),
            http_timeout_secs: 5,
            otlp_endpoint: None,
        };

        let app = App::new(config).expect("Failed to create app");

        Self {
            router: app.router(),
            search,
            slack,
        }
    }

    fn callback_url(&self) -> String {
        format!("{}{}", self.slack.uri(), CALLBACK_PATH)
    }

    fn form_body(&self, token: &str, text: &str) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("token", token)
            .append_pair("team_id", "T1")
            .append_pair("user_name", "jane")
            .append_pair("command", "/hi5")
            .append_pair("text", text)
            .append_pair("response_url", &self.callback_url())
            .finish()
    }

    async fn invoke(&self, token: &str, text: &str) -> (StatusCode, HeaderMap, String) {
        let body = self.form_body(token, text);

        send(
            &self.router,
            Request::builder()
                .method("POST")
                .uri("/slack/commands")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Fails the test on drop if either upstream is contacted.
    async fn expect_no_outbound_calls(&self) {
        for server in [&self.search, &self.slack] {
            Mock::given(any())
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(server)
                .await;
        }
    }

    async fn published_payload(&self) -> Value {
        let requests = self.slack.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1, "expected exactly one callback publish");
        serde_json::from_slice(&requests[0].body).unwrap()
    }
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, String) {
    let res = router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(body.to_vec()).unwrap())
}

fn business(name: &str, rating: f64) -> Value {
    json!({
        "id": format!("{name}-id"),
        "alias": name,
        "name": name,
        "image_url": format!("https://img.example/{name}.jpg"),
        "url": format!("https://www.yelp.com/biz/{name}"),
        "review_count": 120,
        "price": "$$",
        "rating": rating,
        "location": {
            "address1": "1 Main St",
            "display_address": ["1 Main St", "Los Angeles, CA 90036"]
        }
    })
}

#[tokio::test]
async fn test_preflight_short_circuits() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let (status, headers, body) = send(
        &h.router,
        Request::builder()
            .method("OPTIONS")
            .uri("/slack/commands")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(headers["access-control-allow-origin"], "hooks.slack.com");
    assert_eq!(headers["access-control-allow-methods"], "POST");
    assert_eq!(headers["access-control-max-age"], "3600");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let (status, headers, body) = send(
        &h.router,
        Request::builder()
            .method("POST")
            .uri("/slack/commands")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from("token=test-token&text=%zz"))
            .unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Bad request");
    assert_eq!(headers["access-control-allow-origin"], "hooks.slack.com");
}

#[tokio::test]
async fn test_validation_errors_are_shown_inline() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let cases = [
        ("category=pizza&location=nyc&radius=25", "Maximum radius is 24 miles."),
        ("category=pizza", "You must specify a location."),
        ("location=nyc&radius=2", "You must specify a category."),
        ("category=bars&location=nyc&term=100%", r#"invalid URL escape "%""#),
    ];

    for (text, expected) in cases {
        let (status, headers, body) = h.invoke(TOKEN, text).await;
        assert_eq!(status, StatusCode::OK, "{text}");
        assert_eq!(body, expected, "{text}");
        assert_eq!(headers["access-control-allow-origin"], "hooks.slack.com");
    }
}

#[tokio::test]
async fn test_validation_runs_before_token_check() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let (status, _, body) = h.invoke("wrong", "category=pizza").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "You must specify a location.");
}

#[tokio::test]
async fn test_token_mismatch_is_silent() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let (status, headers, body) = h
        .invoke("wrong", "category=pizza&location=los angeles,ca")
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
    assert_eq!(headers["access-control-allow-origin"], "hooks.slack.com");

    let (status, _, body) = h.invoke("", "help").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_help_is_written_inline() {
    let h = Harness::new().await;
    h.expect_no_outbound_calls().await;

    let (status, headers, body) = h.invoke(TOKEN, "  HELP ").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "text/plain; charset=utf-8");
    assert!(body.starts_with("*Hi5 helps you find the top 5 rated businesses"));
    assert!(body.contains("/hi5 category=pizza&location=los angeles,ca&term=beer&radius=10"));
}

#[tokio::test]
async fn test_results_are_published() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(header("authorization", "Bearer test-key"))
        .and(query_param("location", "los angeles,ca"))
        .and(query_param("categories", "pizza"))
        .and(query_param("radius", "16093"))
        .and(query_param("limit", "5"))
        .and(query_param("sort_by", "rating"))
        .and(query_param("term", "beer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "businesses": [business("mozza", 4.5), business("jons", 4.0)],
            "region": {"center": {"latitude": 34.0, "longitude": -118.3}}
        })))
        .expect(1)
        .mount(&h.search)
        .await;

    Mock::given(method("POST"))
        .and(path(CALLBACK_PATH))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h
        .invoke(TOKEN, "category=Pizza&location=los angeles,ca&term=beer&radius=10")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let payload = h.published_payload().await;
    assert_eq!(payload["response_type"], "in_channel");

    let blocks = payload["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 4);
    assert_eq!(
        blocks[0]["text"]["text"],
        "*Ok @jane here's a Hi-5 for pizza and beer near los angeles,ca*"
    );
    assert_eq!(blocks[1], json!({"type": "divider"}));
    assert_eq!(
        blocks[2],
        json!({
            "type": "section",
            "text": {
                "type": "mrkdwn",
                "text": "*mozza $$:* 4.5 ⭐ (120 reviews)\n1 Main St Los Angeles, CA 90036\n\nhttps://www.yelp.com/biz/mozza"
            },
            "accessory": {
                "type": "image",
                "image_url": "https://img.example/mozza.jpg",
                "alt_text": "alt text"
            }
        })
    );
    assert!(blocks[3]["text"]["text"]
        .as_str()
        .unwrap()
        .starts_with("*jons $$:* 4.0"));
}

#[tokio::test]
async fn test_delivery_survives_caller_disconnect() {
    let h = Harness::new().await;
    let search_delay = Duration::from_millis(1500);

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"businesses": [business("mozza", 4.5)]}))
                .set_delay(search_delay),
        )
        .expect(1)
        .mount(&h.search)
        .await;
    Mock::given(method("POST"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.slack)
        .await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = h.router.clone();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let body = h.form_body(TOKEN, "category=pizza&location=nyc");
    let request = format!(
        "POST /slack/commands HTTP/1.1\r\nHost: {addr}\r\n\
         Content-Type: application/x-www-form-urlencoded\r\n\
         Content-Length: {}\r\n\r\n{body}",
        body.len()
    );

    let started = Instant::now();
    let mut conn = TcpStream::connect(addr).await.unwrap();
    conn.write_all(request.as_bytes()).await.unwrap();

    let mut buf = [0u8; 64];
    let n = conn.read(&mut buf).await.unwrap();
    assert!(buf[..n].starts_with(b"HTTP/1.1 200 OK"));
    assert!(started.elapsed() < search_delay, "ack waited for the search");
    drop(conn);

    let mut published = 0;
    for _ in 0..50 {
        published = h.slack.received_requests().await.unwrap().len();
        if published > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(published, 1);
}

#[tokio::test]
async fn test_search_error_status_reports_internal_error() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"code": "TOKEN_INVALID", "description": "Invalid access token"}
        })))
        .expect(1)
        .mount(&h.search)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h.invoke(TOKEN, "category=pizza&location=nyc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_negative_radius_is_sent_as_given() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("radius", "-4828"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": []})))
        .expect(1)
        .mount(&h.search)
        .await;
    Mock::given(method("POST"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h.invoke(TOKEN, "category=pizza&location=nyc&radius=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_empty_results_publish_not_found() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("radius", "8046"))
        .and(query_param_is_missing("term"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"businesses": [], "total": 0})))
        .expect(1)
        .mount(&h.search)
        .await;

    Mock::given(method("POST"))
        .and(path(CALLBACK_PATH))
        .and(body_json(json!({
            "response_type": "in_channel",
            "blocks": [{
                "type": "section",
                "text": {
                    "type": "mrkdwn",
                    "text": "*Sorry we couldn't find any results for tacos in 90210. Try increasing your search radius*"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h.invoke(TOKEN, "category=tacos&location=90210").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_search_failure_reports_internal_error() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&h.search)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h.invoke(TOKEN, "category=pizza&location=nyc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_undecodable_search_body_reports_internal_error() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&h.search)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.slack)
        .await;

    let (_, _, body) = h.invoke(TOKEN, "category=pizza&location=nyc").await;
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_publish_failure_reports_internal_error() {
    let h = Harness::new().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"businesses": [business("a", 5.0)]})),
        )
        .mount(&h.search)
        .await;
    Mock::given(method("POST"))
        .and(path(CALLBACK_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string("expired_url"))
        .expect(1)
        .mount(&h.slack)
        .await;

    let (status, _, body) = h.invoke(TOKEN, "category=pizza&location=nyc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn test_health_and_fallback() {
    let h = Harness::new().await;

    let (status, _, body) = send(
        &h.router,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"status": "ok"}));

    let (status, _, body) = send(
        &h.router,
        Request::builder().uri("/nope").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["error"]["code"], "not_found");
}
