//! End-to-end tests for the HTTP request pipeline, driven against a local server that
//! replays canned responses.

use cordelia::{DiscordErrorCode, ErrorKind};
use cordelia::http::*;
use cordelia::model::types::ChannelId;
use reqwest::header::HeaderValue;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Clone, Debug)]
struct Canned {
    status: u16,
    headers: Vec<(&'static str, String)>,
    body: String,
}
impl Canned {
    fn new(status: u16) -> Canned {
        Canned { status, headers: Vec::new(), body: String::new() }
    }

    fn header(mut self, name: &'static str, value: impl ToString) -> Canned {
        self.headers.push((name, value.to_string()));
        self
    }

    fn rate_limit(self, limit: u32, remaining: u32, reset_after: f64, bucket: &str) -> Canned {
        self.header("X-RateLimit-Limit", limit)
            .header("X-RateLimit-Remaining", remaining)
            .header("X-RateLimit-Reset-After", reset_after)
            .header("X-RateLimit-Bucket", bucket)
    }

    fn json(mut self, body: serde_json::Value) -> Canned {
        self.body = body.to_string();
        self.header("Content-Type", "application/json")
    }

    fn text(mut self, body: &str) -> Canned {
        self.body = body.to_string();
        self.header("Content-Type", "text/plain")
    }

    fn render(&self) -> String {
        let mut out = format!("HTTP/1.1 {} Canned\r\n", self.status);
        for (name, value) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        if self.status == 204 {
            out.push_str("Connection: close\r\n\r\n");
        } else {
            out.push_str(&format!(
                "Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                self.body.len(), self.body,
            ));
        }
        out
    }
}

struct Fixture {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}
impl Fixture {
    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, i: usize) -> String {
        self.requests.lock().unwrap()[i].clone()
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Serves the given responses in order, one connection per request, recording what the
/// client sent.
async fn serve(responses: Vec<Canned>) -> Fixture {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let requests = Arc::new(Mutex::new(Vec::new()));
    let queue = Arc::new(Mutex::new(responses.into_iter().collect::<VecDeque<_>>()));

    let log = requests.clone();
    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => return,
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            let head_end = loop {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break None,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
                if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
                    break Some(pos + 4);
                }
            };
            let head_end = match head_end {
                Some(pos) => pos,
                None => continue,
            };

            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let content_length = head.lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            while buf.len() < head_end + content_length {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }

            log.lock().unwrap().push(String::from_utf8_lossy(&buf).to_string());
            let response = queue.lock().unwrap().pop_front()
                .unwrap_or_else(|| Canned::new(500).text("fixture exhausted"));
            let _ = socket.write_all(response.render().as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    Fixture { base, requests }
}

fn handler_with(fixture: &Fixture, config: HttpConfig) -> HttpHandler {
    HttpHandler::new(
        config.api_base(fixture.base.clone()),
        HeaderValue::from_static("DiscordBot (https://example.invalid, 0.1.0)"),
        Some(HeaderValue::from_static("Bot xxxxxxxxxxxxxxxxxxxxxxxx.xxxxxx.xxxxxxxxxxxxxxxxxxxxxxxxxxx")),
    ).unwrap()
}

fn handler(fixture: &Fixture) -> HttpHandler {
    handler_with(fixture, HttpConfig::new())
}

fn message_body(id: u64, channel: u64) -> serde_json::Value {
    json!({
        "id": id.to_string(),
        "channel_id": channel.to_string(),
        "author": { "id": "1", "username": "fixture" },
        "content": "hi",
    })
}

#[tokio::test]
async fn sequential_requests_share_route_limits() {
    let fixture = serve(vec![
        Canned::new(200).rate_limit(5, 4, 1.0, "abc").json(message_body(201, 111)),
        Canned::new(200).rate_limit(5, 3, 1.0, "abc").json(message_body(202, 111)),
        Canned::new(200).rate_limit(5, 2, 1.0, "abc").json(message_body(203, 111)),
    ]).await;
    let handler = handler(&fixture);

    for _ in 0..3 {
        let message = handler.routes()
            .create_message(111u64.into(), CreateMessageParams::text("hi"), Vec::new())
            .await.unwrap();
        assert_eq!(message.channel_id, ChannelId::from(111u64));
    }

    assert_eq!(fixture.request_count(), 3);
    let head = fixture.request(0);
    assert!(head.starts_with("POST /channels/111/messages HTTP/1.1"));
    assert!(head.contains("authorization: Bot "));
    assert!(head.contains("user-agent: DiscordBot "));
    assert!(head.contains(r#"{"content":"hi"}"#));
}

#[tokio::test]
async fn not_found_denies_the_route() {
    let fixture = serve(vec![
        Canned::new(404)
            .rate_limit(5, 4, 1.0, "abc")
            .json(json!({ "code": 10008, "message": "Unknown Message" })),
    ]).await;
    let handler = handler(&fixture);

    let error = handler.routes()
        .delete_message(999u64.into(), 1u64.into())
        .await.unwrap_err();
    let info = error.response_info().expect("error should carry the response");
    assert_eq!(info.status.as_u16(), 404);
    assert_eq!(info.error.code, DiscordErrorCode::UnknownMessage);

    // The second attempt must fail before any HTTP request is made.
    let error = handler.routes()
        .delete_message(999u64.into(), 1u64.into())
        .await.unwrap_err();
    assert!(matches!(error.error_kind(), ErrorKind::RouteDenied(_)));
    assert_eq!(fixture.request_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn server_errors_retry_with_backoff_until_exhaustion() {
    let fixture = serve(vec![
        Canned::new(502).text("bad gateway"),
        Canned::new(502).text("bad gateway"),
        Canned::new(502).text("bad gateway"),
        Canned::new(502).text("bad gateway"),
        Canned::new(502).text("bad gateway"),
    ]).await;
    let handler = handler(&fixture);

    let start = tokio::time::Instant::now();
    let error = handler.routes().get_current_user().await.unwrap_err();
    assert!(matches!(error.error_kind(), ErrorKind::ServerError(_)));
    assert_eq!(fixture.request_count(), 5);
    // Backoff sleeps are 1 + 2 * retry_count seconds: 1, 3, 5, 7, 9.
    assert!(start.elapsed() >= Duration::from_secs(25));
}

#[tokio::test(start_paused = true)]
async fn global_429_suspends_following_requests() {
    let fixture = serve(vec![
        Canned::new(429)
            .header("X-RateLimit-Global", "true")
            .header("X-RateLimit-Scope", "global")
            .json(json!({ "retry_after": 2.5, "global": true, "message": "You are being rate limited." })),
        Canned::new(200).json(json!({ "id": "1", "username": "fixture" })),
    ]).await;

    let events: Arc<Mutex<Vec<RateLimitEvent>>> = Default::default();
    let recorded = events.clone();
    let config = HttpConfig::new()
        .on_rate_limited(Arc::new(move |event| recorded.lock().unwrap().push(event)));
    let handler = handler_with(&fixture, config);

    let start = tokio::time::Instant::now();
    let user = handler.routes().get_current_user().await.unwrap();
    assert_eq!(user.username, "fixture");
    assert_eq!(fixture.request_count(), 2);
    assert!(start.elapsed() >= Duration::from_secs_f64(2.5));

    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].scope.as_deref(), Some("global"));
}

#[tokio::test(start_paused = true)]
async fn routes_sharing_a_bucket_share_their_limit() {
    // Two different channels resolve to the same server bucket. Once the second route
    // migrates to the first's limit, exhausting the bucket stalls both.
    let fixture = serve(vec![
        Canned::new(200).rate_limit(2, 1, 5.0, "xyz").json(json!({ "id": "111", "type": 0 })),
        Canned::new(200).rate_limit(2, 0, 5.0, "xyz").json(json!({ "id": "222", "type": 0 })),
        Canned::new(200).rate_limit(2, 1, 5.0, "xyz").json(json!({ "id": "111", "type": 0 })),
    ]).await;
    let handler = handler(&fixture);

    let start = tokio::time::Instant::now();
    handler.routes().get_channel(111u64.into()).await.unwrap();
    handler.routes().get_channel(222u64.into()).await.unwrap();

    // The shared bucket is exhausted, so this waits out the reset.
    handler.routes().get_channel(111u64.into()).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(5));
    assert_eq!(fixture.request_count(), 3);
}

#[tokio::test]
async fn multipart_uploads_rebuild_the_form() {
    let fixture = serve(vec![
        Canned::new(200).rate_limit(5, 4, 1.0, "abc").json(message_body(300, 111)),
    ]).await;
    let handler = handler(&fixture);

    let files = vec![UploadFile::new("hello.txt", &b"hello world"[..])];
    handler.routes()
        .create_message(111u64.into(), CreateMessageParams::text("attached"), files)
        .await.unwrap();

    let request = fixture.request(0);
    assert!(request.contains("multipart/form-data"));
    assert!(request.contains("payload_json"));
    assert!(request.contains("hello world"));
    assert!(request.contains(r#"{"content":"attached"}"#));
}

#[tokio::test]
async fn audit_log_reason_is_sent_with_spaces_preserved() {
    let fixture = serve(vec![
        Canned::new(204).rate_limit(5, 4, 1.0, "abc"),
    ]).await;
    let handler = handler(&fixture);

    handler.routes()
        .reason("spam cleanup / routine")
        .trigger_typing_indicator(111u64.into())
        .await.unwrap();

    let request = fixture.request(0);
    assert!(request.contains("x-audit-log-reason: spam cleanup / routine\r\n"));
}

#[tokio::test]
async fn non_json_bodies_decode_as_text() {
    let fixture = serve(vec![
        Canned::new(200).text("ok"),
    ]).await;
    let handler = handler(&fixture);

    let value = handler
        .request(Request::new(Route::new(Method::Get, "/gateway")))
        .await.unwrap();
    assert_eq!(value, ResponseValue::Text("ok".to_string()));
}

#[tokio::test]
async fn gateway_discovery_failures_surface_as_gateway_not_found() {
    let fixture = serve(vec![
        Canned::new(404).json(json!({ "code": 0, "message": "404: Not Found" })),
    ]).await;
    let handler = handler(&fixture);

    let error = handler.routes().get_gateway_bot("json", true).await.unwrap_err();
    assert!(matches!(error.error_kind(), ErrorKind::GatewayNotFound));
}

#[tokio::test]
async fn gateway_bot_formats_the_returned_url() {
    let fixture = serve(vec![
        Canned::new(200).rate_limit(5, 4, 1.0, "abc").json(json!({
            "url": "wss://gateway.discord.gg",
            "shards": 2,
            "session_start_limit": {
                "total": 1000, "remaining": 999, "reset_after": 14400000, "max_concurrency": 1,
            },
        })),
    ]).await;
    let handler = handler(&fixture);

    let gateway = handler.routes().get_gateway_bot("json", true).await.unwrap();
    assert_eq!(gateway.shards, 2);
    assert_eq!(
        gateway.url,
        "wss://gateway.discord.gg/?v=10&encoding=json&compress=zlib-stream",
    );
    assert_eq!(gateway.session_start_limit.remaining, 999);
}
