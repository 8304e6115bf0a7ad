//! Integration checks for the media resolver against a canned local
//! HTTP stub, plus a round-trip through the liveness responder.

use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tweetgrab::twitter::{scrape_media, MediaKind, ScrapeError};

/// Spawn a stub that answers every connection with the same response.
async fn spawn_stub(response: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let response = response.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });
    addr
}

fn http_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[tokio::test]
async fn resolver_classifies_media_from_json() {
    let body = r#"{"media_extended":[
        {"type":"image","url":"https://pbs.twimg.com/a.jpg"},
        {"type":"video","url":"https://video.twimg.com/b.mp4"}
    ]}"#;
    let addr = spawn_stub(http_response("200 OK", body)).await;

    let http = reqwest::Client::new();
    let media = scrape_media(&http, &format!("http://{addr}"), 1_234_567_890)
        .await
        .expect("resolution succeeds");

    assert_eq!(media.len(), 2);
    assert_eq!(media[0].kind, MediaKind::Photo);
    assert_eq!(media[1].kind, MediaKind::Video);
}

#[tokio::test]
async fn resolver_surfaces_html_error_page_text() {
    let body = concat!(
        "<html><head>",
        r#"<meta content="Sorry, that page does not exist!" property="og:description" />"#,
        "</head></html>"
    );
    let addr = spawn_stub(http_response("200 OK", body)).await;

    let http = reqwest::Client::new();
    let err = scrape_media(&http, &format!("http://{addr}"), 42)
        .await
        .expect_err("an HTML body is not a media payload");

    match err {
        ScrapeError::Api(message) => assert_eq!(message, "Sorry, that page does not exist!"),
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn resolver_fails_fast_on_upstream_status() {
    let addr = spawn_stub(http_response("502 Bad Gateway", "upstream down")).await;

    let http = reqwest::Client::new();
    let err = scrape_media(&http, &format!("http://{addr}"), 42)
        .await
        .expect_err("non-2xx must fail");

    match err {
        ScrapeError::Status(status) => assert_eq!(status.as_u16(), 502),
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn resolver_reports_empty_media_list_as_no_media() {
    let addr = spawn_stub(http_response("200 OK", r#"{"media_extended":[]}"#)).await;

    let http = reqwest::Client::new();
    let media = scrape_media(&http, &format!("http://{addr}"), 42)
        .await
        .expect("resolution succeeds");
    assert!(media.is_empty());
}

#[tokio::test]
async fn health_responder_answers_probes() {
    let listener = tweetgrab::health::bind("127.0.0.1", 0)
        .await
        .expect("bind health listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(tweetgrab::health::serve(listener));

    // Every connection gets the same fixed response, request ignored.
    for _ in 0..3 {
        let mut stream = tokio::net::TcpStream::connect(addr)
            .await
            .expect("connect probe");
        let mut reply = String::new();
        stream
            .read_to_string(&mut reply)
            .await
            .expect("read probe reply");
        assert!(reply.starts_with("HTTP/1.1 200 OK"));
        assert!(reply.contains("Bot is running"));
    }
}
