//! End-to-end tests for proxied page, asset and failure handling.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use editor_proxy::codec::encode;

mod common;
use common::MockReply;

const SID: &str = "0123456789abcdef0123456789abcdef01234567";

fn proxy_base(proxy: SocketAddr, upstream: SocketAddr) -> String {
    format!("http://{}/proxy/editor/{}/{}", proxy, SID, encode(&format!("http://{}", upstream)))
}

#[tokio::test]
async fn test_upstream_failure_renders_error_page() {
    let backend_addr: SocketAddr = "127.0.0.1:28301".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28302".parse().unwrap();
    common::start_programmable_backend(backend_addr, |_| async {
        MockReply::with(503, "text/plain", "backend stack trace: at handler.js:42")
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;

    let res = common::client()
        .get(format!("{}/pricing", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains(SID));
    assert!(body.contains("/pricing"));
    assert!(body.contains("HTTP 503"));
    assert!(!body.contains("handler.js:42"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_html_is_injected_and_rewritten() {
    let backend_addr: SocketAddr = "127.0.0.1:28311".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28312".parse().unwrap();
    common::start_programmable_backend(backend_addr, |_| async {
        MockReply::html(
            "<html><head><title>Home</title></head><body><img src=\"/a.png\"><a href=\"/b.html\">b</a><a href=\"#top\">top</a></body></html>",
        )
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;

    let res = common::client()
        .get(format!("{}/", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    assert!(res.headers().contains_key("x-request-id"));

    let root = format!("/proxy/editor/{}/{}", SID, encode(&format!("http://{}", backend_addr)));
    let body = res.text().await.unwrap();
    assert!(body.contains(&format!(r#"<base href="{root}/">"#)));
    assert!(body.contains(&format!(r#"src="{root}/a.png""#)));
    assert!(body.contains(&format!(r#"href="{root}/b.html""#)));
    assert!(body.contains(r##"href="#top""##));
    assert!(body.contains(&format!(r#"data-session="{SID}""#)));
    assert!(body.contains(r#"src="/__editor/runtime.js""#));
    assert_eq!(body.matches("__editor_root").count(), 1);

    shutdown.trigger();
}

#[tokio::test]
async fn test_binary_passthrough_filters_headers() {
    let backend_addr: SocketAddr = "127.0.0.1:28321".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28322".parse().unwrap();
    common::start_programmable_backend(backend_addr, |_| async {
        MockReply::with(200, "image/png", "PNGDATA")
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;

    let res = common::client()
        .get(format!("{}/img/logo.png", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "image/png");
    assert_eq!(res.text().await.unwrap(), "PNGDATA");

    shutdown.trigger();
}

#[tokio::test]
async fn test_escaped_request_recovered_from_referer() {
    let backend_addr: SocketAddr = "127.0.0.1:28331".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28332".parse().unwrap();
    common::start_programmable_backend(backend_addr, |path| async move {
        if path == "/logo.png" {
            MockReply::with(200, "image/png", "LOGO")
        } else {
            MockReply::with(404, "text/plain", "missing")
        }
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/logo.png", proxy_addr))
        .header("referer", format!("{}/page", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "LOGO");

    let res = client
        .get(format!("http://{}/logo.png", proxy_addr))
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 404);

    let res = client
        .get(format!("http://{}/logo.png", proxy_addr))
        .header("referer", "https://search.example.org/results")
        .send()
        .await
        .expect("Proxy unreachable");
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_malformed_session_never_reaches_upstream() {
    let proxy_addr: SocketAddr = "127.0.0.1:28342".parse().unwrap();
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;

    // Nothing listens on the encoded origin; a fetch would fail differently.
    let res = common::client()
        .get(format!(
            "http://{}/proxy/editor/not-hex-at-all-zzzz/{}/x",
            proxy_addr,
            encode("http://127.0.0.1:28343")
        ))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains("hexadecimal"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_escaped_path_characters_reach_upstream() {
    let backend_addr: SocketAddr = "127.0.0.1:28351".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28352".parse().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    common::start_programmable_backend(backend_addr, move |path| {
        recorder.lock().unwrap().push(path);
        async { MockReply::with(200, "image/png", "IMG") }
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;
    let client = common::client();

    for file in ["a%3Fb.png", "c%23d.png", "x%2Fy.png"] {
        let res = client
            .get(format!("{}/files/{}", proxy_base(proxy_addr, backend_addr), file))
            .send()
            .await
            .expect("Proxy unreachable");
        assert_eq!(res.status(), 200);
    }

    assert_eq!(
        *seen.lock().unwrap(),
        vec!["/files/a%3Fb.png", "/files/c%23d.png", "/files/x%2Fy.png"]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let backend_addr: SocketAddr = "127.0.0.1:28361".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28362".parse().unwrap();
    common::start_programmable_backend(backend_addr, |_| async {
        tokio::time::sleep(Duration::from_secs(3)).await;
        MockReply::html("<p>late</p>")
    })
    .await;
    let mut config = common::test_config(proxy_addr);
    config.timeouts.upstream_secs = 1;
    let shutdown = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("{}/slow", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains("timed out after 1s"));
    assert!(body.contains("/slow"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_redirect_loop_is_cut_off() {
    let backend_addr: SocketAddr = "127.0.0.1:28371".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28372".parse().unwrap();
    common::start_programmable_backend(backend_addr, |path| async move {
        let hop: u32 = path.trim_start_matches("/hop/").parse().unwrap_or(0);
        MockReply::redirect(format!("/hop/{}", hop + 1))
    })
    .await;
    let mut config = common::test_config(proxy_addr);
    config.upstream.max_redirects = 2;
    let shutdown = common::start_proxy(config).await;

    let res = common::client()
        .get(format!("{}/hop/0", proxy_base(proxy_addr, backend_addr)))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 500);
    let body = res.text().await.unwrap();
    assert!(body.contains("too many redirects (limit 2)"));

    shutdown.trigger();
}

#[tokio::test]
async fn test_bundler_chunk_public_path_rewritten() {
    let backend_addr: SocketAddr = "127.0.0.1:28381".parse().unwrap();
    let proxy_addr: SocketAddr = "127.0.0.1:28382".parse().unwrap();
    common::start_programmable_backend(backend_addr, |_| async {
        MockReply::with(
            200,
            "application/javascript",
            r#"(()=>{__webpack_require__.p="/_next/";})();"#,
        )
    })
    .await;
    let shutdown = common::start_proxy(common::test_config(proxy_addr)).await;

    let res = common::client()
        .get(format!(
            "{}/_next/static/chunks/webpack.js",
            proxy_base(proxy_addr, backend_addr)
        ))
        .send()
        .await
        .expect("Proxy unreachable");

    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()["content-type"], "application/javascript; charset=utf-8");
    let root = format!("/proxy/editor/{}/{}", SID, encode(&format!("http://{}", backend_addr)));
    let body = res.text().await.unwrap();
    assert!(body.contains(&format!(r#"__webpack_require__.p="{root}/_next/""#)));
    assert!(!body.contains(r#"p="/_next/""#));

    shutdown.trigger();
}
