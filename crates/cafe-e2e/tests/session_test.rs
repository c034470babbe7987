// Integration tests for PageSession
//
// Tests cover:
// - Navigation relative to the base URL and network-idle waits after clicks
// - Navigation errors against an unreachable host
// - Error statuses (warned, not failed)
// - Reading texts of every match of an element reference
// - Text reads are one snapshot while the list re-renders

mod common;

use cafe_e2e::{ElementRef, Error, LoadState, PageSession, SessionOptions};
use fixture_server::FixtureServer;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_network_idle_waits_for_pending_fetch() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let (playwright, browser) = common::launch_chromium().await;

    let session = PageSession::open(&browser, &SessionOptions::new(server.url()))
        .await
        .expect("Failed to open session");
    session.goto("/network").await.expect("Failed to navigate");
    assert_eq!(session.url(), format!("{}/network", server.url()));

    session
        .click(&ElementRef::css("load button", "#load"))
        .await
        .expect("Failed to click");
    session
        .wait_for_network_idle()
        .await
        .expect("Network never went idle");

    // No waiting here: the fetch must already have landed
    let texts = session
        .inner_texts(&ElementRef::test_id("result", "result"))
        .await
        .expect("Failed to read result");
    assert_eq!(texts, vec!["loaded".to_string()]);

    session
        .wait_for_load_state(LoadState::DomContentLoaded, Duration::from_secs(5))
        .await
        .expect("DOM content never loaded");

    session.close().await.expect("Failed to close session");
    browser.close().await.expect("Failed to close browser");
    playwright.shutdown().await.expect("Failed to shutdown");
    server.shutdown();
}

#[tokio::test]
async fn test_navigation_errors() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let (playwright, browser) = common::launch_chromium().await;

    // Port with nothing listening
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let dead_url = format!("http://{}", listener.local_addr().expect("No address"));
    drop(listener);

    let mut options = SessionOptions::new(dead_url.as_str());
    options.navigation_timeout = Duration::from_secs(5);
    let session = PageSession::open(&browser, &options)
        .await
        .expect("Failed to open session");

    let err = session.goto("/cafe").await.unwrap_err();
    match err {
        Error::Navigation { url, .. } => assert_eq!(url, format!("{dead_url}/cafe")),
        other => panic!("Expected navigation error, got {other}"),
    }
    session.close().await.expect("Failed to close session");

    // A 404 still loads a document; it is logged, not failed
    let session = PageSession::open(&browser, &SessionOptions::new(server.url()))
        .await
        .expect("Failed to open session");
    session
        .goto("/no-such-page")
        .await
        .expect("Error status should not fail navigation");
    session.close().await.expect("Failed to close session");

    browser.close().await.expect("Failed to close browser");
    playwright.shutdown().await.expect("Failed to shutdown");
    server.shutdown();
}

#[tokio::test]
async fn test_session_over_existing_page() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let (playwright, browser) = common::launch_chromium().await;
    let page = browser.new_page().await.expect("Failed to create page");

    let session = PageSession::from_page(page, &server.url())
        .await
        .expect("Failed to wrap page");
    assert_eq!(
        session.url_for("/speedbird-cafe").expect("Bad URL").as_str(),
        format!("{}/speedbird-cafe", server.url())
    );

    session.goto("/highlight").await.expect("Failed to navigate");
    let items = ElementRef::css("items", "li.item");
    assert_eq!(
        session.inner_texts(&items).await.expect("Failed to read items"),
        vec!["First".to_string(), "Second".to_string()]
    );
    assert_eq!(
        session
            .inner_texts(&items.last())
            .await
            .expect("Failed to read last item"),
        vec!["Second".to_string()]
    );
    assert!(
        session
            .inner_texts(&ElementRef::css("missing", "#missing"))
            .await
            .expect("Failed to read missing")
            .is_empty()
    );
    assert!(
        session
            .is_visible(&ElementRef::text("plain paragraph", "Plain paragraph"))
            .await
            .expect("Failed to check visibility")
    );

    session.close().await.expect("Failed to close page");
    browser.close().await.expect("Failed to close browser");
    playwright.shutdown().await.expect("Failed to shutdown");
    server.shutdown();
}

#[tokio::test]
async fn test_inner_texts_is_a_single_snapshot() {
    common::init_tracing();
    let server = FixtureServer::start().await;
    let (playwright, browser) = common::launch_chromium().await;
    let session = PageSession::open(&browser, &SessionOptions::new(server.url()))
        .await
        .expect("Failed to open session");
    session.goto("/highlight").await.expect("Failed to navigate");

    // Re-render a list between five and three entries every few milliseconds
    session
        .page()
        .evaluate::<(), ()>(
            "() => { \
               const list = document.createElement('ol'); \
               list.id = 'swap'; document.body.appendChild(list); \
               let long = true; \
               const render = () => { \
                 const names = long ? ['E', 'D', 'C', 'B', 'A'] : ['Z', 'Y', 'X']; \
                 list.replaceChildren(...names.map((n) => { \
                   const li = document.createElement('li'); li.textContent = n; return li; })); \
                 long = !long; }; \
               render(); setInterval(render, 3); }",
            None,
        )
        .await
        .expect("Failed to install re-rendering list");

    let entries = ElementRef::css("swap entries", "#swap > li");
    let long: Vec<String> = ["E", "D", "C", "B", "A"].map(String::from).to_vec();
    let short: Vec<String> = ["Z", "Y", "X"].map(String::from).to_vec();
    for _ in 0..20 {
        let start = Instant::now();
        let texts = session
            .inner_texts(&entries)
            .await
            .expect("Failed to read entries");
        assert!(texts == long || texts == short, "mixed read: {texts:?}");
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    session.close().await.expect("Failed to close session");
    browser.close().await.expect("Failed to close browser");
    playwright.shutdown().await.expect("Failed to shutdown");
    server.shutdown();
}
