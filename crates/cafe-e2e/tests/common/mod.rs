// Shared test setup

#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a fmt subscriber once per test binary. RUST_LOG picks the level.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cafe_e2e=info")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Launches Playwright and a headless Chromium.
pub async fn launch_chromium() -> (playwright_rs::Playwright, playwright_rs::Browser) {
    let playwright = playwright_rs::Playwright::launch()
        .await
        .expect("Failed to launch Playwright");
    let browser = playwright
        .chromium()
        .launch()
        .await
        .expect("Failed to launch browser");
    (playwright, browser)
}
