// Product list page - sort controls and name listing

use crate::error::Result;
use crate::locator::ElementRef;
use crate::session::PageSession;
use tracing::info;

/// Path of the product listing relative to the base URL
pub const PRODUCT_LIST_PATH: &str = "/speedbird-cafe";

pub mod catalog {
    use crate::locator::ElementRef;

    pub fn sort_control() -> ElementRef {
        ElementRef::text("sort control", "Sort by")
    }

    /// Sort option whose visible label is exactly `label`.
    pub fn sort_option(label: &str) -> ElementRef {
        ElementRef::text(format!("sort option '{label}'"), label)
    }

    pub fn sort_direction_toggle() -> ElementRef {
        ElementRef::test_id("sort direction toggle", "sort-direction-toggle")
    }

    pub fn product_names() -> ElementRef {
        ElementRef::test_id("product names", "product-name")
    }
}

pub struct ProductListPage<'a> {
    session: &'a PageSession,
}

impl<'a> ProductListPage<'a> {
    pub fn new(session: &'a PageSession) -> Self {
        Self { session }
    }

    pub async fn open(&self) -> Result<()> {
        info!(path = PRODUCT_LIST_PATH, "Opening product listing");
        self.session.goto(PRODUCT_LIST_PATH).await
    }

    /// Opens the sort control and picks the option labelled `label`.
    pub async fn select_sort_by(&self, label: &str) -> Result<()> {
        self.session.click(&catalog::sort_control()).await?;
        self.session.click(&catalog::sort_option(label)).await
    }

    /// Flips ascending/descending. Calling it twice restores the order.
    pub async fn toggle_sort_direction(&self) -> Result<()> {
        self.session
            .click(&catalog::sort_direction_toggle())
            .await
    }

    /// Names as rendered right now, in DOM order. Does not wait for
    /// anything; callers that just navigated must settle first.
    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.session.inner_texts(&catalog::product_names()).await
    }

    pub fn product_name_ref(&self) -> ElementRef {
        catalog::product_names()
    }
}
