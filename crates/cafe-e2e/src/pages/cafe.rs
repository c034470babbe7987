// Cafe listing page - locator catalog and facade
//
// The catalog is the only place that knows the listing's markup. Entries that
// depend on a runtime value (sort key, show-limit) are plain functions from
// the value to an ElementRef; nothing is validated, so an unknown value just
// matches zero elements.

use crate::error::{Error, Result};
use crate::highlight::flash;
use crate::locator::ElementRef;
use crate::session::PageSession;
use tracing::{debug, info};

/// Path of the cafe listing relative to the base URL
pub const CAFE_PATH: &str = "/cafe";

/// Selectors for the cafe listing.
pub mod catalog {
    use crate::locator::ElementRef;

    pub fn decline_cookies() -> ElementRef {
        ElementRef::css("decline cookies", "button.amgdprcookie-button.-decline")
    }

    pub fn sort_dropdown() -> ElementRef {
        ElementRef::css("sort dropdown", ".toolbar-sorter.sorter ul > li.init")
    }

    /// Sort option keyed by its `data-value` (e.g. `product_desc`).
    pub fn sort_option(value: &str) -> ElementRef {
        ElementRef::css(
            format!("sort option '{value}'"),
            format!(".toolbar-sorter.sorter li.options[data-value=\"{value}\"]"),
        )
    }

    pub fn product_names() -> ElementRef {
        ElementRef::css("product names", ".product-item .product-item-name a")
    }

    pub fn page1_link() -> ElementRef {
        ElementRef::css(
            "page 1 link",
            "#layer-product-list > div:nth-child(3) > div.pages > ul > li:nth-child(2) > a",
        )
    }

    pub fn page2_link() -> ElementRef {
        ElementRef::css(
            "page 2 link",
            "#layer-product-list > div:nth-child(3) > div.pages > ul > li:nth-child(3) > a",
        )
    }

    pub fn show_limit() -> ElementRef {
        ElementRef::css("show limit", ".toolbar-sorter.limiter li.init")
    }

    /// Show-limit option keyed by its `data-value` (e.g. `9`).
    pub fn show_limit_option(value: &str) -> ElementRef {
        ElementRef::css(
            format!("show limit option '{value}'"),
            format!(".toolbar-sorter.limiter li.options[data-value=\"{value}\"]"),
        )
    }
}

/// Journey-level operations on the cafe listing.
///
/// Every interaction highlights its target first so recorded runs show what
/// was clicked.
pub struct CafePage<'a> {
    session: &'a PageSession,
}

impl<'a> CafePage<'a> {
    pub fn new(session: &'a PageSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &PageSession {
        self.session
    }

    /// Navigates to the listing and waits for the network to settle.
    pub async fn open(&self) -> Result<()> {
        info!(path = CAFE_PATH, "Opening cafe listing");
        self.session.goto(CAFE_PATH).await
    }

    /// Declines the cookie banner when it is showing.
    ///
    /// Returns whether the banner was there.
    pub async fn decline_cookies_if_shown(&self) -> Result<bool> {
        let decline = catalog::decline_cookies();
        if !self.session.is_visible(&decline).await? {
            debug!("Cookie banner not shown");
            return Ok(false);
        }
        self.click_highlighted(&decline).await?;
        Ok(true)
    }

    /// Opens the sort dropdown and picks the option with `data-value == value`.
    pub async fn sort_by(&self, value: &str) -> Result<()> {
        self.click_highlighted(&catalog::sort_dropdown()).await?;
        self.click_highlighted(&catalog::sort_option(value)).await?;
        self.session.wait_for_network_idle().await
    }

    /// Follows the pagination link for page 1 or 2.
    pub async fn go_to_page(&self, page: u32) -> Result<()> {
        let link = match page {
            1 => catalog::page1_link(),
            2 => catalog::page2_link(),
            other => {
                return Err(Error::Config(format!(
                    "no pagination link for page {other} in the catalog"
                )));
            }
        };
        self.click_highlighted(&link).await?;
        self.session.wait_for_network_idle().await
    }

    /// Names of the products currently listed, in DOM order.
    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.session.inner_texts(&catalog::product_names()).await
    }

    /// Reference to the first listed product name.
    pub fn first_product(&self) -> ElementRef {
        catalog::product_names().first()
    }

    async fn click_highlighted(&self, element: &ElementRef) -> Result<()> {
        flash(element, self.session).await?;
        self.session.click(element).await
    }
}
