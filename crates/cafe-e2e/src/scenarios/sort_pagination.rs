// TCX2 - a descending Product Z-A sort survives pagination

use crate::assertions::{DEFAULT_EXPECT_TIMEOUT, expect_text};
use crate::error::Result;
use crate::highlight::flash;
use crate::pages::CafePage;
use crate::pages::cafe::catalog;
use crate::scenario::ScenarioContext;
use std::time::Duration;
use tracing::debug;

pub const NAME: &str = "TCX2 – descending Product Z-A sort persists across pages";

/// First product on page 1 in the default order
pub const FIRST_PRODUCT_DEFAULT: &str = "Mango, chickpea & turmeric wrap";
/// First product on page 2 in the default order
pub const FIRST_PRODUCT_DEFAULT_PAGE2: &str = "Grind Flat White Coffee";
/// First product on page 1 sorted Z-A
pub const FIRST_PRODUCT_DESC: &str = "Wolfys Creamy Honey Porridge 50g";
/// First product on page 2 sorted Z-A
pub const FIRST_PRODUCT_DESC_PAGE2: &str = "Vithit Mango and Pineapple 330ml";

/// `data-value` of the Product Z-A sort option
pub const SORT_PRODUCT_DESC: &str = "product_desc";

/// The listing shows a loading animation while it re-renders
const SETTLE_BUDGET_30S: Duration = Duration::from_secs(30);
const SETTLE_BUDGET_60S: Duration = Duration::from_secs(60);

pub async fn run(ctx: &ScenarioContext) -> Result<()> {
    let session = ctx.session();
    let cafe = CafePage::new(session);
    let first_product = cafe.first_product();

    ctx.step("Navigate to the cafe listing and decline cookies", async {
        cafe.open().await?;
        cafe.decline_cookies_if_shown().await?;
        Ok(())
    })
    .await?;

    ctx.step("Check initial state", async {
        // Toolbar defaults are probed, not asserted: the site varies them
        let default_sort = session.is_visible(&catalog::sort_option("position")).await?;
        let limit_nine = session
            .is_visible(&catalog::show_limit_option("9"))
            .await?;
        debug!(default_sort, limit_nine, "Toolbar defaults");

        expect_text(
            session,
            &first_product,
            FIRST_PRODUCT_DEFAULT,
            DEFAULT_EXPECT_TIMEOUT,
        )
        .await?;
        flash(&first_product, session).await
    })
    .await?;

    ctx.step("Check pagination", async {
        cafe.go_to_page(2).await?;
        expect_text(
            session,
            &first_product,
            FIRST_PRODUCT_DEFAULT_PAGE2,
            SETTLE_BUDGET_30S,
        )
        .await?;
        flash(&first_product, session).await?;

        cafe.go_to_page(1).await
    })
    .await?;

    ctx.step("Sort products by Product Z-A", async {
        cafe.sort_by(SORT_PRODUCT_DESC).await?;
        expect_text(session, &first_product, FIRST_PRODUCT_DESC, SETTLE_BUDGET_30S).await?;
        flash(&first_product, session).await
    })
    .await?;

    ctx.step("Check sorting persists across pages", async {
        cafe.go_to_page(2).await?;
        expect_text(
            session,
            &first_product,
            FIRST_PRODUCT_DESC_PAGE2,
            SETTLE_BUDGET_60S,
        )
        .await?;
        flash(&first_product, session).await
    })
    .await
}
