// Locator sanity check - every cafe catalog entry finds its element
//
// Archived: not part of the default run. Useful after adding or changing
// catalog entries.

use crate::assertions::{DEFAULT_EXPECT_TIMEOUT, expect_hidden, expect_visible};
use crate::error::Result;
use crate::pages::CafePage;
use crate::pages::cafe::catalog;
use crate::scenario::ScenarioContext;

pub const NAME: &str = "locator sanity check";

pub async fn run(ctx: &ScenarioContext) -> Result<()> {
    let session = ctx.session();
    let cafe = CafePage::new(session);

    ctx.step("Open the cafe listing", async {
        cafe.open().await?;
        cafe.decline_cookies_if_shown().await?;
        Ok(())
    })
    .await?;

    ctx.step("Every catalog entry resolves", async {
        // The banner may never show; either way it must be gone now
        expect_hidden(
            session,
            &catalog::decline_cookies().first(),
            DEFAULT_EXPECT_TIMEOUT,
        )
        .await?;

        for element in [
            catalog::sort_dropdown(),
            catalog::sort_option("position"),
            catalog::show_limit(),
            catalog::show_limit_option("9"),
            catalog::product_names().first(),
            catalog::page1_link(),
            catalog::page2_link(),
        ] {
            expect_visible(session, &element, DEFAULT_EXPECT_TIMEOUT).await?;
        }
        Ok(())
    })
    .await
}
