// Sorting by product name, checked against a local sort of the same names

use crate::assertions::{SortDirection, assert_same_sequence, assert_sorted, expected_order};
use crate::error::Result;
use crate::pages::ProductListPage;
use crate::scenario::ScenarioContext;

pub const DESCENDING_NAME: &str = "Sort Products by Name Descending";
pub const BOTH_DIRECTIONS_NAME: &str = "Sort Products by Name in both directions";

/// Visible label of the name sort option
pub const PRODUCT_NAME_LABEL: &str = "Product Name";

pub async fn descending(ctx: &ScenarioContext) -> Result<()> {
    let list = ProductListPage::new(ctx.session());

    ctx.step("Open the product listing", list.open()).await?;
    ctx.step(
        "Sort by Product Name",
        list.select_sort_by(PRODUCT_NAME_LABEL),
    )
    .await?;
    ctx.step("Toggle sort direction", list.toggle_sort_direction())
        .await?;

    ctx.step("Names are in reverse lexicographic order", async {
        let names = list.product_names().await?;
        assert_sorted(&names, SortDirection::Descending)
    })
    .await
}

pub async fn both_directions(ctx: &ScenarioContext) -> Result<()> {
    let list = ProductListPage::new(ctx.session());

    ctx.step("Open the product listing", list.open()).await?;

    let ascending = ctx
        .step("Sort by Product Name ascending", async {
            list.select_sort_by(PRODUCT_NAME_LABEL).await?;
            let names = list.product_names().await?;
            assert_sorted(&names, SortDirection::Ascending)?;
            Ok(names)
        })
        .await?;

    ctx.step("Toggle to descending", async {
        list.toggle_sort_direction().await?;
        let names = list.product_names().await?;
        assert_same_sequence(
            &expected_order(&ascending, SortDirection::Descending),
            &names,
        )
    })
    .await
}
