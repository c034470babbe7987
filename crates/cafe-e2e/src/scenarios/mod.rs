// Scenario catalogue

pub mod locator_sanity;
pub mod sort_by_name;
pub mod sort_pagination;

use crate::scenario::Scenario;

/// Tag for scenarios kept for maintenance but left out of the default run
pub const ARCHIVE_TAG: &str = "archive";

/// Every known scenario, archived ones included.
pub fn all() -> Vec<Scenario> {
    vec![
        Scenario::new(sort_pagination::NAME, |ctx| {
            Box::pin(sort_pagination::run(ctx))
        })
        .with_tags(&["sort", "pagination"]),
        Scenario::new(sort_by_name::DESCENDING_NAME, |ctx| {
            Box::pin(sort_by_name::descending(ctx))
        })
        .with_tags(&["sort"]),
        Scenario::new(sort_by_name::BOTH_DIRECTIONS_NAME, |ctx| {
            Box::pin(sort_by_name::both_directions(ctx))
        })
        .with_tags(&["sort"]),
        Scenario::new(locator_sanity::NAME, |ctx| {
            Box::pin(locator_sanity::run(ctx))
        })
        .with_tags(&[ARCHIVE_TAG]),
    ]
}

/// Scenarios of the default run.
pub fn default_suite() -> Vec<Scenario> {
    all()
        .into_iter()
        .filter(|s| !s.has_tag(ARCHIVE_TAG))
        .collect()
}

/// Looks a scenario up by its exact name.
pub fn find(name: &str) -> Option<Scenario> {
    all().into_iter().find(|s| s.name() == name)
}
