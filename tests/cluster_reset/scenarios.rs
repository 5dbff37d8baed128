//! BDD scenarios for cluster resets.

use rstest_bdd_macros::scenario;

use super::test_helpers::{ResetContext, reset_context};

#[scenario(
    path = "tests/features/cluster_reset.feature",
    name = "Declining the confirmation leaves the server untouched"
)]
fn scenario_declined_reset(reset_context: ResetContext) {
    drop(reset_context);
}

#[scenario(
    path = "tests/features/cluster_reset.feature",
    name = "A missing cluster does not block recreation"
)]
fn scenario_drop_failure_tolerated(reset_context: ResetContext) {
    drop(reset_context);
}

#[scenario(
    path = "tests/features/cluster_reset.feature",
    name = "A failed recreation is reported"
)]
fn scenario_create_failure(reset_context: ResetContext) {
    drop(reset_context);
}
