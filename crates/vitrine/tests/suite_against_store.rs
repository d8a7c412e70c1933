//! The standard catalog against the in-memory demo store, with and without
//! injected faults.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;
use vitrine::mock::{DemoStore, DemoStoreFactory, StoreFaults};
use vitrine::pages::PageContext;
use vitrine::{
    RunOptions, ScenarioCatalog, ScenarioStatus, SuiteConfig, SuiteReport, SuiteRunner, UiSession,
};

async fn run_with(faults: StoreFaults, options: RunOptions) -> SuiteReport {
    let config = SuiteConfig::default();
    let factory = DemoStoreFactory::new(config.clone()).with_faults(faults);
    SuiteRunner::new(config, factory)
        .run(&ScenarioCatalog::standard(), &options)
        .await
}

fn status(report: &SuiteReport, id: &str) -> ScenarioStatus {
    report.outcome(id).unwrap().status
}

// =============================================================================
// HAPPY PATH
// =============================================================================

#[tokio::test(start_paused = true)]
async fn standard_catalog_passes() {
    let report = run_with(StoreFaults::none(), RunOptions::new()).await;
    assert_eq!(report.total_count(), 12);
    assert!(report.all_passed(), "{}", report.render_text());
    assert_eq!(report.passed_count(), 12);
}

#[tokio::test(start_paused = true)]
async fn parallel_run_keeps_catalog_order() {
    let report = run_with(StoreFaults::none(), RunOptions::new().with_jobs(4)).await;
    assert!(report.all_passed(), "{}", report.render_text());
    let catalog = ScenarioCatalog::standard();
    let expected: Vec<_> = catalog.scenarios().iter().map(|s| s.id).collect();
    let actual: Vec<_> = report.outcomes.iter().map(|o| o.id.as_str()).collect();
    assert_eq!(actual, expected);
}

#[tokio::test(start_paused = true)]
async fn filter_runs_one_group() {
    let report = run_with(StoreFaults::none(), RunOptions::new().with_filter("login.")).await;
    assert_eq!(report.total_count(), 6);
    assert!(report.outcomes.iter().all(|o| o.group == "login"));
    assert!(report.all_passed(), "{}", report.render_text());
}

#[tokio::test(start_paused = true)]
async fn transient_query_failures_are_absorbed() {
    let report = run_with(
        StoreFaults::none().with_transient_failures(2),
        RunOptions::new(),
    )
    .await;
    assert!(report.all_passed(), "{}", report.render_text());
}

#[tokio::test(start_paused = true)]
async fn slow_store_within_budgets_passes() {
    let report = run_with(
        StoreFaults::none().with_latency(Duration::from_secs(1)),
        RunOptions::new(),
    )
    .await;
    assert!(report.all_passed(), "{}", report.render_text());
}

// =============================================================================
// FAULTS
// =============================================================================

#[tokio::test(start_paused = true)]
async fn ignored_delete_fails_remove_scenario() {
    let report = run_with(
        StoreFaults::none().with_ignored_deletes(),
        RunOptions::new().with_filter("cart."),
    )
    .await;
    assert_eq!(status(&report, "cart.remove_item"), ScenarioStatus::Failed);
    let error = report.outcome("cart.remove_item").unwrap().error.clone().unwrap();
    assert!(error.contains("delete should remove the row"), "{error}");
    assert_eq!(report.failed_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_alert_fails_only_the_confirmation_check() {
    let report = run_with(
        StoreFaults::none().with_silent_add(),
        RunOptions::new().with_filter("cart."),
    )
    .await;
    assert_eq!(status(&report, "cart.add_as_guest"), ScenarioStatus::Failed);
    // the item still lands in the cart; scenarios that do not check the alert pass
    assert_eq!(status(&report, "cart.add_multiple"), ScenarioStatus::Passed);
    assert_eq!(status(&report, "cart.total_price"), ScenarioStatus::Passed);
}

#[tokio::test(start_paused = true)]
async fn cart_rows_slower_than_budget_fail_cart_checks() {
    let report = run_with(
        StoreFaults::none().with_latency(Duration::from_secs(6)),
        RunOptions::new().with_filter("cart.add_as_guest"),
    )
    .await;
    assert_eq!(report.total_count(), 1);
    assert_eq!(status(&report, "cart.add_as_guest"), ScenarioStatus::Failed);
}

#[tokio::test(start_paused = true)]
async fn fail_fast_skips_remaining_scenarios() {
    let report = run_with(
        StoreFaults::none().with_ignored_deletes(),
        RunOptions::new().with_fail_fast(true),
    )
    .await;
    let remove = report
        .outcomes
        .iter()
        .position(|o| o.id == "cart.remove_item")
        .unwrap();
    assert_eq!(report.outcomes[remove].status, ScenarioStatus::Failed);
    assert!(report.outcomes[..remove].iter().all(|o| o.status.is_passed()));
    assert!(report.outcomes[remove + 1..]
        .iter()
        .all(|o| o.status == ScenarioStatus::Skipped));
    assert!(!report.all_passed());
}

// =============================================================================
// PAGE OBJECTS AGAINST ONE SESSION
// =============================================================================

#[tokio::test(start_paused = true)]
async fn empty_cart_removes_every_row() {
    let config = SuiteConfig::default();
    let session = DemoStore::from_config(&config).into_session();
    let pages = PageContext::new(&session, &config);
    let products = &config.data.products;

    pages.base().goto().await.unwrap();
    for product in [&products.phone, &products.laptop, &products.monitor] {
        pages.base().navigate_to_home().await.unwrap();
        pages.home().select_category(product.category).await.unwrap();
        pages.home().select_product(&product.name).await.unwrap();
        assert!(pages.product().add_to_cart().await.unwrap().success);
    }
    assert_eq!(session.with_app(DemoStore::cart_names).unwrap().len(), 3);

    let cart = pages.cart();
    cart.open().await.unwrap();
    assert_eq!(cart.total_price_value().await.unwrap(), Some(360 + 790 + 400));
    assert_eq!(cart.empty_cart().await.unwrap(), 3);
    assert_eq!(cart.items_count().await.unwrap(), 0);
    assert!(session.with_app(DemoStore::cart_names).unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn delete_out_of_range_is_false() {
    let config = SuiteConfig::default();
    let session = DemoStore::from_config(&config).into_session();
    let pages = PageContext::new(&session, &config);

    pages.base().goto().await.unwrap();
    pages.cart().open().await.unwrap();
    assert!(!pages.cart().delete_item(0).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn failed_login_alert_is_logged_as_accepted() {
    let config = SuiteConfig::default();
    let session = DemoStore::from_config(&config).into_session();
    let pages = PageContext::new(&session, &config);

    let outcome = pages.login().login(&config.data.invalid_user).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message, "User does not exist.");

    let dialog = session.dialogs().last().unwrap();
    assert_eq!(dialog.message(), "User does not exist.");
    assert!(session.dialogs().missed().is_empty());
}

#[tokio::test(start_paused = true)]
async fn unarmed_dialog_is_dismissed_and_recorded() {
    let config = SuiteConfig::default();
    let session = DemoStore::from_config(&config).into_session();
    let pages = PageContext::new(&session, &config);
    let phone = &config.data.products.phone;

    pages.base().goto().await.unwrap();
    pages.home().select_category(phone.category).await.unwrap();
    pages.home().select_product(&phone.name).await.unwrap();
    pages
        .element(&config.selectors.product.add_to_cart)
        .click()
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(session.dialogs().missed().len(), 1);
    assert_eq!(session.with_app(DemoStore::cart_names).unwrap(), [phone.name.clone()]);
}

#[tokio::test(start_paused = true)]
async fn navigation_to_unknown_page_is_an_error() {
    let config = SuiteConfig::default();
    let session = DemoStore::from_config(&config).into_session();
    let err = session
        .navigate("https://www.demoblaze.com/checkout.html")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("checkout.html"));
}
