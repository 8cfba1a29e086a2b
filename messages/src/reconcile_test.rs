use super::*;
use crate::events::{EVENT_CART_STATE_UPDATED, EVENT_TOGGLE_CART};
use crate::testing::RecordingSurface;
use serde_json::json;

fn reconciler(counters: usize, has_panel: bool) -> (Reconciler<RecordingSurface>, Arc<RecordingSurface>) {
    let surface = Arc::new(RecordingSurface::new(counters, has_panel));
    (Reconciler::new(surface.clone(), EventBus::new()), surface)
}

#[tokio::test]
async fn apply_updates_every_counter_and_publishes() {
    let (reconciler, surface) = reconciler(2, true);
    let mut sub = reconciler.bus().subscribe(EVENT_CART_STATE_UPDATED);

    reconciler.apply(CartFragments::with_count(2));

    assert_eq!(surface.log().badge_text, vec!["2"]);
    assert_eq!(sub.try_recv(), Some(CartEvent::StateUpdated(CartFragments::with_count(2))));
    assert_eq!(reconciler.latest(), Some(CartFragments::with_count(2)));
}

#[tokio::test]
async fn snapshots_replace_rather_than_merge() {
    let (reconciler, _surface) = reconciler(1, true);
    let mut first = CartFragments::with_count(1);
    first.extra.insert("div.widget_shopping_cart_content".into(), json!("<div>1</div>"));
    reconciler.apply(first);

    let second = CartFragments { cart_total: Some("19.80 zł".into()), ..CartFragments::with_count(2) };
    reconciler.apply(second.clone());

    let latest = reconciler.latest().unwrap();
    assert_eq!(latest, second);
    assert!(latest.extra.is_empty(), "old fragment must not survive");
}

#[tokio::test]
async fn snapshot_without_count_leaves_badge_alone() {
    let (reconciler, surface) = reconciler(1, true);
    reconciler.apply(CartFragments { cart_total: Some("0.00 zł".into()), ..CartFragments::default() });
    assert!(surface.log().badge_text.is_empty());
    assert!(surface.log().indicator.is_empty());
}

#[tokio::test(start_paused = true)]
async fn indicator_clears_after_duration() {
    let (reconciler, surface) = reconciler(1, true);
    reconciler.apply(CartFragments::with_count(3));
    assert_eq!(surface.log().indicator, vec![true]);

    tokio::time::sleep(INDICATOR_DURATION + Duration::from_millis(10)).await;
    assert_eq!(surface.log().indicator, vec![true, false]);
}

#[test]
fn apply_without_runtime_still_updates() {
    let (reconciler, surface) = reconciler(1, true);
    reconciler.apply(CartFragments::with_count(4));
    assert_eq!(surface.log().badge_text, vec!["4"]);
    assert_eq!(surface.log().indicator, vec![true]);
}

#[test]
fn missing_panel_is_a_noop_but_still_published() {
    let (reconciler, surface) = reconciler(1, false);
    let mut sub = reconciler.bus().subscribe(EVENT_TOGGLE_CART);
    assert!(!reconciler.toggle_panel(true));
    assert!(surface.log().panel.is_empty());
    assert_eq!(sub.try_recv(), Some(CartEvent::TogglePanel { show: true }));
}

#[test]
fn toggle_panel_opens_and_closes() {
    let (reconciler, surface) = reconciler(1, true);
    assert!(reconciler.toggle_panel(true));
    assert!(reconciler.toggle_panel(false));
    assert_eq!(surface.log().panel, vec![true, false]);
}
