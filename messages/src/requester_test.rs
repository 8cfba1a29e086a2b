use super::*;
use crate::channel::{MpscTransport, Posted};
use crate::message::AddToCart;
use crate::origin::{Origin, OriginPolicy};
use serde_json::json;
use tokio::sync::mpsc;

const STORE: &str = "https://flavorinthejar.com";

fn requester() -> (CartRequester<MpscTransport>, mpsc::UnboundedReceiver<Posted>) {
    let (transport, rx) = MpscTransport::new();
    let store = Origin::parse(STORE).unwrap();
    let channel = Channel::new(transport, store.clone(), OriginPolicy::new([store]));
    (CartRequester::new(channel), rx)
}

/// Pull the next posted request and decode its payload.
async fn next_request(rx: &mut mpsc::UnboundedReceiver<Posted>) -> AddToCart {
    let posted = rx.recv().await.expect("request posted");
    match Message::decode(&posted.data).expect("valid message") {
        Message::AddToCart { payload } => payload,
        other => panic!("expected addToCart, got {other:?}"),
    }
}

fn reply(message: &Message) -> MessageEvent {
    MessageEvent::new(STORE, serde_json::to_value(message).unwrap())
}

#[tokio::test]
async fn zero_quantity_is_rejected_before_posting() {
    let (requester, mut rx) = requester();
    let err = requester.add_to_cart(16, 0).await.unwrap_err();
    assert_eq!(err, RequestError::InvalidQuantity(0));
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn correlated_success_resolves_request() {
    let (requester, mut rx) = requester();

    let storefront = async {
        let request = next_request(&mut rx).await;
        assert_eq!(request.product_id, 16);
        assert!(request.request_id.is_some());
        let response = Message::succeeded(&request, Some(CartFragments::with_count(1)));
        requester.handle_event(&reply(&response))
    };

    let (result, inbound) = tokio::join!(requester.add_to_cart(16, 1), storefront);
    let result = result.unwrap();
    assert!(result.success);
    assert_eq!(result.payload.fragments.and_then(|f| f.cart_count), Some(1));
    assert!(matches!(inbound, Inbound::Resolved(_)));
    assert!(requester.pending().is_empty());
}

#[tokio::test]
async fn failure_response_maps_to_rejected() {
    let (requester, mut rx) = requester();
    let storefront = async {
        let request = next_request(&mut rx).await;
        requester.handle_event(&reply(&Message::failed(&request, "Produkt niedostępny")))
    };
    let (result, _) = tokio::join!(requester.add_to_cart(7313, 1), storefront);
    let err = result.unwrap_err();
    assert_eq!(err, RequestError::Rejected("Produkt niedostępny".into()));
    assert!(err.retryable());
}

#[tokio::test]
async fn concurrent_requests_for_same_product_resolve_independently() {
    let (requester, mut rx) = requester();

    let storefront = async {
        let first = next_request(&mut rx).await;
        let second = next_request(&mut rx).await;
        assert_ne!(first.request_id, second.request_id);
        // Answer out of order: the second request fails, the first succeeds.
        requester.handle_event(&reply(&Message::failed(&second, "second failed")));
        requester.handle_event(&reply(&Message::succeeded(&first, None)));
    };

    let (first, second, ()) =
        tokio::join!(requester.add_to_cart(16, 1), requester.add_to_cart(16, 1), storefront);
    assert!(first.unwrap().success);
    assert_eq!(second.unwrap_err(), RequestError::Rejected("second failed".into()));
}

#[tokio::test(start_paused = true)]
async fn timeout_fails_soft_within_deadline() {
    let (requester, mut rx) = requester();
    let requester = requester.with_timeout(Duration::from_secs(3));

    let started = tokio::time::Instant::now();
    let err = requester.add_to_cart(16, 1).await.unwrap_err();
    let elapsed = started.elapsed();

    assert_eq!(err, RequestError::Timeout(Duration::from_secs(3)));
    assert!(err.retryable());
    assert!(elapsed >= Duration::from_secs(3));
    assert!(elapsed < Duration::from_secs(3) + Duration::from_millis(50));
    assert!(requester.pending().is_empty(), "timed-out request must be torn down");

    // A late answer finds nothing to resolve.
    let request = next_request(&mut rx).await;
    assert_eq!(requester.handle_event(&reply(&Message::succeeded(&request, None))), Inbound::Stale);
}

#[tokio::test(start_paused = true)]
async fn abandoned_request_is_torn_down() {
    let (requester, mut rx) = requester();

    let outer = tokio::time::timeout(Duration::from_millis(100), requester.add_to_cart(16, 1)).await;
    assert!(outer.is_err(), "caller gave up first");
    assert!(requester.pending().is_empty());

    let request = next_request(&mut rx).await;
    assert_eq!(requester.handle_event(&reply(&Message::succeeded(&request, None))), Inbound::Stale);
}

#[tokio::test]
async fn closed_window_is_a_transport_error() {
    let (requester, rx) = requester();
    drop(rx);
    let err = requester.add_to_cart(16, 1).await.unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)));
    assert!(requester.pending().is_empty());
}

#[test]
fn handle_event_classifies_broadcasts() {
    let (requester, _rx) = requester();

    let fragments = requester.handle_event(&MessageEvent::new(
        STORE,
        json!({"type": "cartUpdated", "payload": {"cart_count": 2}}),
    ));
    assert_eq!(fragments, Inbound::Fragments(CartFragments::with_count(2)));

    let toggle = requester.handle_event(&MessageEvent::new(STORE, json!({"type": "toggleCart", "payload": {"show": false}})));
    assert_eq!(toggle, Inbound::Toggle(false));

    let untrusted = requester.handle_event(&MessageEvent::new(
        "https://evil.test",
        json!({"type": "cartUpdated", "payload": {"cart_count": 99}}),
    ));
    assert_eq!(untrusted, Inbound::Ignored);

    let request = requester.handle_event(&MessageEvent::new(
        STORE,
        json!({"type": "addToCart", "payload": {"productId": 16}}),
    ));
    assert_eq!(request, Inbound::Ignored);
}
