use super::*;
use crate::message::AddToCartOutcome;

fn result_for(product_id: ProductId, request_id: Option<RequestId>, success: bool) -> CartAddResult {
    CartAddResult {
        success,
        payload: AddToCartOutcome { product_id, request_id, fragments: None, error: None },
    }
}

#[tokio::test]
async fn resolves_only_the_matching_request_for_same_product() {
    let table = PendingRequests::new();
    let (first_id, first_rx) = table.register(16);
    let (second_id, mut second_rx) = table.register(16);
    assert_ne!(first_id, second_id);

    let resolution = table.resolve(result_for(16, Some(first_id), true));
    assert_eq!(resolution, Resolution::Resolved(first_id));

    let delivered = first_rx.await.unwrap();
    assert_eq!(delivered.payload.request_id, Some(first_id));
    assert!(second_rx.try_recv().is_err(), "second request must stay pending");
    assert!(table.is_pending(second_id));
    assert_eq!(table.len(), 1);
}

#[test]
fn result_without_id_is_not_owned() {
    let table = PendingRequests::new();
    let (_id, _rx) = table.register(16);
    assert_eq!(table.resolve(result_for(16, None, true)), Resolution::NotOwned);
    assert_eq!(table.len(), 1);
}

#[test]
fn foreign_id_is_not_owned() {
    let table = PendingRequests::new();
    let (_id, _rx) = table.register(16);
    assert_eq!(table.resolve(result_for(16, Some(RequestId::generate()), true)), Resolution::NotOwned);
}

#[test]
fn product_mismatch_leaves_request_open() {
    let table = PendingRequests::new();
    let (id, _rx) = table.register(16);
    assert_eq!(table.resolve(result_for(166, Some(id), true)), Resolution::ProductMismatch(id));
    assert!(table.is_pending(id));
}

#[test]
fn late_result_after_cancel_is_ignored() {
    let table = PendingRequests::new();
    let (id, _rx) = table.register(16);
    assert!(table.cancel(id));
    assert!(!table.cancel(id));
    assert_eq!(table.resolve(result_for(16, Some(id), true)), Resolution::NotOwned);
    assert!(table.is_empty());
}

#[test]
fn dropped_waiter_is_reported_as_abandoned() {
    let table = PendingRequests::new();
    let (id, rx) = table.register(16);
    drop(rx);
    assert_eq!(table.resolve(result_for(16, Some(id), false)), Resolution::Abandoned(id));
    assert!(table.is_empty());
}
