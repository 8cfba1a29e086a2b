use super::*;
use serde_json::json;

#[test]
fn add_to_cart_wire_shape() {
    let id = RequestId::generate();
    let value = serde_json::to_value(Message::add_to_cart(16, 2, id)).unwrap();
    assert_eq!(value["type"], "addToCart");
    assert_eq!(value["payload"]["productId"], 16);
    assert_eq!(value["payload"]["quantity"], 2);
    assert_eq!(value["payload"]["requestId"], id.to_string());
}

#[test]
fn decode_defaults_quantity_to_one() {
    let msg = Message::decode(&json!({"type": "addToCart", "payload": {"productId": 166}})).unwrap();
    let Message::AddToCart { payload } = msg else {
        panic!("expected addToCart");
    };
    assert_eq!(payload.product_id, 166);
    assert_eq!(payload.quantity, 1);
    assert!(payload.request_id.is_none());
}

#[test]
fn response_keeps_success_beside_payload() {
    let request = AddToCart { product_id: 16, quantity: 1, request_id: Some(RequestId::generate()) };
    let value = serde_json::to_value(Message::succeeded(&request, None)).unwrap();
    assert_eq!(value["type"], "addToCartResponse");
    assert_eq!(value["success"], true);
    assert_eq!(value["payload"]["productId"], 16);
    assert!(value["payload"].get("error").is_none());

    let decoded = Message::decode(&value).unwrap();
    let Message::AddToCartResponse(result) = decoded else {
        panic!("expected response");
    };
    assert!(result.success);
    assert_eq!(result.payload.request_id, request.request_id);
}

#[test]
fn failed_response_carries_error_text() {
    let request = AddToCart { product_id: 7, quantity: 1, request_id: None };
    let Message::AddToCartResponse(result) = Message::failed(&request, "out of stock") else {
        panic!("expected response");
    };
    assert!(!result.success);
    assert_eq!(result.payload.error.as_deref(), Some("out of stock"));
}

#[test]
fn toggle_without_payload_opens_panel() {
    let msg = Message::decode(&json!({"type": "toggleCart"})).unwrap();
    assert_eq!(msg, Message::toggle_cart(true));

    let msg = Message::decode(&json!({"type": "toggleCart", "payload": {"show": false}})).unwrap();
    assert_eq!(msg, Message::toggle_cart(false));

    let msg = Message::decode(&json!({"type": "toggleCart", "payload": {}})).unwrap();
    assert_eq!(msg, Message::toggle_cart(true));
}

#[test]
fn cart_updated_decodes_fragments() {
    let msg = Message::decode(&json!({
        "type": "cartUpdated",
        "payload": {"cart_count": 3, "cart_total": "29.70 zł", "cart_hash": "abc"}
    }))
    .unwrap();
    let Message::CartUpdated { payload } = msg else {
        panic!("expected cartUpdated");
    };
    assert_eq!(payload.cart_count, Some(3));
    assert_eq!(payload.cart_total.as_deref(), Some("29.70 zł"));
    assert_eq!(payload.extra.get("cart_hash"), Some(&json!("abc")));
}

#[test]
fn decode_unknown_tag_is_distinguished() {
    let err = Message::decode(&json!({"type": "wishlistAdd", "payload": {}})).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownType(tag) if tag == "wishlistAdd"));
}

#[test]
fn decode_missing_tag() {
    assert!(matches!(Message::decode(&json!({"payload": {}})), Err(DecodeError::MissingType)));
    assert!(matches!(Message::decode(&json!("addToCart")), Err(DecodeError::MissingType)));
    assert!(matches!(Message::decode(&json!({"type": 5})), Err(DecodeError::MissingType)));
}

#[test]
fn decode_known_tag_with_bad_shape_is_malformed() {
    let err = Message::decode(&json!({"type": "addToCart", "payload": {"productId": "sixteen"}})).unwrap_err();
    assert!(matches!(err, DecodeError::Malformed { tag, .. } if tag == "addToCart"));
}

#[test]
fn tags_match_wire_names() {
    assert_eq!(Message::toggle_cart(true).tag(), "toggleCart");
    assert_eq!(Message::cart_updated(CartFragments::default()).tag(), "cartUpdated");
    assert_eq!(Message::add_to_cart(1, 1, RequestId::generate()).tag(), "addToCart");
}

#[test]
fn request_ids_are_unique() {
    assert_ne!(RequestId::generate(), RequestId::generate());
}
