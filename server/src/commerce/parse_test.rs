use super::*;
use serde_json::json;

#[test]
fn strict_json_parses() {
    assert_eq!(parse_permissive(r#"{"cart_hash":"abc"}"#).unwrap(), json!({"cart_hash": "abc"}));
}

#[test]
fn bom_and_whitespace_are_stripped() {
    assert_eq!(parse_permissive("\u{feff}  {\"a\":1}\n").unwrap(), json!({"a": 1}));
}

#[test]
fn json_after_php_notice_is_recovered() {
    let body = "<br />\n<b>Notice</b>: Undefined index in functions.php<br />\n{\"fragments\":{},\"cart_hash\":\"x\"}";
    assert_eq!(parse_permissive(body).unwrap(), json!({"fragments": {}, "cart_hash": "x"}));
}

#[test]
fn html_page_is_not_json() {
    let err = parse_permissive("<!DOCTYPE html><html><body>Koszyk</body></html>").unwrap_err();
    match err {
        CommerceError::NotJson { snippet } => assert!(snippet.starts_with("<!DOCTYPE")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn snippet_is_bounded_by_chars() {
    let long = "ż".repeat(500);
    assert_eq!(snippet(&long).chars().count(), SNIPPET_CHARS);
}

#[test]
fn error_body_is_optional() {
    assert_eq!(parse_error_body("Internal Server Error"), None);
    assert_eq!(parse_error_body(r#"{"message":"boom"}"#), Some(json!({"message": "boom"})));
}
