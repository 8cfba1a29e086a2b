//! Cart fragment snapshots and count derivation.
//!
//! The commerce platform reports cart state in several shapes depending on
//! the endpoint: `cart_contents_count` from cart totals, a `fragments` map
//! of selector → HTML from refreshed fragments, or both. Everything except
//! the count is opaque to this crate and carried verbatim.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Fragment key whose HTML carries the storefront's `data-count` badge.
pub const CART_CONTENTS_FRAGMENT: &str = ".cart-contents";

/// Snapshot of cart totals. Replaced wholesale on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartFragments {
    #[serde(default, deserialize_with = "deserialize_count", skip_serializing_if = "Option::is_none")]
    pub cart_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cart_total: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartFragments {
    #[must_use]
    pub fn with_count(count: u32) -> Self {
        Self { cart_count: Some(count), ..Self::default() }
    }

    /// Build a snapshot from a raw platform response body.
    ///
    /// The `fragments` map and `cart_hash` are kept in `extra`; count and
    /// total are derived with [`derive_count`] / [`derive_total`].
    #[must_use]
    pub fn from_platform(body: &Value) -> Self {
        let mut extra = Map::new();
        if let Some(fragments) = body.get("fragments").and_then(Value::as_object) {
            for (key, value) in fragments {
                if key != "cart_count" && key != "cart_total" {
                    extra.insert(key.clone(), value.clone());
                }
            }
        }
        if let Some(hash) = body.get("cart_hash") {
            extra.insert("cart_hash".into(), hash.clone());
        }
        Self { cart_count: derive_count(body), cart_total: derive_total(body), extra }
    }

    /// Badge text for the mini-cart counter, if the snapshot carries a count.
    #[must_use]
    pub fn count_text(&self) -> Option<String> {
        self.cart_count.map(|count| count.to_string())
    }
}

fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(lenient_u32))
}

/// Accept counts sent as numbers or numeric strings.
fn lenient_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Derive the item count from a platform response.
///
/// Checked in order: `cart_contents_count`, `cart_count`,
/// `fragments.cart_count`, then the `data-count` attribute inside the
/// `.cart-contents` fragment HTML.
#[must_use]
pub fn derive_count(body: &Value) -> Option<u32> {
    if let Some(count) = body.get("cart_contents_count").and_then(lenient_u32) {
        return Some(count);
    }
    if let Some(count) = body.get("cart_count").and_then(lenient_u32) {
        return Some(count);
    }
    let fragments = body.get("fragments")?.as_object()?;
    if let Some(count) = fragments.get("cart_count").and_then(lenient_u32) {
        return Some(count);
    }
    fragments
        .iter()
        .filter(|(key, _)| key.contains(CART_CONTENTS_FRAGMENT))
        .filter_map(|(_, html)| html.as_str())
        .find_map(data_count_attr)
}

/// Derive the formatted cart total, if the platform sent one.
#[must_use]
pub fn derive_total(body: &Value) -> Option<String> {
    let total = body
        .get("cart_total")
        .or_else(|| body.get("total"))
        .or_else(|| body.get("fragments").and_then(|f| f.get("cart_total")))?;
    match total {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Extract `N` from the first `data-count="N"` attribute in an HTML snippet.
fn data_count_attr(html: &str) -> Option<u32> {
    let (_, rest) = html.split_once("data-count=")?;
    let rest = rest.trim_start_matches(['"', '\'']);
    let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

#[cfg(test)]
#[path = "fragments_test.rs"]
mod tests;
