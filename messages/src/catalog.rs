//! Static snapshot of the storefront's spice catalog.
//!
//! Product ids here are the commerce platform's ids and are the join key
//! for every cart call. The snapshot is read-only; prices are display
//! strings in the store currency.

use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::message::ProductId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub product_url: String,
    pub add_to_cart_url: String,
}

fn product(id: ProductId, name: &str, description: &str, price: &str, image_url: &str, product_url: &str) -> Product {
    Product {
        id,
        name: name.to_owned(),
        description: description.to_owned(),
        price: price.to_owned(),
        image_url: image_url.to_owned(),
        product_url: product_url.to_owned(),
        add_to_cart_url: format!("/?add-to-cart={id}"),
    }
}

static CATALOG: LazyLock<Vec<Product>> = LazyLock::new(|| {
    vec![
        product(7313, "Karta podarunkowa", "", "100 zł", "https://flavorinthejar.com/wp-content/uploads/2024/02/pw-gift-card.png", "/product/karta-podarunkowa"),
        product(16, "Kura Lover", "30g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2023/12/Kura-Lover-1-3.jpg", "/product/kura-lover"),
        product(166, "Jajo Mania", "45g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/Untitled-1-1-2.jpg", "/product/jajomania"),
        product(163, "VegeLife", "70g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/vegelifejpg-1.jpg", "/product/vege-life"),
        product(160, "Italiana", "50g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/italianajpg-1.jpg", "/product/italiana"),
        product(157, "Ziemniak Rulezzz", "55g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/Ziemniak-rulez-3-2.jpg", "/product/ziemniak-rulez"),
        product(154, "Pizza Time", "30g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/Pizza-Time-1-4.jpg", "/product/pizza-time"),
        product(148, "Fryta is here", "55g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/frytaisherejpg-1.jpg", "/product/fryta-is-here"),
        product(145, "Arabic Magic", "50g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/arabic-magicjpg-1.jpg", "/product/arabic-magic"),
        product(133, "CynamonoweLove", "45g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/cynamonowe-love-1.jpg", "/product/cynamonowe-love"),
        product(130, "Panini", "50g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/paninijpg-1-1.jpg", "/product/panini"),
        product(127, "BBQ", "55g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/BBQ-1-2.jpg", "/product/bbq"),
        product(124, "Pomidor Bazylia Czosnek", "30g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/pomidor-bazylia-czosnek-3.jpg", "/product/bazylia-i-czosnek"),
        product(121, "Pieprz i czosnek", "55g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/pieprzczosnekjg-1.jpg", "/product/pieprz-czosnek"),
        product(118, "Turecki Kebab", "50g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/turecki-kebabjpg-1.jpg", "/product/turecki-kebab"),
        product(115, "Owsiankowe WOW", "50g", "9.90 zł", "https://flavorinthejar.com/wp-content/uploads/2020/08/owsiankowewow-1.jpg", "/product/owsiankowe-wow"),
    ]
});

/// Every product in catalog order.
#[must_use]
pub fn catalog() -> &'static [Product] {
    &CATALOG
}

#[must_use]
pub fn find(id: ProductId) -> Option<&'static Product> {
    CATALOG.iter().find(|product| product.id == id)
}

/// Ingredient keywords (diacritics folded) and the spice they point at.
/// First match in table order wins.
const KEYWORDS: &[(&[&str], ProductId)] = &[
    (&["kurczak", "kura", "drob", "indyk"], 16),
    (&["jajka", "jajeczne", "jajo", "omlet"], 166),
    (&["warzywa", "wegetarianskie", "weganskie", "vege", "vegetarian"], 163),
    (&["wloskie", "wlochy", "makaron"], 160),
    (&["pizza"], 154),
    (&["ziemniak", "kartofle", "pyry"], 157),
    (&["frytki", "ziemniaki"], 148),
    (&["arabskie", "bliskowschodnie", "hummus"], 145),
    (&["grill", "barbecue", "bbq"], 127),
    (&["pomidor", "bazylia", "czosnek", "sos"], 124),
    (&["kebab", "turecki", "gyros"], 118),
    (&["owsianka", "platki", "sniadanie", "owsiane"], 115),
];

/// Spice returned when no keyword matches.
pub const FALLBACK_SPICE: ProductId = 16;

/// Pick a spice for a recipe's ingredient list.
///
/// Ingredients are joined, lowercased and folded to ASCII, then checked
/// against [`KEYWORDS`] by substring. No match yields [`FALLBACK_SPICE`].
#[must_use]
pub fn recommend(ingredients: &[String]) -> &'static Product {
    let text = fold(&ingredients.join(" "));
    let id = KEYWORDS
        .iter()
        .find(|(words, _)| words.iter().any(|w| text.contains(w)))
        .map_or(FALLBACK_SPICE, |(_, id)| *id);
    find(id).unwrap_or(&CATALOG[1])
}

fn fold(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| match c {
            'ą' => 'a',
            'ć' => 'c',
            'ę' => 'e',
            'ł' => 'l',
            'ń' => 'n',
            'ó' => 'o',
            'ś' => 's',
            'ź' | 'ż' => 'z',
            other => other,
        })
        .collect()
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
