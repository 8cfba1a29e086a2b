use super::*;

#[test]
fn ids_are_unique() {
    let mut ids: Vec<_> = catalog().iter().map(|p| p.id).collect();
    let total = ids.len();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), total);
}

#[test]
fn find_returns_product_with_add_url() {
    let kura = find(16).unwrap();
    assert_eq!(kura.name, "Kura Lover");
    assert_eq!(kura.price, "9.90 zł");
    assert_eq!(kura.add_to_cart_url, "/?add-to-cart=16");
    assert!(find(1).is_none());
}

#[test]
fn gift_card_leads_the_catalog() {
    assert_eq!(catalog()[0].id, 7313);
    assert_eq!(catalog().len(), 16);
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn recommend_matches_keywords_across_ingredients() {
    assert_eq!(recommend(&words(&["200g makaronu", "oliwa"])).id, 160);
    assert_eq!(recommend(&words(&["2 JAJKA", "szczypiorek"])).id, 166);
    assert_eq!(recommend(&words(&["ciecierzyca", "tahini", "hummus"])).id, 145);
}

#[test]
fn recommend_folds_polish_diacritics() {
    assert_eq!(recommend(&words(&["pierś z drobiu"])).id, 16);
    assert_eq!(recommend(&words(&["płatki owsiane", "mleko"])).id, 115);
}

#[test]
fn earlier_keyword_rows_win() {
    // "kurczak" and "czosnek" both match; chicken sits higher in the table.
    assert_eq!(recommend(&words(&["czosnek", "udka z kurczaka"])).id, 16);
    // "ziemniaki" contains "ziemniak", so the potato spice shadows fries.
    assert_eq!(recommend(&words(&["ziemniaki"])).id, 157);
}

#[test]
fn unmatched_ingredients_fall_back() {
    assert_eq!(recommend(&words(&["ryż", "mleko kokosowe"])).id, FALLBACK_SPICE);
    assert_eq!(recommend(&[]).id, FALLBACK_SPICE);
}
