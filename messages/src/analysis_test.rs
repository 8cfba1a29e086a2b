use super::*;
use serde_json::json;

const PROSE: &str = "Przepis 1: Kurczak po włosku\n\
Składniki:\n\
1. 500 g piersi z kurczaka\n\
2. 2 łyżki oliwy\n\
Przygotowanie:\n\
1. Pokrój kurczaka.\n\
2. Smaż 10 minut.\n\
\n\
Tytuł: Sałatka\n\
Składniki:\n\
- pomidory\n\
Kroki:\n\
- wymieszaj\n";

#[test]
fn lines_split_across_pushes_are_reassembled() {
    let mut decoder = NdjsonDecoder::new();
    assert!(decoder.push(br#"{"analysis":"Wid"#).is_empty());
    let events = decoder.push("z\u{119}\",\"status\":\"partial\"}\n".as_bytes());
    assert_eq!(events, vec![StreamEvent::Partial("Widzę".into())]);
}

#[test]
fn malformed_lines_are_skipped() {
    let mut decoder = NdjsonDecoder::new();
    let events = decoder.push(b"not json\n{\"analysis\":\"a\",\"status\":\"partial\"}\n\n");
    assert_eq!(events, vec![StreamEvent::Partial("a".into())]);
}

#[test]
fn completed_json_analysis_is_structured() {
    let mut decoder = NdjsonDecoder::new();
    let line = json!({"analysis": r#"{"recipes":[{"title":"Jajecznica"}]}"#, "status": "completed"});
    let events = decoder.push(format!("{line}\n").as_bytes());
    assert_eq!(
        events,
        vec![StreamEvent::Completed(Analysis::Structured(json!({"recipes": [{"title": "Jajecznica"}]})))]
    );
    assert!(decoder.is_completed());
    assert_eq!(decoder.finish(), None);
}

#[test]
fn error_chunk_is_surfaced() {
    let mut decoder = NdjsonDecoder::new();
    let events = decoder.push(b"{\"error\":\"model overloaded\"}\n");
    assert_eq!(events, vec![StreamEvent::Failed("model overloaded".into())]);
}

#[test]
fn trailing_line_without_newline_is_terminal() {
    let mut decoder = NdjsonDecoder::new();
    decoder.push(br#"{"analysis":"[1,2]"}"#);
    assert_eq!(decoder.finish(), Some(StreamEvent::Completed(Analysis::Structured(json!([1, 2])))));
}

#[test]
fn last_partial_is_promoted_when_stream_ends_early() {
    let mut decoder = NdjsonDecoder::new();
    decoder.push(b"{\"analysis\":\"Tytu\xc5\x82: Zupa\\nSk\xc5\x82adniki:\\n- marchew\",\"status\":\"partial\"}\n");
    let Some(StreamEvent::Completed(Analysis::Text { recipes })) = decoder.finish() else {
        panic!("expected text completion");
    };
    assert_eq!(recipes[0].title, "Zupa");
    assert_eq!(recipes[0].ingredients, vec!["marchew"]);
}

#[test]
fn empty_stream_finishes_with_nothing() {
    assert_eq!(NdjsonDecoder::new().finish(), None);
}

#[test]
fn prose_yields_titled_recipes_with_sections() {
    let Analysis::Text { recipes } = parse_analysis(PROSE) else {
        panic!("expected text analysis");
    };
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0].title, "Kurczak po włosku");
    assert_eq!(recipes[0].ingredients, vec!["500 g piersi z kurczaka", "2 łyżki oliwy"]);
    assert_eq!(recipes[0].steps, vec!["Pokrój kurczaka.", "Smaż 10 minut."]);
    assert_eq!(recipes[1].title, "Sałatka");
    assert_eq!(recipes[1].steps, vec!["wymieszaj"]);
}

#[test]
fn english_headers_are_recognised() {
    let recipes = extract_recipes("Title: Omelette\nIngredients:\n- eggs\nSteps:\n1. whisk");
    assert_eq!(
        recipes,
        vec![TextRecipe { title: "Omelette".into(), ingredients: vec!["eggs".into()], steps: vec!["whisk".into()] }]
    );
}

#[test]
fn sightings_fall_back_to_single_recipe() {
    let recipes = extract_recipes("Na zdjęciu widzę pomidory, cebulę i bazylię.");
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].title, DEFAULT_RECIPE_TITLE);
    assert_eq!(recipes[0].ingredients, vec!["pomidory", "cebulę i bazylię"]);
}

#[test]
fn recipe_without_ingredients_is_dropped() {
    assert!(extract_recipes("Tytuł: Nic\nKroki:\n- czekaj").is_empty());
}

#[test]
fn parsed_recipes_carry_a_spice_recommendation() {
    let recipes = extract_recipes(PROSE);
    assert_eq!(recipes[0].recommended_spice().name, "Kura Lover");
    assert_eq!(recipes[1].recommended_spice().id, 124);
}
