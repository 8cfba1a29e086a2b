//! Decoder for the recipe-analysis NDJSON stream.
//!
//! The analysis service streams one JSON object per line:
//! `{ "analysis": "...", "status": "partial" | "completed", "error": "..." }`.
//! Chunks may be split across reads at any byte, so the decoder buffers
//! until a newline. Malformed lines are logged and skipped; they never end
//! the stream.
//!
//! The terminal analysis is parsed as JSON first. When it is prose, a
//! line-oriented heuristic pulls out titled recipes with ingredient and
//! step sections (Polish and English headers).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::catalog::{self, Product};

pub const DEFAULT_RECIPE_TITLE: &str = "Przepis";

const INGREDIENT_HEADERS: [&str; 2] = ["składniki:", "ingredients:"];
const STEP_HEADERS: [&str; 4] = ["przygotowanie:", "kroki:", "sposób wykonania:", "steps:"];
const TITLE_PREFIXES: [&str; 2] = ["tytuł:", "title:"];
const RECIPE_PREFIX: &str = "przepis";
const SIGHTING_MARKERS: [&str; 3] = ["widzę", "na zdjęciu", "składniki:"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Partial,
    Completed,
}

/// One NDJSON line from the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisChunk {
    #[serde(default)]
    pub analysis: Option<String>,
    #[serde(default)]
    pub status: Option<ChunkStatus>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TextRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
}

impl TextRecipe {
    /// Catalog spice that goes with this recipe's ingredients.
    #[must_use]
    pub fn recommended_spice(&self) -> &'static Product {
        catalog::recommend(&self.ingredients)
    }
}

/// A parsed terminal analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Analysis {
    Structured(Value),
    Text { recipes: Vec<TextRecipe> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Running analysis text; more is coming.
    Partial(String),
    Completed(Analysis),
    /// The service reported an error for this stream.
    Failed(String),
}

// =============================================================================
// DECODER
// =============================================================================

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
    latest: Option<String>,
    completed: bool,
}

impl NdjsonDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes. Returns events for every complete line.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if let Some(event) = self.line(&String::from_utf8_lossy(&line)) {
                events.push(event);
            }
        }
        events
    }

    /// End of stream. A trailing unterminated line is treated as terminal;
    /// without any `completed` chunk the last partial analysis is promoted.
    pub fn finish(mut self) -> Option<StreamEvent> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&rest);
        if !self.completed && !rest.trim().is_empty() {
            match parse_chunk(&rest) {
                Some(AnalysisChunk { error: Some(error), .. }) => return Some(StreamEvent::Failed(error)),
                Some(AnalysisChunk { analysis: Some(analysis), .. }) => {
                    self.completed = true;
                    return Some(StreamEvent::Completed(parse_analysis(&analysis)));
                }
                _ => {}
            }
        }
        if self.completed {
            return None;
        }
        let latest = self.latest?;
        debug!("analysis: stream ended without completed marker");
        Some(StreamEvent::Completed(parse_analysis(&latest)))
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    fn line(&mut self, line: &str) -> Option<StreamEvent> {
        if line.trim().is_empty() {
            return None;
        }
        let chunk = parse_chunk(line)?;
        if let Some(error) = chunk.error {
            return Some(StreamEvent::Failed(error));
        }
        let analysis = chunk.analysis?;
        if chunk.status == Some(ChunkStatus::Completed) {
            self.completed = true;
            self.latest = None;
            return Some(StreamEvent::Completed(parse_analysis(&analysis)));
        }
        self.latest = Some(analysis.clone());
        Some(StreamEvent::Partial(analysis))
    }
}

fn parse_chunk(line: &str) -> Option<AnalysisChunk> {
    match serde_json::from_str(line.trim()) {
        Ok(chunk) => Some(chunk),
        Err(e) => {
            warn!(error = %e, "analysis: skipping malformed line");
            None
        }
    }
}

// =============================================================================
// TERMINAL PARSE
// =============================================================================

/// Parse a terminal analysis: JSON object/array first, prose second.
#[must_use]
pub fn parse_analysis(text: &str) -> Analysis {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Analysis::Structured(value),
        _ => Analysis::Text { recipes: extract_recipes(text) },
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Ingredients,
    Steps,
}

/// Heuristic recipe extraction from free text. Recipes without
/// ingredients are dropped; if none survive, a single recipe is built from
/// sentences that describe what is visible in the photo.
#[must_use]
pub fn extract_recipes(text: &str) -> Vec<TextRecipe> {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
    let mut recipes = Vec::new();
    let mut current = TextRecipe { title: DEFAULT_RECIPE_TITLE.to_owned(), ..TextRecipe::default() };
    let mut section = Section::None;

    for (index, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if INGREDIENT_HEADERS.iter().any(|h| lower.starts_with(h)) {
            section = Section::Ingredients;
        } else if STEP_HEADERS.iter().any(|h| lower.starts_with(h)) {
            section = Section::Steps;
        } else if let Some(title) = recipe_title(line, index == 0) {
            if !current.ingredients.is_empty() {
                recipes.push(std::mem::take(&mut current));
            }
            current = TextRecipe { title, ..TextRecipe::default() };
            section = Section::None;
        } else {
            let item = line.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.' || c == '-').trim();
            match section {
                Section::Ingredients if !item.is_empty() => current.ingredients.push(item.to_owned()),
                Section::Steps if !item.is_empty() => current.steps.push(item.to_owned()),
                _ => {}
            }
        }
    }
    if !current.ingredients.is_empty() {
        recipes.push(current);
    }

    if recipes.is_empty() {
        let ingredients = sighted_ingredients(&lines);
        if !ingredients.is_empty() {
            recipes.push(TextRecipe { title: DEFAULT_RECIPE_TITLE.to_owned(), ingredients, steps: Vec::new() });
        }
    }
    recipes
}

/// Title of a line that opens a new recipe, if it does.
fn recipe_title(line: &str, first: bool) -> Option<String> {
    for prefix in TITLE_PREFIXES {
        if let Some(rest) = strip_prefix_ci(line, prefix) {
            return Some(rest.trim().to_owned());
        }
    }
    if let Some(rest) = strip_prefix_ci(line, RECIPE_PREFIX) {
        let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c.is_whitespace());
        let title = rest.strip_prefix(':').unwrap_or(rest).trim();
        return Some(if title.is_empty() { DEFAULT_RECIPE_TITLE.to_owned() } else { title.to_owned() });
    }
    first.then(|| line.to_owned())
}

fn sighted_ingredients(lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|line| {
            let lower = line.to_lowercase();
            SIGHTING_MARKERS.iter().find_map(|marker| {
                let at = lower.find(marker)?;
                // Lowercasing can shift byte offsets; only trust ASCII-stable prefixes.
                line.get(at + marker.len()..).filter(|_| lower.len() == line.len())
            })
        })
        .flat_map(|rest| rest.split([',', '.']))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Case-insensitive `strip_prefix`.
fn strip_prefix_ci<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = line.chars();
    for expected in prefix.chars() {
        let actual = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    Some(chars.as_str())
}

#[cfg(test)]
#[path = "analysis_test.rs"]
mod tests;
