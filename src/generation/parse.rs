//! Response validation: model JSON text into typed game items.

use crate::types::{GameContent, GameItem, GameType};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Deserialize)]
struct RawLesson {
    items: Vec<RawLessonItem>,
}

#[derive(Deserialize)]
struct RawLessonItem {
    #[serde(rename = "type")]
    game_type: String,
    #[serde(flatten)]
    payloads: Map<String, Value>,
}

/// Parse a model response into game items with fresh ids.
///
/// Fails on malformed JSON, a missing `items` array, an unknown `type` tag,
/// or an item whose payload for its tag is absent or has the wrong shape.
/// Option counts and answer indexes are not checked here.
pub fn parse_lesson_items(text: &str) -> Result<Vec<GameItem>, String> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err("empty response text".to_string());
    }

    let lesson: RawLesson =
        serde_json::from_str(body).map_err(|e| format!("invalid lesson JSON: {}", e))?;

    lesson
        .items
        .into_iter()
        .enumerate()
        .map(|(index, mut raw)| -> Result<GameItem, String> {
            let game_type = GameType::from_tag(&raw.game_type)
                .ok_or_else(|| format!("item {}: unknown type '{}'", index, raw.game_type))?;
            let payload = raw
                .payloads
                .remove(game_type.payload_key())
                .filter(|v| !v.is_null())
                .ok_or_else(|| {
                    format!(
                        "item {}: missing '{}' payload",
                        index,
                        game_type.payload_key()
                    )
                })?;
            let content = GameContent::from_value(game_type, payload)
                .map_err(|e| format!("item {}: invalid {} payload: {}", index, game_type, e))?;
            Ok(GameItem::new(content))
        })
        .collect()
}

/// Drop a surrounding Markdown code fence some models add despite the MIME type.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
