//! Reading model replies: pulling the text block out of an envelope and
//! parsing the JSON document the prompt asked for.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Text of the first `"type": "text"` block in a Messages envelope.
pub fn envelope_text(envelope: &Value) -> Option<&str> {
    envelope
        .get("content")?
        .as_array()?
        .iter()
        .find(|block| block.get("type").and_then(Value::as_str) == Some("text"))?
        .get("text")?
        .as_str()
}

/// Removes markdown code-fence markers (` ```json ` and ` ``` `, each with an
/// optional trailing newline) anywhere in `text`, then trims.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json\n", "")
        .replace("```json", "")
        .replace("```\n", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parses the envelope's text block as `T` after fence stripping.
pub fn parse_envelope_json<T: DeserializeOwned>(envelope: &Value) -> Result<T> {
    let text = envelope_text(envelope)
        .ok_or_else(|| Error::UpstreamFormat("No text block in model response".to_string()))?;
    let cleaned = strip_code_fences(text);

    serde_json::from_str(&cleaned).map_err(|e| {
        tracing::error!("Failed to parse model reply as JSON: {}\nText: {}", e, cleaned);
        if e.is_data() {
            Error::UpstreamFormat(format!("Model reply JSON has an unexpected shape: {}", e))
        } else {
            Error::UpstreamFormat(format!("Model reply is not valid JSON: {}", e))
        }
    })
}

/// Builds a Messages-shaped envelope around a single text block.
pub fn text_envelope(text: String) -> Value {
    serde_json::json!({
        "content": [{ "type": "text", "text": text }]
    })
}
