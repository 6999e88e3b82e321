//! JSON parsing helpers for AI backend responses
//!
//! These functions extract JSON from AI model responses, which often include
//! extra text before/after the JSON payload.

use crate::error::{Error, Result};

use super::types::ExtractedReceipt;

/// Parse an extracted receipt from an AI response
pub fn parse_extracted_receipt(response: &str) -> Result<ExtractedReceipt> {
    let json_str = extract_json_object(response)?;
    serde_json::from_str(json_str)
        .map_err(|e| Error::InvalidData(format!("Invalid receipt JSON from AI: {}", e)))
}

/// Find the outermost JSON object in a response
///
/// Models wrap JSON in markdown fences or prose; taking the span between the
/// first `{` and the last `}` strips both.
fn extract_json_object(response: &str) -> Result<&str> {
    let response = response.trim();
    let start = response.find('{');
    let end = response.rfind('}');

    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(&response[s..=e]),
        _ => Err(Error::InvalidData(format!(
            "No JSON found in AI response | Raw: {}",
            if response.len() > 200 {
                format!("{}...", &response[..200])
            } else {
                response.to_string()
            }
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let response = r#"{"vendor_name": "Rewe", "total": 47.89, "line_items": []}"#;
        let receipt = parse_extracted_receipt(response).unwrap();
        assert_eq!(receipt.vendor_name, "Rewe");
        assert_eq!(receipt.total, Some(47.89));
        assert_eq!(receipt.currency, "EUR");
    }

    #[test]
    fn parses_fenced_json_with_prose() {
        let response = "Here is the extraction:\n```json\n{\"vendor_name\": \"Shell\", \"total\": 72.5, \"line_items\": [{\"description\": \"Super E10 45L\", \"total_price\": 72.5}]}\n```\nDone.";
        let receipt = parse_extracted_receipt(response).unwrap();
        assert_eq!(receipt.vendor_name, "Shell");
        assert_eq!(receipt.line_items.len(), 1);
        assert_eq!(receipt.line_items[0].total_price, 72.5);
    }

    #[test]
    fn rejects_response_without_json() {
        assert!(parse_extracted_receipt("I could not read the image").is_err());
    }
}
