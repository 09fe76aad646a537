//! Gemini `generateContent` payloads

use serde::{Deserialize, Serialize};

use super::types::StyleRequest;

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

/// Variant order matters for `#[serde(untagged)]`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

impl GenerateContentRequest {
    /// Image part first, then the framed instruction; asks for an image back
    pub fn for_style(request: &StyleRequest) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineData {
                            mime_type: request.mime_type().as_str().to_string(),
                            data: request.encoded_image().to_string(),
                        },
                    },
                    RequestPart::Text {
                        text: request.instruction(),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE".to_string()],
            },
        }
    }
}

/// Top-level `generateContent` response envelope
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<ResponseContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    fn parts(&self) -> impl Iterator<Item = &ResponsePart> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
    }

    /// First part carrying non-empty inline data
    pub fn first_inline_image(&self) -> Option<&InlineData> {
        self.parts()
            .filter_map(|part| part.inline_data.as_ref())
            .find(|inline| !inline.data.trim().is_empty())
    }

    /// Concatenated text parts, usually a refusal explanation
    pub fn text(&self) -> Option<String> {
        let text: Vec<&str> = self
            .parts()
            .filter_map(|part| part.text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .collect();
        (!text.is_empty()).then(|| text.join(" "))
    }

    pub fn block_reason(&self) -> Option<&str> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::types::{MimeType, SourceImage};
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let image = SourceImage::from_bytes(vec![0xFF, 0xD8, 0xFF], MimeType::Jpeg).unwrap();
        let request = StyleRequest::new(&image, "futuristic sci-fi armor").unwrap();

        let body = serde_json::to_value(GenerateContentRequest::for_style(&request)).unwrap();

        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "/9j/" } },
                        { "text": request.instruction() }
                    ]
                }],
                "generationConfig": { "responseModalities": ["IMAGE"] }
            })
        );
    }

    #[test]
    fn test_parse_image_response() {
        let raw = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here you go" },
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw0KGgo=" } }
                    ]
                },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 1290 }
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();

        let inline = response.first_inline_image().unwrap();
        assert_eq!(inline.mime_type, "image/png");
        assert_eq!(inline.data, "iVBORw0KGgo=");
        assert_eq!(response.text().as_deref(), Some("Here you go"));
        assert_eq!(response.finish_reason(), Some("STOP"));
    }

    #[test]
    fn test_parse_text_only_response() {
        let raw = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "I can't help with that." }] },
                "finishReason": "STOP"
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(response.first_inline_image().is_none());
        assert_eq!(response.text().as_deref(), Some("I can't help with that."));
    }

    #[test]
    fn test_parse_blocked_prompt_response() {
        let raw = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(response.candidates.is_empty());
        assert!(response.first_inline_image().is_none());
        assert_eq!(response.block_reason(), Some("SAFETY"));
        assert_eq!(response.text(), None);
    }

    #[test]
    fn test_image_found_in_later_candidate() {
        let raw = json!({
            "candidates": [
                { "finishReason": "IMAGE_SAFETY" },
                { "content": { "parts": [{ "inlineData": { "mimeType": "image/webp", "data": "UklGRg==" } }] } }
            ]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(response.first_inline_image().unwrap().mime_type, "image/webp");
    }

    #[test]
    fn test_blank_inline_data_is_not_an_image() {
        let raw = json!({
            "candidates": [{
                "content": { "parts": [
                    { "inlineData": { "mimeType": "image/png", "data": "   " } },
                    { "inlineData": { "mimeType": "image/png", "data": "" } }
                ] }
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert!(response.first_inline_image().is_none());
    }
}
