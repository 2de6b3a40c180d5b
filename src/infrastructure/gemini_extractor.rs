// Gemini vision implementation of the geometry extractor
use crate::application::geometry_extractor::{GeometryExtractor, mock_geometry};
use crate::domain::layout_image::LayoutImage;
use crate::domain::plot::{BoundingBox, PlotGeometry};
use crate::infrastructure::config::GeminiSettings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;

const LAYOUT_PROMPT: &str = "You are an expert real estate layout analyzer.

Task:
Extract all plots from the provided real estate layout image.

Instructions:
1. Identify every plot, lot, or labeled unit.
2. Determine precise bounding boxes.
3. Return normalized coordinates [ymin, xmin, ymax, xmax] (0-1000 scale).
4. Be extremely thorough.
5. Return strictly valid JSON matching the schema.";

#[derive(Debug, Clone)]
pub struct GeminiExtractor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiExtractor {
    pub fn new(api_key: String, settings: &GeminiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client for Gemini")?;

        Ok(Self {
            client,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key,
        })
    }

    fn build_request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint,
            urlencoding::encode(&self.model)
        )
    }

    fn build_request_body(image: &LayoutImage) -> Value {
        json!({
            "contents": [{
                "parts": [
                    { "inlineData": { "mimeType": image.mime_type(), "data": image.base64_payload() } },
                    { "text": LAYOUT_PROMPT }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": {
                    "type": "OBJECT",
                    "properties": {
                        "plots": {
                            "type": "ARRAY",
                            "items": {
                                "type": "OBJECT",
                                "properties": {
                                    "id": {
                                        "type": "STRING",
                                        "description": "The distinct plot number or label visible"
                                    },
                                    "box_2d": {
                                        "type": "ARRAY",
                                        "items": { "type": "NUMBER" },
                                        "description": "ymin, xmin, ymax, xmax (0-1000 scale)"
                                    }
                                },
                                "required": ["id", "box_2d"]
                            }
                        }
                    }
                }
            }
        })
    }

    async fn execute_request(&self, image: &LayoutImage) -> Result<String> {
        let response = self
            .client
            .post(self.build_request_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::build_request_body(image))
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini request failed with status {}: {}", status, body);
        }

        let data = response
            .json::<GenerateContentResponse>()
            .await
            .context("Failed to parse Gemini response")?;

        let text = data
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect::<String>();

        Ok(text)
    }
}

#[async_trait]
impl GeometryExtractor for GeminiExtractor {
    async fn detect(&self, image: &LayoutImage) -> Vec<PlotGeometry> {
        let result = match self.execute_request(image).await {
            Ok(text) => parse_plots(&text),
            Err(e) => Err(e),
        };

        match result {
            Ok(plots) => plots,
            Err(e) => {
                tracing::error!("Gemini analysis failed, using mock plots: {:#}", e);
                mock_geometry()
            }
        }
    }
}

/// Reads `{"plots": [{"id": .., "box_2d": [..]}]}` out of the model's JSON
/// text. Entries without a usable id or a four-number box are skipped.
fn parse_plots(text: &str) -> Result<Vec<PlotGeometry>> {
    let text = if text.trim().is_empty() { "{}" } else { text };
    let parsed: Value = serde_json::from_str(text).context("Gemini returned invalid JSON")?;

    let Some(entries) = parsed.get("plots").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };

    let plots: Vec<PlotGeometry> = entries
        .iter()
        .filter_map(|entry| {
            let id = match entry.get("id")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let coords: Vec<f64> = entry
                .get("box_2d")?
                .as_array()?
                .iter()
                .filter_map(Value::as_f64)
                .collect();
            let bbox: [f64; 4] = coords.try_into().ok()?;
            Some(PlotGeometry::new(id, BoundingBox::from(bbox)))
        })
        .collect();

    if plots.len() < entries.len() {
        tracing::debug!(
            "Dropped {} malformed plot entries from Gemini response",
            entries.len() - plots.len()
        );
    }

    Ok(plots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plots() {
        let text = r#"{"plots": [
            {"id": "101", "box_2d": [10, 20, 110, 220]},
            {"id": 102, "box_2d": [10.5, 220, 110, 420]},
            {"id": "bad", "box_2d": [1, 2, 3]},
            {"box_2d": [1, 2, 3, 4]}
        ]}"#;

        let plots = parse_plots(text).unwrap();
        assert_eq!(plots.len(), 2);
        assert_eq!(plots[0].id, "101");
        assert_eq!(plots[0].bbox, BoundingBox::new(10.0, 20.0, 110.0, 220.0));
        assert_eq!(plots[1].id, "102");
        assert_eq!(plots[1].bbox.ymin, 10.5);
    }

    #[test]
    fn test_parse_plots_without_array() {
        assert!(parse_plots("{}").unwrap().is_empty());
        assert!(parse_plots("").unwrap().is_empty());
        assert!(parse_plots(r#"{"plots": "none"}"#).unwrap().is_empty());
        assert!(parse_plots("not json").is_err());
    }

    #[test]
    fn test_request_shape() {
        let settings = GeminiSettings {
            endpoint: "https://example.test/v1beta/".to_string(),
            ..GeminiSettings::default()
        };
        let extractor = GeminiExtractor::new("key".to_string(), &settings).unwrap();
        assert_eq!(
            extractor.build_request_url(),
            "https://example.test/v1beta/models/gemini-3-flash-preview:generateContent"
        );

        let body = GeminiExtractor::build_request_body(&LayoutImage::new("image/jpeg", vec![1, 2, 3]));
        let inline = &body["contents"][0]["parts"][0]["inlineData"];
        assert_eq!(inline["mimeType"], "image/jpeg");
        assert_eq!(inline["data"], "AQID");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_falls_back_to_mock() {
        let settings = GeminiSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..GeminiSettings::default()
        };
        let extractor = GeminiExtractor::new("key".to_string(), &settings).unwrap();
        let plots = extractor
            .detect(&LayoutImage::new("image/png", vec![0]))
            .await;
        assert_eq!(plots, mock_geometry());
    }
}
