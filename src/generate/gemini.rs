//! Gemini REST client: text prompts via `generateContent` with a JSON
//! response contract, images via the Imagen `predict` endpoint.

use super::{build_brief, build_refine_brief, GenerateError, ImageBatch, LogoGenerator};
use crate::model::{now_utc_rfc3339, GeneratedLogo, LogoId, LogoPrompt};
use serde::Deserialize;
use serde_json::json;

const SYSTEM_INSTRUCTION: &str = "You are a world-class logo designer with over 20 years of \
    experience specializing in brand identity. Your task is to generate professional, creative, \
    and highly specific image generation prompts for logos based on client requirements. \
    Respond only with the requested JSON.";

const REFINE_INSTRUCTION: &str = "You are a world-class logo designer with over 20 years of \
    experience specializing in brand identity. Your task is to refine an existing logo prompt \
    based on user feedback. Respond only with the requested JSON for a single prompt.";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub user_agent: String,
}

pub struct GeminiClient {
    cfg: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build the client. A missing credential is fatal here; there is no
    /// recovery path once the app is running.
    pub fn new(cfg: GeminiConfig) -> Result<Self, GenerateError> {
        if cfg.api_key.trim().is_empty() {
            return Err(GenerateError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .build()?;
        Ok(Self { cfg, http })
    }

    async fn generate_content(
        &self,
        system_instruction: &str,
        brief: &str,
        response_schema: serde_json::Value,
    ) -> Result<String, GenerateError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.text_model
        );
        let body = json!({
            "systemInstruction": { "parts": [ { "text": system_instruction } ] },
            "contents": [ { "parts": [ { "text": brief } ] } ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": response_schema,
            },
        });

        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let parsed: GenerateContentResponse = resp.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| GenerateError::MalformedResponse("no candidate text".into()))?;
        Ok(text.trim().to_string())
    }

    async fn generate_one_image(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{}/v1beta/models/{}:predict",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.image_model
        );
        let body = json!({
            "instances": [ { "prompt": prompt } ],
            "parameters": {
                "sampleCount": 1,
                "aspectRatio": "1:1",
                "outputMimeType": "image/png",
            },
        });

        let resp = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let parsed: PredictResponse = resp.json().await?;
        let image = parsed
            .predictions
            .into_iter()
            .next()
            .ok_or(GenerateError::NoImage)?;
        Ok(format!("data:image/png;base64,{}", image.bytes_base64_encoded))
    }
}

impl LogoGenerator for GeminiClient {
    async fn generate_prompts(&self, answers: &[String]) -> Result<Vec<LogoPrompt>, GenerateError> {
        let schema = json!({
            "type": "ARRAY",
            "items": prompt_object_schema(),
        });
        let text = self
            .generate_content(SYSTEM_INSTRUCTION, &build_brief(answers), schema)
            .await?;
        serde_json::from_str(&text)
            .map_err(|e| GenerateError::MalformedResponse(format!("prompt array: {e}")))
    }

    async fn generate_images(&self, prompts: &[LogoPrompt]) -> ImageBatch {
        let mut batch = ImageBatch::default();
        // One prompt at a time: sequential on purpose, so each failure is
        // attributable and the service sees no request bursts.
        for p in prompts {
            match self.generate_one_image(&p.prompt).await {
                Ok(image_data) => batch.logos.push(GeneratedLogo {
                    id: LogoId::generate(),
                    prompt: p.prompt.clone(),
                    style: p.style.clone(),
                    image_data,
                    created_utc: now_utc_rfc3339(),
                }),
                Err(e) => {
                    batch.failed += 1;
                    batch.last_error = Some(e);
                }
            }
        }
        batch
    }

    async fn refine_prompt(
        &self,
        original: &str,
        feedback: &str,
    ) -> Result<LogoPrompt, GenerateError> {
        let text = self
            .generate_content(
                REFINE_INSTRUCTION,
                &build_refine_brief(original, feedback),
                prompt_object_schema(),
            )
            .await?;
        serde_json::from_str(&text)
            .map_err(|e| GenerateError::MalformedResponse(format!("refined prompt: {e}")))
    }
}

fn prompt_object_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "prompt": {
                "type": "STRING",
                "description": "A detailed, specific prompt for an AI image generator to \
                    create a logo. Include details on style, color, and subject matter.",
            },
            "style": {
                "type": "STRING",
                "description": "The primary design style of the logo concept \
                    (e.g., Minimalist, Modern, Abstract, Classic).",
            },
        },
        "required": ["prompt", "style"],
    })
}

/// Map non-2xx responses to `GenerateError::Api`, extracting the service's
/// error message when the body carries one.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, GenerateError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    Err(GenerateError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}
