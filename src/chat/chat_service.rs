use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

const SYSTEM_PROMPT: &str = "You are Khet AI, an expert agricultural assistant for Indian farmers. \
Provide practical, actionable advice about farming, crops, soil management, pest control, \
weather considerations, and government schemes. Keep responses concise but informative. \
Focus on sustainable farming practices suitable for Indian agricultural conditions.";

const HINDI_INSTRUCTION: &str = " Respond in Hindi (हिंदी).";

const FALLBACK_EN: &str = "I'm experiencing technical difficulties. Please try asking your \
question again, or consult with local agricultural experts for immediate assistance.";

const FALLBACK_HI: &str = "मुझे तकनीकी समस्या हो रही है। कृपया अपना प्रश्न फिर से पूछें, या तत्काल सहायता के लिए स्थानीय कृषि विशेषज्ञों से सलाह लें।";

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat service returned no text")]
    EmptyResponse,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Full prompt sent upstream: fixed agricultural system prompt, Hindi
/// instruction when requested, then the farmer's question.
pub fn build_prompt(message: &str, language: &str) -> String {
    let mut prompt = String::from(SYSTEM_PROMPT);
    if language == "hi" {
        prompt.push_str(HINDI_INSTRUCTION);
    }
    prompt.push_str("\n\nFarmer's question: ");
    prompt.push_str(message);
    prompt
}

pub fn fallback_response(language: &str) -> &'static str {
    if language == "hi" { FALLBACK_HI } else { FALLBACK_EN }
}

/// Seam between the chat handler and the generative backend, so the
/// handler's fallback branch can be driven by failing generators in tests.
#[async_trait]
pub trait ChatGenerator: Send + Sync {
    async fn generate(&self, message: &str, language: &str) -> Result<String, ChatError>;
}

#[derive(Clone)]
pub struct ChatService {
    http_client: HttpClient,
    api_key: String,
}

impl ChatService {
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatGenerator for ChatService {
    async fn generate(&self, message: &str, language: &str) -> Result<String, ChatError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(message, language),
                }],
            }],
        };

        let response = self
            .http_client
            .post(GEMINI_URL)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let payload: GenerateResponse = response.json().await?;
        let text: String = payload
            .candidates
            .into_iter()
            .next()
            .map(|candidate| {
                candidate
                    .content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(text)
    }
}
