//! [`ContentProvider`] backed by the Gemini `generateContent` REST endpoint.
//!
//! Each call sends one prompt with a JSON response schema and decodes the
//! model's JSON text into the matching record.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::Config;
use crate::content::{ContentError, ContentProvider, DetailSheet, Flashcard, QuizQuestion};

const SYSTEM_INSTRUCTION: &str = "You are PharmTechTutor, an expert study assistant for the PTCB \
(Pharmacy Technician Certification Board) exam. Your primary knowledge base is the \"Top 200 \
Drugs\" list commonly used for PTCB preparation. Ensure all drug information, indications, and \
classes are medically accurate and adhere to standard pharmacy technician educational materials. \
Do NOT provide medical advice or specific dosing instructions for patients. Focus on exam \
preparation facts.";

/// Upper bound on how much of an error body is kept for display.
const MAX_ERROR_BODY: usize = 300;

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    flashcard_temperature: f32,
    quiz_temperature: f32,
}

impl GeminiProvider {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.resolved_api_key(),
            base_url: config.api_base_url.clone(),
            model: config.model.clone(),
            flashcard_temperature: config.flashcard_temperature,
            quiz_temperature: config.quiz_temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
        temperature: Option<f32>,
    ) -> Result<T, ContentError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(ContentError::MissingApiKey);
        };

        tracing::debug!(model = %self.model, prompt, "generateContent");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&request_body(prompt, schema, temperature))
            .send()
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let reply: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ContentError::Malformed(e.to_string()))?;
        decode_reply(reply)
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    async fn flashcard(&self, identifier: &str) -> Result<Flashcard, ContentError> {
        let prompt = format!(
            "Generate a flashcard for the drug \"{identifier}\" from the Top 200 PTCB drug list. \
             Randomly select whether to show the Brand or Generic name as the term."
        );
        self.generate(&prompt, flashcard_schema(), Some(self.flashcard_temperature))
            .await
    }

    async fn quiz_question(&self, identifier: &str) -> Result<QuizQuestion, ContentError> {
        let prompt = format!(
            "Generate a multiple-choice question suitable for the PTCB exam about the drug \
             \"{identifier}\". The question can be about Brand/Generic matching, Drug Class, \
             or Indication."
        );
        let question: QuizQuestion = self
            .generate(&prompt, quiz_schema(), Some(self.quiz_temperature))
            .await?;
        question.validate()
    }

    async fn detail_sheet(&self, query: &str) -> Result<DetailSheet, ContentError> {
        let prompt = format!(
            "Provide study details for the drug matching the search term: \"{query}\". \
             If the term is misspelled, infer the closest Top 200 drug."
        );
        self.generate(&prompt, detail_schema(), None).await
    }
}

fn request_body(prompt: &str, schema: Value, temperature: Option<f32>) -> Value {
    let mut generation_config = json!({
        "responseMimeType": "application/json",
        "responseSchema": schema,
    });
    if let Some(temperature) = temperature {
        generation_config["temperature"] = json!(temperature);
    }
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": generation_config,
    })
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.trim().is_empty() { None } else { Some(text) }
    }
}

fn decode_reply<T: DeserializeOwned>(reply: GenerateResponse) -> Result<T, ContentError> {
    let text = reply.text().ok_or(ContentError::EmptyResponse)?;
    serde_json::from_str(&text).map_err(|e| ContentError::Malformed(e.to_string()))
}

fn flashcard_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "term": { "type": "STRING", "description": "The name presented to the student (either Brand or Generic)" },
            "type": { "type": "STRING", "enum": ["Brand", "Generic"], "description": "Whether the term is Brand or Generic" },
            "answer": { "type": "STRING", "description": "The corresponding pair (if term is Brand, this is Generic, and vice versa)" },
            "drugClass": { "type": "STRING", "description": "The pharmacological or therapeutic class" },
            "indication": { "type": "STRING", "description": "The primary FDA-approved indication" },
            "genericName": { "type": "STRING", "description": "The generic name of the drug" },
        },
        "required": ["term", "type", "answer", "drugClass", "indication", "genericName"],
    })
}

fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "question": { "type": "STRING", "description": "The multiple choice question text" },
            "options": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "An array of 4 possible answers" },
            "correctAnswer": { "type": "STRING", "description": "The correct answer string, must match one of the options exactly" },
            "explanation": { "type": "STRING", "description": "A brief explanation of why the answer is correct" },
            "subjectDrug": { "type": "STRING", "description": "The drug the question is about" },
        },
        "required": ["question", "options", "correctAnswer", "explanation", "subjectDrug"],
    })
}

fn detail_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "brandName": { "type": "STRING" },
            "genericName": { "type": "STRING" },
            "drugClass": { "type": "STRING" },
            "indication": { "type": "STRING" },
            "sideEffects": { "type": "ARRAY", "items": { "type": "STRING" }, "description": "List of 3-5 common side effects" },
            "schedule": { "type": "STRING", "description": "DEA Schedule (e.g., 'Schedule II', 'Legend/Rx Only', 'OTC')" },
        },
        "required": ["brandName", "genericName", "drugClass", "indication", "sideEffects", "schedule"],
    })
}
