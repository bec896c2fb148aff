//! Stanford CoreNLP server annotator.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tracing::instrument;

use eiscore_core::error::AnnotationError;
use eiscore_core::model::TaggedSentence;
use eiscore_core::traits::Annotator;

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Pipeline requested from the server on every call.
pub const PROPERTIES: &str =
    r#"{"annotators":"tokenize,ssplit,pos,lemma","outputFormat":"json"}"#;

/// Annotates text with a running CoreNLP server.
pub struct CoreNlpAnnotator {
    endpoint: Url,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl CoreNlpAnnotator {
    pub fn new(base_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };
        let root = format!("{}/", base.trim_end_matches('/'));
        let endpoint = Url::parse_with_params(&root, &[("properties", PROPERTIES)])
            .with_context(|| format!("invalid CoreNLP base URL: {base}"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            endpoint,
            timeout_secs,
            client,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn map_send_error(&self, e: reqwest::Error) -> AnnotationError {
        if e.is_timeout() {
            AnnotationError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            AnnotationError::Unavailable(format!(
                "CoreNLP not reachable at {}. Is the server running?",
                self.endpoint.origin().ascii_serialization()
            ))
        } else {
            AnnotationError::Unavailable(e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct CoreNlpDocument {
    #[serde(default)]
    sentences: Vec<CoreNlpSentence>,
}

#[derive(Deserialize)]
struct CoreNlpSentence {
    #[serde(default)]
    tokens: Vec<CoreNlpToken>,
}

#[derive(Deserialize)]
struct CoreNlpToken {
    word: String,
    #[serde(default)]
    lemma: Option<String>,
    #[serde(default)]
    pos: Option<String>,
}

/// Flatten the tokens of every sentence, in order.
fn to_tagged_sentence(document: CoreNlpDocument) -> Result<TaggedSentence, AnnotationError> {
    let tokens: Vec<CoreNlpToken> = document
        .sentences
        .into_iter()
        .flat_map(|s| s.tokens)
        .collect();

    let mut surfaces = Vec::with_capacity(tokens.len());
    let mut lemmas = Vec::with_capacity(tokens.len());
    let mut tags = Vec::with_capacity(tokens.len());
    for token in tokens {
        surfaces.push(token.word);
        lemmas.extend(token.lemma);
        tags.extend(token.pos);
    }

    TaggedSentence::from_parts(surfaces, lemmas, tags)
}

#[async_trait]
impl Annotator for CoreNlpAnnotator {
    fn name(&self) -> &str {
        "corenlp"
    }

    #[instrument(skip(self, text), fields(chars = text.len()))]
    async fn annotate(&self, text: &str) -> Result<TaggedSentence, AnnotationError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .body(text.to_string())
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnotationError::Service {
                status,
                message: body,
            });
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let document: CoreNlpDocument = serde_json::from_str(&body).map_err(|e| {
            AnnotationError::MalformedResponse(format!("failed to parse response: {e}"))
        })?;

        to_tagged_sentence(document)
    }
}
