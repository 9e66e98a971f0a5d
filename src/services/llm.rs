//! Generation client: one chat-completion call in JSON mode.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::{Error, Result};
use crate::models::BlogPost;

const SYSTEM_PROMPT: &str = r#"You are an AI transformation agent tasked with converting book texts about knowledge into a polished, engaging, and readable blog post. Your responsibilities include: - **Paraphrasing**: Transform the original caption text into fresh, original content while preserving the key information and insights. - **Structure**: Organize the content into a well-defined structure featuring a captivating introduction, clearly delineated subheadings in the body, and a strong conclusion. - **Engagement**: Ensure the blog post is outstanding by using a professional yet conversational tone, creating smooth transitions, and emphasizing clarity and readability. - **Retention of Key Elements**: Maintain all essential elements and core ideas from the original text, while enhancing the narrative to captivate the reader. - **Adaptation**: Simplify technical details if necessary, ensuring that the transformed content is accessible to a broad audience without losing depth or accuracy. - **Quality**: Aim for a high-quality article that is both informative and engaging, ready for publication. Follow these guidelines to generate a comprehensive, coherent, and outstanding blog post from the provided book text. Your final output should be **only** the paraphrased text, styled in Markdown format, and in english language.

please return the user response in json format example: {"title": "How to be healthy", "content": "to be healthy you can try do some upper exercises"}"#;

const DEFAULT_API_URL: &str = "https://api.deepseek.com/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-chat";

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

pub struct GenerationClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GenerationClient {
    /// Build a client against an explicit endpoint.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Build a client from the environment. `DEEPSEEK_API_KEY` is required;
    /// `DEEPSEEK_API_URL` and `DEEPSEEK_MODEL` override the defaults.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("DEEPSEEK_API_KEY")
            .map_err(|_| Error::Generation("DEEPSEEK_API_KEY is not set".to_string()))?;
        let api_url =
            std::env::var("DEEPSEEK_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("DEEPSEEK_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Ok(Self::new(api_url, api_key, model))
    }

    /// Send the chapter text and parse the structured `{title, content}` reply.
    pub async fn generate(&self, text: &str) -> Result<BlogPost> {
        info!("requesting blog post from {}", self.model);
        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&json!({
                "model": self.model,
                "messages": [
                    {"role": "system", "content": SYSTEM_PROMPT},
                    {"role": "user", "content": text},
                ],
                "response_format": {"type": "json_object"},
            }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Generation(e.to_string()))?;

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(format!("malformed completion response: {e}")))?;
        let content = reply
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| Error::Generation("completion contained no choices".to_string()))?;
        parse_reply(content)
    }
}

/// Deserialize the model's JSON reply, tolerating a Markdown code fence
/// around it.
fn parse_reply(content: &str) -> Result<BlogPost> {
    let body = strip_code_fence(content);
    serde_json::from_str(body)
        .map_err(|e| Error::Generation(format!("reply is not {{title, content}} JSON: {e}")))
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json_reply() {
        let post = parse_reply(r#"{"title": "How to be healthy", "content": "try exercise"}"#)
            .unwrap();
        assert_eq!(post.title, "How to be healthy");
        assert_eq!(post.content, "try exercise");
    }

    #[test]
    fn parses_fenced_json_reply() {
        let fenced = "```json\n{\"title\": \"T\", \"content\": \"C\"}\n```";
        let post = parse_reply(fenced).unwrap();
        assert_eq!(post.title, "T");
        assert_eq!(post.content, "C");
    }

    #[test]
    fn malformed_reply_is_a_generation_error() {
        let err = parse_reply("here is your blog post!").unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
