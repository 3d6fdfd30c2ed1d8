//! Image description using a vision-capable chat model via async-openai.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestSystemMessageContent,
        ChatCompletionRequestUserMessage, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequest, ImageDetail,
        ImageUrl,
    },
    Client,
};
use docsift_core::{DocError, DocResult, VisionConfig};
use secrecy::ExposeSecret;
use tracing::debug;

const PROVIDER: &str = "vision";

/// Describes images with a vision language model.
pub struct VisionDescriber {
    client: Client<OpenAIConfig>,
    config: VisionConfig,
}

impl VisionDescriber {
    /// Create a describer; fails when no API key is configured.
    pub fn new(config: VisionConfig) -> DocResult<Self> {
        let api_key = config.api_key.as_ref().ok_or_else(|| {
            DocError::Configuration(
                "Vision API key not found. Set OPENAI_API_KEY or provide vision.api_key in config."
                    .to_string(),
            )
        })?;

        let mut openai = OpenAIConfig::new().with_api_key(api_key.expose_secret());
        if let Some(base_url) = &config.base_url {
            openai = openai.with_api_base(base_url);
        }

        Ok(Self::with_client(Client::with_config(openai), config))
    }

    /// Create a describer with a preconfigured OpenAI client.
    pub fn with_client(client: Client<OpenAIConfig>, config: VisionConfig) -> Self {
        Self { client, config }
    }

    fn build_request(&self, image_url: &str) -> CreateChatCompletionRequest {
        let system = ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
            content: ChatCompletionRequestSystemMessageContent::Text(
                self.config.system_prompt.clone(),
            ),
            name: None,
        });

        let image_part = ChatCompletionRequestMessageContentPartImage {
            image_url: ImageUrl {
                url: image_url.to_string(),
                detail: Some(ImageDetail::Auto),
            },
        };

        let user = ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
            content: ChatCompletionRequestUserMessageContent::Array(vec![
                ChatCompletionRequestUserMessageContentPart::Text(
                    self.config.user_prompt.clone().into(),
                ),
                ChatCompletionRequestUserMessageContentPart::ImageUrl(image_part),
            ]),
            name: None,
        });

        CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![system, user],
            max_completion_tokens: Some(self.config.max_tokens),
            ..Default::default()
        }
    }

    /// Describe the image at `image_url`.
    pub async fn describe(&self, image_url: &str) -> DocResult<String> {
        debug!(model = %self.config.model, image_url, "Requesting image description");

        let response = self
            .client
            .chat()
            .create(self.build_request(image_url))
            .await
            .map_err(|e| DocError::remote(PROVIDER, format!("OpenAI API error: {}", e)))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| DocError::remote(PROVIDER, "Empty response from vision API"))
    }
}
