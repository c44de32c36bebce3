//! crates/gakbbul_core/src/description.rs
//!
//! Wraps the `DescriptionGenerationService` port so callers never see an error:
//! a failed generation turns into an explicit fallback outcome.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::ports::{DescriptionGenerationService, PortError, PortResult};

/// Shown in the description field when generation fails.
pub const FALLBACK_DESCRIPTION: &str = "설명을 생성하는 중 오류가 발생했습니다. 직접 입력해주세요.";

/// Builds the fixed prompt sent to the text-generation backend.
///
/// Asks for a Korean description of at most two sentences, without emoji,
/// in a concise and professional tone.
pub fn build_description_prompt(title: &str, url: &str) -> String {
    format!(
        "웹사이트 정보:\n\
         URL: {url}\n\
         제목: {title}\n\
         \n\
         요청사항:\n\
         이 웹사이트에 대한 짧고 매력적이며 전문적인 설명을 한국어로 작성해주세요.\n\
         제약사항:\n\
         1. 최대 2문장으로 작성할 것.\n\
         2. 이모지는 사용하지 말 것.\n\
         3. 명확하고 간결하게 작성할 것."
    )
}

/// Result of a description request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionOutcome {
    Generated(String),
    /// The backend failed; carries [`FALLBACK_DESCRIPTION`].
    Fallback(String),
}

impl DescriptionOutcome {
    pub fn text(&self) -> &str {
        match self {
            DescriptionOutcome::Generated(text) | DescriptionOutcome::Fallback(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            DescriptionOutcome::Generated(text) | DescriptionOutcome::Fallback(text) => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DescriptionOutcome::Fallback(_))
    }
}

/// The description client used by the admin panel.
#[derive(Clone)]
pub struct DescriptionGenerator {
    service: Arc<dyn DescriptionGenerationService>,
}

impl DescriptionGenerator {
    pub fn new(service: Arc<dyn DescriptionGenerationService>) -> Self {
        Self { service }
    }

    /// Generates a description, absorbing any backend failure into a fallback.
    pub async fn generate(&self, title: &str, url: &str) -> DescriptionOutcome {
        match self.service.generate_description(title, url).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    error!("Description backend returned an empty text for {}", url);
                    DescriptionOutcome::Fallback(FALLBACK_DESCRIPTION.to_string())
                } else {
                    info!("Generated description for {}", url);
                    DescriptionOutcome::Generated(text.to_string())
                }
            }
            Err(e) => {
                error!("Description generation failed for {}: {:?}", url, e);
                DescriptionOutcome::Fallback(FALLBACK_DESCRIPTION.to_string())
            }
        }
    }
}

/// Stands in for the backend when no API key is configured.
pub struct DisabledDescriptionService;

#[async_trait]
impl DescriptionGenerationService for DisabledDescriptionService {
    async fn generate_description(&self, _title: &str, _url: &str) -> PortResult<String> {
        Err(PortError::Unexpected(
            "description generation is not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedService(PortResult<&'static str>);

    #[async_trait]
    impl DescriptionGenerationService for FixedService {
        async fn generate_description(&self, _title: &str, _url: &str) -> PortResult<String> {
            match &self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(_) => Err(PortError::Unexpected("backend down".to_string())),
            }
        }
    }

    #[tokio::test]
    async fn backend_failure_yields_fixed_fallback() {
        let generator = DescriptionGenerator::new(Arc::new(FixedService(Err(
            PortError::Unexpected(String::new()),
        ))));
        let outcome = generator.generate("Example", "example.com").await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.text(), FALLBACK_DESCRIPTION);
    }

    #[tokio::test]
    async fn generated_text_is_trimmed() {
        let generator =
            DescriptionGenerator::new(Arc::new(FixedService(Ok("  예시 사이트입니다.\n"))));
        let outcome = generator.generate("Example", "example.com").await;
        assert_eq!(outcome, DescriptionOutcome::Generated("예시 사이트입니다.".to_string()));
    }

    #[tokio::test]
    async fn blank_completion_counts_as_failure() {
        let generator = DescriptionGenerator::new(Arc::new(FixedService(Ok("   "))));
        assert!(generator.generate("Example", "example.com").await.is_fallback());
    }

    #[tokio::test]
    async fn disabled_service_always_falls_back() {
        let generator = DescriptionGenerator::new(Arc::new(DisabledDescriptionService));
        let outcome = generator.generate("Example", "example.com").await;
        assert_eq!(outcome.into_text(), FALLBACK_DESCRIPTION);
    }

    #[test]
    fn prompt_embeds_title_and_url() {
        let prompt = build_description_prompt("Example", "example.com");
        assert!(prompt.contains("URL: example.com"));
        assert!(prompt.contains("제목: Example"));
        assert!(prompt.contains("최대 2문장"));
    }
}
