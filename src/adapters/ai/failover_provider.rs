//! Failover AI Provider - retries a request on a second provider when the
//! primary's transport fails.
//!
//! The usual arrangement is a proxied OpenAI client as primary and the same
//! client without the proxy as fallback, so a dead proxy degrades to a
//! direct call instead of an apology.
//!
//! ```ignore
//! let provider = FailoverAIProvider::new(OpenAIProvider::new(proxied)?)
//!     .with_fallback(OpenAIProvider::new(proxied.without_proxy())?);
//! ```

use async_trait::async_trait;

use crate::ports::{AIError, AIProvider, CompletionRequest, CompletionResponse, ProviderInfo};

/// AI provider wrapper with transport failover.
pub struct FailoverAIProvider<P: AIProvider, F: AIProvider = NoFallback> {
    primary: P,
    fallback: Option<F>,
}

/// Marker type for when no fallback is configured.
pub struct NoFallback;

#[async_trait]
impl AIProvider for NoFallback {
    async fn complete(&self, _: CompletionRequest) -> Result<CompletionResponse, AIError> {
        Err(AIError::unavailable("no fallback provider configured"))
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("none", "none")
    }
}

impl<P: AIProvider> FailoverAIProvider<P, NoFallback> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    pub fn with_fallback<F: AIProvider>(self, fallback: F) -> FailoverAIProvider<P, F> {
        FailoverAIProvider {
            primary: self.primary,
            fallback: Some(fallback),
        }
    }
}

#[async_trait]
impl<P: AIProvider + 'static, F: AIProvider + 'static> AIProvider for FailoverAIProvider<P, F> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, AIError> {
        let err = match self.primary.complete(request.clone()).await {
            Ok(response) => return Ok(response),
            Err(err) => err,
        };

        match self.fallback {
            Some(ref fallback) if err.is_transport() => {
                let primary = self.primary.provider_info();
                let secondary = fallback.provider_info();
                tracing::warn!(
                    error = %err,
                    primary_via_proxy = primary.via_proxy,
                    fallback_via_proxy = secondary.via_proxy,
                    trace_id = %request.metadata.trace_id,
                    "primary model transport failed, using fallback"
                );
                fallback.complete(request).await
            }
            _ => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.primary.provider_info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::{MockAIProvider, MockError};
    use crate::ports::{CompletionPurpose, MessageRole, RequestMetadata};

    fn make_request() -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(None, CompletionPurpose::Reply, "trace-1"))
            .with_message(MessageRole::User, "Hello")
    }

    #[tokio::test]
    async fn primary_success_skips_fallback() {
        let primary = MockAIProvider::new().with_response("Hi there!");
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let fallback_handle = fallback.clone();

        let provider = FailoverAIProvider::new(primary).with_fallback(fallback);
        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Hi there!");
        assert_eq!(fallback_handle.call_count(), 0);
    }

    #[tokio::test]
    async fn network_failure_uses_fallback() {
        let primary = MockAIProvider::new().with_error(MockError::Network {
            message: "proxy refused connection".to_string(),
        });
        let fallback = MockAIProvider::new().with_response("Fallback response");

        let provider = FailoverAIProvider::new(primary).with_fallback(fallback);
        let response = provider.complete(make_request()).await.unwrap();

        assert_eq!(response.content, "Fallback response");
    }

    #[tokio::test]
    async fn timeout_uses_fallback() {
        let primary = MockAIProvider::new().with_error(MockError::Timeout { timeout_secs: 60 });
        let fallback = MockAIProvider::new().with_response("direct");

        let provider = FailoverAIProvider::new(primary).with_fallback(fallback);
        assert_eq!(provider.complete(make_request()).await.unwrap().content, "direct");
    }

    #[tokio::test]
    async fn non_transport_error_does_not_fail_over() {
        let primary = MockAIProvider::new().with_error(MockError::RateLimited {
            retry_after_secs: 30,
        });
        let fallback = MockAIProvider::new().with_response("Fallback response");
        let fallback_handle = fallback.clone();

        let provider = FailoverAIProvider::new(primary).with_fallback(fallback);
        let result = provider.complete(make_request()).await;

        assert!(matches!(result, Err(AIError::RateLimited { .. })));
        assert_eq!(fallback_handle.call_count(), 0);
    }

    #[tokio::test]
    async fn without_fallback_returns_primary_error() {
        let primary = MockAIProvider::new().with_error(MockError::Network {
            message: "down".to_string(),
        });
        let provider = FailoverAIProvider::new(primary);

        assert!(matches!(
            provider.complete(make_request()).await,
            Err(AIError::Network(_))
        ));
    }
}
