use async_trait::async_trait;

use crate::domain::errors::ExpansionError;

/// Capability to obtain generated text for an instruction
///
/// Implementations perform exactly one exchange per call and never retry
/// internally; retries are decided by the batch orchestrator so attempt
/// counts stay observable per batch item.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use prompt_expander::domain::errors::ExpansionError;
/// use prompt_expander::domain::ports::TextGenerationService;
///
/// struct Echo;
///
/// #[async_trait]
/// impl TextGenerationService for Echo {
///     async fn exchange(&self, instruction: &str) -> Result<String, ExpansionError> {
///         Ok(instruction.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Send one instruction and return the generated `response` text
    ///
    /// # Errors
    /// - `ExpansionError::Network` on transport failure or non-success status
    /// - `ExpansionError::Timeout` when the exchange exceeds its deadline
    /// - `ExpansionError::ResponseFormat` when the payload has the wrong shape
    async fn exchange(&self, instruction: &str) -> Result<String, ExpansionError>;
}
