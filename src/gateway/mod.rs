//! Tool gateway: validation, execution, masking, envelope.
//!
//! Control flow per request: router → executor → masker → envelope. A
//! rejected request never reaches the executor, and every exit path —
//! including executor faults — produces a well-formed [`ResponseEnvelope`].

pub mod envelope;
pub mod executor;
pub mod router;

pub use envelope::ResponseEnvelope;
pub use executor::{default_registry, ExecutorRegistry, ToolExecutor, UnboundTool};
pub use router::ValidationRouter;

use crate::config::GatewayConfig;
use crate::masking::DataMasker;
use crate::security::{CheckKind, PatternLibrary, ValidationOutcome};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, instrument};

/// The gateway orchestrator.
///
/// Holds no per-call mutable state; validation and masking are pure, and the
/// executor call is the only operation that can block.
pub struct ToolGateway {
    router: ValidationRouter,
    masker: DataMasker,
    executors: Arc<ExecutorRegistry>,
    disclose_matched_patterns: bool,
    max_error_message_length: usize,
}

impl ToolGateway {
    pub fn new(config: &GatewayConfig, executors: Arc<ExecutorRegistry>) -> Self {
        Self::with_patterns(config, executors, Arc::new(PatternLibrary::new()))
    }

    /// Build with an explicit, shared pattern library.
    pub fn with_patterns(
        config: &GatewayConfig,
        executors: Arc<ExecutorRegistry>,
        patterns: Arc<PatternLibrary>,
    ) -> Self {
        Self {
            router: ValidationRouter::new(config, Arc::clone(&patterns)),
            masker: DataMasker::new(patterns),
            executors,
            disclose_matched_patterns: config.security.disclose_matched_patterns,
            max_error_message_length: config.security.max_error_message_length,
        }
    }

    /// Handle one tool call end to end.
    #[instrument(skip(self, arguments), fields(tool = %name))]
    pub async fn handle(&self, name: &str, arguments: &Value) -> ResponseEnvelope {
        match self.router.validate(name, arguments) {
            ValidationOutcome::Rejected {
                reason,
                check,
                matched_patterns,
            } => {
                // Matched category names are logged by the router; whether
                // they are echoed outward is a disclosure policy decision.
                let message = if check == CheckKind::Injection
                    && self.disclose_matched_patterns
                    && !matched_patterns.is_empty()
                {
                    format!("{} (categories: {})", reason, matched_patterns.join(", "))
                } else {
                    reason
                };
                ResponseEnvelope::error(message)
            }
            ValidationOutcome::Valid => match self.executors.execute(name, arguments.clone()).await
            {
                Ok(result) => ResponseEnvelope::success(self.masker.mask_result(&result)),
                Err(e) => {
                    error!(tool = name, "Tool execution failed: {}", e);
                    ResponseEnvelope::error(format!(
                        "Tool call failed: {}",
                        self.sanitize_message(&e.to_string())
                    ))
                    .with_tool_name(name)
                    .with_arguments(self.masker.mask(arguments))
                }
            },
        }
    }

    /// Executor failure detail may echo injected payload fragments or
    /// connection secrets; run it through the scalar mask and truncate.
    fn sanitize_message(&self, message: &str) -> String {
        let masked = match self.masker.mask(&Value::String(message.to_string())) {
            Value::String(s) => s,
            _ => message.to_string(),
        };

        if masked.chars().count() > self.max_error_message_length {
            let truncated: String = masked.chars().take(self.max_error_message_length).collect();
            format!("{}...", truncated)
        } else {
            masked
        }
    }
}
