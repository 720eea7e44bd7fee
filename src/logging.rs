//! Logging setup and structured code events.
//!
//! The derivation core never logs. Everything here is used by the operator
//! layer (`generator`, the CLI) to record what happened to a request.

use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Code generation event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeEvent {
    /// A code was derived
    Generated,
    /// Input was rejected before derivation
    Rejected,
    /// The SHA-256 primitive is missing
    PrimitiveUnavailable,
    /// Hashing failed at runtime
    DigestFailed,
    /// The code was copied to a clipboard
    Copied,
    /// No clipboard strategy worked
    CopyFailed,
    /// A presented code matched the re-derived one
    Verified,
    /// A presented code did not match
    VerifyMismatch,
}

impl std::fmt::Display for CodeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CodeEvent::Generated => "generated",
            CodeEvent::Rejected => "rejected",
            CodeEvent::PrimitiveUnavailable => "primitive_unavailable",
            CodeEvent::DigestFailed => "digest_failed",
            CodeEvent::Copied => "copied",
            CodeEvent::CopyFailed => "copy_failed",
            CodeEvent::Verified => "verified",
            CodeEvent::VerifyMismatch => "verify_mismatch",
        };
        write!(f, "{}", s)
    }
}

impl CodeEvent {
    /// Events that indicate something went wrong.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            CodeEvent::Rejected
                | CodeEvent::PrimitiveUnavailable
                | CodeEvent::DigestFailed
                | CodeEvent::CopyFailed
                | CodeEvent::VerifyMismatch
        )
    }
}

/// Log a code generation event.
///
/// # Arguments
///
/// * `event` - The type of event
/// * `device_id` - The device id the request was for
/// * `details` - Optional additional details about the event
pub fn log_code_event(event: CodeEvent, device_id: &str, details: Option<&str>) {
    let span = info_span!(
        "code_event",
        event = %event,
        device_id = %device_id,
    );
    let _enter = span.enter();

    if event.is_failure() {
        if let Some(d) = details {
            warn!(reason = %d, "Code event occurred");
        } else {
            warn!("Code event occurred");
        }
    } else if let Some(d) = details {
        info!(details = %d, "Code event occurred");
    } else {
        info!("Code event occurred");
    }
}

/// Build the filter directive for a configured level.
pub fn filter_directive(config: &LoggingConfig) -> String {
    if config.enabled {
        format!("gradekey={}", config.level.to_lowercase())
    } else {
        "off".to_string()
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured level when set. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
