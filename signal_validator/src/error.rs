//! Failure taxonomy of an evaluation.

use market_data_ingestor::providers::ProviderError;
use thiserror::Error;

/// Why an evaluation could not reach a verdict.
///
/// None of these escape the boolean/string entry points; they are mapped to a
/// negative verdict there.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Fewer bars or defined indicator rows than the computation needs.
    #[error("insufficient data: need at least {needed} {what}, got {got}")]
    InsufficientData {
        /// What was counted (e.g. "bars", "MACD rows").
        what: &'static str,
        /// Minimum required.
        needed: usize,
        /// Available.
        got: usize,
    },

    /// The bars provider failed or answered with an error status.
    #[error("bars provider failed: {0}")]
    Transport(#[from] ProviderError),

    /// An indicator produced a non-finite or otherwise unusable value.
    #[error("indicator computation failed: {0}")]
    Computation(String),
}

impl SignalError {
    /// Short machine-friendly tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            SignalError::InsufficientData { .. } => "insufficient_data",
            SignalError::Transport(_) => "transport",
            SignalError::Computation(_) => "computation",
        }
    }

    pub(crate) fn insufficient(what: &'static str, needed: usize, got: usize) -> Self {
        SignalError::InsufficientData { what, needed, got }
    }
}
