//! ui::prompts
//!
//! Interactive prompts and confirmations.
//!
//! # Design
//!
//! Prompts are only shown in interactive mode. In non-interactive mode,
//! operations requiring user input must either have defaults or fail
//! with a clear error message.

use dialoguer::Confirm;
use thiserror::Error;

/// Errors from prompts.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("prompt cancelled by user")]
    Cancelled,

    #[error("not in interactive mode")]
    NotInteractive,

    #[error("IO error: {0}")]
    IoError(String),
}

/// Prompt for confirmation (yes/no).
///
/// Returns `Ok(true)` if the user confirms, `Ok(false)` if they decline.
/// Returns `Err(PromptError::NotInteractive)` if not in interactive mode.
pub fn confirm(message: &str, default: bool, interactive: bool) -> Result<bool, PromptError> {
    if !interactive {
        return Err(PromptError::NotInteractive);
    }

    Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact_opt()
        .map_err(|e| PromptError::IoError(e.to_string()))?
        .ok_or(PromptError::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_requires_interactive() {
        let result = confirm("Move files?", false, false);
        assert!(matches!(result, Err(PromptError::NotInteractive)));
    }
}
