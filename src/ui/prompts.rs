//! Confirmation prompt with a scripted fallback

use super::context::UiContext;
use crate::error::{ProcurementError, ProcurementResult};

/// Ask a yes/no question.
///
/// `--yes` answers yes; without a terminal the default is returned.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ProcurementResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    let message = message.to_string();
    let result = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message).initial_value(default).interact()
    })
    .await
    .map_err(|e| ProcurementError::User(format!("Prompt task failed: {}", e)))?;

    result.map_err(|e| ProcurementError::User(format!("Prompt failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn confirm_auto_yes() {
        let ctx = UiContext::non_interactive().with_auto_yes(true);
        assert!(confirm(&ctx, "Clear the order list?", false).await.unwrap());
    }

    #[tokio::test]
    async fn confirm_non_interactive_default() {
        let ctx = UiContext::non_interactive();
        assert!(confirm(&ctx, "Proceed?", true).await.unwrap());
        assert!(!confirm(&ctx, "Proceed?", false).await.unwrap());
    }
}
