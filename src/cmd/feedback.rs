//! `coderev feedback`.

use anyhow::{Context, Result, bail};
use dialoguer::{Input, Select};

use coderev::api::types::{FeedbackDraft, FeedbackPurpose};
use coderev::ui::{RequestSpinner, notice};

use super::{AppContext, interactive};

pub async fn cmd_feedback(
    ctx: &AppContext,
    purpose: Option<FeedbackPurpose>,
    message: Option<String>,
) -> Result<()> {
    let purpose = match purpose {
        Some(p) => p,
        None if interactive() => {
            let labels: Vec<&str> = FeedbackPurpose::ALL.iter().map(|p| p.label()).collect();
            let choice = Select::new()
                .with_prompt("Purpose")
                .items(&labels)
                .default(2)
                .interact()
                .context("Failed to read purpose")?;
            FeedbackPurpose::ALL[choice]
        }
        None => FeedbackPurpose::default(),
    };
    let message = match message.filter(|m| !m.trim().is_empty()) {
        Some(m) => m,
        None if interactive() => Input::new()
            .with_prompt("Message")
            .interact_text()
            .context("Failed to read message")?,
        None => bail!("Message is required (-m)"),
    };

    let body = FeedbackDraft { purpose, message };
    let reply = RequestSpinner::around("Sending feedback...", ctx.client.send_feedback(&body)).await?;
    notice::success(&notice::server_message(
        reply.as_deref(),
        "Thanks for your feedback!",
    ));
    Ok(())
}
