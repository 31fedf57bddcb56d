//! Comment commands: `coderev comment add|edit|delete|list`.

use anyhow::{Context, Result, anyhow, bail};
use console::style;
use dialoguer::{Confirm, Input, Select};

use coderev::api::types::CommentDraft;
use coderev::ui::icons::STAR;
use coderev::ui::{RequestSpinner, notice, wrap_indented};

use super::super::CommentCommands;
use super::{AppContext, interactive};

const RATINGS: [&str; 5] = [
    "5 - Excellent",
    "4 - Good",
    "3 - Average",
    "2 - Poor",
    "1 - Bad",
];

fn build_draft(message: Option<String>, rating: Option<u8>) -> Result<CommentDraft> {
    let message = match message {
        Some(m) => m,
        None if interactive() => Input::new()
            .with_prompt("Comment")
            .interact_text()
            .context("Failed to read comment")?,
        None => bail!("Comment text is required (-m)"),
    };
    let rating = match rating {
        Some(r) => r,
        None if interactive() => {
            let choice = Select::new()
                .with_prompt("Rating")
                .items(&RATINGS)
                .default(0)
                .interact()
                .context("Failed to read rating")?;
            5 - choice as u8
        }
        None => bail!("Rating is required (-r 1-5)"),
    };
    CommentDraft::new(message, rating).map_err(|e| anyhow!(e))
}

pub async fn cmd_comment(ctx: &AppContext, command: CommentCommands) -> Result<()> {
    match command {
        CommentCommands::Add {
            code_id,
            message,
            rating,
        } => {
            ctx.require_session("comment")?;
            let draft = build_draft(message, rating)?;
            let reply =
                RequestSpinner::around("Posting comment...", ctx.client.add_comment(&code_id, &draft))
                    .await?;
            notice::success(&notice::server_message(reply.as_deref(), "Comment added"));
        }
        CommentCommands::Edit {
            comment_id,
            message,
            rating,
        } => {
            ctx.require_session("edit comments")?;
            let draft = build_draft(message, rating)?;
            let reply = RequestSpinner::around(
                "Updating comment...",
                ctx.client.update_comment(&comment_id, &draft),
            )
            .await?;
            notice::success(&notice::server_message(reply.as_deref(), "Comment updated"));
        }
        CommentCommands::Delete { comment_id, yes } => {
            ctx.require_session("delete comments")?;
            if !yes {
                let confirm = Confirm::new()
                    .with_prompt("Delete this comment?")
                    .default(false)
                    .interact()
                    .unwrap_or(false);
                if !confirm {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }
            let reply = RequestSpinner::around(
                "Deleting comment...",
                ctx.client.delete_comment(&comment_id),
            )
            .await?;
            notice::success(&notice::server_message(reply.as_deref(), "Comment deleted"));
        }
        CommentCommands::List => {
            let comments =
                RequestSpinner::around("Loading your comments...", ctx.client.my_comments())
                    .await?;
            println!();
            println!("{}", style("Your Comments").bold());
            println!("=============");
            println!();
            if comments.is_empty() {
                println!("  You have not commented on any code yet.");
            }
            for c in &comments {
                let on = c
                    .submission
                    .as_ref()
                    .map(|s| s.title.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or("(deleted submission)");
                println!(
                    "  {} {}{}  {}",
                    style(on).bold(),
                    STAR,
                    c.rating,
                    style(&c.id).dim()
                );
                println!("{}", wrap_indented(&c.comment, ctx.width(), "    "));
                println!();
            }
        }
    }
    Ok(())
}
