//! Profile commands: `coderev profile show|update|delete`.

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input};

use coderev::api::types::{ProfileUpdate, UserProfile};
use coderev::auth::AuthAction;
use coderev::ui::icons::{CODE, COMMENT, USER};
use coderev::ui::{RequestSpinner, notice, wrap_indented};

use super::super::ProfileCommands;
use super::{AppContext, interactive};

pub async fn cmd_profile(ctx: &mut AppContext, command: Option<ProfileCommands>) -> Result<()> {
    match command {
        None | Some(ProfileCommands::Show) => show(ctx).await,
        Some(ProfileCommands::Update {
            name,
            email,
            picture,
            role,
            about,
            gender,
        }) => {
            let changes = ProfileUpdate {
                name,
                email,
                profile_picture: picture,
                role,
                about,
                gender,
            };
            update(ctx, changes).await
        }
        Some(ProfileCommands::Delete { yes }) => delete(ctx, yes).await,
    }
}

fn field(label: &str, value: Option<&str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        println!("  {:<9} {}", style(label).dim(), v);
    }
}

async fn show(ctx: &mut AppContext) -> Result<()> {
    let profile = RequestSpinner::around("Loading profile...", ctx.client.profile()).await?;
    if ctx.session.state().user.as_ref() != Some(&profile) {
        ctx.dispatch(AuthAction::ProfileUpdate {
            user: profile.clone(),
        })?;
    }

    println!();
    println!("{}{}", USER, style(profile.display_name()).bold());
    field("email", profile.email.as_deref());
    field("role", profile.role.as_deref());
    field("gender", profile.gender.as_deref());
    field("picture", profile.profile_picture.as_deref());
    if let Some(about) = profile.about.as_deref().filter(|a| !a.trim().is_empty()) {
        println!();
        println!("{}", wrap_indented(about, ctx.width(), "  "));
    }

    let recent = RequestSpinner::around("Loading recent codes...", ctx.client.list_mine(1)).await?;
    println!();
    println!("{}{}", CODE, style("Recent Codes").bold());
    if recent.items.is_empty() {
        println!("  {}", style("No codes submitted yet.").dim());
    }
    for code in &recent.items {
        println!("  {}  {}", code.title, style(format!("[{}]", code.slug)).dim());
    }

    let comments =
        RequestSpinner::around("Loading your comments...", ctx.client.my_comments()).await?;
    println!();
    println!("{}{}", COMMENT, style(format!("Your Comments ({})", comments.len())).bold());
    for c in comments.iter().take(5) {
        let on = c
            .submission
            .as_ref()
            .map(|s| s.title.as_str())
            .unwrap_or_default();
        println!("  {}: {}", style(on).bold(), c.comment);
    }
    if comments.len() > 5 {
        println!("  {}", style("Run `coderev comment list` for all.").dim());
    }
    println!();
    Ok(())
}

fn prompt_field(label: &str, current: Option<&str>) -> Result<Option<String>> {
    let current = current.unwrap_or_default().to_string();
    let value: String = Input::new()
        .with_prompt(label)
        .with_initial_text(current.clone())
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", label.to_lowercase()))?;
    Ok((value != current).then_some(value))
}

fn prompt_changes(current: &UserProfile) -> Result<ProfileUpdate> {
    Ok(ProfileUpdate {
        name: prompt_field("Name", current.name.as_deref())?,
        email: prompt_field("Email", current.email.as_deref())?,
        profile_picture: prompt_field("Profile picture URL", current.profile_picture.as_deref())?,
        role: prompt_field("Role", current.role.as_deref())?,
        about: prompt_field("About", current.about.as_deref())?,
        gender: prompt_field("Gender (male/female/other)", current.gender.as_deref())?,
    })
}

async fn update(ctx: &mut AppContext, mut changes: ProfileUpdate) -> Result<()> {
    if changes.is_empty() {
        if !interactive() {
            bail!("Nothing to change; pass at least one field flag");
        }
        let current = RequestSpinner::around("Loading profile...", ctx.client.profile()).await?;
        changes = prompt_changes(&current)?;
        if changes.is_empty() {
            notice::info("No changes made.");
            return Ok(());
        }
    }

    let (message, echoed) =
        RequestSpinner::around("Updating profile...", ctx.client.update_profile(&changes)).await?;
    let updated = match echoed {
        Some(user) => user,
        None => ctx.client.profile().await?,
    };
    ctx.dispatch(AuthAction::ProfileUpdate { user: updated })?;
    notice::success(&notice::server_message(
        message.as_deref(),
        "Profile updated successfully",
    ));
    Ok(())
}

async fn delete(ctx: &mut AppContext, yes: bool) -> Result<()> {
    if !yes {
        let confirm = Confirm::new()
            .with_prompt("Delete your account? This cannot be undone.")
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirm {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let message = RequestSpinner::around("Deleting account...", ctx.client.delete_account()).await?;
    ctx.dispatch(AuthAction::Logout)?;
    notice::success(&notice::server_message(
        message.as_deref(),
        "Account deleted",
    ));
    Ok(())
}
