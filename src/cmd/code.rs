//! Submission commands: `coderev submit`, `show`, `edit`, `delete`, `mine`,
//! `browse`, `re-review`, `like`.

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::path::PathBuf;

use coderev::api::types::{
    CodeSubmission, ListFilter, NewSubmission, Page, SubmissionStatus, Visibility, split_tags,
};
use coderev::review::{RegenerateOutcome, RegenerationTrigger, render_review};
use coderev::ui::code::SUBMIT_LANGUAGES;
use coderev::ui::icons::{CALENDAR, CODE, COMMENT, REFRESH, STAR, THUMBS_UP, USER};
use coderev::ui::{self, RequestSpinner, notice, render_code_block, wrap_indented};

use super::{AppContext, Reported, interactive, read_code};

/// Submission fields given on the command line.
#[derive(Debug, Default)]
pub struct SubmissionFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<String>,
    pub language: Option<String>,
    pub visibility: Option<Visibility>,
    pub status: Option<SubmissionStatus>,
    pub file: Option<PathBuf>,
}

impl SubmissionFields {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.tags.is_none()
            && self.language.is_none()
            && self.visibility.is_none()
            && self.status.is_none()
            && self.file.is_none()
    }

    /// Overlay the given fields onto `draft`.
    fn apply(self, draft: &mut NewSubmission) -> Result<()> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(tags) = self.tags {
            draft.tags = split_tags(&tags);
        }
        if let Some(language) = self.language {
            draft.language = language;
        }
        if let Some(visibility) = self.visibility {
            draft.visibility = visibility;
        }
        if let Some(status) = self.status {
            draft.status = status;
        }
        if let Some(path) = self.file {
            draft.code = read_code(&path)?;
        }
        Ok(())
    }
}

/// Prompt for any required field that is still blank.
fn fill_missing(draft: &mut NewSubmission) -> Result<()> {
    if draft.missing_fields().is_empty() || !interactive() {
        return Ok(());
    }
    if draft.title.trim().is_empty() {
        draft.title = Input::new()
            .with_prompt("Title")
            .interact_text()
            .context("Failed to read title")?;
    }
    if draft.language.trim().is_empty() {
        let choice = Select::new()
            .with_prompt("Language")
            .items(SUBMIT_LANGUAGES)
            .default(0)
            .interact()
            .context("Failed to read language")?;
        draft.language = SUBMIT_LANGUAGES[choice].to_string();
    }
    if draft.code.trim().is_empty() {
        let path: String = Input::new()
            .with_prompt("Path to the code file")
            .interact_text()
            .context("Failed to read file path")?;
        draft.code = read_code(std::path::Path::new(path.trim()))?;
    }
    Ok(())
}

fn ensure_complete(draft: &NewSubmission) -> Result<()> {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        bail!("Missing required field(s): {}", missing.join(", "));
    }
    Ok(())
}

pub async fn cmd_submit(ctx: &AppContext, fields: SubmissionFields) -> Result<()> {
    let mut draft = NewSubmission::default();
    fields.apply(&mut draft)?;
    fill_missing(&mut draft)?;
    ensure_complete(&draft)?;

    let message = RequestSpinner::around(
        "Submitting code for review...",
        ctx.client.submit_code(&draft),
    )
    .await?;
    notice::success(&notice::server_message(
        message.as_deref(),
        "Code submitted successfully",
    ));
    notice::info("Run `coderev mine` to see your submissions.");
    Ok(())
}

pub async fn cmd_edit(ctx: &AppContext, slug: &str, fields: SubmissionFields) -> Result<()> {
    let current = RequestSpinner::around("Loading submission...", ctx.client.fetch_code(slug))
        .await
        .with_context(|| format!("Failed to load '{}'", slug))?;
    let mut draft = NewSubmission::from_submission(&current);

    if fields.is_empty() {
        if !interactive() {
            bail!("Nothing to change; pass at least one field flag");
        }
        draft.title = Input::new()
            .with_prompt("Title")
            .with_initial_text(draft.title.clone())
            .interact_text()
            .context("Failed to read title")?;
        draft.description = Input::new()
            .with_prompt("Description")
            .with_initial_text(draft.description.clone())
            .allow_empty(true)
            .interact_text()
            .context("Failed to read description")?;
        let tags: String = Input::new()
            .with_prompt("Tags (comma-separated)")
            .with_initial_text(draft.tags.join(", "))
            .allow_empty(true)
            .interact_text()
            .context("Failed to read tags")?;
        draft.tags = split_tags(&tags);
    } else {
        fields.apply(&mut draft)?;
    }
    ensure_complete(&draft)?;

    let message =
        RequestSpinner::around("Saving changes...", ctx.client.update_code(slug, &draft)).await?;
    notice::success(&notice::server_message(
        message.as_deref(),
        "Code updated successfully",
    ));
    Ok(())
}

pub async fn cmd_delete(ctx: &AppContext, slug: &str, yes: bool) -> Result<()> {
    if !yes {
        let confirm = Confirm::new()
            .with_prompt(format!("Delete submission '{}'?", slug))
            .default(false)
            .interact()
            .unwrap_or(false);
        if !confirm {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let message = RequestSpinner::around("Deleting...", ctx.client.delete_code(slug)).await?;
    notice::success(&notice::server_message(
        message.as_deref(),
        "Code deleted successfully",
    ));
    Ok(())
}

pub async fn cmd_show(
    ctx: &AppContext,
    slug: &str,
    public: bool,
    expand: bool,
    refactored: bool,
) -> Result<()> {
    let fetch = async {
        if public {
            ctx.client.fetch_public_code(slug).await
        } else {
            ctx.client.fetch_code(slug).await
        }
    };
    let code = RequestSpinner::around("Loading submission...", fetch).await?;
    print_submission(ctx, &code, expand, refactored);
    Ok(())
}

pub async fn cmd_mine(
    ctx: &AppContext,
    page: u32,
    language: Option<String>,
    tag: Option<String>,
) -> Result<()> {
    let listing = RequestSpinner::around(
        "Loading your submissions...",
        ctx.client
            .list(coderev::api::endpoints::CODE_ALL, page, ctx.config.page_size()),
    )
    .await?;
    let filter = ListFilter { language, tag };
    print_listing(ctx, "Your Codes", &listing, &filter, "mine");
    Ok(())
}

pub async fn cmd_browse(ctx: &AppContext, page: u32) -> Result<()> {
    let listing = RequestSpinner::around(
        "Loading public submissions...",
        ctx.client
            .list(coderev::api::endpoints::CODE_ALL_PUBLIC, page, ctx.config.page_size()),
    )
    .await?;
    print_listing(ctx, "Public Codes", &listing, &ListFilter::default(), "browse");
    Ok(())
}

pub async fn cmd_re_review(ctx: &AppContext, slug: &str, expand: bool) -> Result<()> {
    let code = RequestSpinner::around("Loading submission...", ctx.client.fetch_code(slug)).await?;
    if !code.is_authored_by(ctx.user_id()) {
        bail!("Only the author of '{}' can regenerate its review", slug);
    }

    let trigger = RegenerationTrigger::new();
    let outcome =
        RequestSpinner::around("Regenerating...", trigger.fire(&ctx.client, &code.slug)).await;

    match outcome {
        RegenerateOutcome::Regenerated { message } => {
            notice::success(&message);
            let refreshed =
                RequestSpinner::around("Loading new review...", ctx.client.fetch_code(slug))
                    .await?;
            let opts = ctx.render_options(&refreshed.language, expand, false);
            println!();
            println!("{}", render_review(&refreshed.ai_response, &opts));
            Ok(())
        }
        RegenerateOutcome::Failed { message } => {
            notice::error(&message);
            Err(Reported(message).into())
        }
        RegenerateOutcome::Ignored => {
            notice::info("A regeneration is already in progress.");
            Ok(())
        }
    }
}

/// Toggle the session user's like. The server decides the new state.
pub async fn cmd_like(ctx: &AppContext, id: &str) -> Result<()> {
    ctx.require_session("like submissions")?;
    let message = RequestSpinner::around("Updating like...", ctx.client.like(id)).await?;
    notice::success(&notice::server_message(message.as_deref(), "Like updated"));
    Ok(())
}

// ---- presentation ----

fn like_marker(code: &CodeSubmission, viewer: Option<&str>) -> String {
    let count = code.likes.len();
    if code.liked_by(viewer) {
        style(format!("{}{} (liked)", THUMBS_UP, count)).blue().to_string()
    } else {
        format!("{}{}", THUMBS_UP, count)
    }
}

fn print_listing(
    ctx: &AppContext,
    heading: &str,
    listing: &Page<CodeSubmission>,
    filter: &ListFilter,
    command: &str,
) {
    let viewer = ctx.user_id();
    let shown = filter.apply(&listing.items);

    println!();
    println!("{}", style(heading).bold());
    println!("{}", "=".repeat(heading.len()));
    println!();

    if shown.is_empty() {
        println!("  No codes found.");
    }
    for code in shown {
        let date = code
            .created_at
            .as_ref()
            .map(ui::format_date)
            .unwrap_or_default();
        println!(
            "  {}{}  {}",
            CODE,
            style(&code.title).bold(),
            style(format!("[{}]", code.slug)).dim()
        );
        let mut meta = vec![code.language.clone()];
        if !code.tags.is_empty() {
            meta.push(format!("#{}", code.tags.join(" #")));
        }
        if !code.visibility.is_empty() {
            meta.push(code.visibility.clone());
        }
        if !date.is_empty() {
            meta.push(date);
        }
        println!("     {}", style(meta.join(" · ")).dim());
        println!(
            "     {}  {}{}  id {}",
            like_marker(code, viewer),
            COMMENT,
            code.reviews.len(),
            style(&code.id).dim()
        );
        println!();
    }

    println!(
        "Page {} of {}{}{}",
        listing.page,
        listing.total_pages,
        if listing.has_prev() {
            format!("  · previous: coderev {} --page {}", command, listing.page - 1)
        } else {
            String::new()
        },
        if listing.has_next() {
            format!("  · next: coderev {} --page {}", command, listing.page + 1)
        } else {
            String::new()
        }
    );
    println!();
}

fn print_submission(ctx: &AppContext, code: &CodeSubmission, expand: bool, refactored: bool) {
    let viewer = ctx.user_id();
    let width = ctx.width();

    println!();
    println!("{}", style(&code.title).bold().underlined());
    if let Some(author) = code.author.as_ref().filter(|a| !a.name.is_empty()) {
        print!("{}{}", USER, author.name);
    }
    if let Some(at) = &code.created_at {
        print!("  {}{}", CALENDAR, ui::format_date(at));
    }
    println!();

    let mut meta = vec![code.language.clone()];
    if !code.tags.is_empty() {
        meta.push(format!("#{}", code.tags.join(" #")));
    }
    meta.push(code.visibility.clone());
    meta.push(code.status.clone());
    meta.retain(|m| !m.is_empty());
    println!("{}", style(meta.join(" · ")).dim());
    println!(
        "{}  {}{}{}",
        like_marker(code, viewer),
        COMMENT,
        code.reviews.len(),
        code.average_rating()
            .map(|r| format!("  {} {:.1}", STAR, r))
            .unwrap_or_default()
    );

    if !code.description.trim().is_empty() {
        println!();
        println!("{}", wrap_indented(&code.description, width, ""));
    }

    println!();
    print!("{}", render_code_block(&code.code, &code.language));

    println!();
    let opts = ctx.render_options(&code.language, expand, refactored);
    println!("{}", render_review(&code.ai_response, &opts));

    if code.is_authored_by(viewer) {
        println!(
            "{}{}",
            REFRESH,
            style(format!(
                "Regenerate: coderev re-review {0}  ·  Edit: coderev edit {0}  ·  Delete: coderev delete {0}",
                code.slug
            ))
            .dim()
        );
    }

    println!();
    println!("{}{}", COMMENT, style(format!("Comments ({})", code.reviews.len())).bold());
    if code.reviews.is_empty() {
        println!("  {}", style("No comments yet.").dim());
    }
    for review in &code.reviews {
        let who = review
            .reviewer
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Anonymous");
        let stars = review
            .rating
            .trim()
            .parse::<usize>()
            .map(|n| STAR.to_string().repeat(n.min(5)))
            .unwrap_or_else(|_| review.rating.clone());
        println!("  {} {}  {}", style(who).bold(), stars, style(&review.id).dim());
        println!("{}", wrap_indented(&review.comment, width, "    "));
    }
    println!();
    println!(
        "{}",
        style(format!("Comment: coderev comment add {} -m <text> -r <1-5>", code.id)).dim()
    );
}
