//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module     | Commands handled                                          |
//! |------------|-----------------------------------------------------------|
//! | `auth`     | `Login`, `Register`, `GoogleLogin`, `Logout`, `Whoami`    |
//! | `code`     | `Submit`, `Show`, `Edit`, `Delete`, `Mine`, `Browse`, `ReReview`, `Like` |
//! | `comment`  | `Comment`                                                 |
//! | `profile`  | `Profile`                                                 |
//! | `feedback` | `Feedback`                                                |
//! | `config`   | `Config`                                                  |
//! | `routes`   | `Routes`, `Privacy`                                       |

pub mod auth;
pub mod code;
pub mod comment;
pub mod config;
pub mod feedback;
pub mod profile;
pub mod routes;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

use coderev::api::ApiClient;
use coderev::auth::{AuthAction, AuthStore, FileStorage, open_session};
use coderev::config::{CliOverrides, CoderevConfig, resolve_config_dir};
use coderev::errors::ApiError;
use coderev::guard::{GuardOutcome, Route};
use coderev::review::RenderOptions;
use coderev::ui::{self, notice};

use super::{Cli, Commands};

/// An error whose notice has already been printed.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct Reported(pub String);

/// Everything a command needs: configuration, session and backend client.
pub struct AppContext {
    pub config: CoderevConfig,
    pub session: AuthStore<FileStorage>,
    pub client: ApiClient,
}

impl AppContext {
    pub fn load(config_dir: PathBuf, cli: CliOverrides) -> Result<Self> {
        let config = CoderevConfig::load(config_dir, cli).context("Failed to load configuration")?;
        let session = open_session(&config.config_dir);
        let client_config = config.client_config()?;
        debug!(base_url = %client_config.base_url, "using backend");
        let client = ApiClient::new(client_config, session.state().token.clone())
            .context("Failed to build HTTP client")?;
        Ok(Self {
            config,
            session,
            client,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.state().user_id()
    }

    /// Apply a session transition and keep the client's token in step.
    pub fn dispatch(&mut self, action: AuthAction) -> Result<()> {
        self.session
            .dispatch(action)
            .context("Failed to save session")?;
        self.client.set_token(self.session.state().token.clone());
        Ok(())
    }

    /// Prose width: the configured width, else the terminal's.
    pub fn width(&self) -> usize {
        self.config.wrap_width().unwrap_or_else(ui::term_width)
    }

    pub fn render_options(&self, language: &str, expand: bool, refactored: bool) -> RenderOptions {
        let display = &self.config.toml.display;
        RenderOptions {
            width: self.width(),
            expand_categories: expand || display.expand_categories,
            show_refactored: refactored || display.show_refactored,
            language: language.to_string(),
        }
    }

    /// Gate an action that needs a session but has no route of its own.
    pub fn require_session(&self, what: &str) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            let message = format!("Please log in to {}. Run `coderev login`.", what);
            notice::auth(&message);
            Err(Reported(message).into())
        }
    }
}

/// Run the parsed command line.
pub async fn dispatch(cli: Cli) -> Result<()> {
    let config_dir = resolve_config_dir(cli.config_dir.clone())?;

    // Commands that never touch the backend.
    match &cli.command {
        Commands::Config { command } => {
            return config::cmd_config(&config_dir, command.clone(), overrides(&cli));
        }
        Commands::Routes => return routes::cmd_routes(),
        Commands::Privacy => return routes::cmd_privacy(),
        _ => {}
    }

    let mut ctx = AppContext::load(config_dir, overrides(&cli))?;

    if let Some(route) = cli.command.route()
        && !enforce_guard(&ctx, &route)
    {
        return Ok(());
    }

    match cli.command {
        Commands::Login {
            email,
            password_stdin,
            return_to,
        } => auth::cmd_login(&mut ctx, email, password_stdin, return_to.as_deref()).await,
        Commands::Register {
            name,
            email,
            password_stdin,
        } => auth::cmd_register(&mut ctx, name, email, password_stdin).await,
        Commands::GoogleLogin {
            credential,
            return_to,
        } => auth::cmd_google_login(&mut ctx, credential, return_to.as_deref()).await,
        Commands::Logout => auth::cmd_logout(&mut ctx).await,
        Commands::Whoami => auth::cmd_whoami(&ctx),
        Commands::Submit {
            title,
            description,
            tags,
            language,
            visibility,
            status,
            file,
        } => {
            let fields = code::SubmissionFields {
                title,
                description,
                tags,
                language,
                visibility: Some(visibility),
                status: Some(status),
                file,
            };
            code::cmd_submit(&ctx, fields).await
        }
        Commands::Show {
            slug,
            public,
            expand,
            refactored,
        } => code::cmd_show(&ctx, &slug, public, expand, refactored).await,
        Commands::Edit {
            slug,
            title,
            description,
            tags,
            language,
            visibility,
            status,
            file,
        } => {
            let fields = code::SubmissionFields {
                title,
                description,
                tags,
                language,
                visibility,
                status,
                file,
            };
            code::cmd_edit(&ctx, &slug, fields).await
        }
        Commands::Delete { slug, yes } => code::cmd_delete(&ctx, &slug, yes).await,
        Commands::Mine {
            page,
            language,
            tag,
        } => code::cmd_mine(&ctx, page, language, tag).await,
        Commands::Browse { page } => code::cmd_browse(&ctx, page).await,
        Commands::ReReview { slug, expand } => code::cmd_re_review(&ctx, &slug, expand).await,
        Commands::Like { id } => code::cmd_like(&ctx, &id).await,
        Commands::Comment { command } => comment::cmd_comment(&ctx, command).await,
        Commands::Profile { command } => profile::cmd_profile(&mut ctx, command).await,
        Commands::Feedback { purpose, message } => {
            feedback::cmd_feedback(&ctx, purpose, message).await
        }
        Commands::Config { .. } | Commands::Routes | Commands::Privacy => Ok(()),
    }
}

fn overrides(cli: &Cli) -> CliOverrides {
    CliOverrides {
        base_url: cli.base_url.clone(),
        environment: cli.env,
        verbose: cli.verbose,
    }
}

/// Evaluate `route`'s guard, printing the redirect notice when it fails.
fn enforce_guard(ctx: &AppContext, route: &Route) -> bool {
    match route.check(ctx.is_authenticated()) {
        GuardOutcome::Render => true,
        GuardOutcome::Redirect { from: Some(from), .. } => {
            notice::auth(&format!(
                "Please log in to view {}. Run `coderev login --return-to {}`.",
                from, from
            ));
            false
        }
        GuardOutcome::Redirect { to, from: None } => {
            let name = ctx
                .session
                .state()
                .user
                .as_ref()
                .map(|u| u.display_name().to_string())
                .unwrap_or_default();
            notice::info(&format!(
                "Already logged in as {}. Continue at {} or run `coderev logout` first.",
                name, to
            ));
            false
        }
    }
}

/// Print a failed command's notice.
pub fn report(err: &anyhow::Error) {
    if err.downcast_ref::<Reported>().is_some() {
        return;
    }
    match err.downcast_ref::<ApiError>() {
        Some(api) => {
            debug!(error = %format!("{:#}", err), "request failed");
            notice::api_error(api);
        }
        None => notice::error(&format!("{:#}", err)),
    }
}

/// Read code from `path`, or stdin when `path` is `-`.
pub fn read_code(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("Failed to read code from stdin")?;
        Ok(code)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }
}

/// Read a secret from the first line of stdin.
pub fn read_stdin_line() -> Result<String> {
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Whether prompts can be shown.
pub fn interactive() -> bool {
    console::Term::stderr().is_term()
}
