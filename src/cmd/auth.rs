//! Session commands: `coderev login`, `register`, `google-login`, `logout`, `whoami`.

use anyhow::{Context, Result, bail};
use dialoguer::{Input, Password};

use coderev::api::Session;
use coderev::api::types::{GoogleLoginRequest, LoginRequest, RegisterRequest};
use coderev::auth::AuthAction;
use coderev::guard::Route;
use coderev::ui::{RequestSpinner, notice};

use super::{AppContext, interactive, read_stdin_line, routes};

fn prompt(label: &str, given: Option<String>) -> Result<String> {
    match given.filter(|v| !v.trim().is_empty()) {
        Some(v) => Ok(v),
        None if interactive() => Input::<String>::new()
            .with_prompt(label)
            .interact_text()
            .with_context(|| format!("Failed to read {}", label.to_lowercase())),
        None => bail!("{} is required", label),
    }
}

fn password(from_stdin: bool, confirm: bool) -> Result<String> {
    if from_stdin {
        return read_stdin_line();
    }
    if !interactive() {
        bail!("Password is required; pass --password-stdin when not running in a terminal");
    }
    let mut prompt = Password::new().with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().context("Failed to read password")
}

/// Store `session` and announce it, then point at the saved location.
fn finish_login(ctx: &mut AppContext, session: Session, return_to: Option<&str>) -> Result<()> {
    let message = notice::server_message(session.message.as_deref(), "Logged in successfully");
    ctx.dispatch(AuthAction::Login {
        user: session.user,
        token: session.token,
    })?;
    notice::success(&message);
    resume(return_to);
    Ok(())
}

fn resume(return_to: Option<&str>) {
    let route = return_to.and_then(|path| {
        let parsed = Route::parse(path);
        if parsed.is_none() {
            notice::info(&format!("Unknown route '{}', continuing at /", path));
        }
        parsed
    });
    let route = route.unwrap_or(Route::Home);
    match routes::command_for(&route) {
        Some(command) => notice::info(&format!("Continue at {}: `{}`", route, command)),
        None => notice::info(&format!("Continue at {}", route)),
    }
}

pub async fn cmd_login(
    ctx: &mut AppContext,
    email: Option<String>,
    password_stdin: bool,
    return_to: Option<&str>,
) -> Result<()> {
    let email = prompt("Email", email)?;
    let password = password(password_stdin, false)?;
    let body = LoginRequest { email, password };

    let session = RequestSpinner::around("Signing in...", ctx.client.login(&body)).await?;
    finish_login(ctx, session, return_to)
}

pub async fn cmd_google_login(
    ctx: &mut AppContext,
    credential: String,
    return_to: Option<&str>,
) -> Result<()> {
    let body = GoogleLoginRequest { token: credential };
    let session =
        RequestSpinner::around("Signing in with Google...", ctx.client.google_login(&body)).await?;
    finish_login(ctx, session, return_to)
}

pub async fn cmd_register(
    ctx: &mut AppContext,
    name: Option<String>,
    email: Option<String>,
    password_stdin: bool,
) -> Result<()> {
    let name = prompt("Name", name)?;
    let email = prompt("Email", email)?;
    let password = password(password_stdin, true)?;
    let body = RegisterRequest {
        name,
        email,
        password,
    };

    let registration =
        RequestSpinner::around("Creating account...", ctx.client.register(&body)).await?;
    let message = notice::server_message(registration.message.as_deref(), "Account created");

    match registration.session {
        Some(session) => {
            ctx.dispatch(AuthAction::Register {
                user: session.user,
                token: session.token,
            })?;
            notice::success(&message);
        }
        None => {
            notice::success(&message);
            notice::info("Run `coderev login` to sign in.");
        }
    }
    Ok(())
}

/// Sign out. The local session is cleared even if the backend call fails.
pub async fn cmd_logout(ctx: &mut AppContext) -> Result<()> {
    if !ctx.is_authenticated() {
        notice::info("You are not logged in.");
        return Ok(());
    }

    let result = RequestSpinner::around("Signing out...", ctx.client.logout()).await;
    ctx.dispatch(AuthAction::Logout)?;
    match result {
        Ok(message) => {
            notice::success(&notice::server_message(
                message.as_deref(),
                "Logged out successfully",
            ));
        }
        Err(e) => {
            tracing::warn!(error = %e, "backend logout failed");
            notice::info("Signed out locally; the server could not be reached.");
        }
    }
    Ok(())
}

pub fn cmd_whoami(ctx: &AppContext) -> Result<()> {
    let state = ctx.session.state();
    let Some(user) = state.user.as_ref().filter(|_| state.is_authenticated) else {
        println!("Not logged in.");
        return Ok(());
    };

    println!("{}", user.display_name());
    if let Some(email) = &user.email {
        println!("  email: {}", email);
    }
    if let Some(role) = user.role.as_deref().filter(|r| !r.is_empty()) {
        println!("  role:  {}", role);
    }
    if let Some(id) = &user.id {
        println!("  id:    {}", id);
    }
    Ok(())
}
