//! Command routes and the authentication guards in front of them.
//!
//! Each CLI command corresponds to a [`Route`]. Before a command runs its
//! route's [`GuardKind`] is evaluated against the session; a
//! [`GuardOutcome::Redirect`] replaces the command with a notice.

use std::fmt;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// A location in the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Codes,
    YourCode,
    FullCode(String),
    FullPublicCode(String),
    SubmitCode,
    CodeUpdate(String),
    Profile,
    ProfileUpdate,
    Feedback,
    Privacy,
    Login,
    Register,
}

/// Guard applied to a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardKind {
    /// Only for signed-in users; anonymous users go to `/login`.
    AuthRequired,
    /// Only for anonymous users; signed-in users go to `/`.
    AuthRedirect,
    Public,
}

impl fmt::Display for GuardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardKind::AuthRequired => write!(f, "auth-required"),
            GuardKind::AuthRedirect => write!(f, "auth-redirect"),
            GuardKind::Public => write!(f, "public"),
        }
    }
}

/// Result of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    Redirect {
        to: &'static str,
        /// The location to resume after signing in.
        from: Option<Route>,
    },
}

impl GuardOutcome {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Route pattern, guard and description, in router order.
pub const ROUTE_TABLE: &[(&str, GuardKind, &str)] = &[
    ("/", GuardKind::Public, "Home"),
    ("/codes", GuardKind::Public, "Public submissions"),
    ("/your-code", GuardKind::AuthRequired, "Your submissions"),
    ("/full-code/:slug", GuardKind::AuthRequired, "Submission detail"),
    ("/full-code/public/:slug", GuardKind::Public, "Public submission detail"),
    ("/submit-code", GuardKind::AuthRequired, "Submit code"),
    ("/code-update/:slug", GuardKind::AuthRequired, "Edit a submission"),
    ("/profile", GuardKind::AuthRequired, "Profile"),
    ("/profile/update", GuardKind::AuthRequired, "Edit profile"),
    ("/feedback", GuardKind::Public, "Send feedback"),
    ("/privacy", GuardKind::Public, "Privacy policy"),
    ("/login", GuardKind::AuthRedirect, "Sign in"),
    ("/register", GuardKind::AuthRedirect, "Create an account"),
];

impl Route {
    /// Concrete path, e.g. `/full-code/quick-sort`.
    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Codes => "/codes".to_string(),
            Route::YourCode => "/your-code".to_string(),
            Route::FullCode(slug) => format!("/full-code/{}", slug),
            Route::FullPublicCode(slug) => format!("/full-code/public/{}", slug),
            Route::SubmitCode => "/submit-code".to_string(),
            Route::CodeUpdate(slug) => format!("/code-update/{}", slug),
            Route::Profile => "/profile".to_string(),
            Route::ProfileUpdate => "/profile/update".to_string(),
            Route::Feedback => "/feedback".to_string(),
            Route::Privacy => "/privacy".to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::Register => "/register".to_string(),
        }
    }

    pub fn guard(&self) -> GuardKind {
        match self {
            Route::YourCode
            | Route::FullCode(_)
            | Route::SubmitCode
            | Route::CodeUpdate(_)
            | Route::Profile
            | Route::ProfileUpdate => GuardKind::AuthRequired,
            Route::Login | Route::Register => GuardKind::AuthRedirect,
            Route::Home
            | Route::Codes
            | Route::FullPublicCode(_)
            | Route::Feedback
            | Route::Privacy => GuardKind::Public,
        }
    }

    /// Parse a concrete path back into a route.
    pub fn parse(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        let segments: Vec<&str> = trimmed.trim_start_matches('/').split('/').collect();
        let route = match segments.as_slice() {
            [""] => Route::Home,
            ["codes"] => Route::Codes,
            ["your-code"] => Route::YourCode,
            ["full-code", "public", slug] if !slug.is_empty() => {
                Route::FullPublicCode(slug.to_string())
            }
            ["full-code", slug] if !slug.is_empty() => Route::FullCode(slug.to_string()),
            ["submit-code"] => Route::SubmitCode,
            ["code-update", slug] if !slug.is_empty() => Route::CodeUpdate(slug.to_string()),
            ["profile"] => Route::Profile,
            ["profile", "update"] => Route::ProfileUpdate,
            ["feedback"] => Route::Feedback,
            ["privacy"] => Route::Privacy,
            ["login"] => Route::Login,
            ["register"] => Route::Register,
            _ => return None,
        };
        Some(route)
    }

    /// Evaluate this route's guard.
    pub fn check(&self, is_authenticated: bool) -> GuardOutcome {
        match self.guard() {
            GuardKind::AuthRequired => require_auth(is_authenticated, self),
            GuardKind::AuthRedirect => redirect_if_authenticated(is_authenticated),
            GuardKind::Public => GuardOutcome::Render,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Send anonymous users to `/login`, remembering where they were headed.
pub fn require_auth(is_authenticated: bool, requested: &Route) -> GuardOutcome {
    if is_authenticated {
        GuardOutcome::Render
    } else {
        GuardOutcome::Redirect {
            to: LOGIN_PATH,
            from: Some(requested.clone()),
        }
    }
}

/// Send signed-in users away from the login/register screens.
pub fn redirect_if_authenticated(is_authenticated: bool) -> GuardOutcome {
    if is_authenticated {
        GuardOutcome::Redirect {
            to: HOME_PATH,
            from: None,
        }
    } else {
        GuardOutcome::Render
    }
}
