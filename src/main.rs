use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use coderev::api::types::{FeedbackPurpose, SubmissionStatus, Visibility};
use coderev::api::Environment;
use coderev::guard::Route;

mod cmd;

#[derive(Parser)]
#[command(name = "coderev")]
#[command(version, about = "Submit code for peer and AI review")]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend base URL, e.g. http://localhost:5000/api/v1. Overrides --env.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Backend deployment to use
    #[arg(long, global = true, value_enum)]
    pub env: Option<Environment>,

    /// Directory holding coderev.toml and the saved session
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        #[arg(short, long)]
        email: Option<String>,
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
        /// Route to continue at after signing in, e.g. /submit-code
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },
    /// Sign in with a Google ID token
    GoogleLogin {
        /// ID token issued by Google sign-in
        #[arg(long)]
        credential: String,
        #[arg(long)]
        return_to: Option<String>,
    },
    /// Sign out and forget the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Submit code for review
    Submit {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Comma-separated tags, e.g. bugfix,sorting
        #[arg(long)]
        tags: Option<String>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long, value_enum, default_value = "public")]
        visibility: Visibility,
        #[arg(long, value_enum, default_value = "pending")]
        status: SubmissionStatus,
        /// File holding the code; `-` reads stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Show a submission with its AI review and comments
    Show {
        slug: String,
        /// Use the public view (no sign-in needed)
        #[arg(long)]
        public: bool,
        /// Show every category's issues
        #[arg(long)]
        expand: bool,
        /// Show the refactored code
        #[arg(long)]
        refactored: bool,
    },
    /// Edit one of your submissions
    Edit {
        slug: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        tags: Option<String>,
        #[arg(short, long)]
        language: Option<String>,
        #[arg(long, value_enum)]
        visibility: Option<Visibility>,
        #[arg(long, value_enum)]
        status: Option<SubmissionStatus>,
        /// File holding the new code; `-` reads stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Delete one of your submissions
    Delete {
        slug: String,
        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List your submissions
    Mine {
        #[arg(short, long, default_value = "1")]
        page: u32,
        /// Only show this language (exact match)
        #[arg(short, long)]
        language: Option<String>,
        /// Only show this tag
        #[arg(short, long)]
        tag: Option<String>,
    },
    /// Browse public submissions
    Browse {
        #[arg(short, long, default_value = "1")]
        page: u32,
    },
    /// Regenerate the AI review of your submission
    ReReview {
        slug: String,
        #[arg(long)]
        expand: bool,
    },
    /// Like or unlike a submission
    Like {
        /// Submission id
        id: String,
    },
    /// Manage comments
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// View or manage your profile
    Profile {
        #[command(subcommand)]
        command: Option<ProfileCommands>,
    },
    /// Send feedback to the Code Rev team
    Feedback {
        #[arg(long, value_enum)]
        purpose: Option<FeedbackPurpose>,
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Show the privacy policy
    Privacy,
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// List client routes and their access rules
    Routes,
}

#[derive(Subcommand, Clone)]
pub enum CommentCommands {
    /// Comment on a submission
    Add {
        /// Submission id
        code_id: String,
        #[arg(short, long)]
        message: Option<String>,
        /// Rating from 1 to 5
        #[arg(short, long)]
        rating: Option<u8>,
    },
    /// Edit one of your comments
    Edit {
        /// Comment id
        comment_id: String,
        #[arg(short, long)]
        message: Option<String>,
        #[arg(short, long)]
        rating: Option<u8>,
    },
    /// Delete one of your comments
    Delete {
        comment_id: String,
        #[arg(long)]
        yes: bool,
    },
    /// List the comments you have written
    List,
}

#[derive(Subcommand, Clone)]
pub enum ProfileCommands {
    /// Show your profile, recent submissions and comments
    Show,
    /// Update profile fields; prompts when no flags are given
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        picture: Option<String>,
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        about: Option<String>,
        #[arg(long)]
        gender: Option<String>,
    },
    /// Delete your account and sign out
    Delete {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration and show any warnings
    Validate,
    /// Initialize a default coderev.toml file
    Init,
}

impl Commands {
    /// Route this command renders, if it is gated.
    pub fn route(&self) -> Option<Route> {
        let route = match self {
            Commands::Login { .. } | Commands::GoogleLogin { .. } => Route::Login,
            Commands::Register { .. } => Route::Register,
            Commands::Submit { .. } => Route::SubmitCode,
            Commands::Show { slug, public, .. } => {
                if *public {
                    Route::FullPublicCode(slug.clone())
                } else {
                    Route::FullCode(slug.clone())
                }
            }
            Commands::Edit { slug, .. } => Route::CodeUpdate(slug.clone()),
            Commands::Delete { slug, .. } | Commands::ReReview { slug, .. } => {
                Route::FullCode(slug.clone())
            }
            Commands::Mine { .. } => Route::YourCode,
            Commands::Browse { .. } => Route::Codes,
            Commands::Profile { command } => match command {
                Some(ProfileCommands::Update { .. }) => Route::ProfileUpdate,
                _ => Route::Profile,
            },
            Commands::Comment {
                command: CommentCommands::List,
            } => Route::Profile,
            Commands::Feedback { .. } => Route::Feedback,
            Commands::Privacy => Route::Privacy,
            Commands::Like { .. }
            | Commands::Comment { .. }
            | Commands::Logout
            | Commands::Whoami
            | Commands::Config { .. }
            | Commands::Routes => return None,
        };
        Some(route)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cmd::dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cmd::report(&err);
            ExitCode::FAILURE
        }
    }
}
