//! `sara` command-line entry point.
//!
//! Configuration comes from the environment (see `sara_client::config`); set
//! `SARA_SESSION_FILE` to keep the session between invocations.

use anyhow::Context;
use clap::{Parser, Subcommand};
use sara_auth::Role;
use sara_client::{AppState, ClientConfig, RequestOptions, SessionEvent};
use sara_events::EventBus;
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "sara", version, about = "SARA inventory client: session and access control")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and store the session.
    Login {
        email: String,
        #[arg(long, env = "SARA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account (does not log in).
    Register {
        name: String,
        email: String,
        #[arg(long, env = "SARA_PASSWORD", hide_env_values = true)]
        password: String,
        /// admin, gestionnaire/manager or observateur/observer; backend default when omitted.
        #[arg(long)]
        role: Option<Role>,
    },
    /// Ask the backend whether registration is open.
    CanRegister,
    /// Show the current user and what they may do.
    Whoami,
    /// Navigate to an application path through the route guard.
    Visit { path: String },
    /// Authenticated GET against an API path; prints the JSON body.
    Get { path: String },
    /// Authenticated download of an API path into the download directory.
    Download { path: String, filename: String },
    /// End the session.
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = ClientConfig::from_env().context("invalid SARA configuration")?;
    sara_observability::init(config.log_format);

    let state = AppState::new(config).context("failed to set up the SARA client")?;
    let events = state.events.subscribe();

    let outcome = state.auth.initialize().await;
    tracing::debug!(?outcome, "session initialized");

    let result = run(&state, cli.command).await;

    for event in events.drain() {
        report(&event);
    }

    result
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let payload = state.auth.login(&email, &password).await?;
            println!(
                "logged in as {} <{}> ({})",
                payload.user.name, payload.user.email, payload.user.role
            );
        }
        Command::Register {
            name,
            email,
            password,
            role,
        } => {
            let payload = state.auth.register(&name, &email, &password, role).await?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Command::CanRegister => {
            let answer = state.auth.can_register().await;
            match (answer.can_register, answer.message) {
                (true, _) => println!("registration is open"),
                (false, Some(message)) => println!("registration is closed: {message}"),
                (false, None) => println!("registration is closed"),
            }
        }
        Command::Whoami => match state.session().current_user() {
            Some(user) => {
                println!("{} <{}>", user.name, user.email);
                println!("role: {} ({})", user.role, user.role.description());
                for capability in state.session().capabilities() {
                    println!("  - {capability}");
                }
            }
            None => println!("not logged in"),
        },
        Command::Visit { path } => {
            let nav = state
                .router
                .push(path.as_str())
                .await
                .with_context(|| format!("cannot navigate to {path}"))?;
            for hop in &nav.redirected_from {
                println!("{hop} ->");
            }
            println!("{}", nav.route.full_path());
        }
        Command::Get { path } => {
            let body: Value = state.auth.api().request(&path, RequestOptions::get()).await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Download { path, filename } => {
            let saved = state.auth.api().download(&path, &filename).await?;
            println!("saved {}", saved.display());
        }
        Command::Logout => {
            state.auth.logout();
            println!("logged out");
        }
    }

    Ok(())
}

fn report(event: &SessionEvent) {
    match event {
        SessionEvent::Reload(path) => eprintln!("session ended; restart from {path}"),
        SessionEvent::Navigate(path) => eprintln!("-> {path}"),
        SessionEvent::StorageCorrupted => {
            eprintln!("warning: the stored session was unreadable and has been reset")
        }
        SessionEvent::LoggedIn { .. } | SessionEvent::LoggedOut | SessionEvent::Expired => {}
    }
}
