use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use client::view::list;
use client::{
    Action, ActionOutcome, ChatSession, CommentId, CommentPersistence, CommentStore, ConnectionError, FileStorage,
    RelayConnection, RelayEvent, parse_line,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "ws://127.0.0.1:3000/socket";
const DEFAULT_STORE: &str = ".namecheer/storage.json";
const SEND_ECHO_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("health check failed: HTTP {0}")]
    Unhealthy(u16),
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error("relay error {code}: {message}")]
    Relay { code: String, message: String },
    #[error("relay closed the connection")]
    Closed,
    #[error("timed out waiting for the relay to echo the message")]
    Timeout,
    #[error("no comment #{0}")]
    UnknownComment(CommentId),
    #[error("stdin read failed: {0}")]
    Stdin(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "namecheer-cli", about = "NameCheer comment relay client")]
struct Cli {
    #[arg(long, env = "NAMECHEER_URL", default_value = DEFAULT_URL)]
    url: String,

    #[arg(long, env = "NAMECHEER_STORE", default_value = DEFAULT_STORE)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session: type to send, `/fav <id>`, `/cheer`, `/clear`, `/list`, `/quit`.
    Chat {
        #[arg(long)]
        name: Option<String>,
    },
    /// Send one message and wait for the relay to broadcast it back.
    Send {
        text: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Check the relay's health endpoint.
    Ping,
    Comments(CommentsCommand),
}

#[derive(Args, Debug)]
struct CommentsCommand {
    #[command(subcommand)]
    command: CommentsSubcommand,
}

/// Offline operations on the local store.
#[derive(Subcommand, Debug)]
enum CommentsSubcommand {
    List,
    Fav { id: CommentId },
    Cheer,
    Clear,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Chat { name } => run_chat(&cli.url, open_store(&cli.store), name).await,
        Command::Send { text, name } => run_send(&cli.url, open_store(&cli.store), &text, name).await,
        Command::Ping => run_ping(&cli.url).await,
        Command::Comments(comments) => run_comments(open_store(&cli.store), comments.command),
    }
}

fn open_store(path: &std::path::Path) -> CommentStore<FileStorage> {
    CommentStore::new(CommentPersistence::new(FileStorage::new(path)))
}

fn print_list(store: &CommentStore<FileStorage>) {
    print!("{}", list::render(store));
}

// =============================================================================
// CHAT
// =============================================================================

async fn run_chat(url: &str, store: CommentStore<FileStorage>, name: Option<String>) -> Result<(), CliError> {
    let connection = RelayConnection::connect(url).await?;
    let mut session = ChatSession::new(connection, store);
    if let Some(name) = name {
        session.sign_in(&name).await?;
    }
    eprintln!("connected as {}", session.client_id());
    print_list(session.store());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let result: Result<(), CliError> = loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(CliError::from(e)),
                };
                let action = match parse_line(&line) {
                    Ok(Some(action)) => action,
                    Ok(None) => continue,
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                };
                let rerender = matches!(action, Action::List);
                let missing = match &action {
                    Action::Favorite(id) => Some(*id),
                    _ => None,
                };
                match session.apply(action).await {
                    Ok(ActionOutcome::Quit) => break Ok(()),
                    Ok(ActionOutcome::Changed) => print_list(session.store()),
                    Ok(ActionOutcome::Unchanged) if rerender => print_list(session.store()),
                    Ok(ActionOutcome::Unchanged) => {
                        if let Some(id) = missing {
                            eprintln!("{}", CliError::UnknownComment(id));
                        }
                    }
                    Ok(ActionOutcome::Sent) => {}
                    Err(e) => break Err(e.into()),
                }
            }
            event = session.next_event() => {
                match event {
                    Ok(Some(RelayEvent::Message { .. })) => print_list(session.store()),
                    Ok(Some(RelayEvent::Error { code, message })) => {
                        eprintln!("relay error {}: {message}", code.as_deref().unwrap_or("-"));
                    }
                    Ok(Some(RelayEvent::Other(_))) => {}
                    Ok(None) => break Err(CliError::Closed),
                    Err(e) => break Err(e.into()),
                }
            }
        }
    };

    session.shutdown().await;
    result
}

// =============================================================================
// SEND
// =============================================================================

async fn run_send(
    url: &str,
    store: CommentStore<FileStorage>,
    text: &str,
    name: Option<String>,
) -> Result<(), CliError> {
    let connection = RelayConnection::connect(url).await?;
    let mut session = ChatSession::new(connection, store);
    if let Some(name) = name {
        session.sign_in(&name).await?;
    }
    if !session.submit(text).await? {
        eprintln!("nothing to send");
        session.shutdown().await;
        return Ok(());
    }

    let echoed = tokio::time::timeout(SEND_ECHO_TIMEOUT, wait_for_echo(&mut session, text))
        .await
        .unwrap_or(Err(CliError::Timeout));
    if echoed.is_ok() {
        if let Some(comment) = session.store().comments().last() {
            println!("#{} {}", comment.id, comment.content);
        }
    }
    session.shutdown().await;
    echoed
}

/// Apply relay events until the broadcast of `text` comes back. Broadcasts
/// from other clients that arrive first are appended too.
async fn wait_for_echo(session: &mut ChatSession<FileStorage>, text: &str) -> Result<(), CliError> {
    loop {
        match session.next_event().await? {
            Some(RelayEvent::Message { content, .. }) if content == text => return Ok(()),
            Some(RelayEvent::Error { code, message }) => {
                return Err(CliError::Relay { code: code.unwrap_or_else(|| "-".to_owned()), message });
            }
            Some(_) => {}
            None => return Err(CliError::Closed),
        }
    }
}

// =============================================================================
// PING
// =============================================================================

async fn run_ping(url: &str) -> Result<(), CliError> {
    let health = health_url(url)?;
    let response = reqwest::Client::new().get(health).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Unhealthy(status.as_u16()));
    }
    println!("ok");
    Ok(())
}

/// Map the relay's websocket URL to the HTTP health endpoint on the same host.
fn health_url(ws_url: &str) -> Result<String, CliError> {
    let (scheme, rest) = if let Some(rest) = ws_url.strip_prefix("ws://") {
        ("http", rest)
    } else if let Some(rest) = ws_url.strip_prefix("wss://") {
        ("https", rest)
    } else {
        return Err(CliError::InvalidUrl(ws_url.to_owned()));
    };
    let authority = rest.split(['/', '?']).next().unwrap_or_default();
    if authority.is_empty() {
        return Err(CliError::InvalidUrl(ws_url.to_owned()));
    }
    Ok(format!("{scheme}://{authority}/healthz"))
}

// =============================================================================
// COMMENTS (offline)
// =============================================================================

fn run_comments(mut store: CommentStore<FileStorage>, command: CommentsSubcommand) -> Result<(), CliError> {
    match command {
        CommentsSubcommand::List => {}
        CommentsSubcommand::Fav { id } => {
            if !store.increment_favorite(id) {
                return Err(CliError::UnknownComment(id));
            }
        }
        CommentsSubcommand::Cheer => store.increment_all_favorites(),
        CommentsSubcommand::Clear => store.clear_all(),
    }
    print_list(&store);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
