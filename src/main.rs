//! Marginalia CLI entrypoint for publishing a comment.

use std::io::{self, Write};
use std::process::ExitCode;

use marginalia::{
    Comment, CommentPublisher, HttpTransport, MarginaliaConfig, PublishError, handle_event,
};
use ortho_config::OrthoConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            if writeln!(io::stderr().lock(), "{error}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), PublishError> {
    let config = load_config()?;
    let settings = config.publish_settings()?;
    let publisher = settings.publisher()?;

    match config.event.as_deref() {
        Some(body) => run_event(&publisher, body).await,
        None => {
            let comment = publisher.add_comment(config.comment_input()).await?;
            write_summary(&comment)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable in event mode.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loads configuration from CLI, environment, and files.
///
/// # Errors
///
/// Returns [`PublishError::Configuration`] when ortho-config fails to parse
/// arguments or load configuration files.
fn load_config() -> Result<MarginaliaConfig, PublishError> {
    MarginaliaConfig::load().map_err(|error| PublishError::Configuration {
        message: error.to_string(),
    })
}

async fn run_event(
    publisher: &CommentPublisher<HttpTransport>,
    body: &str,
) -> Result<(), PublishError> {
    let response = handle_event(publisher, body).await;
    write_line(&response.to_json()?)
}

fn write_summary(comment: &Comment) -> Result<(), PublishError> {
    write_line(&format!(
        "Published comment {} on branch {}",
        comment.id(),
        comment.branch_name()
    ))
}

fn write_line(message: &str) -> Result<(), PublishError> {
    writeln!(io::stdout().lock(), "{message}").map_err(|error| PublishError::Io {
        message: error.to_string(),
    })
}
