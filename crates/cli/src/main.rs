//! blobsync - back up a local directory tree to an object-store container

mod commands;
mod exit_code;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgGroup, Parser};

use blobsync_core::{
    AccountConfig, DEFAULT_KEEPALIVE_INTERVAL, ExtensionFilter, HostSignaler, KeepAwake,
    SyncOptions,
};
use blobsync_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Back up, restore and reconcile a local directory against a remote
/// object-store container.
#[derive(Parser, Debug)]
#[command(name = "blobsync", version, about)]
#[command(group(ArgGroup::new("action").required(true)))]
struct Cli {
    /// Back up files from the local source to the destination container
    #[arg(short = 'b', long, group = "action")]
    backup: bool,

    /// Restore objects from the destination container to the local source
    #[arg(short = 'r', long, group = "action")]
    restore: bool,

    /// Delete remote objects that no longer exist in the local source
    #[arg(short = 'c', long, group = "action")]
    clean: bool,

    /// List the destination container, or all containers when unset
    #[arg(short = 'l', long, group = "action")]
    list: bool,

    /// Delete the destination container and everything in it
    #[arg(long, group = "action")]
    delete: bool,

    /// Local source directory path
    #[arg(short = 's', long, value_name = "PATH")]
    source: Option<PathBuf>,

    /// Destination container name
    #[arg(short = 'd', long, value_name = "CONTAINER")]
    destination: Option<String>,

    /// File extensions to include, separated by semicolons (e.g. .jpg;.png)
    #[arg(short = 'i', long, value_delimiter = ';', value_name = "EXT;EXT")]
    include: Vec<String>,

    /// File extensions to exclude, separated by semicolons (e.g. .log;.tmp)
    #[arg(short = 'e', long, value_delimiter = ';', value_name = "EXT;EXT")]
    exclude: Vec<String>,

    /// Number of concurrent transfers (defaults to available parallelism)
    #[arg(short = 't', long, value_name = "N")]
    threads: Option<usize>,

    /// Attempts per transfer before the file is counted as failed
    #[arg(long, value_name = "N", default_value_t = blobsync_core::options::DEFAULT_MAX_RETRIES)]
    max_retries: u32,

    /// Account connection string
    /// (endpoint=URL;region=R;access_key=AK;secret_key=SK)
    #[arg(
        short = 'a',
        long,
        env = "BLOBSYNC_ACCOUNT",
        hide_env_values = true,
        value_name = "CONNECTION"
    )]
    account: Option<String>,

    /// Upload without checking the remote last-modified time
    #[arg(short = 'o', long)]
    overwrite: bool,

    /// Print details during execution
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Suppress everything except errors
    #[arg(short = 'q', long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Backup,
    Restore,
    Clean,
    List,
    Delete,
}

impl Cli {
    fn action(&self) -> Action {
        // The clap group guarantees exactly one flag is set
        if self.backup {
            Action::Backup
        } else if self.restore {
            Action::Restore
        } else if self.clean {
            Action::Clean
        } else if self.list {
            Action::List
        } else {
            Action::Delete
        }
    }
}

/// Platform hook for "still working" signals
///
/// The actual power-management call is host specific; the default signaler
/// only leaves a trace so the ticking task stays observable.
struct LogSignaler;

impl HostSignaler for LogSignaler {
    fn signal(&self) {
        tracing::trace!("keep-awake tick");
    }
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    run(cli).await.into()
}

async fn run(cli: Cli) -> ExitCode {
    let formatter = Formatter::new(OutputConfig {
        quiet: cli.quiet,
        no_color: std::env::var_os("NO_COLOR").is_some(),
    });
    let action = cli.action();

    // Validate required options before doing any work
    let needs_destination = action != Action::List;
    if needs_destination && cli.destination.is_none() {
        formatter.error("Destination container (-d, --destination) is required for this action.");
        formatter.println("Type --help for the list of options.");
        return ExitCode::UsageError;
    }

    let needs_source = matches!(action, Action::Backup | Action::Restore | Action::Clean);
    if needs_source && cli.source.is_none() {
        formatter.error("Local source path (-s, --source) is required for this action.");
        formatter.println("Type --help for the list of options.");
        return ExitCode::UsageError;
    }

    let Some(connection) = cli.account.as_deref() else {
        formatter.error("Account connection string (-a, --account or BLOBSYNC_ACCOUNT) is required.");
        formatter.println("Type --help for the list of options.");
        return ExitCode::UsageError;
    };

    let account = match AccountConfig::parse(connection) {
        Ok(a) => a,
        Err(e) => {
            formatter.error(&format!("Invalid account: {e}"));
            return ExitCode::UsageError;
        }
    };

    tracing::info!(
        endpoint = %account.endpoint,
        container = cli.destination.as_deref().unwrap_or("/"),
        "using account"
    );

    let store = match S3Client::new(account).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create store client: {e}"));
            return ExitCode::NetworkError;
        }
    };

    // Long transfers should not be cut short by the host suspending
    let _keep_awake = KeepAwake::start(DEFAULT_KEEPALIVE_INTERVAL, Arc::new(LogSignaler));

    let filter = ExtensionFilter::new(cli.include.clone(), cli.exclude.clone());

    match action {
        Action::Backup | Action::Restore | Action::Clean => {
            let options = SyncOptions::new(
                cli.source.clone().expect("validated above"),
                cli.destination.clone().expect("validated above"),
            )
            .with_filter(filter)
            .with_overwrite(cli.overwrite)
            .with_workers(cli.threads.unwrap_or(0))
            .with_verbose(cli.verbose)
            .with_max_retries(cli.max_retries);

            match action {
                Action::Backup => commands::backup::execute(store, options, &formatter).await,
                Action::Restore => commands::restore::execute(store, options, &formatter).await,
                _ => commands::clean::execute(store, options, &formatter).await,
            }
        }
        Action::List => {
            commands::list::execute(store, cli.destination.clone(), filter, &formatter).await
        }
        Action::Delete => {
            let container = cli.destination.clone().expect("validated above");
            commands::delete::execute(store, container, &formatter).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_backup() {
        let cli = Cli::try_parse_from([
            "blobsync", "-b", "-s", "/data", "-d", "backup", "-t", "8", "-o",
        ])
        .unwrap();
        assert_eq!(cli.action(), Action::Backup);
        assert_eq!(cli.source.as_deref(), Some(std::path::Path::new("/data")));
        assert_eq!(cli.destination.as_deref(), Some("backup"));
        assert_eq!(cli.threads, Some(8));
        assert_eq!(cli.max_retries, blobsync_core::options::DEFAULT_MAX_RETRIES);
        assert!(cli.overwrite);
    }

    #[test]
    fn test_actions_are_mutually_exclusive() {
        assert!(Cli::try_parse_from(["blobsync", "-b", "-r"]).is_err());
        assert!(Cli::try_parse_from(["blobsync", "--list", "--delete"]).is_err());
    }

    #[test]
    fn test_an_action_is_required() {
        assert!(Cli::try_parse_from(["blobsync", "-s", "/data"]).is_err());
    }

    #[test]
    fn test_extension_lists_split_on_semicolons() {
        let cli =
            Cli::try_parse_from(["blobsync", "-l", "-i", ".jpg;.png", "-e", ".log;.tmp"]).unwrap();
        assert_eq!(cli.include, vec![".jpg", ".png"]);
        assert_eq!(cli.exclude, vec![".log", ".tmp"]);
    }

    #[test]
    fn test_list_without_destination_parses() {
        let cli = Cli::try_parse_from(["blobsync", "--list"]).unwrap();
        assert_eq!(cli.action(), Action::List);
        assert!(cli.destination.is_none());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let cli = Cli::try_parse_from(["blobsync", "-l", "-q"]).unwrap();
        assert!(cli.quiet);
        assert!(Cli::try_parse_from(["blobsync", "-l", "-q", "-v"]).is_err());
    }
}
