//! Command implementations, one module per operation

pub mod backup;
pub mod clean;
pub mod delete;
pub mod list;
pub mod restore;

use blobsync_core::Error;
use indicatif::{ProgressBar, ProgressStyle};

use crate::exit_code::ExitCode;
use crate::output::Formatter;

/// Map an engine error to the process exit code
pub(crate) fn exit_for(error: &Error) -> ExitCode {
    match error {
        Error::NotFound(_) => ExitCode::NotFound,
        Error::Network(_) => ExitCode::NetworkError,
        Error::Config(_) => ExitCode::UsageError,
        Error::Io(_) => ExitCode::GeneralError,
    }
}

/// Spinner counting completed items; None in quiet mode
pub(crate) fn progress_spinner(formatter: &Formatter, message: &'static str) -> Option<ProgressBar> {
    if formatter.is_quiet() {
        return None;
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}: {pos} item(s) processed")
            .expect("Valid template"),
    );
    pb.set_message(message);
    Some(pb)
}
