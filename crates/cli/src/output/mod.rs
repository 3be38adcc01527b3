//! Console output helpers

mod formatter;

pub use formatter::Formatter;

/// Output behavior shared by all commands
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Suppress everything except errors
    pub quiet: bool,
    /// Disable ANSI styling
    pub no_color: bool,
}
