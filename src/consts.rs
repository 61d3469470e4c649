//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Connect timeout for the tunnel endpoint when none is given.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Log filter used when neither `HANGLE_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_LOG_FILTER: &str = "hangle=info";

/// Passing this as the transcript path keeps turns in memory only.
pub const EPHEMERAL_DB: &str = ":memory:";

/// Default transcript database: `~/.hangle/hangle.db`, or `hangle.db`
/// in the working directory when there is no home directory.
pub fn default_db_path() -> PathBuf {
    match dirs::home_dir() {
        Some(home) => home.join(".hangle").join("hangle.db"),
        None => PathBuf::from("hangle.db"),
    }
}

/// Format a count with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            out.push(',');
        }
        out.push(c);
    }
    out
}
