//! Startup banner and session summary display.

use crate::consts::{AUTHOR, REPO, format_number};
use crate::engine::SessionStats;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub endpoint: &'a str,
    pub transcript: &'a str,
    pub bindings: usize,
}

pub fn banner_text(info: &BannerInfo) -> String {
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║             H A N G L E               ║
   ║   a REPL, tunneled over plain HTTP    ║
   ╚═══════════════════════════════════════╝

   version     {}
   by          {}
   repo        {}
   endpoint    {}
   transcript  {}
   bindings    {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        REPO,
        info.endpoint,
        info.transcript,
        info.bindings,
    )
}

/// Print the startup banner with session info.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", banner_text(info));
}

pub fn summary_text(stats: SessionStats) -> String {
    let mut out = String::new();
    if stats.turns > 0 {
        out.push_str(&format!(
            "session: {} turns, {} evaluated ({} failed), {} described, {} keepalives\n",
            format_number(stats.turns),
            format_number(stats.evaluations),
            format_number(stats.errors),
            format_number(stats.describes),
            format_number(stats.keepalives),
        ));
    }
    out.push_str("goodbye.");
    out
}

/// Print the session summary and farewell.
pub fn print_session_summary(stats: SessionStats) {
    println!("{}", summary_text(stats));
}
