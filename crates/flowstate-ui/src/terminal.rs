//! Terminal detection.

use std::env;

/// Returns `true` if stdout is connected to a terminal.
pub fn is_tty() -> bool {
    crossterm::tty::IsTty::is_tty(&std::io::stdout())
}

/// Terminal width in columns, 80 when it cannot be detected.
pub fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(cols, _rows)| cols as usize)
        .unwrap_or(80)
}

/// Whether ANSI colors should be emitted.
///
/// `NO_COLOR` (any value), `CLICOLOR=0` and `TERM=dumb` disable color;
/// `CLICOLOR_FORCE` enables it off a TTY. Otherwise color follows TTY
/// detection.
pub fn supports_color() -> bool {
    color_decision(
        env::var_os("NO_COLOR").is_some(),
        env::var("CLICOLOR").ok().as_deref(),
        env::var("TERM").ok().as_deref(),
        env::var_os("CLICOLOR_FORCE").is_some(),
        is_tty(),
    )
}

fn color_decision(
    no_color: bool,
    clicolor: Option<&str>,
    term: Option<&str>,
    force: bool,
    tty: bool,
) -> bool {
    if no_color || clicolor == Some("0") || term == Some("dumb") {
        return false;
    }
    force || tty
}
