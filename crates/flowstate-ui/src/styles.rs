//! Colors and icons for flowctl output.
//!
//! Palette is Ayu Dark. Only states that need attention get a color:
//! `ready` is highlighted, `blocked` is muted, `done` is green.

use flowstate_core::{JobStatus, StepStatus};
use owo_colors::OwoColorize;

use crate::terminal::supports_color;

const PASS: (u8, u8, u8) = (0xc2, 0xd9, 0x4c); // #c2d94c
const WARN: (u8, u8, u8) = (0xff, 0xb4, 0x54); // #ffb454
const FAIL: (u8, u8, u8) = (0xf0, 0x71, 0x78); // #f07178
const MUTED: (u8, u8, u8) = (0x6c, 0x76, 0x80); // #6c7680
const ACCENT: (u8, u8, u8) = (0x59, 0xc2, 0xff); // #59c2ff

pub const STATUS_ICON_BLOCKED: &str = "\u{25CB}"; // hollow circle
pub const STATUS_ICON_READY: &str = "\u{25D0}"; // half circle
pub const STATUS_ICON_DONE: &str = "\u{2713}"; // check mark

pub const ICON_PASS: &str = "\u{2713}";
pub const ICON_FAIL: &str = "\u{2716}";
pub const ICON_AUTOMATED: &str = "\u{2699}"; // gear

pub const TREE_BRANCH: &str = "\u{251C}\u{2500} ";
pub const TREE_LAST: &str = "\u{2514}\u{2500} ";

fn paint(s: &str, rgb: (u8, u8, u8), color: bool) -> String {
    if color {
        s.truecolor(rgb.0, rgb.1, rgb.2).to_string()
    } else {
        s.to_string()
    }
}

fn color_str(s: &str, rgb: (u8, u8, u8)) -> String {
    paint(s, rgb, supports_color())
}

pub fn render_pass(s: &str) -> String {
    color_str(s, PASS)
}

pub fn render_warn(s: &str) -> String {
    color_str(s, WARN)
}

pub fn render_fail(s: &str) -> String {
    color_str(s, FAIL)
}

pub fn render_muted(s: &str) -> String {
    color_str(s, MUTED)
}

pub fn render_accent(s: &str) -> String {
    color_str(s, ACCENT)
}

pub fn render_bold(s: &str) -> String {
    if supports_color() {
        s.bold().to_string()
    } else {
        s.to_string()
    }
}

/// Section header: uppercase, bold, accent color.
pub fn render_category(s: &str) -> String {
    let upper = s.to_uppercase();
    if supports_color() {
        upper.truecolor(ACCENT.0, ACCENT.1, ACCENT.2).bold().to_string()
    } else {
        upper
    }
}

pub fn status_icon(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Blocked => STATUS_ICON_BLOCKED,
        StepStatus::Ready => STATUS_ICON_READY,
        StepStatus::Done => STATUS_ICON_DONE,
    }
}

fn status_color(status: StepStatus) -> (u8, u8, u8) {
    match status {
        StepStatus::Blocked => MUTED,
        StepStatus::Ready => WARN,
        StepStatus::Done => PASS,
    }
}

/// Icon and status name, colored by status.
pub fn render_status(status: StepStatus) -> String {
    render_status_with(status, supports_color())
}

fn render_status_with(status: StepStatus, color: bool) -> String {
    let label = format!("{} {:<7}", status_icon(status), status.as_str());
    paint(&label, status_color(status), color)
}

pub fn render_job_status(status: JobStatus) -> String {
    match status {
        JobStatus::Queued => render_warn(status.as_str()),
        JobStatus::Finished => render_pass(status.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_status_is_padded() {
        assert_eq!(render_status_with(StepStatus::Done, false), "\u{2713} done   ");
        assert_eq!(render_status_with(StepStatus::Blocked, false), "\u{25CB} blocked");
    }

    #[test]
    fn colored_status_keeps_the_label() {
        let painted = render_status_with(StepStatus::Ready, true);
        assert!(painted.contains("ready"));
        assert!(painted.starts_with("\u{1b}["));
    }

    #[test]
    fn every_status_has_a_distinct_icon() {
        let icons: std::collections::HashSet<_> =
            StepStatus::ALL.iter().map(|s| status_icon(*s)).collect();
        assert_eq!(icons.len(), StepStatus::ALL.len());
    }
}
