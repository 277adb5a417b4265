//! Shared styling utilities for terminal output.

use console::Style;

use codecommit_core::{ConflictResolutionStrategy, MergeOption};

/// Completed action: a green `done` tag before the message.
pub fn done(msg: &str) -> String {
    format!("{} {}", Style::new().green().bold().apply_to("done"), msg)
}

/// Fatal error line, prefixed `error:` in red.
pub fn failure(msg: &str) -> String {
    format!("{} {}", Style::new().red().bold().apply_to("error:"), msg)
}

/// Conflict metadata the service reported in an impossible shape.
pub fn inconsistent(path: &str, detail: &str) -> String {
    format!(
        "{} {} {}",
        Style::new().yellow().apply_to("inconsistent"),
        Style::new().bold().apply_to(path),
        detail
    )
}

/// Section title above a table or list.
pub fn title(msg: &str) -> String {
    Style::new().bold().underlined().apply_to(msg).to_string()
}

/// Secondary detail such as commit ids or paging hints.
pub fn note(msg: &str) -> String {
    Style::new().dim().apply_to(msg).to_string()
}

/// Merge option label, colored by whether it creates a merge commit.
pub fn merge_option(option: MergeOption) -> String {
    let style = if option.creates_merge_commit() {
        Style::new().cyan()
    } else {
        Style::new().green()
    };
    style.apply_to(option.as_str()).to_string()
}

/// Strategy label; anything other than `NONE` resolves on its own.
pub fn strategy(strategy: ConflictResolutionStrategy) -> String {
    let style = match strategy {
        ConflictResolutionStrategy::None => Style::new().dim(),
        ConflictResolutionStrategy::Automerge => Style::new().magenta().bold(),
        _ => Style::new().blue(),
    };
    style.apply_to(strategy.as_str()).to_string()
}

/// A yes/no cell: conflicts in red, clean in dim.
pub fn flag(set: bool) -> String {
    if set {
        Style::new().red().apply_to("yes").to_string()
    } else {
        Style::new().dim().apply_to("-").to_string()
    }
}

/// One line of the merge options list: a filled marker for options the
/// service offers, a hollow one for the rest.
pub fn option_row(option: MergeOption, available: bool) -> String {
    if available {
        format!("{} {}", Style::new().green().apply_to("●"), merge_option(option))
    } else {
        format!(
            "{} {}",
            Style::new().dim().apply_to("○"),
            Style::new().dim().apply_to(format!("{} (unavailable)", option.as_str()))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_keep_their_text() {
        console::set_colors_enabled(false);
        assert_eq!(done("sent"), "done sent");
        assert_eq!(failure("boom"), "error: boom");
        assert_eq!(inconsistent("a.txt", "zero count"), "inconsistent a.txt zero count");
        assert_eq!(
            option_row(MergeOption::Squash, false),
            "○ SQUASH_MERGE (unavailable)"
        );
        assert_eq!(option_row(MergeOption::ThreeWay, true), "● THREE_WAY_MERGE");
    }
}
