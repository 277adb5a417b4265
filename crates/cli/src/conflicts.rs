//! Tabular rendering of merge conflicts and merge options.

use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

use codecommit_core::conflict::ConflictMetadata;
use codecommit_core::results::{GetMergeConflictsResult, GetMergeOptionsResult};
use codecommit_core::MergeOption;

use crate::style;

fn side<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string())
}

fn operations(metadata: &ConflictMetadata) -> String {
    let ops = &metadata.merge_operations;
    format!("{} / {}", side(ops.source), side(ops.destination))
}

/// Build the conflict table. One row per file.
pub fn conflict_table(list: &[ConflictMetadata]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        "File", "Conflicts", "Content", "Mode", "Type", "Binary", "Ops (src/dst)",
    ]);

    for m in list {
        table.add_row(vec![
            Cell::new(truncate(&m.file_path, 60)),
            Cell::new(m.number_of_conflicts),
            Cell::new(style::flag(m.content_conflict)),
            Cell::new(style::flag(m.file_mode_conflict)),
            Cell::new(style::flag(m.object_type_conflict)),
            Cell::new(style::flag(m.is_binary_file.any())),
            Cell::new(operations(m)),
        ]);
    }
    table
}

pub fn print_conflicts(result: &GetMergeConflictsResult) {
    println!();
    if result.mergeable {
        println!("{}", style::done("Mergeable without conflicts"));
    } else {
        println!(
            "{}",
            style::title(&format!(
                "Conflicting files ({})",
                result.conflict_metadata_list.len()
            ))
        );
    }
    println!(
        "{}",
        style::note(&format!(
            "source {}  destination {}  base {}",
            side(result.source_commit_id.as_deref()),
            side(result.destination_commit_id.as_deref()),
            side(result.base_commit_id.as_deref()),
        ))
    );
    println!();

    if !result.conflict_metadata_list.is_empty() {
        println!("{}", conflict_table(&result.conflict_metadata_list));
        println!();
    }

    for (m, err) in result.inconsistent_metadata() {
        println!("{}", style::inconsistent(&m.file_path, &err.to_string()));
    }
    if let Some(ref token) = result.next_token {
        println!(
            "{}",
            style::note(&format!("More results available (next token: {})", token))
        );
    }
}

pub fn print_options(result: &GetMergeOptionsResult) {
    println!();
    println!("{}", style::title("Merge options"));
    println!();
    for option in MergeOption::ALL {
        println!("  {}", style::option_row(*option, result.supports(*option)));
    }
    println!();
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codecommit_core::enums::ChangeType;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a/very/long/path.rs", 10), "a/very/...");
        assert_eq!(truncate("ééééé", 4), "é...");
    }

    #[test]
    fn test_conflict_table_has_one_row_per_file() {
        let mut m = ConflictMetadata {
            file_path: "src/lib.rs".into(),
            number_of_conflicts: 1,
            content_conflict: true,
            ..Default::default()
        };
        m.merge_operations.source = Some(ChangeType::Modified);
        let table = conflict_table(&[m.clone(), m]);
        assert_eq!(table.row_iter().count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("src/lib.rs"));
        assert!(rendered.contains("M / —"));
    }
}
