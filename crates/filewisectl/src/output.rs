//! Terminal rendering
//!
//! Pure `format_*` functions build plain text; the `print_*` wrappers add
//! color. Tests only look at the plain text.

use filewise_common::speech::VOICES;
use filewise_common::{Outcome, OutcomeKind};
use filewise_shared::templates::Template;
use filewise_shared::{DirectoryEntry, Snapshot, SnapshotSummary};
use owo_colors::OwoColorize;

const TABLE_HEADERS: [&str; 8] = [
    "Name", "Type", "Size", "Owner", "Created", "Modified", "Hidden", "ReadOnly",
];

/// Print a routed outcome, colored by how it went
pub fn print_outcome(outcome: &Outcome) {
    match outcome.kind {
        OutcomeKind::Created | OutcomeKind::Deleted => println!("{}", outcome.message.green()),
        OutcomeKind::Protected | OutcomeKind::NotFound => println!("{}", outcome.message.yellow()),
        OutcomeKind::CreateFailed | OutcomeKind::DeleteFailed => {
            println!("{}", outcome.message.red())
        }
        OutcomeKind::Fallback => println!("{}", outcome.message.dimmed()),
        OutcomeKind::Answer => println!("{}", outcome.message),
    }
}

pub fn print_warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// `1234567` → `1,234,567`
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

pub fn format_summary(summary: &SnapshotSummary) -> String {
    format!(
        "Total Files: {}   Directories: {}   Regular Files: {}   Hidden Items: {}",
        summary.total, summary.directories, summary.files, summary.hidden
    )
}

fn table_row(entry: &DirectoryEntry) -> [String; 8] {
    let flag = |set: bool| (if set { "yes" } else { "" }).to_string();
    [
        entry.name.clone(),
        entry.kind.to_string(),
        if entry.is_file() {
            group_thousands(entry.size)
        } else {
            "N/A".to_string()
        },
        entry.owner_short().to_string(),
        entry.created.clone(),
        entry.modified.clone(),
        flag(entry.attributes.hidden),
        flag(entry.attributes.readonly),
    ]
}

/// Column-aligned file table
pub fn format_table(entries: &[DirectoryEntry]) -> String {
    let rows: Vec<[String; 8]> = entries.iter().map(table_row).collect();

    let mut widths: Vec<usize> = TABLE_HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![render(TABLE_HEADERS.to_vec())];
    for row in &rows {
        lines.push(render(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Summary line plus table, or a notice for an empty directory
pub fn format_listing(snapshot: &Snapshot) -> String {
    if snapshot.is_empty() {
        return "No files found in current directory".to_string();
    }
    format!(
        "{}\n\n{}",
        format_summary(&snapshot.summary()),
        format_table(snapshot.entries())
    )
}

pub fn print_listing(snapshot: &Snapshot, source: &str) {
    println!(
        "{} {} {}",
        "Directory snapshot".cyan().bold(),
        "from".dimmed(),
        source.dimmed()
    );
    println!(
        "{}",
        format!(
            "captured {}",
            snapshot.captured_at().format("%Y-%m-%d %H:%M:%S")
        )
        .dimmed()
    );
    println!();
    println!("{}", format_listing(snapshot));
}

pub fn format_templates() -> String {
    Template::ALL
        .iter()
        .map(|t| format!("{:<8} {}", t.key(), t.label()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_voices(default_voice: &str) -> String {
    VOICES
        .iter()
        .map(|v| {
            let marker = if v.id.eq_ignore_ascii_case(default_voice) { "*" } else { " " };
            format!("{} {:<18} {}", marker, v.id, v.label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
