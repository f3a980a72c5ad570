//! Porcelain parsing, dirty summaries and the status table.

use std::time::SystemTime;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRecord {
    pub code: String,
    pub path: String,
}

impl ChangeRecord {
    pub fn kind(&self) -> ChangeKind {
        classify_change(&self.code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Untracked,
    Added,
    Deleted,
    Renamed,
}

impl ChangeKind {
    /// Summary order.
    const ALL: [ChangeKind; 5] = [
        ChangeKind::Modified,
        ChangeKind::Untracked,
        ChangeKind::Added,
        ChangeKind::Deleted,
        ChangeKind::Renamed,
    ];

    pub fn symbol(self) -> char {
        match self {
            ChangeKind::Modified => 'M',
            ChangeKind::Untracked => '?',
            ChangeKind::Added => 'A',
            ChangeKind::Deleted => 'D',
            ChangeKind::Renamed => 'R',
        }
    }
}

const RENAME_SEPARATOR: &str = " -> ";

pub fn parse_porcelain(text: &str) -> Vec<ChangeRecord> {
    text.lines()
        .filter(|line| line.len() >= 3)
        .filter_map(|line| {
            let code = line.get(..2)?;
            let path = match line.split_once(RENAME_SEPARATOR) {
                Some((_, new_name)) => new_name,
                None => line.get(3..)?,
            };
            Some(ChangeRecord {
                code: code.to_string(),
                path: path.to_string(),
            })
        })
        .collect()
}

/// First match wins: `?`, `R`, `A`, `D`, then modified.
pub fn classify_change(code: &str) -> ChangeKind {
    if code.contains('?') {
        ChangeKind::Untracked
    } else if code.contains('R') {
        ChangeKind::Renamed
    } else if code.contains('A') {
        ChangeKind::Added
    } else if code.contains('D') {
        ChangeKind::Deleted
    } else {
        ChangeKind::Modified
    }
}

pub fn summarize_dirty(porcelain: &str) -> String {
    let records = parse_porcelain(porcelain);
    ChangeKind::ALL
        .iter()
        .filter_map(|&kind| {
            let count = records.iter().filter(|r| r.kind() == kind).count();
            (count > 0).then(|| format!("{}{}", count, kind.symbol()))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchStatus {
    pub repo: String,
    pub branch: String,
    pub dirty: String,
    pub remote: String,
    pub last_commit: String,
    pub last_modified: String,
}

impl BranchStatus {
    fn cells(&self) -> [&str; 6] {
        [
            &self.repo,
            &self.branch,
            &self.dirty,
            &self.remote,
            &self.last_commit,
            &self.last_modified,
        ]
    }
}

const HEADERS: [&str; 6] = ["Repo", "Branch", "Dirty", "Remote", "LastCommit", "LastModified"];
const COLUMN_GAP: &str = "  ";

pub fn render(rows: &[BranchStatus]) -> String {
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row.cells()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: [&str; 6]| -> String {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        padded.join(COLUMN_GAP).trim_end().to_string()
    };

    let mut out = format_line(HEADERS);
    out.push('\n');
    for row in rows {
        out.push_str(&format_line(row.cells()));
        out.push('\n');
    }
    out
}

/// Position of a branch relative to its upstream, e.g. `↑3 origin/feat`.
pub fn remote_marker(upstream: Option<&str>, ahead: u32, behind: u32) -> String {
    let Some(upstream) = upstream else {
        return "-".to_string();
    };
    let arrows = match (ahead, behind) {
        (0, 0) => "≡".to_string(),
        (a, 0) => format!("↑{a}"),
        (0, b) => format!("↓{b}"),
        (a, b) => format!("↑{a}↓{b}"),
    };
    format!("{arrows} {upstream}")
}

pub fn format_time_ago(time: Option<SystemTime>) -> String {
    let Some(time) = time else {
        return "unknown".to_string();
    };
    let Ok(duration) = time.elapsed() else {
        return "unknown".to_string();
    };
    let secs = duration.as_secs();
    if secs < 60 {
        return "just now".to_string();
    }
    let mins = secs / 60;
    if mins < 60 {
        return format!("{}m ago", mins);
    }
    let hours = mins / 60;
    if hours < 24 {
        return format!("{}h ago", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d ago", days);
    }
    let months = days / 30;
    format!("{}mo ago", months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parse_empty() {
        assert!(parse_porcelain("").is_empty());
    }

    #[test]
    fn parse_modified() {
        let changes = parse_porcelain(" M file.go");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].code, " M");
        assert_eq!(changes[0].path, "file.go");
        assert_eq!(changes[0].kind(), ChangeKind::Modified);
    }

    #[test]
    fn parse_rename_keeps_new_name() {
        let changes = parse_porcelain("R  old.go -> new.go");
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].code, "R ");
        assert_eq!(changes[0].path, "new.go");
        assert_eq!(changes[0].kind(), ChangeKind::Renamed);
    }

    #[test]
    fn parse_multiple_preserves_order() {
        let input = " M file1.go\n?? file2.txt\nA  file3.go\n D file4.go";
        let changes = parse_porcelain(input);
        let expected = [
            (" M", "file1.go", ChangeKind::Modified),
            ("??", "file2.txt", ChangeKind::Untracked),
            ("A ", "file3.go", ChangeKind::Added),
            (" D", "file4.go", ChangeKind::Deleted),
        ];
        assert_eq!(changes.len(), expected.len());
        for (change, (code, path, kind)) in changes.iter().zip(expected) {
            assert_eq!(change.code, code);
            assert_eq!(change.path, path);
            assert_eq!(change.kind(), kind);
        }
    }

    #[test]
    fn parse_skips_blank_and_short_lines() {
        let changes = parse_porcelain("\n M a.rs\n\nxy\n?? b.rs\n");
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[1].path, "b.rs");
    }

    #[test]
    fn classify_codes() {
        assert_eq!(classify_change("??"), ChangeKind::Untracked);
        assert_eq!(classify_change("R "), ChangeKind::Renamed);
        assert_eq!(classify_change("A "), ChangeKind::Added);
        assert_eq!(classify_change(" D"), ChangeKind::Deleted);
        assert_eq!(classify_change("D "), ChangeKind::Deleted);
        assert_eq!(classify_change(" M"), ChangeKind::Modified);
        assert_eq!(classify_change("MM"), ChangeKind::Modified);
    }

    #[test]
    fn classify_precedence_for_combined_flags() {
        assert_eq!(classify_change("RM"), ChangeKind::Renamed);
        assert_eq!(classify_change("AD"), ChangeKind::Added);
    }

    #[test]
    fn summarize_clean() {
        assert_eq!(summarize_dirty(""), "");
    }

    #[test]
    fn summarize_single_kinds() {
        assert_eq!(summarize_dirty(" M file.txt"), "1M");
        assert_eq!(summarize_dirty("?? newfile.txt"), "1?");
    }

    #[test]
    fn summarize_mixed() {
        let result = summarize_dirty(" M file1.go\n?? file2.txt\nA  file3.go\n D file4.go");
        for token in ["1M", "1?", "1A", "1D"] {
            assert!(result.split(' ').any(|t| t == token), "missing {token} in {result:?}");
        }
        assert!(!result.contains('R'));
    }

    #[test]
    fn summarize_counts_repeats() {
        assert_eq!(summarize_dirty(" M a\nMM b\n?? c"), "2M 1?");
    }

    fn sample_rows() -> Vec<BranchStatus> {
        vec![
            BranchStatus {
                repo: "eng/repos/myrepo".to_string(),
                branch: "main".to_string(),
                dirty: "clean".to_string(),
                remote: "≡ origin/main".to_string(),
                last_commit: "2 days ago".to_string(),
                last_modified: "2d ago".to_string(),
            },
            BranchStatus {
                repo: "eng/repos/myrepo".to_string(),
                branch: "feature-x".to_string(),
                dirty: "2M 1?".to_string(),
                remote: "↑3 origin/feature-x".to_string(),
                last_commit: "1 hour ago".to_string(),
                last_modified: "1h ago".to_string(),
            },
        ]
    }

    #[test]
    fn render_has_header_and_rows() {
        let output = render(&sample_rows());
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Repo"));
        assert!(lines[0].contains("LastModified"));
        assert!(lines[2].contains("feature-x"));
        assert!(output.contains("myrepo"));
    }

    #[test]
    fn render_aligns_columns() {
        let output = render(&sample_rows());
        let lines: Vec<&str> = output.lines().collect();
        // byte offsets differ once a row holds `≡`/`↑`, so compare char columns
        let col = |line: &str, needle: &str| line.find(needle).map(|b| line[..b].chars().count());
        let header_branch = col(lines[0], "Branch").unwrap();
        let row_branch = col(lines[2], "feature-x").unwrap();
        assert_eq!(header_branch, row_branch);
        let header_last = col(lines[0], "LastCommit").unwrap();
        let row_last = col(lines[2], "1 hour ago").unwrap();
        assert_eq!(header_last, row_last);
    }

    #[test]
    fn render_empty_is_header_only() {
        let output = render(&[]);
        assert_eq!(output.lines().count(), 1);
        assert_eq!(
            output.trim_end(),
            "Repo  Branch  Dirty  Remote  LastCommit  LastModified"
        );
    }

    #[test]
    fn remote_markers() {
        assert_eq!(remote_marker(None, 0, 0), "-");
        assert_eq!(remote_marker(Some("origin/main"), 0, 0), "≡ origin/main");
        assert_eq!(remote_marker(Some("origin/f"), 3, 0), "↑3 origin/f");
        assert_eq!(remote_marker(Some("origin/f"), 0, 2), "↓2 origin/f");
        assert_eq!(remote_marker(Some("origin/f"), 1, 4), "↑1↓4 origin/f");
    }

    #[test]
    fn time_ago_buckets() {
        let now = SystemTime::now();
        assert_eq!(format_time_ago(None), "unknown");
        assert_eq!(format_time_ago(Some(now)), "just now");
        assert_eq!(
            format_time_ago(Some(now - Duration::from_secs(5 * 60 + 5))),
            "5m ago"
        );
        assert_eq!(
            format_time_ago(Some(now - Duration::from_secs(3 * 3600 + 5))),
            "3h ago"
        );
        assert_eq!(
            format_time_ago(Some(now - Duration::from_secs(4 * 86400 + 5))),
            "4d ago"
        );
        assert_eq!(
            format_time_ago(Some(now - Duration::from_secs(65 * 86400))),
            "2mo ago"
        );
    }

    #[test]
    fn time_in_future_is_unknown() {
        let later = SystemTime::now() + Duration::from_secs(3600);
        assert_eq!(format_time_ago(Some(later)), "unknown");
    }
}
