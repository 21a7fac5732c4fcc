use serde::Serialize;

use crate::config::ProjectEntry;
use crate::metrics::{CategoryGroup, MetricsReport};

pub const TOTAL_LABEL: &str = "Total";

/// The three report sections, in render order, with their page headings.
pub const REPORT_GROUPS: [(CategoryGroup, &str); 3] = [
    (CategoryGroup::ReleaseType, "Release Metrics"),
    (CategoryGroup::ReleaseWindow, "Planned/Unplanned Releases"),
    (CategoryGroup::IssueType, "Story/Bug Breakdown"),
];

/// One cross-tabulated summary table, already in render orientation:
/// category labels down the side, projects across the top, `Total` as the
/// final row and column.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryTable {
    pub group: CategoryGroup,
    pub heading: String,
    /// Column headers: project display names, then `Total`.
    pub columns: Vec<String>,
    /// One row per category label, then the `Total` row.
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub label: String,
    pub cells: Vec<u64>,
}

impl SummaryTable {
    /// Look up a single cell by row label and column header.
    pub fn cell(&self, row_label: &str, column: &str) -> Option<u64> {
        let col = self.columns.iter().position(|c| c == column)?;
        let row = self.rows.iter().find(|r| r.label == row_label)?;
        row.cells.get(col).copied()
    }

    /// The bottom-right `Total`/`Total` cell.
    pub fn grand_total(&self) -> Option<u64> {
        self.cell(TOTAL_LABEL, TOTAL_LABEL)
    }

    /// Render as an HTML table, storage-format friendly. All text content
    /// is escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::from("<table><thead><tr><th></th>");
        for column in &self.columns {
            out.push_str(&format!("<th>{}</th>", html_escape(column)));
        }
        out.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            out.push_str(&format!("<tr><th>{}</th>", html_escape(&row.label)));
            for cell in &row.cells {
                out.push_str(&format!("<td>{cell}</td>"));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");
        out
    }

    /// Render as aligned plain text for terminal output.
    pub fn to_text(&self) -> String {
        let mut widths: Vec<usize> = Vec::with_capacity(self.columns.len() + 1);
        let label_width = self.rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
        widths.push(label_width);
        for (i, column) in self.columns.iter().enumerate() {
            let cell_width = self
                .rows
                .iter()
                .filter_map(|r| r.cells.get(i))
                .map(|c| c.to_string().len())
                .max()
                .unwrap_or(0);
            widths.push(column.len().max(cell_width));
        }

        let mut out = format!("{}\n", self.heading);
        out.push_str(&format!("{:w$}", "", w = widths[0]));
        for (i, column) in self.columns.iter().enumerate() {
            out.push_str(&format!("  {:>w$}", column, w = widths[i + 1]));
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&format!("{:w$}", row.label, w = widths[0]));
            for (i, cell) in row.cells.iter().enumerate() {
                out.push_str(&format!("  {:>w$}", cell, w = widths[i + 1]));
            }
            out.push('\n');
        }
        out
    }
}

/// The three summary tables for one report run, in render order.
#[derive(Debug, Clone, Serialize)]
pub struct ReportTables {
    pub tables: Vec<SummaryTable>,
}

impl ReportTables {
    pub fn get(&self, group: CategoryGroup) -> &SummaryTable {
        self.tables
            .iter()
            .find(|t| t.group == group)
            .expect("all report groups are always built")
    }
}

/// Cross-tabulate the collected metrics into the three summary tables.
pub fn build_report_tables(projects: &[ProjectEntry], report: &MetricsReport) -> ReportTables {
    let tables = REPORT_GROUPS
        .iter()
        .map(|(group, heading)| build_summary_table(*group, heading, projects, report))
        .collect();
    ReportTables { tables }
}

/// Build one table: union the labels seen across all projects for the
/// group (first-seen order), fill per-project cells (0 where a project
/// never saw the label), then append the `Total` row and column. The grid
/// is produced directly in transposed orientation — labels as rows,
/// projects as columns.
fn build_summary_table(
    group: CategoryGroup,
    heading: &str,
    projects: &[ProjectEntry],
    report: &MetricsReport,
) -> SummaryTable {
    let mut columns: Vec<String> = projects.iter().map(|p| p.name.clone()).collect();
    columns.push(TOTAL_LABEL.to_string());

    if projects.is_empty() {
        return SummaryTable {
            group,
            heading: heading.to_string(),
            columns,
            rows: Vec::new(),
        };
    }

    let mut labels: Vec<String> = Vec::new();
    for project in projects {
        if let Some(metrics) = report.project(&project.key) {
            for label in metrics.group(group).labels() {
                if !labels.iter().any(|l| l == label) {
                    labels.push(label.to_string());
                }
            }
        }
    }

    let mut rows: Vec<TableRow> = Vec::with_capacity(labels.len() + 1);
    let mut column_totals = vec![0u64; projects.len()];
    for label in &labels {
        let mut cells = Vec::with_capacity(projects.len() + 1);
        let mut row_total = 0u64;
        for (i, project) in projects.iter().enumerate() {
            let value = report
                .project(&project.key)
                .and_then(|m| m.group(group).get(label))
                .map_or(0, |c| c.as_u64());
            column_totals[i] += value;
            row_total += value;
            cells.push(value);
        }
        cells.push(row_total);
        rows.push(TableRow {
            label: label.clone(),
            cells,
        });
    }

    let grand_total = column_totals.iter().sum();
    let mut total_cells = column_totals;
    total_cells.push(grand_total);
    rows.push(TableRow {
        label: TOTAL_LABEL.to_string(),
        cells: total_cells,
    });

    SummaryTable {
        group,
        heading: heading.to_string(),
        columns,
        rows,
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
