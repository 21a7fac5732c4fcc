pub mod types;

pub use types::*;

use std::future::Future;

use crate::config::{ProjectEntry, QueryFilters};
use crate::error::Result;
use crate::month::ReportMonth;
use crate::query::{build_jql, Selector};

/// Issue type used for the release-type and release-window queries.
const RELEASE_ISSUE_TYPE: &str = "Release";

/// Narrow interface to the issue tracker: one filter expression in, one
/// total match count out.
pub trait IssueQueryService {
    fn issue_count(&self, jql: &str) -> impl Future<Output = Result<u64>>;
}

/// Run the full cartesian set of selectors for every configured project
/// and assemble the per-project count maps.
///
/// One request per (project, category) pair, issued sequentially. A failed
/// lookup is logged and recorded as [`Count::Missing`] so the rest of the
/// report still comes out; this function itself never fails.
pub async fn collect_release_metrics<S: IssueQueryService>(
    service: &S,
    projects: &[ProjectEntry],
    filters: &QueryFilters,
    month: &ReportMonth,
) -> MetricsReport {
    let mut report = MetricsReport::default();

    for project in projects {
        log::info!("collecting metrics for {} ({})", project.key, month);
        let mut metrics = ProjectMetrics::new(&project.key);

        for release_type in &filters.release_types {
            let selector = Selector::release_type(&project.key, RELEASE_ISSUE_TYPE, release_type);
            let count = fetch_count(service, &selector, month).await;
            metrics.release_type.push(release_type.clone(), count);
        }

        for release_window in &filters.release_windows {
            let selector =
                Selector::release_window(&project.key, RELEASE_ISSUE_TYPE, release_window);
            let count = fetch_count(service, &selector, month).await;
            metrics.release_window.push(release_window.clone(), count);
        }

        for issue_type in &filters.issue_types {
            let selector = Selector::issue_type(&project.key, issue_type);
            let count = fetch_count(service, &selector, month).await;
            metrics.issue_type.push(display_issue_label(issue_type), count);
        }

        report.projects.push(metrics);
    }

    report
}

async fn fetch_count<S: IssueQueryService>(
    service: &S,
    selector: &Selector,
    month: &ReportMonth,
) -> Count {
    let jql = build_jql(selector, month);
    log::debug!("counting issues: {jql}");
    match service.issue_count(&jql).await {
        Ok(total) => Count::Observed(total),
        Err(e) => {
            log::warn!("count failed for {} [{jql}]: {e}", selector.project_key);
            Count::Missing
        }
    }
}

/// The `Empty` issue type is a catch-all in Jira; the report shows it as
/// `Other`. Every other label passes through unchanged.
fn display_issue_label(issue_type: &str) -> String {
    if issue_type == "Empty" {
        "Other".to_string()
    } else {
        issue_type.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::sync::Mutex;

    struct FnService<F>(F);

    impl<F: Fn(&str) -> Result<u64>> IssueQueryService for FnService<F> {
        async fn issue_count(&self, jql: &str) -> Result<u64> {
            (self.0)(jql)
        }
    }

    struct RecordingService {
        jqls: Mutex<Vec<String>>,
    }

    impl IssueQueryService for RecordingService {
        async fn issue_count(&self, jql: &str) -> Result<u64> {
            self.jqls.lock().unwrap().push(jql.to_string());
            Ok(1)
        }
    }

    fn filters() -> QueryFilters {
        QueryFilters {
            issue_types: vec!["Bug".into(), "Story".into(), "Empty".into()],
            release_types: vec!["Major".into(), "Minor".into(), "Patch".into()],
            release_windows: vec!["Planned".into(), "Unplanned".into()],
        }
    }

    fn projects() -> Vec<ProjectEntry> {
        vec![
            ProjectEntry {
                key: "ENG".into(),
                name: "Engine".into(),
            },
            ProjectEntry {
                key: "UI".into(),
                name: "Interface".into(),
            },
        ]
    }

    fn month() -> ReportMonth {
        ReportMonth::new(2026, 8).unwrap()
    }

    #[tokio::test]
    async fn test_aggregation_shape_and_order() {
        let service = FnService(|_: &str| Ok(2));
        let report = collect_release_metrics(&service, &projects(), &filters(), &month()).await;

        assert_eq!(report.projects.len(), 2);
        let eng = report.project("ENG").unwrap();
        let release_labels: Vec<&str> = eng.release_type.labels().collect();
        assert_eq!(release_labels, ["Major", "Minor", "Patch"]);
        let window_labels: Vec<&str> = eng.release_window.labels().collect();
        assert_eq!(window_labels, ["Planned", "Unplanned"]);
        assert_eq!(eng.release_type.get("Major"), Some(Count::Observed(2)));
    }

    #[tokio::test]
    async fn test_empty_issue_type_shown_as_other() {
        let service = FnService(|_: &str| Ok(0));
        let report = collect_release_metrics(&service, &projects(), &filters(), &month()).await;

        let eng = report.project("ENG").unwrap();
        let labels: Vec<&str> = eng.issue_type.labels().collect();
        assert_eq!(labels, ["Bug", "Story", "Other"]);
        assert!(eng.issue_type.get("Empty").is_none());
    }

    #[tokio::test]
    async fn test_release_queries_use_release_issue_type() {
        let service = RecordingService {
            jqls: Mutex::new(Vec::new()),
        };
        collect_release_metrics(&service, &projects()[..1], &filters(), &month()).await;

        let jqls = service.jqls.into_inner().unwrap();
        // 3 release types + 2 windows + 3 issue types
        assert_eq!(jqls.len(), 8);
        for jql in &jqls[..5] {
            assert!(jql.contains("issuetype in (Release)"), "{jql}");
        }
        // The Empty issue type is queried as Empty, only displayed as Other
        assert!(jqls[7].contains("issuetype in (Empty)"));
    }

    #[tokio::test]
    async fn test_failed_lookup_is_sentinel_and_run_continues() {
        let service = FnService(|jql: &str| {
            if jql.contains("releasedVersions(\"ENG\")") && jql.contains("\"Minor\"") {
                Err(Error::Transport("connection reset".into()))
            } else {
                Ok(4)
            }
        });
        let report = collect_release_metrics(&service, &projects(), &filters(), &month()).await;

        let eng = report.project("ENG").unwrap();
        assert_eq!(eng.release_type.get("Minor"), Some(Count::Missing));
        assert_eq!(eng.release_type.get("Major"), Some(Count::Observed(4)));
        assert_eq!(eng.release_type.get("Patch"), Some(Count::Observed(4)));

        // Remaining projects are unaffected
        let ui = report.project("UI").unwrap();
        assert_eq!(ui.release_type.get("Minor"), Some(Count::Observed(4)));
        assert_eq!(ui.issue_type.entries.len(), 3);
    }
}
