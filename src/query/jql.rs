use crate::month::ReportMonth;

/// The tuple of filters identifying one count to fetch.
///
/// `release_type` and `release_window` are mutually exclusive. The
/// constructors below only ever set one of them; if a hand-built selector
/// carries both, `release_type` takes precedence in the generated filter.
#[derive(Debug, Clone)]
pub struct Selector {
    pub project_key: String,
    pub issue_type: String,
    pub release_type: Option<String>,
    pub release_window: Option<String>,
}

impl Selector {
    /// Filter on issue type only.
    pub fn issue_type(project_key: &str, issue_type: &str) -> Self {
        Self {
            project_key: project_key.to_string(),
            issue_type: issue_type.to_string(),
            release_type: None,
            release_window: None,
        }
    }

    /// Filter on a release type ("Major", "Minor", ...).
    pub fn release_type(project_key: &str, issue_type: &str, release_type: &str) -> Self {
        Self {
            release_type: Some(release_type.to_string()),
            ..Self::issue_type(project_key, issue_type)
        }
    }

    /// Filter on a release window ("Planned"/"Unplanned").
    pub fn release_window(project_key: &str, issue_type: &str, release_window: &str) -> Self {
        Self {
            release_window: Some(release_window.to_string()),
            ..Self::issue_type(project_key, issue_type)
        }
    }
}

/// Build the JQL filter expression for one selector.
///
/// The base predicates are always present: released fix versions for the
/// project, the issue type, and a resolution date inside the report month
/// (half-open, so `[first of month, first of next month)`). Exactly one of
/// the release type / release window predicates is appended when set.
///
/// Values are substituted verbatim; the config layer restricts them to a
/// character allowlist at load time.
pub fn build_jql(selector: &Selector, month: &ReportMonth) -> String {
    let mut jql = format!(
        "fixversion in releasedVersions(\"{}\") AND issuetype in ({}) AND (resolved >= \"{}\" AND resolved < \"{}\")",
        selector.project_key,
        selector.issue_type,
        month.start().format("%Y-%m-%d"),
        month.end_exclusive().format("%Y-%m-%d"),
    );

    if let Some(release_type) = &selector.release_type {
        if selector.release_window.is_some() {
            log::warn!(
                "selector for {} sets both release type and release window; keeping release type",
                selector.project_key
            );
        }
        jql.push_str(&format!(
            " AND \"Release Type[Dropdown]\" = \"{release_type}\""
        ));
    } else if let Some(release_window) = &selector.release_window {
        jql.push_str(&format!(
            " AND \"Release Window[Dropdown]\" = \"{release_window}\""
        ));
    }

    jql
}

#[cfg(test)]
mod tests {
    use super::*;

    fn august() -> ReportMonth {
        ReportMonth::new(2026, 8).unwrap()
    }

    #[test]
    fn test_base_query() {
        let selector = Selector::issue_type("ENG", "Bug");
        let jql = build_jql(&selector, &august());
        assert_eq!(
            jql,
            "fixversion in releasedVersions(\"ENG\") AND issuetype in (Bug) \
             AND (resolved >= \"2026-08-01\" AND resolved < \"2026-09-01\")"
        );
    }

    #[test]
    fn test_release_type_predicate() {
        let selector = Selector::release_type("ENG", "Release", "Major");
        let jql = build_jql(&selector, &august());
        assert!(jql.contains("\"Release Type[Dropdown]\" = \"Major\""));
        assert!(!jql.contains("Release Window[Dropdown]"));
    }

    #[test]
    fn test_release_window_predicate() {
        let selector = Selector::release_window("ENG", "Release", "Planned");
        let jql = build_jql(&selector, &august());
        assert!(jql.contains("\"Release Window[Dropdown]\" = \"Planned\""));
        assert!(!jql.contains("Release Type[Dropdown]"));
    }

    #[test]
    fn test_release_type_wins_when_both_set() {
        let mut selector = Selector::release_type("ENG", "Release", "Major");
        selector.release_window = Some("Planned".to_string());
        let jql = build_jql(&selector, &august());
        assert!(jql.contains("\"Release Type[Dropdown]\" = \"Major\""));
        assert!(!jql.contains("Release Window[Dropdown]"));
    }

    #[test]
    fn test_month_window_december() {
        let selector = Selector::issue_type("ENG", "Story");
        let jql = build_jql(&selector, &ReportMonth::new(2025, 12).unwrap());
        assert!(jql.contains("resolved >= \"2025-12-01\""));
        assert!(jql.contains("resolved < \"2026-01-01\""));
    }
}
