use serde::{Serialize, Serializer};

/// A single fetched count, or a sentinel for a lookup that failed.
///
/// A missing count renders as 0 in tables but stays distinguishable so a
/// partially failed run is visible in logs and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Observed(u64),
    Missing,
}

impl Count {
    /// Numeric value used in tables; a missing count contributes 0.
    pub fn as_u64(self) -> u64 {
        match self {
            Count::Observed(n) => n,
            Count::Missing => 0,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Count::Missing)
    }
}

impl Serialize for Count {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Count::Observed(n) => serializer.serialize_u64(*n),
            Count::Missing => serializer.serialize_none(),
        }
    }
}

/// One of the three report dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CategoryGroup {
    ReleaseType,
    ReleaseWindow,
    IssueType,
}

/// Ordered label/count pairs for one category group. Backed by a `Vec`
/// because the configured enumeration order determines table row order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryCounts {
    pub entries: Vec<CountEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountEntry {
    pub label: String,
    pub count: Count,
}

impl CategoryCounts {
    pub fn push(&mut self, label: impl Into<String>, count: Count) {
        self.entries.push(CountEntry {
            label: label.into(),
            count,
        });
    }

    pub fn get(&self, label: &str) -> Option<Count> {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map(|e| e.count)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }
}

/// All counts collected for one project during an aggregation pass.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMetrics {
    pub project_key: String,
    pub release_type: CategoryCounts,
    pub release_window: CategoryCounts,
    pub issue_type: CategoryCounts,
}

impl ProjectMetrics {
    pub fn new(project_key: &str) -> Self {
        Self {
            project_key: project_key.to_string(),
            release_type: CategoryCounts::default(),
            release_window: CategoryCounts::default(),
            issue_type: CategoryCounts::default(),
        }
    }

    pub fn group(&self, group: CategoryGroup) -> &CategoryCounts {
        match group {
            CategoryGroup::ReleaseType => &self.release_type,
            CategoryGroup::ReleaseWindow => &self.release_window,
            CategoryGroup::IssueType => &self.issue_type,
        }
    }
}

/// Counts for every configured project. Built fresh per run and discarded
/// once the tables are rendered.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsReport {
    pub projects: Vec<ProjectMetrics>,
}

impl MetricsReport {
    pub fn project(&self, key: &str) -> Option<&ProjectMetrics> {
        self.projects.iter().find(|p| p.project_key == key)
    }
}
