pub mod atlassian;
pub mod config;
pub mod error;
pub mod metrics;
pub mod month;
pub mod query;
pub mod report;
pub mod table;

pub use atlassian::{ConfluenceClient, JiraClient};
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use metrics::{
    collect_release_metrics, CategoryGroup, Count, IssueQueryService, MetricsReport,
};
pub use month::ReportMonth;
pub use query::{build_jql, Selector};
pub use report::{page_title, publish_report, render_report, ReportPublisher};
pub use table::{build_report_tables, ReportTables, SummaryTable};

/// Main entry point: one monthly reporting run, wired together from the
/// loaded configuration, an issue query service, and a report publisher.
pub struct Reporter<S, P> {
    config: Config,
    month: ReportMonth,
    service: S,
    publisher: P,
}

impl Reporter<JiraClient, ConfluenceClient> {
    /// Build a reporter backed by the real Jira and Confluence clients,
    /// with credentials resolved from the configured environment
    /// variables.
    pub fn from_config(config: Config, month: ReportMonth) -> Result<Self> {
        let credentials = Credentials::from_env(&config.atlassian)?;
        let service = JiraClient::new(&config.atlassian.url, credentials.clone())?;
        let publisher = ConfluenceClient::new(&config.atlassian.url, credentials)?;
        Ok(Self::new(config, month, service, publisher))
    }

    /// Verify the Jira credentials. Called before any counting so a bad
    /// token aborts the run up front.
    pub async fn authenticate(&self) -> Result<()> {
        self.service.authenticate().await
    }

    /// Verify credentials against both services without touching any
    /// data.
    pub async fn check(&self) -> Result<()> {
        self.service.authenticate().await?;
        self.publisher.authenticate().await?;
        Ok(())
    }

    /// Full run: authenticate, collect, tabulate, render, publish.
    pub async fn run(&self) -> Result<()> {
        self.authenticate().await?;
        let metrics = self.collect().await;
        let tables = self.tabulate(&metrics);
        let html = self.render(&tables);
        self.publish(&html).await
    }
}

impl<S: IssueQueryService, P: ReportPublisher> Reporter<S, P> {
    pub fn new(config: Config, month: ReportMonth, service: S, publisher: P) -> Self {
        Self {
            config,
            month,
            service,
            publisher,
        }
    }

    pub fn month(&self) -> &ReportMonth {
        &self.month
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Collect every configured count for the report month.
    pub async fn collect(&self) -> MetricsReport {
        collect_release_metrics(
            &self.service,
            &self.config.projects,
            &self.config.filters,
            &self.month,
        )
        .await
    }

    /// Cross-tabulate collected metrics into the three summary tables.
    pub fn tabulate(&self, metrics: &MetricsReport) -> ReportTables {
        build_report_tables(&self.config.projects, metrics)
    }

    /// Render the full page body.
    pub fn render(&self, tables: &ReportTables) -> String {
        render_report(tables, self.config.atlassian.intro_html.as_deref())
    }

    /// Publish the rendered document, upserting this month's page.
    pub async fn publish(&self, body_html: &str) -> Result<()> {
        let title = page_title(&self.month);
        publish_report(
            &self.publisher,
            &self.config.atlassian.space,
            &self.config.atlassian.parent_page_id,
            &title,
            body_html,
        )
        .await
    }
}
