use std::future::Future;

use crate::error::Result;
use crate::month::ReportMonth;
use crate::table::ReportTables;

/// Narrow interface to the wiki service the finished report is published
/// on. Pages are addressed by title within a space; the id only matters
/// for updates.
pub trait ReportPublisher {
    fn page_exists(&self, title: &str, space: &str) -> impl Future<Output = Result<bool>>;
    fn page_id_by_title(&self, title: &str, space: &str) -> impl Future<Output = Result<String>>;
    fn create_page(
        &self,
        space: &str,
        title: &str,
        body_html: &str,
        parent_id: &str,
    ) -> impl Future<Output = Result<()>>;
    fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body_html: &str,
    ) -> impl Future<Output = Result<()>>;
}

/// Title of the monthly report page, e.g. "2026 - August Release Metrics".
pub fn page_title(month: &ReportMonth) -> String {
    format!("{} - {} Release Metrics", month.year(), month.name())
}

/// Render the full page body: the optional intro fragment, then one
/// `<h2>` heading per summary table followed by its HTML rendering.
pub fn render_report(tables: &ReportTables, intro_html: Option<&str>) -> String {
    let mut html = String::new();
    if let Some(intro) = intro_html {
        html.push_str(intro);
    }
    for table in &tables.tables {
        html.push_str(&format!("<h2>{}</h2>", table.heading));
        html.push_str(&table.to_html());
    }
    html
}

/// Upsert the monthly page: update in place when it already exists,
/// otherwise create it under the configured parent page. The body is
/// rendered in full before this is called, so a failure leaves the target
/// page untouched rather than half-written.
pub async fn publish_report<P: ReportPublisher>(
    publisher: &P,
    space: &str,
    parent_page_id: &str,
    title: &str,
    body_html: &str,
) -> Result<()> {
    if publisher.page_exists(title, space).await? {
        let page_id = publisher.page_id_by_title(title, space).await?;
        log::info!("monthly page already exists ({page_id}); updating");
        publisher.update_page(&page_id, title, body_html).await
    } else {
        log::info!("monthly page {title:?} does not exist; creating it");
        publisher
            .create_page(space, title, body_html, parent_page_id)
            .await
    }
}
