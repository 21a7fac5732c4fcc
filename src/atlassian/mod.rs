pub mod confluence;
pub mod jira;

pub use confluence::ConfluenceClient;
pub use jira::JiraClient;

use std::time::Duration;

use reqwest::StatusCode;

use crate::error::{Error, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(Error::from)
}

/// Map an unsuccessful response status onto the error taxonomy:
/// credential rejections are authentication errors, everything else is a
/// transport error.
pub(crate) fn status_error(context: &str, status: StatusCode) -> Error {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        Error::Authentication(format!("{context}: HTTP {status}"))
    } else {
        Error::Transport(format!("{context}: HTTP {status}"))
    }
}
