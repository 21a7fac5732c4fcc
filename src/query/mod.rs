pub mod jql;

pub use jql::{build_jql, Selector};
