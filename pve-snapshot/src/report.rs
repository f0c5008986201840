//! The JSON document a query invocation prints.

use serde::Serialize;

use crate::query::QueryOutcome;

/// `changed` is always false: listing snapshots never touches the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleReport {
    pub changed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<String>>,
}

impl From<QueryOutcome> for ModuleReport {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Listed(names) => ModuleReport {
                changed: false,
                msg: None,
                results: Some(names),
            },
            QueryOutcome::Empty(reason) => ModuleReport {
                changed: false,
                msg: Some(reason.message().to_string()),
                results: None,
            },
        }
    }
}
