use serde_json::Value;

use crate::webhooks::github::events::{bool_field, str_field, Common, ReportError};

pub(super) fn report(payload: &Value) -> Result<Option<String>, ReportError> {
    let title = str_field(payload, "/pull_request/title")?;
    let Common { user, repo } = Common::from_payload(payload)?;

    let message = match str_field(payload, "/action")? {
        "opened" => format!(r#"Pull request "{}" opened by {} in {}."#, title, user, repo),
        "reopened" => format!(
            r#"Pull request "{}" reopened by {} in {}."#,
            title, user, repo
        ),
        "closed" => {
            let merged = if bool_field(payload, "/pull_request/merged")? {
                ""
            } else {
                "not "
            };
            format!(
                r#"Pull request "{}" closed and {}merged by {} in {}."#,
                title, merged, user, repo
            )
        }
        _ => return Ok(None),
    };

    Ok(Some(message))
}
