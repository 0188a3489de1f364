use serde_json::Value;

use crate::webhooks::github::events::{str_field, Common, ReportError};

pub(super) fn report(payload: &Value) -> Result<Option<String>, ReportError> {
    let title = str_field(payload, "/issue/title")?;
    let Common { user, repo } = Common::from_payload(payload)?;

    let message = match str_field(payload, "/action")? {
        "opened" => format!(r#"New issue "{}" opened by {} in {}."#, title, user, repo),
        "reopened" => format!(r#"Issue "{}" reopened by {} in {}."#, title, user, repo),
        "closed" => format!(r#"Issue "{}" closed by {} in {}."#, title, user, repo),
        _ => return Ok(None),
    };

    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload(action: &str) -> Value {
        json!({
            "action": action,
            "issue": { "title": "Bug", "number": 42 },
            "sender": { "login": "alice" },
            "repository": { "name": "repo", "full_name": "org/repo" },
        })
    }

    #[test]
    fn opened() {
        assert_eq!(
            report(&payload("opened")).unwrap().as_deref(),
            Some(r#"New issue "Bug" opened by alice in org/repo."#)
        );
    }

    #[test]
    fn reopened() {
        assert_eq!(
            report(&payload("reopened")).unwrap().as_deref(),
            Some(r#"Issue "Bug" reopened by alice in org/repo."#)
        );
    }

    #[test]
    fn closed() {
        assert_eq!(
            report(&payload("closed")).unwrap().as_deref(),
            Some(r#"Issue "Bug" closed by alice in org/repo."#)
        );
    }

    #[test]
    fn other_actions_are_silent() {
        for action in &["labeled", "assigned", "edited", "deleted", "Opened"] {
            assert_eq!(report(&payload(action)), Ok(None), "action {}", action);
        }
    }

    #[test]
    fn missing_fields() {
        let mut no_title = payload("opened");
        no_title["issue"].as_object_mut().unwrap().remove("title");
        assert_eq!(
            report(&no_title),
            Err(ReportError::MissingField("/issue/title"))
        );

        let mut no_sender = payload("opened");
        no_sender.as_object_mut().unwrap().remove("sender");
        assert_eq!(
            report(&no_sender),
            Err(ReportError::MissingField("/sender/login"))
        );

        let mut no_repo = payload("closed");
        no_repo["repository"]
            .as_object_mut()
            .unwrap()
            .remove("full_name");
        assert_eq!(
            report(&no_repo),
            Err(ReportError::MissingField("/repository/full_name"))
        );
    }
}
