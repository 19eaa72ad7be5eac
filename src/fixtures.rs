//! Webhook payloads shared by tests.

pub(crate) const PR_OPENED: &str = include_str!("fixtures/pull_request_opened.json");
pub(crate) const PUSH: &str = include_str!("fixtures/push.json");

/// [`PR_OPENED`] with its `action` and title replaced.
pub(crate) fn pr_hook(action: &str, title: &str) -> String {
    let mut hook: serde_json::Value = serde_json::from_str(PR_OPENED).unwrap();
    hook["action"] = action.into();
    hook["pull_request"]["title"] = title.into();
    hook.to_string()
}
