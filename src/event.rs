mod github;

pub(crate) use github::{PullRequestEvent, PullRequestEventAction};

/// Decode a queue message body into an opened pull request event.
///
/// Hooks of other types share the topic, so anything that does not parse as a
/// pull request hook, or is not an `opened` action, yields `None` rather than an error.
pub(crate) fn decode(body: &[u8]) -> Option<PullRequestEvent> {
    let event = match serde_json::from_slice::<PullRequestEvent>(body) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!("Error parsing hook: {e}");
            return None;
        }
    };
    if event.action != PullRequestEventAction::Opened {
        tracing::debug!(pr = event.number, action = ?event.action, "Skipping non-opened PR hook");
        return None;
    }
    Some(event)
}
