//! Shell-side state and worker events.

use crate::provider::Provider;

/// Result of a background provider request, delivered to the UI thread over
/// an mpsc channel. Whichever event arrives last wins; there is no
/// cancellation of in-flight requests.
pub enum RequestEvent {
    /// The provider answered.
    Completed { provider: Provider, answer: String },
    /// The request failed (validation happened before dispatch, so this is
    /// encoding, transport or a provider-side error).
    Failed(String),
}
