/// Classification for a failed provider call.
///
/// Used to determine how the chain reacts to an error from one provider.
///
/// # Behavior Summary
///
/// | Class | Try Next Provider? | Log Level |
/// |-------|-------------------|-----------|
/// | `QuietSkip` | Yes | debug |
/// | `Transport` | Yes | warn |
/// | `BadData` | Yes | warn |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The provider is not configured (missing credential).
    ///
    /// This is an expected deployment state, not a fault: the provider is
    /// skipped without a network call and without alarming log output.
    QuietSkip,

    /// The call itself failed: network error, timeout, rate limit, or a
    /// non-success HTTP status. The provider contributes nothing this round.
    Transport,

    /// The call completed but the response body was unusable. Treated the
    /// same as a transport failure for chain progression, kept distinct for
    /// observability.
    BadData,
}
