//! Attempt tracking for resolution diagnostics.

use crate::models::Symbol;

/// Outcome of one provider attempt during a resolution pass.
#[derive(Clone, Debug)]
pub enum AttemptOutcome {
    /// The provider call succeeded and newly resolved this many symbols.
    Resolved { count: usize },

    /// The provider was skipped without a network call (missing credentials).
    Skipped { reason: String },

    /// The provider call failed; it contributed nothing this pass.
    Failed { error: String },
}

/// Record of a single provider attempt.
#[derive(Clone, Debug)]
pub struct ProviderAttempt {
    pub provider_id: &'static str,
    pub outcome: AttemptOutcome,
}

/// Detailed result of one resolution pass.
///
/// Providers never attempted (because earlier providers resolved everything)
/// simply have no attempt entry. `unresolved` lists the symbols that were
/// written as zero-quote placeholders; it is the caller-visible signal that
/// distinguishes "this asset trades at zero" from "every lookup failed".
#[derive(Clone, Debug, Default)]
pub struct ResolutionDiagnostics {
    pub attempts: Vec<ProviderAttempt>,
    pub unresolved: Vec<Symbol>,
}

impl ResolutionDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_resolved(&mut self, provider_id: &'static str, count: usize) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Resolved { count },
        });
    }

    pub(crate) fn record_skip(&mut self, provider_id: &'static str, reason: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Skipped { reason },
        });
    }

    pub(crate) fn record_failure(&mut self, provider_id: &'static str, error: String) {
        self.attempts.push(ProviderAttempt {
            provider_id,
            outcome: AttemptOutcome::Failed { error },
        });
    }

    /// True if any symbol fell through every provider.
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.attempts
            .iter()
            .map(|attempt| match &attempt.outcome {
                AttemptOutcome::Resolved { count } => {
                    format!("{}: {} resolved", attempt.provider_id, count)
                }
                AttemptOutcome::Skipped { reason } => {
                    format!("{}: SKIPPED ({})", attempt.provider_id, reason)
                }
                AttemptOutcome::Failed { error } => {
                    format!("{}: FAILED ({})", attempt.provider_id, error)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = ResolutionDiagnostics::new();
        diag.record_resolved("COINGECKO", 2);
        diag.record_skip("COINMARKETCAP", "Missing credentials: COINMARKETCAP".to_string());
        diag.record_failure("CRYPTOCOMPARE", "HTTP 502: CRYPTOCOMPARE".to_string());

        let summary = diag.summary();
        assert!(summary.contains("COINGECKO: 2 resolved"));
        assert!(summary.contains("COINMARKETCAP: SKIPPED"));
        assert!(summary.contains("CRYPTOCOMPARE: FAILED"));
    }

    #[test]
    fn test_has_unresolved() {
        let mut diag = ResolutionDiagnostics::new();
        assert!(!diag.has_unresolved());

        diag.unresolved.push(Symbol::new("ZZZ"));
        assert!(diag.has_unresolved());
    }
}
