//! Per-model cost table (spec.md §4.6, §9 open question). Grounded on the
//! original analyzer's simplified per-1k blended rate; rates are blended
//! input/output averages, not split rates, matching the original.

/// USD per 1,000 tokens, blended input/output. Unknown model ids fall back
/// to the gpt-3.5-turbo rate, matching the original's default branch; the
/// cost numbers should be rebuilt from whichever provider is actually in
/// use (spec.md §9's open question).
fn cost_per_1k_tokens(model_id: &str) -> f64 {
    match model_id {
        "gpt-4o" => 0.010,
        "gpt-4o-mini" => 0.000_375,
        "gpt-3.5-turbo" => 0.001,
        _ => 0.001,
    }
}

/// Estimate the USD cost of one completion call.
pub fn estimate_cost(model_id: &str, total_tokens: u32) -> f64 {
    (total_tokens as f64 / 1000.0) * cost_per_1k_tokens(model_id)
}

/// A running (tokens, cost) total, kept per Scorer instance (spec.md §4.6).
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageTotals {
    pub total_tokens: u64,
    pub total_cost_usd: f64,
}

impl UsageTotals {
    pub fn record(&mut self, model_id: &str, tokens: u32) {
        self.total_tokens += tokens as u64;
        self.total_cost_usd += estimate_cost(model_id, tokens);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_model_uses_its_own_rate() {
        assert_eq!(estimate_cost("gpt-4o-mini", 1000), 0.000_375);
    }

    #[test]
    fn unknown_model_falls_back_to_gpt35_rate() {
        assert_eq!(estimate_cost("some-other-providers-model", 1000), 0.001);
    }

    #[test]
    fn usage_totals_accumulate() {
        let mut totals = UsageTotals::default();
        totals.record("gpt-4o-mini", 500);
        totals.record("gpt-4o-mini", 500);
        assert_eq!(totals.total_tokens, 1000);
        assert!((totals.total_cost_usd - 0.000_375).abs() < 1e-9);
    }
}
