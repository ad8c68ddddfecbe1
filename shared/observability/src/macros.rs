//! Convenience macros for common logging patterns in the pipeline.
//!
//! These macros provide consistent logging for the concerns this crate
//! actually has: timed pipeline stages, external service calls (upstream
//! browser automation, the reasoning service), Store retries, and per-item
//! failures absorbed locally per spec.md §7's propagation policy.

/// Log a timed operation (measures and logs duration).
#[macro_export]
macro_rules! log_timed {
    ($name:expr, $block:expr) => {{
        let start = std::time::Instant::now();
        let result = $block;
        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(target: "timing", operation = $name, duration_ms = duration_ms, "stage completed");
        result
    }};
}

/// Log an external service call (upstream archive or reasoning service).
#[macro_export]
macro_rules! log_external_call {
    ($service:expr, $endpoint:expr) => {
        tracing::debug!(target: "external", service = $service, endpoint = $endpoint, "calling external service");
    };
    ($service:expr, $endpoint:expr, $duration_ms:expr, $status:expr) => {
        tracing::info!(target: "external", service = $service, endpoint = $endpoint, duration_ms = $duration_ms, status = $status, "external call completed");
    };
}

/// Log a Store retry (§4.2/§7: one retry, then promote the search to failed).
#[macro_export]
macro_rules! log_retry {
    ($operation:expr, $attempt:expr, $max_attempts:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, "retrying operation");
    };
    ($operation:expr, $attempt:expr, $max_attempts:expr, $error:expr) => {
        tracing::warn!(target: "retry", operation = $operation, attempt = $attempt, max_attempts = $max_attempts, error = %$error, "retrying after error");
    };
}

/// Log a per-item failure absorbed locally (per-page / per-message skip).
#[macro_export]
macro_rules! log_item_skipped {
    ($kind:expr, $id:expr, $reason:expr) => {
        tracing::warn!(target: "skip", kind = $kind, id = %$id, reason = %$reason, "skipping item after local failure");
    };
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_macros_compile() {
        log_external_call!("reasoning", "chat/completions");
        log_external_call!("reasoning", "chat/completions", 120u64, "ok");

        log_retry!("upsert_message", 1, 2);
        log_retry!("upsert_message", 2, 2, "connection reset");

        log_item_skipped!("message", "21777803", "timeout waiting for container");

        let doubled = log_timed!("double", { 21 * 2 });
        assert_eq!(doubled, 42);
    }
}
