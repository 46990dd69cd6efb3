use std::{
    env,
    fmt::Display,
    future::Future,
    sync::OnceLock,
    time::{Duration, Instant},
};

use tracing::{Instrument, Span};

const DEBUG_DELAY_ENV: &str = "DYNAVIEW_DEBUG_DYNAMO_DELAY_MS";

/// Sends one DynamoDB request inside `span`, logging how long it took and,
/// on failure, the error as rendered by `describe_err`.
pub async fn send_dynamo_request<F, Fut, T, E, D, M>(
    span: Span,
    send: F,
    describe_err: D,
) -> Result<T, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    D: FnOnce(&E) -> M,
    M: Display,
{
    async move {
        debug_dynamo_delay().await;
        let started = Instant::now();
        let result = send().await;
        let elapsed_ms = started.elapsed().as_millis();
        match &result {
            Ok(_) => tracing::trace!(elapsed_ms, "request ok"),
            Err(err) => {
                let message = describe_err(err);
                tracing::trace!(elapsed_ms, error = %message, "request failed");
            }
        }
        result
    }
    .instrument(span)
    .await
}

async fn debug_dynamo_delay() {
    if let Some(delay) = debug_dynamo_delay_duration() {
        tracing::trace!(
            delay_ms = delay.as_millis(),
            "Applying debug DynamoDB delay"
        );
        tokio::time::sleep(delay).await;
    }
}

fn debug_dynamo_delay_duration() -> Option<Duration> {
    static DELAY: OnceLock<Option<Duration>> = OnceLock::new();
    *DELAY.get_or_init(|| parse_delay(env::var(DEBUG_DELAY_ENV).ok().as_deref()))
}

fn parse_delay(raw: Option<&str>) -> Option<Duration> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<u64>() {
        Ok(0) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            tracing::warn!(
                env = DEBUG_DELAY_ENV,
                value = %raw,
                "Invalid DynamoDB debug delay"
            );
            None
        }
    }
}
