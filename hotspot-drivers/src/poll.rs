use hotspot_common::READINESS_MARKERS;
use std::future::Future;
use std::time::Duration;

/// True once the statistics payload shows up in `source`.
pub fn has_readiness_marker(source: &str) -> bool {
    READINESS_MARKERS.iter().any(|m| source.contains(m))
}

/// Re-read the page every `step` until a readiness marker appears or
/// `max_wait` of polling has been spent.
///
/// The budget counts sleeps, not wall time, so a slow `read` does not cut the
/// number of attempts short. Always returns the last source read, whether or
/// not a marker was seen.
///
/// ```
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// use hotspot_drivers::poll_for_markers;
/// use std::time::Duration;
///
/// let html = poll_for_markers(
///     || async { Ok::<_, std::convert::Infallible>(r#"{"lineItems":[]}"#.to_string()) },
///     Duration::from_millis(800),
///     Duration::from_millis(400),
/// )
/// .await
/// .unwrap();
/// assert!(html.contains("lineItems"));
/// # }
/// ```
pub async fn poll_for_markers<F, Fut, E>(
    mut read: F,
    max_wait: Duration,
    step: Duration,
) -> Result<String, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    let mut elapsed = Duration::ZERO;
    let mut polls = 0u32;
    loop {
        let source = read().await?;
        polls += 1;
        if has_readiness_marker(&source) {
            tracing::debug!(polls, elapsed_ms = elapsed.as_millis() as u64, "browser.markers.found");
            return Ok(source);
        }
        if elapsed >= max_wait || step.is_zero() {
            tracing::debug!(polls, "browser.markers.timeout");
            return Ok(source);
        }
        tokio::time::sleep(step).await;
        elapsed += step;
    }
}
