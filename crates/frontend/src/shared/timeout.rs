use gloo_timers::future::TimeoutFuture;

/// Resolves after `millis` milliseconds; cannot be cancelled
pub async fn async_timeout(millis: u32) {
    TimeoutFuture::new(millis).await;
}
