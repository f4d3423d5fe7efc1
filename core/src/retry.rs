// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use crate::{Context, Result};
use log::warn;
use std::fmt::{self, Debug};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Backoff is a bounded retry policy: a maximum number of attempts and a
/// function giving the delay to wait after a failed attempt.
///
/// Sleeping goes through [`Context::sleep`], so tests can run the policy
/// against a fake clock.
#[derive(Clone)]
pub struct Backoff {
    max_attempts: usize,
    delay: Arc<dyn Fn(usize) -> Duration + Send + Sync>,
}

impl Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backoff")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl Default for Backoff {
    /// 10 attempts, waiting `attempt * 10s` after each failed attempt.
    fn default() -> Self {
        Self::new(10, |attempt| Duration::from_secs(10 * attempt as u64))
    }
}

impl Backoff {
    /// Create a policy from a maximum attempt count and a delay function.
    ///
    /// The delay function receives the 1-based number of the attempt that
    /// just failed. At least one attempt is always made.
    pub fn new(
        max_attempts: usize,
        delay: impl Fn(usize) -> Duration + Send + Sync + 'static,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay: Arc::new(delay),
        }
    }

    /// Same delay after every failed attempt.
    pub fn fixed(max_attempts: usize, delay: Duration) -> Self {
        Self::new(max_attempts, move |_| delay)
    }

    /// Try exactly once.
    pub fn never() -> Self {
        Self::fixed(1, Duration::ZERO)
    }

    /// Maximum number of attempts.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Delay to wait after the given failed attempt.
    pub fn delay(&self, attempt: usize) -> Duration {
        (self.delay)(attempt)
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// `op` receives the 1-based attempt number. Only errors for which
    /// [`crate::Error::is_retryable`] holds are retried, others are returned at once.
    /// When attempts run out the last error is returned.
    pub async fn retry<T, F, Fut>(&self, ctx: &Context, mut op: F) -> Result<T>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            let err = match op(attempt).await {
                Ok(v) => return Ok(v),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= self.max_attempts {
                return Err(err);
            }

            let delay = self.delay(attempt);
            warn!(
                "attempt {attempt}/{} failed, retrying in {delay:?}: {err}",
                self.max_attempts
            );
            ctx.sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind, ServiceError, Sleep};
    use async_trait::async_trait;
    use http::StatusCode;
    use std::sync::Mutex;

    #[derive(Debug, Default, Clone)]
    struct RecordingSleep(Arc<Mutex<Vec<Duration>>>);

    #[async_trait]
    impl Sleep for RecordingSleep {
        async fn sleep(&self, dur: Duration) {
            self.0.lock().expect("lock must not be poisoned").push(dur);
        }
    }

    impl RecordingSleep {
        fn slept(&self) -> Vec<Duration> {
            self.0.lock().expect("lock must not be poisoned").clone()
        }
    }

    #[test]
    fn test_default_delay_increases() {
        let backoff = Backoff::default();
        assert_eq!(backoff.max_attempts(), 10);
        assert_eq!(backoff.delay(1), Duration::from_secs(10));
        assert_eq!(backoff.delay(9), Duration::from_secs(90));
    }

    #[tokio::test]
    async fn test_retry_until_success() -> anyhow::Result<()> {
        let _ = env_logger::builder().is_test(true).try_init();

        let clock = RecordingSleep::default();
        let ctx = Context::new().with_sleep(clock.clone());

        let got = Backoff::default()
            .retry(&ctx, |attempt| async move {
                if attempt < 3 {
                    Err(Error::transport("connection reset"))
                } else {
                    Ok(attempt)
                }
            })
            .await?;

        assert_eq!(got, 3);
        assert_eq!(
            clock.slept(),
            vec![Duration::from_secs(10), Duration::from_secs(20)]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let clock = RecordingSleep::default();
        let ctx = Context::new().with_sleep(clock.clone());

        let err = Backoff::fixed(4, Duration::from_millis(5))
            .retry(&ctx, |attempt| async move {
                Err::<(), _>(Error::transport(format!("attempt {attempt}")))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "transport error: attempt 4");
        assert_eq!(clock.slept().len(), 3);
    }

    #[tokio::test]
    async fn test_validation_error_not_retried() {
        let clock = RecordingSleep::default();
        let ctx = Context::new().with_sleep(clock.clone());

        let err = Backoff::default()
            .retry(&ctx, |_| async { Err::<(), _>(Error::validation("bad input")) })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(clock.slept().is_empty());
    }

    #[tokio::test]
    async fn test_client_side_protocol_error_not_retried() {
        let clock = RecordingSleep::default();
        let ctx = Context::new().with_sleep(clock.clone());

        let err = Backoff::default()
            .retry(&ctx, |_| async {
                Err::<(), _>(Error::protocol(ServiceError {
                    status: StatusCode::NOT_FOUND,
                    code: "NoSuchKey".to_string(),
                    ..Default::default()
                }))
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert!(clock.slept().is_empty());
    }
}
