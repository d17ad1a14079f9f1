//! Retry and fallback wrapper shared by every generative capability.
//!
//! A call is attempted once, then re-attempted up to `retries` more times with
//! the prompt passed through `mutate` before each retry. There is no delay
//! between attempts. [`resilient`] additionally swaps any final failure for a
//! fixed fallback value so callers never see an error.

use super::backend::OracleError;
use std::future::Future;

/// How a failed call may be re-attempted.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts allowed after the first one.
    pub retries: u32,
    /// Rewrites the prompt before each retry.
    pub mutate: fn(&str) -> String,
}

impl RetryPolicy {
    /// One attempt, no retry.
    pub const SINGLE_ATTEMPT: RetryPolicy = RetryPolicy {
        retries: 0,
        mutate: unchanged,
    };

    pub fn new(retries: u32, mutate: fn(&str) -> String) -> Self {
        Self { retries, mutate }
    }
}

fn unchanged(prompt: &str) -> String {
    prompt.to_string()
}

/// Run `call` under `policy`, returning the last error if every attempt fails.
pub async fn retrying<T, F, Fut>(
    operation: &str,
    prompt: String,
    policy: RetryPolicy,
    mut call: F,
) -> Result<T, OracleError>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    let mut prompt = prompt;
    let mut remaining = policy.retries;
    let mut attempt = 1;

    loop {
        match call(prompt.clone()).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(operation, attempt, "generation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if remaining > 0 => {
                tracing::warn!(
                    operation,
                    attempt,
                    remaining,
                    error = %e,
                    "generation failed, retrying with adjusted prompt"
                );
                prompt = (policy.mutate)(&prompt);
                remaining -= 1;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Run `call` under `policy` and substitute `fallback()` on final failure.
pub async fn resilient<T, F, Fut>(
    operation: &str,
    prompt: String,
    policy: RetryPolicy,
    call: F,
    fallback: impl FnOnce() -> T,
) -> T
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<T, OracleError>>,
{
    match retrying(operation, prompt, policy, call).await {
        Ok(value) => value,
        Err(e) => {
            tracing::error!(operation, error = %e, "generation failed, using fallback");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn shout(prompt: &str) -> String {
        format!("{prompt}!")
    }

    #[tokio::test]
    async fn test_first_success_skips_retry() {
        let seen = Mutex::new(Vec::new());
        let result = retrying("test", "a".to_string(), RetryPolicy::new(3, shout), |p| {
            seen.lock().unwrap().push(p.clone());
            async move { Ok::<_, OracleError>(p) }
        })
        .await;

        assert_eq!(result.unwrap(), "a");
        assert_eq!(seen.into_inner().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_retry_mutates_prompt() {
        let seen = Mutex::new(Vec::new());
        let result: Result<(), _> =
            retrying("test", "a".to_string(), RetryPolicy::new(2, shout), |p| {
                seen.lock().unwrap().push(p);
                async { Err(OracleError::NoImage) }
            })
            .await;

        assert!(matches!(result, Err(OracleError::NoImage)));
        assert_eq!(seen.into_inner().unwrap(), vec!["a", "a!", "a!!"]);
    }

    #[tokio::test]
    async fn test_succeeds_on_retry() {
        let seen = Mutex::new(Vec::new());
        let result = retrying("test", "a".to_string(), RetryPolicy::new(1, shout), |p| {
            seen.lock().unwrap().push(p.clone());
            async move {
                if p.ends_with('!') {
                    Ok(p)
                } else {
                    Err(OracleError::NoImage)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "a!");
        assert_eq!(seen.into_inner().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_single_attempt_falls_back() {
        let calls = Mutex::new(0);
        let value = resilient(
            "test",
            "a".to_string(),
            RetryPolicy::SINGLE_ATTEMPT,
            |_| {
                *calls.lock().unwrap() += 1;
                async { Err::<String, _>(OracleError::Malformed("nope".into())) }
            },
            || "fallback".to_string(),
        )
        .await;

        assert_eq!(value, "fallback");
        assert_eq!(calls.into_inner().unwrap(), 1);
    }
}
