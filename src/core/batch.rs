use crate::utils::error::{MigrateError, Result};
use crate::utils::validation::validate_positive_number;
use futures::future::join_all;
use std::future::Future;
use tokio::sync::Semaphore;

/// Run `worker` over `items` with at most `concurrency` workers in flight.
///
/// The returned vector has one entry per item, in input order. A failing item
/// does not stop its siblings. The call itself only fails when `concurrency`
/// is zero.
pub async fn run_bounded<T, R, F, Fut>(
    items: Vec<T>,
    concurrency: usize,
    worker: F,
) -> Result<Vec<Result<R>>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    validate_positive_number("concurrency", concurrency, 1)?;

    let semaphore = Semaphore::new(concurrency);
    let worker = &worker;
    let semaphore = &semaphore;

    let tasks = items.into_iter().map(|item| async move {
        // 先拿到 permit 才呼叫 worker
        let _permit = semaphore
            .acquire()
            .await
            .map_err(|e| MigrateError::WorkerError {
                message: format!("Failed to acquire batch permit: {}", e),
            })?;
        worker(item).await
    });

    Ok(join_all(tasks).await)
}

/// Collapse per-item results, returning the first failure in input order.
pub fn first_failure<R>(results: Vec<Result<R>>) -> Result<Vec<R>> {
    results.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_concurrency() {
        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let started = AtomicUsize::new(0);

        let results = run_bounded((0..10).collect(), 3, |i: usize| {
            let (in_flight, peak, started) = (&in_flight, &peak, &started);
            async move {
                started.fetch_add(1, Ordering::SeqCst);
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5 * (10 - i as u64))).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(i * 2)
            }
        })
        .await
        .unwrap();

        assert_eq!(started.load(Ordering::SeqCst), 10);
        assert!(peak.load(Ordering::SeqCst) <= 3);
        let values: Vec<usize> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, (0..10).map(|i| i * 2).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_failures_are_captured_per_item() {
        let results = run_bounded(vec![1, 2, 3, 4], 2, |i: u32| async move {
            if i % 2 == 0 {
                Err(MigrateError::WorkerError {
                    message: format!("item {}", i),
                })
            } else {
                Ok(i)
            }
        })
        .await
        .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
        assert!(results[3].is_err());
    }

    #[tokio::test]
    async fn test_zero_concurrency_is_rejected() {
        let result = run_bounded(vec![1], 0, |i: u32| async move { Ok(i) }).await;
        assert!(matches!(
            result,
            Err(MigrateError::InvalidConfigValueError { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let results = run_bounded(Vec::<u32>::new(), 3, |i| async move { Ok(i) })
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_first_failure_keeps_input_order() {
        let results: Vec<Result<u32>> = vec![
            Ok(1),
            Err(MigrateError::WorkerError {
                message: "second".to_string(),
            }),
            Err(MigrateError::WorkerError {
                message: "third".to_string(),
            }),
        ];
        match first_failure(results) {
            Err(MigrateError::WorkerError { message }) => assert_eq!(message, "second"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
