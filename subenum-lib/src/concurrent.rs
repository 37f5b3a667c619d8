//! Bounded-concurrency execution of per-item async work.
//!
//! Used for both DNS stages of a run. Every item is submitted once, at most
//! `max_concurrency` workers are in flight, and outcomes are gathered in
//! completion order by the single consumer of the result stream.

use futures::stream::{self, Stream, StreamExt};
use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::hash::Hash;

/// Runs a unit of async work over a set of items with a concurrency cap.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentProcessor {
    max_concurrency: usize,
}

impl ConcurrentProcessor {
    /// Create a new processor. A bound of 0 is raised to 1.
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Stream `(item, outcome)` pairs as workers finish.
    ///
    /// Duplicate items are dropped before submission. Workers are started
    /// lazily as earlier ones complete, so no more than `max_concurrency`
    /// worker futures exist at any time.
    pub fn stream<T, R, I, F, Fut>(&self, items: I, worker: F) -> impl Stream<Item = (T, Option<R>)>
    where
        I: IntoIterator<Item = T>,
        T: Eq + Hash + Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Option<R>>,
    {
        let mut seen = HashSet::new();
        let unique: Vec<T> = items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect();

        stream::iter(unique)
            .map(move |item| {
                let work = worker(item.clone());
                async move { (item, work.await) }
            })
            .buffer_unordered(self.max_concurrency)
    }

    /// Run `worker` over every item and collect the successful outcomes.
    ///
    /// A worker returning `None` leaves its item out of the result. Returns
    /// once every item has been accounted for.
    pub async fn run<T, R, I, F, Fut>(&self, items: I, worker: F) -> HashMap<T, R>
    where
        I: IntoIterator<Item = T>,
        T: Eq + Hash + Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Option<R>>,
    {
        self.run_with(items, worker, |_, _| {}).await
    }

    /// Like [`run`](Self::run), calling `on_outcome` for every finished item
    /// in completion order, failures included.
    pub async fn run_with<T, R, I, F, Fut, C>(
        &self,
        items: I,
        worker: F,
        mut on_outcome: C,
    ) -> HashMap<T, R>
    where
        I: IntoIterator<Item = T>,
        T: Eq + Hash + Clone,
        F: Fn(T) -> Fut,
        Fut: Future<Output = Option<R>>,
        C: FnMut(&T, Option<&R>),
    {
        let mut outcomes = HashMap::new();
        let results = self.stream(items, worker);
        futures::pin_mut!(results);

        while let Some((item, outcome)) = results.next().await {
            on_outcome(&item, outcome.as_ref());
            if let Some(value) = outcome {
                outcomes.insert(item, value);
            }
        }

        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_never_exceeds_concurrency_bound() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let processor = ConcurrentProcessor::new(4);

        let results = processor
            .run(0..40u32, |n| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Some(n * 2)
                }
            })
            .await;

        assert_eq!(results.len(), 40);
        assert_eq!(results.get(&7), Some(&14));
        assert!(peak.load(Ordering::SeqCst) <= 4);
        assert!(peak.load(Ordering::SeqCst) >= 2, "work should overlap");
    }

    #[tokio::test]
    async fn test_empty_input_returns_empty_map() {
        let processor = ConcurrentProcessor::new(8);
        let results = processor
            .run(Vec::<String>::new(), |_host| async { Some(1u8) })
            .await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_failed_items_are_left_out() {
        let processor = ConcurrentProcessor::new(3);
        let results = processor
            .run(1..=10u32, |n| async move {
                if n % 2 == 0 {
                    Some(n)
                } else {
                    None
                }
            })
            .await;

        let mut keys: Vec<u32> = results.keys().copied().collect();
        keys.sort();
        assert_eq!(keys, vec![2, 4, 6, 8, 10]);
    }

    #[tokio::test]
    async fn test_outcomes_arrive_in_completion_order() {
        let processor = ConcurrentProcessor::new(2);
        let mut order = Vec::new();

        processor
            .run_with(
                vec!["slow", "fast"],
                |name| async move {
                    let delay = if name == "slow" { 80 } else { 1 };
                    tokio::time::sleep(Duration::from_millis(delay)).await;
                    Some(())
                },
                |name, _| order.push(*name),
            )
            .await;

        assert_eq!(order, vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_every_item_reported_once_including_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let processor = ConcurrentProcessor::new(5);
        let mut reported = Vec::new();

        let items = vec!["a", "b", "a", "c", "b"];
        let results = processor
            .run_with(
                items,
                |name| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        if name == "b" {
                            None
                        } else {
                            Some(name.len())
                        }
                    }
                },
                |name, outcome| reported.push((*name, outcome.is_some())),
            )
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(results.len(), 2);
        reported.sort();
        assert_eq!(reported, vec![("a", true), ("b", false), ("c", true)]);
    }

    #[test]
    fn test_zero_bound_is_raised_to_one() {
        assert_eq!(ConcurrentProcessor::new(0).max_concurrency(), 1);
    }
}
