//! # Executor
//!
//! How the kernel runs independent sub-tasks. A batch of tasks is handed to
//! [`Executor::execute`], which returns only once every task has finished.
//! Tasks are leaf work: they never submit a nested batch.

/// A unit of work borrowing data that outlives the batch.
pub type Task<'scope> = Box<dyn FnOnce() + Send + 'scope>;

/// Runs batches of mutually independent tasks to completion.
pub trait Executor: Send + Sync {
    /// Runs every task and blocks until all of them have completed.
    ///
    /// Completion order is unspecified.
    fn execute<'scope>(&self, tasks: Vec<Task<'scope>>);

    /// Number of worker threads backing this executor (0 when inline).
    fn worker_count(&self) -> usize;
}

/// Executor that runs every task on the calling thread, in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialExecutor;

impl Executor for SerialExecutor {
    fn execute<'scope>(&self, tasks: Vec<Task<'scope>>) {
        for task in tasks {
            task();
        }
    }

    fn worker_count(&self) -> usize {
        0
    }
}

/// Applies `f` to every item through `executor`, one task per item.
///
/// Each task writes into its own output slot, so the result order matches
/// the input order regardless of completion order.
///
/// # Example
///
/// ```rust
/// use meshcut_kernel::{map_parallel, SerialExecutor};
///
/// let squares = map_parallel(&SerialExecutor, vec![1, 2, 3], |x| x * x);
/// assert_eq!(squares, vec![1, 4, 9]);
/// ```
pub fn map_parallel<I, O, F>(executor: &dyn Executor, items: Vec<I>, f: F) -> Vec<O>
where
    I: Send,
    O: Send,
    F: Fn(I) -> O + Sync,
{
    let mut slots: Vec<Option<O>> = items.iter().map(|_| None).collect();
    {
        let f = &f;
        let tasks: Vec<Task<'_>> = items
            .into_iter()
            .zip(slots.iter_mut())
            .map(|(item, slot)| {
                Box::new(move || {
                    *slot = Some(f(item));
                }) as Task<'_>
            })
            .collect();
        executor.execute(tasks);
    }
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Executor that spreads a batch over scoped threads.
    struct ScopedExecutor;

    impl Executor for ScopedExecutor {
        fn execute<'scope>(&self, tasks: Vec<Task<'scope>>) {
            std::thread::scope(|scope| {
                for task in tasks {
                    scope.spawn(task);
                }
            });
        }

        fn worker_count(&self) -> usize {
            4
        }
    }

    #[test]
    fn test_serial_executor_runs_in_order() {
        let mut seen = Vec::new();
        {
            let seen = std::sync::Mutex::new(&mut seen);
            let tasks: Vec<Task<'_>> = (0..4)
                .map(|i| {
                    let seen = &seen;
                    Box::new(move || seen.lock().unwrap().push(i)) as Task<'_>
                })
                .collect();
            SerialExecutor.execute(tasks);
        }
        assert_eq!(seen, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_map_parallel_preserves_order() {
        let input: Vec<u64> = (0..64).collect();
        let serial = map_parallel(&SerialExecutor, input.clone(), |x| x * 3);
        let threaded = map_parallel(&ScopedExecutor, input, |x| x * 3);
        assert_eq!(serial, threaded);
        assert_eq!(serial[10], 30);
    }

    #[test]
    fn test_map_parallel_empty() {
        let out: Vec<u8> = map_parallel(&SerialExecutor, Vec::<u8>::new(), |x| x);
        assert!(out.is_empty());
    }
}
