//! # Scheduler
//!
//! Where a context runs the independent sub-tasks of a dispatch: inline on
//! the calling thread, or on a fixed-size rayon pool owned by the context.
//!
//! Both strategies sit behind the kernel's [`Executor`] trait, so neither
//! the kernel nor the orchestrator knows which one is in use.

use crate::error::{Error, Result};
use meshcut_kernel::{Executor, Task};
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

/// Scheduling strategy chosen at context creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleMode {
    /// Every task runs on the dispatching thread.
    Inline,
    /// Tasks run on a per-context worker pool.
    Pool,
}

/// A context's task runner.
pub enum Scheduler {
    Inline,
    Pool(ThreadPool),
}

impl Scheduler {
    /// Creates a scheduler.
    ///
    /// ## Parameters
    ///
    /// - `mode`: Scheduling strategy
    /// - `workers`: Pool size, ignored for [`ScheduleMode::Inline`]
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfMemory`] if the worker threads cannot be
    /// spawned.
    pub fn new(mode: ScheduleMode, workers: usize) -> Result<Self> {
        match mode {
            ScheduleMode::Inline => Ok(Scheduler::Inline),
            ScheduleMode::Pool => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("meshcut-worker-{i}"))
                    .build()
                    .map_err(|err| Error::OutOfMemory(format!("worker pool: {err}")))?;
                debug!(workers = pool.current_num_threads(), "worker pool started");
                Ok(Scheduler::Pool(pool))
            }
        }
    }

    pub fn mode(&self) -> ScheduleMode {
        match self {
            Scheduler::Inline => ScheduleMode::Inline,
            Scheduler::Pool(_) => ScheduleMode::Pool,
        }
    }
}

impl Executor for Scheduler {
    fn execute<'scope>(&self, tasks: Vec<Task<'scope>>) {
        match self {
            Scheduler::Inline => {
                for task in tasks {
                    task();
                }
            }
            Scheduler::Pool(pool) => pool.scope(|scope| {
                for task in tasks {
                    scope.spawn(move |_| task());
                }
            }),
        }
    }

    fn worker_count(&self) -> usize {
        match self {
            Scheduler::Inline => 0,
            Scheduler::Pool(pool) => pool.current_num_threads(),
        }
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("mode", &self.mode())
            .field("workers", &self.worker_count())
            .finish()
    }
}
