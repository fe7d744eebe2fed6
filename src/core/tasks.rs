// tasks.rs - Scoped fan-out of tasks on a thread pool with cooperative cancellation

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;

use rayon::ThreadPool;

/// Results of one fan-out, in completion order
#[derive(Debug)]
pub struct GroupOutcome<T, E> {
    /// `(submission index, value)` of every successful task
    pub completed: Vec<(usize, T)>,
    /// `(submission index, error)` of every failed task, earliest failure first
    pub errors: Vec<(usize, E)>,
    /// Tasks that never ran because the group was cancelled first
    pub cancelled: usize,
}

impl<T, E> GroupOutcome<T, E> {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty() && self.cancelled == 0
    }
}

/// A group of sibling tasks sharing one cancellation flag.
///
/// Results are collected on the calling thread while tasks are still running.
/// `run` returns only after every spawned task has finished, so no task outlives
/// the group. Cancellation is cooperative: tasks that have not started yet are
/// skipped, tasks already running complete normally.
pub struct TaskGroup<'p> {
    pool: &'p ThreadPool,
    cancelled: AtomicBool,
}

impl<'p> TaskGroup<'p> {
    pub fn new(pool: &'p ThreadPool) -> Self {
        Self {
            pool,
            cancelled: AtomicBool::new(false),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Run `task` once per item. A failure for which `cancels_group` returns true
    /// cancels every sibling that has not started yet.
    pub fn run<I, T, E, F, C>(&self, items: Vec<I>, task: F, cancels_group: C) -> GroupOutcome<T, E>
    where
        I: Send,
        T: Send,
        E: Send,
        F: Fn(usize, I) -> Result<T, E> + Sync,
        C: Fn(&E) -> bool + Sync,
    {
        self.run_observed(items, task, cancels_group, |_, _| {})
    }

    /// Same as [`run`](Self::run), calling `observe` on the calling thread for each
    /// result as soon as it arrives.
    ///
    /// The calling thread must not be a worker of this group's pool.
    pub fn run_observed<I, T, E, F, C, O>(
        &self,
        items: Vec<I>,
        task: F,
        cancels_group: C,
        mut observe: O,
    ) -> GroupOutcome<T, E>
    where
        I: Send,
        T: Send,
        E: Send,
        F: Fn(usize, I) -> Result<T, E> + Sync,
        C: Fn(&E) -> bool + Sync,
        O: FnMut(usize, &Result<T, E>),
    {
        let skipped = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();

        let task = &task;
        let cancels_group = &cancels_group;
        let skipped_ref = &skipped;

        let (completed, errors) = self.pool.in_place_scope(move |scope| {
            for (index, item) in items.into_iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    if self.is_cancelled() {
                        skipped_ref.fetch_add(1, Ordering::Relaxed);
                        return;
                    }
                    let result = task(index, item);
                    if let Err(e) = &result {
                        if cancels_group(e) {
                            self.cancel();
                        }
                    }
                    // The collector drains until every sender is gone
                    let _ = tx.send((index, result));
                });
            }
            drop(tx);

            let mut completed = Vec::new();
            let mut errors = Vec::new();
            for (index, result) in rx {
                observe(index, &result);
                match result {
                    Ok(value) => completed.push((index, value)),
                    Err(e) => errors.push((index, e)),
                }
            }
            (completed, errors)
        });

        GroupOutcome {
            completed,
            errors,
            cancelled: skipped.into_inner(),
        }
    }
}
