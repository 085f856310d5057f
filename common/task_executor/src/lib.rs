//! A thin wrapper around a `tokio` runtime handle that ties every spawned task to a shared
//! shutdown signal: once the node starts exiting, every future spawned through a `TaskExecutor`
//! resolves (or is dropped) instead of keeping the process alive.

use exit_future::Exit;
use futures::future::{self, Either};
use slog::{crit, debug, o, Logger};
use std::future::Future;
use tokio::runtime::Handle;

/// Hands out `TaskExecutor`s that all share one exit signal; dropping the `Signal` wakes every
/// `Exit` future derived from it, which is how a clean shutdown propagates to spawned tasks.
pub fn exit_future_pair() -> (exit_future::Signal, Exit) {
    exit_future::signal()
}

#[derive(Clone)]
pub struct TaskExecutor {
    handle: Handle,
    exit: Exit,
    log: Logger,
}

impl TaskExecutor {
    pub fn new(handle: Handle, exit: Exit, log: Logger) -> Self {
        Self { handle, exit, log }
    }

    /// Returns a copy of `self` with `name` folded into its logger, for tasks that want every
    /// log line they emit tagged with their own identity.
    pub fn clone_with_name(&self, name: &'static str) -> Self {
        Self { handle: self.handle.clone(), exit: self.exit.clone(), log: self.log.new(o!("task" => name)) }
    }

    /// Spawns `task`, racing it against the shared exit signal: whichever resolves first wins,
    /// and the task is simply dropped if the node is shutting down before it completes.
    pub fn spawn(&self, task: impl Future<Output = ()> + Send + 'static, name: &'static str) {
        let exit = self.exit.clone();
        let log = self.log.clone();

        self.handle.spawn(async move {
            match future::select(Box::pin(task), exit).await {
                Either::Left(((), _)) => {}
                Either::Right(((), _)) => debug!(log, "Task shutdown, exit received"; "task" => name),
            }
        });
    }

    /// Spawns a blocking (CPU-bound or sync-IO) closure on the runtime's blocking thread pool.
    /// Not raced against the exit signal — callers that must be cancellable on shutdown should
    /// check `self.exit` themselves inside `task`.
    pub fn spawn_blocking<F>(&self, task: F, name: &'static str)
    where
        F: FnOnce() + Send + 'static,
    {
        let log = self.log.clone();
        let join = self.handle.spawn_blocking(task);

        self.handle.spawn(async move {
            if let Err(e) = join.await {
                crit!(log, "Blocking task panicked"; "task" => name, "error" => ?e);
            }
        });
    }

    pub fn runtime_handle(&self) -> &Handle {
        &self.handle
    }

    pub fn exit(&self) -> Exit {
        self.exit.clone()
    }

    pub fn log(&self) -> &Logger {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::o;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn null_logger() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    #[tokio::test]
    async fn spawned_task_runs_to_completion() {
        let (signal, exit) = exit_future_pair();
        let executor = TaskExecutor::new(Handle::current(), exit, null_logger());

        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        executor.spawn(async move { ran_clone.store(true, Ordering::SeqCst) }, "test");

        tokio::task::yield_now().await;
        tokio::task::yield_now().await;
        assert!(ran.load(Ordering::SeqCst));
        drop(signal);
    }
}
