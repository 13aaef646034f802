//! Task scheduling on the event-loop thread
//!
//! Command confirmations and the autoplay settle delay are driven as local
//! tasks. The core crate only describes how to spawn them; the tokio
//! implementation lives here and the browser one in the wasm bridge.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A future pinned to the current thread
pub type LocalTask = Pin<Box<dyn Future<Output = ()> + 'static>>;

/// Spawns local tasks and provides timers
pub trait Spawner {
    /// Run `task` to completion in the background
    fn spawn(&self, task: LocalTask);

    /// Future resolving after `duration`
    fn sleep(&self, duration: Duration) -> LocalTask;
}

/// Spawner backed by a tokio `LocalSet`.
///
/// Tasks are spawned with [`tokio::task::spawn_local`], so the tech must be
/// driven from inside a `LocalSet`.
#[cfg(feature = "tokio")]
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

#[cfg(feature = "tokio")]
impl Spawner for TokioSpawner {
    fn spawn(&self, task: LocalTask) {
        tokio::task::spawn_local(task);
    }

    fn sleep(&self, duration: Duration) -> LocalTask {
        Box::pin(tokio::time::sleep(duration))
    }
}

#[cfg(all(test, feature = "tokio"))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_spawner_runs_after_sleep() {
        let local = tokio::task::LocalSet::new();
        local
            .run_until(async {
                let done = Rc::new(Cell::new(false));
                let spawner = TokioSpawner;
                let sleep = spawner.sleep(Duration::from_millis(600));
                let flag = done.clone();
                spawner.spawn(Box::pin(async move {
                    sleep.await;
                    flag.set(true);
                }));

                tokio::time::sleep(Duration::from_millis(599)).await;
                assert!(!done.get());
                tokio::time::sleep(Duration::from_millis(2)).await;
                assert!(done.get());
            })
            .await;
    }
}
