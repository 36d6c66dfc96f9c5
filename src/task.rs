use std::collections::HashMap;

use tokio::task::JoinHandle;

/// The kinds of request the view can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Fetch,
    Create,
}

/// At most one task per kind, each tagged with a generation.
///
/// Spawning or cancelling a kind bumps its generation, so a result produced
/// by an older task can be recognised and dropped even when it was sent
/// before the abort landed. Everything still running is aborted on drop.
#[derive(Default)]
pub struct Tasks {
    running: HashMap<TaskKind, JoinHandle<()>>,
    generations: HashMap<TaskKind, u64>,
}

impl Tasks {
    /// Supersedes any task of the same kind and returns the new generation.
    pub fn spawn<F, Fut>(&mut self, kind: TaskKind, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel(kind);
        let generation = self.current(kind);
        self.running.insert(kind, tokio::spawn(task(generation)));
        generation
    }

    pub fn cancel(&mut self, kind: TaskKind) {
        if let Some(previous) = self.running.remove(&kind) {
            if !previous.is_finished() {
                tracing::debug!(?kind, "aborting in-flight request");
            }
            previous.abort();
        }
        *self.generations.entry(kind).or_default() += 1;
    }

    pub fn cancel_all(&mut self) {
        for kind in [TaskKind::Fetch, TaskKind::Create] {
            self.cancel(kind);
        }
    }

    pub fn current(&self, kind: TaskKind) -> u64 {
        self.generations.get(&kind).copied().unwrap_or_default()
    }

    pub fn is_current(&self, kind: TaskKind, generation: u64) -> bool {
        self.current(kind) == generation
    }
}

impl Drop for Tasks {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use super::*;

    fn delayed_flag(flag: &Arc<AtomicBool>) -> impl Future<Output = ()> + Send + 'static {
        let flag = Arc::clone(flag);
        async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn spawning_same_kind_aborts_previous() {
        let first = Arc::new(AtomicBool::new(false));
        let second = Arc::new(AtomicBool::new(false));
        let other = Arc::new(AtomicBool::new(false));
        let mut tasks = Tasks::default();

        tasks.spawn(TaskKind::Fetch, |_| delayed_flag(&first));
        tasks.spawn(TaskKind::Create, |_| delayed_flag(&other));
        tasks.spawn(TaskKind::Fetch, |_| delayed_flag(&second));
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!first.load(Ordering::SeqCst));
        assert!(second.load(Ordering::SeqCst));
        assert!(other.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn superseded_generation_is_no_longer_current() {
        let mut tasks = Tasks::default();

        let first = tasks.spawn(TaskKind::Fetch, |_| async {});
        let second = tasks.spawn(TaskKind::Fetch, |_| async {});

        assert_ne!(first, second);
        assert!(!tasks.is_current(TaskKind::Fetch, first));
        assert!(tasks.is_current(TaskKind::Fetch, second));
        assert!(tasks.is_current(TaskKind::Create, tasks.current(TaskKind::Create)));
    }

    #[tokio::test]
    async fn spawned_task_sees_its_own_generation() {
        let mut tasks = Tasks::default();
        let (tx, rx) = flume::bounded(1);

        let generation = tasks.spawn(TaskKind::Create, move |generation| async move {
            let _ = tx.send_async(generation).await;
        });

        assert_eq!(rx.recv_async().await.unwrap(), generation);
    }

    #[tokio::test]
    async fn cancel_all_invalidates_every_kind() {
        let mut tasks = Tasks::default();
        let fetch = tasks.spawn(TaskKind::Fetch, |_| std::future::pending::<()>());
        let create = tasks.spawn(TaskKind::Create, |_| std::future::pending::<()>());

        tasks.cancel_all();

        assert!(!tasks.is_current(TaskKind::Fetch, fetch));
        assert!(!tasks.is_current(TaskKind::Create, create));
    }

    #[tokio::test]
    async fn drop_aborts_everything() {
        let completed = Arc::new(AtomicBool::new(false));
        let mut tasks = Tasks::default();
        tasks.spawn(TaskKind::Create, |_| delayed_flag(&completed));

        drop(tasks);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!completed.load(Ordering::SeqCst));
    }
}
