//! Debounced autosave.
//!
//! One background task owns a single pending deadline. Each `request()` pushes
//! the deadline to `now + debounce`; when it elapses the target is saved once.
//! A pending save is flushed on `shutdown()`, or when every handle is dropped.
//! Failures are reported once as a `SaveNotice::Failed` and never retried.
//! Clearing the target also runs on the task, so it is ordered after any
//! save already in flight.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, warn};

use crate::persistence::{PersistError, SlotStorage};
use crate::resume::store::SharedStore;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Something that can be written out in one go.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    async fn save(&self) -> Result<(), PersistError>;

    /// Removes whatever `save` wrote.
    async fn clear(&self) -> Result<(), PersistError>;
}

/// Saves the whole store into its slot.
pub struct StoreSaveTarget {
    store: SharedStore,
    storage: Arc<dyn SlotStorage>,
    key: String,
}

impl StoreSaveTarget {
    pub fn new(store: SharedStore, storage: Arc<dyn SlotStorage>, key: impl Into<String>) -> Self {
        Self {
            store,
            storage,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SaveTarget for StoreSaveTarget {
    async fn save(&self) -> Result<(), PersistError> {
        let blob = self.store.read().await.to_json()?;
        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || storage.write(&key, &blob))
            .await
            .map_err(|e| PersistError::Unavailable(format!("save task failed: {e}")))?
    }

    async fn clear(&self) -> Result<(), PersistError> {
        let storage = Arc::clone(&self.storage);
        let key = self.key.clone();
        tokio::task::spawn_blocking(move || storage.remove(&key))
            .await
            .map_err(|e| PersistError::Unavailable(format!("clear task failed: {e}")))?
    }
}

#[derive(Debug, Clone)]
pub struct AutosaveOptions {
    pub debounce: Duration,
    /// Emit `SaveNotice::Saved` after each successful save.
    pub notify_success: bool,
}

impl Default for AutosaveOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            notify_success: true,
        }
    }
}

/// Transient notification for the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SaveNotice {
    Saved,
    Failed { message: String },
}

enum Command {
    Request,
    SaveNow(oneshot::Sender<Result<(), PersistError>>),
    Clear(oneshot::Sender<Result<(), PersistError>>),
    Cancel,
    Shutdown,
}

enum Event {
    Command(Option<Command>),
    Deadline,
}

/// Cloneable handle used by request handlers.
#[derive(Clone)]
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    notices: broadcast::Sender<SaveNotice>,
}

impl AutosaveHandle {
    /// Schedules a save after the quiet period, replacing any pending one.
    pub fn request(&self) {
        if self.commands.send(Command::Request).is_err() {
            warn!("Autosave requested after shutdown; change will not be saved");
        }
    }

    /// Cancels any pending save and saves immediately.
    pub async fn save_now(&self) -> Result<(), PersistError> {
        self.call(Command::SaveNow).await
    }

    /// Drops any pending save and removes the saved data, after any save in flight.
    pub async fn clear(&self) -> Result<(), PersistError> {
        self.call(Command::Clear).await
    }

    async fn call(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<(), PersistError>>) -> Command,
    ) -> Result<(), PersistError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .map_err(|_| PersistError::Unavailable("autosave has shut down".to_string()))?;
        response
            .await
            .map_err(|_| PersistError::Unavailable("autosave has shut down".to_string()))?
    }

    /// Drops the pending save, if any, without saving.
    pub fn cancel(&self) {
        let _ = self.commands.send(Command::Cancel);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SaveNotice> {
        self.notices.subscribe()
    }
}

/// Owner of the autosave task.
pub struct Autosaver {
    handle: AutosaveHandle,
    task: JoinHandle<()>,
}

impl Autosaver {
    pub fn spawn(target: Arc<dyn SaveTarget>, options: AutosaveOptions) -> Self {
        let (commands, receiver) = mpsc::unbounded_channel();
        let (notices, _) = broadcast::channel(16);
        let task = tokio::spawn(run(target, options, receiver, notices.clone()));
        Self {
            handle: AutosaveHandle { commands, notices },
            task,
        }
    }

    pub fn handle(&self) -> AutosaveHandle {
        self.handle.clone()
    }

    /// Flushes a pending save and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.handle.commands.send(Command::Shutdown);
        if let Err(e) = self.task.await {
            error!("Autosave task ended abnormally: {e}");
        }
    }
}

async fn run(
    target: Arc<dyn SaveTarget>,
    options: AutosaveOptions,
    mut commands: mpsc::UnboundedReceiver<Command>,
    notices: broadcast::Sender<SaveNotice>,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        let event = match deadline {
            Some(at) => tokio::select! {
                command = commands.recv() => Event::Command(command),
                () = sleep_until(at) => Event::Deadline,
            },
            None => Event::Command(commands.recv().await),
        };

        match event {
            Event::Deadline => {
                deadline = None;
                let _ = save(target.as_ref(), &options, &notices).await;
            }
            Event::Command(Some(Command::Request)) => {
                deadline = Some(Instant::now() + options.debounce);
            }
            Event::Command(Some(Command::SaveNow(reply))) => {
                deadline = None;
                let result = save(target.as_ref(), &options, &notices).await;
                let _ = reply.send(result);
            }
            Event::Command(Some(Command::Clear(reply))) => {
                deadline = None;
                let result = target.clear().await;
                if let Err(e) = &result {
                    error!("Failed to clear saved data: {e}");
                }
                let _ = reply.send(result);
            }
            Event::Command(Some(Command::Cancel)) => {
                deadline = None;
            }
            Event::Command(Some(Command::Shutdown)) | Event::Command(None) => {
                if deadline.take().is_some() {
                    debug!("Flushing pending autosave on shutdown");
                    let _ = save(target.as_ref(), &options, &notices).await;
                }
                break;
            }
        }
    }
}

async fn save(
    target: &dyn SaveTarget,
    options: &AutosaveOptions,
    notices: &broadcast::Sender<SaveNotice>,
) -> Result<(), PersistError> {
    match target.save().await {
        Ok(()) => {
            debug!("Changes saved");
            if options.notify_success {
                let _ = notices.send(SaveNotice::Saved);
            }
            Ok(())
        }
        Err(e) => {
            error!("Autosave error: {e}");
            let _ = notices.send(SaveNotice::Failed {
                message: "Your changes could not be saved. Please try again.".to_string(),
            });
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemorySlotStorage;
    use crate::resume::store::ResumeStore;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        attempts: AtomicUsize,
        clears: AtomicUsize,
        fail: AtomicBool,
    }

    impl CountingTarget {
        fn attempts(&self) -> usize {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SaveTarget for CountingTarget {
        async fn save(&self) -> Result<(), PersistError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err(PersistError::Unavailable("disk full".to_string()))
            } else {
                Ok(())
            }
        }

        async fn clear(&self) -> Result<(), PersistError> {
            self.clears.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn spawn(target: &Arc<CountingTarget>) -> Autosaver {
        Autosaver::spawn(target.clone(), AutosaveOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_requests_coalesce() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        let handle = autosaver.handle();

        for _ in 0..5 {
            handle.request();
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(target.attempts(), 0);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(target.attempts(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(target.attempts(), 1);
        autosaver.shutdown().await;
        assert_eq!(target.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_save() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        autosaver.handle().request();

        autosaver.shutdown().await;
        assert_eq!(target.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_without_pending_does_not_save() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        autosaver.shutdown().await;
        assert_eq!(target.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_all_handles_flushes() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        autosaver.handle().request();
        drop(autosaver);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(target.attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_save() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        let handle = autosaver.handle();
        handle.request();
        handle.cancel();

        tokio::time::sleep(Duration::from_secs(5)).await;
        autosaver.shutdown().await;
        assert_eq!(target.attempts(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reported_once_without_retry() {
        let target = Arc::new(CountingTarget::default());
        target.fail.store(true, Ordering::SeqCst);
        let autosaver = spawn(&target);
        let handle = autosaver.handle();
        let mut notices = handle.subscribe();

        handle.request();
        tokio::time::sleep(Duration::from_secs(2)).await;

        assert!(matches!(
            notices.recv().await.unwrap(),
            SaveNotice::Failed { .. }
        ));
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(target.attempts(), 1);
        assert!(notices.try_recv().is_err());
        autosaver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_now_cancels_pending() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        let handle = autosaver.handle();
        let mut notices = handle.subscribe();

        handle.request();
        handle.save_now().await.unwrap();
        assert_eq!(notices.recv().await.unwrap(), SaveNotice::Saved);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(target.attempts(), 1);
        autosaver.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_drops_pending_save() {
        let target = Arc::new(CountingTarget::default());
        let autosaver = spawn(&target);
        let handle = autosaver.handle();
        handle.request();
        handle.clear().await.unwrap();
        assert_eq!(target.clears.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        autosaver.shutdown().await;
        assert_eq!(target.attempts(), 0);
    }

    #[tokio::test]
    async fn test_store_target_writes_slot() {
        let storage = Arc::new(MemorySlotStorage::new());
        let store = ResumeStore::default().into_shared();
        let id = store.write().await.create_resume("Draft", "basic");

        let target = StoreSaveTarget::new(store.clone(), storage.clone(), "resume-storage");
        target.save().await.unwrap();

        let mut restored = ResumeStore::default();
        assert!(restored
            .rehydrate(storage.as_ref(), "resume-storage")
            .unwrap());
        assert!(restored.get(id).is_some());

        target.clear().await.unwrap();
        assert!(storage.read("resume-storage").unwrap().is_none());
    }
}
