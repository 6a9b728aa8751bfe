//! Autosave for the farm-information tab
//!
//! An [`AutosaveSession`] holds the in-memory answers while sub-forms edit
//! them. Each accepted edit restarts a quiet window; once no edit has arrived
//! for the whole window the full record is handed to an [`ApplicationSink`].
//! Dropping or closing the session flushes whatever is still pending, so an
//! edit made just before leaving the page is never lost.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::record::FarmInfoInternalApplication;
use crate::errors::{ApplicationResult, ValidationErrors};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(5000);

/// Where autosaved records go
#[async_trait]
pub trait ApplicationSink: Send + Sync + 'static {
    async fn save(&self, record: FarmInfoInternalApplication) -> ApplicationResult<()>;
}

/// Replace the value at a dotted field path, e.g. `waterSource` or
/// `nearContaminationSource.yes`
#[derive(Debug, Clone, Deserialize)]
pub struct FieldEdit {
    pub path: String,
    pub value: Value,
}

impl FieldEdit {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

#[derive(Debug)]
struct Pending {
    record: FarmInfoInternalApplication,
    dirty: bool,
    generation: u64,
}

struct Inner<S> {
    pending: Mutex<Pending>,
    // serialises saves so an older snapshot never lands after a newer one
    save_lock: Mutex<()>,
    sink: S,
}

impl<S: ApplicationSink> Inner<S> {
    /// Save the current record if it changed since the last good save
    async fn save_pending(&self) -> ApplicationResult<bool> {
        let _guard = self.save_lock.lock().await;
        let (record, generation) = {
            let pending = self.pending.lock().await;
            if !pending.dirty {
                return Ok(false);
            }
            (pending.record.clone(), pending.generation)
        };

        let farm_id = record.farm_id;
        self.sink.save(record).await?;

        let mut pending = self.pending.lock().await;
        if pending.generation == generation {
            pending.dirty = false;
        }
        debug!(farm_id, generation, "autosaved application");
        Ok(true)
    }
}

pub struct AutosaveSession<S: ApplicationSink> {
    inner: Arc<Inner<S>>,
    edits: Option<mpsc::UnboundedSender<()>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: ApplicationSink> AutosaveSession<S> {
    /// Start a session over previously persisted answers (or defaults)
    pub fn start(initial: FarmInfoInternalApplication, sink: S, window: Duration) -> Self {
        let inner = Arc::new(Inner {
            pending: Mutex::new(Pending {
                record: initial,
                dirty: false,
                generation: 0,
            }),
            save_lock: Mutex::new(()),
            sink,
        });
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(debounce_loop(inner.clone(), rx, window));

        Self {
            inner,
            edits: Some(tx),
            worker: Some(worker),
        }
    }

    /// Current answers
    pub async fn snapshot(&self) -> FarmInfoInternalApplication {
        self.inner.pending.lock().await.record.clone()
    }

    /// Read the slice of the answers at a dotted path
    pub async fn get(&self, path: &str) -> Option<Value> {
        let json = self.inner.pending.lock().await.record.to_json();
        path.split('.')
            .try_fold(&json, |node, segment| node.get(segment))
            .cloned()
    }

    /// True when an accepted edit has not been saved yet
    pub async fn is_dirty(&self) -> bool {
        self.inner.pending.lock().await.dirty
    }

    /// Replace one slice of the answers
    ///
    /// The whole record is re-validated with the new slice in place; a
    /// rejected edit leaves the record untouched. The farm cannot be changed.
    pub async fn apply(&self, edit: FieldEdit) -> Result<(), ValidationErrors> {
        let root = edit.path.split('.').next().unwrap_or_default();
        if root == "farmId" {
            return Err(ValidationErrors::message("farmId cannot be edited"));
        }
        if !FarmInfoInternalApplication::FIELDS.contains(&root) {
            let mut errors = ValidationErrors::default();
            errors.add_field(root, "unrecognised field");
            return Err(errors);
        }

        {
            let mut pending = self.inner.pending.lock().await;
            let mut json = pending.record.to_json();
            set_path(&mut json, &edit.path, edit.value)?;
            let record = FarmInfoInternalApplication::from_json(&json)?;
            if record != pending.record {
                pending.record = record;
                pending.dirty = true;
                pending.generation += 1;
            }
        }

        if let Some(tx) = &self.edits {
            // a closed worker only happens after close(); nothing to notify
            let _ = tx.send(());
        }
        Ok(())
    }

    /// Save any pending edit now
    pub async fn flush(&self) -> ApplicationResult<bool> {
        self.inner.save_pending().await
    }

    /// Stop the background saver and flush what is left
    pub async fn close(mut self) -> ApplicationResult<()> {
        self.edits.take();
        if let Some(worker) = self.worker.take() {
            if let Err(err) = worker.await {
                warn!("autosave worker ended abnormally: {}", err);
            }
        }
        self.inner.save_pending().await.map(|_| ())
    }
}

/// Trailing-edge debounce: save once the edit stream has been quiet for `window`
async fn debounce_loop<S: ApplicationSink>(
    inner: Arc<Inner<S>>,
    mut edits: mpsc::UnboundedReceiver<()>,
    window: Duration,
) {
    while edits.recv().await.is_some() {
        let closed = loop {
            match tokio::time::timeout(window, edits.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => break true,
                Err(_) => break false,
            }
        };

        if let Err(err) = inner.save_pending().await {
            warn!("autosave failed, will retry on next edit or flush: {}", err);
        }
        if closed {
            return;
        }
    }
    // session dropped or closed with no edit in flight
    if let Err(err) = inner.save_pending().await {
        warn!("final autosave failed: {}", err);
    }
}

fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), ValidationErrors> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return Err(ValidationErrors::message("empty field path"));
    };

    let mut node = root;
    for segment in segments {
        node = node
            .get_mut(segment)
            .filter(|child| child.is_object())
            .ok_or_else(|| ValidationErrors::message(format!("no object at `{}`", path)))?;
    }
    match node.as_object_mut() {
        Some(object) => {
            object.insert(last.to_string(), value);
            Ok(())
        }
        None => Err(ValidationErrors::message(format!("no object at `{}`", path))),
    }
}
