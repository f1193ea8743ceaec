use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::errors::CoreError;

/// Identifier of a registered image blob (an object URL in a browser host).
pub type HandleId = u64;

pub const PNG_MIME: &str = "image/png";

/// Registry of in-memory blobs that the host can reference by handle.
pub trait BlobRegistry: Send + Sync {
    fn register(&self, bytes: Vec<u8>, mime: &str) -> Result<HandleId, CoreError>;

    /// Release a handle. Called at most once per handle by [`ImageHandle`].
    fn revoke(&self, id: HandleId);
}

/// Offers a finished image to the user as a file.
pub trait DownloadSink: Send + Sync {
    fn trigger_download(
        &self,
        handle: &ImageHandle,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<(), CoreError>;
}

/// Scoped ownership of a registered blob.
///
/// The handle is revoked exactly once: by [`ImageHandle::release`] or, on
/// any other exit path, when the value is dropped.
pub struct ImageHandle {
    id: HandleId,
    registry: Arc<dyn BlobRegistry>,
    released: bool,
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

impl ImageHandle {
    /// Register `bytes` as a PNG blob and take ownership of its handle.
    pub fn acquire(registry: Arc<dyn BlobRegistry>, bytes: Vec<u8>) -> Result<Self, CoreError> {
        let id = registry.register(bytes, PNG_MIME)?;
        debug!(handle = id, "Image handle acquired");
        Ok(Self {
            id,
            registry,
            released: false,
        })
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Revoke now instead of waiting for drop.
    pub fn release(mut self) {
        self.release_once();
    }

    fn release_once(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.revoke(self.id);
            debug!(handle = self.id, "Image handle released");
        }
    }
}

impl Drop for ImageHandle {
    fn drop(&mut self) {
        self.release_once();
    }
}

/// Preview state of an open share dialog.
///
/// Holds at most one preview handle. Replacing the preview or closing the
/// session releases the previous handle; a render that finishes after the
/// session was closed is discarded without leaking a handle.
///
/// Clones share the same state, so the dialog can keep one clone to call
/// [`ShareSession::close`] while another is waiting on a render.
#[derive(Clone)]
pub struct ShareSession {
    registry: Arc<dyn BlobRegistry>,
    state: Arc<Mutex<SessionState>>,
}

#[derive(Default)]
struct SessionState {
    preview: Option<ImageHandle>,
    closed: bool,
}

impl std::fmt::Debug for ShareSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareSession")
            .field("preview", &self.preview_id())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl ShareSession {
    pub fn new(registry: Arc<dyn BlobRegistry>) -> Self {
        Self {
            registry,
            state: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Attach freshly rendered PNG bytes as the current preview.
    /// Returns the preview handle id, or `None` if the session is closed.
    pub fn attach_preview(&self, bytes: Vec<u8>) -> Result<Option<HandleId>, CoreError> {
        let mut state = self.lock()?;
        if state.closed {
            debug!("Share session closed before render finished, discarding image");
            return Ok(None);
        }
        let handle = ImageHandle::acquire(Arc::clone(&self.registry), bytes)?;
        let id = handle.id();
        // Dropping the old preview revokes it.
        state.preview = Some(handle);
        Ok(Some(id))
    }

    pub fn preview_id(&self) -> Option<HandleId> {
        self.lock()
            .ok()
            .and_then(|state| state.preview.as_ref().map(ImageHandle::id))
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map(|state| state.closed).unwrap_or(true)
    }

    /// Close the dialog: release the preview and ignore later renders.
    pub fn close(&self) {
        let preview = match self.lock() {
            Ok(mut state) => {
                state.closed = true;
                state.preview.take()
            }
            Err(_) => None,
        };
        if let Some(handle) = preview {
            handle.release();
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, SessionState>, CoreError> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("Share session lock poisoned".into()))
    }
}

/// Blob registry kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryBlobRegistry {
    next_id: AtomicU64,
    blobs: Mutex<HashMap<HandleId, Vec<u8>>>,
    revocations: AtomicUsize,
}

impl MemoryBlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes behind a live handle.
    pub fn get(&self, id: HandleId) -> Option<Vec<u8>> {
        self.lock().ok()?.get(&id).cloned()
    }

    /// Number of handles registered and not yet revoked.
    pub fn live_count(&self) -> usize {
        self.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// Total number of revoke calls received.
    pub fn revocation_count(&self) -> usize {
        self.revocations.load(Ordering::SeqCst)
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<HandleId, Vec<u8>>>, CoreError> {
        self.blobs
            .lock()
            .map_err(|_| CoreError::Storage("Blob registry lock poisoned".into()))
    }
}

impl BlobRegistry for MemoryBlobRegistry {
    fn register(&self, bytes: Vec<u8>, _mime: &str) -> Result<HandleId, CoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock()?.insert(id, bytes);
        Ok(id)
    }

    fn revoke(&self, id: HandleId) {
        self.revocations.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut blobs) = self.lock() {
            blobs.remove(&id);
        }
    }
}

/// Download sink that writes files into a directory (native only).
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct DirectoryDownloadSink {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl DirectoryDownloadSink {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl DownloadSink for DirectoryDownloadSink {
    fn trigger_download(
        &self,
        handle: &ImageHandle,
        bytes: &[u8],
        file_name: &str,
    ) -> Result<(), CoreError> {
        if file_name.contains(['/', '\\']) || file_name.starts_with('.') {
            return Err(CoreError::ValidationError(format!(
                "Refusing to write download with unsafe name '{file_name}'"
            )));
        }
        std::fs::write(self.dir.join(file_name), bytes)?;
        debug!(handle = handle.id(), file_name, "Download written");
        Ok(())
    }
}
