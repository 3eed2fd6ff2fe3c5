use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::Duration;

use moodcam_core::shared::constants::{
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL,
};
use moodcam_core::shared::model_resolver;

/// Shared model cache that resolves models in the background at startup.
/// Workers can grab pre-resolved paths or wait for in-progress resolution.
pub struct ModelCache {
    detector: Arc<ModelSlot>,
    expression: Arc<ModelSlot>,
}

struct ModelSlot {
    result: Mutex<Option<Result<PathBuf, String>>>,
    ready: Condvar,
    progress: Arc<Mutex<(u64, u64)>>,
}

impl ModelCache {
    /// Create a new `ModelCache` and begin resolving models in the background.
    pub fn new() -> Arc<Self> {
        let cache = Arc::new(Self {
            detector: Arc::new(ModelSlot::new()),
            expression: Arc::new(ModelSlot::new()),
        });

        let detector_slot = cache.detector.clone();
        let expression_slot = cache.expression.clone();
        thread::spawn(move || {
            detector_slot.resolve(DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL);
            expression_slot.resolve(EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL);
        });

        cache
    }

    /// Wait for the face detector model path. Calls `on_progress(downloaded,
    /// total)` while a download is in progress. Returns early if `cancelled`
    /// is set.
    pub fn wait_for_detector(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        self.detector.wait(on_progress, cancelled)
    }

    /// Wait for the expression classifier model path.
    pub fn wait_for_expression(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        self.expression.wait(on_progress, cancelled)
    }
}

impl ModelSlot {
    fn new() -> Self {
        Self {
            result: Mutex::new(None),
            ready: Condvar::new(),
            progress: Arc::new(Mutex::new((0, 0))),
        }
    }

    fn resolve(&self, name: &str, url: &str) {
        let progress_mutex = self.progress.clone();
        let result = model_resolver::resolve(
            name,
            url,
            None,
            Some(Box::new(move |downloaded, total| {
                *progress_mutex.lock().unwrap() = (downloaded, total);
            })),
        );
        *self.result.lock().unwrap() = Some(result.map_err(|e| e.to_string()));
        self.ready.notify_all();
    }

    fn wait(
        &self,
        on_progress: &dyn Fn(u64, u64),
        cancelled: &AtomicBool,
    ) -> Result<PathBuf, String> {
        let mut guard = self.result.lock().unwrap();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err("Cancelled".into());
            }
            if let Some(ref result) = *guard {
                return result.clone();
            }
            // Forward download progress while waiting
            if let Ok(progress) = self.progress.try_lock() {
                let (dl, total) = *progress;
                if total > 0 {
                    on_progress(dl, total);
                }
            }
            let (new_guard, _) = self
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .unwrap();
            guard = new_guard;
        }
    }
}
