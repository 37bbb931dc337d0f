//! Shared test utilities for the imagebox test suite.
//!
//! Provides synthetic images and masks, a canned task payload, and a
//! scriptable [`TaskHandler`] for exercising the pool without real codecs.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gate = Gate::closed();
//! let handler = Arc::new(RecordingHandler::gated(gate.clone()));
//! let pool = WorkerPool::new(1, handler.clone()).unwrap();
//!
//! let handle = pool.submit_with_id(1, compress_op());
//! handler.wait_for_starts(1);
//! gate.open();
//! assert!(handle.wait().unwrap().success);
//! ```

use image::{Rgba, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::imaging::{BackendError, CompressParams, OutputFormat};
use crate::inpaint::Mask;
use crate::pool::{
    HealOutput, Operation, TaskError, TaskHandler, TaskId, TaskOutput, TaskRequest,
};

// =========================================================================
// Pixels
// =========================================================================

/// Alternating black and white pixels, fully opaque.
pub fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    })
}

/// A `size`×`size` masked square with its top-left corner at `(x0, y0)`.
pub fn square_mask(width: u32, height: u32, x0: u32, y0: u32, size: u32) -> Mask {
    let mut mask = Mask::new(width, height);
    for y in y0..(y0 + size).min(height) {
        for x in x0..(x0 + size).min(width) {
            mask.set(x, y, true);
        }
    }
    mask
}

/// A real PNG file of a gradient.
pub fn encoded_png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 16 % 256) as u8, (y * 16 % 256) as u8, 90, 255])
    });
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

// =========================================================================
// Payloads
// =========================================================================

/// A compress operation with 1920x1080 bounds. Its image data is a valid
/// data URL but not a decodable image; use with `MockBackend` or a handler
/// that ignores the payload.
pub fn compress_op() -> Operation {
    Operation::Compress(CompressParams {
        image_data: "data:image/png;base64,AA==".to_string(),
        quality: 0.8,
        max_width: Some(1920),
        max_height: Some(1080),
        format: OutputFormat::Jpeg,
    })
}

// =========================================================================
// Pool handlers
// =========================================================================

/// A latch that blocks handlers until opened.
#[derive(Clone, Default)]
pub struct Gate(Arc<(Mutex<bool>, Condvar)>);

impl Gate {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        let (lock, cvar) = &*self.0;
        *lock.lock().unwrap() = true;
        cvar.notify_all();
    }

    fn pass(&self) {
        let (lock, cvar) = &*self.0;
        let mut open = lock.lock().unwrap();
        while !*open {
            open = cvar.wait(open).unwrap();
        }
    }
}

/// Handler that records which tasks started and how many ran at once.
///
/// It returns a tiny [`HealOutput`] for every request. Behaviour can be
/// scripted per task id: panic, fail, or wait on a [`Gate`].
#[derive(Default)]
pub struct RecordingHandler {
    starts: Mutex<Vec<TaskId>>,
    started: Condvar,
    running: AtomicUsize,
    max_running: AtomicUsize,
    delay: Option<Duration>,
    gate: Option<Gate>,
    panic_on: Option<TaskId>,
    fail_on: Option<TaskId>,
}

impl RecordingHandler {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn panicking_on(task_id: TaskId) -> Self {
        Self {
            panic_on: Some(task_id),
            ..Self::default()
        }
    }

    pub fn failing_on(task_id: TaskId) -> Self {
        Self {
            fail_on: Some(task_id),
            ..Self::default()
        }
    }

    /// Task ids in the order workers picked them up.
    pub fn starts(&self) -> Vec<TaskId> {
        self.starts.lock().unwrap().clone()
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Block until at least `n` tasks have started.
    pub fn wait_for_starts(&self, n: usize) {
        let mut starts = self.starts.lock().unwrap();
        while starts.len() < n {
            starts = self.started.wait(starts).unwrap();
        }
    }
}

impl TaskHandler for RecordingHandler {
    fn handle(&self, request: &TaskRequest) -> Result<TaskOutput, TaskError> {
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
        {
            self.starts.lock().unwrap().push(request.task_id);
            self.started.notify_all();
        }

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        if let Some(gate) = &self.gate {
            gate.pass();
        }
        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on == Some(request.task_id) {
            panic!("boom on task {}", request.task_id);
        }
        if self.fail_on == Some(request.task_id) {
            return Err(TaskError::Backend(BackendError::InvalidInput(format!(
                "refusing task {}",
                request.task_id
            ))));
        }
        Ok(TaskOutput::Heal(HealOutput {
            healed_data: String::new(),
            width: 1,
            height: 1,
        }))
    }
}
