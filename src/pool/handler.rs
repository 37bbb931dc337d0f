//! What a worker does with a request.
//!
//! [`TaskHandler`] is the seam between the pool and the work. The pool only
//! moves envelopes around; [`ToolHandler`] decodes payloads, runs the image
//! pipelines or inpainting, and encodes the result.

use super::task::{
    HealOutput, HealParams, InpaintOutput, Operation, TaskError, TaskOutput, TaskRequest,
};
use crate::imaging::{
    ImageBackend, OutputFormat, Quality, compress_image, create_thumbnail, decode_data_url,
    encode_data_url, resize_image,
};
use crate::inpaint::{InpaintMethod, InpaintSettings, Mask, heal_selection, inpaint};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Runs a single request on a worker thread.
///
/// Implementations must be shareable across the pool's threads. A panic
/// inside `handle` is caught by the worker and reported as a fault.
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, request: &TaskRequest) -> Result<TaskOutput, TaskError>;
}

/// The operation family a pool serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerKind {
    Compress,
    Resize,
    Inpaint,
}

impl WorkerKind {
    pub const ALL: [WorkerKind; 3] = [WorkerKind::Compress, WorkerKind::Resize, WorkerKind::Inpaint];

    /// The family that serves `operation`.
    pub fn for_operation(operation: &Operation) -> Self {
        match operation {
            Operation::Compress(_) => WorkerKind::Compress,
            Operation::Resize(_) | Operation::Thumbnail(_) => WorkerKind::Resize,
            Operation::Inpaint(_) | Operation::RemoveObject(_) | Operation::HealSelection(_) => {
                WorkerKind::Inpaint
            }
        }
    }

    pub fn accepts(self, operation: &Operation) -> bool {
        Self::for_operation(operation) == self
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkerKind::Compress => "compress",
            WorkerKind::Resize => "resize",
            WorkerKind::Inpaint => "inpaint",
        })
    }
}

/// Production handler: one per pool, sharing a backend.
pub struct ToolHandler<B> {
    kind: WorkerKind,
    backend: Arc<B>,
    settings: InpaintSettings,
}

impl<B: ImageBackend> ToolHandler<B> {
    pub fn new(kind: WorkerKind, backend: Arc<B>, settings: InpaintSettings) -> Self {
        Self {
            kind,
            backend,
            settings,
        }
    }

    fn fill(&self, image_data: &str, mask_bytes: &[u8], method: &str) -> Result<TaskOutput, TaskError> {
        let backend = &*self.backend;
        let image = decode_data_url(backend, image_data)?;
        let (width, height) = image.dimensions();
        let mask = Mask::from_rgba_alpha(mask_bytes, width, height)?;

        let filled = inpaint(&image, &mask, InpaintMethod::from(method.to_string()), &self.settings)?;
        let (inpainted_data, _) =
            encode_data_url(backend, &filled, OutputFormat::Png, Quality::new(100))?;

        Ok(TaskOutput::Inpaint(InpaintOutput {
            inpainted_data,
            width,
            height,
            method: method.to_string(),
        }))
    }

    fn heal(&self, params: &HealParams) -> Result<TaskOutput, TaskError> {
        let backend = &*self.backend;
        let image = decode_data_url(backend, &params.image_data)?;
        let healed = heal_selection(&image, &params.selection, params.source_point)?;
        let (healed_data, _) =
            encode_data_url(backend, &healed, OutputFormat::Png, Quality::new(100))?;

        Ok(TaskOutput::Heal(HealOutput {
            healed_data,
            width: healed.width(),
            height: healed.height(),
        }))
    }
}

impl<B: ImageBackend + 'static> TaskHandler for ToolHandler<B> {
    fn handle(&self, request: &TaskRequest) -> Result<TaskOutput, TaskError> {
        let operation = &request.operation;
        if !self.kind.accepts(operation) {
            return Err(TaskError::Unsupported {
                kind: self.kind,
                operation: operation.name(),
            });
        }

        let backend = &*self.backend;
        match operation {
            Operation::Compress(p) => Ok(TaskOutput::Compress(compress_image(backend, p)?)),
            Operation::Resize(p) => Ok(TaskOutput::Resize(resize_image(backend, p)?)),
            Operation::Thumbnail(p) => Ok(TaskOutput::Thumbnail(create_thumbnail(backend, p)?)),
            Operation::Inpaint(p) => self.fill(&p.image_data, &p.mask_data, &p.method),
            Operation::RemoveObject(p) => self.fill(&p.image_data, &p.selection, &p.method),
            Operation::HealSelection(p) => self.heal(p),
        }
    }
}
