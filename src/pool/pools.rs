//! One pool per operation family, created and owned explicitly.

use super::handler::{ToolHandler, WorkerKind};
use super::task::Operation;
use super::{PoolError, PoolStats, TaskHandle, WorkerPool};
use crate::config::{PoolsConfig, effective_workers};
use crate::imaging::ImageBackend;
use crate::inpaint::InpaintSettings;
use log::info;
use std::sync::Arc;

/// The compress, resize and inpaint pools behind the tools.
pub struct ToolPools {
    compress: WorkerPool,
    resize: WorkerPool,
    inpaint: WorkerPool,
}

impl ToolPools {
    /// Start all three pools over a shared backend. Sizes are clamped to the
    /// core count.
    pub fn new<B: ImageBackend + 'static>(
        sizes: &PoolsConfig,
        settings: InpaintSettings,
        backend: Arc<B>,
    ) -> Result<Self, PoolError> {
        let start = |kind: WorkerKind, requested: usize| {
            let handler = ToolHandler::new(kind, Arc::clone(&backend), settings);
            WorkerPool::named(&kind.to_string(), effective_workers(requested), Arc::new(handler))
        };

        let pools = Self {
            compress: start(WorkerKind::Compress, sizes.compress)?,
            resize: start(WorkerKind::Resize, sizes.resize)?,
            inpaint: start(WorkerKind::Inpaint, sizes.inpaint)?,
        };
        info!(
            "tool pools ready (compress {}, resize {}, inpaint {})",
            pools.compress.size(),
            pools.resize.size(),
            pools.inpaint.size()
        );
        Ok(pools)
    }

    pub fn pool(&self, kind: WorkerKind) -> &WorkerPool {
        match kind {
            WorkerKind::Compress => &self.compress,
            WorkerKind::Resize => &self.resize,
            WorkerKind::Inpaint => &self.inpaint,
        }
    }

    /// Submit to the compress pool.
    pub fn compress(&self, operation: Operation) -> TaskHandle {
        self.compress.submit(operation)
    }

    /// Submit to the resize pool.
    pub fn resize(&self, operation: Operation) -> TaskHandle {
        self.resize.submit(operation)
    }

    /// Submit to the inpaint pool.
    pub fn inpaint(&self, operation: Operation) -> TaskHandle {
        self.inpaint.submit(operation)
    }

    /// Submit to whichever pool serves `operation`.
    pub fn route(&self, operation: Operation) -> TaskHandle {
        self.pool(WorkerKind::for_operation(&operation)).submit(operation)
    }

    pub fn stats(&self) -> Result<Vec<(WorkerKind, PoolStats)>, PoolError> {
        WorkerKind::ALL
            .into_iter()
            .map(|kind| Ok((kind, self.pool(kind).stats()?)))
            .collect()
    }

    pub fn shutdown(&self) {
        for kind in WorkerKind::ALL {
            self.pool(kind).shutdown();
        }
    }
}
