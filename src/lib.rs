//! # imagebox
//!
//! An image editing toolkit: compression, resizing, thumbnails, canvas tools
//! and object removal. Heavy operations run on fixed-size worker pools so a
//! caller can submit many images at once without blocking on any of them.
//!
//! # Architecture: Pools Over a Shared Backend
//!
//! ```text
//! request (taskId) ──▶ ToolPools ─┬─ compress pool (2 workers) ─┐
//!                                 ├─ resize pool   (2 workers) ─┼─▶ ImageBackend
//!                                 └─ inpaint pool  (1 worker)  ─┘
//! ```
//!
//! Every request is a JSON-shaped envelope, `{ type, data, taskId }`, and every
//! response carries the same `taskId` back. The pool never interprets the
//! operation: it queues, dispatches and routes replies. The [`pool::ToolHandler`]
//! running on each worker does the decoding, the pixel work and the encoding.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pool`] | Worker pools, task envelopes, per-kind handlers |
//! | [`imaging`] | Decode/encode backend, compress, resize, thumbnail, crop, merge, filters, EXIF |
//! | [`inpaint`] | Masked fill: neighbour average, Telea-style, diffusion, and heal |
//! | [`config`] | `config.toml` loading, merging over stock defaults, validation |
//! | [`upload`] | Input sniffing and size limits |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Fixed Pools, No Growth
//!
//! Each pool has exactly N workers for its whole life. A worker that panics is
//! replaced in the same slot and only the task it was running fails. There is
//! no cancellation and no timeout; a caller waits until its task resolves or
//! the pool shuts down.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate (Lanczos3 resampling and its
//! JPEG, PNG and WebP encoders). No system libraries are needed, so the binary
//! is self-contained.
//!
//! ## Pixel Work Is Deterministic
//!
//! The inpainting algorithms parallelise across rows with `rayon` but every
//! output pixel depends only on the input snapshot, so results are identical
//! regardless of thread count. Diffusion is the exception that runs in place,
//! and it runs single-threaded.

pub mod config;
pub mod imaging;
pub mod inpaint;
pub mod output;
pub mod pool;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;
