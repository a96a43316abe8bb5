//! Pipeline stages for image re-encoding.
//!
//! Each submodule implements exactly one transformation step so each can be
//! tested without the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ render ──▶ encode
//! (bytes)   (raster)   (surface)  (artifact)
//! ```
//!
//! 1. [`input`]  — load the source bytes; the only async I/O in the pipeline
//! 2. [`decode`] — sniff the container format and decode within limits
//! 3. [`render`] — blit onto a natural-size RGBA surface, flatten alpha for JPEG
//! 4. [`encode`] — serialise the surface into the target format
//!
//! Stages 2–4 are CPU-bound and run together inside `spawn_blocking`; see
//! [`crate::convert`].

pub mod decode;
pub mod encode;
pub mod input;
pub mod render;
