//! Node tree data model for pak.
//!
//! An archive is exposed to the comparison engine as a tree of named nodes,
//! each carrying a typed payload value. This crate provides that model plus
//! the narrow provider interface the engine needs: lazily-loaded composite
//! payloads (images, nested archives) are materialized and released through
//! [`NodeProvider`], never by the engine itself.
//!
//! # Key Types
//!
//! - [`Node`] / [`NodeHandle`] -- A named tree node with insertion-ordered children
//! - [`Value`] -- Closed payload union (scalars, vector, link, sound, image, archive ref)
//! - [`ArchiveKind`] / [`ArchiveRef`] -- Declared archive type metadata
//! - [`NodeProvider`] -- Extraction/release of lazily-loaded subtrees
//! - [`MemoryProvider`] -- Eager in-memory provider for tests and embedding
//! - [`ProgressObserver`] -- Per-call progress hooks (phase changed, unit completed)

pub mod error;
pub mod node;
pub mod progress;
pub mod provider;
pub mod value;

pub use error::{NodeError, NodeResult};
pub use node::{Node, NodeHandle};
pub use progress::{NoopObserver, ProgressObserver};
pub use provider::{MemoryProvider, NodeProvider};
pub use value::{ArchiveKind, ArchiveRef, ImageValue, SoundValue, Value, ValueClass};
