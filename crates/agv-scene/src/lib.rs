//! `agv-scene` — entity identity, change tracking, and the scene graph.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`registry`]   | `Registry<T>` arena with a non-owning id → slot index     |
//! | [`attr`]       | `Tracked<T>`, `Attribute`, `Scope`, `AttributeStore`      |
//! | [`graph`]      | `SceneGraph`, `SceneNode`, `LocalFrame`                   |
//! | [`error`]      | `SceneError`, `SceneResult<T>`                            |
//!
//! # Ownership model
//!
//! The graph is an arena: a parent owns an ordered `Vec<EntityId>` of its
//! children and a child stores only its parent's id.  Nothing holds a pointer
//! into the arena, so destroying a subtree is a matter of removing its slots;
//! any id still held elsewhere simply stops resolving.
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | Use `rustc_hash::FxHashMap` for the registry index.        |
//! | `serde`   | Derives `Serialize`/`Deserialize` on `LocalFrame`.         |

pub mod attr;
pub mod error;
pub mod graph;
pub mod registry;

#[cfg(test)]
mod tests;

pub use attr::{Attribute, AttributeStore, Scope, Tracked};
pub use error::{SceneError, SceneResult};
pub use graph::{LocalFrame, SceneGraph, SceneNode};
pub use registry::Registry;
