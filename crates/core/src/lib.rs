//! Core state coordination for termcordion.
//!
//! This crate holds everything that is not rendering:
//! - `identity` - opaque instance ids behind the swappable `IdSource` policy
//! - `registry` - `GroupContext`, the single source of truth for one group
//! - `binding` - per-item subscription lifecycle and the derived `ItemContext`
//! - `error` - composition contract violations

pub mod binding;
pub mod error;
pub mod identity;
pub mod registry;

pub use binding::{ItemBinding, ItemContext, Subscription};
pub use error::CompositionError;
pub use identity::{generate, IdPolicy, IdSource, InstanceId, RandomIdSource, SequentialIdSource};
pub use registry::{Change, GroupContext, InstanceRecord, ListenerId, Registry, Snapshot};
