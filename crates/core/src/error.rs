//! Composition errors.

use thiserror::Error;

/// A building block was used outside the scope it requires.
///
/// These are integration bugs, not runtime faults: they are reported when a
/// tree is mounted so the caller finds out immediately.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompositionError {
    /// An `Item` (or a raw item binding) was mounted without an enclosing `Group`.
    #[error("{component} must be placed inside a Group")]
    MissingGroupContext { component: &'static str },

    /// A `Header` or `Panel` was mounted without an enclosing `Item`.
    #[error("{component} must be placed inside an Item")]
    MissingItemContext { component: &'static str },
}

impl CompositionError {
    /// Name of the component that was misplaced.
    pub fn component(&self) -> &'static str {
        match self {
            Self::MissingGroupContext { component } | Self::MissingItemContext { component } => {
                component
            }
        }
    }
}
