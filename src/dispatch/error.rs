//! Dispatch error definitions.

use thiserror::Error;

use crate::loader::LoadError;

/// Hard failures of a resolution.
///
/// An app that simply cannot be found on disk is not an error; it surfaces
/// as [`Resolution::PassThrough`](crate::dispatch::Resolution::PassThrough).
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The path named a denied app or the target of a mapping.
    #[error("app not exists:{0}")]
    AppNotFound(String),

    /// An app resource file exists but could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),
}
