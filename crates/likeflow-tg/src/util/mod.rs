//! Assorted utility functions (missing batteries).
mod std_ext;

pub(crate) mod tokio;

pub(crate) mod prelude {
    pub(crate) use super::std_ext::prelude::*;
    pub(crate) use super::tokio::TimeoutExt as _;
}

pub(crate) type DynError = dyn std::error::Error + Send + Sync;
