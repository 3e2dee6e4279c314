//! Error types for the akami core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.

use std::{fmt, sync::Arc};

use thiserror::Error;

use crate::linkage::{LinkageError, LinkageErrorCode};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Error type produced when constructing or running [`crate::Agglomerative`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum AgglomerativeError {
    /// The requested flat cluster count must be greater than zero.
    #[error("n_clusters must be at least 1 (got {got})")]
    InvalidClusterTarget {
        /// The invalid cluster count supplied by the caller.
        got: usize,
    },
    /// Tree construction or cutting failed while running the estimator.
    #[error("clustering `{data_source}` failed: {error}")]
    Linkage {
        /// Identifier for the input that produced the error.
        data_source: Arc<str>,
        #[source]
        /// Underlying linkage error bubbled up by the algorithm.
        error: LinkageError,
    },
}

define_error_codes! {
    /// Stable codes describing [`AgglomerativeError`] variants.
    enum AgglomerativeErrorCode for AgglomerativeError {
        /// The requested flat cluster count must be greater than zero.
        InvalidClusterTarget => InvalidClusterTarget { .. } => "AGGLOMERATIVE_INVALID_CLUSTER_TARGET",
        /// Tree construction or cutting failed while running the estimator.
        LinkageFailure => Linkage { .. } => "AGGLOMERATIVE_LINKAGE_FAILURE",
    }
}

impl AgglomerativeError {
    /// Retrieve the inner [`LinkageErrorCode`] when the error originated in tree
    /// construction or cutting.
    pub const fn linkage_code(&self) -> Option<LinkageErrorCode> {
        match self {
            Self::Linkage { error, .. } => Some(error.code()),
            Self::InvalidClusterTarget { .. } => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, AgglomerativeError>;
