use thiserror::Error;

/// Table construction error types.
///
/// Construction is synchronous: every variant aborts the build call that
/// produced it, and no partially built table is ever returned. Lookups have
/// no error path; a miss is an ordinary `None`.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("allocation of {requested} bytes failed: {used} of {limit} bytes in use")]
    AllocationFailure {
        requested: usize,
        used: usize,
        limit: usize,
    },

    #[error("conflicting key \"{0}\"")]
    DuplicateKey(String),

    #[error("incompatible flags for key \"{0}\"")]
    IncompatibleKeyFlags(String),

    #[error("invalid key \"{0}\"")]
    InvalidKey(String),

    #[error("could not build {name} hash: no table size within max_size {max_size} fits bucket_size {bucket_size}")]
    NoFeasibleBucketSize {
        name: &'static str,
        max_size: usize,
        bucket_size: usize,
    },
}

pub type Result<T> = std::result::Result<T, BuildError>;
