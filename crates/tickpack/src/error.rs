//! Error and Result types for tickpack codec operations.

use thiserror::Error;

/// A convenience `Result` type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// The error type shared by every encoder and decoder in this crate.
///
/// All three kinds are fatal to the current call; none of them leaves a
/// decoder or encoder in a resumable state. They differ in what the caller
/// should do next:
///
/// - [`AssertFailure`](CodecError::AssertFailure) signals a caller bug
///   (bad arguments, out-of-order delivery) and is not meant to be caught
///   per value.
/// - [`ValueOverflow`](CodecError::ValueOverflow) means the chosen codec
///   cannot represent this input. It is the expected fallback signal for
///   the orchestration layer in [`crate::helper`].
/// - [`MalformedData`](CodecError::MalformedData) means the input bytes
///   are not a valid encoding of the scheme being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A caller precondition was violated.
    #[error("not allowed: {0}")]
    AssertFailure(&'static str),

    /// The input cannot be represented by the chosen codec.
    #[error("value overflow: {0}")]
    ValueOverflow(&'static str),

    /// The input byte sequence is not a valid encoding of this scheme.
    #[error("malformed data: {0}")]
    MalformedData(&'static str),
}

/// Fails with [`CodecError::AssertFailure`] when `cond` holds.
pub(crate) fn not_allow(cond: bool, what: &'static str) -> Result<()> {
    if cond {
        Err(CodecError::AssertFailure(what))
    } else {
        Ok(())
    }
}

/// Fails with [`CodecError::ValueOverflow`] when `cond` holds.
pub(crate) fn value_overflow(cond: bool, what: &'static str) -> Result<()> {
    if cond {
        Err(CodecError::ValueOverflow(what))
    } else {
        Ok(())
    }
}

/// Fails with [`CodecError::MalformedData`] when `cond` holds.
pub(crate) fn malformed_data(cond: bool, what: &'static str) -> Result<()> {
    if cond {
        Err(CodecError::MalformedData(what))
    } else {
        Ok(())
    }
}
