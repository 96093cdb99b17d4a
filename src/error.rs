// Copyright 2023, Collabora, Ltd.
// SPDX-License-Identifier: BSL-1.0
// Author: Ryan A. Pavlik <ryan.pavlik@collabora.com>

use thiserror::Error;

/// Error type returned by buffer reads, writes, slicing and hex import.
///
/// A failing operation never leaves a partially applied change behind:
/// cursors and written bytes are exactly as they were before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("buffer operation out of bounds: requested {requested} bytes, {available} available")]
    OutOfBounds { requested: usize, available: usize },
    #[error("attempted to write to a read-only buffer view")]
    ImmutableBufferWrite,
    #[error("malformed hex token '{token}' in expression '{expr}'")]
    MalformedHexInput { token: String, expr: String },
    #[error("field value of {len} bytes exceeds the maximum of {max}")]
    FieldTooLong { len: usize, max: usize },
}

impl BufferError {
    pub(crate) fn out_of_bounds(requested: usize, available: usize) -> BufferError {
        BufferError::OutOfBounds {
            requested,
            available,
        }
    }
}

/// Shorthand for results of buffer operations.
pub type Result<T> = std::result::Result<T, BufferError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            BufferError::out_of_bounds(4, 1).to_string(),
            "buffer operation out of bounds: requested 4 bytes, 1 available"
        );
        assert_eq!(
            BufferError::MalformedHexInput {
                token: "0G".to_string(),
                expr: "AB 0G".to_string()
            }
            .to_string(),
            "malformed hex token '0G' in expression 'AB 0G'"
        );
    }
}
