//! Error kinds surfaced by map operations.

/// Errors returned by fallible map operations.
///
/// Every failing operation checks before it mutates, so an `Err` always leaves
/// the map as it was.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    /// `offset + size` does not fit in a source slice of length `len`.
    #[error("range [{offset}, {offset}+{size}) out of bounds for slice of length {len}")]
    IndexOutOfBounds { offset: usize, size: usize, len: usize },

    /// Parallel key and value slices have different lengths.
    #[error("key slice has {keys} elements but value slice has {values}")]
    LengthMismatch { keys: usize, values: usize },

    /// The map was structurally modified behind a cursor's back.
    #[error("map was structurally modified during iteration")]
    ConcurrentModification,

    /// An operation was called in a state that does not allow it.
    #[error("illegal state: {0}")]
    IllegalState(&'static str),

    /// `try_insert` found the key already present.
    #[error("key already present")]
    DuplicateKey,

    /// Load factors must lie strictly between 0 and 1.
    #[error("load factor must be greater than 0 and smaller than 1, got {0}")]
    InvalidLoadFactor(f32),

    /// The table needed for `expected` elements is not representable.
    #[error("capacity overflow: cannot size a table for {expected} elements")]
    CapacityOverflow { expected: usize },
}

/// Checks that `offset..offset + size` lies within a slice of length `len`
/// and returns the end of the range.
pub(crate) fn ensure_offset_len(len: usize, offset: usize, size: usize) -> Result<usize, MapError> {
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(end),
        _ => Err(MapError::IndexOutOfBounds { offset, size, len }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_len_bounds() {
        assert_eq!(ensure_offset_len(3, 1, 2), Ok(3));
        assert_eq!(ensure_offset_len(3, 3, 0), Ok(3));
        assert_eq!(
            ensure_offset_len(3, 2, 2),
            Err(MapError::IndexOutOfBounds { offset: 2, size: 2, len: 3 })
        );
        assert!(ensure_offset_len(3, usize::MAX, 2).is_err());
    }

    #[test]
    fn messages_name_the_problem() {
        let e = MapError::IndexOutOfBounds { offset: 4, size: 2, len: 5 };
        assert_eq!(e.to_string(), "range [4, 4+2) out of bounds for slice of length 5");
        assert_eq!(
            MapError::InvalidLoadFactor(1.5).to_string(),
            "load factor must be greater than 0 and smaller than 1, got 1.5"
        );
    }
}
