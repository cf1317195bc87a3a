use thiserror::Error;

/// Error types for `StrBuf` operations
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum StrbError {
    /// The backend cannot provide the requested room and cannot grow
    #[error("Capacity exhausted: requested {requested} bytes, but only {available} bytes available")]
    CapacityExhausted {
        /// Number of bytes requested, terminator included
        requested: usize,
        /// Number of bytes available from the write offset
        available: usize,
    },
    /// Heap storage could not be reserved
    #[error("Allocation failed: could not reserve {requested} bytes")]
    AllocationFailed {
        /// Total size that was requested
        requested: usize,
    },
    /// Every slot of a pool is in use
    #[error("Slot pool exhausted: all {slots} slots are in use")]
    PoolExhausted {
        /// Number of slots in the pool
        slots: usize,
    },
    /// The write would not be representable by the size type
    #[error("Size range exhausted: {requested} bytes at offset {top} would exceed maximum size {max}")]
    RangeExhausted {
        /// Offset the write would start growing from
        top: usize,
        /// Number of bytes requested
        requested: usize,
        /// Maximum representable size
        max: usize,
    },
    /// An adopted array holds no terminator within its usable bounds
    #[error("Missing terminator: no zero byte within {size} bytes")]
    MissingTerminator {
        /// Number of bytes scanned
        size: usize,
    },
    /// Zero-size buffer provided where at least the terminator must fit
    #[error("Zero-size buffer: at least one byte is required for the terminator")]
    ZeroSizeBuffer,
    /// Source content cannot fit in any buffer
    #[error("Content too long: {len} bytes exceeds maximum of {max}")]
    TooLong {
        /// Length of the source content
        len: usize,
        /// Maximum content length
        max: usize,
    },
    /// Raw mode value is neither insert nor overwrite
    #[error("Invalid mode: {value} is neither insert (0) nor overwrite (1)")]
    InvalidMode {
        /// Value that was provided
        value: i32,
    },
    /// Cursor position cannot be addressed by this buffer
    #[error("Invalid position: {position} must be below {limit}")]
    InvalidPosition {
        /// Position that was requested
        position: usize,
        /// Exclusive upper bound for positions
        limit: usize,
    },
    /// Undo requested but the last operation was not a put
    #[error("Nothing to undo: the last operation was not a put")]
    NothingToUndo,
    /// The formatting machinery reported an error
    #[error("Formatting failed")]
    Format,
}
