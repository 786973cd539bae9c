use thiserror::Error;

/// A violated planning precondition. Always fatal: retrying with the same
/// inputs reproduces the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("template has no slots (slot count must be positive)")]
    NoSlots,

    #[error("slice size must be positive")]
    ZeroSliceSize,

    #[error("slot count {slots} is not divisible by slice size {slice}")]
    SliceMismatch { slots: usize, slice: usize },

    #[error("parity must be at least 1")]
    ZeroParity,

    #[error("slot count {slots} is not divisible by parity {parity}")]
    ParityMismatch { slots: usize, parity: usize },

    #[error("row count {rows} (slots {slots} / slice {slice}) is not divisible by parity {parity} in naive mode")]
    RowParityMismatch {
        rows: usize,
        slots: usize,
        slice: usize,
        parity: usize,
    },

    #[error("copies must be at least 1")]
    ZeroCopies,

    #[error("catalog contains no sets")]
    EmptyCatalog,

    #[error("{copies} copies of a {len}-card set overflow the card index range")]
    CopiesOverflow { copies: usize, len: usize },

    #[error("lane table has {len} entries but the template has {slots} slots")]
    LaneTableLength { len: usize, slots: usize },

    #[error("lane {lane} is out of range for a template with {slots} slots")]
    LaneOutOfRange { lane: usize, slots: usize },

    #[error("lane {lane} has no slots assigned (lanes must cover 0..={max})")]
    EmptyLane { lane: usize, max: usize },

    #[error("unknown layout mode '{0}' (expected 'naive' or 'cell-stack')")]
    UnknownMode(String),
}
