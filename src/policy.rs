//! Policy resolver: picks a disposition for one incoming operation.

use crate::mode::Mode;

/// The resolved action for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Start the request; anything already in flight is left alone.
    Dispatch,
    /// Do not start; an earlier request of the kind is still in flight.
    Suppress,
    /// Abort every in-flight request of the kind, oldest first, then start.
    CancelThenDispatch,
}

/// Decides what happens to an incoming operation, given the resolved mode
/// and how many requests of the same kind are currently in flight.
///
/// Pure decision function. Executing the disposition, including the actual
/// aborts, is the tracker's job.
#[must_use]
pub fn resolve(mode: Mode, outstanding: usize) -> Disposition {
    match mode {
        Mode::Force => Disposition::Dispatch,
        Mode::Prevent if outstanding == 0 => Disposition::Dispatch,
        Mode::Prevent => Disposition::Suppress,
        Mode::Abort if outstanding == 0 => Disposition::Dispatch,
        Mode::Abort => Disposition::CancelThenDispatch,
    }
}
