//! Flags crossing the scanner/main-loop boundary.

use core::sync::atomic::{AtomicBool, Ordering};

static RESET_REQUEST: AtomicBool = AtomicBool::new(false);
static MATRIX_REINIT: AtomicBool = AtomicBool::new(false);

/// Ask the main loop to run the host reset sequence.
pub fn request_reset() {
    RESET_REQUEST.store(true, Ordering::Release);
}

/// Is a reset waiting to be executed?
pub fn reset_requested() -> bool {
    RESET_REQUEST.load(Ordering::Acquire)
}

/// Consume a pending reset request.
pub fn take_reset_request() -> bool {
    RESET_REQUEST.swap(false, Ordering::AcqRel)
}

/// Tell the scanner to forget all matrix state on its next tick.
pub fn flag_matrix_reinit() {
    MATRIX_REINIT.store(true, Ordering::Release);
}

/// Consume a pending matrix reinitialization request.
pub fn take_matrix_reinit() -> bool {
    MATRIX_REINIT.swap(false, Ordering::AcqRel)
}
