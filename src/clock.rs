//! Wall-clock sampling shared by the echo server and the probe driver.
//!
//! Skew estimation compares client and server stamps, so both sides must
//! read the same kind of clock: wall time, not a monotonic instant.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in nanoseconds since the Unix epoch.
///
/// Saturates at zero for clocks set before the epoch rather than
/// panicking; such a clock produces meaningless skew numbers either way.
pub(crate) fn unix_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(0)
}
