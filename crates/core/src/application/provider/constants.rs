// Provider constants

use std::time::Duration;

/// Bound on each sourcing step so the UI is never left loading forever.
pub const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(4);

/// Entity count requested from the remote sourcing paths.
pub const DEFAULT_TARGET_COUNT: usize = 12;
