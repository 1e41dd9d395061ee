//! Stable exit codes for `sim-runner`.

/// Command succeeded (or the child exited 0 when exit codes are propagated).
pub const OK: i32 = 0;
/// Invalid flags, config, or other errors before launch.
pub const INVALID: i32 = 1;
/// The child process could not be started.
pub const LAUNCH_FAILED: i32 = 127;

/// Map a child exit code to a process exit code in `0..=255`.
///
/// Negative codes are signal terminations and map to `128 + signal`.
pub fn from_child(code: i32) -> i32 {
    if code < 0 {
        128i32.saturating_sub(code).min(255)
    } else {
        code.min(255)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_codes_pass_through() {
        assert_eq!(from_child(0), OK);
        assert_eq!(from_child(1), 1);
        assert_eq!(from_child(300), 255);
    }

    #[test]
    fn signals_map_above_128() {
        assert_eq!(from_child(-9), 137);
        assert_eq!(from_child(-15), 143);
    }
}
