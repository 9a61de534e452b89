//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Range | Domain    | Description                              |
//! |-------|-----------|------------------------------------------|
//! | 0     | Universal | Success                                  |
//! | 1     | Universal | General error (unspecified)              |
//! | 2     | Universal | Usage error (bad args, missing file)     |
//! | 40-49 | Hub       | TensorHub auth/transport codes           |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Not authenticated, or authentication was rejected.
pub const EXIT_NOT_AUTH: u8 = 40;

/// Network/HTTP error communicating with TensorHub.
pub const EXIT_NETWORK: u8 = 42;

/// Server rejected the request (bad request, unprocessable entity) or the
/// artifact failed validation locally.
pub const EXIT_VALIDATION: u8 = 43;
