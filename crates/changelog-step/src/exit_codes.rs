//! Exit codes for the step

/// Success
pub const SUCCESS: u8 = 0;

/// Any failure: bad inputs, install, file, subprocess or export errors
pub const ERROR: u8 = 1;
