//! Exit codes for the `concord` binary; part of the scriptable contract.

pub const OK: i32 = 0;
/// Input file missing/unreadable or malformed arguments.
pub const CONFIG_ERROR: i32 = 2;
/// The interactive session was abandoned (closed stdin, Ctrl-C).
pub const INTERRUPTED: i32 = 130;
