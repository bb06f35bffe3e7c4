//! Process exit codes. Part of the CLI contract.

pub const SUCCESS: i32 = 0;
pub const CONFIG_ERROR: i32 = 2; // Missing credentials, unreadable config or input
