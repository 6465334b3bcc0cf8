pub const UNRESOLVED_ENTRY: &str = "UNRESOLVED_ENTRY";
pub const UNRESOLVED_IMPORT: &str = "UNRESOLVED_IMPORT";
pub const TRANSFORM_FAILED: &str = "TRANSFORM_FAILED";
pub const OPTIMIZE_FAILED: &str = "OPTIMIZE_FAILED";
pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
pub const IO_ERROR: &str = "IO_ERROR";
pub const PANIC: &str = "PANIC";
