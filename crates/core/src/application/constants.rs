// Bridge constants (no magic values)
use std::time::Duration;

/// Default cap on simultaneously running backend processes
pub const DEFAULT_MAX_CONCURRENT_PROCESSES: usize = 4;

/// Default per-invocation deadline (30 seconds)
pub const DEFAULT_INVOKE_TIMEOUT_MS: u64 = 30_000;

/// Grace period between SIGTERM and SIGKILL for a timed-out backend (5 seconds)
pub const GRACEFUL_SHUTDOWN_TIMEOUT_MS: u64 = 5_000;

/// How often a terminating child is polled for exit
pub const KILL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Read buffer size used while draining child pipes
pub const STREAM_READ_CHUNK_BYTES: usize = 8 * 1024;

/// Environment variables passed to the backend by default
pub const DEFAULT_ENV_ALLOWLIST: &[&str] = &["PATH", "HOME", "USER", "LANG"];
