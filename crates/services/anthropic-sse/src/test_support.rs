//! Test-only utilities: environment isolation and SSE body builders.
//!
//! # Usage
//!
//! ```rust
//! use anthropic_sse::test_support::{EnvGuard, sse_body};
//! use serial_test::serial;
//!
//! #[test]
//! #[serial(env)]
//! fn example() {
//!     let _env = EnvGuard::set("ANTHROPIC_API_KEY", "test-key");
//!     let body = sse_body(&[("ping", serde_json::json!({"type": "ping"}))]);
//!     assert!(body.starts_with("event: ping\n"));
//! }
//! ```

/// Environment variables read by [`crate::AnthropicConfig::new`]
pub const ANTHROPIC_ENV_VARS: [&str; 3] =
    ["ANTHROPIC_API_KEY", "ANTHROPIC_AUTH_TOKEN", "ANTHROPIC_BASE_URL"];

/// RAII guard for temporarily setting an environment variable.
///
/// The variable is automatically restored to its previous state (or removed if it
/// was not set) when the guard is dropped.
pub struct EnvGuard {
    key: &'static str,
    prev: Option<String>,
}

impl EnvGuard {
    /// Set an environment variable temporarily.
    ///
    /// # Safety
    ///
    /// Uses `std::env::set_var`, which races with concurrent environment access.
    /// Only call from tests marked `#[serial(env)]`.
    #[must_use]
    pub fn set(key: &'static str, val: &str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: callers serialize environment access with #[serial(env)]
        unsafe { std::env::set_var(key, val) };
        Self { key, prev }
    }

    /// Remove an environment variable temporarily.
    ///
    /// # Safety
    ///
    /// Same constraint as [`EnvGuard::set`].
    #[must_use]
    pub fn remove(key: &'static str) -> Self {
        let prev = std::env::var(key).ok();
        // SAFETY: see EnvGuard::set
        unsafe { std::env::remove_var(key) };
        Self { key, prev }
    }

    /// Unset every variable the config reads, restoring them on drop
    #[must_use]
    pub fn isolate_anthropic_env() -> Vec<Self> {
        ANTHROPIC_ENV_VARS.into_iter().map(Self::remove).collect()
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        // SAFETY: see EnvGuard::set
        match &self.prev {
            Some(v) => unsafe { std::env::set_var(self.key, v) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

/// Render `(event name, payload)` pairs as an SSE body, one blank line between frames
#[must_use]
pub fn sse_body(events: &[(&str, serde_json::Value)]) -> String {
    events
        .iter()
        .map(|(name, data)| format!("event: {name}\ndata: {data}\n\n"))
        .collect()
}
