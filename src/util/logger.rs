use std::fmt::{Debug, Display, Formatter};

use super::Code;

/// An ordered debugging verbosity. Each step of the Earley engine is
/// logged only when `showDebuggingOutput` is enabled, and tracing never
/// affects results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Log {
    None,
    Default,
}

impl Log {
    pub fn enabled(self) -> bool {
        matches!(self, Log::Default)
    }
}

impl Display for Log {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Log::None => Ok(()),
            Log::Default => write!(f, "earley_pt"),
        }
    }
}

/// Emit a predictor/scanner/completer trace line, gated on both
/// `showDebuggingOutput` and `cfg(debug_assertions)`.
pub fn trace(log: Log, bucket: usize, action: &str, detail: &dyn Debug) {
    #[cfg(debug_assertions)]
    if log.enabled() {
        println!("[{}; bucket {}] {}: {:?}", log, bucket, action, detail);
    }
    #[cfg(not(debug_assertions))]
    let _ = (log, bucket, action, detail);
}

/// Emit a tokenizer trace line with source position, using [Code] to
/// translate the byte offset.
pub fn trace_tokenizer(log: Log, code: &Code, offset: usize, action: &str, detail: &dyn Debug) {
    #[cfg(debug_assertions)]
    if log.enabled() {
        println!(
            "[{}; {}] {}: {:?}",
            log,
            code.position_at(offset),
            action,
            detail
        );
    }
    #[cfg(not(debug_assertions))]
    let _ = (log, code, offset, action, detail);
}
