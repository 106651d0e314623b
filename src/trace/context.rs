//! Trace identifiers, the active trace context, and request baggage.
//!
//! The "currently active context" is an explicit value threaded through the
//! pipeline's call chain. Nothing here is process-global, so concurrent
//! requests cannot cross-contaminate each other's active span.

use std::fmt;

use rand::Rng;
use uuid::Uuid;

/// 128-bit trace identifier, fixed for the whole request.
///
/// The all-zero id is invalid on the wire and is never produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(u128);

impl TraceId {
    /// Generate a fresh random trace id.
    pub fn generate() -> Self {
        loop {
            let raw = Uuid::new_v4().as_u128();
            if raw != 0 {
                return TraceId(raw);
            }
        }
    }

    /// Parse from exactly 32 lowercase hex characters. Rejects all-zero.
    pub fn try_from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 32 || !hex.bytes().all(is_lower_hex) {
            return None;
        }
        match u128::from_str_radix(hex, 16) {
            Ok(0) | Err(_) => None,
            Ok(raw) => Some(TraceId(raw)),
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit span identifier, unique per span within a trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(u64);

impl SpanId {
    /// Generate a fresh random span id.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let raw: u64 = rng.gen();
            if raw != 0 {
                return SpanId(raw);
            }
        }
    }

    /// Parse from exactly 16 lowercase hex characters. Rejects all-zero.
    pub fn try_from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 16 || !hex.bytes().all(is_lower_hex) {
            return None;
        }
        match u64::from_str_radix(hex, 16) {
            Ok(0) | Err(_) => None,
            Ok(raw) => Some(SpanId(raw)),
        }
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

fn is_lower_hex(b: u8) -> bool {
    b.is_ascii_digit() || (b'a'..=b'f').contains(&b)
}

/// The `(trace_id, span_id, sampled)` triple identifying the currently
/// active span for propagation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: bool,
}

impl TraceContext {
    /// Mint a fresh root context: new trace id, new span id, sampled.
    pub fn generate() -> Self {
        TraceContext {
            trace_id: TraceId::generate(),
            span_id: SpanId::generate(),
            sampled: true,
        }
    }
}

/// Request-scoped key/value metadata propagated alongside the trace context.
///
/// Keys are unique; inserting an existing key overwrites its value in place,
/// so iteration order is the insertion order of first writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baggage {
    entries: Vec<(String, String)>,
}

impl Baggage {
    pub fn new() -> Self {
        Baggage::default()
    }

    /// Insert an entry. Last write wins on a duplicate key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
