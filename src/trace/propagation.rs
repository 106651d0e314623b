//! W3C `traceparent`/`baggage` header encoding and decoding.
//!
//! `inject` and `extract` are pure functions over a [`Carrier`], so the same
//! code serves outbound `http::HeaderMap`s and the plain map used in tests.
//! A missing or malformed incoming header is never an error: extraction
//! returns `None` and the caller starts a new root trace instead.

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::trace::context::{Baggage, SpanId, TraceContext, TraceId};

/// Header carrying the trace context: `00-{trace_id}-{span_id}-{flags}`.
pub const TRACEPARENT: &str = "traceparent";

/// Header carrying baggage: `key1=value1,key2=value2`, percent-encoded.
pub const BAGGAGE: &str = "baggage";

const SAMPLED_FLAG: u8 = 0x01;

/// Key/value header map used to move trace context across a process
/// boundary. Write-only for the sender, read-only for the receiver.
pub trait Carrier {
    fn get(&self, key: &str) -> Option<&str>;
    fn set(&mut self, key: &str, value: String);
}

/// Plain owned carrier, created fresh per outbound call.
#[derive(Debug, Default)]
pub struct HeaderCarrier {
    entries: Vec<(String, String)>,
}

impl HeaderCarrier {
    pub fn new() -> Self {
        HeaderCarrier::default()
    }
}

impl Carrier for HeaderCarrier {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    fn set(&mut self, key: &str, value: String) {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }
}

impl Carrier for HeaderMap {
    fn get(&self, key: &str) -> Option<&str> {
        HeaderMap::get(self, key).and_then(|v| v.to_str().ok())
    }

    fn set(&mut self, key: &str, value: String) {
        let Ok(name) = key.parse::<HeaderName>() else {
            tracing::debug!(%key, "failed to parse header name");
            return;
        };
        let Ok(value) = HeaderValue::from_str(&value) else {
            tracing::debug!(%key, "failed to parse header value");
            return;
        };
        self.insert(name, value);
    }
}

/// Write the active trace context and a baggage snapshot into `carrier`.
///
/// Deterministic, no blocking. Empty baggage writes no `baggage` header.
pub fn inject(ctx: &TraceContext, baggage: &Baggage, carrier: &mut dyn Carrier) {
    let flags = if ctx.sampled { SAMPLED_FLAG } else { 0 };
    carrier.set(
        TRACEPARENT,
        format!("00-{}-{}-{:02x}", ctx.trace_id, ctx.span_id, flags),
    );

    if !baggage.is_empty() {
        let header = baggage
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(",");
        carrier.set(BAGGAGE, header);
    }
}

/// Recover trace context and baggage from `carrier`.
///
/// Each component is parsed independently; `None` means absent or malformed.
pub fn extract(carrier: &dyn Carrier) -> (Option<TraceContext>, Option<Baggage>) {
    let ctx = carrier.get(TRACEPARENT).and_then(parse_traceparent);
    let baggage = carrier.get(BAGGAGE).and_then(parse_baggage);
    (ctx, baggage)
}

fn parse_traceparent(header: &str) -> Option<TraceContext> {
    let mut parts = header.trim().split('-');

    // only version 00 is understood
    if parts.next()? != "00" {
        return None;
    }
    let trace_id = TraceId::try_from_hex(parts.next()?)?;
    let span_id = SpanId::try_from_hex(parts.next()?)?;
    let flags = parts.next()?;
    if parts.next().is_some() || flags.len() != 2 {
        return None;
    }
    let flags = u8::from_str_radix(flags, 16).ok()?;

    Some(TraceContext {
        trace_id,
        span_id,
        sampled: flags & SAMPLED_FLAG != 0,
    })
}

fn parse_baggage(header: &str) -> Option<Baggage> {
    let mut baggage = Baggage::new();
    for entry in header.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            return None;
        }
        let (key, value) = entry.split_once('=')?;
        let key = percent_decode(key.trim())?;
        let value = percent_decode(value.trim())?;
        if key.is_empty() {
            return None;
        }
        baggage.insert(key, value);
    }
    if baggage.is_empty() {
        None
    } else {
        Some(baggage)
    }
}

// Unreserved characters per RFC 3986; everything else is %XX-escaped so the
// header survives commas, equals signs, spaces, and non-ASCII bytes.
fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~')
}

fn percent_encode(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

fn percent_decode(encoded: &str) -> Option<String> {
    let bytes = encoded.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(trace: u128, span: u64) -> TraceContext {
        TraceContext {
            trace_id: TraceId::try_from_hex(&format!("{:032x}", trace)).unwrap(),
            span_id: SpanId::try_from_hex(&format!("{:016x}", span)).unwrap(),
            sampled: true,
        }
    }

    #[test]
    fn test_inject_writes_w3c_headers() {
        let mut baggage = Baggage::new();
        baggage.insert("user.id", "12345");
        let mut carrier = HeaderCarrier::new();
        inject(&ctx(0xab, 0xcd), &baggage, &mut carrier);

        assert_eq!(
            carrier.get(TRACEPARENT),
            Some("00-000000000000000000000000000000ab-00000000000000cd-01")
        );
        assert_eq!(carrier.get(BAGGAGE), Some("user.id=12345"));
    }

    #[test]
    fn test_round_trip_preserves_context_and_baggage() {
        let cases = [
            (ctx(1, 1), Baggage::new()),
            (ctx(u128::MAX, u64::MAX), {
                let mut b = Baggage::new();
                b.insert("user.id", "12345");
                b
            }),
            (ctx(0xdeadbeefdeadbeefdeadbeefdeadbeef, 0x1234567890abcdef), {
                let mut b = Baggage::new();
                b.insert("user.id", "12345");
                b.insert("user.name", "john doe,jr=%");
                b.insert("note", "héllo");
                b
            }),
        ];

        for (context, baggage) in cases {
            let mut carrier = HeaderCarrier::new();
            inject(&context, &baggage, &mut carrier);
            let (got_ctx, got_baggage) = extract(&carrier);

            assert_eq!(got_ctx, Some(context));
            if baggage.is_empty() {
                assert_eq!(got_baggage, None);
            } else {
                assert_eq!(got_baggage, Some(baggage));
            }
        }
    }

    #[test]
    fn test_unsampled_flag_round_trips() {
        let mut context = ctx(7, 9);
        context.sampled = false;
        let mut carrier = HeaderCarrier::new();
        inject(&context, &Baggage::new(), &mut carrier);

        assert!(carrier.get(TRACEPARENT).unwrap().ends_with("-00"));
        assert_eq!(extract(&carrier).0, Some(context));
    }

    #[test]
    fn test_missing_headers_extract_as_absent() {
        let carrier = HeaderCarrier::new();
        let (ctx, baggage) = extract(&carrier);
        assert!(ctx.is_none());
        assert!(baggage.is_none());
    }

    #[test]
    fn test_malformed_traceparent_extracts_as_absent() {
        let bad = [
            "",
            "not-a-traceparent",
            "01-000000000000000000000000000000ab-00000000000000cd-01",
            "00-00000000000000000000000000000000-00000000000000cd-01",
            "00-000000000000000000000000000000ab-0000000000000000-01",
            "00-000000000000000000000000000000AB-00000000000000cd-01",
            "00-000000000000000000000000000000ab-00000000000000cd-01-extra",
            "00-000000000000000000000000000000ab-00000000000000cd-1",
        ];
        for header in bad {
            let mut carrier = HeaderCarrier::new();
            carrier.set(TRACEPARENT, header.to_string());
            assert_eq!(extract(&carrier).0, None, "accepted {header:?}");
        }
    }

    #[test]
    fn test_malformed_baggage_extracts_as_absent() {
        for header in ["", "no-equals-sign", "=value", "a=b,,c=d", "k=%zz"] {
            let mut carrier = HeaderCarrier::new();
            carrier.set(BAGGAGE, header.to_string());
            assert_eq!(extract(&carrier).1, None, "accepted {header:?}");
        }
    }

    #[test]
    fn test_header_map_carrier() {
        let mut headers = HeaderMap::new();
        inject(&ctx(2, 3), &Baggage::new(), &mut headers);

        let (got, _) = extract(&headers);
        assert_eq!(got, Some(ctx(2, 3)));
    }
}
