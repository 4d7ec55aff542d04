#![forbid(unsafe_code)]

//! JSON host-event parser.
//!
//! Hosts that batch DOM events through a message channel (a worker, a
//! replay log) encode them as one JSON object per event:
//!
//! ```json
//! {"kind":"pointer_down","carousel":3,"source":"touch","x":120,"y":40,"t_ms":16.6}
//! {"kind":"pointer_move","x":96,"y":41,"touches":1,"t_ms":33.3}
//! {"kind":"pointer_up","t_ms":50}
//! {"kind":"pointer_cancel","t_ms":51}
//! {"kind":"resize"}
//! {"kind":"tick","t_ms":300}
//! ```
//!
//! [`parse_host_event`] turns one object into a [`HostEvent`]. Feature-gated
//! behind `input-parser`.

use core::time::Duration;

use serde::Deserialize;
use swipe_core::{CarouselId, PointerSample, PointerSource};

use crate::HostEvent;

/// Errors from parsing host-event JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum InputParseError {
    /// Malformed JSON.
    Json(String),
    /// Missing required field.
    MissingField(&'static str),
    /// Unknown event kind.
    UnknownKind(String),
    /// Unknown pointer source.
    UnknownSource(String),
    /// Negative or non-finite timestamp.
    InvalidTimestamp(f64),
}

impl core::fmt::Display for InputParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "JSON parse error: {msg}"),
            Self::MissingField(field) => write!(f, "missing required field: {field}"),
            Self::UnknownKind(kind) => write!(f, "unknown event kind: {kind}"),
            Self::UnknownSource(source) => write!(f, "unknown pointer source: {source}"),
            Self::InvalidTimestamp(t) => write!(f, "invalid timestamp: {t}"),
        }
    }
}

impl std::error::Error for InputParseError {}

/// Internal deserialization target.
#[derive(Debug, Deserialize)]
struct RawHostEvent {
    kind: String,
    #[serde(default)]
    carousel: Option<u32>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    touches: Option<u8>,
    #[serde(default)]
    t_ms: Option<f64>,
}

/// Parse one JSON-encoded host event.
pub fn parse_host_event(json: &str) -> Result<HostEvent, InputParseError> {
    let raw: RawHostEvent =
        serde_json::from_str(json).map_err(|e| InputParseError::Json(e.to_string()))?;

    match raw.kind.as_str() {
        "pointer_down" => {
            let target = raw
                .carousel
                .map(CarouselId::from_raw)
                .ok_or(InputParseError::MissingField("carousel"))?;
            let source = parse_source(raw.source.as_deref())?;
            Ok(HostEvent::PointerDown {
                target,
                source,
                sample: parse_sample(&raw)?,
                now: parse_time(raw.t_ms)?,
            })
        }
        "pointer_move" => Ok(HostEvent::PointerMove {
            sample: parse_sample(&raw)?,
            now: parse_time(raw.t_ms)?,
        }),
        "pointer_up" => Ok(HostEvent::PointerUp {
            now: parse_time(raw.t_ms)?,
        }),
        "pointer_cancel" => Ok(HostEvent::PointerCancel {
            now: parse_time(raw.t_ms)?,
        }),
        "resize" | "orientationchange" => Ok(HostEvent::Resize),
        "tick" => Ok(HostEvent::Tick {
            now: parse_time(raw.t_ms)?,
        }),
        other => Err(InputParseError::UnknownKind(other.to_string())),
    }
}

fn parse_source(source: Option<&str>) -> Result<PointerSource, InputParseError> {
    match source {
        None | Some("touch") => Ok(PointerSource::Touch),
        Some("mouse") => Ok(PointerSource::Mouse),
        Some(other) => Err(InputParseError::UnknownSource(other.to_string())),
    }
}

fn parse_sample(raw: &RawHostEvent) -> Result<PointerSample, InputParseError> {
    let x = raw.x.ok_or(InputParseError::MissingField("x"))?;
    let y = raw.y.ok_or(InputParseError::MissingField("y"))?;
    Ok(PointerSample::new(x, y).with_touches(raw.touches.unwrap_or(1)))
}

fn parse_time(t_ms: Option<f64>) -> Result<Duration, InputParseError> {
    let t_ms = t_ms.ok_or(InputParseError::MissingField("t_ms"))?;
    if !t_ms.is_finite() || t_ms < 0.0 {
        return Err(InputParseError::InvalidTimestamp(t_ms));
    }
    Ok(Duration::from_secs_f64(t_ms / 1000.0))
}
