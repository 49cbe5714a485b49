//! Realtime payload decoding.
//!
//! DESIGN
//! ======
//! Inbound payloads are JSON objects selected by an `action` string. The
//! decoder collapses them into a closed [`RealtimeCommand`] so dispatch in
//! the cache is exhaustive: commits become strokes, an end-of-clear clears,
//! and every other action (progress signals, actions added by newer peers,
//! payloads with no action at all) lands in [`RealtimeCommand::Ignored`].
//!
//! ERROR HANDLING
//! ==============
//! Payload text is read as strict JSON first and, failing that, as JSON5 so
//! peers that emit unquoted keys (`{action: "endClearBoard"}`) still decode.
//! A payload that neither parser accepts, that is not an object, or a
//! `contentCommit` missing a required field yields a [`DecodeError`]. The decoder never builds a
//! partial stroke; either the whole commit validates or nothing is produced.
//!
//! Payload shape for a commit:
//!
//! ```json
//! {
//!   "action": "contentCommit",
//!   "curvePoints": [120.0, 90.0, 1.0, 10.0, 5.0, 1.0],
//!   "color": { "red": 0.0, "green": 0.0, "blue": 0.0, "alpha": 1.0 },
//!   "stride": 3,
//!   "drawMode": "ERASE"
//! }
//! ```

#[cfg(test)]
#[path = "decoder_test.rs"]
mod decoder_test;

use serde::{Deserialize, Deserializer, de};
use serde_json::{Map, Value};

use crate::color::{Color, ColorError};
use crate::stroke::{BlendMode, Stroke, StrokeError};

/// Error returned by [`decode_payload`] and [`decode_value`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload text is neither valid JSON nor valid JSON5.
    #[error("payload is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    /// The payload is JSON but not an object.
    #[error("payload is not a JSON object")]
    NotAnObject,
    /// A `contentCommit` is missing or mistypes a required field.
    #[error("invalid contentCommit payload: {0}")]
    InvalidCommit(#[source] serde_json::Error),
    /// The commit color could not be decoded.
    #[error("invalid contentCommit color: {0}")]
    InvalidColor(#[from] ColorError),
    /// The commit points do not form a valid stroke.
    #[error("invalid contentCommit stroke: {0}")]
    InvalidStroke(#[from] StrokeError),
}

/// Every action string the realtime protocol defines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealtimeAction {
    /// A remote stroke started; transient.
    ContentBegin,
    /// A remote stroke in progress; transient.
    ContentUpdate,
    /// A remote stroke finished and is now part of the board.
    ContentCommit,
    /// A remote stroke was abandoned; transient.
    ContentCancel,
    /// A remote clear started; transient.
    StartClearBoard,
    /// A remote clear finished; the board is now empty.
    EndClearBoard,
}

impl RealtimeAction {
    pub const ALL: [Self; 6] = [
        Self::ContentBegin,
        Self::ContentUpdate,
        Self::ContentCommit,
        Self::ContentCancel,
        Self::StartClearBoard,
        Self::EndClearBoard,
    ];

    /// Wire name of the action.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContentBegin => "contentBegin",
            Self::ContentUpdate => "contentUpdate",
            Self::ContentCommit => "contentCommit",
            Self::ContentCancel => "contentCancel",
            Self::StartClearBoard => "startClearBoard",
            Self::EndClearBoard => "endClearBoard",
        }
    }

    /// Parse a wire name. Unknown names return `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == raw)
    }
}

/// A decoded realtime edit.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeCommand {
    /// Append this stroke to the live board.
    Commit(Stroke),
    /// Remove every stroke from the live board.
    ClearEnd,
    /// No state change.
    Ignored,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitFields {
    curve_points: Vec<f32>,
    color: Value,
    #[serde(deserialize_with = "deserialize_stride")]
    stride: usize,
    #[serde(default)]
    draw_mode: Option<String>,
}

/// Decode a raw payload string.
///
/// # Errors
///
/// See [`DecodeError`].
pub fn decode_payload(payload: &str) -> Result<RealtimeCommand, DecodeError> {
    let value = parse_payload(payload)?;
    decode_value(&value)
}

/// The strict parser's error is the one reported when both reject the text.
fn parse_payload(payload: &str) -> Result<Value, DecodeError> {
    match serde_json::from_str(payload) {
        Ok(value) => Ok(value),
        Err(strict) => json5::from_str::<Value>(payload).map_err(|_| DecodeError::Json(strict)),
    }
}

/// Stride arrives as a JSON number; integral floats such as `3.0` count.
/// Zero passes here and is rejected by [`Stroke::new`].
#[allow(clippy::float_cmp, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn deserialize_stride<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !(0.0..=f64::from(u32::MAX)).contains(&raw) || raw.trunc() != raw {
        return Err(de::Error::custom(format_args!(
            "stride must be a non-negative integer, got {raw}"
        )));
    }
    Ok(raw as usize)
}

/// Decode an already-parsed payload.
///
/// # Errors
///
/// Returns [`DecodeError::NotAnObject`] for non-object payloads; commit
/// payloads can also fail with the commit-specific variants.
pub fn decode_value(value: &Value) -> Result<RealtimeCommand, DecodeError> {
    let Some(fields) = value.as_object() else {
        return Err(DecodeError::NotAnObject);
    };
    let action = fields
        .get("action")
        .and_then(Value::as_str)
        .and_then(RealtimeAction::parse);

    match action {
        Some(RealtimeAction::ContentCommit) => decode_commit(value).map(RealtimeCommand::Commit),
        Some(RealtimeAction::EndClearBoard) => Ok(RealtimeCommand::ClearEnd),
        Some(
            RealtimeAction::ContentBegin
            | RealtimeAction::ContentUpdate
            | RealtimeAction::ContentCancel
            | RealtimeAction::StartClearBoard,
        )
        | None => Ok(RealtimeCommand::Ignored),
    }
}

fn decode_commit(value: &Value) -> Result<Stroke, DecodeError> {
    let fields = CommitFields::deserialize(value).map_err(DecodeError::InvalidCommit)?;
    let color = Color::from_json(&fields.color)?;
    let blend_mode = BlendMode::from_draw_mode(fields.draw_mode.as_deref());
    Ok(Stroke::new(fields.curve_points, color, fields.stride, blend_mode)?)
}

/// Build the `contentCommit` payload peers expect for `stroke`.
#[must_use]
pub fn encode_content_commit(stroke: &Stroke) -> Value {
    let mut payload = action_object(RealtimeAction::ContentCommit);
    payload.insert("curvePoints".into(), serde_json::json!(stroke.points()));
    payload.insert("color".into(), stroke.color().to_json());
    payload.insert("stride".into(), Value::from(stroke.stride()));
    payload.insert("drawMode".into(), Value::from(stroke.blend_mode().draw_mode()));
    Value::Object(payload)
}

/// Build a payload carrying only `action`.
#[must_use]
pub fn encode_action(action: RealtimeAction) -> Value {
    Value::Object(action_object(action))
}

fn action_object(action: RealtimeAction) -> Map<String, Value> {
    let mut payload = Map::new();
    payload.insert("action".into(), Value::from(action.as_str()));
    payload
}
