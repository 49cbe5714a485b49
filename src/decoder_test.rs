use serde_json::json;

use super::*;

fn black_json() -> Value {
    json!({"red": 0.0, "green": 0.0, "blue": 0.0, "alpha": 1.0})
}

fn commit_payload(points: &[f32], draw_mode: &str) -> Value {
    json!({
        "action": "contentCommit",
        "curvePoints": points,
        "color": black_json(),
        "stride": 3,
        "drawMode": draw_mode,
    })
}

// =============================================================
// RealtimeAction
// =============================================================

#[test]
fn action_names_match_wire_protocol() {
    let cases = [
        (RealtimeAction::ContentBegin, "contentBegin"),
        (RealtimeAction::ContentUpdate, "contentUpdate"),
        (RealtimeAction::ContentCommit, "contentCommit"),
        (RealtimeAction::ContentCancel, "contentCancel"),
        (RealtimeAction::StartClearBoard, "startClearBoard"),
        (RealtimeAction::EndClearBoard, "endClearBoard"),
    ];
    for (action, name) in cases {
        assert_eq!(action.as_str(), name);
        assert_eq!(RealtimeAction::parse(name), Some(action));
    }
}

#[test]
fn action_parse_is_case_sensitive() {
    assert_eq!(RealtimeAction::parse("ContentCommit"), None);
    assert_eq!(RealtimeAction::parse("loremIpsum"), None);
    assert_eq!(RealtimeAction::parse(""), None);
}

// =============================================================
// Commit
// =============================================================

#[test]
fn decode_commit_builds_stroke() {
    let payload = commit_payload(&[120.0, 90.0, 1.0, 10.0, 5.0, 1.0], "ERASE").to_string();
    let RealtimeCommand::Commit(stroke) = decode_payload(&payload).expect("decode") else {
        panic!("expected commit");
    };
    assert_eq!(stroke.points(), [120.0_f32, 90.0, 1.0, 10.0, 5.0, 1.0].as_slice());
    assert_eq!(stroke.color(), Color::BLACK);
    assert_eq!(stroke.stride(), 3);
    assert_eq!(stroke.blend_mode(), BlendMode::Erase);
}

#[test]
fn decode_commit_empty_draw_mode_is_normal() {
    let payload = commit_payload(&[1.0, 2.0, 3.0], "");
    let Ok(RealtimeCommand::Commit(stroke)) = decode_value(&payload) else {
        panic!("expected commit");
    };
    assert_eq!(stroke.blend_mode(), BlendMode::Normal);
}

#[test]
fn decode_commit_without_draw_mode_is_normal() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "ERASE");
    payload.as_object_mut().expect("object").remove("drawMode");
    let Ok(RealtimeCommand::Commit(stroke)) = decode_value(&payload) else {
        panic!("expected commit");
    };
    assert_eq!(stroke.blend_mode(), BlendMode::Normal);
}

#[test]
fn decode_commit_null_draw_mode_is_normal() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "ERASE");
    payload["drawMode"] = Value::Null;
    let Ok(RealtimeCommand::Commit(stroke)) = decode_value(&payload) else {
        panic!("expected commit");
    };
    assert_eq!(stroke.blend_mode(), BlendMode::Normal);
}

#[test]
fn decode_commit_ignores_unknown_extra_fields() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
    payload["curveId"] = json!("abc");
    payload["name"] = json!("pen");
    assert!(matches!(decode_value(&payload), Ok(RealtimeCommand::Commit(_))));
}

#[test]
fn decode_commit_missing_required_fields_fails_closed() {
    for field in ["curvePoints", "color", "stride"] {
        let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
        payload.as_object_mut().expect("object").remove(field);
        let err = decode_value(&payload).expect_err("required field missing");
        assert!(matches!(err, DecodeError::InvalidCommit(_)), "field {field}: {err:?}");
    }
}

#[test]
fn decode_commit_mistyped_points_fails() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
    payload["curvePoints"] = json!(["a", "b", "c"]);
    assert!(matches!(decode_value(&payload), Err(DecodeError::InvalidCommit(_))));
}

#[test]
fn decode_commit_negative_stride_fails() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
    payload["stride"] = json!(-3);
    assert!(matches!(decode_value(&payload), Err(DecodeError::InvalidCommit(_))));
}

#[test]
fn decode_commit_accepts_integral_float_stride() {
    let mut payload = commit_payload(&[120.0, 90.0, 1.0, 10.0, 5.0, 1.0], "ERASE");
    payload["stride"] = json!(3.0);
    let Ok(RealtimeCommand::Commit(stroke)) = decode_value(&payload) else {
        panic!("expected commit");
    };
    assert_eq!(stroke.stride(), 3);
    assert_eq!(stroke.point_count(), 2);
    assert_eq!(stroke.blend_mode(), BlendMode::Erase);
}

#[test]
fn decode_commit_fractional_stride_fails() {
    for stride in [json!(3.5), json!("3"), json!(-3.0)] {
        let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
        payload["stride"] = stride.clone();
        assert!(
            matches!(decode_value(&payload), Err(DecodeError::InvalidCommit(_))),
            "stride {stride}"
        );
    }
}

#[test]
fn decode_commit_zero_stride_fails() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
    payload["stride"] = json!(0);
    assert!(matches!(
        decode_value(&payload),
        Err(DecodeError::InvalidStroke(StrokeError::ZeroStride))
    ));
}

#[test]
fn decode_commit_misaligned_points_fails() {
    let payload = commit_payload(&[1.0, 2.0, 3.0, 4.0], "");
    assert!(matches!(
        decode_value(&payload),
        Err(DecodeError::InvalidStroke(StrokeError::PointsNotAligned { len: 4, stride: 3 }))
    ));
}

#[test]
fn decode_commit_bad_color_fails() {
    let mut payload = commit_payload(&[1.0, 2.0, 3.0], "");
    payload["color"] = json!({"red": 2.0, "green": 0.0, "blue": 0.0});
    assert!(matches!(decode_value(&payload), Err(DecodeError::InvalidColor(_))));
}

// =============================================================
// Clear and ignored actions
// =============================================================

#[test]
fn decode_end_clear_board() {
    assert_eq!(
        decode_payload(r#"{"action":"endClearBoard"}"#).expect("decode"),
        RealtimeCommand::ClearEnd
    );
}

#[test]
fn decode_transient_actions_are_ignored() {
    for action in ["contentBegin", "contentUpdate", "contentCancel", "startClearBoard"] {
        let payload = json!({"action": action}).to_string();
        assert_eq!(decode_payload(&payload).expect("decode"), RealtimeCommand::Ignored, "{action}");
    }
}

#[test]
fn decode_unknown_action_is_ignored() {
    assert_eq!(
        decode_payload(r#"{"action":"loremIpsum"}"#).expect("decode"),
        RealtimeCommand::Ignored
    );
}

#[test]
fn decode_missing_or_non_string_action_is_ignored() {
    assert_eq!(decode_payload("{}").expect("decode"), RealtimeCommand::Ignored);
    assert_eq!(decode_payload(r#"{"action":42}"#).expect("decode"), RealtimeCommand::Ignored);
    assert_eq!(decode_payload(r#"{"action":null}"#).expect("decode"), RealtimeCommand::Ignored);
}

#[test]
fn decode_accepts_unquoted_keys() {
    assert_eq!(decode_payload("{action: \"endClearBoard\"}").expect("decode"), RealtimeCommand::ClearEnd);
    assert_eq!(decode_payload("{action: \"loremIpsum\"}").expect("decode"), RealtimeCommand::Ignored);
    assert_eq!(decode_payload("{action: 'contentBegin'}").expect("decode"), RealtimeCommand::Ignored);
}

#[test]
fn decode_unquoted_commit_builds_stroke() {
    let payload = "{action: \"contentCommit\", curvePoints: [1.0, 2.0, 3.0], \
                   color: {red: 0.0, green: 0.0, blue: 0.0, alpha: 1.0}, stride: 3}";
    let RealtimeCommand::Commit(stroke) = decode_payload(payload).expect("decode") else {
        panic!("expected commit");
    };
    assert_eq!(stroke.color(), Color::BLACK);
    assert_eq!(stroke.stride(), 3);
}

#[test]
fn decode_malformed_json_fails() {
    assert!(matches!(decode_payload("{action: "), Err(DecodeError::Json(_))));
    assert!(matches!(decode_payload("{action: \"endClearBoard\""), Err(DecodeError::Json(_))));
    assert!(matches!(decode_payload("not json"), Err(DecodeError::Json(_))));
    assert!(matches!(decode_payload(""), Err(DecodeError::Json(_))));
}

#[test]
fn decode_non_object_fails() {
    assert!(matches!(decode_payload("[1,2,3]"), Err(DecodeError::NotAnObject)));
    assert!(matches!(decode_payload("\"contentCommit\""), Err(DecodeError::NotAnObject)));
}

// =============================================================
// Encoding
// =============================================================

#[test]
fn encode_content_commit_matches_wire_shape() {
    let stroke = Stroke::new(vec![1.0, 2.0, 3.0], Color::BLACK, 3, BlendMode::Erase).expect("valid");
    let payload = encode_content_commit(&stroke);
    assert_eq!(payload["action"], "contentCommit");
    assert_eq!(payload["curvePoints"], json!([1.0, 2.0, 3.0]));
    assert_eq!(payload["color"], black_json());
    assert_eq!(payload["stride"], 3);
    assert_eq!(payload["drawMode"], "ERASE");
}

#[test]
fn encoded_commit_decodes_to_same_stroke() {
    let stroke = Stroke::new(vec![900.0, 50.0, 1.0, 1100.0, 30.0, 1.0], Color::GREEN, 3, BlendMode::Normal)
        .expect("valid");
    let decoded = decode_value(&encode_content_commit(&stroke)).expect("decode");
    assert_eq!(decoded, RealtimeCommand::Commit(stroke));
}

#[test]
fn encode_action_carries_only_action() {
    assert_eq!(encode_action(RealtimeAction::EndClearBoard), json!({"action": "endClearBoard"}));
}
