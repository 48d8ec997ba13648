use crate::pipeline::{
    create_decoder, decode_bytes, decode_reader, decode_stream, DecodeError, LineDecoder,
    RoutingKey, TaggedLineDecoder, TypedJsonDecoder,
};
use crate::protocol::ProtocolRevision;
use crate::transport::TransportError;
use crate::types::{EvalRecord, EvaluationRecords, Record, RecordKind};
use crate::Error;
use bytes::Bytes;
use futures::StreamExt;
use serde_json::{json, Value};

fn rec(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

fn typed() -> Box<dyn LineDecoder> {
    create_decoder(ProtocolRevision::Current, RoutingKey::Strip)
}

fn chunks(parts: Vec<&'static [u8]>) -> crate::BoxStream<'static, Bytes> {
    Box::pin(futures::stream::iter(
        parts.into_iter().map(|p| Ok(Bytes::from_static(p))),
    ))
}

#[test]
fn legacy_scenario_splits_tagged_lines() {
    let payload = b"SCORE {\"a\":1}\nEVAL {\"c\":3}\n";
    let records = decode_bytes(payload, Box::new(TaggedLineDecoder)).unwrap();
    assert_eq!(records.scores, vec![rec(json!({"a": 1}))]);
    assert_eq!(records.evals, vec![rec(json!({"c": 3}))]);
}

#[test]
fn current_lines_are_routed_in_order_and_stripped() {
    let payload = concat!(
        "{\"type\":\"EVAL\",\"cand\":0,\"req\":0}\n",
        "{\"type\":\"SCORE\",\"cand\":0,\"score\":0.5}\n",
        "{\"type\":\"EVAL\",\"cand\":0,\"req\":1}\n",
        "{\"type\":\"EVAL\",\"cand\":1,\"req\":0}\n",
        "{\"type\":\"SCORE\",\"cand\":1,\"score\":0.9}\n",
    );
    let records = decode_bytes(payload.as_bytes(), typed()).unwrap();

    assert_eq!(records.scores.len(), 2);
    assert_eq!(records.evals.len(), 3);
    assert_eq!(records.scores[1], rec(json!({"cand": 1, "score": 0.9})));
    let order: Vec<_> = records
        .evals
        .iter()
        .map(|r| (r["cand"].as_i64().unwrap(), r["req"].as_i64().unwrap()))
        .collect();
    assert_eq!(order, [(0, 0), (0, 1), (1, 0)]);
    assert!(records.evals.iter().all(|r| !r.contains_key("type")));
}

#[test]
fn retained_routing_key_applies_to_both_kinds() {
    let payload = b"{\"type\":\"SCORE\",\"s\":1}\n{\"type\":\"EVAL\",\"e\":2}\n";
    let records = decode_bytes(
        payload,
        create_decoder(ProtocolRevision::Current, RoutingKey::Retain),
    )
    .unwrap();
    assert_eq!(records.scores[0]["type"], json!("SCORE"));
    assert_eq!(records.evals[0]["type"], json!("EVAL"));
}

#[test]
fn score_record_round_trips_minus_routing_key() {
    let original = rec(json!({"candidate": "resume.pdf", "score": 7, "notes": ["ok"]}));
    let mut wire = original.clone();
    wire.insert("type".into(), json!(RecordKind::Score.tag()));
    let line = Value::Object(wire).to_string();

    let decoded = TypedJsonDecoder::new(RoutingKey::Strip)
        .decode_line(&line)
        .unwrap();
    assert_eq!(decoded, EvalRecord::Score(original));
}

#[test]
fn empty_payload_yields_two_empty_sequences() {
    assert_eq!(decode_bytes(b"", typed()).unwrap(), EvaluationRecords::default());
    assert!(decode_bytes(b"\n\n  \n", Box::new(TaggedLineDecoder))
        .unwrap()
        .is_empty());
}

#[test]
fn blank_and_crlf_lines_are_skipped() {
    let payload = b"\r\n{\"type\":\"SCORE\",\"s\":1}\r\n\r\n{\"type\":\"EVAL\",\"e\":1}\r\n";
    let records = decode_bytes(payload, typed()).unwrap();
    assert_eq!((records.scores.len(), records.evals.len()), (1, 1));
}

#[test]
fn malformed_line_fails_the_whole_decode_with_its_line_number() {
    let payload = b"{\"type\":\"SCORE\",\"s\":1}\n\n{not json}\n{\"type\":\"EVAL\",\"e\":1}\n";
    match decode_bytes(payload, typed()) {
        Err(Error::Decode { line, source: DecodeError::InvalidJson(_) }) => assert_eq!(line, 3),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn current_line_without_type_is_rejected() {
    let err = typed().decode_line(r#"{"score": 1}"#).unwrap_err();
    assert!(matches!(err, DecodeError::MissingTag { hint: None }));

    let err = typed().decode_line(r#"{"type": "RANK"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownTag(ref t) if t == "RANK"));

    let err = typed().decode_line(r#"{"type": 3}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownTag(_)));
}

#[test]
fn non_object_lines_are_rejected() {
    let err = typed().decode_line("[1, 2]").unwrap_err();
    assert!(matches!(err, DecodeError::NotAnObject { found: "an array" }));

    let err = TaggedLineDecoder.decode_line("SCORE 42").unwrap_err();
    assert!(matches!(err, DecodeError::NotAnObject { found: "a number" }));
}

#[test]
fn mismatched_revision_errors_carry_a_hint() {
    let err = TaggedLineDecoder
        .decode_line(r#"{"type":"SCORE","s":1}"#)
        .unwrap_err();
    assert!(err.to_string().contains("current `type`-field format"));

    let err = typed().decode_line(r#"SCORE {"s":1}"#).unwrap_err();
    assert!(err.to_string().contains("legacy"));

    let err = TaggedLineDecoder.decode_line(r#"RANK {"s":1}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownTag(ref t) if t == "RANK"));
}

#[test]
fn decoders_report_their_revision() {
    assert_eq!(
        create_decoder(ProtocolRevision::Legacy, RoutingKey::Strip).revision(),
        ProtocolRevision::Legacy
    );
    assert_eq!(typed().revision(), ProtocolRevision::Current);
}

#[test]
fn reader_decoding_is_lazy() {
    let payload: &[u8] =
        b"{\"type\":\"SCORE\",\"s\":1}\n{broken\n{\"type\":\"EVAL\",\"e\":1}\n";
    let mut lines = decode_reader(payload, typed());
    assert!(matches!(lines.next(), Some(Ok(EvalRecord::Score(_)))));
    assert!(matches!(lines.next(), Some(Err(Error::Decode { line: 2, .. }))));
    assert!(lines.next().is_none());
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn stream_reassembles_lines_split_across_chunks() {
    // "é" is split between the second and third chunk
    let input = chunks(vec![
        &b"{\"type\":\"SCO"[..],
        &b"RE\",\"name\":\"Ren\xc3"[..],
        &b"\xa9\"}\n\n{\"type\":\"EVAL\","[..],
        &b"\"e\":1}"[..],
    ]);
    let records = EvaluationRecords::try_collect_stream(decode_stream(input, typed()))
        .await
        .unwrap();
    assert_eq!(records.scores, vec![rec(json!({"name": "René"}))]);
    assert_eq!(records.evals, vec![rec(json!({"e": 1}))]);
}

#[tokio::test]
async fn stream_surfaces_malformed_lines() {
    let input = chunks(vec![
        &b"SCORE {\"a\":1}\n"[..],
        &b"EVAL nope\n"[..],
        &b"EVAL {\"c\":3}\n"[..],
    ]);
    let results: Vec<_> = decode_stream(input, Box::new(TaggedLineDecoder))
        .collect()
        .await;
    // the valid line after the bad one is never yielded
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(Error::Decode { line: 2, .. })));
}

#[tokio::test]
async fn stream_transport_failure_is_not_a_decode_error() {
    let input: crate::BoxStream<'static, Bytes> = Box::pin(futures::stream::iter(vec![
        Ok(Bytes::from_static(b"{\"type\":\"SCORE\",\"s\":1}\n")),
        Err(Error::Transport(TransportError::Other("connection reset".into()))),
    ]));
    let err = EvaluationRecords::try_collect_stream(decode_stream(input, typed()))
        .await
        .unwrap_err();
    assert!(err.is_transport(), "{err:?}");
}
