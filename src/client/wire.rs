//! Request bodies and reply interpretation shared by the async and blocking clients.

use crate::protocol::{fields, CallOptions, DocumentSource, FormPayload, LoadedDocument};
use crate::types::{ServiceFailure, ServiceReply};
use crate::{Error, ErrorContext, Result};
use serde_json::Value;

pub(crate) fn query_form(text: &str, credential: Option<&str>) -> FormPayload {
    FormPayload::new()
        .text(fields::TEXT, text)
        .credential(credential)
}

pub(crate) fn ask_doc_form(
    document: LoadedDocument,
    query: &str,
    credential: Option<&str>,
) -> FormPayload {
    FormPayload::new()
        .file(fields::DOC, document)
        .text(fields::QUERY, query)
        .credential(credential)
}

pub(crate) fn extraction_form(
    reqs: LoadedDocument,
    candidate: LoadedDocument,
    options: &CallOptions,
    default_credential: Option<&str>,
) -> FormPayload {
    FormPayload::new()
        .file(fields::REQS, reqs)
        .file(fields::CANDIDATE, candidate)
        .options(options, default_credential)
}

/// Requirements JSONL goes up as a file, unparsed; candidates repeat one field in order.
pub(crate) fn evaluation_form(
    reqs: LoadedDocument,
    candidates: Vec<LoadedDocument>,
    options: &CallOptions,
    default_credential: Option<&str>,
) -> FormPayload {
    candidates
        .into_iter()
        .fold(FormPayload::new().file(fields::REQS, reqs), |form, candidate| {
            form.file(fields::CANDIDATES, candidate)
        })
        .options(options, default_credential)
}

pub(crate) fn candidate_sources<I, D>(candidates: I) -> Result<Vec<DocumentSource>>
where
    I: IntoIterator<Item = D>,
    D: Into<DocumentSource>,
{
    let sources: Vec<DocumentSource> = candidates.into_iter().map(Into::into).collect();
    if sources.is_empty() {
        return Err(Error::configuration_with_context(
            "At least one candidate document is required",
            ErrorContext::new()
                .with_field_path(fields::CANDIDATES)
                .with_source("evaluation"),
        ));
    }
    Ok(sources)
}

/// Non-success status on an endpoint without an explicit success flag.
pub(crate) fn rejection(status: u16, body: &[u8]) -> Error {
    legacy_rejection(ServiceFailure::from_response(status, body))
}

/// A legacy endpoint has no success flag, so its failure becomes a hard error.
pub(crate) fn legacy_rejection(failure: ServiceFailure) -> Error {
    Error::Remote {
        status: failure.status,
        code: failure.code,
        message: failure.detail,
    }
}

pub(crate) fn legacy_payload<T>(reply: ServiceReply<T>) -> Result<T> {
    match reply {
        ServiceReply::Success(payload) => Ok(payload),
        ServiceReply::Failure(failure) => Err(legacy_rejection(failure)),
    }
}

pub(crate) fn parse_ping(status: u16, body: &[u8]) -> Result<i64> {
    if !is_success(status) {
        return Err(rejection(status, body));
    }
    Ok(serde_json::from_slice::<i64>(body)?)
}

/// Plain-text answer; a JSON string literal is unwrapped, anything else is returned as-is.
pub(crate) fn text_answer(status: u16, body: &[u8]) -> Result<String> {
    if !is_success(status) {
        return Err(rejection(status, body));
    }
    if let Ok(Value::String(s)) = serde_json::from_slice::<Value>(body) {
        return Ok(s);
    }
    Ok(String::from_utf8_lossy(body).into_owned())
}

pub(crate) fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(name: &str) -> LoadedDocument {
        LoadedDocument::new(name.to_string(), name.as_bytes().to_vec())
    }

    #[test]
    fn evaluation_form_repeats_candidates_in_order() {
        let form = evaluation_form(
            doc("questions.jsonl"),
            vec![doc("a.pdf"), doc("b.pdf")],
            &CallOptions::new(),
            None,
        );
        let layout: Vec<_> = form
            .files()
            .iter()
            .map(|p| (p.field, p.document.file_name.as_str()))
            .collect();
        assert_eq!(
            layout,
            [
                (fields::REQS, "questions.jsonl"),
                (fields::CANDIDATES, "a.pdf"),
                (fields::CANDIDATES, "b.pdf"),
            ]
        );
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let err = candidate_sources(Vec::<DocumentSource>::new()).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn text_answers_unwrap_json_strings() {
        assert_eq!(text_answer(200, br#""18""#).unwrap(), "18");
        assert_eq!(text_answer(200, b"3*6 = 18").unwrap(), "3*6 = 18");
        assert!(matches!(
            text_answer(401, br#"{"detail":"bad key"}"#),
            Err(Error::Remote { status: 401, .. })
        ));
    }

    #[test]
    fn ping_parses_integer_reply() {
        assert_eq!(parse_ping(200, b"25").unwrap(), 25);
        assert!(matches!(parse_ping(200, b"\"x\""), Err(Error::Serialization(_))));
        assert!(matches!(parse_ping(500, b""), Err(Error::Remote { status: 500, .. })));
    }
}
