//! Multipart request assembly.
//!
//! Documents are read fully into memory before the request is built, so a request
//! is never issued half-assembled and no file handle outlives the read.

use crate::protocol::{fields, CallOptions};
use crate::types::ExtractedRequirements;
use crate::{Error, ErrorContext, Result};
use std::path::{Path, PathBuf};

/// File name used when extracted requirements are sent back as an attachment.
pub const REQUIREMENTS_FILE_NAME: &str = "requirements.jsonl";

/// Where a document's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    Path(PathBuf),
    Bytes { file_name: String, bytes: Vec<u8> },
}

impl DocumentSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }

    pub fn bytes(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        DocumentSource::Bytes {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> String {
        match self {
            DocumentSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string()),
            DocumentSource::Bytes { file_name, .. } => file_name.clone(),
        }
    }

    /// Read the document with blocking file I/O.
    pub fn load(&self) -> Result<LoadedDocument> {
        let bytes = match self {
            DocumentSource::Path(path) => std::fs::read(path).map_err(|source| Error::Document {
                path: path.clone(),
                source,
            })?,
            DocumentSource::Bytes { bytes, .. } => bytes.clone(),
        };
        Ok(LoadedDocument::new(self.file_name(), bytes))
    }

    /// Read the document on the async runtime.
    pub async fn load_async(&self) -> Result<LoadedDocument> {
        let bytes = match self {
            DocumentSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| Error::Document {
                        path: path.clone(),
                        source,
                    })?
            }
            DocumentSource::Bytes { bytes, .. } => bytes.clone(),
        };
        Ok(LoadedDocument::new(self.file_name(), bytes))
    }
}

impl From<PathBuf> for DocumentSource {
    fn from(path: PathBuf) -> Self {
        DocumentSource::Path(path)
    }
}

impl From<&PathBuf> for DocumentSource {
    fn from(path: &PathBuf) -> Self {
        DocumentSource::Path(path.clone())
    }
}

impl From<&Path> for DocumentSource {
    fn from(path: &Path) -> Self {
        DocumentSource::Path(path.to_path_buf())
    }
}

impl From<&str> for DocumentSource {
    fn from(path: &str) -> Self {
        DocumentSource::Path(PathBuf::from(path))
    }
}

impl From<String> for DocumentSource {
    fn from(path: String) -> Self {
        DocumentSource::Path(PathBuf::from(path))
    }
}

impl From<ExtractedRequirements> for DocumentSource {
    fn from(reqs: ExtractedRequirements) -> Self {
        DocumentSource::bytes(REQUIREMENTS_FILE_NAME, reqs.into_bytes().to_vec())
    }
}

impl From<&ExtractedRequirements> for DocumentSource {
    fn from(reqs: &ExtractedRequirements) -> Self {
        DocumentSource::bytes(REQUIREMENTS_FILE_NAME, reqs.as_bytes().to_vec())
    }
}

/// A document read into memory, ready to attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl LoadedDocument {
    pub fn new(file_name: String, bytes: Vec<u8>) -> Self {
        let content_type = content_type_for(&file_name);
        Self {
            file_name,
            content_type,
            bytes,
        }
    }
}

/// Content type from the file extension; unknown extensions are sent as octet-stream.
pub fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "doc" => "application/msword",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "jsonl" | "ndjson" => "application/jsonl",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// One file attachment under a protocol-fixed field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub document: LoadedDocument,
}

/// Transport-neutral description of a multipart body.
///
/// Built once per call, then converted into the async or blocking reqwest form.
/// Attachment order is preserved, which is how repeated `candidates` fields keep
/// their ordering on the server side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormPayload {
    files: Vec<FilePart>,
    fields: Vec<(&'static str, String)>,
}

impl FormPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(mut self, field: &'static str, document: LoadedDocument) -> Self {
        self.files.push(FilePart { field, document });
        self
    }

    pub fn text(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.fields.push((field, value.into()));
        self
    }

    /// Attach the credential field when one is available.
    pub fn credential(self, credential: Option<&str>) -> Self {
        match credential {
            Some(key) => self.text(fields::CREDENTIAL, key),
            None => self,
        }
    }

    /// Attach `params`, the credential, and whichever optional tags are set.
    ///
    /// The per-call credential wins over `default_credential`.
    pub fn options(self, options: &CallOptions, default_credential: Option<&str>) -> Self {
        let mut form = self
            .text(fields::PARAMS, options.params.as_str())
            .credential(options.credential.as_deref().or(default_credential));
        if let Some(doc_type) = &options.doc_type {
            form = form.text(fields::DOC_TYPE, doc_type.clone());
        }
        if let Some(use_retrieval) = options.use_retrieval {
            form = form.text(fields::USE_RETRIEVAL, use_retrieval.to_string());
        }
        form
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }

    pub fn text_value(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value.as_str())
    }

    pub fn attachment_count(&self) -> usize {
        self.files.len()
    }

    pub fn into_multipart(self) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for FilePart { field, document } in self.files {
            let part = reqwest::multipart::Part::bytes(document.bytes)
                .file_name(document.file_name)
                .mime_str(document.content_type)
                .map_err(|e| invalid_mime(field, e))?;
            form = form.part(field, part);
        }
        for (field, value) in self.fields {
            form = form.text(field, value);
        }
        Ok(form)
    }

    #[cfg(feature = "blocking")]
    pub fn into_blocking_multipart(self) -> Result<reqwest::blocking::multipart::Form> {
        let mut form = reqwest::blocking::multipart::Form::new();
        for FilePart { field, document } in self.files {
            let part = reqwest::blocking::multipart::Part::bytes(document.bytes)
                .file_name(document.file_name)
                .mime_str(document.content_type)
                .map_err(|e| invalid_mime(field, e))?;
            form = form.part(field, part);
        }
        for (field, value) in self.fields {
            form = form.text(field, value);
        }
        Ok(form)
    }
}

fn invalid_mime(field: &str, e: reqwest::Error) -> Error {
    Error::configuration_with_context(
        format!("Invalid mime: {}", e),
        ErrorContext::new()
            .with_field_path(field.to_string())
            .with_source("form"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Params;

    #[test]
    fn content_types_follow_extension() {
        assert_eq!(content_type_for("rfp.PDF"), "application/pdf");
        assert_eq!(content_type_for("questions.jsonl"), "application/jsonl");
        assert_eq!(content_type_for("notes"), "application/octet-stream");
    }

    #[test]
    fn load_reads_path_and_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("candidate.txt");
        std::fs::write(&path, b"hello").unwrap();

        let doc = DocumentSource::from(&path).load().unwrap();
        assert_eq!(doc.file_name, "candidate.txt");
        assert_eq!(doc.content_type, "text/plain");
        assert_eq!(doc.bytes, b"hello");
    }

    #[test]
    fn missing_file_is_a_document_error() {
        let err = DocumentSource::path("/definitely/not/here.pdf")
            .load()
            .unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn extracted_requirements_become_a_jsonl_attachment() {
        let reqs = ExtractedRequirements::new(b"{\"r\":1}\n".to_vec());
        let doc = DocumentSource::from(&reqs).load().unwrap();
        assert_eq!(doc.file_name, REQUIREMENTS_FILE_NAME);
        assert_eq!(doc.bytes, reqs.as_bytes());
    }

    #[test]
    fn options_prefer_call_credential_and_skip_unset_tags() {
        let options = CallOptions::new()
            .params(Params::raw(r#"{"num":2}"#))
            .credential("call-key");
        let form = FormPayload::new().options(&options, Some("default-key"));
        assert_eq!(form.text_value(fields::PARAMS), Some(r#"{"num":2}"#));
        assert_eq!(form.text_value(fields::CREDENTIAL), Some("call-key"));
        assert_eq!(form.text_value(fields::DOC_TYPE), None);
        assert_eq!(form.text_value(fields::USE_RETRIEVAL), None);

        let options = CallOptions::new().doc_type("resume").use_retrieval(false);
        let form = FormPayload::new().options(&options, None);
        assert_eq!(form.text_value(fields::PARAMS), Some("{}"));
        assert_eq!(form.text_value(fields::CREDENTIAL), None);
        assert_eq!(form.text_value(fields::DOC_TYPE), Some("resume"));
        assert_eq!(form.text_value(fields::USE_RETRIEVAL), Some("false"));
    }

    #[test]
    fn repeated_fields_keep_attachment_order() {
        let form = FormPayload::new()
            .file(fields::CANDIDATES, LoadedDocument::new("a.pdf".into(), vec![1]))
            .file(fields::CANDIDATES, LoadedDocument::new("b.pdf".into(), vec![2]));
        let names: Vec<_> = form.files().iter().map(|p| p.document.file_name.as_str()).collect();
        assert_eq!(names, ["a.pdf", "b.pdf"]);
        assert!(form.into_multipart().is_ok());
    }
}
