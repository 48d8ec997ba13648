//! Lazy line transforms: bytes -> lines -> routed records.

use crate::pipeline::decode::parse_object;
use crate::pipeline::{DecodeError, LineDecoder};
use crate::transport::TransportError;
use crate::types::{EvalRecord, EvaluationRecords, Record};
use crate::{BoxStream, Error, Result};
use bytes::Bytes;
use futures::{future, StreamExt, TryStreamExt};
use std::io::{self, BufRead};
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};
use tokio_util::io::StreamReader;

/// Decode an async byte stream into routed evaluation records.
///
/// Lines are framed as chunks arrive (chunk boundaries may split lines or UTF-8
/// sequences). Blank lines are skipped; any other undecodable line yields an
/// [`Error::Decode`] carrying its 1-based line number, and nothing follows it.
pub fn decode_stream(
    input: BoxStream<'static, Bytes>,
    decoder: Box<dyn LineDecoder>,
) -> BoxStream<'static, EvalRecord> {
    let reader = StreamReader::new(input.map_err(|e| io::Error::new(io::ErrorKind::Other, e)));
    let lines = FramedRead::new(reader, LinesCodec::new());

    let stream = lines.enumerate().filter_map(move |(idx, line)| {
        let line_no = idx + 1;
        let item = match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                decoder
                    .decode_line(&line)
                    .map_err(|source| Error::Decode { line: line_no, source }),
            ),
            Err(LinesCodecError::Io(e)) => Some(Err(read_error(e, line_no))),
            Err(LinesCodecError::MaxLineLengthExceeded) => Some(Err(Error::Decode {
                line: line_no,
                source: DecodeError::Io(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "line length limit exceeded",
                )),
            })),
        };
        future::ready(item)
    });

    // the first error ends the sequence
    let stream = stream.scan(false, |failed, item| {
        if *failed {
            return future::ready(None);
        }
        *failed = item.is_err();
        future::ready(Some(item))
    });

    Box::pin(stream)
}

/// Blocking counterpart of [`decode_stream`] over any buffered reader.
///
/// Fused after the first error.
pub struct RecordLines<R> {
    lines: io::Lines<R>,
    decoder: Box<dyn LineDecoder>,
    line_no: usize,
    done: bool,
}

impl<R: BufRead> RecordLines<R> {
    pub fn new(reader: R, decoder: Box<dyn LineDecoder>) -> Self {
        Self {
            lines: reader.lines(),
            decoder,
            line_no: 0,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for RecordLines<R> {
    type Item = Result<EvalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    self.done = true;
                    return Some(Err(read_error(e, self.line_no)));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            let line_no = self.line_no;
            let decoded = self
                .decoder
                .decode_line(&line)
                .map_err(|source| Error::Decode { line: line_no, source });
            self.done = decoded.is_err();
            return Some(decoded);
        }
    }
}

pub fn decode_reader<R: BufRead>(reader: R, decoder: Box<dyn LineDecoder>) -> RecordLines<R> {
    RecordLines::new(reader, decoder)
}

/// Decode a fully buffered evaluation payload.
pub fn decode_bytes(payload: &[u8], decoder: Box<dyn LineDecoder>) -> Result<EvaluationRecords> {
    EvaluationRecords::try_collect(decode_reader(payload, decoder))
}

/// Untagged JSONL records (one extracted requirement per line) over a borrowed buffer.
pub struct PlainRecords<'a> {
    lines: std::iter::Enumerate<std::slice::Split<'a, u8, fn(&u8) -> bool>>,
}

fn is_newline(b: &u8) -> bool {
    *b == b'\n'
}

impl<'a> PlainRecords<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self {
            lines: payload.split(is_newline as fn(&u8) -> bool).enumerate(),
        }
    }
}

impl<'a> Iterator for PlainRecords<'a> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (idx, raw) = self.lines.next()?;
            if raw.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let line = idx + 1;
            let decoded = std::str::from_utf8(raw)
                .map_err(|e| DecodeError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
                .and_then(parse_object)
                .map_err(|source| Error::Decode { line, source });
            return Some(decoded);
        }
    }
}

/// Number of non-blank lines in a JSONL buffer.
pub fn count_lines(payload: &[u8]) -> usize {
    payload
        .split(|b| *b == b'\n')
        .filter(|raw| !raw.iter().all(u8::is_ascii_whitespace))
        .count()
}

/// Recover transport failures that were tunnelled through `io::Error` by the
/// line framer; everything else is a framing problem on that line.
fn read_error(err: io::Error, line: usize) -> Error {
    let tunnelled = err
        .get_ref()
        .map_or(false, |inner| inner.is::<Error>() || inner.is::<reqwest::Error>());
    if !tunnelled {
        return Error::Decode {
            line,
            source: DecodeError::Io(err),
        };
    }
    match err.into_inner() {
        Some(inner) => match inner.downcast::<Error>() {
            Ok(original) => *original,
            Err(inner) => match inner.downcast::<reqwest::Error>() {
                Ok(http) => Error::Transport(TransportError::from_reqwest(*http)),
                Err(other) => Error::Transport(TransportError::Other(other.to_string())),
            },
        },
        None => Error::Transport(TransportError::Other(format!(
            "response body interrupted at line {}",
            line
        ))),
    }
}
