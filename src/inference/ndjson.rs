//! Incremental decoder for newline-delimited JSON response bodies
//!
//! Network reads do not respect line boundaries, so bytes are buffered until a
//! full line is available. A line that fails to decode aborts the stream;
//! skipping it could silently corrupt the accumulated text.

use super::error::InferenceError;
use super::types::StreamUnit;
use tracing::trace;

/// Maximum characters of an offending line kept in error messages
const LINE_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds raw bytes, returning every unit completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<StreamUnit>, InferenceError> {
        self.buffer.extend_from_slice(bytes);

        let mut units = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(unit) = decode_line(&line)? {
                units.push(unit);
            }
        }
        Ok(units)
    }

    /// Decodes whatever is left once the body has ended
    pub fn finish(&mut self) -> Result<Option<StreamUnit>, InferenceError> {
        let rest = std::mem::take(&mut self.buffer);
        decode_line(&rest)
    }

    /// Bytes held back waiting for a newline
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn decode_line(raw: &[u8]) -> Result<Option<StreamUnit>, InferenceError> {
    let line = std::str::from_utf8(raw).map_err(|e| InferenceError::MalformedChunk {
        line: String::from_utf8_lossy(raw).chars().take(LINE_PREVIEW_CHARS).collect(),
        message: format!("invalid UTF-8: {}", e),
    })?;

    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    parse_unit(line).map(Some)
}

/// Parses one line of a streamed generate response
pub fn parse_unit(line: &str) -> Result<StreamUnit, InferenceError> {
    let unit: StreamUnit = serde_json::from_str(line).map_err(|e| InferenceError::MalformedChunk {
        line: line.chars().take(LINE_PREVIEW_CHARS).collect(),
        message: e.to_string(),
    })?;

    if let Some(message) = unit.error.clone() {
        return Err(InferenceError::Api {
            status: None,
            message,
        });
    }

    if unit.response.is_none() && !unit.done {
        return Err(InferenceError::MalformedChunk {
            line: line.chars().take(LINE_PREVIEW_CHARS).collect(),
            message: "missing 'response' field".to_string(),
        });
    }

    trace!(done = unit.done, len = unit.response.as_ref().map_or(0, |r| r.len()), "decoded unit");
    Ok(unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_complete_lines() {
        let mut decoder = NdjsonDecoder::new();
        let units = decoder
            .push(b"{\"response\":\"line1\",\"done\":false}\n{\"response\":\"line2\",\"done\":true}\n")
            .unwrap();

        assert_eq!(units.len(), 2);
        assert_eq!(units[0].response.as_deref(), Some("line1"));
        assert_eq!(units[1].response.as_deref(), Some("line2"));
        assert!(units[1].done);
        assert_eq!(decoder.pending(), 0);
    }

    #[test]
    fn test_push_split_across_reads() {
        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.push(b"{\"response\":\"FR").unwrap().is_empty());
        assert!(decoder.pending() > 0);

        let units = decoder.push(b"OM\",\"done\":false}\n").unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].response.as_deref(), Some("FROM"));
    }

    #[test]
    fn test_multibyte_char_split_across_reads() {
        let line = "{\"response\":\"caf\u{e9}\",\"done\":false}\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut decoder = NdjsonDecoder::new();
        assert!(decoder.push(&line[..split]).unwrap().is_empty());
        let units = decoder.push(&line[split..]).unwrap();
        assert_eq!(units[0].response.as_deref(), Some("caf\u{e9}"));
    }

    #[test]
    fn test_blank_lines_ignored() {
        let mut decoder = NdjsonDecoder::new();
        let units = decoder
            .push(b"\n\r\n{\"response\":\"x\",\"done\":false}\n")
            .unwrap();
        assert_eq!(units.len(), 1);
    }

    #[test]
    fn test_finish_decodes_trailing_line() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(b"{\"response\":\"\",\"done\":true}").unwrap();
        let unit = decoder.finish().unwrap().unwrap();
        assert!(unit.done);
        assert!(decoder.finish().unwrap().is_none());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let mut decoder = NdjsonDecoder::new();
        let err = decoder.push(b"not json\n").unwrap_err();
        assert!(matches!(err, InferenceError::MalformedChunk { .. }));
    }

    #[test]
    fn test_missing_response_is_malformed() {
        let err = parse_unit(r#"{"something":"else"}"#).unwrap_err();
        match err {
            InferenceError::MalformedChunk { message, .. } => {
                assert!(message.contains("response"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_error_unit_is_api_error() {
        let err = parse_unit(r#"{"error":"model 'foo' not found"}"#).unwrap_err();
        assert_eq!(
            err,
            InferenceError::Api {
                status: None,
                message: "model 'foo' not found".to_string()
            }
        );
    }
}
