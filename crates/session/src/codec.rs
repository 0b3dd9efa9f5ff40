//! Frame codec: one outgoing WebSocket text frame per command, and an
//! incremental decoder for the inbound byte stream.
//!
//! The decoder makes no assumption that read boundaries line up with
//! message boundaries: each `push` may carry zero, one, or many complete
//! JSON documents, or the tail of one continued from the previous push.
//! `next_frame` yields a complete document when one is buffered and `None`
//! otherwise, without blocking. Empty payloads and inter-frame whitespace
//! (seen from some browser backends) decode to nothing rather than erroring.

use bytes::{Buf, Bytes, BytesMut};
use tokio_tungstenite::tungstenite::Message;

use crate::error::{CdpError, Result};
use crate::protocol::CdpCommand;

/// Serializes a command into one complete outgoing frame.
pub fn encode(command: &CdpCommand) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(command)?))
}

/// Incremental decoder holding partial input across reads.
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(8192),
        }
    }

    /// Appends a chunk of raw payload bytes.
    pub fn push(&mut self, data: &[u8]) {
        if !data.is_empty() {
            self.buf.extend_from_slice(data);
        }
    }

    /// Bytes currently buffered but not yet yielded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Extracts the next complete JSON document, if one is fully buffered.
    ///
    /// Returns `Ok(None)` when more input is needed. Returns
    /// `CdpError::Frame` after discarding bytes that cannot start a JSON
    /// document; the caller is expected to log and call again.
    pub fn next_frame(&mut self) -> Result<Option<Bytes>> {
        while self.buf.first().is_some_and(|b| b.is_ascii_whitespace()) {
            self.buf.advance(1);
        }
        let Some(&first) = self.buf.first() else {
            return Ok(None);
        };
        if first != b'{' && first != b'[' {
            let skip = self
                .buf
                .iter()
                .position(|&b| b == b'{' || b == b'[')
                .unwrap_or(self.buf.len());
            self.buf.advance(skip);
            return Err(CdpError::Frame(format!(
                "discarded {skip} bytes of non-JSON input"
            )));
        }
        match complete_document_len(&self.buf) {
            Some(len) => Ok(Some(self.buf.split_to(len).freeze())),
            None => Ok(None),
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the first complete JSON document in `buf`, if any.
///
/// Brace counting with string/escape awareness; serde does the real
/// validation once a document is extracted.
fn complete_document_len(buf: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, &b) in buf.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => depth += 1,
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(decoder: &mut FrameDecoder) -> Vec<String> {
        let mut frames = Vec::new();
        loop {
            match decoder.next_frame() {
                Ok(Some(frame)) => frames.push(String::from_utf8(frame.to_vec()).unwrap()),
                Ok(None) => return frames,
                Err(_) => continue,
            }
        }
    }

    #[test]
    fn decodes_single_frame() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"id":1,"result":{}}"#);
        assert_eq!(drain(&mut decoder), vec![r#"{"id":1,"result":{}}"#]);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn decodes_many_frames_from_one_push() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"id":1,"result":{}}{"method":"A.b","params":{}}{"id":2,"result":{}}"#);
        assert_eq!(drain(&mut decoder).len(), 3);
    }

    #[test]
    fn holds_partial_frame_until_completed() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"id":1,"re"#);
        assert!(decoder.next_frame().unwrap().is_none());
        decoder.push(br#"sult":{"ok":true}}"#);
        assert_eq!(drain(&mut decoder), vec![r#"{"id":1,"result":{"ok":true}}"#]);
    }

    #[test]
    fn split_point_does_not_change_decoded_frames() {
        let one = json!({"id": 1, "result": {"text": "a}b{c"}}).to_string();
        let two = json!({"method": "Net.ev", "params": {"quote": "\"}\""}}).to_string();
        let stream = format!("{one}{two}");
        let whole = {
            let mut decoder = FrameDecoder::new();
            decoder.push(stream.as_bytes());
            drain(&mut decoder)
        };
        for split in 0..=stream.len() {
            let mut decoder = FrameDecoder::new();
            decoder.push(&stream.as_bytes()[..split]);
            let mut frames = drain(&mut decoder);
            decoder.push(&stream.as_bytes()[split..]);
            frames.extend(drain(&mut decoder));
            assert_eq!(frames, whole, "split at {split}");
        }
    }

    #[test]
    fn braces_inside_strings_do_not_terminate_frames() {
        let mut decoder = FrameDecoder::new();
        decoder.push(br#"{"method":"E.v","params":{"body":"{\"nested\": \"}}\"}"}}"#);
        let frames = drain(&mut decoder);
        assert_eq!(frames.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(value["params"]["body"], "{\"nested\": \"}}\"}");
    }

    #[test]
    fn empty_and_whitespace_payloads_decode_to_nothing() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"");
        decoder.push(b"  \n\t ");
        assert!(decoder.next_frame().unwrap().is_none());
        decoder.push(br#"{"id":4,"result":{}}"#);
        assert_eq!(drain(&mut decoder).len(), 1);
    }

    #[test]
    fn garbage_prefix_is_discarded_without_losing_later_frames() {
        let mut decoder = FrameDecoder::new();
        decoder.push(b"ok\r\n");
        decoder.push(br#"{"id":5,"result":{}}"#);
        assert!(matches!(decoder.next_frame(), Err(CdpError::Frame(_))));
        assert_eq!(drain(&mut decoder), vec![r#"{"id":5,"result":{}}"#]);
    }

    #[test]
    fn encode_produces_one_text_frame() {
        let command = CdpCommand {
            id: 1,
            method: "Browser.getVersion".to_string(),
            params: None,
            session_id: None,
        };
        match encode(&command).unwrap() {
            Message::Text(text) => {
                assert_eq!(
                    serde_json::from_str::<serde_json::Value>(&text).unwrap(),
                    json!({"id": 1, "method": "Browser.getVersion"})
                );
            }
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}
