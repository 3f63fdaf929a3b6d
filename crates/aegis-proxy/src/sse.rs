//! SSE `data: {...}` frame decoding for streamed completions (spec
//! §4.10 step 6). The upstream byte stream is buffered line-by-line;
//! each `data:` line is parsed as JSON unless it is the `[DONE]`
//! terminator, which is ignored.

use serde_json::Value;

/// Accumulates raw bytes across chunks and yields decoded `data:` JSON
/// frames as they complete. Kept separate from the HTTP client so it
/// can be unit-tested against raw byte chunks.
#[derive(Default)]
pub struct SseFrameBuffer {
    buffer: String,
}

impl SseFrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk of bytes, returning every complete frame found.
    /// Incomplete trailing lines are retained for the next call.
    pub fn feed(&mut self, chunk: &str) -> Vec<Value> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            let line = line.trim_end_matches(['\r', '\n']);
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();
            if data.is_empty() || data == "[DONE]" {
                continue;
            }
            if let Ok(value) = serde_json::from_str::<Value>(data) {
                frames.push(value);
            }
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_single_frame_per_line() {
        let mut buf = SseFrameBuffer::new();
        let frames = buf.feed("data: {\"a\":1}\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["a"], 1);
    }

    #[test]
    fn ignores_done_terminator() {
        let mut buf = SseFrameBuffer::new();
        let frames = buf.feed("data: {\"a\":1}\ndata: [DONE]\n");
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn buffers_partial_lines_across_feeds() {
        let mut buf = SseFrameBuffer::new();
        let first = buf.feed("data: {\"a\":");
        assert!(first.is_empty());
        let second = buf.feed("1}\n");
        assert_eq!(second.len(), 1);
        assert_eq!(second[0]["a"], 1);
    }
}
