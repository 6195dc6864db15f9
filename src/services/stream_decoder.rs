//! Incremental decoder for the `data: <text>\n` response framing.
//!
//! Only lines starting with `data: ` carry payload. `event:`, `id:` and blank
//! lines are dropped, and a payload equal to `[DONE]` (after trimming) ends the
//! generation. Bytes are decoded as UTF-8 across read boundaries and a partial
//! line is held until its newline (or [`StreamDecoder::finish`]) arrives.

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Done,
}

#[derive(Debug, Default)]
pub struct StreamDecoder {
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    line: String,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one read and return the frames completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Frame> {
        let text = self.decode(bytes);
        self.line.push_str(&text);

        let mut frames = Vec::new();
        while let Some(pos) = self.line.find('\n') {
            let rest = self.line.split_off(pos + 1);
            let line = std::mem::replace(&mut self.line, rest);
            if let Some(frame) = parse_line(&line[..pos]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush whatever is left once the body is exhausted.
    pub fn finish(&mut self) -> Vec<Frame> {
        if !self.pending.is_empty() {
            let tail = std::mem::take(&mut self.pending);
            self.line.push_str(&String::from_utf8_lossy(&tail));
        }
        let line = std::mem::take(&mut self.line);
        parse_line(&line).into_iter().collect()
    }

    fn decode(&mut self, bytes: &[u8]) -> String {
        let mut buf = std::mem::take(&mut self.pending);
        buf.extend_from_slice(bytes);

        let mut out = String::with_capacity(buf.len());
        let mut rest = buf.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            // Incomplete sequence at the end of this read.
                            self.pending = after.to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }
}

fn parse_line(line: &str) -> Option<Frame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    if payload.trim() == DONE_SENTINEL {
        Some(Frame::Done)
    } else {
        Some(Frame::Text(payload.to_string()))
    }
}
