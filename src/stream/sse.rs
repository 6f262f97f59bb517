use memchr::memchr;

use super::StreamEvent;

/// Incremental SSE framer.
///
/// Feed it raw response-body chunks (arriving at arbitrary byte boundaries)
/// and it yields complete [`StreamEvent`] frames:
/// - lines starting with `:` are comments, skipped
/// - `event:` sets the pending event name
/// - `data:` appends the value plus `\n` to the data buffer
/// - an empty line flushes the buffered frame
/// - a flushed payload equal to `[DONE]` terminates the stream gracefully
///   without emitting an event
pub struct SseFramer {
    buf: Vec<u8>,
    event_name: String,
    data: String,
    done: bool,
}

impl SseFramer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            event_name: String::new(),
            data: String::new(),
            done: false,
        }
    }

    /// Feed one chunk, appending completed frames to `out`.
    ///
    /// Returns `true` once the `[DONE]` sentinel has been seen; the caller
    /// should stop reading the body at that point. Further input after the
    /// sentinel is ignored.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<StreamEvent>) -> bool {
        if self.done {
            return true;
        }
        self.buf.extend_from_slice(chunk);

        let mut consumed = 0;
        while let Some(rel) = memchr(b'\n', &self.buf[consumed..]) {
            let line_end = consumed + rel;
            let mut line = &self.buf[consumed..line_end];
            if line.last() == Some(&b'\r') {
                line = &line[..line.len() - 1];
            }
            let line = String::from_utf8_lossy(line).into_owned();
            consumed = line_end + 1;

            self.process_line(&line, out);
            if self.done {
                break;
            }
        }
        self.buf.drain(..consumed);
        self.done
    }

    /// Flush any buffered unterminated frame at end of input.
    ///
    /// An incomplete final line (no trailing newline) is discarded; only
    /// fully received `data:` lines take part in the flush.
    pub fn finish(&mut self, out: &mut Vec<StreamEvent>) {
        if self.done {
            return;
        }
        self.flush(out);
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<StreamEvent>) {
        if line.is_empty() {
            self.flush(out);
            return;
        }
        if line.starts_with(':') {
            return;
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.event_name = value.trim().to_string();
            return;
        }
        if let Some(value) = line.strip_prefix("data:") {
            self.data.push_str(value.trim());
            self.data.push('\n');
        }
        // Unknown field names are ignored.
    }

    fn flush(&mut self, out: &mut Vec<StreamEvent>) {
        if self.data.is_empty() {
            self.event_name.clear();
            return;
        }
        let raw = self
            .data
            .strip_suffix('\n')
            .unwrap_or(&self.data)
            .to_string();
        self.data.clear();
        let event = std::mem::take(&mut self.event_name);

        if raw == "[DONE]" {
            self.done = true;
            return;
        }

        out.push(StreamEvent {
            event,
            data: raw.clone(),
            raw,
        });
    }
}

impl Default for SseFramer {
    fn default() -> Self {
        Self::new()
    }
}
