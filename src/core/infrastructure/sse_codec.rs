//! Incremental decoder for `text/event-stream` payloads.
//!
//! The transport delivers arbitrary byte chunks; this decoder reassembles
//! them into complete server-sent events. Only the `event` and `data` fields
//! matter to the dashboard stream; `id`, `retry`, and comment lines are
//! accepted and ignored.

/// One fully-assembled server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    /// The `event:` field, absent for unnamed message events.
    pub name: Option<String>,
    /// All `data:` lines joined with newlines.
    pub data: String,
}

/// Stateful event-stream decoder. Feed it chunks, collect complete events.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: String,
    event_name: Option<String>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes one transport chunk and returns every event completed by it.
    ///
    /// Incomplete trailing lines stay buffered until the next chunk.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = line.trim_end_matches('\n').trim_end_matches('\r');
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment line.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            // id and retry are irrelevant to this stream.
            _ => {}
        }
        None
    }

    /// Blank line: emit the pending event, if it carries data.
    fn dispatch(&mut self) -> Option<SseEvent> {
        let name = self.event_name.take();
        if self.data_lines.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(SseEvent { name, data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: dashboard\ndata: {\"x\":1}\n\n");
        assert_eq!(
            events,
            vec![SseEvent {
                name: Some("dashboard".to_string()),
                data: "{\"x\":1}".to_string(),
            }]
        );
    }

    #[test]
    fn test_unnamed_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: hello\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, None);
        assert_eq!(events[0].data, "hello");
    }

    #[test]
    fn test_multi_line_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: line one\ndata: line two\n\n");
        assert_eq!(events[0].data, "line one\nline two");
    }

    #[test]
    fn test_fragmented_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: dash").is_empty());
        assert!(decoder.push(b"board\ndata: {}").is_empty());
        let events = decoder.push(b"\n\n");
        assert_eq!(events[0].name.as_deref(), Some("dashboard"));
        assert_eq!(events[0].data, "{}");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: dashboard\r\ndata: 1\r\n\r\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "1");
    }

    #[test]
    fn test_comments_and_unknown_fields_ignored() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\nid: 7\nretry: 1000\ndata: x\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
    }

    #[test]
    fn test_blank_line_without_data_emits_nothing() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"event: dashboard\n\n").is_empty());
        assert!(decoder.push(b"\n\n\n").is_empty());
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: a\n\ndata: b\n\n");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "a");
        assert_eq!(events[1].data, "b");
    }
}
