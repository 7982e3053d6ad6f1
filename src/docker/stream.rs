// ABOUTME: Demultiplexer for the engine's framed stdout/stderr exec output stream

/// Byte length of the per-frame header: stream kind, three reserved bytes,
/// then a big-endian u32 payload length.
const FRAME_HEADER_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame<'a> {
    pub kind: StreamKind,
    pub payload: &'a [u8],
}

/// Walks a raw multiplexed buffer and yields the well-formed frames in
/// arrival order. A truncated trailer (fewer than 8 bytes left) or a declared
/// payload length running past the end of the buffer stops the walk without
/// an error; the frames before the truncation are still returned.
pub fn frames(buf: &[u8]) -> Vec<StreamFrame<'_>> {
    let mut parsed = Vec::new();
    let mut offset = 0;

    while buf.len() - offset >= FRAME_HEADER_LEN {
        let header = &buf[offset..offset + FRAME_HEADER_LEN];
        let length = u32::from_be_bytes([header[4], header[5], header[6], header[7]]) as usize;

        let start = offset + FRAME_HEADER_LEN;
        let end = start + length;
        if end > buf.len() {
            break;
        }

        let kind = match header[0] {
            2 => StreamKind::Stderr,
            _ => StreamKind::Stdout,
        };
        parsed.push(StreamFrame {
            kind,
            payload: &buf[start..end],
        });
        offset = end;
    }

    parsed
}

/// Flattens all frame payloads into one text blob, in arrival order and with
/// the stdout/stderr distinction dropped, which is how command output is
/// consumed downstream.
pub fn combined_output(buf: &[u8]) -> String {
    frames(buf)
        .iter()
        .map(|frame| String::from_utf8_lossy(frame.payload))
        .collect()
}
