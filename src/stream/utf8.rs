//! Incremental, lossy UTF-8 decoding across chunk boundaries.

/// Decodes byte chunks into text, carrying an incomplete trailing sequence
/// over to the next chunk.
///
/// The concatenated output equals `String::from_utf8_lossy` over all input
/// bytes, whatever the chunk boundaries are.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `bytes` (plus any carried-over prefix) as possible.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut input: &[u8] = &self.pending;

        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    out.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                    match err.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            input = &rest[len..];
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        let rest = input.to_vec();
        self.pending = rest;
        out
    }

    /// Flush whatever is left once the stream is over.
    pub fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_in_pieces(bytes: &[u8], size: usize) -> String {
        let mut decoder = Utf8Decoder::new();
        let mut out = String::new();
        for piece in bytes.chunks(size) {
            out.push_str(&decoder.decode(piece));
        }
        out.push_str(&decoder.finish());
        out
    }

    #[test]
    fn split_multibyte_characters_are_reassembled() {
        let text = "リクガメは葉野菜を食べます 🐢";
        for size in 1..=5 {
            assert_eq!(decode_in_pieces(text.as_bytes(), size), text, "piece size {size}");
        }
    }

    #[test]
    fn invalid_bytes_match_lossy_conversion() {
        let bytes = b"ok \xFF\xFE then \xE2\x82 broken \xF0\x9F\x90\xA2";
        let expected = String::from_utf8_lossy(bytes).into_owned();
        for size in 1..=4 {
            assert_eq!(decode_in_pieces(bytes, size), expected, "piece size {size}");
        }
    }

    #[test]
    fn truncated_tail_is_replaced_on_finish() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"abc\xE3\x81"), "abc");
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.finish(), "");
    }
}
