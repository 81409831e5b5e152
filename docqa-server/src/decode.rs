//! Upload decoding.

/// Decode an uploaded file as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to the code point of the same value, so the
/// fallback cannot fail.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            tracing::debug!(valid_up_to = e.valid_up_to(), "upload is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}
