//! Character-set conversion for parsed text.
//!
//! Text nodes carry their content as UTF-8 `String`s from the moment the
//! raw input is decoded, so recoding means: take the bytes as they were
//! captured, reinterpret them under the detected source charset, and hand
//! back UTF-8. Targets other than UTF-8 round-trip through the target
//! encoding and come back lossily, which matches what a terminal or file
//! sink would observe.

/// The baseline charset used when nothing else is detected or enforced.
pub const BASELINE_CHARSET: &str = "utf-8";

/// Error type for recoding failures.
#[derive(Debug, thiserror::Error)]
pub enum RecodeError {
    /// The charset label is not known to the encoding table.
    #[error("unsupported charset '{0}'")]
    UnknownCharset(String),
}

/// Convert `text` from the `from` charset to the `to` charset.
///
/// Identical labels (case-insensitive) are a no-op. The common case is
/// `from` = detected document charset, `to` = UTF-8: the text's bytes are
/// decoded under `from` and the result replaces the original.
///
/// # Errors
///
/// Returns [`RecodeError::UnknownCharset`] when either label is not a
/// registered encoding name.
pub fn recode(text: &str, from: &str, to: &str) -> Result<String, RecodeError> {
    if from.eq_ignore_ascii_case(to) {
        return Ok(text.to_string());
    }

    let source = encoding_rs::Encoding::for_label(from.as_bytes())
        .ok_or_else(|| RecodeError::UnknownCharset(from.to_string()))?;
    let target = encoding_rs::Encoding::for_label(to.as_bytes())
        .ok_or_else(|| RecodeError::UnknownCharset(to.to_string()))?;

    let (decoded, _, _) = source.decode(text.as_bytes());

    if target == encoding_rs::UTF_8 {
        return Ok(decoded.into_owned());
    }

    let (encoded, _, _) = target.encode(&decoded);
    Ok(String::from_utf8_lossy(&encoded).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recode_identity() {
        assert_eq!(recode("héllo", "utf-8", "UTF-8").unwrap(), "héllo");
    }

    #[test]
    fn test_recode_latin1_to_utf8() {
        // "é" stored as the single byte 0xE9 (captured lossily it would be
        // U+FFFD; here we feed a string whose bytes are valid windows-1252).
        let text = "caf\u{e9}";
        let out = recode(text, "windows-1252", "utf-8").unwrap();
        // The UTF-8 bytes of "é" reinterpreted as windows-1252 are "Ã©".
        assert_eq!(out, "caf\u{c3}\u{a9}");
    }

    #[test]
    fn test_recode_unknown_label() {
        assert!(recode("x", "no-such-charset", "utf-8").is_err());
    }
}
