//! External decoder bridge.
//!
//! A long-lived external program decodes payloads the built-in classifier
//! does not know. The exchange is strictly one request line and one reply
//! line per record:
//!
//! ```text
//! request: <payload hex, or "-" when empty> <term> <index>\n
//! reply:   <index>|<formatted text>\n
//! ```
//!
//! A reply that breaks this shape is reported against its record and the
//! run continues. A decoder that stops answering ends the run.

mod process;

use std::fmt;

use crate::classify::{DecodedRecord, RecordBody};
use crate::error::CoreResult;
use crate::record::RawRecord;

pub use process::ProcessDecoder;

/// Which records the decoder sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DecoderScope {
    /// Only normal records the classifier could not decode. The reply
    /// replaces the built-in body.
    #[default]
    Unknown,
    /// Every normal record. The reply is appended after the built-in body.
    AllNormal,
}

impl DecoderScope {
    /// Whether a record is sent to the decoder.
    #[must_use]
    pub fn is_eligible(self, record: &DecodedRecord) -> bool {
        match self {
            Self::Unknown => record.is_unknown(),
            Self::AllNormal => matches!(record.body, RecordBody::Normal(_)),
        }
    }
}

/// Why a decoder reply was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// No `|` separator.
    MissingSeparator,
    /// Nothing before the separator.
    MissingIdentifier,
    /// The identifier is not a decimal index.
    InvalidIdentifier,
    /// The reply is not valid UTF-8.
    InvalidUtf8,
    /// The identifier names another record.
    IdentifierMismatch {
        /// Index of the record that was sent.
        expected: u64,
        /// Index echoed back.
        actual: u64,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing separator"),
            Self::MissingIdentifier => write!(f, "missing identifier"),
            Self::InvalidIdentifier => write!(f, "invalid identifier"),
            Self::InvalidUtf8 => write!(f, "invalid utf-8"),
            Self::IdentifierMismatch { expected, actual } => {
                write!(f, "identifier mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

/// One reply from the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecoderReply {
    /// A well-formed reply; the formatted text, verbatim.
    Decoded(String),
    /// A reply that broke the protocol.
    Malformed {
        /// What was wrong.
        reason: MalformedReason,
        /// The reply line without its line terminator.
        raw: Vec<u8>,
    },
}

impl DecoderReply {
    /// Whether the reply broke the protocol.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

/// A decoder serving one request at a time.
pub trait StreamDecoder {
    /// Sends one record and waits for its reply.
    ///
    /// # Errors
    ///
    /// Fails if the decoder cannot be started, exits, or stops answering.
    /// A malformed reply is not an error.
    fn decode(&mut self, record: &RawRecord) -> CoreResult<DecoderReply>;

    /// Stops the decoder. Further calls to [`Self::decode`] restart it.
    ///
    /// # Errors
    ///
    /// Fails if the decoder cannot be reaped.
    fn shutdown(&mut self) -> CoreResult<()>;
}

/// Builds the request line for a record.
#[must_use]
pub fn request_line(record: &RawRecord) -> String {
    let payload = if record.payload.is_empty() {
        "-".to_string()
    } else {
        hex_encode(&record.payload)
    };
    format!("{payload} {} {}\n", record.term, record.index)
}

/// Lowercase hex encoding.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const DIGITS: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(DIGITS[usize::from(b >> 4)]));
        out.push(char::from(DIGITS[usize::from(b & 0x0f)]));
    }
    out
}

/// Validates a raw reply line against the record it answers.
///
/// A line that is not UTF-8 is malformed and kept byte for byte.
#[must_use]
pub fn parse_reply_bytes(line: &[u8], index: u64) -> DecoderReply {
    match std::str::from_utf8(line) {
        Ok(text) => parse_reply(text, index),
        Err(_) => {
            let line = line.strip_suffix(b"\n").unwrap_or(line);
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            DecoderReply::Malformed {
                reason: MalformedReason::InvalidUtf8,
                raw: line.to_vec(),
            }
        }
    }
}

/// Validates a reply line against the record it answers.
#[must_use]
pub fn parse_reply(line: &str, index: u64) -> DecoderReply {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let malformed = |reason| DecoderReply::Malformed {
        reason,
        raw: line.as_bytes().to_vec(),
    };

    let Some((id, text)) = line.split_once('|') else {
        return malformed(MalformedReason::MissingSeparator);
    };
    if id.is_empty() {
        return malformed(MalformedReason::MissingIdentifier);
    }
    if !id.bytes().all(|b| b.is_ascii_digit()) {
        return malformed(MalformedReason::InvalidIdentifier);
    }
    let Ok(actual) = id.parse::<u64>() else {
        return malformed(MalformedReason::InvalidIdentifier);
    };
    if actual != index {
        return malformed(MalformedReason::IdentifierMismatch {
            expected: index,
            actual,
        });
    }
    DecoderReply::Decoded(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;

    #[test]
    fn request_lines() {
        assert_eq!(
            request_line(&RawRecord::normal(27, 34, b"?".to_vec())),
            "3f 27 34\n"
        );
        assert_eq!(
            request_line(&RawRecord::normal(1, 2, vec![0x00, 0xab, 0xff])),
            "00abff 1 2\n"
        );
        assert_eq!(request_line(&RawRecord::normal(1, 2, Vec::new())), "- 1 2\n");
    }

    #[test]
    fn well_formed_reply() {
        assert_eq!(
            parse_reply("34|decoded hex=3f term=27\n", 34),
            DecoderReply::Decoded("decoded hex=3f term=27".to_string())
        );
        assert_eq!(
            parse_reply("34|a|b\r\n", 34),
            DecoderReply::Decoded("a|b".to_string())
        );
        assert_eq!(parse_reply("34|", 34), DecoderReply::Decoded(String::new()));
    }

    #[test]
    fn malformed_replies() {
        let reason = |line: &str| match parse_reply(line, 34) {
            DecoderReply::Malformed { reason, .. } => reason,
            DecoderReply::Decoded(text) => panic!("accepted {text:?}"),
        };
        assert_eq!(reason("decoded\n"), MalformedReason::MissingSeparator);
        assert_eq!(reason("|decoded\n"), MalformedReason::MissingIdentifier);
        assert_eq!(reason("x4|decoded\n"), MalformedReason::InvalidIdentifier);
        assert_eq!(reason("+34|decoded\n"), MalformedReason::InvalidIdentifier);
        assert_eq!(
            reason("99999999999999999999999|decoded\n"),
            MalformedReason::InvalidIdentifier
        );
        assert_eq!(
            reason("33|decoded\n"),
            MalformedReason::IdentifierMismatch {
                expected: 34,
                actual: 33
            }
        );
    }

    #[test]
    fn malformed_reply_keeps_raw_line() {
        let reply = parse_reply("|decoded hex=3f\n", 34);
        assert!(reply.is_malformed());
        assert_eq!(
            reply,
            DecoderReply::Malformed {
                reason: MalformedReason::MissingIdentifier,
                raw: b"|decoded hex=3f".to_vec(),
            }
        );
    }

    #[test]
    fn non_utf8_reply_is_malformed_and_kept_verbatim() {
        assert_eq!(
            parse_reply_bytes(b"34|\xff\xfeok\r\n", 34),
            DecoderReply::Malformed {
                reason: MalformedReason::InvalidUtf8,
                raw: b"34|\xff\xfeok".to_vec(),
            }
        );
        assert_eq!(
            parse_reply_bytes("34|d\u{e9}cod\u{e9}\n".as_bytes(), 34),
            DecoderReply::Decoded("d\u{e9}cod\u{e9}".to_string())
        );
        assert_eq!(MalformedReason::InvalidUtf8.to_string(), "invalid utf-8");
    }

    #[test]
    fn scope_eligibility() {
        let unknown = classify(RawRecord::normal(1, 1, b"?".to_vec())).unwrap();
        let empty = classify(RawRecord::normal(1, 2, Vec::new())).unwrap();
        let conf = classify(RawRecord::config_change(
            1,
            3,
            walsight_codec::Encode::encode_payload(&walsight_codec::raftpb::ConfChange::default()),
        ))
        .unwrap();

        assert!(DecoderScope::Unknown.is_eligible(&unknown));
        assert!(DecoderScope::Unknown.is_eligible(&empty));
        assert!(!DecoderScope::Unknown.is_eligible(&conf));
        assert!(DecoderScope::AllNormal.is_eligible(&unknown));
        assert!(!DecoderScope::AllNormal.is_eligible(&conf));
    }

    #[test]
    fn reason_display() {
        assert_eq!(
            MalformedReason::IdentifierMismatch {
                expected: 3,
                actual: 4
            }
            .to_string(),
            "identifier mismatch: expected 3, got 4"
        );
    }
}
