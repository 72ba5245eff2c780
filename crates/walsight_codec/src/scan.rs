//! Strict top-level field scanner.
//!
//! `prost` silently skips fields it does not know about, which makes two
//! unrelated schemas accept the same bytes. The scanner walks the top-level
//! fields of a payload before it is handed to `prost` and rejects any field
//! number or wire type the schema does not declare.

use crate::error::{CodecError, CodecResult};

/// Largest field number allowed by the protobuf encoding.
const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// A varint never occupies more than ten bytes.
const MAX_VARINT_LEN: usize = 10;

/// Protobuf wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// int32, int64, uint32, uint64, bool, enum.
    Varint,
    /// fixed64, sfixed64, double.
    Fixed64,
    /// string, bytes, embedded messages, packed repeated fields.
    Len,
    /// Deprecated group start.
    StartGroup,
    /// Deprecated group end.
    EndGroup,
    /// fixed32, sfixed32, float.
    Fixed32,
}

impl WireType {
    /// Converts the low three bits of a field key to a wire type.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::Len),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

/// A field declared by a message schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field number.
    pub number: u32,
    /// Expected wire type.
    pub wire_type: WireType,
}

impl FieldSpec {
    /// Declares a varint field.
    pub const fn varint(number: u32) -> Self {
        Self {
            number,
            wire_type: WireType::Varint,
        }
    }

    /// Declares a length-delimited field.
    pub const fn len(number: u32) -> Self {
        Self {
            number,
            wire_type: WireType::Len,
        }
    }
}

/// Walks the top-level fields of an encoded message.
pub struct FieldScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FieldScanner<'a> {
    /// Create a new scanner for the given bytes.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Check if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads the next field key and skips its value.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    pub fn next_field(&mut self) -> CodecResult<Option<(u32, WireType)>> {
        if self.is_empty() {
            return Ok(None);
        }
        let key_offset = self.pos;
        let key = self.read_varint()?;
        let bits = (key & 0x07) as u8;
        let wire_type = WireType::from_bits(bits).ok_or(CodecError::InvalidWireType {
            value: bits,
            offset: key_offset,
        })?;
        let number = key >> 3;
        if number == 0 || number > MAX_FIELD_NUMBER {
            return Err(CodecError::InvalidFieldNumber {
                number,
                offset: key_offset,
            });
        }
        #[allow(clippy::cast_possible_truncation)]
        let number = number as u32;
        self.skip_value(number, wire_type)?;
        Ok(Some((number, wire_type)))
    }

    fn skip_value(&mut self, number: u32, wire_type: WireType) -> CodecResult<()> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::Fixed64 => {
                self.read_bytes(8)?;
            }
            WireType::Fixed32 => {
                self.read_bytes(4)?;
            }
            WireType::Len => {
                let len = self.read_varint()?;
                let len = usize::try_from(len).map_err(|_| CodecError::UnexpectedEof)?;
                self.read_bytes(len)?;
            }
            WireType::StartGroup | WireType::EndGroup => {
                return Err(CodecError::GroupsUnsupported { number });
            }
        }
        Ok(())
    }

    #[inline]
    fn read_byte(&mut self) -> CodecResult<u8> {
        if self.pos >= self.data.len() {
            return Err(CodecError::UnexpectedEof);
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if len > self.data.len() - self.pos {
            return Err(CodecError::UnexpectedEof);
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn read_varint(&mut self) -> CodecResult<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = self.read_byte()?;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(CodecError::VarintOverflow { offset: start })
    }
}

/// Checks that every top-level field of `data` is declared in `fields`
/// with a matching wire type.
///
/// # Errors
///
/// Returns the first framing, unknown-field, or wire-type error found.
pub fn check_fields(data: &[u8], message: &'static str, fields: &[FieldSpec]) -> CodecResult<()> {
    let mut scanner = FieldScanner::new(data);
    while let Some((number, actual)) = scanner.next_field()? {
        let spec = fields
            .iter()
            .find(|f| f.number == number)
            .ok_or(CodecError::UnknownField { message, number })?;
        if spec.wire_type != actual {
            return Err(CodecError::WireTypeMismatch {
                message,
                number,
                expected: spec.wire_type,
                actual,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIELDS: &[FieldSpec] = &[FieldSpec::varint(1), FieldSpec::len(2)];

    #[test]
    fn scan_empty() {
        let mut scanner = FieldScanner::new(&[]);
        assert_eq!(scanner.next_field().unwrap(), None);
    }

    #[test]
    fn scan_varint_and_len_fields() {
        // field 1 = 150, field 2 = "ab"
        let data = [0x08, 0x96, 0x01, 0x12, 0x02, b'a', b'b'];
        let mut scanner = FieldScanner::new(&data);
        assert_eq!(scanner.next_field().unwrap(), Some((1, WireType::Varint)));
        assert_eq!(scanner.next_field().unwrap(), Some((2, WireType::Len)));
        assert_eq!(scanner.next_field().unwrap(), None);
        assert!(check_fields(&data, "Test", FIELDS).is_ok());
    }

    #[test]
    fn reject_invalid_wire_type() {
        // '?' is field 7 with wire type 7
        assert!(matches!(
            FieldScanner::new(b"?").next_field(),
            Err(CodecError::InvalidWireType { value: 7, .. })
        ));
    }

    #[test]
    fn reject_field_zero() {
        assert!(matches!(
            FieldScanner::new(&[0x00, 0x01]).next_field(),
            Err(CodecError::InvalidFieldNumber { number: 0, .. })
        ));
    }

    #[test]
    fn reject_truncated_len() {
        let data = [0x12, 0x05, b'a'];
        assert_eq!(
            FieldScanner::new(&data).next_field(),
            Err(CodecError::UnexpectedEof)
        );
    }

    #[test]
    fn reject_varint_overflow() {
        let data = [0x08, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert!(matches!(
            FieldScanner::new(&data).next_field(),
            Err(CodecError::VarintOverflow { offset: 1 })
        ));
    }

    #[test]
    fn reject_groups() {
        // field 1, wire type 3
        assert_eq!(
            FieldScanner::new(&[0x0b]).next_field(),
            Err(CodecError::GroupsUnsupported { number: 1 })
        );
    }

    #[test]
    fn unknown_field_rejected() {
        // field 3 varint
        assert_eq!(
            check_fields(&[0x18, 0x01], "Test", FIELDS),
            Err(CodecError::UnknownField {
                message: "Test",
                number: 3
            })
        );
    }

    #[test]
    fn wire_type_mismatch_rejected() {
        // field 2 encoded as varint
        assert!(matches!(
            check_fields(&[0x10, 0x01], "Test", FIELDS),
            Err(CodecError::WireTypeMismatch {
                number: 2,
                expected: WireType::Len,
                actual: WireType::Varint,
                ..
            })
        ));
    }

    proptest::proptest! {
        #[test]
        fn scan_terminates_on_arbitrary_bytes(
            data in proptest::collection::vec(proptest::prelude::any::<u8>(), 0..128),
        ) {
            let mut scanner = FieldScanner::new(&data);
            let mut fields = 0;
            while let Ok(Some(_)) = scanner.next_field() {
                fields += 1;
                proptest::prop_assert!(fields <= data.len());
            }
        }
    }
}
