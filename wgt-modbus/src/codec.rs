//! Modbus-TCP frame layout for the two supported requests and conversion of
//! register words to typed values.
//!
//! | Field          | Offset | Size | Encoding                         |
//! |----------------|--------|------|----------------------------------|
//! | Transaction ID | 0      | 2    | big-endian                       |
//! | Protocol ID    | 2      | 2    | fixed `0x0000`                   |
//! | Length         | 4      | 2    | big-endian, bytes after the field|
//! | Unit ID        | 6      | 1    | fixed `0x00`                     |
//! | Function code  | 7      | 1    | 3 or 16                          |
//! | Payload        | 8..    | var  | address, count, (byte count, value) |

use crate::error::{Error, Result};

/// Holding register address.
pub type Address = u16;

/// Signed 16-bit value stored in a holding register.
pub type Word = i16;

/// Multiply the stored word by the scale factor to get the actual value.
pub type ScaleFactor = f64;

/// Size of the MBAP header up to and including the length field.
pub const HEADER_SIZE: usize = 6;
/// Smallest payload a request frame is ever built with.
pub const MIN_PAYLOAD_SIZE: usize = 6;

pub const PROTOCOL_ID: u16 = 0;
pub const UNIT_ID: u8 = 0;

pub const READ_HOLDING_REGISTERS: u8 = 3;
pub const WRITE_MULTIPLE_REGISTERS: u8 = 16;

pub const READ_REQUEST_SIZE: usize = 12;
pub const READ_RESPONSE_SIZE: usize = 11;
pub const WRITE_REQUEST_SIZE: usize = 15;
pub const WRITE_RESPONSE_SIZE: usize = 12;

const READ_PAYLOAD_SIZE: usize = READ_REQUEST_SIZE - HEADER_SIZE;
const WRITE_PAYLOAD_SIZE: usize = WRITE_REQUEST_SIZE - HEADER_SIZE;
const REGISTER_COUNT: u16 = 1;
const VALUE_BYTE_COUNT: u8 = 2;

/// Build the common part of every request: MBAP header, unit id, function
/// code, register address and a register count of one.
///
/// `payload_len` is clamped up to [`MIN_PAYLOAD_SIZE`]; the returned frame is
/// `HEADER_SIZE + payload_len` bytes long and bytes past the register count are
/// left zeroed for the caller to fill.
pub fn build_header(
    address: Address,
    transaction_id: u16,
    function: u8,
    payload_len: usize,
) -> Vec<u8> {
    let payload_len = payload_len.max(MIN_PAYLOAD_SIZE);
    let mut frame = vec![0u8; HEADER_SIZE + payload_len];

    frame[0..2].copy_from_slice(&transaction_id.to_be_bytes());
    frame[2..4].copy_from_slice(&PROTOCOL_ID.to_be_bytes());
    frame[4..6].copy_from_slice(&(payload_len as u16).to_be_bytes());
    frame[6] = UNIT_ID;
    frame[7] = function;
    frame[8..10].copy_from_slice(&address.to_be_bytes());
    frame[10..12].copy_from_slice(&REGISTER_COUNT.to_be_bytes());

    frame
}

/// Read one holding register (function 3).
pub fn build_read_frame(address: Address, transaction_id: u16) -> Vec<u8> {
    build_header(
        address,
        transaction_id,
        READ_HOLDING_REGISTERS,
        READ_PAYLOAD_SIZE,
    )
}

/// Write one register through "write multiple registers" (function 16).
pub fn build_write_frame(address: Address, value: Word, transaction_id: u16) -> Vec<u8> {
    let mut frame = build_header(
        address,
        transaction_id,
        WRITE_MULTIPLE_REGISTERS,
        WRITE_PAYLOAD_SIZE,
    );
    frame[12] = VALUE_BYTE_COUNT;
    frame[13..15].copy_from_slice(&value.to_be_bytes());

    frame
}

/// The reply a conformant device sends to a write request: the first
/// [`WRITE_RESPONSE_SIZE`] request bytes with the length field shortened
/// accordingly.
pub fn expected_write_response(request: &[u8]) -> [u8; WRITE_RESPONSE_SIZE] {
    let mut expected = [0u8; WRITE_RESPONSE_SIZE];
    let len = request.len().min(WRITE_RESPONSE_SIZE);
    expected[..len].copy_from_slice(&request[..len]);
    expected[4..6].copy_from_slice(&((WRITE_RESPONSE_SIZE - HEADER_SIZE) as u16).to_be_bytes());

    expected
}

/// Extract the register value from the last two bytes of a read response.
pub fn decode_read_response(response: &[u8; READ_RESPONSE_SIZE]) -> Word {
    Word::from_be_bytes([
        response[READ_RESPONSE_SIZE - 2],
        response[READ_RESPONSE_SIZE - 1],
    ])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MbapHeader {
    pub transaction_id: u16,
    pub protocol_id: u16,
    pub length: u16,
    pub unit_id: u8,
}

impl MbapHeader {
    pub fn parse(frame: &[u8]) -> Option<Self> {
        if frame.len() < HEADER_SIZE + 1 {
            return None;
        }
        Some(Self {
            transaction_id: u16::from_be_bytes([frame[0], frame[1]]),
            protocol_id: u16::from_be_bytes([frame[2], frame[3]]),
            length: u16::from_be_bytes([frame[4], frame[5]]),
            unit_id: frame[6],
        })
    }
}

/// Correlate a read response with its request by transaction id and function
/// code.
pub fn check_read_response(request: &[u8], response: &[u8]) -> Result<()> {
    let (Some(sent), Some(received)) = (MbapHeader::parse(request), MbapHeader::parse(response))
    else {
        return Err(Error::Protocol("read response too short".to_string()));
    };
    if sent.transaction_id != received.transaction_id {
        return Err(Error::Protocol(format!(
            "read response transaction id {} does not match request {}",
            received.transaction_id, sent.transaction_id
        )));
    }
    let function = response.get(HEADER_SIZE + 1).copied();
    if function != Some(READ_HOLDING_REGISTERS) {
        return Err(Error::Protocol(format!(
            "read response function code {function:?} does not match request {READ_HOLDING_REGISTERS}"
        )));
    }

    Ok(())
}

/// Decode a typed value from a register word.
pub trait Decode: Sized {
    fn from_word(word: Word, x: ScaleFactor) -> Self;
}

/// Encode a typed value into a register word.
pub trait Encode {
    fn to_word(&self, x: ScaleFactor) -> Result<Word>;
}

// Divide by the inverse so that `x = 0.1` yields exactly `word / 10`.
macro_rules! impl_numeric {
    ($num_type:ty) => {
        impl Decode for $num_type {
            fn from_word(word: Word, x: ScaleFactor) -> Self {
                let value = f64::from(word) / (1.0 / x);
                value as $num_type
            }
        }

        impl Encode for $num_type {
            #[allow(clippy::unnecessary_cast)]
            fn to_word(&self, x: ScaleFactor) -> Result<Word> {
                let raw = (*self as f64 * (1.0 / x)).round();
                Error::check_range("register value", raw, Word::MIN.into(), Word::MAX.into())?;
                Ok(raw as Word)
            }
        }
    };
}

impl_numeric!(i16);
impl_numeric!(i32);
impl_numeric!(i64);
impl_numeric!(u8);
impl_numeric!(u16);
impl_numeric!(u32);
impl_numeric!(f32);
impl_numeric!(f64);

impl Decode for bool {
    fn from_word(word: Word, _x: ScaleFactor) -> Self {
        word != 0
    }
}

impl Encode for bool {
    fn to_word(&self, _x: ScaleFactor) -> Result<Word> {
        Ok(Word::from(*self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_frame_layout() {
        let frame = build_read_frame(209, 0x0102);
        assert_eq!(
            frame,
            vec![0x01, 0x02, 0x00, 0x00, 0x00, 0x06, 0x00, 0x03, 0x00, 0xD1, 0x00, 0x01]
        );
    }

    #[test]
    fn write_frame_layout() {
        let frame = build_write_frame(100, -2, 7);
        assert_eq!(frame.len(), WRITE_REQUEST_SIZE);
        assert_eq!(
            frame,
            vec![
                0x00, 0x07, 0x00, 0x00, 0x00, 0x09, 0x00, 0x10, 0x00, 0x64, 0x00, 0x01, 0x02,
                0xFF, 0xFE
            ]
        );
    }

    #[test]
    fn length_field_is_clamped_to_minimum_payload() {
        for payload_len in [0, 3, 6] {
            let frame = build_header(1, 0, READ_HOLDING_REGISTERS, payload_len);
            assert_eq!(frame.len(), HEADER_SIZE + MIN_PAYLOAD_SIZE);
            assert_eq!(u16::from_be_bytes([frame[4], frame[5]]), 6);
        }
        let read = build_read_frame(1, 0);
        assert_eq!(u16::from_be_bytes([read[4], read[5]]) as usize, read.len() - HEADER_SIZE);
        let write = build_write_frame(1, 1, 0);
        assert_eq!(u16::from_be_bytes([write[4], write[5]]), 9);
    }

    #[test]
    fn frames_do_not_depend_on_host_byte_order() {
        let (address, value, tid): (Address, Word, u16) = (0x1234, 0x5678, 0x9ABC);
        let frame = build_write_frame(address, value, tid);
        let shifted = |v: u16| [(v >> 8) as u8, (v & 0xFF) as u8];
        assert_eq!(frame[0..2], shifted(tid));
        assert_eq!(frame[8..10], shifted(address));
        assert_eq!(frame[13..15], shifted(value as u16));
    }

    #[test]
    fn write_response_is_shortened_request() {
        let request = build_write_frame(813, 42, 3);
        let expected = expected_write_response(&request);
        assert_eq!(expected[..4], request[..4]);
        assert_eq!(expected[4..6], [0x00, 0x06]);
        assert_eq!(expected[6..], request[6..12]);
    }

    #[test]
    fn read_response_value_is_big_endian_and_signed() {
        let mut response = [0u8; READ_RESPONSE_SIZE];
        response[9..].copy_from_slice(&[0x00, 0xD7]);
        assert_eq!(decode_read_response(&response), 215);
        response[9..].copy_from_slice(&[0xFF, 0x9C]);
        assert_eq!(decode_read_response(&response), -100);
    }

    #[test]
    fn read_response_correlation() {
        let request = build_read_frame(209, 5);
        let mut response = [0x00, 0x05, 0x00, 0x00, 0x00, 0x05, 0x00, 0x03, 0x02, 0x00, 0x01];
        assert!(check_read_response(&request, &response).is_ok());

        response[1] = 6;
        assert!(matches!(
            check_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));

        response[1] = 5;
        response[7] = 0x83;
        assert!(matches!(
            check_read_response(&request, &response),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn scaled_temperatures() {
        assert_eq!(f64::from_word(215, 0.1), 21.5);
        assert_eq!(f64::from_word(-35, 0.1), -3.5);
        assert_eq!(21.5f64.to_word(0.1).unwrap(), 215);
        assert_eq!(21.46f64.to_word(0.1).unwrap(), 215);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            5000.0f64.to_word(0.1),
            Err(Error::OutOfRange { .. })
        ));
        assert!(matches!(40_000u32.to_word(1.0), Err(Error::OutOfRange { .. })));
        assert!(f64::NAN.to_word(1.0).is_err());
    }

    #[test]
    fn booleans() {
        assert!(!bool::from_word(0, 1.0));
        assert!(bool::from_word(1, 1.0));
        assert!(bool::from_word(-7, 1.0));
        assert_eq!(true.to_word(1.0).unwrap(), 1);
        assert_eq!(false.to_word(1.0).unwrap(), 0);
    }
}
