//! Wire protocol for the phone controller connection.
//!
//! A frame is exactly 9 bytes: one command tag followed by two little-endian
//! IEEE-754 f32 values (`rotation_x`, `rotation_y`). Bytes past the fixed
//! prefix are ignored; there is no message framing beyond it. Reads shorter
//! than a full frame are rejected outright, never buffered for completion by
//! a later read; a client that splits a frame across TCP segments loses it.

use thiserror::Error;

/// Fixed size of one wire frame: 1 command byte + 2 × 4 bytes steering data.
pub const FRAME_LEN: usize = 9;

/// Pedal command carried in the first frame byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// `'w'`: press accelerate
    Accelerate,
    /// `'s'`: press brake
    Brake,
    /// `'n'`: release both pedals
    Neutral,
    /// Any other tag byte; steering is still applied
    Unrecognized(u8),
}

impl Command {
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            b'w' => Command::Accelerate,
            b's' => Command::Brake,
            b'n' => Command::Neutral,
            other => Command::Unrecognized(other),
        }
    }
}

/// One decoded command frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub command: Command,
    /// Steering deflection, expected roughly in [-1, 1] but not clamped here
    pub rotation_x: f32,
    /// Decoded but not consumed by translation, reserved
    pub rotation_y: f32,
}

/// Decode failure. Only length checks can fail; any 8-byte bit pattern is
/// valid IEEE-754 once enough bytes are present.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("received empty data")]
    Empty,
    #[error("incomplete frame, length={len} (need {FRAME_LEN} bytes)")]
    Incomplete { len: usize },
}

/// Decodes one frame from a raw read buffer.
///
/// A partial frame is rejected as a whole: the first byte may look like a
/// command, but steering data is mandatory per frame.
pub fn decode(buf: &[u8]) -> Result<Frame, FrameError> {
    if buf.is_empty() {
        return Err(FrameError::Empty);
    }
    if buf.len() < FRAME_LEN {
        return Err(FrameError::Incomplete { len: buf.len() });
    }

    Ok(Frame {
        command: Command::from_tag(buf[0]),
        rotation_x: read_f32_le(buf, 1),
        rotation_y: read_f32_le(buf, 5),
    })
}

// Caller guarantees buf.len() >= offset + 4.
fn read_f32_le(buf: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_bytes(tag: u8, x: f32, y: f32) -> Vec<u8> {
        let mut buf = vec![tag];
        buf.extend_from_slice(&x.to_le_bytes());
        buf.extend_from_slice(&y.to_le_bytes());
        buf
    }

    #[test]
    fn empty_buffer_is_rejected() {
        assert_eq!(decode(&[]), Err(FrameError::Empty));
    }

    #[test]
    fn all_short_lengths_are_incomplete() {
        for len in 1..FRAME_LEN {
            let buf = vec![b'w'; len];
            assert_eq!(decode(&buf), Err(FrameError::Incomplete { len }));
        }
    }

    #[test]
    fn floats_round_trip_against_their_encoding() {
        for &(x, y) in &[(0.5f32, 0.0f32), (-1.0, 1.0), (0.125, -0.75), (0.0, 0.0)] {
            let frame = decode(&frame_bytes(b'n', x, y)).unwrap();
            assert_eq!(frame.rotation_x.to_le_bytes(), x.to_le_bytes());
            assert_eq!(frame.rotation_y.to_le_bytes(), y.to_le_bytes());
        }
    }

    #[test]
    fn command_alphabet() {
        assert_eq!(
            decode(&frame_bytes(b'w', 0.0, 0.0)).unwrap().command,
            Command::Accelerate
        );
        assert_eq!(
            decode(&frame_bytes(b's', 0.0, 0.0)).unwrap().command,
            Command::Brake
        );
        assert_eq!(
            decode(&frame_bytes(b'n', 0.0, 0.0)).unwrap().command,
            Command::Neutral
        );
        assert_eq!(
            decode(&frame_bytes(b'x', 0.0, 0.0)).unwrap().command,
            Command::Unrecognized(b'x')
        );
    }

    #[test]
    fn unrecognized_command_still_decodes_steering() {
        let frame = decode(&frame_bytes(0xFF, -0.5, 0.25)).unwrap();
        assert_eq!(frame.command, Command::Unrecognized(0xFF));
        assert_eq!(frame.rotation_x, -0.5);
    }

    #[test]
    fn bytes_past_the_frame_are_ignored() {
        let mut buf = frame_bytes(b'w', 1.0, 0.0);
        buf.extend_from_slice(&[0xAA; 16]);
        let frame = decode(&buf).unwrap();
        assert_eq!(frame.command, Command::Accelerate);
        assert_eq!(frame.rotation_x, 1.0);
    }
}
