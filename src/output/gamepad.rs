//! Virtual gamepad state with an explicit, fixed binary layout.
//!
//! Instead of overlapping OS structs in raw memory, the controller state is
//! a named-field record with a documented 12-byte little-endian image:
//!
//! ```text
//! offset  width  field
//!      0      2  buttons        (u16, bitmask)
//!      2      1  left_trigger   (u8)
//!      3      1  right_trigger  (u8)
//!      4      2  left_stick_x   (i16)  ← steering channel
//!      6      2  left_stick_y   (i16)
//!      8      2  right_stick_x  (i16)
//!     10      2  right_stick_y  (i16)
//! ```
//!
//! The encoded image is what gets handed to the [`GamepadDevice`] seam; how
//! a platform driver consumes it is outside the core.

use crate::output::sink::{AnalogSurface, GamepadAxis, OutputError};
use tracing::debug;

/// Size of the encoded controller state image.
pub const STATE_IMAGE_LEN: usize = 12;

/// Complete state of the virtual controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GamepadState {
    pub buttons: u16,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_stick_x: i16,
    pub left_stick_y: i16,
    pub right_stick_x: i16,
    pub right_stick_y: i16,
}

impl GamepadState {
    /// Encodes the state into its fixed 12-byte little-endian image.
    pub fn encode(&self) -> [u8; STATE_IMAGE_LEN] {
        let mut image = [0u8; STATE_IMAGE_LEN];
        image[0..2].copy_from_slice(&self.buttons.to_le_bytes());
        image[2] = self.left_trigger;
        image[3] = self.right_trigger;
        image[4..6].copy_from_slice(&self.left_stick_x.to_le_bytes());
        image[6..8].copy_from_slice(&self.left_stick_y.to_le_bytes());
        image[8..10].copy_from_slice(&self.right_stick_x.to_le_bytes());
        image[10..12].copy_from_slice(&self.right_stick_y.to_le_bytes());
        image
    }
}

/// Driver seam that publishes a controller state to the host.
pub trait GamepadDevice {
    fn publish(&mut self, state: &GamepadState) -> Result<(), OutputError>;
}

/// Device that only logs the state image, for platforms without a driver.
pub struct LogDevice;

impl GamepadDevice for LogDevice {
    fn publish(&mut self, state: &GamepadState) -> Result<(), OutputError> {
        debug!("gamepad state image: {:02x?}", state.encode());
        Ok(())
    }
}

/// Virtual controller holding the current state and pushing every change
/// through the device seam.
pub struct VirtualGamepad {
    state: GamepadState,
    device: Box<dyn GamepadDevice + Send>,
}

impl VirtualGamepad {
    pub fn new(device: Box<dyn GamepadDevice + Send>) -> Self {
        Self {
            state: GamepadState::default(),
            device,
        }
    }

    pub fn state(&self) -> &GamepadState {
        &self.state
    }
}

impl AnalogSurface for VirtualGamepad {
    fn set_axis(&mut self, axis: GamepadAxis, value: i16) -> Result<(), OutputError> {
        match axis {
            GamepadAxis::LeftStickX => self.state.left_stick_x = value,
            GamepadAxis::LeftStickY => self.state.left_stick_y = value,
            GamepadAxis::RightStickX => self.state.right_stick_x = value,
            GamepadAxis::RightStickY => self.state.right_stick_y = value,
        }
        self.device.publish(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_image_has_documented_offsets_and_endianness() {
        let state = GamepadState {
            buttons: 0x1234,
            left_trigger: 0xAA,
            right_trigger: 0xBB,
            left_stick_x: -2,
            left_stick_y: 0x0102,
            right_stick_x: 0x7FFF,
            right_stick_y: i16::MIN,
        };
        let image = state.encode();
        assert_eq!(&image[0..2], &[0x34, 0x12]);
        assert_eq!(image[2], 0xAA);
        assert_eq!(image[3], 0xBB);
        assert_eq!(&image[4..6], &(-2i16).to_le_bytes());
        assert_eq!(&image[6..8], &[0x02, 0x01]);
        assert_eq!(&image[8..10], &[0xFF, 0x7F]);
        assert_eq!(&image[10..12], &[0x00, 0x80]);
    }

    #[test]
    fn set_axis_updates_only_the_addressed_field() {
        let mut pad = VirtualGamepad::new(Box::new(LogDevice));
        pad.set_axis(GamepadAxis::LeftStickX, 32767).unwrap();
        assert_eq!(pad.state().left_stick_x, 32767);
        assert_eq!(pad.state().left_stick_y, 0);
        assert_eq!(pad.state().buttons, 0);
    }
}
