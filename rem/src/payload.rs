//! Robot command wire frame

use bytemuck::{Pod, Zeroable};

/// Encoded robot command packet
///
/// Total packet size: 8 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed)]
pub struct RobotCommandPayload {
    /// Packet type tag (1 byte)
    pub header: u8,

    /// Target robot identifier (1 byte)
    pub id: u8,

    /// Heading angle in radians, f32 little-endian (4 bytes)
    pub angle: [u8; 4],

    /// Wrapping word sum of the bytes above (2 bytes)
    pub checksum: u16,
}

impl RobotCommandPayload {
    /// Expected packet size in bytes
    pub const PACKET_SIZE: usize = 8;

    /// Build a sealed packet.
    pub fn new(header: u8, id: u8, angle: f32) -> Self {
        let mut payload = Self {
            header,
            id,
            angle: angle.to_le_bytes(),
            checksum: 0,
        };
        payload.seal();
        payload
    }

    /// Decoded heading angle
    pub fn angle(&self) -> f32 {
        f32::from_le_bytes(self.angle)
    }

    /// Raw bytes, ready to write to the link
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Checksum the current header, id and angle call for.
    pub fn expected_checksum(&self) -> u16 {
        word_sum(&self.as_bytes()[..Self::PACKET_SIZE - 2])
    }

    /// Store the checksum for the current contents.
    pub fn seal(&mut self) {
        self.checksum = self.expected_checksum();
    }

    /// True if the stored checksum matches the contents.
    pub fn verify(&self) -> bool {
        self.checksum == self.expected_checksum()
    }
}

/// Wrapping sum of little-endian 16-bit words. `body` has even length.
fn word_sum(body: &[u8]) -> u16 {
    body.chunks_exact(2)
        .map(|word| u16::from_le_bytes([word[0], word[1]]))
        .fold(0u16, |acc, word| acc.wrapping_add(word))
}

// SAFETY: RobotCommandPayload is repr(C, packed) and all fields are Pod
unsafe impl Pod for RobotCommandPayload {}
// SAFETY: RobotCommandPayload is repr(C, packed) and all fields are Zeroable
unsafe impl Zeroable for RobotCommandPayload {}
