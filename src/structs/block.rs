use log::warn;

use super::*;
use crate::{filesystem::Image, Error};

impl AsBitmap for Block {}

impl Block {
    /// Load block with index, truncated where the image ends
    pub fn load(image: &mut Image, superblock: &Superblock, index: u64) -> Result<Self, Error> {
        let position = superblock.block_position(index);
        let data = image.read_clamped(position, superblock.block_size)?;
        if (data.len() as u64) < superblock.block_size {
            warn!(
                "Block {index} is cut short by the end of image ({} of {} bytes)",
                data.len(),
                superblock.block_size
            );
        }
        Ok(Self { index, data })
    }

    /// Interpret block contents as little-endian block pointers, ignoring a trailing partial entry
    pub fn pointers(&self) -> impl Iterator<Item = u32> + '_ {
        self.data
            .chunks_exact(BYTES_IN_POINTER)
            .map(|raw| u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }
}
