use std::fmt::Display;

use super::*;
use crate::{filesystem::Image, Error};

const BITS_IN_BYTE: u64 = u8::BITS as u64;

impl<T: AsBitmap> Bitmap<T> {
    /// Expand `count` bits of `bytes`, least significant bit first
    pub fn decode(bytes: &[u8], count: u64, position: u64) -> Self {
        let bitfield = (0..count)
            .map(|index| match bytes.get((index / BITS_IN_BYTE) as usize) {
                Some(chunk) => (chunk >> (index % BITS_IN_BYTE)) & 1 == 1,
                None => false,
            })
            .collect();
        Self {
            bitfield,
            position,
            __type: PhantomData,
        }
    }

    /// Pack occupancy back into bytes, least significant bit first
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = vec![0u8; Self::size(self.count())];
        for (index, _) in self.bitfield.iter().enumerate().filter(|(_, bit)| **bit) {
            buffer[index / BITS_IN_BYTE as usize] |= 1 << (index % BITS_IN_BYTE as usize);
        }
        buffer
    }

    /// Load `count` bits from the image at byte `position`
    pub fn load(image: &mut Image, position: u64, count: u64) -> Result<Self, Error> {
        let buffer = image.read(position, Self::size(count) as u64)?;
        Ok(Self::decode(&buffer, count, position))
    }

    /// Size in bytes needed to store `count` bits
    pub fn size(count: u64) -> usize {
        count.div_ceil(BITS_IN_BYTE) as usize
    }

    pub fn count(&self) -> u64 {
        self.bitfield.len() as u64
    }

    /// Get occupancy
    pub fn get(&self, index: u64) -> Result<bool, Error> {
        self.bitfield
            .get(index as usize)
            .copied()
            .ok_or(Error::OutOfBounds)
    }

    /// Indexes of occupied units
    pub fn used(&self) -> impl Iterator<Item = u64> + '_ {
        self.indexes(true)
    }

    /// Indexes of free units
    pub fn free(&self) -> impl Iterator<Item = u64> + '_ {
        self.indexes(false)
    }

    fn indexes(&self, value: bool) -> impl Iterator<Item = u64> + '_ {
        self.bitfield
            .iter()
            .enumerate()
            .filter(move |(_, bit)| **bit == value)
            .map(|(index, _)| index as u64)
    }
}

impl Bitmap<Block> {
    /// Load a group's block bitmap
    pub fn load_group(
        image: &mut Image,
        superblock: &Superblock,
        group: &GroupLocation,
    ) -> Result<Self, Error> {
        Self::load(image, group.block_bitmap, superblock.blocks_per_group)
    }

    /// Global numbers of the group's free blocks
    pub fn free_blocks<'a>(&'a self, group: &'a GroupLocation) -> impl Iterator<Item = u64> + 'a {
        self.free().map(move |index| group.first_block + index)
    }
}

impl Bitmap<Inode> {
    /// Load a group's inode bitmap
    pub fn load_group(
        image: &mut Image,
        superblock: &Superblock,
        group: &GroupLocation,
    ) -> Result<Self, Error> {
        Self::load(image, group.inode_bitmap, superblock.inodes_per_group)
    }
}

impl<T: AsBitmap> Display for Bitmap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.used().count();
        writeln!(f, "position: {:#x}", self.position)?;
        writeln!(f, "used:     {used}/{}", self.count())?;
        for (row, chunk) in self.bitfield.chunks(64).enumerate() {
            let line: String = chunk.iter().map(|bit| if *bit { '1' } else { '0' }).collect();
            writeln!(f, "{:>8}: {line}", row * 64)?;
        }
        Ok(())
    }
}
