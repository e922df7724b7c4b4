use std::fmt::Display;

use log::{info, warn};

use super::*;
use crate::{filesystem::Image, Error};

impl Superblock {
    /// Decode geometry from the primary superblock
    pub fn load(image: &mut Image) -> Result<Self, Error> {
        let raw: RawSuperblock = image.read_pod(SUPERBLOCK_OFFSET)?;
        let superblock = Self::try_from(raw)?;
        if superblock.magic != MAGIC_SIGNATURE {
            warn!(
                "Magic signature {:#06x} does not match {MAGIC_SIGNATURE:#06x}",
                superblock.magic
            );
        }
        info!(
            "Loaded superblock: {} blocks of {} bytes in {} groups",
            superblock.block_count,
            superblock.block_size,
            superblock.total_groups()
        );
        Ok(superblock)
    }

    pub fn total_groups(&self) -> u64 {
        self.block_count.div_ceil(self.blocks_per_group)
    }

    pub fn used_blocks(&self) -> u64 {
        self.block_count.saturating_sub(self.blocks_free)
    }

    /// Byte position of a block
    pub fn block_position(&self, index: u64) -> u64 {
        index * self.block_size
    }

    /// Count of data blocks covered by `sectors` 512-byte sectors
    pub fn sectors_to_blocks(&self, sectors: u32) -> u64 {
        sectors as u64 / (self.block_size / SECTOR_SIZE)
    }

    /// Count of block pointers held by one indirect block
    pub fn pointers_per_block(&self) -> usize {
        self.block_size as usize / BYTES_IN_POINTER
    }
}

impl TryFrom<RawSuperblock> for Superblock {
    type Error = Error;

    fn try_from(raw: RawSuperblock) -> Result<Self, Self::Error> {
        let log_block_size = u32::from_le(raw.log_block_size);
        let block_size = MINIMUM_BLOCK_SIZE
            .checked_shl(log_block_size)
            .filter(|size| *size <= u32::MAX as u64)
            .ok_or(Error::InvalidGeometry("block size exponent too large"))?;
        let blocks_per_group = u32::from_le(raw.blocks_per_group) as u64;
        if blocks_per_group == 0 {
            return Err(Error::InvalidGeometry("zero blocks per group"));
        }
        let inodes_per_group = u32::from_le(raw.inodes_per_group) as u64;
        if inodes_per_group == 0 {
            return Err(Error::InvalidGeometry("zero inodes per group"));
        }
        Ok(Self {
            inode_count: u32::from_le(raw.inodes_count) as u64,
            inodes_free: u32::from_le(raw.free_inodes_count) as u64,
            block_count: u32::from_le(raw.blocks_count) as u64,
            blocks_free: u32::from_le(raw.free_blocks_count) as u64,
            first_data_block: u32::from_le(raw.first_data_block) as u64,
            log_block_size,
            block_size,
            blocks_per_group,
            inodes_per_group,
            magic: u16::from_le(raw.magic),
        })
    }
}

impl Display for Superblock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "inodes:           {} ({} free)", self.inode_count, self.inodes_free)?;
        writeln!(f, "blocks:           {} ({} free)", self.block_count, self.blocks_free)?;
        writeln!(f, "first data block: {}", self.first_data_block)?;
        writeln!(f, "block size:       {}", self.block_size)?;
        writeln!(f, "blocks per group: {}", self.blocks_per_group)?;
        writeln!(f, "inodes per group: {}", self.inodes_per_group)?;
        writeln!(f, "groups:           {}", self.total_groups())?;
        write!(f, "magic:            {:#06x}", self.magic)
    }
}
