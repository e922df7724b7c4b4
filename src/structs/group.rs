use std::fmt::Display;

use log::debug;

use super::*;
use crate::{filesystem::Image, Error};

/// Relative block of the block bitmap in groups without a descriptor copy
const DEFAULT_BLOCK_BITMAP: u64 = 0;
const DEFAULT_INODE_BITMAP: u64 = 1;
const DEFAULT_INODE_TABLE: u64 = 2;

/// Groups 0 and 1 and every power of 3, 5 or 7 carry a superblock copy
pub fn has_superblock_copy(index: u64) -> bool {
    index <= 1 || [3, 5, 7].iter().any(|&base| is_power_of(index, base))
}

fn is_power_of(mut value: u64, base: u64) -> bool {
    while value % base == 0 {
        value /= base;
    }
    value == 1
}

impl GroupLocation {
    /// Locate bitmaps and inode table of group `index`
    pub fn locate(image: &mut Image, superblock: &Superblock, index: u64) -> Result<Self, Error> {
        let first_block = index * superblock.blocks_per_group;
        let has_descriptor = has_superblock_copy(index);
        let (block_bitmap, inode_bitmap, inode_table) = if has_descriptor {
            let position = superblock.block_position(first_block + 1);
            let raw: RawGroupDescriptor = image.read_pod(position)?;
            (
                u32::from_le(raw.block_bitmap) as u64,
                u32::from_le(raw.inode_bitmap) as u64,
                u32::from_le(raw.inode_table) as u64,
            )
        } else {
            (DEFAULT_BLOCK_BITMAP, DEFAULT_INODE_BITMAP, DEFAULT_INODE_TABLE)
        };
        let location = Self {
            index,
            first_block,
            first_inode: index * superblock.inodes_per_group + 1,
            has_descriptor,
            block_bitmap: superblock.block_position(first_block + block_bitmap),
            inode_bitmap: superblock.block_position(first_block + inode_bitmap),
            inode_table: superblock.block_position(first_block + inode_table),
        };
        debug!(
            "Group {index}: block bitmap at {}, inode bitmap at {}, inode table at {}",
            location.block_bitmap, location.inode_bitmap, location.inode_table
        );
        Ok(location)
    }

    /// Byte position of the record for group-local inode `local`
    pub fn inode_position(&self, local: u64) -> u64 {
        self.inode_table + local * INODE_RECORD_SIZE
    }
}

impl Display for GroupLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "group:        {}", self.index)?;
        writeln!(f, "first block:  {}", self.first_block)?;
        writeln!(f, "first inode:  {}", self.first_inode)?;
        writeln!(f, "descriptor:   {}", self.has_descriptor)?;
        writeln!(f, "block bitmap: {:#x}", self.block_bitmap)?;
        writeln!(f, "inode bitmap: {:#x}", self.inode_bitmap)?;
        write!(f, "inode table:  {:#x}", self.inode_table)
    }
}
