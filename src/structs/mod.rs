mod bitmap;
mod block;
mod group;
mod inode;
mod superblock;

use std::marker::PhantomData;

use bytemuck::{Pod, Zeroable};

pub use group::*;

/// Byte offset of the primary superblock
pub const SUPERBLOCK_OFFSET: u64 = 1024;
pub const MAGIC_SIGNATURE: u16 = 0xEF53;
pub const MINIMUM_BLOCK_SIZE: u64 = 1024;
pub const SECTOR_SIZE: u64 = 512;
pub const INODE_RECORD_SIZE: u64 = 128;
pub const POINTERS_IN_INODE: usize = 15;
pub const BYTES_IN_POINTER: usize = 4;
pub const REGULAR_FILE_MODE: u16 = 0x8000;

pub trait AsBitmap {}

/// Leading part of the on-disk superblock, little-endian
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RawSuperblock {
    pub(crate) inodes_count: u32,
    pub(crate) blocks_count: u32,
    pub(crate) r_blocks_count: u32,
    pub(crate) free_blocks_count: u32,
    pub(crate) free_inodes_count: u32,
    pub(crate) first_data_block: u32,
    pub(crate) log_block_size: u32,
    pub(crate) log_frag_size: u32,
    pub(crate) blocks_per_group: u32,
    pub(crate) frags_per_group: u32,
    pub(crate) inodes_per_group: u32,
    pub(crate) mtime: u32,
    pub(crate) wtime: u32,
    pub(crate) mnt_count: u16,
    pub(crate) max_mnt_count: u16,
    pub(crate) magic: u16,
    pub(crate) state: u16,
}

/// Filesystem geometry decoded from the superblock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    /// Total count of inodes in the filesystem
    pub(crate) inode_count: u64,
    /// Count of free inodes in the filesystem
    pub(crate) inodes_free: u64,
    /// Total count of blocks in the filesystem
    pub(crate) block_count: u64,
    /// Count of free blocks in the filesystem
    pub(crate) blocks_free: u64,
    /// First block holding filesystem data (1 on 1 KiB filesystems)
    pub(crate) first_data_block: u64,
    /// Block size exponent, `block_size = 1024 << log_block_size`
    pub(crate) log_block_size: u32,
    /// Block size in bytes
    pub(crate) block_size: u64,
    pub(crate) blocks_per_group: u64,
    pub(crate) inodes_per_group: u64,
    /// Magic signature
    pub(crate) magic: u16,
}

/// Block group descriptor as stored after a superblock copy
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RawGroupDescriptor {
    pub(crate) block_bitmap: u32,
    pub(crate) inode_bitmap: u32,
    pub(crate) inode_table: u32,
    pub(crate) free_blocks_count: u16,
    pub(crate) free_inodes_count: u16,
    pub(crate) used_dirs_count: u16,
    #[doc(hidden)]
    pub(crate) __padding_1: u16,
    #[doc(hidden)]
    pub(crate) __reserved: [u32; 3],
}

/// Byte offsets of one group's metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupLocation {
    /// Group's index
    pub(crate) index: u64,
    /// Global number of the group's first block
    pub(crate) first_block: u64,
    /// Global (1-based) number of the group's first inode
    pub(crate) first_inode: u64,
    /// Group carries a superblock and descriptor copy
    pub(crate) has_descriptor: bool,
    pub(crate) block_bitmap: u64,
    pub(crate) inode_bitmap: u64,
    pub(crate) inode_table: u64,
}

/// Inode record as laid out on disk
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
#[repr(C)]
pub struct RawInode {
    pub(crate) mode: u16,
    pub(crate) uid: u16,
    pub(crate) size: i32,
    pub(crate) atime: u32,
    pub(crate) ctime: u32,
    pub(crate) mtime: u32,
    pub(crate) dtime: u32,
    pub(crate) gid: u16,
    pub(crate) links_count: u16,
    pub(crate) blocks: u32,
    pub(crate) flags: u32,
    pub(crate) osd1: u32,
    pub(crate) block: [u32; POINTERS_IN_INODE],
    pub(crate) generation: u32,
    pub(crate) file_acl: u32,
    pub(crate) dir_acl: u32,
    pub(crate) faddr: u32,
    #[doc(hidden)]
    pub(crate) __osd2: [u8; 12],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    /// Inode's global number, starting from 1
    pub(crate) index: u64,
    /// File type and permissions
    pub(crate) mode: u16,
    /// Low 32 bits of the file size
    pub(crate) size: i32,
    /// Count of 512-byte sectors allocated to the inode
    pub(crate) sectors: u32,
    /// 12 direct, single, double and triple indirect pointers
    pub(crate) pointers: [u32; POINTERS_IN_INODE],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Block's index
    pub(crate) index: u64,
    /// Raw data as bytes, shorter than a block at the end of the image
    pub(crate) data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap<T: AsBitmap> {
    /// Occupancy of each unit, bit 0 first
    pub bitfield: Vec<bool>,
    /// Byte offset the bitmap was decoded from
    pub position: u64,
    #[doc(hidden)]
    __type: PhantomData<T>,
}
