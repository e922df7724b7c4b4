use std::io::Cursor;

use super::Image;
use crate::structs::{INODE_RECORD_SIZE, MAGIC_SIGNATURE, SUPERBLOCK_OFFSET};

/// Assembles synthetic ext2 images in memory
#[derive(Debug, Clone)]
pub struct ImageBuilder {
    block_size: u64,
    data: Vec<u8>,
}

impl ImageBuilder {
    pub fn new(block_size: u64, blocks: u64) -> Self {
        Self {
            block_size,
            data: vec![0; (block_size * blocks) as usize],
        }
    }

    fn put(mut self, offset: u64, bytes: &[u8]) -> Self {
        let offset = offset as usize;
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    fn put_u16(self, offset: u64, value: u16) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    fn put_u32(self, offset: u64, value: u32) -> Self {
        self.put(offset, &value.to_le_bytes())
    }

    pub fn superblock(
        self,
        inodes: u32,
        blocks: u32,
        free_blocks: u32,
        blocks_per_group: u32,
        inodes_per_group: u32,
    ) -> Self {
        let log_block_size = (self.block_size / 1024).trailing_zeros();
        self.put_u32(SUPERBLOCK_OFFSET, inodes)
            .put_u32(SUPERBLOCK_OFFSET + 4, blocks)
            .put_u32(SUPERBLOCK_OFFSET + 12, free_blocks)
            .put_u32(SUPERBLOCK_OFFSET + 24, log_block_size)
            .put_u32(SUPERBLOCK_OFFSET + 32, blocks_per_group)
            .put_u32(SUPERBLOCK_OFFSET + 40, inodes_per_group)
            .put_u16(SUPERBLOCK_OFFSET + 56, MAGIC_SIGNATURE)
    }

    /// Group descriptor stored at `block`, offsets relative to its group
    pub fn descriptor(self, block: u64, block_bitmap: u32, inode_bitmap: u32, inode_table: u32) -> Self {
        let position = block * self.block_size;
        self.put_u32(position, block_bitmap)
            .put_u32(position + 4, inode_bitmap)
            .put_u32(position + 8, inode_table)
    }

    /// Bitmap stored at `block` with the given bits set
    pub fn bitmap(mut self, block: u64, used: &[u64]) -> Self {
        let position = (block * self.block_size) as usize;
        for &index in used {
            self.data[position + (index / 8) as usize] |= 1 << (index % 8);
        }
        self
    }

    /// Block pointers stored at the start of `block`
    pub fn pointers(self, block: u64, pointers: &[u32]) -> Self {
        let position = block * self.block_size;
        self.pointers_at(position, pointers)
    }

    /// Inode record `local` of the table starting at `table_block`
    pub fn inode(
        self,
        table_block: u64,
        local: u64,
        mode: u16,
        size: i32,
        sectors: u32,
        pointers: &[u32],
    ) -> Self {
        let position = table_block * self.block_size + local * INODE_RECORD_SIZE;
        self.put_u16(position, mode)
            .put(position + 4, &size.to_le_bytes())
            .put_u32(position + 28, sectors)
            .pointers_at(position + 40, pointers)
    }

    fn pointers_at(self, position: u64, pointers: &[u32]) -> Self {
        pointers
            .iter()
            .enumerate()
            .fold(self, |builder, (slot, &pointer)| {
                builder.put_u32(position + slot as u64 * 4, pointer)
            })
    }

    pub fn build(self) -> Image {
        Image::new(Box::new(Cursor::new(self.data))).expect("in-memory image")
    }
}
