use log::trace;

use crate::filesystem::Image;
use crate::structs::{Block, Inode, Superblock, POINTERS_IN_INODE};
use crate::Error;

/// Indirection depth of each pointer slot in an inode:
/// 12 direct, then single, double and triple indirect
const POINTER_DEPTHS: [u8; POINTERS_IN_INODE] = [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];

/// Blocks collected for one inode, capped by its sector count
#[derive(Debug)]
struct BlockChain {
    blocks: Vec<u64>,
    limit: u64,
}

impl BlockChain {
    fn is_full(&self) -> bool {
        self.blocks.len() as u64 >= self.limit
    }

    /// Append `pointer` and, below depth 0, every block its indirect block references
    fn walk(
        &mut self,
        image: &mut Image,
        superblock: &Superblock,
        pointer: u32,
        depth: u8,
    ) -> Result<(), Error> {
        if pointer == 0 || self.is_full() {
            return Ok(());
        }
        self.blocks.push(pointer as u64);
        if depth == 0 {
            return Ok(());
        }
        let block = Block::load(image, superblock, pointer as u64)?;
        for entry in block.pointers() {
            if self.is_full() {
                break;
            }
            self.walk(image, superblock, entry, depth - 1)?;
        }
        Ok(())
    }
}

/// Ordered list of blocks owned by `inode`, indirect blocks included
pub fn resolve(image: &mut Image, superblock: &Superblock, inode: &Inode) -> Result<Vec<u64>, Error> {
    let mut chain = BlockChain {
        blocks: Vec::new(),
        limit: superblock.sectors_to_blocks(inode.sectors),
    };
    for (&pointer, &depth) in inode.pointers.iter().zip(POINTER_DEPTHS.iter()) {
        if chain.is_full() {
            break;
        }
        chain.walk(image, superblock, pointer, depth)?;
    }
    trace!("Inode {} owns {} blocks", inode.index, chain.blocks.len());
    Ok(chain.blocks)
}
