use std::fmt::Display;

use super::*;
use crate::{filesystem::Image, Error};

impl AsBitmap for Inode {}

impl Inode {
    /// Load the record of group-local inode `local`
    pub fn load(image: &mut Image, group: &GroupLocation, local: u64) -> Result<Self, Error> {
        let raw: RawInode = image.read_pod(group.inode_position(local))?;
        Ok(Self::from_raw(group.first_inode + local, &raw))
    }

    /// Load inode by its global number
    pub fn load_global(
        image: &mut Image,
        superblock: &Superblock,
        index: u64,
    ) -> Result<Self, Error> {
        if index == 0 || index > superblock.inodes_per_group * superblock.total_groups() {
            return Err(Error::OutOfBounds);
        }
        let group = (index - 1) / superblock.inodes_per_group;
        let local = (index - 1) % superblock.inodes_per_group;
        let location = GroupLocation::locate(image, superblock, group)?;
        Self::load(image, &location, local)
    }

    pub(crate) fn from_raw(index: u64, raw: &RawInode) -> Self {
        Self {
            index,
            mode: u16::from_le(raw.mode),
            size: i32::from_le(raw.size),
            sectors: u32::from_le(raw.blocks),
            pointers: raw.block.map(u32::from_le),
        }
    }

    pub fn is_regular_file(&self) -> bool {
        self.mode & REGULAR_FILE_MODE == REGULAR_FILE_MODE
    }
}

impl Display for Inode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "inode:    {}", self.index)?;
        writeln!(f, "mode:     {:#o}", self.mode)?;
        writeln!(f, "regular:  {}", self.is_regular_file())?;
        writeln!(f, "size:     {}", self.size)?;
        writeln!(f, "sectors:  {}", self.sectors)?;
        write!(f, "pointers: {:?}", self.pointers)
    }
}

#[cfg(test)]
mod tests {
    use crate::filesystem::testing::ImageBuilder;
    use crate::structs::{GroupLocation, Inode, Superblock};
    use crate::Error;

    #[test]
    fn decode_record_fields() {
        let mut pointers = [0u32; 15];
        pointers[0] = 10;
        pointers[12] = 40;
        pointers[14] = 0xdead_beef;
        let mut image = ImageBuilder::new(4096, 16)
            .superblock(8, 16, 0, 16, 8)
            .descriptor(1, 2, 3, 4)
            .inode(4, 2, 0o100644, -5, 16, &pointers)
            .build();
        let superblock = Superblock::load(&mut image).unwrap();
        let group = GroupLocation::locate(&mut image, &superblock, 0).unwrap();
        let inode = Inode::load(&mut image, &group, 2).unwrap();
        assert_eq!(inode.index, 3);
        assert_eq!(inode.mode, 0o100644);
        assert!(inode.is_regular_file());
        assert_eq!(inode.size, -5);
        assert_eq!(inode.sectors, 16);
        assert_eq!(inode.pointers, pointers);
        assert_eq!(Inode::load_global(&mut image, &superblock, 3).unwrap(), inode);
    }

    #[test]
    fn directories_are_not_regular() {
        let mut image = ImageBuilder::new(4096, 16)
            .superblock(8, 16, 0, 16, 8)
            .descriptor(1, 2, 3, 4)
            .inode(4, 0, 0o40755, 4096, 8, &[0; 15])
            .build();
        let superblock = Superblock::load(&mut image).unwrap();
        let inode = Inode::load_global(&mut image, &superblock, 1).unwrap();
        assert!(!inode.is_regular_file());
        assert!(matches!(
            Inode::load_global(&mut image, &superblock, 0),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            Inode::load_global(&mut image, &superblock, 9),
            Err(Error::OutOfBounds)
        ));
    }
}
