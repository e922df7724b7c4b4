use log::info;

use crate::structs::*;
use crate::Error;

mod analysis;
mod histogram;
mod image;
mod report;
mod resolver;
pub(crate) mod segment;
#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{FragmentationSummary, ScanAccumulator};
pub use histogram::{HistogramBucket, SizeHistogram};
pub use image::{BlockDevice, Image};
pub use report::Report;
pub use segment::Segment;

/// Read-only view of an ext2 image and its decoded geometry
#[derive(Debug)]
pub struct Filesystem {
    pub(crate) superblock: Superblock,
    pub(crate) image: Image,
}

impl Filesystem {
    /// Load filesystem geometry from an image
    pub fn load(image: Image) -> Result<Self, Error> {
        let mut image = image;
        let superblock = Superblock::load(&mut image)?;
        Ok(Self { superblock, image })
    }

    pub fn open(path: &str) -> Result<Self, Error> {
        info!("Opening {path}");
        Self::load(Image::open(path)?)
    }

    pub fn superblock(&self) -> &Superblock {
        &self.superblock
    }

    pub fn locate_group(&mut self, index: u64) -> Result<GroupLocation, Error> {
        if index >= self.superblock.total_groups() {
            return Err(Error::OutOfBounds);
        }
        GroupLocation::locate(&mut self.image, &self.superblock, index)
    }

    pub fn load_bitmaps(&mut self, index: u64) -> Result<(Bitmap<Block>, Bitmap<Inode>), Error> {
        let group = self.locate_group(index)?;
        Ok((
            Bitmap::<Block>::load_group(&mut self.image, &self.superblock, &group)?,
            Bitmap::<Inode>::load_group(&mut self.image, &self.superblock, &group)?,
        ))
    }

    /// Load inode by its global number
    pub fn load_inode(&mut self, index: u64) -> Result<Inode, Error> {
        Inode::load_global(&mut self.image, &self.superblock, index)
    }

    /// Blocks owned by an inode, following indirect pointers
    pub fn resolve_blocks(&mut self, inode: &Inode) -> Result<Vec<u64>, Error> {
        resolver::resolve(&mut self.image, &self.superblock, inode)
    }
}
