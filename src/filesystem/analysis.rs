use std::collections::HashSet;

use log::{debug, info};

use super::histogram::SizeHistogram;
use super::segment::{self, Segment};
use super::Filesystem;
use crate::config::Config;
use crate::structs::{Bitmap, Block, GroupLocation, Inode, Superblock};
use crate::Error;

/// Raw data gathered while scanning groups, before any inode is segmented
#[derive(Debug, Default)]
pub struct ScanAccumulator {
    /// Global numbers of every free block
    pub(crate) free_blocks: HashSet<u64>,
    pub(crate) free_segments: u64,
    /// Blocks owned by each allocated inode, keyed by inode number
    pub(crate) inode_blocks: Vec<(u64, Vec<u64>)>,
    pub(crate) sizes: SizeHistogram,
    pub(crate) allocated_inodes: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentationSummary {
    pub total_free_segments: u64,
    pub total_allocated_segments: u64,
    /// Free blocks found in the block bitmaps
    pub free_blocks: u64,
    pub allocated_inodes: u64,
    /// Allocated segments per inode declared by the superblock
    pub inode_fragment_average: Option<f64>,
    /// Allocated segments per inode marked in the inode bitmaps
    pub allocated_inode_fragment_average: Option<f64>,
    pub size_histogram: SizeHistogram,
}

impl ScanAccumulator {
    /// Account a group's free blocks and their segments
    pub fn record_free(&mut self, bitmap: &Bitmap<Block>, group: &GroupLocation, config: &Config) {
        let free: Vec<u64> = bitmap.free_blocks(group).collect();
        let segments = segment::extract(free.iter().copied());
        let counted = segment::count(&segments, config.discard_single_block_segments);
        debug!(
            "Group {}: {} free blocks in {counted} segments",
            group.index,
            free.len()
        );
        self.free_segments += counted;
        self.free_blocks.extend(free);
    }

    /// Account an allocated inode and the blocks its pointers reference
    pub fn record_inode(&mut self, inode: &Inode, blocks: Vec<u64>) {
        self.allocated_inodes += 1;
        if inode.is_regular_file() {
            self.sizes.record(inode.size);
        }
        if !blocks.is_empty() {
            self.inode_blocks.push((inode.index, blocks));
        }
    }

    pub fn merge(&mut self, other: Self) {
        self.free_blocks.extend(other.free_blocks);
        self.free_segments += other.free_segments;
        self.inode_blocks.extend(other.inode_blocks);
        self.sizes.merge(&other.sizes);
        self.allocated_inodes += other.allocated_inodes;
    }

    /// Segments of one inode's blocks, leaving out blocks marked free anywhere
    pub fn inode_segments(&self, blocks: &[u64]) -> Vec<Segment> {
        segment::extract(
            blocks
                .iter()
                .copied()
                .filter(|block| !self.free_blocks.contains(block)),
        )
    }

    /// Second phase: segment every inode against the complete free set
    pub fn summarize(self, superblock: &Superblock) -> FragmentationSummary {
        let total_allocated_segments: u64 = self
            .inode_blocks
            .iter()
            .map(|(_, blocks)| self.inode_segments(blocks).len() as u64)
            .sum();
        FragmentationSummary {
            total_free_segments: self.free_segments,
            total_allocated_segments,
            free_blocks: self.free_blocks.len() as u64,
            allocated_inodes: self.allocated_inodes,
            inode_fragment_average: ratio(total_allocated_segments, superblock.inode_count),
            allocated_inode_fragment_average: ratio(
                total_allocated_segments,
                self.allocated_inodes,
            ),
            size_histogram: self.sizes,
        }
    }
}

pub(crate) fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    (denominator != 0).then(|| numerator as f64 / denominator as f64)
}

impl Filesystem {
    /// Scan all groups, then segment free space and every inode's blocks
    pub fn analyze(&mut self, config: &Config) -> Result<FragmentationSummary, Error> {
        let groups = self.superblock.total_groups();
        info!("Scanning {groups} groups");
        let mut scan = ScanAccumulator::default();
        for index in 0..groups {
            scan.merge(self.scan_group(index, config)?);
        }
        info!(
            "Scan complete: {} free blocks, {} allocated inodes",
            scan.free_blocks.len(),
            scan.allocated_inodes
        );
        Ok(scan.summarize(&self.superblock))
    }

    /// First phase for one group
    pub fn scan_group(&mut self, index: u64, config: &Config) -> Result<ScanAccumulator, Error> {
        let group = self.locate_group(index)?;
        let blocks = Bitmap::<Block>::load_group(&mut self.image, &self.superblock, &group)?;
        let inodes = Bitmap::<Inode>::load_group(&mut self.image, &self.superblock, &group)?;

        let mut scan = ScanAccumulator::default();
        scan.record_free(&blocks, &group, config);
        for local in inodes.used() {
            let inode = Inode::load(&mut self.image, &group, local)?;
            let owned = self.resolve_blocks(&inode)?;
            scan.record_inode(&inode, owned);
        }
        debug!("Group {index}: {} allocated inodes", scan.allocated_inodes);
        Ok(scan)
    }
}

#[cfg(test)]
mod tests {
    use super::ScanAccumulator;
    use crate::config::Config;
    use crate::filesystem::testing::ImageBuilder;
    use crate::filesystem::Filesystem;
    use crate::structs::{Bitmap, Block, GroupLocation, Inode, Superblock};

    const REGULAR: u16 = 0o100644;
    const DIRECTORY: u16 = 0o40755;

    fn superblock(inode_count: u64) -> Superblock {
        Superblock {
            inode_count,
            inodes_free: 0,
            block_count: 8192,
            blocks_free: 0,
            first_data_block: 0,
            log_block_size: 0,
            block_size: 1024,
            blocks_per_group: 8192,
            inodes_per_group: 16,
            magic: 0,
        }
    }

    fn group(index: u64, first_block: u64) -> GroupLocation {
        GroupLocation {
            index,
            first_block,
            first_inode: index * 16 + 1,
            has_descriptor: true,
            block_bitmap: 0,
            inode_bitmap: 0,
            inode_table: 0,
        }
    }

    fn inode(index: u64, mode: u16, size: i32) -> Inode {
        Inode {
            index,
            mode,
            size,
            sectors: 0,
            pointers: [0; 15],
        }
    }

    #[test]
    fn empty_group_is_one_free_segment() {
        let superblock = superblock(16);
        assert_eq!(superblock.total_groups(), 1);
        let bitmap = Bitmap::<Block>::decode(&[0u8; 1024], superblock.blocks_per_group, 0);
        let mut scan = ScanAccumulator::default();
        scan.record_free(&bitmap, &group(0, 0), &Config::default());
        assert_eq!(scan.free_segments, 1);
        assert_eq!(scan.free_blocks.len(), 8192);
        let free: Vec<u64> = bitmap.free_blocks(&group(0, 0)).collect();
        let segments = crate::filesystem::segment::extract(free);
        assert_eq!(segments.len(), 1);
        assert_eq!((segments[0].start, segments[0].end), (0, 8191));
    }

    #[test]
    fn free_blocks_use_global_numbers() {
        let bitmap = Bitmap::<Block>::decode(&[0b1111_0110], 8, 0);
        let mut scan = ScanAccumulator::default();
        scan.record_free(&bitmap, &group(2, 16), &Config::default());
        let mut free: Vec<u64> = scan.free_blocks.iter().copied().collect();
        free.sort_unstable();
        assert_eq!(free, vec![16, 19]);
        assert_eq!(scan.free_segments, 2);

        let mut strict = ScanAccumulator::default();
        let config = Config {
            discard_single_block_segments: true,
            ..Config::default()
        };
        strict.record_free(&bitmap, &group(2, 16), &config);
        assert_eq!(strict.free_segments, 0);
    }

    #[test]
    fn disjoint_inodes_one_segment_each() {
        let mut scan = ScanAccumulator::default();
        scan.record_inode(&inode(1, REGULAR, 3072), vec![10, 11, 12]);
        scan.record_inode(&inode(2, REGULAR, 2048), vec![20, 21]);
        let summary = scan.summarize(&superblock(16));
        assert_eq!(summary.total_allocated_segments, 2);
        assert_eq!(summary.allocated_inodes, 2);
        assert_eq!(summary.inode_fragment_average, Some(2.0 / 16.0));
        assert_eq!(summary.allocated_inode_fragment_average, Some(1.0));
        assert_eq!(summary.size_histogram.total(), 2);
    }

    #[test]
    fn blocks_freed_in_later_group_are_removed() {
        let mut first = ScanAccumulator::default();
        first.record_inode(&inode(1, REGULAR, 0), vec![10, 11, 12, 13, 14]);
        first.record_inode(&inode(2, DIRECTORY, 0), vec![8200]);

        let mut second = ScanAccumulator::default();
        let bitmap = Bitmap::<Block>::decode(&[0b1111_1101], 8, 0);
        second.record_free(&bitmap, &group(1, 8199), &Config::default());
        second.free_blocks.insert(12);

        let mut scan = ScanAccumulator::default();
        scan.merge(first);
        scan.merge(second);
        assert_eq!(scan.inode_segments(&[10, 11, 12, 13, 14]).len(), 2);
        let summary = scan.summarize(&superblock(16));
        assert_eq!(summary.total_allocated_segments, 2);
        assert_eq!(summary.size_histogram.total(), 1);
    }

    #[test]
    fn averages_guard_zero_denominators() {
        let summary = ScanAccumulator::default().summarize(&superblock(0));
        assert_eq!(summary.total_allocated_segments, 0);
        assert_eq!(summary.inode_fragment_average, None);
        assert_eq!(summary.allocated_inode_fragment_average, None);
    }

    fn sample_image() -> ImageBuilder {
        ImageBuilder::new(4096, 64)
            .superblock(16, 64, 51, 64, 16)
            .descriptor(1, 2, 3, 4)
            .bitmap(2, &[0, 1, 2, 3, 4, 5, 10, 11, 12, 20, 21, 30, 32])
            .bitmap(3, &[0, 1, 2, 3])
            .inode(4, 0, REGULAR, 12288, 24, &[10, 11, 12])
            .inode(4, 1, REGULAR, 5000, 16, &[20, 21])
            .inode(4, 2, REGULAR, 100, 16, &[30, 40])
            .inode(4, 3, DIRECTORY, 4096, 8, &[5])
    }

    #[test]
    fn analyze_whole_image() {
        let mut fs = Filesystem::load(sample_image().build()).unwrap();
        let summary = fs.analyze(&Config::default()).unwrap();
        assert_eq!(summary.free_blocks, 51);
        assert_eq!(summary.total_free_segments, 5);
        assert_eq!(summary.allocated_inodes, 4);
        assert_eq!(summary.total_allocated_segments, 4);
        assert_eq!(summary.inode_fragment_average, Some(0.25));
        assert_eq!(summary.allocated_inode_fragment_average, Some(1.0));

        let histogram = &summary.size_histogram;
        assert_eq!(histogram.total(), 3);
        let counted: Vec<(u64, u64)> = histogram
            .buckets()
            .iter()
            .filter(|bucket| bucket.count > 0)
            .map(|bucket| (bucket.limit, bucket.count))
            .collect();
        assert_eq!(counted, vec![(128, 1), (8192, 1), (16384, 1)]);
    }

    #[test]
    fn analyze_without_single_block_segments() {
        let mut fs = Filesystem::load(sample_image().build()).unwrap();
        let config = Config {
            discard_single_block_segments: true,
            ..Config::default()
        };
        let summary = fs.analyze(&config).unwrap();
        assert_eq!(summary.total_free_segments, 4);
        assert_eq!(summary.total_allocated_segments, 4);
    }

    #[test]
    fn fragmented_file_counts_every_run() {
        let image = ImageBuilder::new(4096, 64)
            .superblock(16, 64, 0, 64, 16)
            .descriptor(1, 2, 3, 4)
            .bitmap(2, &(0..64u64).collect::<Vec<u64>>())
            .bitmap(3, &[0])
            .inode(4, 0, REGULAR, 20000, 40, &[10, 12, 13, 20, 30]);
        let mut fs = Filesystem::load(image.build()).unwrap();
        let summary = fs.analyze(&Config::default()).unwrap();
        assert_eq!(summary.total_free_segments, 0);
        assert_eq!(summary.total_allocated_segments, 4);
    }
}
