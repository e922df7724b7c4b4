use std::fmt::{Display, Formatter, Result};

use super::analysis::{ratio, FragmentationSummary};
use crate::structs::Superblock;

const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const KIB: u64 = 1024;

/// Human readable rendering of an analysis
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub path: &'a str,
    pub superblock: &'a Superblock,
    pub summary: &'a FragmentationSummary,
}

/// Scale a byte count to the largest 1024-based unit below it
pub fn scale(bytes: u64) -> (f64, &'static str) {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= KIB as f64 && unit < UNITS.len() - 1 {
        value /= KIB as f64;
        unit += 1;
    }
    (value, UNITS[unit])
}

/// Label for a power of two size bucket
fn bucket_label(limit: u64) -> String {
    if limit >= KIB * KIB {
        format!("{} MB", limit / (KIB * KIB))
    } else if limit >= KIB {
        format!("{} KB", limit / KIB)
    } else {
        format!("{limit} B")
    }
}

fn optional(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(value) => format!("{value:.precision$}"),
        None => "n/a".to_owned(),
    }
}

fn percent(value: Option<f64>) -> String {
    match value {
        Some(value) => format!("{value:.1}%"),
        None => "n/a".to_owned(),
    }
}

struct Space(u64);

impl Display for Space {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let (value, unit) = scale(self.0);
        write!(f, "{value:.2} {unit}")
    }
}

impl Report<'_> {
    /// Free KiB per free segment
    pub fn free_per_segment(&self) -> Option<f64> {
        let free = self.superblock.blocks_free * self.superblock.block_size / KIB;
        ratio(free, self.summary.total_free_segments)
    }

    /// Used KiB per allocated segment
    pub fn used_per_segment(&self) -> Option<f64> {
        let used = self.superblock.used_blocks() * self.superblock.block_size / KIB;
        ratio(used, self.summary.total_allocated_segments)
    }
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let superblock = self.superblock;
        let summary = self.summary;
        let block_size = superblock.block_size;

        writeln!(f, "============ Basic Filesystem Info ============")?;
        writeln!(f, "Filesystem:                {}", self.path)?;
        writeln!(f, "Filesystem size:           {}", Space(superblock.block_count * block_size))?;
        writeln!(f, "Allocated space:           {}", Space(superblock.used_blocks() * block_size))?;
        writeln!(f, "Free space available:      {}", Space(superblock.blocks_free * block_size))?;
        writeln!(f, "============ Advanced Filesystem Info ============")?;
        writeln!(f, "Total free segments:       {}", summary.total_free_segments)?;
        writeln!(f, "Total allocated segments:  {}", summary.total_allocated_segments)?;
        writeln!(f, "Free space per segment:    {} KB/segment", optional(self.free_per_segment(), 0))?;
        writeln!(f, "Allocated fragments:       {} KB/segment", optional(self.used_per_segment(), 0))?;
        writeln!(f, "Inode fragments:           {}", optional(summary.inode_fragment_average, 2))?;
        writeln!(
            f,
            "Inode fragments (in use):  {}",
            optional(summary.allocated_inode_fragment_average, 2)
        )?;
        writeln!(f, "============ Regular File Sizes ============")?;
        writeln!(f, "{:<10}|| {:>8} || {:>8}", "Length", "Files", "Smaller")?;
        for bucket in summary.size_histogram.buckets() {
            writeln!(
                f,
                "{:<10}|| {:>8} || {:>8}",
                bucket_label(bucket.limit),
                percent(bucket.percent),
                percent(bucket.cumulative_percent)
            )?;
        }
        write!(f, "Larger files: {}", summary.size_histogram.overflow())
    }
}
