use std::fmt::Debug;
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use bytemuck::Pod;
use log::debug;

use crate::Error;

pub trait BlockDevice: Read + Seek + Debug {}

impl BlockDevice for std::fs::File {}

/// Read-only, byte-addressable view of a filesystem image
#[derive(Debug)]
pub struct Image {
    device: Box<dyn BlockDevice>,
    length: u64,
}

impl Image {
    pub fn new(device: Box<dyn BlockDevice>) -> Result<Self, Error> {
        let mut device = device;
        let length = device.seek(SeekFrom::End(0))?;
        debug!("Opened image of {length} bytes");
        Ok(Self { device, length })
    }

    pub fn open(path: &str) -> Result<Self, Error> {
        let file = std::fs::File::options().read(true).write(false).open(path)?;
        Self::new(Box::new(file))
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    /// Read exactly `length` bytes at `offset`
    pub fn read(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, Error> {
        let short = Error::ShortRead { offset, length };
        match offset.checked_add(length) {
            Some(end) if end <= self.length => {}
            _ => return Err(short),
        }
        self.device.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; length as usize];
        match self.device.read_exact(&mut buffer) {
            Ok(()) => Ok(buffer),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => Err(short),
            Err(e) => Err(e.into()),
        }
    }

    /// Read up to `length` bytes at `offset`, keeping only what lies inside the image
    pub fn read_clamped(&mut self, offset: u64, length: u64) -> Result<Vec<u8>, Error> {
        if offset >= self.length {
            return Ok(vec![]);
        }
        let available = length.min(self.length - offset);
        self.read(offset, available)
    }

    /// Decode a plain-old-data record at `offset`
    pub fn read_pod<T: Pod>(&mut self, offset: u64) -> Result<T, Error> {
        let raw = self.read(offset, std::mem::size_of::<T>() as u64)?;
        Ok(bytemuck::pod_read_unaligned(&raw))
    }

    pub fn read_u16(&mut self, offset: u64) -> Result<u16, Error> {
        Ok(u16::from_le(self.read_pod(offset)?))
    }

    pub fn read_u32(&mut self, offset: u64) -> Result<u32, Error> {
        Ok(u32::from_le(self.read_pod(offset)?))
    }

    pub fn read_i32(&mut self, offset: u64) -> Result<i32, Error> {
        Ok(i32::from_le(self.read_pod(offset)?))
    }
}
