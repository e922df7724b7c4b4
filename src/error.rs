use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    OutOfBounds,
    ShortRead { offset: u64, length: u64 },
    InvalidGeometry(&'static str),
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfBounds => write!(f, "out of bounds"),
            Self::ShortRead { offset, length } => {
                write!(f, "image too short: failed to read {length} bytes at offset {offset}")
            }
            Self::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
            Self::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
