pub const USAGE: &str = "usage: e2frag <image> [--min-segment-2]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Path to the filesystem image
    pub image: String,
    /// Free segments must span at least two blocks to be counted
    pub discard_single_block_segments: bool,
}

impl Config {
    /// Parse command-line arguments, program name excluded
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Option<Self> {
        let mut config = Self::default();
        let mut image = None;
        for arg in args {
            if arg == "--min-segment-2" {
                config.discard_single_block_segments = true;
            } else if arg.starts_with("--") || image.is_some() {
                return None;
            } else {
                image = Some(arg);
            }
        }
        config.image = image?;
        Some(config)
    }
}
