#![allow(dead_code)]

use config::Config;
use error::Error;
use filesystem::{Filesystem, Report};

mod config;
mod error;
mod filesystem;
mod structs;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let Some(config) = Config::from_args(std::env::args().skip(1)) else {
        eprintln!("{}", config::USAGE);
        std::process::exit(2);
    };
    let mut fs = Filesystem::open(&config.image)?;
    let summary = fs.analyze(&config)?;
    let report = Report {
        path: &config.image,
        superblock: fs.superblock(),
        summary: &summary,
    };
    println!("{report}");
    Ok(())
}
