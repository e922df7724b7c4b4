#![allow(dead_code)]

use config::Config;
use error::Error;
use filesystem::{segment, Filesystem};

mod config;
mod error;
mod filesystem;
mod structs;

const HELP: &str = "s: superblock | g <group>: group location | b <group>: bitmaps | i <inode>: inode and blocks | a: analyze | q: quit";

fn prompt(separator: &str) -> Option<Vec<String>> {
    use std::io::Write;
    let mut line = String::new();
    print!("{separator}");
    std::io::stdout().flush().ok()?;
    match std::io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.split_whitespace().map(str::to_string).collect()),
        Err(_) => None,
    }
}

fn execute(fs: &mut Filesystem, cmd: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cmd.first() else {
        return Ok(());
    };
    let argument = |position: usize| -> Result<u64, Box<dyn std::error::Error>> {
        Ok(cmd.get(position).ok_or(Error::OutOfBounds)?.parse()?)
    };
    match command.as_str() {
        "s" => println!["{}", fs.superblock()],
        "g" => println!["{}", fs.locate_group(argument(1)?)?],
        "b" => {
            let (blocks, inodes) = fs.load_bitmaps(argument(1)?)?;
            println!["blocks\n{blocks}"];
            println!["inodes\n{inodes}"];
        }
        "i" => {
            let inode = fs.load_inode(argument(1)?)?;
            println!["{inode}"];
            let blocks = fs.resolve_blocks(&inode)?;
            println!["blocks:   {}", blocks.len()];
            for segment in segment::extract(blocks) {
                println!["  {segment}"];
            }
        }
        "a" => println!["{:#?}", fs.analyze(&Config::default())?],
        _ => println!["{HELP}"],
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let path = args.first().map(String::as_str).unwrap_or("/tmp/ext2.img");
    let mut fs = Filesystem::open(path)?;
    while let Some(cmd) = prompt(">> ") {
        if cmd.first().map(String::as_str) == Some("q") {
            break;
        }
        if let Err(e) = execute(&mut fs, &cmd) {
            eprintln!("{e}");
        }
    }
    Ok(())
}
