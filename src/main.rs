//Enable more cargo lint tests
#![warn(rust_2018_idioms)]
#![warn(clippy::disallowed_types)]
mod cli;

use std::fs;
use std::io;
use std::time::Instant;

use blocksort::{block_info, Config, Workspace};
use clap::Parser;
use log::{error, info, LevelFilter};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use crate::cli::Args;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> io::Result<()> {
    let args = Args::parse();

    // Available log levels are Error, Warn, Info, Debug, Trace
    TermLogger::init(
        LevelFilter::from(args.verbosity()),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let start = Instant::now();
    let config = args.config();
    let input = fs::read(&args.input)?;

    //----- Figure how what we need to do and go do it
    let result = if args.decompress {
        decompress_file(&input, &config)
    } else {
        compress_file(&input, &config)
    };
    let output = match result {
        Ok(output) => output,
        Err(e) => {
            error!("{}: {}", args.input, e);
            return Err(e);
        }
    };

    let fname = args.output_path();
    fs::write(&fname, &output)?;
    info!(
        "{} bytes -> {} bytes in {:.2?}, written to {}",
        input.len(),
        output.len(),
        start.elapsed(),
        fname
    );
    Ok(())
}

/// Split the data into blocks and write them one after the other.
fn compress_file(data: &[u8], config: &Config) -> io::Result<Vec<u8>> {
    let mut ws = Workspace::new();
    let mut out = Vec::with_capacity(data.len() / 2);
    for (seq, block) in data.chunks(config.max_block_size).enumerate() {
        let encoded = ws.compress(block, config)?;
        info!(
            "Block {}: {} bytes -> {} bytes",
            seq + 1,
            block.len(),
            encoded.len()
        );
        out.extend_from_slice(&encoded);
    }
    Ok(out)
}

/// Walk the concatenated blocks using the size in each header.
fn decompress_file(mut data: &[u8], config: &Config) -> io::Result<Vec<u8>> {
    let mut ws = Workspace::new();
    let mut out = Vec::new();
    let mut seq = 0;
    while !data.is_empty() {
        seq += 1;
        let info = block_info(data)?;
        if info.encoded_size > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("block {} is truncated", seq),
            ));
        }
        let (block, rest) = data.split_at(info.encoded_size);
        out.extend_from_slice(&ws.decompress(block, config)?);
        info!("Block {}: {} bytes restored", seq, info.original_size);
        data = rest;
    }
    Ok(out)
}
