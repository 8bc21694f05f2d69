use blocksort::{Config, LzpParams, Transform};
use clap::Parser;
use log::LevelFilter;

/// Verbosity of user information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Errors,
    Warnings,
    Info,
    Debug,
    Trace,
}

impl From<Verbosity> for LevelFilter {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Errors => LevelFilter::Error,
            Verbosity::Warnings => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
            Verbosity::Trace => LevelFilter::Trace,
        }
    }
}

/// File extension of compressed output
pub const EXTENSION: &str = ".bsrt";

/// Command Line Interpretation - uses external CLAP crate.
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "A block-sorting file compressor",
    long_about = "
    Compresses a file block by block: an optional LZP pre-filter, a Burrows Wheeler Transform
    sorted with SA-IS, move-to-front and zero-run coding, and an adaptive binary range coder.
    Each block is written with its own header and checksum, so blocks decode independently."
)]
pub struct Args {
    /// Filename of file to process
    #[clap()]
    pub input: String,

    /// Output filename. Defaults to the input name with .bsrt added (or removed with -d)
    #[clap()]
    pub output: Option<String>,

    /// Perform decompression on the input file
    #[clap(short = 'd', long = "decompress")]
    pub decompress: bool,

    /// Block size in MiB. Also the largest block accepted when decompressing
    #[clap(short = 'b', long = "block-size", default_value_t = 25)]
    pub block_size: usize,

    /// Do not run the LZP pre-filter
    #[clap(long = "no-lzp")]
    pub no_lzp: bool,

    /// LZP hash table size, as log2 of the slot count (10..=28)
    #[clap(short = 'H', long = "hash-bits", default_value_t = 16)]
    pub hash_bits: u8,

    /// Shortest LZP match (4..=255)
    #[clap(short = 'M', long = "min-match", default_value_t = 128)]
    pub min_len: u8,

    /// Sort on this many bytes of context (Sort Transform, 3..=8) instead of a full BWT
    #[clap(short = 's', long = "st")]
    pub st_depth: Option<u8>,

    /// Sets verbosity. -v0 is silent, -v1 shows errors only, -v5 is chatty
    #[clap(short = 'v', default_value_t = 1)]
    pub v: u8,
}

impl Args {
    pub fn verbosity(&self) -> Verbosity {
        match self.v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Errors,
            2 => Verbosity::Warnings,
            3 => Verbosity::Info,
            4 => Verbosity::Debug,
            _ => Verbosity::Trace,
        }
    }

    pub fn config(&self) -> Config {
        let transform = match self.st_depth {
            Some(depth) => Transform::St(depth),
            None => Transform::Bwt,
        };
        let config = Config::new()
            .with_max_block_size(self.block_size.saturating_mul(1 << 20))
            .with_transform(transform);
        if self.no_lzp {
            config.without_lzp()
        } else {
            config.with_lzp(LzpParams::new(self.hash_bits, self.min_len))
        }
    }

    /// Where the result goes.
    pub fn output_path(&self) -> String {
        if let Some(name) = &self.output {
            return name.clone();
        }
        if self.decompress {
            match self.input.strip_suffix(EXTENSION) {
                Some(stem) => stem.to_string(),
                None => format!("{}.out", self.input),
            }
        } else {
            format!("{}{}", self.input, EXTENSION)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_test() {
        let args = Args::parse_from(["blocksort", "notes.txt"]);
        assert_eq!(args.verbosity(), Verbosity::Errors);
        assert_eq!(args.output_path(), "notes.txt.bsrt");
        assert_eq!(args.config(), Config::new());
    }

    #[test]
    fn decompress_test() {
        let args = Args::parse_from(["blocksort", "-d", "-v4", "notes.txt.bsrt"]);
        assert_eq!(args.verbosity(), Verbosity::Debug);
        assert_eq!(args.output_path(), "notes.txt");
    }

    #[test]
    fn options_test() {
        let args = Args::parse_from(["blocksort", "-b", "4", "--no-lzp", "in", "out"]);
        assert_eq!(args.output_path(), "out");
        assert_eq!(args.config(), Config::new().with_max_block_size(4 << 20).without_lzp());
        let args = Args::parse_from(["blocksort", "-H", "20", "-M", "32", "-v0", "in"]);
        assert_eq!(args.config().lzp, Some(LzpParams::new(20, 32)));
        assert_eq!(LevelFilter::from(args.verbosity()), LevelFilter::Off);
    }

    #[test]
    fn sort_transform_test() {
        let args = Args::parse_from(["blocksort", "--st", "6", "in"]);
        assert_eq!(args.config().transform, Transform::St(6));
        let args = Args::parse_from(["blocksort", "-s4", "in"]);
        assert_eq!(args.config(), Config::new().with_transform(Transform::St(4)));
    }
}
