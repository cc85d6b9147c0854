use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(
    name = "img-shrink",
    about = "Pick an image, squeeze it at a chosen quality and save the compressed copy",
    long_about = "img-shrink re-encodes an image in its own format at a chosen quality, \
                  keeping the longer side at or under 1920 px and the output under 10 MB. \
                  It reports original and compressed sizes and the compression ratio, \
                  and saves the result as compressed_<name>.",
    version,
    after_help = "EXAMPLES:\n  \
    img-shrink compress photo.jpg -q 70 -o ./out\n  \
    img-shrink session photo.png\n  \
    echo -e 'quality 50\\ndownload\\nquit' | img-shrink session photo.png"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print pipeline details")]
    pub verbose: bool,

    #[arg(
        short = 'j',
        long,
        global = true,
        help = "Number of codec threads (default: auto)",
        long_help = "Number of threads the image codecs may use. \
                     If not specified, uses number of CPU cores."
    )]
    pub threads: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress one image and save it",
        long_about = "Load an image, compress it once at the given quality and save the result \
                      as compressed_<name> in the output directory."
    )]
    Compress {
        #[arg(help = "Input image file path")]
        input: PathBuf,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Directory for the compressed copy"
        )]
        output_dir: PathBuf,

        #[arg(
            short = 'q',
            long,
            help = "Compression quality (1-100, default: 80)",
            long_help = "Compression quality from 1 (lowest) to 100 (highest). \
                         For PNG: >=90 uses Zopfli, >=70 uses high compression, <70 uses standard compression."
        )]
        quality: Option<u8>,

        #[arg(
            short = 't',
            long,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Give up on compression after this many seconds (default: 30)"
        )]
        timeout: Option<u64>,
    },

    #[command(
        about = "Interactive session driven by commands on stdin",
        long_about = "Keep one image open and re-compress it as the quality changes. \
                      Commands: open <path>, quality <n> (or just <n>), download [dir], \
                      status, help, quit."
    )]
    Session {
        #[arg(help = "Image to open right away")]
        input: Option<PathBuf>,

        #[arg(
            short = 'o',
            long,
            default_value = ".",
            help = "Default directory for downloads"
        )]
        output_dir: PathBuf,

        #[arg(short = 'q', long, help = "Starting quality (1-100, default: 80)")]
        quality: Option<u8>,

        #[arg(
            short = 't',
            long,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "Give up on compression after this many seconds (default: 30)"
        )]
        timeout: Option<u64>,
    },
}

/// One line of input in an interactive session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Open(PathBuf),
    Quality(u8),
    Download(Option<PathBuf>),
    Status,
    Help,
    Quit,
    Empty,
}

pub const SESSION_HELP: &str = "Commands:\n  \
    open <path>      pick an image\n  \
    quality <1-100>  set quality (a bare number works too)\n  \
    download [dir]   save compressed_<name>\n  \
    status           show the current readouts\n  \
    help             show this text\n  \
    quit             leave the session";

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "" => Ok(SessionCommand::Empty),
            "open" | "o" => {
                if rest.is_empty() {
                    Err("open needs a file path".to_string())
                } else {
                    Ok(SessionCommand::Open(PathBuf::from(rest)))
                }
            }
            "quality" | "q" => parse_quality(rest),
            "download" | "d" => Ok(SessionCommand::Download(
                (!rest.is_empty()).then(|| PathBuf::from(rest)),
            )),
            "status" | "s" => Ok(SessionCommand::Status),
            "help" | "h" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" => Ok(SessionCommand::Quit),
            _ if rest.is_empty() && word.chars().all(|c| c.is_ascii_digit()) => parse_quality(word),
            _ => Err(format!("Unknown command: {} (try `help`)", word)),
        }
    }
}

fn parse_quality(value: &str) -> Result<SessionCommand, String> {
    value
        .parse::<u8>()
        .map(SessionCommand::Quality)
        .map_err(|_| format!("Invalid quality value: {}. Must be between 1 and 100", value))
}
