use clap::{Parser, Subcommand};
use hufftext::{compress_file, decompress_file, FileOptions};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compress a text file into <name>.bin next to it
    Compress {
        /// Path of the input file
        path: PathBuf,
    },
    /// Restore a compressed file into <name>_decompressed.txt next to it
    Decompress {
        /// Path of the compressed file
        path: PathBuf,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let result = match args.command {
        Commands::Compress { path } => {
            compress_file(&path, &FileOptions::default()).map(|out| ("Compressed", out))
        }
        Commands::Decompress { path } => decompress_file(&path).map(|out| ("Decompressed", out)),
    };

    match result {
        Ok((status, out)) => {
            println!("{}: {}", status, out.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
