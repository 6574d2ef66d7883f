// Run with: cargo run --bin build_dictionary -- words.txt dictionaries/de
use clap::Parser;
use decompound_core::dictionary::DictionaryWriter;
use decompound_core::persistence::load_dictionary;
use std::error::Error;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Builds a dictionary directory from a newline-separated word list.
#[derive(Parser)]
#[command(name = "build_dictionary", version)]
struct Cli {
    /// One term per line
    word_list: PathBuf,

    /// Output directory, created if missing
    dictionary_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let Cli {
        word_list,
        dictionary_dir: dir,
    } = Cli::parse();
    fs::create_dir_all(&dir)?;

    let mut writer = DictionaryWriter::new();
    for line in BufReader::new(File::open(&word_list)?).lines() {
        let line = line?;
        let term = line.trim();
        if !term.is_empty() {
            writer.add(term);
        }
    }
    let read = writer.len();

    let summary = writer.write(&dir)?;
    // Decoding once here leaves the derived index files next to the archive.
    let dictionary = load_dictionary(&dir)?;

    println!("{}: {read} lines read", word_list.display());
    println!("{} terms written, {} skipped", summary.written, summary.skipped);
    println!("{} terms loaded from {}", dictionary.len(), dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn both_paths_are_required() {
        assert!(Cli::try_parse_from(["build_dictionary", "words.txt"]).is_err());

        let cli = Cli::try_parse_from(["build_dictionary", "words.txt", "out/de"]).unwrap();
        assert_eq!(cli.word_list, PathBuf::from("words.txt"));
        assert_eq!(cli.dictionary_dir, PathBuf::from("out/de"));
    }
}
