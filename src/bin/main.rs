use clap::Parser;
use crossterm::style::Stylize;
use decompound_core::{Decompounder, Locale, LocalePolicy};
use std::error::Error;
use std::fs;
use std::io::{stdin, stdout, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DICTIONARY_ROOT: &str = "dictionaries";

#[derive(Parser)]
#[command(name = "decompound")]
#[command(version, about = "Interactive compound term splitter")]
struct Cli {
    /// Locale tag such as de, nl or en
    #[arg(default_value = "de")]
    locale: Locale,

    /// Dictionary directory. Defaults to dictionaries/<locale>
    dir: Option<PathBuf>,

    /// JSON locale policy overriding the built-in one
    policy: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let locale = cli.locale;
    let dir = cli
        .dir
        .unwrap_or_else(|| PathBuf::from(DICTIONARY_ROOT).join(locale.tag()));

    let mut decompounder = match cli.policy {
        Some(policy) => {
            LocalePolicy::from_json(&fs::read_to_string(policy)?)?.decompounder(&dir)?
        }
        None => locale.decompounder(&dir)?,
    };

    println!("{}", format!("Decompounder ({locale}, {})", dir.display()).bold());
    println!("Type words to split them. 'exit' to quit.");
    println!("-----------------------------------------");

    let mut stdout = stdout();
    print!("> ");
    stdout.flush()?;

    for line in stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        if input == "exit" {
            break;
        }
        for word in input.split_whitespace() {
            print_parts(&mut decompounder, word);
        }
        print!("> ");
        stdout.flush()?;
    }
    Ok(())
}

fn print_parts(decompounder: &mut Decompounder, word: &str) {
    // Callers are expected to normalize; lowercasing is the minimum here.
    let word = word.to_lowercase();
    let parts = decompounder.decompound_term(&word);
    if parts.is_empty() {
        println!("  {} {}", word.as_str().yellow(), "(no split)".dark_grey());
    } else {
        println!("  {} -> {}", word.as_str().green(), parts.join(" | "));
    }
}
