use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use mt_preprocess::{preprocess_corpora, Error, PreprocessConfig};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("preprocessing failed: {}", err);
        std::process::exit(1);
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Corpus preprocessing CLI", long_about = None)]
struct Args {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Path to preprocessing config file (JSON)"
    )]
    config: PathBuf,

    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Where to write the populated config; defaults to stdout"
    )]
    output: Option<PathBuf>,
}

fn run() -> Result<(), Error> {
    let args = Args::parse();

    let config = PreprocessConfig::load(&args.config)?;
    let populated = preprocess_corpora(&config)?;

    match args.output {
        Some(path) => {
            let file = File::create(&path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &populated)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            println!("wrote populated config to {}", path.display());
        }
        None => {
            println!("{}", serde_json::to_string_pretty(&populated)?);
        }
    }

    Ok(())
}
