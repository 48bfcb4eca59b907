//! lyrics-rnn training binary.
//!
//! Scrapes an artist's lyrics (unless already on disk), trains a
//! character-level RNN on them, and writes the final generated sample to
//! `<artist>_<date>_rnn_output.txt` in the working directory. Ctrl-C stops
//! training gracefully and still writes the sample.

use anyhow::{Context, Result};
use clap::Parser;
use lyrics_rnn::scrape::GeniusClient;
use lyrics_rnn::{Config, TrainState, Trainer, TrainingData};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lyrics-rnn",
    about = "Train a character-level RNN on an artist's lyrics"
)]
struct Args {
    /// Artist name; lyrics are stored under <lyrics-dir>/<artist lower-case>
    #[arg(long, required_unless_present = "corpus")]
    artist: Option<String>,

    /// Artist song-list page to scrape
    #[arg(long, required_unless_present = "corpus")]
    url: Option<String>,

    /// Iteration budget (the loop runs iters + 1 times)
    #[arg(long, default_value_t = 10_000)]
    iters: usize,

    /// Train on an existing .txt file or directory instead of scraping
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Root directory for scraped lyrics
    #[arg(long, default_value = "lyrics")]
    lyrics_dir: PathBuf,

    /// Hidden layer size
    #[arg(long, default_value_t = 100)]
    hidden_size: usize,

    /// Unroll length per window
    #[arg(long, default_value_t = 25)]
    seq_length: usize,

    /// Adagrad learning rate
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Append JSONL progress events to this file
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lyrics_rnn=info")),
        )
        .init();

    let args = Args::parse();
    let source = resolve_corpus(&args)?;

    let data = TrainingData::load(&source)
        .with_context(|| format!("loading corpus from {}", source.display()))?;

    let config = Config {
        hidden_size: args.hidden_size,
        seq_length: args.seq_length,
        learning_rate: args.learning_rate,
        iters: args.iters,
        seed: args.seed,
        ..Config::default()
    };

    let mut trainer = Trainer::new(data, config)?;
    if let Some(path) = &args.metrics_file {
        trainer = trainer.with_metrics_log(path)?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&stop);
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))
        .context("installing Ctrl-C handler")?;

    info!("training RNN model using crawled data");
    let report = trainer.run(stop.as_ref())?;

    if report.state == TrainState::Interrupted {
        warn!(
            iterations = report.iterations,
            "training interrupted; kept latest sample"
        );
    } else {
        info!(
            iterations = report.iterations,
            smooth_loss = report.smooth_loss,
            "training complete"
        );
    }
    println!("{}", report.output_path.display());
    Ok(())
}

/// Pick the corpus source, scraping first if the artist has no lyrics yet.
fn resolve_corpus(args: &Args) -> Result<PathBuf> {
    if let Some(corpus) = &args.corpus {
        return Ok(corpus.clone());
    }

    let (Some(artist), Some(url)) = (&args.artist, &args.url) else {
        anyhow::bail!("--artist and --url are required without --corpus");
    };

    let client = GeniusClient::new(url.as_str(), artist).with_root(&args.lyrics_dir);
    if client.has_existing_lyrics() {
        warn!("found existing data of {artist}");
    } else {
        warn!("crawling all {artist} lyrics");
        let written = client.run().context("scraping lyrics")?;
        info!(songs = written, dir = %client.artist_dir().display(), "saved lyrics");
    }
    Ok(client.artist_dir())
}
