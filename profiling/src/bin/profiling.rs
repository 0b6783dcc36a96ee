use bilou::{encode_corpus, load_corpus, BilouConfigBuilder, CorpusReport, TaggedToken};
use clap::Parser;
use serde_jsonlines::write_json_lines;
use std::error::Error;
use std::ops::Range;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug, Parser)]
struct Args {
    #[arg(short, long, default_value_t = 1)]
    n_samples: u32,
    /// Directory holding the `.tokens`, `.spans` and `.objects` files of the corpus.
    #[arg(short, long, default_value = "./tests/data")]
    corpus: PathBuf,
    #[arg(short, long, default_value_t = false)]
    parallel: bool,
    /// Writes the tags of every document as json lines.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let config = BilouConfigBuilder::new().parallel(args.parallel).build();
    let loaded = load_corpus(&args.corpus, &config)?;

    let n_samples = args.n_samples;
    let iter = Range {
        start: 0,
        end: n_samples,
    };
    let mut total_duration = Duration::ZERO;
    let mut report: CorpusReport<Vec<TaggedToken>> = CorpusReport::default();
    for _ in iter {
        let documents = loaded.documents.clone();
        let now = Instant::now();
        report = encode_corpus(documents, &config);
        total_duration += now.elapsed();
    }
    println!(
        "Total duration: {} with {n_samples} samples of {} documents",
        total_duration.as_secs_f64(),
        loaded.documents.len()
    );

    report.merge_failures(loaded.failures);
    print!("{}", report);
    if let Some(output) = args.output {
        write_json_lines(output, &report.documents)?;
    }
    Ok(())
}
