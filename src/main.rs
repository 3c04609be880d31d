use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use spark_cv::config::{parse_speed, Config};
use spark_cv::cv::CvSource;
use spark_cv::{logging, pipeline, AppProps};

/// Terminal résumé viewer.
#[derive(Parser, Debug)]
#[command(name = "spark-cv", version, about)]
struct Args {
    /// CV document (JSON).
    #[arg(long)]
    cv: Option<PathBuf>,
    /// Config file (defaults to ./spark-cv.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// Typewriter speed in milliseconds per character.
    #[arg(long, value_parser = parse_speed)]
    speed: Option<f64>,
    /// Append logs to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
    /// Print the fully revealed page to stdout and exit.
    #[arg(long)]
    dump: bool,
    /// Column width for --dump.
    #[arg(long, default_value_t = 80)]
    width: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    config.apply_env(|key| std::env::var(key).ok());
    if let Some(cv) = args.cv {
        config.cv_path = cv;
    }
    if let Some(speed) = args.speed {
        config.typewriter_speed_ms = speed;
    }
    if let Some(log_file) = args.log_file {
        config.log_file = Some(log_file);
    }

    logging::init(config.log_file.as_deref(), &config.log_filter).context("opening log file")?;
    info!(cv = %config.cv_path.display(), dump = args.dump, "starting");

    let props = AppProps {
        source: CvSource::File(config.cv_path.clone()),
        speed: config.typewriter_speed_ms,
        titles: config.titles.clone(),
    };

    if args.dump {
        for line in pipeline::dump(props, args.width) {
            println!("{line}");
        }
        return Ok(());
    }

    pipeline::run(props, Duration::from_millis(config.frame_interval_ms))
        .context("running terminal viewer")?;
    Ok(())
}
