use clap::Parser;
use img_shrink::cli::{Args, Commands, SessionCommand, SESSION_HELP};
use img_shrink::constants::INFO_PREFIX;
use img_shrink::{
    error, info, logger, success, warn, Completion, ConsolePresenter, ImageCompressor,
    OriginalArtifact, PipelineConfig, Result, Session, ShrinkError,
};
use rayon::ThreadPoolBuilder;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

type ConsoleSession = Session<ImageCompressor, ConsolePresenter>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);
    setup_thread_pool(args.threads);

    let result = match args.command {
        Commands::Compress {
            input,
            output_dir,
            quality,
            timeout,
        } => run_compress(&input, &output_dir, quality, timeout).await,
        Commands::Session {
            input,
            output_dir,
            quality,
            timeout,
        } => run_session(input, &output_dir, quality, timeout).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_thread_pool(threads: Option<usize>) {
    if let Some(num_threads) = threads {
        ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .unwrap_or_else(|e| {
                warn!("Failed to set thread pool size: {}", e);
            });
    }
}

async fn run_compress(
    input: &Path,
    output_dir: &Path,
    quality: Option<u8>,
    timeout: Option<u64>,
) -> Result<()> {
    let config = PipelineConfig::new(quality, timeout)?;
    let original = OriginalArtifact::from_path(input).await?;

    let mut session = Session::new(ImageCompressor, ConsolePresenter::new(), config);
    session.select_file(original).await?;

    if let Some(path) = session.download(output_dir)? {
        success!("Saved to {}", path.display());
    }
    Ok(())
}

async fn run_session(
    input: Option<PathBuf>,
    output_dir: &Path,
    quality: Option<u8>,
    timeout: Option<u64>,
) -> Result<()> {
    let config = PipelineConfig::new(quality, timeout)?;
    let mut session = Session::new(ImageCompressor, ConsolePresenter::new(), config);
    info!(
        "{} Session started at quality {}. Type `help` for commands.",
        INFO_PREFIX,
        session.quality()
    );

    if let Some(path) = input {
        open_path(&mut session, &path).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match line.parse::<SessionCommand>() {
            Ok(command) => command,
            Err(msg) => {
                warn!("{}", msg);
                continue;
            }
        };

        match command {
            SessionCommand::Open(path) => open_path(&mut session, &path).await,
            SessionCommand::Quality(quality) => report(session.set_quality(quality).await),
            SessionCommand::Download(dir) => {
                let dir = dir.as_deref().unwrap_or(output_dir);
                match session.download(dir) {
                    Ok(Some(path)) => success!("Saved to {}", path.display()),
                    Ok(None) => warn!("Nothing to download yet"),
                    Err(e) => error!("{}", e),
                }
            }
            SessionCommand::Status => print_status(&session),
            SessionCommand::Help => info!("{}", SESSION_HELP),
            SessionCommand::Quit => break,
            SessionCommand::Empty => {}
        }
    }

    Ok(())
}

async fn open_path(session: &mut ConsoleSession, path: &Path) {
    match OriginalArtifact::from_path(path).await {
        Ok(original) => report(session.select_file(original).await),
        Err(e) => error!("{}", e),
    }
}

/// Prints errors the presenter has not already shown.
fn report(result: Result<Completion>) {
    match result {
        Ok(_) | Err(ShrinkError::Compression(_)) | Err(ShrinkError::Decode(_)) => {}
        Err(e) => error!("{}", e),
    }
}

fn print_status(session: &ConsoleSession) {
    let view = session.view();
    info!("  Quality: {}", view.quality_readout);
    match (&view.original_name, &view.original_size) {
        (Some(name), Some(size)) => info!("  Original: {} ({})", name, size),
        _ => info!("  Original: none"),
    }
    info!("  Compressed: {}", view.compressed_size);
    if let Some(ratio) = &view.ratio {
        info!("  Ratio: {}", ratio);
    }
    info!("  Status: {}", view.status);
}
