//! imgproc CLI - Command-line interface for BMP image processing.

use clap::{ArgAction, Parser, Subcommand};

mod commands;

use commands::{CmdGray, CmdInfo, CmdOutline, CmdSplit};

/// Command-line arguments for the imgproc tool.
#[derive(Parser, Debug)]
#[command(name = "imgproc")]
#[command(version)]
#[command(about = "Inspect, convert and annotate uncompressed BMP images")]
#[command(long_about = "imgproc reads and writes 8-bit grayscale and 24-bit color BMP files.\n\n\
    EXAMPLES:\n    \
    imgproc info photo.bmp --json\n    \
    imgproc gray photo.bmp out/gray.bmp --method ycc\n    \
    imgproc split photo.bmp out/channels\n    \
    imgproc outline photo.bmp out/boxed.bmp --rect 10,10,50,80 --color 0,0,255")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print BMP header fields
    Info(CmdInfo),
    /// Convert a color image to grayscale
    Gray(CmdGray),
    /// Write the blue, green and red channels as separate gray images
    Split(CmdSplit),
    /// Draw a rectangle or circle outline
    Outline(CmdOutline),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.as_str()));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    match &cli.command {
        Command::Info(cmd) => cmd.run(),
        Command::Gray(cmd) => cmd.run(),
        Command::Split(cmd) => cmd.run(),
        Command::Outline(cmd) => cmd.run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["imgproc", "info", "a.bmp", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Info(_)));
    }
}
