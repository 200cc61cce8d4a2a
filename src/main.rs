use card_markers::cli::{self, ComposeArgs, DetectArgs, GenerateArgs};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "card_markers", about = "ArUco playing-card markers: generate, print, detect")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the 54 card markers as PNG files.
    Generate(GenerateArgs),
    /// Lay the generated markers out on printable PDF sheets.
    Compose(ComposeArgs),
    /// Detect markers in the live camera feed.
    Detect(DetectArgs),
}

fn main() -> anyhow::Result<()> {
    cli::init();

    match Cli::parse().command {
        Command::Generate(args) => args.run(),
        Command::Compose(args) => args.run(),
        Command::Detect(args) => args.run(),
    }
}
