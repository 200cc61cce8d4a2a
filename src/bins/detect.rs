use card_markers::cli::{self, DetectArgs};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Detect card markers in the live camera feed; press q to quit")]
struct Args {
    #[command(flatten)]
    detect: DetectArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init();
    Args::parse().detect.run()
}
