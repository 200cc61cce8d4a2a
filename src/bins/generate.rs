use card_markers::cli::{self, GenerateArgs};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Render the 54 card markers as PNG files")]
struct Args {
    #[command(flatten)]
    generate: GenerateArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init();
    Args::parse().generate.run()
}
