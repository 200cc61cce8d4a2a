use card_markers::cli::{self, ComposeArgs};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Lay generated markers out on printable PDF sheets")]
struct Args {
    #[command(flatten)]
    compose: ComposeArgs,
}

fn main() -> anyhow::Result<()> {
    cli::init();
    Args::parse().compose.run()
}
