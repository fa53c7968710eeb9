use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod draw;
mod font;
mod render;
mod theme;

#[derive(Debug, Parser)]
#[clap(
    name = "breadcrumb-icon-gen",
    about = "Generate the placeholder app icon for the Breadcrumb desktop app"
)]
struct Args {
    /// Where to write the generated PNG.
    #[clap(
        short,
        long,
        value_name = "FILE",
        default_value = "desktop/assets/icon.png"
    )]
    output: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    render::generate(&args.output)
}
