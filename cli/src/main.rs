use clap::Parser;
use codestream_cli::Cli;

fn main() -> anyhow::Result<()> {
    codestream_cli::init_tracing();
    codestream_cli::run(Cli::parse())
}
