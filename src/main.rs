use clap::Parser;
use glue_ensemble::cli::{init_tracing, run, Args};

fn main() -> glue_ensemble::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args)
}
