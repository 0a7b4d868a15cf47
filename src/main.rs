mod args;
mod election;

use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

use crate::args::Args;

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);
    debug!("args: {:?}", args);

    match election::run_election(&args) {
        Ok(result) => {
            for winner in result.winners.iter() {
                println!("{}", winner);
            }
        }
        Err(e) => {
            eprintln!("{}", e);
            if let Some(bt) = ErrorCompat::backtrace(&e) {
                debug!("trace: {}", bt);
            }
            std::process::exit(election::exit_code(&e));
        }
    }
}
