use std::io;
use std::process;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use tablite::cli::Cli;
use tablite::{app, config, output};

#[tokio::main]
async fn main() {
    // Load .env file (optional, ignore if missing)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }

    let result = match config::load_from_args(&cli) {
        Ok(action) => app::run(action, io::stdout(), token).await,
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        output::print_error(&err);
        process::exit(1);
    }
}
