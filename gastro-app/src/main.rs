//! gastro - gastritis symptom tracker and diet helper

use clap::Parser;
use tracing::{error, info};

use gastro_app::{config::Args, context::AppContext, execute, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    logging::init(&args.log_level, args.log_format);

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let ctx = AppContext::from_args(&args)?;
    info!(
        backend = %args.backend_config().url,
        mode = if ctx.session.is_guest() { "guest" } else { "authenticated" },
        "Gastro starting"
    );

    let output = execute(&ctx, args.command).await?;
    println!("{}", output);
    Ok(())
}
