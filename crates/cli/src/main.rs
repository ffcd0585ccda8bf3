use anyhow::{Context, Result};
use askshot_core::{Askshot, Provider, init};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Select which monitor to capture
    #[arg(long, default_value_t = 0)]
    monitor: usize,

    /// List available monitors and exit
    #[arg(long)]
    list_monitors: bool,

    /// Override the configured provider for this session (openai, gemini, claude)
    #[arg(short, long)]
    provider: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    init();
    let args = Args::parse();

    let mut app = Askshot::new().context("Failed to initialize")?;

    if args.list_monitors {
        println!("Available monitors:");
        for info in app.list_monitors() {
            println!("{}", info);
        }
        return Ok(());
    }

    if let Some(name) = args.provider {
        let provider: Provider = name
            .parse()
            .context("Valid providers are: openai, gemini, claude")?;
        app.config_mut().selected = provider;
    }

    log::info!("starting askshot on monitor {}", args.monitor);
    app.run(args.monitor).context("UI exited with an error")?;

    Ok(())
}
