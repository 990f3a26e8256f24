use clap::Parser;
use monitor::Overrides;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Subreddit to monitor, overrides SUBREDDIT.
    #[arg(long)]
    subreddit: Option<String>,

    /// Port to serve on, overrides RUST_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    monitor::start_server(Overrides {
        subreddit: args.subreddit,
        port: args.port,
    })
    .await
}
