use cordelia::prelude::*;
use std::env;

fn init_tracing() {
    tracing_log::LogTracer::init().unwrap();
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).unwrap();
}

#[tokio::main]
async fn main() -> cordelia::Result<()> {
    init_tracing();

    let token = env::var("DISCORD_TOKEN").expect("DISCORD_TOKEN is not set");
    let ctx = DiscordContext::new(DiscordToken::new(token)?)?;

    let gateway = ctx.raw().get_gateway_bot("json", true).await?;
    println!("gateway url: {}", gateway.url);
    println!("recommended shards: {}", gateway.shards);
    println!(
        "session starts remaining: {}/{}",
        gateway.session_start_limit.remaining, gateway.session_start_limit.total,
    );
    Ok(())
}
