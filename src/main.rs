use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};
use tweetgrab::bot::handlers::{self, Command};
use tweetgrab::bot::report;
use tweetgrab::config::Settings;
use tweetgrab::health;
use tweetgrab::stats::Stats;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file
    dotenv().ok();

    init_logging();

    info!("Starting tweetgrab bot...");

    // Load settings
    let settings = init_settings();

    // Keep the hosting platform's health probe satisfied
    let listener = init_health_listener(&settings).await;
    tokio::spawn(health::serve(listener));

    // One shared HTTP client with a bounded timeout for every
    // outbound call (redirect resolution, metadata, probes, streams)
    let http = init_http_client(&settings);

    // Usage counters shared across all chat handlers
    let stats = Arc::new(Stats::new());

    let bot = Bot::new(settings.telegram_token.clone());

    let handler = setup_handler();

    info!("Bot is running...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![http, stats, settings])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_settings() -> Arc<Settings> {
    match Settings::new() {
        Ok(settings) => {
            info!("Configuration loaded successfully.");
            Arc::new(settings)
        }
        Err(err) => {
            error!("Failed to load configuration: {}", err);
            std::process::exit(1);
        }
    }
}

async fn init_health_listener(settings: &Settings) -> TcpListener {
    match health::bind(&settings.health_host, settings.health_port).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(
                "Failed to bind health listener on {}:{}: {}",
                settings.health_host, settings.health_port, err
            );
            std::process::exit(1);
        }
    }
}

fn init_http_client(settings: &Settings) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    Update::filter_message()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some_and(|text| text.starts_with('/')))
                .endpoint(handle_unknown_command),
        )
        .branch(
            dptree::filter(|msg: Message| msg.text().is_some()).endpoint(handle_text_message),
        )
}

async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    stats: Arc<Stats>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    let res = match cmd {
        Command::Start => handlers::start(&bot, &msg).await,
        Command::Help => handlers::help(&bot, &msg).await,
        Command::Stats => handlers::stats(&bot, &msg, &stats).await,
        Command::ResetStats => handlers::reset_stats(&bot, &msg, &stats).await,
    };
    if let Err(err) = res {
        error!("Command handler error: {err:#}");
        report::report_unhandled(&bot, settings.developer_chat_id, Some(&msg), &err).await;
    }
    respond(())
}

async fn handle_unknown_command(bot: Bot, msg: Message) -> Result<(), teloxide::RequestError> {
    if let Err(err) = handlers::unknown_command(&bot, &msg).await {
        error!("Unknown-command handler error: {err:#}");
    }
    respond(())
}

async fn handle_text_message(
    bot: Bot,
    msg: Message,
    http: reqwest::Client,
    stats: Arc<Stats>,
    settings: Arc<Settings>,
) -> Result<(), teloxide::RequestError> {
    if let Err(err) = handlers::handle_message(&bot, &msg, &http, &stats, &settings).await {
        error!("Message handler error: {err:#}");
        report::report_unhandled(&bot, settings.developer_chat_id, Some(&msg), &err).await;
    }
    respond(())
}
