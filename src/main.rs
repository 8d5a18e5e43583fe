use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use weather_notifier::config::Config;
use weather_notifier::kakao::KakaoClient;
use weather_notifier::pipeline::{kst_now, Pipeline};

#[derive(Parser)]
#[command(name = "weather-notifier", version, about = "Weather advice pushed to KakaoTalk")]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send today's forecast, advice and air quality
    Daily,
    /// Send an alert if rain starts within the configured window
    RainAlert,
    /// Print today's message without sending it
    Preview,
    /// Exchange a KakaoTalk authorization code for the initial tokens
    Auth {
        /// Authorization code from the consent redirect
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,weather_notifier=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = Config::load(&cli.config).map_err(|e| {
        anyhow::anyhow!(
            "Failed to load configuration: {}\n\n\
             Make sure:\n\
             1. {} exists\n\
             2. Credentials are set in the environment (check .env.example)\n\
             3. Create a .env file if needed",
            e,
            cli.config
        )
    })?;
    info!("Configuration loaded");

    let now = kst_now();

    match cli.command {
        Command::Daily => {
            Pipeline::new(config).run_daily(now).await?;
        }
        Command::RainAlert => {
            Pipeline::new(config).run_rain_alert(now).await?;
        }
        Command::Preview => match Pipeline::new(config).compose_daily(now).await? {
            Some(message) => println!("{}", message),
            None => error!("Failed to fetch weather data."),
        },
        Command::Auth { code } => {
            let timeout = std::time::Duration::from_secs(config.http.timeout_seconds);
            let mut kakao = KakaoClient::new(&config.kakao, timeout)?;
            kakao.exchange_code(code.trim()).await?;
        }
    }

    Ok(())
}
