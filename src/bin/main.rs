//! bizsearch CLI - run the search proxy or query a provider directly
//!
//! `bizsearch serve` starts the HTTP service; `bizsearch search` runs one
//! search from the terminal using the same configuration.

use bizsearch::{
    export,
    search_businesses,
    server,
    types::{BusinessProvider, ProviderKind, SearchRequest},
    AppConfig, SearchResponse,
};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bizsearch")]
#[command(about = "Business search proxy for Baidu Maps and Google Places")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP search service
    Serve {
        /// Address to listen on (overrides BIZSEARCH_BIND_ADDR)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },
    /// Run a single search and print the results
    Search {
        /// Search keyword
        keyword: String,

        /// Search provider
        #[arg(short, long, value_enum)]
        provider: Provider,

        /// Region or address to search around
        #[arg(short, long)]
        location: Option<String>,

        /// Search radius in meters
        #[arg(short, long, allow_negative_numbers = true)]
        radius: Option<f64>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,

        /// Write CSV output to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Start the CSV file with a UTF-8 byte order mark
        #[arg(long)]
        bom: bool,
    },
    /// List providers and whether their API keys are configured
    Providers,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Provider {
    Domestic,
    International,
}

impl From<Provider> for ProviderKind {
    fn from(provider: Provider) -> Self {
        match provider {
            Provider::Domestic => ProviderKind::Domestic,
            Provider::International => ProviderKind::International,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.bind_addr = bind;
            }
            server::serve(&config).await?;
        }
        Commands::Search {
            keyword,
            provider,
            location,
            radius,
            format,
            output,
            bom,
        } => {
            let mut request = SearchRequest::new(keyword)?;
            if let Some(location) = location {
                request = request.with_location(location);
            }
            if let Some(radius) = radius {
                request = request.with_radius(radius);
            }

            let provider = create_provider(&config, provider.into())?;
            let response = search_businesses(provider.as_ref(), &request).await?;
            display_results(&response, provider.as_ref(), format, output, bom)?;
        }
        Commands::Providers => handle_list_providers(&config)?,
    }

    Ok(())
}

fn create_provider(
    config: &AppConfig,
    kind: ProviderKind,
) -> anyhow::Result<Box<dyn BusinessProvider>> {
    let provider: Box<dyn BusinessProvider> = match kind {
        ProviderKind::Domestic => Box::new(config.domestic_provider()?),
        ProviderKind::International => Box::new(config.international_provider()?),
    };
    Ok(provider)
}

fn handle_list_providers(config: &AppConfig) -> anyhow::Result<()> {
    println!("{}", "Available Providers:".bold().blue());
    println!();

    for kind in [ProviderKind::Domestic, ProviderKind::International] {
        let provider = create_provider(config, kind)?;
        let status = if provider.is_configured() {
            "✅".green()
        } else {
            "❌".red()
        };
        println!(
            "{} {} ({}) - POST {}",
            status,
            provider.kind().to_string().bold(),
            provider.name(),
            provider.kind().route().italic()
        );
    }

    println!();
    println!("{}", "Set environment variables to enable providers:".bold());
    println!("export {}=your_baidu_ak", bizsearch::config::DOMESTIC_API_KEY_VAR);
    println!("export {}=your_google_key", bizsearch::config::INTERNATIONAL_API_KEY_VAR);
    Ok(())
}

fn display_results(
    response: &SearchResponse,
    provider: &dyn BusinessProvider,
    format: OutputFormat,
    output: Option<PathBuf>,
    bom: bool,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Csv => match output {
            Some(path) => {
                export::write_csv(&path, &response.businesses, bom)?;
                println!(
                    "Wrote {} businesses to {}",
                    response.businesses.len(),
                    path.display()
                );
            }
            None => print!("{}", export::to_csv(&response.businesses)),
        },
        OutputFormat::Table => {
            println!(
                "{} {} ({})",
                "Businesses from".bold(),
                provider.name().bold().blue(),
                provider.kind()
            );
            println!("{}", "─".repeat(80).dimmed());

            for (i, business) in response.businesses.iter().enumerate() {
                println!(
                    "{}. {} {}",
                    (i + 1).to_string().bold(),
                    business.name.bold(),
                    format!("[{}]", business.category).cyan()
                );
                println!("   📍 {}", business.address);

                if let Some(phone) = &business.phone {
                    println!("   📞 {}", phone.green());
                }
                if let Some(rating) = business.rating {
                    println!("   ⭐ {}", rating.to_string().yellow());
                }
                if let Some(price_level) = business.price_level.filter(|level| *level > 0) {
                    println!("   💰 {}", "$".repeat(usize::from(price_level)));
                }
                if let Some(distance) = &business.distance {
                    println!("   📏 {distance}");
                }
                if let Some(website) = &business.website {
                    println!("   🔗 {}", website.blue().underline());
                }
                if let Some(hours) = &business.hours {
                    println!("   🕒 {}", hours.to_string().dimmed());
                }
                println!();
            }

            println!(
                "{} {}",
                "Total results:".bold(),
                response.businesses.len().to_string().bold()
            );
            if response.dropped > 0 {
                println!(
                    "{} {}",
                    "Dropped (details unavailable):".yellow(),
                    response.dropped
                );
            }
        }
    }

    Ok(())
}
