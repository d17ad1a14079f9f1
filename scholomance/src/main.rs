//! Scholomance space-opera RPG, played over stdin/stdout.
//!
//! ```bash
//! cargo run -p scholomance -- --name "Kaito" --race cyber-elf --class tech-rogue
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=scholomance_core=debug` for more detail.

mod headless;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    // Check for API key
    if std::env::var("GEMINI_API_KEY").is_err() && std::env::var("API_KEY").is_err() {
        eprintln!("Error: GEMINI_API_KEY environment variable not set.");
        eprintln!("Please set it in .env file or with: export GEMINI_API_KEY=your_key_here");
        std::process::exit(1);
    }

    let config = headless::parse_config_from_args(&args);
    headless::run_headless(config).await.map_err(|e| e.into())
}

fn print_help() {
    println!("Scholomance - a space-opera academy RPG");
    println!();
    println!("Usage: scholomance [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --name <NAME>              Character name (default: Cadet)");
    println!("  --race <RACE>              e.g. terran, cyber-elf, void-born, neko-morph");
    println!("  --class <CLASS>            e.g. star-knight, warp-mage, tech-rogue");
    println!("  --background <BACKGROUND>  e.g. slum-survivor, lost-royalty");
    println!("  --alignment <ALIGNMENT>    e.g. chaotic-good, true-neutral");
    println!("  --random                   Randomize race, class, background and alignment");
    println!("  -h, --help                 Show this help");
    println!();
    println!("Environment:");
    println!("  GEMINI_API_KEY             Gemini API key (or API_KEY)");
    println!("  SCHOLOMANCE_TEXT_MODEL     Override the text model");
    println!("  SCHOLOMANCE_IMAGE_MODEL    Override the image model");
    println!("  RUST_LOG                   Log filter (default: info)");
}
