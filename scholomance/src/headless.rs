//! Line-oriented play over stdin/stdout.
//!
//! Protocol:
//! - A number picks that choice from the list
//! - Lines starting with `#` are commands (quit, status, image, help)
//! - Any other text is sent as a free-form action

use scholomance_core::headless::{GameResponse, HeadlessConfig, HeadlessError, HeadlessGame};
use scholomance_core::{Alignment, Background, Class, ImageRef, Race, StatKey};
use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Run the game in headless mode.
pub async fn run_headless(config: HeadlessConfig) -> Result<(), HeadlessError> {
    println!("Creating {}...", config.name);
    let mut game = HeadlessGame::from_env(config).await?;
    tracing::info!(
        session = %game.engine().id(),
        character = %game.character().name,
        "headless session ready"
    );

    println!("=== Scholomance ===");
    print_character(&game);
    println!();
    print_scene(&game.scene(), &game.choices());
    print_help();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read input, ending session");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            match command.trim() {
                "quit" | "exit" => {
                    println!("The void remembers you. Goodbye!");
                    break;
                }
                "status" => print_status(&game),
                "image" => match game.scene_image() {
                    Some(image) => println!("[IMAGE] {}", describe_image(&image)),
                    None => println!("[IMAGE] Not loaded yet"),
                },
                "help" => print_help(),
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            stdout.flush().ok();
            continue;
        }

        print!("[PROCESSING]");
        stdout.flush().ok();

        let result = match line.parse::<usize>() {
            Ok(index) => game.choose(index).await,
            Err(_) => game.send(line).await,
        };

        print!("\r            \r");
        stdout.flush().ok();

        match result {
            Ok(GameResponse {
                narrative,
                choices,
                turn,
            }) => {
                println!("[TURN {turn}]");
                print_scene(&narrative, &choices);
            }
            Err(e) => println!("[ERROR] {e}"),
        }
    }

    Ok(())
}

fn print_character(game: &HeadlessGame) {
    let c = game.character();
    println!("{} - {} {} ({}, {})", c.name, c.race, c.class, c.background, c.alignment);
    println!("{}", c.backstory);
    println!("Portrait: {}", describe_image(&c.portrait));
}

fn print_scene(description: &str, choices: &[String]) {
    println!("{description}");
    println!();
    for (i, choice) in choices.iter().enumerate() {
        println!("  {}. {choice}", i + 1);
    }
    println!();
}

fn print_status(game: &HeadlessGame) {
    let c = game.character();
    println!("[STATUS]");
    println!("  Session: {}", game.engine().id());
    println!("  Character: {} ({} {})", c.name, c.race, c.class);
    println!("  HP: {}/{}  Energy: {}/{}", c.hp, c.max_hp, c.energy, c.max_energy);
    let stats: Vec<String> = StatKey::all()
        .iter()
        .map(|k| format!("{k} {}", c.stats.get(*k)))
        .collect();
    println!("  Stats: {}", stats.join(", "));
    for skill in &c.skills {
        println!(
            "  Skill: {} [{} / {}] {}",
            skill.name,
            skill.kind.name(),
            skill.stat_scale,
            skill.description
        );
    }
    println!("  Turn: {}", game.turn_count());
}

fn print_help() {
    println!("Commands:");
    println!("  <number>  - Take that choice");
    println!("  #status   - Show character and turn");
    println!("  #image    - Show the current scene image");
    println!("  #help     - Show this help");
    println!("  #quit     - Exit the game");
    println!("  (anything else is sent as a free-form action)");
    println!();
}

fn describe_image(image: &ImageRef) -> String {
    match image {
        ImageRef::Url { url } => url.clone(),
        ImageRef::Inline { mime_type, data } => {
            format!("inline {mime_type} ({} base64 bytes)", data.len())
        }
    }
}

/// Parse character configuration from command line arguments.
///
/// `--random` is applied first, so explicit options override it.
pub fn parse_config_from_args(args: &[String]) -> HeadlessConfig {
    let name = flag_value(args, "--name").unwrap_or("Cadet");
    let mut config = if args.iter().any(|a| a == "--random") {
        HeadlessConfig::randomized(name, &mut rand::thread_rng())
    } else {
        HeadlessConfig::quick_start(name)
    };

    if let Some(race) = flag_value(args, "--race").and_then(|v| lookup(v, Race::all())) {
        config.race = race;
    }
    if let Some(class) = flag_value(args, "--class").and_then(|v| lookup(v, Class::all())) {
        config.class = class;
    }
    if let Some(bg) = flag_value(args, "--background").and_then(|v| lookup(v, Background::all())) {
        config.background = bg;
    }
    if let Some(al) = flag_value(args, "--alignment").and_then(|v| lookup(v, Alignment::all())) {
        config.alignment = al;
    }

    config
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Match an option by name, ignoring case and punctuation. A unique prefix
/// is enough, so `terran` finds "Terran (Human)".
fn lookup<T: Copy + Display>(input: &str, options: &[T]) -> Option<T> {
    let wanted = normalize(input);
    if wanted.is_empty() {
        return None;
    }
    if let Some(exact) = options.iter().find(|o| normalize(&o.to_string()) == wanted) {
        return Some(*exact);
    }
    let mut matches = options
        .iter()
        .filter(|o| normalize(&o.to_string()).starts_with(&wanted));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Some(*only),
        _ => None,
    }
}
