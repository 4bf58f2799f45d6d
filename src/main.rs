//! Ukeire - Riichi Mahjong shanten and required-tile analyzer
//!
//! A command-line tool for computing how far a hand is from winning,
//! which tiles advance it, and how a finished hand splits into blocks.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use colored::Colorize;
use serde::Serialize;

use ukeire::{
    display::{hand_to_mps, tile_to_unicode, tiles_to_unicode},
    hand::Hand,
    parse::parse_hand,
    patterns,
    separate::{Separation, separate},
    shanten::{Forms, ShantenResult, calc_shanten},
    tables,
    tile::Tile,
};

const AFTER_HELP: &str = r#"HAND FORMAT:
    Standard notation: numbers followed by suit letter
    m = Man (Characters), p = Pin (Dots), s = Sou (Bamboo), z = Honors
    Honors: 1z=East, 2z=South, 3z=West, 4z=North, 5z=White, 6z=Green, 7z=Red
    Red fives: Use 0 instead of 5 (e.g., 0m = red 5-man)

    Called melds (kans, pons, chis):
    [1111m]  = Closed kan (ankan) of 1-man
    (1111m)  = Open kan of 1-man
    (111m)   = Open triplet (pon) of 1-man
    (123m)   = Open sequence (chi) of 1-2-3 man

EXAMPLES:
    ukeire 111256789m1122p               Shanten and accepted tiles
    ukeire 1123567m"(111z)(222z)"        Hand with two called pons
    ukeire 123m456p789s11122z -w 1z      Separate a finished hand (ron)
    ukeire 123m456p789s11122z -w 1z -t   Same, won by self-draw
    ukeire 1122m3344p5566s7z -f seven-pairs
    ukeire 19m19p19s1234567z --json"#;

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "ukeire")]
#[command(version)]
#[command(styles = styles())]
#[command(about = "Riichi Mahjong shanten and required-tile analyzer")]
#[command(after_help = AFTER_HELP)]
struct Args {
    /// Hand notation (e.g., 123m456p789s11122z)
    hand: String,

    /// Winning tile; separates the finished hand into blocks
    #[arg(short = 'w', long = "win")]
    winning_tile: Option<String>,

    /// Win by self-draw (default: ron)
    #[arg(short, long)]
    tsumo: bool,

    /// Winning forms to consider (comma-separated:
    /// standard, seven-pairs, thirteen-orphans)
    #[arg(short, long, default_value = "standard,seven-pairs,thirteen-orphans")]
    forms: String,

    /// Directory holding the precomputed table files
    #[arg(long)]
    tables: Option<PathBuf>,

    /// Emit machine-readable JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Output {
    hand: String,
    shanten: i8,
    forms: Vec<&'static str>,
    waits: Vec<String>,
    /// Copies of the accepted tiles still unseen from this hand's view
    accepted_count: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    separations: Option<Vec<Separation>>,
}

fn main() {
    let args = Args::parse();

    if let Some(dir) = &args.tables {
        if let Err(e) = tables::init_from_dir(dir) {
            eprintln!("❌ Failed to load shanten tables: {}", e);
            process::exit(1);
        }
        if let Err(e) = patterns::init_from_dir(dir) {
            eprintln!("❌ Failed to load pattern tables: {}", e);
            process::exit(1);
        }
    }

    let hand = match parse_hand(&args.hand).map_err(|e| e.to_string()).and_then(|p| {
        p.into_hand().map_err(|e| e.to_string())
    }) {
        Ok(hand) => hand,
        Err(e) => {
            eprintln!("❌ Invalid hand: {}", e);
            process::exit(1);
        }
    };

    let requested = match parse_forms(&args.forms) {
        Ok(forms) => forms,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    let result = match calc_shanten(&hand, requested) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    let separations = args.winning_tile.as_deref().map(|text| {
        let win_tile = match Tile::try_from(text) {
            Ok(tile) => tile,
            Err(e) => {
                eprintln!("❌ Invalid winning tile: {}", e);
                process::exit(1);
            }
        };
        match separate(&hand, win_tile, args.tsumo) {
            Ok(separations) => (win_tile, separations),
            Err(e) => {
                eprintln!("❌ {}", e);
                process::exit(1);
            }
        }
    });

    if args.json {
        print_json(&hand, &result, separations.map(|(_, s)| s));
    } else {
        print_pretty(&hand, &result, separations);
    }
}

fn parse_forms(text: &str) -> Result<Forms, String> {
    let mut forms = Forms::empty();
    for name in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        forms |= match name {
            "standard" => Forms::STANDARD,
            "seven-pairs" | "chiitoitsu" => Forms::SEVEN_PAIRS,
            "thirteen-orphans" | "kokushi" => Forms::THIRTEEN_ORPHANS,
            other => return Err(format!("Unknown form: {}", other)),
        };
    }
    if forms.is_empty() {
        return Err("No winning form requested".to_string());
    }
    Ok(forms)
}

fn form_names(forms: Forms) -> Vec<&'static str> {
    let mut names = Vec::new();
    if forms.contains(Forms::STANDARD) {
        names.push("standard");
    }
    if forms.contains(Forms::SEVEN_PAIRS) {
        names.push("seven-pairs");
    }
    if forms.contains(Forms::THIRTEEN_ORPHANS) {
        names.push("thirteen-orphans");
    }
    names
}

fn accepted_count(hand: &Hand, waits: &[Tile]) -> u8 {
    waits.iter().map(|&t| 4 - hand.count(t)).sum()
}

fn print_json(hand: &Hand, result: &ShantenResult, separations: Option<Vec<Separation>>) {
    let output = Output {
        hand: hand_to_mps(hand),
        shanten: result.shanten,
        forms: form_names(result.forms),
        waits: result.waits.iter().map(Tile::to_string).collect(),
        accepted_count: accepted_count(hand, &result.waits),
        separations,
    };
    println!("{}", serde_json::to_string_pretty(&output).expect("output serializes"));
}

fn print_pretty(hand: &Hand, result: &ShantenResult, separations: Option<(Tile, Vec<Separation>)>) {
    let mut tiles = Vec::new();
    for (kind, &count) in hand.counts().iter().enumerate() {
        for _ in 0..count {
            tiles.push(Tile::from_index(kind).expect("kind index in range"));
        }
    }
    println!("{}  {}", tiles_to_unicode(&tiles), hand_to_mps(hand).dimmed());
    println!();

    let shanten_text = match result.shanten {
        -1 => "winning hand".green().bold().to_string(),
        0 => "tenpai".green().bold().to_string(),
        n => format!("{} from tenpai", n).yellow().to_string(),
    };
    println!(
        "{} {} ({})",
        "Shanten:".bold(),
        result.shanten,
        shanten_text
    );
    println!("{} {}", "Forms:".bold(), form_names(result.forms).join(", "));

    if result.waits.is_empty() {
        println!("{} none", "Accepts:".bold());
    } else {
        let list: Vec<String> = result.waits.iter().map(Tile::to_string).collect();
        println!(
            "{} {} ({} tiles)",
            "Accepts:".bold(),
            list.join(" "),
            accepted_count(hand, &result.waits)
        );
    }

    if let Some((win_tile, separations)) = separations {
        println!();
        println!(
            "{} {} on {}",
            "Separations:".bold(),
            separations.len(),
            tile_to_unicode(&win_tile).trim()
        );
        for separation in &separations {
            let blocks: Vec<String> = separation
                .blocks
                .iter()
                .map(|b| {
                    let text = format!("{:?}@{}", b.kind, b.first);
                    if b.open { format!("({})", text) } else { text }
                })
                .collect();
            println!("  {:?}: {}", separation.wait, blocks.join(" "));
        }
    }
}
