//! Pre-equalization payload dump
//!
//! Decodes captured pre-equalization payloads and prints the per-channel
//! analysis as JSON.
//!
//! **Usage**:
//! ```bash
//! cargo run --bin preeqdump -- payloads.txt [config.json]
//! ```
//!
//! **Input**: one channel per line, `<index> <channel-width-hz|-> <hex payload>`.
//! Blank lines and lines starting with `#` are ignored.

use rustypnm::tracing_init::init_tracing;
use rustypnm::{analyze_channels, to_json, AnalysisConfig, ChannelInput};
use std::env;
use std::fs;
use tracing::warn;

fn parse_line(line_no: usize, line: &str) -> Option<ChannelInput> {
    let mut fields = line.splitn(3, char::is_whitespace);
    let (Some(index), Some(width), Some(payload)) = (fields.next(), fields.next(), fields.next()) else {
        warn!(line_no, "expected <index> <channel-width-hz|-> <hex payload>");
        return None;
    };

    let Ok(index) = index.parse::<u32>() else {
        warn!(line_no, index, "channel index is not an integer");
        return None;
    };

    let input = ChannelInput::from_hex(index, payload);
    match width {
        "-" => Some(input),
        w => match w.parse::<f64>() {
            Ok(hz) => Some(input.with_channel_width(hz)),
            Err(_) => {
                warn!(line_no, width = w, "channel width is not a number");
                None
            }
        },
    }
}

fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <payload-file> [config.json]", args[0]);
        eprintln!();
        eprintln!("Each line: <index> <channel-width-hz|-> <hex payload>");
        std::process::exit(1);
    }

    let config = match args.get(2) {
        Some(path) => match AnalysisConfig::from_json_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        },
        None => AnalysisConfig::default(),
    };

    let text = match fs::read_to_string(&args[1]) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading '{}': {}", args[1], e);
            std::process::exit(1);
        }
    };

    let inputs: Vec<ChannelInput> = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|(line_no, line)| parse_line(line_no, line))
        .collect();

    let reports = analyze_channels(&inputs, &config);
    match to_json(&reports) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing results: {}", e);
            std::process::exit(1);
        }
    }
}
