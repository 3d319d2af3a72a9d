//! vibeselect - evaluate a message selector against command-line bindings

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{debug, warn};
use std::process::ExitCode;
use vibeselect::expression::{is_reserved, HEADER_NAMES};
use vibeselect::message::parse_assignment;
use vibeselect::{Message, MessageProvider, Selector, Truth};

/// Evaluate a message selector against header and property values
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Selector text, e.g. "color = 'blue' AND weight > 2500"
    selector: String,

    /// Header binding as NAME=VALUE (repeatable)
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Property binding as NAME=VALUE (repeatable)
    #[arg(short, long = "property", value_name = "NAME=VALUE")]
    properties: Vec<String>,

    /// Print the fully bracketed form of the parsed selector
    #[arg(short, long)]
    explain: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match run(&args) {
        Ok(Truth::True) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: &Args) -> Result<Truth> {
    let message = build_message(args)?;

    let selector = Selector::parse(&args.selector)
        .with_context(|| format!("Failed to parse selector '{}'", args.selector))?;

    if args.explain {
        println!("{}", selector);
    }

    let result = selector.evaluate_with(&MessageProvider, &message);
    println!("{}", result);
    Ok(result)
}

fn build_message(args: &Args) -> Result<Message> {
    let mut message = Message::new();

    for text in &args.headers {
        let (name, value) =
            parse_assignment(text).with_context(|| format!("Invalid --header '{}'", text))?;
        if !HEADER_NAMES.contains(&name.as_str()) {
            warn!("'{}' is not a header name; selectors will not see it", name);
        }
        debug!("header {} = {} ({})", name, value, value.type_name());
        message.set_header(name, value);
    }

    for text in &args.properties {
        let (name, value) =
            parse_assignment(text).with_context(|| format!("Invalid --property '{}'", text))?;
        if is_reserved(&name) {
            warn!("'{}' is a reserved word and cannot appear in a selector", name);
        }
        debug!("property {} = {} ({})", name, value, value.type_name());
        message.set_property(name, value);
    }

    Ok(message)
}
