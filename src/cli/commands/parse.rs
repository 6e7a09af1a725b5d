//! Parse Command
//!
//! Run the resilient parser on a saved LLM response. Useful for checking
//! how a malformed reply degrades without calling any provider.
//!
//! Usage:
//!   docsync parse [FILE] [--name NAME]
//!   cat reply.txt | docsync parse --name src/lib.rs

use std::io::Read;
use std::path::Path;

use serde_json::json;

use crate::ai::ResilientParser;
use crate::cli::ui::styled_tier;
use crate::config::ConfigLoader;
use crate::types::{Document, QualityTier, Result};

const STDIN_NAME: &str = "stdin";

pub fn run(file: Option<&Path>, name: Option<&str>) -> Result<()> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let fallback_name = name
        .map(str::to_string)
        .or_else(|| file.map(|p| p.display().to_string()))
        .unwrap_or_else(|| STDIN_NAME.to_string());

    let config = ConfigLoader::load()?;
    let parser = ResilientParser::new(config.parser.raw_fallback_limit);
    let (document, tier) = parser.parse(&raw, &fallback_name);

    eprintln!("tier: {}", styled_tier(tier));
    println!("{}", serde_json::to_string_pretty(&to_json(&document, tier))?);
    Ok(())
}

fn to_json(document: &Document, tier: QualityTier) -> serde_json::Value {
    json!({
        "tier": tier,
        "document": document,
    })
}
