use log::debug;
use std::env;
use std::error::Error;

use recipe_harvest::{
    acquire_and_extract, merge_ingredient_lists, parse_ingredients, AcquisitionError,
    AcquisitionMode,
};

const USAGE: &str = "Usage:
  recipe-harvest <url> [--fast]
  recipe-harvest parse <ingredient line>...
  recipe-harvest merge <file-a> <file-b>";

async fn read_lines(path: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().ok_or(USAGE)?;

    match command.as_str() {
        "parse" => {
            if args.len() < 2 {
                return Err(USAGE.into());
            }
            let parsed = parse_ingredients(&args[1..]);
            println!("{}", serde_json::to_string_pretty(&parsed)?);
        }
        "merge" => {
            let (Some(path_a), Some(path_b)) = (args.get(1), args.get(2)) else {
                return Err(USAGE.into());
            };
            let a = parse_ingredients(&read_lines(path_a).await?);
            let b = parse_ingredients(&read_lines(path_b).await?);
            for item in merge_ingredient_lists(&a, &b) {
                println!("{}", item.display());
            }
        }
        "-h" | "--help" => println!("{}", USAGE),
        url => {
            let mode = if args.iter().any(|a| a == "--fast") {
                AcquisitionMode::Fast
            } else {
                AcquisitionMode::Full
            };
            debug!("Acquiring {} in {:?} mode", url, mode);

            match acquire_and_extract(url, mode).await {
                Ok(result) => {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                    if result.needs_full_analysis {
                        eprintln!("No recipe in the captions. Run again without --fast for a full analysis.");
                    }
                }
                Err(AcquisitionError::AcquisitionFailed { message, stages }) => {
                    eprintln!("{}", message);
                    for record in stages {
                        eprintln!("  {}: {:?}", record.stage, record.outcome);
                    }
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    Ok(())
}
