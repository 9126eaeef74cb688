//! File logging example
//!
//! Demonstrates rolling file output with size-based rollover.
//!
//! Run with: cargo run --example file_logging

use compact_logger::prelude::*;
use compact_logger::{information, warning};

fn main() -> Result<()> {
    println!("=== Compact Logger - File Logging Example ===\n");

    let options = FileOptions {
        level: LogLevel::Debug,
        rolling_interval: RollingInterval::Day,
        file_size_limit_bytes: 4 * 1024,
        ..FileOptions::default()
    };
    let logger = LogFactory::file(EntityType::Function, "resize-images", "logs/resize.log", options)?;

    println!("1. Writing events to logs/resize<date>.log");
    information!(logger, "Function invoked with {Count} images", 40);

    for n in 1..=40 {
        logger.debug("Resized image {Index} to {Width}x{Height}", args![n, 640, 480]);
        if n % 15 == 0 {
            warning!(logger, "Image {Index} took longer than expected", n);
        }
    }

    information!(logger, "All images processed");
    logger.flush()?;

    println!("\n2. Files written:");
    let mut names: Vec<String> = std::fs::read_dir("logs")?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for name in names {
        println!("   logs/{}", name);
    }

    println!("\n=== Example completed successfully! ===");

    Ok(())
}
