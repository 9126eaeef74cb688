//! Basic usage example
//!
//! Demonstrates console logging with message templates, caller enrichment
//! and scoped context.
//!
//! Run with: cargo run --example basic_usage

use compact_logger::prelude::*;
use compact_logger::{error, information, warning};
use std::io;

#[derive(serde::Serialize)]
struct Order {
    id: u32,
    total: f64,
}

fn charge(logger: &Logger, order_id: u32) {
    let failure = io::Error::new(io::ErrorKind::Other, "card declined");
    error!(logger, err = &failure; "Charge failed for {OrderId}", order_id);
}

fn main() -> Result<()> {
    println!("=== Compact Logger - Basic Usage Example ===\n");

    let logger = Logger::builder()
        .min_level(LogLevel::Information)
        .entity(EntityType::Service, "billing")
        .application("billing-demo", Some("0.1.0"))
        .sink(ConsoleSink::json())
        .build();

    println!("1. Compact JSON events:");
    information!(logger, "Service started on port {Port}", 8080);
    warning!(logger, "Queue depth {Depth} above {Threshold}", 118, 100);
    logger.debug("Not written: below the minimum level", args![]);

    println!("\n2. Caller from the stack:");
    logger.information("Resolved from the call stack", args![]);

    println!("\n3. Errors and destructured values:");
    charge(&logger, 42);
    let order = PropertyValue::destructure_tagged(&Order { id: 7, total: 19.5 })?;
    logger.information("Placed {@Order}", vec![order]);

    println!("\n4. Scoped context:");
    {
        let _request = LogContext::push_property("RequestId", "req-1234");
        information!(logger, "Handling request");
    }
    information!(logger, "Request finished");

    println!("\n5. Debug console:");
    let debug_logger = LogFactory::console(
        EntityType::Service,
        "billing",
        ConsoleOptions {
            level: LogLevel::Verbose,
            debug_console: true,
            ..ConsoleOptions::default()
        },
    );
    information!(debug_logger, "Human-readable line for {User}", "alice");

    logger.flush()?;
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
