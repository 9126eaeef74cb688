//! Stress tests for concurrent logging
//!
//! These tests verify:
//! - Events from many threads are written as whole, valid JSON lines
//! - No events are lost when sinks are shared between threads
//! - Scoped context properties stay on the thread that pushed them
//! - Size-based rolling holds up under concurrent writers

use compact_logger::core::LogEvent;
use compact_logger::prelude::*;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const THREADS: usize = 8;
const EVENTS_PER_THREAD: usize = 250;

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn parse_lines(content: &str) -> Vec<serde_json::Value> {
    content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap_or_else(|e| panic!("bad line {:?}: {}", line, e)))
        .collect()
}

/// Every event from every thread arrives exactly once
#[test]
fn test_concurrent_logging_keeps_every_event() {
    let buffer = SharedBuffer::default();
    let sink = ConsoleSink::with_writer(Box::new(CompactJsonFormatter::new()), Box::new(buffer.clone()));
    let logger = Arc::new(Logger::builder().min_level(LogLevel::Information).sink(sink).build());

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for n in 0..EVENTS_PER_THREAD {
                    logger.information("Worker {Worker} event {Sequence}", args![thread_id, n]);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let content = String::from_utf8(buffer.0.lock().clone()).expect("utf8 output");
    let lines = parse_lines(&content);
    assert_eq!(lines.len(), THREADS * EVENTS_PER_THREAD);

    let seen: HashSet<(u64, u64)> = lines
        .iter()
        .map(|line| {
            (
                line["Metadata"]["Worker"].as_u64().unwrap(),
                line["Metadata"]["Sequence"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(seen.len(), THREADS * EVENTS_PER_THREAD);

    let metrics = logger.metrics();
    assert_eq!(metrics.total_logged(), (THREADS * EVENTS_PER_THREAD) as u64);
    assert_eq!(metrics.caller_lookups(), (THREADS * EVENTS_PER_THREAD) as u64);
    assert_eq!(metrics.dropped_count(), 0);
}

/// Context pushed on one thread never shows up on another
#[test]
fn test_context_is_thread_local() {
    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<LogEvent>>>);

    impl Sink for Capture {
        fn emit(&mut self, event: &LogEvent) -> Result<()> {
            self.0.lock().push(event.clone());
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            Ok(())
        }

        fn name(&self) -> &str {
            "capture"
        }
    }

    let capture = Capture::default();
    let logger = Arc::new(Logger::builder().sink(capture.clone()).build());

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                let _scope = LogContext::push_property("Owner", thread_id);
                for _ in 0..50 {
                    compact_logger::warning!(logger, "Tick from {Thread}", thread_id);
                }
                assert_eq!(LogContext::depth(), 1);
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    assert_eq!(LogContext::depth(), 0);
    let events = capture.0.lock();
    assert_eq!(events.len(), THREADS * 50);
    for event in events.iter() {
        assert_eq!(event.properties.get("Owner"), event.properties.get("Thread"));
    }
}

/// Concurrent writers into one size-limited file sink
#[test]
fn test_concurrent_rolling_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let log_path = temp_dir.path().join("stress.log");

    let options = FileOptions {
        level: LogLevel::Debug,
        rolling_interval: RollingInterval::Infinite,
        file_size_limit_bytes: 16 * 1024,
        ..FileOptions::default()
    };
    let logger = Arc::new(
        LogFactory::file(EntityType::Service, "stress", &log_path, options)
            .expect("Failed to create logger"),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for n in 0..EVENTS_PER_THREAD {
                    compact_logger::debug!(logger, "Payload {Thread}/{Sequence} {Body}", thread_id, n, "x".repeat(64));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }
    logger.flush().expect("Failed to flush");

    let mut files = 0;
    let mut total = 0;
    for entry in fs::read_dir(temp_dir.path()).expect("Failed to list logs") {
        let path = entry.expect("dir entry").path();
        let content = fs::read_to_string(&path).expect("Failed to read log file");
        assert!(
            content.len() as u64 <= 16 * 1024 + 1024,
            "{} grew past the size limit",
            path.display()
        );
        total += parse_lines(&content).len();
        files += 1;
    }

    assert!(files > 1, "expected the file to roll");
    assert_eq!(total, THREADS * EVENTS_PER_THREAD);
}
