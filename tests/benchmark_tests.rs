//! Performance benchmarks for the registry and wire encoding

use server::registry::PositionRegistry;
use shared::{decode_message, encode_message, Command, CommandEnvelope, Snapshot};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Benchmarks single-threaded registry mutation
#[test]
fn benchmark_registry_apply() {
    let registry = PositionRegistry::new();
    let iterations = 100_000;
    let start = Instant::now();

    for i in 0..iterations {
        registry.apply("musk", Command::ALL[i % Command::ALL.len()]);
    }

    let duration = start.elapsed();
    println!(
        "Registry apply: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 1 second
    assert!(duration.as_millis() < 1000);
}

/// Benchmarks snapshot copy plus JSON encoding with a crowded registry
#[test]
fn benchmark_snapshot_encoding() {
    let registry = PositionRegistry::new();
    for i in 0..100 {
        registry.apply(&format!("player-{}", i), Command::Right);
    }

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let snapshot = registry.snapshot();
        let payload = encode_message(&snapshot).unwrap();
        assert!(!payload.is_empty());
    }

    let duration = start.elapsed();
    println!(
        "Snapshot encoding: 100 players x {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks request decoding
#[test]
fn benchmark_request_decoding() {
    let frame = encode_message(&CommandEnvelope::new("bruno", Command::Left)).unwrap();
    let iterations = 100_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let envelope: CommandEnvelope = decode_message(&frame).unwrap();
        assert_eq!(envelope.command, Command::Left);
    }

    let duration = start.elapsed();
    println!(
        "Request decoding: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Stress tests the registry lock under contention from many threads
#[test]
fn stress_test_contended_registry() {
    let registry = Arc::new(PositionRegistry::new());
    let threads = 16;
    let iterations = 10_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let name = format!("player-{}", t);
                for _ in 0..iterations {
                    let snapshot: Snapshot = registry.apply_and_snapshot(&name, Command::Down);
                    assert!(snapshot.contains_key(&name));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Contended registry: {} threads x {} ops in {:?}",
        threads, iterations, duration
    );

    for t in 0..threads {
        let position = registry.position(&format!("player-{}", t)).unwrap();
        assert_eq!(position.y, iterations as i64);
        assert_eq!(position.x, 0);
    }

    // Should complete in under 10 seconds
    assert!(duration.as_millis() < 10_000);
}
