//! Tests for utility helpers

use batch_dispatch::util::{init_tracing, init_tracing_with, now_ms, DEFAULT_DIRECTIVE};

#[test]
fn test_now_ms_is_monotonic_enough() {
    let first = now_ms();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = now_ms();
    assert!(first > 0);
    assert!(second >= first);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing_with("batch_dispatch=debug");
    assert!(tracing::dispatcher::has_been_set());
    assert!(DEFAULT_DIRECTIVE.starts_with("batch_dispatch"));
}
