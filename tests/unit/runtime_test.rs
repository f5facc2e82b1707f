//! Tests for tokio spawner utilities and snapshots

use batch_dispatch::config::SchedulerOptions;
use batch_dispatch::core::Spawn;
use batch_dispatch::runtime::tokio_spawner::TokioSpawner;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tokio_spawner_spawn() {
    let spawner = TokioSpawner::new(tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::oneshot::channel();
    spawner.spawn(async move {
        tx.send(123).unwrap();
    });

    let result = rx.await.expect("oneshot result");
    assert_eq!(result, 123);
}

#[test]
fn test_tokio_spawner_owns_dedicated_runtime() {
    let options = SchedulerOptions {
        thread_count: 2,
        ..SchedulerOptions::default()
    };
    let spawner = TokioSpawner::from_options(&options).unwrap();

    let (tx, rx) = std::sync::mpsc::channel();
    spawner.spawn(async move {
        tx.send(std::thread::current().name().map(str::to_owned)).unwrap();
    });

    let thread_name = rx
        .recv_timeout(std::time::Duration::from_secs(5))
        .expect("spawned task ran");
    assert_eq!(thread_name.as_deref(), Some("batch-dispatch-worker"));
}
