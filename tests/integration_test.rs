use service_lifecycle::framework::mock::{CallLog, ManualSignals, MockModule, RecordingSink};
use service_lifecycle::framework::{Diagnostic, Env, RunOutcome, RunPhase, ServiceError, Signal};
use service_lifecycle::lifecycle::{Service, ServiceHandle};
use std::time::Duration;

fn service(sink: &RecordingSink, signals: &ManualSignals) -> Service {
    Service::new(Env::Test)
        .with_sink(sink.clone())
        .with_signals(signals.clone())
}

async fn wait_stopped(handle: &ServiceHandle) -> RunOutcome {
    tokio::time::timeout(Duration::from_secs(5), handle.wait_stopped())
        .await
        .expect("service did not stop")
}

fn is_stopping(event: &Diagnostic) -> bool {
    matches!(event, Diagnostic::Stopping { .. })
}

/// Two modules start in order, then an explicit stop unwinds them.
#[tokio::test]
async fn test_two_modules_start_in_order_and_stop() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();
    let db = MockModule::new("db", &log);
    let api = MockModule::new("api", &log);

    let handle = service(&sink, &signals)
        .register(db.clone())
        .register(api.clone())
        .setup()
        .expect("setup failed")
        .start();

    handle.wait_started().await.expect("start failed");
    assert_eq!(log.calls(), ["start:db", "start:api"]);
    assert_eq!(
        sink.lines()[..2],
        ["[service] starting db", "[service] starting api"]
    );

    handle.stop();
    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);
    assert_eq!(handle.phase(), RunPhase::Stopped(RunOutcome::Stopped));

    assert_eq!(
        sink.lines(),
        [
            "[service] starting db",
            "[service] starting api",
            "[service] app stop",
            "[service] stopping api",
            "[service] stopping db",
        ]
    );
    assert_eq!(log.calls(), ["start:db", "start:api", "stop:api", "stop:db"]);
    assert_eq!((db.starts(), db.stops()), (1, 1));
    assert_eq!((api.starts(), api.stops()), (1, 1));
}

/// An empty registry starts immediately and still honours stop.
#[tokio::test]
async fn test_empty_registry() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();

    let handle = service(&sink, &signals).setup().unwrap().start();
    handle.wait_started().await.unwrap();
    assert!(sink.events().is_empty());

    handle.stop();
    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);
    assert_eq!(sink.lines(), ["[service] app stop"]);
}

/// Many concurrent stop callers produce a single teardown.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stops_tear_down_once() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();
    let db = MockModule::new("db", &log);

    let handle = service(&sink, &signals)
        .register(db.clone())
        .setup()
        .unwrap()
        .start();
    handle.wait_started().await.unwrap();

    let stoppers: Vec<_> = (0..16)
        .map(|_| {
            let stop = handle.stopper();
            tokio::spawn(async move { stop.stop() })
        })
        .collect();
    for stopper in stoppers {
        stopper.await.unwrap();
    }

    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);
    assert_eq!(db.stops(), 1);
    assert_eq!(sink.count(|e| *e == Diagnostic::AppStop), 1);
    assert_eq!(sink.count(is_stopping), 1);
}

/// A signal that arrives before any stop request wins the race.
#[tokio::test]
async fn test_signal_before_stop() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();
    let db = MockModule::new("db", &log);

    let handle = service(&sink, &signals)
        .register(db.clone())
        .setup()
        .unwrap()
        .start();
    handle.wait_started().await.unwrap();

    signals.send(Signal::Terminate);
    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);

    // stop after the fact is a no-op
    handle.stop();
    handle.stop();

    let events = sink.events();
    assert!(events.contains(&Diagnostic::GotSignal(Signal::Terminate)));
    assert!(!events.contains(&Diagnostic::AppStop));
    assert_eq!(db.stops(), 1);
    assert_eq!(handle.join().await.unwrap(), RunOutcome::Stopped);
}

/// Signal and stop racing each other still give exactly one teardown.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_signal_and_stop_race() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();
    let db = MockModule::new("db", &log);

    let handle = service(&sink, &signals)
        .register(db.clone())
        .setup()
        .unwrap()
        .start();
    handle.wait_started().await.unwrap();

    let stop = handle.stopper();
    let sender = signals.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move { stop.stop() }),
        tokio::spawn(async move { sender.send(Signal::Interrupt) }),
    );
    a.unwrap();
    b.unwrap();

    wait_stopped(&handle).await;
    let winners = sink.count(|e| matches!(e, Diagnostic::AppStop | Diagnostic::GotSignal(_)));
    assert_eq!(winners, 1);
    assert_eq!(db.stops(), 1);
}

/// Stopping before the start phase finishes is remembered.
#[tokio::test]
async fn test_stop_before_started() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();

    let handle = service(&sink, &signals)
        .register(MockModule::new("db", &log))
        .setup()
        .unwrap()
        .start();
    handle.stop();

    handle.wait_started().await.unwrap();
    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);
    assert_eq!(log.calls(), ["start:db", "stop:db"]);
}

/// Many observers can wait on both barriers.
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_multiple_observers() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();

    let handle = std::sync::Arc::new(service(&sink, &signals).setup().unwrap().start());
    let observers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            tokio::spawn(async move {
                handle.wait_started().await.unwrap();
                handle.wait_stopped().await
            })
        })
        .collect();

    handle.wait_started().await.unwrap();
    handle.stop();
    for observer in observers {
        assert_eq!(observer.await.unwrap(), RunOutcome::Stopped);
    }
}

/// A panicking start hook fails the start phase instead of hanging it.
#[tokio::test]
async fn test_start_panic_releases_started() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();
    let db = MockModule::new("db", &log);
    let cache = MockModule::new("cache", &log).panicking_start();
    let api = MockModule::new("api", &log);

    let handle = service(&sink, &signals)
        .register(db.clone())
        .register(cache.clone())
        .register(api.clone())
        .setup()
        .unwrap()
        .start();

    let err = handle.wait_started().await.unwrap_err();
    assert!(
        matches!(&err, ServiceError::StartFailed { module, reason } if module == "cache" && reason == "cache exploded")
    );

    let outcome = wait_stopped(&handle).await;
    assert!(matches!(outcome, RunOutcome::Failed { ref module, .. } if module == "cache"));

    // api never started; only db gets torn down
    assert_eq!(log.calls(), ["start:db", "start:cache", "stop:db"]);
    assert_eq!(api.starts(), 0);
    assert_eq!(cache.stops(), 0);
    assert!(handle.stopper().is_stopped());
    assert!(matches!(handle.join().await, Ok(RunOutcome::Failed { .. })));
}

/// A panicking stop hook doesn't prevent the rest of teardown.
#[tokio::test]
async fn test_stop_panic_is_contained() {
    let sink = RecordingSink::new();
    let signals = ManualSignals::new();
    let log = CallLog::new();

    let handle = service(&sink, &signals)
        .register(MockModule::new("db", &log))
        .register(MockModule::new("api", &log).panicking_stop())
        .setup()
        .unwrap()
        .start();
    handle.wait_started().await.unwrap();
    handle.stop();

    assert_eq!(wait_stopped(&handle).await, RunOutcome::Stopped);
    assert_eq!(log.calls(), ["start:db", "start:api", "stop:api", "stop:db"]);
    assert_eq!(
        sink.count(|e| matches!(e, Diagnostic::StopFailed { module, .. } if module == "api")),
        1
    );
}
