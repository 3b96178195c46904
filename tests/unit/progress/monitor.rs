use super::*;
use std::sync::{Arc, Mutex};

fn recorder<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl FnMut(T) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    (seen, move |v| sink.lock().unwrap().push(v))
}

#[test]
fn zero_total_is_rejected_at_registration() {
    let mut monitor = ProgressMonitor::new();
    let err = monitor.on_fraction(Duration::ZERO, |_| {}).unwrap_err();
    assert!(matches!(err, FfError::Configuration(_)));
    assert_eq!(monitor.observer_count(), 0);
}

#[test]
fn dispatches_fraction_and_elapsed() {
    let mut monitor = ProgressMonitor::new();
    let (fractions, on_fraction) = recorder::<f64>();
    let (elapsed, on_elapsed) = recorder::<Duration>();
    monitor
        .on_fraction(Duration::from_secs(4), on_fraction)
        .unwrap();
    monitor.on_elapsed(on_elapsed);

    assert_eq!(monitor.observe_line("Input #0, rawvideo"), None);
    assert_eq!(monitor.observe_line("frame=25 time=00:00:01.00 speed=1x"), Some(2));
    assert_eq!(monitor.observe_line("frame=250 time=00:00:09.00 speed=1x"), Some(2));
    assert_eq!(monitor.finish(), 1);

    assert_eq!(*fractions.lock().unwrap(), vec![0.25, 1.0, 1.0]);
    assert_eq!(
        *elapsed.lock().unwrap(),
        vec![Duration::from_secs(1), Duration::from_secs(9)]
    );
}

#[test]
fn delivery_follows_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let mut monitor = ProgressMonitor::new();
    for id in 0..3 {
        let order = Arc::clone(&order);
        monitor.on_elapsed(move |_| order.lock().unwrap().push(id));
    }
    monitor.observe_line("time=00:00:00.50");
    assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
}

#[test]
fn panicking_observer_does_not_stop_others() {
    let mut monitor = ProgressMonitor::new();
    monitor.on_elapsed(|_| panic!("observer bug"));
    let (seen, on_elapsed) = recorder::<Duration>();
    monitor.on_elapsed(on_elapsed);

    assert_eq!(monitor.observe_line("time=00:00:02.00"), Some(2));
    assert_eq!(*seen.lock().unwrap(), vec![Duration::from_secs(2)]);
}
