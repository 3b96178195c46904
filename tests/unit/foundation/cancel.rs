use super::*;
use std::time::Instant;

#[test]
fn clones_share_the_signal() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(!other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
    token.cancel();
    assert!(other.is_cancelled());
}

#[test]
fn wait_timeout_expires_without_signal() {
    let token = CancelToken::new();
    let start = Instant::now();
    assert!(!token.wait_timeout(Duration::from_millis(30)));
    assert!(start.elapsed() >= Duration::from_millis(25));
}

#[test]
fn wait_timeout_wakes_on_cancel_from_another_thread() {
    let token = CancelToken::new();
    let remote = token.clone();
    let start = Instant::now();
    let t = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(20));
        remote.cancel();
    });
    assert!(token.wait_timeout(Duration::from_secs(10)));
    assert!(start.elapsed() < Duration::from_secs(5));
    t.join().unwrap();
}
