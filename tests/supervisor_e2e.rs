//! ProcessSupervisor tests against real child processes

use pisentry::supervisor::{ProcessState, ProcessSupervisor};
use std::time::{Duration, Instant};

fn supervisor() -> ProcessSupervisor {
    // short grace period to keep the suite fast
    ProcessSupervisor::with_grace_period(Duration::from_millis(100))
}

#[tokio::test]
async fn test_spawn_and_kill_round_trip() {
    let sup = supervisor();
    let pid = sup
        .spawn("sleep", &["30".to_string()])
        .await
        .expect("sleep should spawn");

    assert!(sup.check_liveness(pid).await);
    let record = sup.get(pid).await.expect("record kept while running");
    assert_eq!(record.last_known_state, ProcessState::Running);
    assert!(record.command.contains("sleep"));

    assert!(sup.kill(pid).await);
    assert!(!sup.check_liveness(pid).await);
    // record dropped once confirmed stopped
    assert!(sup.get(pid).await.is_none());
}

#[tokio::test]
async fn test_liveness_of_nonexistent_pid_is_false() {
    let sup = supervisor();
    // pid far above any pid_max
    assert!(!sup.check_liveness(999_999_999).await);
}

#[tokio::test]
async fn test_kill_of_stopped_pid_skips_grace_period() {
    let sup = supervisor();
    let pid = sup
        .spawn("true", &[])
        .await
        .expect("true should spawn");

    // let the child exit on its own
    tokio::time::sleep(Duration::from_millis(200)).await;

    let started = Instant::now();
    assert!(sup.kill(pid).await);
    assert!(started.elapsed() < Duration::from_millis(100));
}

#[tokio::test]
async fn test_spawn_failure_returns_none() {
    let sup = supervisor();
    assert!(sup
        .spawn("/nonexistent/interpreter", &["job.py".to_string()])
        .await
        .is_none());
}

#[tokio::test]
async fn test_exited_child_counts_as_dead_even_unreaped() {
    let sup = supervisor();
    let pid = sup
        .spawn("true", &[])
        .await
        .expect("true should spawn");

    // the child has terminated but the supervisor still holds the handle,
    // so until the liveness probe reaps it the OS lists it as a zombie
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!sup.check_liveness(pid).await);
}
