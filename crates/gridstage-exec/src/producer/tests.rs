use std::{fs, path::Path};

use tempfile::TempDir;

use super::*;

fn sh_producer(dir: &Path) -> Producer {
    Producer::new(
        ProducerConfig::default()
            .with_interpreter("sh")
            .with_sentinel(dir.join("boinc_finish_called")),
    )
}

fn script(dir: &Path, body: &str) -> ProducerArgs {
    let script = dir.join("worker.sh");
    fs::write(&script, body).unwrap();
    let input = dir.join("input.dat");
    fs::write(&input, b"42\n").unwrap();
    ProducerArgs::new(script, input, dir.join("output.dat"))
}

#[tokio::test]
async fn runs_interpreter_with_positional_locators() {
    let dir = TempDir::new().unwrap();
    let producer = sh_producer(dir.path());
    let args = script(dir.path(), "echo working\ncat \"$1\" > \"$2\"\n");

    let code = producer.execute(&args).await;

    assert_eq!(code, 0);
    assert_eq!(fs::read(&args.output).unwrap(), b"42\n");
    assert!(producer.sentinel().is_signalled());
}

#[tokio::test]
async fn non_zero_exit_still_signals_completion() {
    let dir = TempDir::new().unwrap();
    let producer = sh_producer(dir.path());
    let args = script(dir.path(), "exit 3\n");

    assert_eq!(producer.run(&args).await.unwrap(), RunOutcome::Exited(3));

    assert_eq!(producer.execute(&args).await, 0);
    assert!(producer.sentinel().is_signalled());
}

#[tokio::test]
async fn propagates_exit_code_when_configured() {
    let dir = TempDir::new().unwrap();
    let producer = Producer::new(
        ProducerConfig::default()
            .with_interpreter("sh")
            .with_sentinel(dir.path().join("boinc_finish_called"))
            .with_propagate_exit_code(true),
    );
    let args = script(dir.path(), "exit 3\n");

    assert_eq!(producer.execute(&args).await, 3);
    assert!(producer.sentinel().is_signalled());
}

#[tokio::test]
async fn killed_interpreter_still_signals_completion() {
    let dir = TempDir::new().unwrap();
    let producer = sh_producer(dir.path());
    let args = script(dir.path(), "kill -9 $$\n");

    let outcome = producer.run(&args).await.unwrap();
    assert_eq!(outcome, RunOutcome::Signaled(Some(9)));
    assert_eq!(outcome.code(), None);

    assert_eq!(producer.execute(&args).await, 0);
    assert!(producer.sentinel().is_signalled());
}

#[tokio::test]
async fn spawn_failure_signals_completion_and_fails() {
    let dir = TempDir::new().unwrap();
    let producer = Producer::new(
        ProducerConfig::default()
            .with_interpreter(dir.path().join("no-such-interpreter").display().to_string())
            .with_sentinel(dir.path().join("boinc_finish_called")),
    );
    let args = script(dir.path(), "exit 0\n");

    assert!(matches!(
        producer.run(&args).await,
        Err(ExecError::Spawn { .. })
    ));
    assert!(!producer.sentinel().is_signalled());

    assert_eq!(producer.execute(&args).await, 1);
    assert!(producer.sentinel().is_signalled());
}

#[tokio::test]
async fn unwritable_sentinel_is_a_failure() {
    let dir = TempDir::new().unwrap();
    let producer = Producer::new(
        ProducerConfig::default()
            .with_interpreter("sh")
            .with_sentinel(dir.path().join("missing-dir/boinc_finish_called")),
    );
    let args = script(dir.path(), "exit 0\n");

    assert_eq!(producer.execute(&args).await, 1);
}

#[tokio::test]
async fn environment_and_cwd_reach_the_interpreter() {
    let dir = TempDir::new().unwrap();
    let work = dir.path().join("work");
    fs::create_dir(&work).unwrap();
    let producer = Producer::new(
        ProducerConfig::default()
            .with_interpreter("sh")
            .with_sentinel(dir.path().join("boinc_finish_called"))
            .with_cwd(&work)
            .with_env("GRIDSTAGE_TASK", "t-1"),
    );
    let args = script(dir.path(), "printf '%s' \"$GRIDSTAGE_TASK\" > here.txt\n");

    assert_eq!(producer.execute(&args).await, 0);
    assert_eq!(fs::read_to_string(work.join("here.txt")).unwrap(), "t-1");
}
