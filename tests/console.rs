mod common;

use common::TestResult;
use dfxdeploy::engine::run_console;
use dfxdeploy::notify::Notification;
use dfxdeploy::types::ServerStatus;
use dfxdeploy_test_utils::{with_timeout, Harness};

#[tokio::test]
async fn console_runs_commands_in_one_session() -> TestResult {
    common::init_tracing();
    let h = Harness::new(&["hello_backend", "hello_frontend"]);
    common::install_manifests(&h);

    let input: &[u8] = b"# local round trip\n\nstart-server\nbogus-command\ndeploy-local\n";
    with_timeout(run_console(&h.orchestrator, input)).await?;

    let calls = h.runner.calls();
    let args: Vec<String> = calls.iter().map(|c| c.args.join(" ")).collect();
    assert_eq!(args, ["start --clean", "deploy", "stop"]);

    // End of input stops the supervised process.
    assert_eq!(h.runner.live_processes(), 0);
    assert_eq!(h.orchestrator.supervisor().status(), ServerStatus::Stopped);

    let events = h.sink.events();
    assert_eq!(events.first(), Some(&Notification::ServerStarted));
    assert!(events.contains(&Notification::DeploymentSucceeded));
    assert_eq!(events.last(), Some(&Notification::Reset));
    Ok(())
}

#[tokio::test]
async fn quit_ends_the_session_early() -> TestResult {
    let h = Harness::new(&[]);

    let input: &[u8] = b"start\nquit\ndeploy-local\n";
    with_timeout(run_console(&h.orchestrator, input)).await?;

    assert!(!h.runner.was_called(&["deploy"]));
    assert_eq!(h.runner.live_processes(), 0);
    Ok(())
}

#[tokio::test]
async fn failed_action_does_not_end_the_session() -> TestResult {
    let h = Harness::new(&["hello_backend"]);

    // No manifest on disk: the first deploy fails, the stop still runs.
    let input: &[u8] = b"deploy-local\nstop-server\n";
    with_timeout(run_console(&h.orchestrator, input)).await?;

    assert!(h.runner.was_called(&["deploy"]));
    assert!(matches!(
        h.sink.events().first(),
        Some(Notification::DeploymentFailed(_))
    ));
    Ok(())
}
