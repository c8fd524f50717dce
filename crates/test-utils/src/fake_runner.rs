use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dfxdeploy::errors::{DeployError, Result};
use dfxdeploy::exec::{
    CommandResult, CommandRunner, CommandSpec, ExitReport, ProcessEvent, TaskHandle,
};
use tokio::sync::{mpsc, oneshot};

/// Canned answer for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Response {
    pub fn ok(stdout: &str) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(exit_code: i32, stderr: &str) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub args: Vec<String>,
    /// `None` for detached spawns.
    pub exit_code: Option<i32>,
}

impl Call {
    pub fn starts_with(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.args.iter().any(|a| a == flag)
    }
}

struct Script {
    prefix: Vec<String>,
    response: Response,
    /// `true` for entries consumed by their first match.
    once: bool,
}

struct FakeProcess {
    crash: Option<oneshot::Sender<i32>>,
    live: Arc<AtomicBool>,
}

#[derive(Default)]
struct State {
    scripts: Vec<Script>,
    calls: Vec<Call>,
    processes: Vec<FakeProcess>,
    /// Live detached processes at the moment of each spawn.
    live_at_spawn: Vec<usize>,
    spawn_output: Vec<String>,
    fail_spawn: bool,
}

/// A `CommandRunner` that answers from a script instead of spawning
/// processes.
///
/// - Responses are matched by the longest registered argument prefix; among
///   equal prefixes one-shot entries win, then the most recent registration.
/// - Unmatched commands succeed with empty output.
/// - Detached spawns become fake processes that run until terminated or
///   until the test calls [`FakeRunner::crash`].
#[derive(Clone, Default)]
pub struct FakeRunner {
    state: Arc<Mutex<State>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every command starting with `prefix`.
    pub fn respond(&self, prefix: &[&str], response: Response) -> &Self {
        self.push_script(prefix, response, false);
        self
    }

    /// Answer the next command starting with `prefix`, then fall back.
    pub fn respond_once(&self, prefix: &[&str], response: Response) -> &Self {
        self.push_script(prefix, response, true);
        self
    }

    /// Lines a spawned process prints on stdout right after starting.
    pub fn spawn_output(&self, lines: &[&str]) -> &Self {
        let mut state = self.state.lock().unwrap();
        state.spawn_output = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Make every subsequent detached spawn fail.
    pub fn fail_spawn(&self, fail: bool) -> &Self {
        self.state.lock().unwrap().fail_spawn = fail;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn was_called(&self, prefix: &[&str]) -> bool {
        self.count(prefix) > 0
    }

    /// Number of fake processes still running.
    pub fn live_processes(&self) -> usize {
        let state = self.state.lock().unwrap();
        state
            .processes
            .iter()
            .filter(|p| p.live.load(Ordering::SeqCst))
            .count()
    }

    pub fn spawned(&self) -> usize {
        self.state.lock().unwrap().processes.len()
    }

    pub fn live_at_spawn(&self) -> Vec<usize> {
        self.state.lock().unwrap().live_at_spawn.clone()
    }

    /// Make the `index`-th spawned process exit on its own with `code`.
    ///
    /// Returns false if there is no such process or it already ended.
    pub fn crash(&self, index: usize, code: i32) -> bool {
        let mut state = self.state.lock().unwrap();
        match state.processes.get_mut(index).and_then(|p| p.crash.take()) {
            Some(tx) => tx.send(code).is_ok(),
            None => false,
        }
    }

    fn push_script(&self, prefix: &[&str], response: Response, once: bool) {
        let mut state = self.state.lock().unwrap();
        state.scripts.push(Script {
            prefix: prefix.iter().map(|s| s.to_string()).collect(),
            response,
            once,
        });
    }

    fn answer(&self, args: &[String]) -> Response {
        let mut state = self.state.lock().unwrap();

        let best = state
            .scripts
            .iter()
            .enumerate()
            .filter(|(_, s)| {
                args.len() >= s.prefix.len() && args.iter().zip(&s.prefix).all(|(a, p)| a == p)
            })
            .max_by_key(|(i, s)| (s.prefix.len(), s.once, *i))
            .map(|(i, _)| i);

        let response = match best {
            Some(i) if state.scripts[i].once => state.scripts.remove(i).response,
            Some(i) => state.scripts[i].response.clone(),
            None => Response::ok(""),
        };

        state.calls.push(Call {
            args: args.to_vec(),
            exit_code: Some(response.exit_code),
        });
        response
    }
}

impl CommandRunner for FakeRunner {
    fn run(
        &self,
        spec: CommandSpec,
    ) -> Pin<Box<dyn Future<Output = Result<CommandResult>> + Send + '_>> {
        let response = self.answer(&spec.args);
        Box::pin(async move {
            Ok(CommandResult {
                command: spec.program,
                args: spec.args,
                exit_code: response.exit_code,
                stdout: response.stdout,
                stderr: response.stderr,
            })
        })
    }

    fn spawn_detached(
        &self,
        spec: CommandSpec,
        events: mpsc::UnboundedSender<ProcessEvent>,
    ) -> Result<TaskHandle<ExitReport>> {
        let mut state = self.state.lock().unwrap();
        if state.fail_spawn {
            return Err(DeployError::io(
                &spec.program,
                format!("spawning `{}`: No such file or directory", spec.command_line()),
            ));
        }

        let live_now = state
            .processes
            .iter()
            .filter(|p| p.live.load(Ordering::SeqCst))
            .count();
        state.live_at_spawn.push(live_now);
        state.calls.push(Call {
            args: spec.args.clone(),
            exit_code: None,
        });

        for line in &state.spawn_output {
            let _ = events.send(ProcessEvent::Stdout(line.clone()));
        }

        let live = Arc::new(AtomicBool::new(true));
        let (crash_tx, crash_rx) = oneshot::channel::<i32>();
        state.processes.push(FakeProcess {
            crash: Some(crash_tx),
            live: Arc::clone(&live),
        });

        Ok(TaskHandle::spawn(move |cancel_rx| async move {
            let report = tokio::select! {
                Ok(code) = crash_rx => ExitReport { code: Some(code), terminated: false },
                _ = cancel_rx => ExitReport { code: None, terminated: true },
            };
            live.store(false, Ordering::SeqCst);
            let _ = events.send(ProcessEvent::Exited(report));
            report
        }))
    }
}
