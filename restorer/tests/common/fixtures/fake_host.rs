//! Scripted host for exercising the orchestrator without docker, systemd or MongoDB
//!
//! Every command is recorded as one space-joined line so tests can assert on
//! exactly what would have been run.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use restorer::services::{CommandOutput, CommandRunner};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const CONTAINER_ID: &str = "4f2a9c1e7b3d";
pub const CONTAINER_NAME: &str = "genieacs-mongo";

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub name: String,
    pub running: bool,
    /// Whether `docker start` actually brings it up
    pub starts: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeService {
    pub active: bool,
    /// Whether `systemctl start` exits zero
    pub start_accepted: bool,
    /// Whether an accepted start ends in the active state
    pub activates: bool,
}

impl FakeService {
    pub fn active() -> Self {
        Self {
            active: true,
            start_accepted: true,
            activates: true,
        }
    }

    pub fn startable() -> Self {
        Self {
            active: false,
            start_accepted: true,
            activates: true,
        }
    }

    pub fn rejected() -> Self {
        Self {
            active: false,
            start_accepted: false,
            activates: false,
        }
    }
}

#[derive(Default)]
struct HostState {
    container: Option<FakeContainer>,
    services: HashMap<String, FakeService>,
    process_running: bool,
    tools: HashSet<String>,
    database_alive: bool,
    pings_refused: u32,
    restore_fails: bool,
    restore_hangs: bool,
    list_fails: bool,
    staging_remove_fails: bool,
    staged_from: Option<PathBuf>,
    collections: BTreeSet<String>,
    calls: Vec<String>,
}

impl HostState {
    fn server_up(&self) -> bool {
        let container_up = self.container.as_ref().is_some_and(|c| c.running);
        let service_up = self.services.values().any(|s| s.active);
        self.database_alive && (container_up || service_up || self.process_running)
    }
}

pub struct FakeHost {
    state: Mutex<HostState>,
}

impl FakeHost {
    /// A host with nothing installed
    pub fn new() -> Self {
        Self {
            state: Mutex::new(HostState {
                database_alive: true,
                ..Default::default()
            }),
        }
    }

    /// Running database container reachable through `docker exec`
    pub fn container_running() -> Self {
        Self::new()
            .with_tools(&["docker"])
            .with_container(true, true)
    }

    /// Stopped database container; `starts` decides whether `docker start` works
    pub fn container_stopped(starts: bool) -> Self {
        Self::new()
            .with_tools(&["docker"])
            .with_container(false, starts)
    }

    /// Native `mongod` unit that is already active
    pub fn native_running() -> Self {
        Self::new()
            .with_tools(&["mongorestore", "mongosh"])
            .with_service("mongod", FakeService::active())
    }

    pub fn with_container(self, running: bool, starts: bool) -> Self {
        self.state.lock().unwrap().container = Some(FakeContainer {
            id: CONTAINER_ID.to_string(),
            name: CONTAINER_NAME.to_string(),
            running,
            starts,
        });
        self
    }

    pub fn with_service(self, name: &str, service: FakeService) -> Self {
        self.state
            .lock()
            .unwrap()
            .services
            .insert(name.to_string(), service);
        self
    }

    pub fn with_tools(self, tools: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .tools
            .extend(tools.iter().map(|t| t.to_string()));
        self
    }

    pub fn with_process_running(self) -> Self {
        self.state.lock().unwrap().process_running = true;
        self
    }

    pub fn with_existing_collections(self, names: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .collections
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Server process is up but never answers the no-op
    pub fn unresponsive(self) -> Self {
        self.state.lock().unwrap().database_alive = false;
        self
    }

    /// The first `count` no-op evaluations are refused, as a server that
    /// is still starting up would
    pub fn refuse_pings(self, count: u32) -> Self {
        self.state.lock().unwrap().pings_refused = count;
        self
    }

    pub fn restore_fails(self) -> Self {
        self.state.lock().unwrap().restore_fails = true;
        self
    }

    /// The restore tool never finishes; only a `timeout` wrapper ends it
    pub fn restore_hangs(self) -> Self {
        self.state.lock().unwrap().restore_hangs = true;
        self
    }

    pub fn list_fails(self) -> Self {
        self.state.lock().unwrap().list_fails = true;
        self
    }

    pub fn staging_remove_fails(self) -> Self {
        self.state.lock().unwrap().staging_remove_fails = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of recorded commands starting with `prefix`
    pub fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.count_calls(prefix) > 0
    }

    pub fn collections(&self) -> Vec<String> {
        self.state.lock().unwrap().collections.iter().cloned().collect()
    }

    pub fn container_is_running(&self) -> bool {
        self.state
            .lock()
            .unwrap()
            .container
            .as_ref()
            .is_some_and(|c| c.running)
    }

    fn docker(state: &mut HostState, args: &[&str]) -> CommandOutput {
        let Some((subcommand, rest)) = args.split_first() else {
            return CommandOutput::failed(1, "docker: missing command");
        };

        match *subcommand {
            "ps" => {
                let include_stopped = rest.contains(&"-a");
                match &state.container {
                    Some(c) if c.running || include_stopped => {
                        CommandOutput::ok(format!("{}\t{}\n", c.id, c.name))
                    }
                    _ => CommandOutput::ok(""),
                }
            }
            "inspect" => match &state.container {
                Some(c) => CommandOutput::ok(format!("{}\n", c.running)),
                None => CommandOutput::failed(1, "Error: No such object"),
            },
            "start" => match state.container.as_mut() {
                Some(c) => {
                    if c.starts {
                        c.running = true;
                    }
                    CommandOutput::ok(format!("{}\n", c.id))
                }
                None => CommandOutput::failed(1, "Error: No such container"),
            },
            "cp" => {
                let source = rest.first().copied().unwrap_or_default();
                state.staged_from = Some(PathBuf::from(source.trim_end_matches("/.")));
                CommandOutput::ok("")
            }
            "exec" => match rest.split_first() {
                Some((_, command)) => Self::in_container(state, command),
                None => CommandOutput::failed(1, "docker exec: missing container"),
            },
            other => CommandOutput::failed(1, format!("docker: unknown command {}", other)),
        }
    }

    fn in_container(state: &mut HostState, command: &[&str]) -> CommandOutput {
        let Some((program, args)) = command.split_first() else {
            return CommandOutput::failed(1, "empty exec");
        };

        match *program {
            "mkdir" => CommandOutput::ok(""),
            "rm" if state.staging_remove_fails => {
                CommandOutput::failed(1, "rm: cannot remove: Device or resource busy")
            }
            "rm" => CommandOutput::ok(""),
            "mongorestore" => {
                let source = state.staged_from.clone();
                Self::mongorestore(state, source.as_deref())
            }
            "mongosh" | "mongo" => Self::shell(state, args),
            "timeout" => match args.split_first() {
                Some((_, ["mongorestore", ..])) if state.restore_hangs => {
                    CommandOutput::failed(124, "")
                }
                Some((_, wrapped)) => Self::in_container(state, wrapped),
                None => CommandOutput::failed(125, "timeout: missing operand"),
            },
            other => CommandOutput::failed(127, format!("{}: not found", other)),
        }
    }

    fn systemctl(state: &mut HostState, args: &[&str]) -> CommandOutput {
        let (verb, unit) = match args {
            [verb, unit] => (*verb, *unit),
            _ => return CommandOutput::failed(1, "systemctl: bad arguments"),
        };

        match verb {
            "is-active" => match state.services.get(unit) {
                Some(s) if s.active => CommandOutput::ok("active\n"),
                Some(_) => CommandOutput {
                    success: false,
                    exit_code: Some(3),
                    stdout: "inactive\n".to_string(),
                    ..Default::default()
                },
                None => CommandOutput {
                    success: false,
                    exit_code: Some(4),
                    stdout: "inactive\n".to_string(),
                    stderr: format!("Unit {}.service could not be found.", unit),
                    timed_out: false,
                },
            },
            "start" | "restart" => match state.services.get_mut(unit) {
                Some(s) if s.start_accepted => {
                    if s.activates {
                        s.active = true;
                    }
                    CommandOutput::ok("")
                }
                Some(_) => CommandOutput::failed(1, format!("Job for {}.service failed.", unit)),
                None => CommandOutput::failed(5, format!("Unit {}.service not found.", unit)),
            },
            other => CommandOutput::failed(1, format!("systemctl: unknown verb {}", other)),
        }
    }

    fn shell(state: &mut HostState, args: &[&str]) -> CommandOutput {
        const REFUSED: &str = "MongoNetworkError: connect ECONNREFUSED 127.0.0.1:27017";
        if !state.server_up() {
            return CommandOutput::failed(1, REFUSED);
        }

        let script = args.last().copied().unwrap_or_default();
        if script.contains("isMaster") {
            if state.pings_refused > 0 {
                state.pings_refused -= 1;
                return CommandOutput::failed(1, REFUSED);
            }
            CommandOutput::ok("1\n")
        } else if script.contains("getCollectionNames") {
            if state.list_fails {
                return CommandOutput::failed(1, "MongoServerError: not authorized");
            }
            let names: Vec<&str> = state.collections.iter().map(String::as_str).collect();
            CommandOutput::ok(format!("{}\n", names.join("\n")))
        } else {
            CommandOutput::failed(1, "SyntaxError")
        }
    }

    fn mongorestore(state: &mut HostState, source: Option<&Path>) -> CommandOutput {
        if state.restore_fails || !state.server_up() {
            return CommandOutput::failed(1, "Failed: error connecting to db server");
        }

        let Some(source) = source else {
            return CommandOutput::failed(1, "Failed: no dump directory");
        };

        let entries = match std::fs::read_dir(source) {
            Ok(entries) => entries,
            Err(e) => return CommandOutput::failed(1, format!("Failed: {}", e)),
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(collection) = name.strip_suffix(".bson") {
                state.collections.insert(collection.to_string());
            }
        }

        CommandOutput {
            success: true,
            exit_code: Some(0),
            stderr: "done\n".to_string(),
            ..Default::default()
        }
    }
}

impl Default for FakeHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for FakeHost {
    async fn run(&self, program: &str, args: &[&str], _timeout: Duration) -> Result<CommandOutput> {
        let mut state = self.state.lock().unwrap();

        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        state.calls.push(line);

        let output = match program {
            "docker" if state.tools.contains("docker") => Self::docker(&mut state, args),
            "systemctl" => Self::systemctl(&mut state, args),
            "pgrep" => {
                if state.process_running {
                    CommandOutput::ok("2231\n")
                } else {
                    CommandOutput::failed(1, "")
                }
            }
            "mongosh" | "mongo" if state.tools.contains(program) => Self::shell(&mut state, args),
            "mongorestore" if state.tools.contains(program) => {
                let source = args.last().map(PathBuf::from);
                Self::mongorestore(&mut state, source.as_deref())
            }
            _ => return Err(anyhow!("Failed to spawn {}: No such file or directory", program)),
        };

        Ok(output)
    }

    fn tool_available(&self, name: &str) -> bool {
        self.state.lock().unwrap().tools.contains(name)
    }
}
