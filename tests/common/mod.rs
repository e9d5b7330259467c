//! Shared integration-test harness: a scripted parameter source, fixture
//! lookup and a helper for running the built binary.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::process::Output;
use std::sync::Arc;
use std::time::Duration;

use flashreveal::config::RevealConfig;
use flashreveal::observability::EventEmitter;
use flashreveal::random::ParameterSource;
use flashreveal::reveal::RevealMachine;

/// Parameter source that replays scripted flash totals.
///
/// `uniform_int` pops the next total (falling back to `min` once the
/// script runs out); `uniform` returns the midpoint so every particle is
/// in bounds; `index` always picks the first item.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    totals: VecDeque<u32>,
}

impl ScriptedSource {
    pub fn new(totals: impl IntoIterator<Item = u32>) -> Self {
        Self {
            totals: totals.into_iter().collect(),
        }
    }
}

impl ParameterSource for ScriptedSource {
    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        if max <= min { min } else { min + (max - min) / 2.0 }
    }

    fn uniform_int(&mut self, min: u32, _max_exclusive: u32) -> u32 {
        self.totals.pop_front().unwrap_or(min)
    }

    fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then_some(0)
    }
}

/// Config with the given tick period and default everything else.
pub fn config_with_interval(ms: u64) -> RevealConfig {
    RevealConfig {
        flash_interval_ms: ms,
        ..RevealConfig::default()
    }
}

/// Machine whose sessions draw the scripted totals in order.
pub fn scripted_machine(interval_ms: u64, totals: impl IntoIterator<Item = u32>) -> RevealMachine {
    RevealMachine::new(
        &config_with_interval(interval_ms),
        Box::new(ScriptedSource::new(totals)),
    )
    .expect("test config is valid")
}

/// Like [`scripted_machine`], with lifecycle events written to `buf`.
pub fn recorded_machine(
    interval_ms: u64,
    totals: impl IntoIterator<Item = u32>,
    buf: &SharedBuf,
) -> RevealMachine {
    RevealMachine::with_emitter(
        &config_with_interval(interval_ms),
        Box::new(ScriptedSource::new(totals)),
        Arc::new(EventEmitter::new(Box::new(buf.clone()))),
    )
    .expect("test config is valid")
}

/// Advances the paused clock by `d` and lets session tasks catch up.
pub async fn advance(d: Duration) {
    tokio::time::sleep(d).await;
    settle().await;
}

/// Yields enough times for spawned tasks to observe clock changes.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

/// Returns the path to a test fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the `flashreveal` binary to completion and captures its output.
///
/// `FLASHREVEAL_*` variables from the outer environment are cleared so
/// they cannot leak into assertions.
pub fn spawn_command(args: &[&str]) -> Output {
    let mut cmd = std::process::Command::new(env!("CARGO_BIN_EXE_flashreveal"));
    cmd.args(args).env("NO_COLOR", "1");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("FLASHREVEAL_") {
            cmd.env_remove(key);
        }
    }
    cmd.output().expect("failed to run flashreveal")
}

/// Cloneable in-memory writer for capturing JSONL events.
#[derive(Debug, Clone, Default)]
pub struct SharedBuf(pub std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl SharedBuf {
    /// Parsed JSON lines written so far.
    pub fn lines(&self) -> Vec<serde_json::Value> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    /// Events of the given `type`.
    pub fn of_type(&self, ty: &str) -> Vec<serde_json::Value> {
        self.lines()
            .into_iter()
            .filter(|e| e["type"] == ty)
            .collect()
    }
}

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
