// src/testing.rs
// Test doubles for the pipeline's collaborators. Compiled only for tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::checker::Probe;
use crate::pipeline::{Step, StepContext};
use crate::tools::{DocBuildMode, DocBuilder, SourceControl};

#[derive(Clone, Copy)]
enum Behaviour {
    Succeed,
    Fail,
    Host,
}

/// Lifecycle calls shared between steps, as "clean:id", "setup:id", "execute:id".
pub type CallLog = Rc<RefCell<Vec<String>>>;

/// A step that does nothing except succeed, fail or start hosting.
pub struct NamedStep {
    id: &'static str,
    required: &'static [&'static str],
    behaviour: Behaviour,
    log: Option<CallLog>,
}

impl NamedStep {
    fn with(id: &'static str, required: &'static [&'static str], behaviour: Behaviour) -> Self {
        Self {
            id,
            required,
            behaviour,
            log: None,
        }
    }

    pub fn boxed(id: &'static str, required: &'static [&'static str]) -> Box<dyn Step> {
        Box::new(Self::with(id, required, Behaviour::Succeed))
    }

    pub fn failing(id: &'static str) -> Box<dyn Step> {
        Box::new(Self::with(id, &[], Behaviour::Fail))
    }

    pub fn hosting(id: &'static str) -> Box<dyn Step> {
        Box::new(Self::with(id, &[], Behaviour::Host))
    }

    /// A succeeding step that appends its lifecycle calls to `log`.
    pub fn recording(id: &'static str, log: &CallLog) -> Box<dyn Step> {
        let mut step = Self::with(id, &[], Behaviour::Succeed);
        step.log = Some(Rc::clone(log));
        Box::new(step)
    }

    fn record(&self, phase: &str) {
        if let Some(log) = &self.log {
            log.borrow_mut().push(format!("{}:{}", phase, self.id));
        }
    }
}

impl Step for NamedStep {
    fn identifier(&self) -> &'static str {
        self.id
    }

    fn header(&self) -> &'static str {
        self.id
    }

    fn required_steps(&self) -> &'static [&'static str] {
        self.required
    }

    fn setup(&self, _ctx: &StepContext<'_>) -> Result<()> {
        self.record("setup");
        Ok(())
    }

    fn clean(&self, _ctx: &StepContext<'_>) -> Result<()> {
        self.record("clean");
        Ok(())
    }

    fn execute(&self, ctx: &mut StepContext<'_>) -> Result<()> {
        self.record("execute");
        match self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => bail!("{} exploded", self.id),
            Behaviour::Host => {
                ctx.start_hosting();
                Ok(())
            }
        }
    }
}

/// Doc builder that records calls and answers with a fixed result.
pub struct FakeDocBuilder {
    result: bool,
    calls: RefCell<Vec<(PathBuf, DocBuildMode)>>,
}

impl FakeDocBuilder {
    pub fn succeeding() -> Self {
        Self {
            result: true,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn modes(&self) -> Vec<DocBuildMode> {
        self.calls.borrow().iter().map(|(_, mode)| *mode).collect()
    }
}

impl DocBuilder for FakeDocBuilder {
    fn execute(&self, config_path: &Path, mode: DocBuildMode) -> bool {
        self.calls.borrow_mut().push((config_path.to_path_buf(), mode));
        self.result
    }
}

/// Probe answering from a table, with a default for unlisted URLs.
pub struct ScriptedProbe {
    default: u16,
    answers: HashMap<String, u16>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedProbe {
    pub fn new(default: u16) -> Self {
        Self {
            default,
            answers: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with(mut self, url: &str, status: u16) -> Self {
        self.answers.insert(url.to_string(), status);
        self
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.borrow().iter().filter(|u| *u == url).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Probe for ScriptedProbe {
    fn get(&self, url: &str, _timeout: Duration) -> u16 {
        self.calls.borrow_mut().push(url.to_string());
        self.answers.get(url).copied().unwrap_or(self.default)
    }
}

/// Source control that succeeds at everything and logs each operation.
#[derive(Default)]
pub struct FakeGit {
    pub behind: bool,
    pub changes: bool,
    pub fail_clone: bool,
    pub fail_push: bool,
    pub fail_status: bool,
    pub log: RefCell<Vec<String>>,
}

impl FakeGit {
    fn record(&self, entry: String) {
        self.log.borrow_mut().push(entry);
    }

    pub fn operations(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl SourceControl for FakeGit {
    fn clone_repo(&self, uri: &str, dest: &Path, depth: Option<u32>) -> bool {
        self.record(format!("clone {uri} depth={depth:?}"));
        if self.fail_clone {
            return false;
        }
        std::fs::create_dir_all(dest.join(".git")).is_ok()
    }

    fn fetch(&self, _dir: &Path) -> bool {
        self.record("fetch".to_string());
        true
    }

    fn is_behind(&self, _dir: &Path) -> Option<bool> {
        self.record("status".to_string());
        Some(self.behind)
    }

    fn reset_hard(&self, _dir: &Path) -> bool {
        self.record("reset".to_string());
        true
    }

    fn pull(&self, _dir: &Path) -> bool {
        self.record("pull".to_string());
        true
    }

    fn checkout(&self, _dir: &Path, branch: &str) -> bool {
        self.record(format!("checkout {branch}"));
        true
    }

    fn has_changes(&self, _dir: &Path) -> Option<bool> {
        self.record("changes".to_string());
        (!self.fail_status).then_some(self.changes)
    }

    fn head_commit(&self, _dir: &Path) -> Option<String> {
        Some("abc1234".to_string())
    }

    fn add_all(&self, _dir: &Path) -> bool {
        self.record("add".to_string());
        true
    }

    fn commit(&self, _dir: &Path, message: &str) -> bool {
        self.record(format!("commit {message}"));
        true
    }

    fn push(&self, _dir: &Path) -> bool {
        self.record("push".to_string());
        !self.fail_push
    }
}
