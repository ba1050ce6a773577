use crate::backend::ContainerEngine;
use crate::command::RunArgs;
use crate::record::{ContainerRecord, ImageRecord};
use crate::RuntimeError;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// One call observed by [`MockEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    InspectContainers(Vec<String>),
    InspectImage(String),
    Run(RunArgs),
    Start(String),
    Stop(String),
    Remove(String),
}

impl EngineCall {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::InspectContainers(_) | Self::InspectImage(_))
    }
}

#[derive(Default)]
struct MockState {
    containers: BTreeMap<String, ContainerRecord>,
    images: BTreeMap<String, ImageRecord>,
    failing: HashSet<String>,
    calls: Vec<EngineCall>,
}

/// In-memory engine that records every call and keeps a simple container
/// table so lifecycle sequences can be observed end to end.
#[derive(Default)]
pub struct MockEngine {
    state: Mutex<MockState>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_container(self, record: ContainerRecord) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.containers.insert(record.name.clone(), record);
        }
        self
    }

    #[must_use]
    pub fn with_image(self, reference: &str, id: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.images.insert(
                reference.to_owned(),
                ImageRecord {
                    reference: reference.to_owned(),
                    id: id.to_owned(),
                },
            );
        }
        self
    }

    /// Make every mutating call against `name` fail.
    #[must_use]
    pub fn failing_on(self, name: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.failing.insert(name.to_owned());
        }
        self
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.state
            .lock()
            .map(|s| s.calls.clone())
            .unwrap_or_default()
    }

    pub fn mutations(&self) -> Vec<EngineCall> {
        self.calls()
            .into_iter()
            .filter(EngineCall::is_mutation)
            .collect()
    }

    pub fn container(&self, name: &str) -> Option<ContainerRecord> {
        self.state
            .lock()
            .ok()
            .and_then(|s| s.containers.get(name).cloned())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MockState>, RuntimeError> {
        self.state
            .lock()
            .map_err(|e| RuntimeError::ExecFailed(format!("mutex poisoned: {e}")))
    }

    fn mutate(
        &self,
        call: EngineCall,
        name: &str,
        apply: impl FnOnce(&mut MockState) -> Result<String, RuntimeError>,
    ) -> Result<String, RuntimeError> {
        let mut state = self.lock()?;
        state.calls.push(call);
        if state.failing.contains(name) {
            return Err(RuntimeError::ExecFailed(format!("mock failure for {name}")));
        }
        apply(&mut *state)
    }
}

fn no_such_container(name: &str) -> RuntimeError {
    RuntimeError::ExecFailed(format!("No such container: {name}"))
}

impl ContainerEngine for MockEngine {
    fn inspect_containers(&self, names: &[String]) -> Result<Vec<ContainerRecord>, RuntimeError> {
        let mut state = self.lock()?;
        state.calls.push(EngineCall::InspectContainers(names.to_vec()));
        Ok(names
            .iter()
            .filter_map(|n| state.containers.get(n).cloned())
            .collect())
    }

    fn inspect_image(&self, reference: &str) -> Result<Option<ImageRecord>, RuntimeError> {
        let mut state = self.lock()?;
        state
            .calls
            .push(EngineCall::InspectImage(reference.to_owned()));
        Ok(state.images.get(reference).cloned())
    }

    fn run(&self, args: &RunArgs) -> Result<String, RuntimeError> {
        self.mutate(EngineCall::Run(args.clone()), &args.name, |state| {
            if state.containers.contains_key(&args.name) {
                return Err(RuntimeError::ExecFailed(format!(
                    "container name {} is already in use",
                    args.name
                )));
            }
            let image_id = state
                .images
                .get(&args.image)
                .map_or_else(|| args.image.clone(), |img| img.id.clone());
            let mut record = ContainerRecord::new(args.name.clone())
                .running(true)
                .with_image_id(&image_id);
            record.volumes_from.extend(args.volumes_from.clone());
            record.env.extend(args.env.iter().cloned());
            state.containers.insert(args.name.clone(), record);
            Ok(format!("mock-{}", args.name))
        })
    }

    fn start(&self, name: &str) -> Result<String, RuntimeError> {
        self.mutate(EngineCall::Start(name.to_owned()), name, |state| {
            let record = state
                .containers
                .get_mut(name)
                .ok_or_else(|| no_such_container(name))?;
            record.running = true;
            Ok(name.to_owned())
        })
    }

    fn stop(&self, name: &str) -> Result<String, RuntimeError> {
        self.mutate(EngineCall::Stop(name.to_owned()), name, |state| {
            let record = state
                .containers
                .get_mut(name)
                .ok_or_else(|| no_such_container(name))?;
            record.running = false;
            record.ports.clear();
            Ok(name.to_owned())
        })
    }

    fn remove(&self, name: &str) -> Result<String, RuntimeError> {
        self.mutate(EngineCall::Remove(name.to_owned()), name, |state| {
            let running = state
                .containers
                .get(name)
                .map(|r| r.running)
                .ok_or_else(|| no_such_container(name))?;
            if running {
                return Err(RuntimeError::ExecFailed(format!(
                    "cannot remove running container {name}"
                )));
            }
            state.containers.remove(name);
            Ok(name.to_owned())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_lifecycle() {
        let engine = MockEngine::new().with_image("nginx", "sha256:ng");

        engine.run(&RunArgs::new("web", "nginx")).unwrap();
        let web = engine.container("web").unwrap();
        assert!(web.running);
        assert_eq!(web.image_id, "sha256:ng");

        assert!(engine.run(&RunArgs::new("web", "nginx")).is_err());
        assert!(engine.remove("web").is_err());

        engine.stop("web").unwrap();
        assert!(!engine.container("web").unwrap().running);

        engine.start("web").unwrap();
        engine.stop("web").unwrap();
        engine.remove("web").unwrap();
        assert!(engine.container("web").is_none());
    }

    #[test]
    fn inspect_omits_unknown_names() {
        let engine = MockEngine::new().with_container(ContainerRecord::new("web"));
        let records = engine
            .inspect_containers(&["web".to_owned(), "ghost".to_owned()])
            .unwrap();
        assert_eq!(records.len(), 1);
        assert!(engine.inspect_image("nope").unwrap().is_none());
    }

    #[test]
    fn records_calls_and_separates_mutations() {
        let engine = MockEngine::new().with_container(ContainerRecord::new("web"));
        engine.inspect_containers(&["web".to_owned()]).unwrap();
        engine.start("web").unwrap();

        assert_eq!(engine.calls().len(), 2);
        assert_eq!(engine.mutations(), vec![EngineCall::Start("web".to_owned())]);
    }

    #[test]
    fn failing_names_reject_mutations() {
        let engine = MockEngine::new()
            .with_container(ContainerRecord::new("web"))
            .failing_on("web");
        assert!(engine.start("web").is_err());
        assert_eq!(engine.mutations().len(), 1);
    }
}
