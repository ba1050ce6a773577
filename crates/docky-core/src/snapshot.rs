use crate::CoreError;
use docky_runtime::{ContainerEngine, ContainerRecord, ImageRecord};
use docky_schema::Config;
use std::collections::BTreeMap;
use tracing::debug;

/// Point-in-time view of engine state for one batch of names.
///
/// Captured once before a batch runs. The only change made afterwards is
/// evicting a container that was destroyed during the batch.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    containers: BTreeMap<String, ContainerRecord>,
    images: BTreeMap<String, ImageRecord>,
}

impl Snapshot {
    /// Inspect the requested names, their data containers, and the images
    /// they reference.
    pub fn capture(
        engine: &dyn ContainerEngine,
        config: &Config,
        names: &[String],
    ) -> Result<Self, CoreError> {
        let (container_names, image_refs) = working_set(config, names);
        debug!(
            "capturing snapshot: {} containers, {} images",
            container_names.len(),
            image_refs.len()
        );

        let containers = engine.inspect_containers(&container_names)?;
        let mut images = Vec::with_capacity(image_refs.len());
        for reference in &image_refs {
            match engine.inspect_image(reference)? {
                Some(image) => images.push(image),
                None => debug!("image {reference} not present in engine"),
            }
        }

        Ok(Self::from_parts(containers, images))
    }

    pub fn from_parts(
        containers: impl IntoIterator<Item = ContainerRecord>,
        images: impl IntoIterator<Item = ImageRecord>,
    ) -> Self {
        Self {
            containers: containers
                .into_iter()
                .map(|c| (c.name.clone(), c))
                .collect(),
            images: images
                .into_iter()
                .map(|i| (i.reference.clone(), i))
                .collect(),
        }
    }

    pub fn container(&self, name: &str) -> Option<&ContainerRecord> {
        self.containers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.containers.contains_key(name)
    }

    pub fn image(&self, reference: &str) -> Option<&ImageRecord> {
        self.images.get(reference)
    }

    pub(crate) fn evict(&mut self, name: &str) -> Option<ContainerRecord> {
        debug!("evicting {name} from snapshot");
        self.containers.remove(name)
    }
}

/// Container names and image references to inspect for `names`.
///
/// Each requested name is followed by its data container; both lists keep
/// first-seen order without duplicates.
pub fn working_set(config: &Config, names: &[String]) -> (Vec<String>, Vec<String>) {
    fn push_unique(list: &mut Vec<String>, value: String) {
        if !list.contains(&value) {
            list.push(value);
        }
    }

    let mut containers = Vec::new();
    let mut images = Vec::new();

    for name in names {
        push_unique(&mut containers, name.clone());
        let Some(spec) = config.get(name) else {
            continue;
        };
        if let Some(image) = &spec.image {
            push_unique(&mut images, image.clone());
        }
        if let Some(data) = spec.data_container() {
            push_unique(&mut containers, data);
        }
    }

    (containers, images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use docky_runtime::{EngineCall, MockEngine};
    use docky_schema::parse_config_str;

    fn config() -> Config {
        parse_config_str(
            r#"
web:
  image: "app:v1"
  data: true
worker:
  image: "app:v1"
  data: web-data
db:
  image: postgres
"#,
        )
        .unwrap()
    }

    #[test]
    fn working_set_expands_data_containers_and_images() {
        let names = vec!["web".to_owned(), "worker".to_owned(), "ghost".to_owned()];
        let (containers, images) = working_set(&config(), &names);
        assert_eq!(containers, vec!["web", "web-data", "worker", "ghost"]);
        assert_eq!(images, vec!["app:v1"]);
    }

    #[test]
    fn capture_batches_container_inspection() {
        let engine = MockEngine::new()
            .with_container(ContainerRecord::new("web").running(true))
            .with_image("app:v1", "sha256:app");
        let names = vec!["web".to_owned(), "db".to_owned()];

        let snapshot = Snapshot::capture(&engine, &config(), &names).unwrap();

        assert!(snapshot.contains("web"));
        assert!(!snapshot.contains("web-data"));
        assert!(!snapshot.contains("db"));
        assert_eq!(snapshot.image("app:v1").unwrap().id, "sha256:app");
        assert!(snapshot.image("postgres").is_none());

        let calls = engine.calls();
        assert_eq!(
            calls[0],
            EngineCall::InspectContainers(vec![
                "web".to_owned(),
                "web-data".to_owned(),
                "db".to_owned()
            ])
        );
        assert_eq!(calls.len(), 3);
        assert!(engine.mutations().is_empty());
    }

    #[test]
    fn evict_removes_only_named_entry() {
        let mut snapshot = Snapshot::from_parts(
            [ContainerRecord::new("web"), ContainerRecord::new("web-data")],
            Vec::new(),
        );
        assert!(snapshot.evict("web").is_some());
        assert!(!snapshot.contains("web"));
        assert!(snapshot.contains("web-data"));
        assert!(snapshot.evict("web").is_none());
    }
}
