use crate::command::RunArgs;
use crate::record::{ContainerRecord, ImageRecord};
use crate::RuntimeError;

/// Capabilities Docky needs from a container engine.
///
/// Mutating calls return the engine's textual output; callers surface it
/// verbatim and do not interpret it.
pub trait ContainerEngine: Send + Sync {
    /// Inspect all `names` in one call. Names the engine does not know are
    /// simply missing from the result.
    fn inspect_containers(&self, names: &[String]) -> Result<Vec<ContainerRecord>, RuntimeError>;

    /// Inspect one image reference, `None` if the engine does not have it.
    fn inspect_image(&self, reference: &str) -> Result<Option<ImageRecord>, RuntimeError>;

    fn run(&self, args: &RunArgs) -> Result<String, RuntimeError>;

    fn start(&self, name: &str) -> Result<String, RuntimeError>;

    fn stop(&self, name: &str) -> Result<String, RuntimeError>;

    fn remove(&self, name: &str) -> Result<String, RuntimeError>;
}
