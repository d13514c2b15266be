//! Read-only access to the host's live scene.
//!
//! The core never touches the scene graph. A host that can count its
//! objects implements [`SceneProbe`] and hands it to the agent; scene
//! analysis then answers with real numbers instead of a script.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Object counts for the current scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneSummary {
    pub objects: usize,
    pub meshes: usize,
    pub lights: usize,
    pub cameras: usize,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Objects: {}, Meshes: {}, Lights: {}, Cameras: {}",
            self.objects, self.meshes, self.lights, self.cameras
        )
    }
}

/// Narrow read-only accessor implemented by the host application.
pub trait SceneProbe: Send + Sync {
    /// Summarize the current scene, or describe why it cannot be read.
    fn summarize(&self) -> Result<SceneSummary, String>;
}
