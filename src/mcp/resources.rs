//! The registry of resources this server can read.
//!
//! Each resource pairs a static [`ResourceDescriptor`] with a function
//! that renders its body from the live host. Only the editor-state
//! resource is registered by default.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::editor::{build_snapshot, EditorHost};
use crate::error::ResourceError;

/// URI of the editor-state resource.
pub const STATE_URI: &str = "sublime-context://state";

/// MIME type of JSON resource bodies.
pub const JSON_MIME_TYPE: &str = "application/json";

/// Renders a resource body from the host.
pub type RenderFn = fn(&dyn EditorHost) -> Result<String, serde_json::Error>;

/// Static metadata for a resource, as listed by `resources/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescriptor {
    /// Resource URI.
    pub uri: String,
    /// Human-readable name.
    pub name: String,
    /// What the resource contains.
    pub description: String,
    /// MIME type of the body.
    pub mime_type: String,
}

impl ResourceDescriptor {
    /// Descriptor of the editor-state resource.
    #[must_use]
    pub fn editor_state() -> Self {
        Self {
            uri: STATE_URI.to_string(),
            name: "Editor State".to_string(),
            description:
                "Complete editor state with active files per window and other open files"
                    .to_string(),
            mime_type: JSON_MIME_TYPE.to_string(),
        }
    }
}

/// One item of a `resources/read` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// URI that was read.
    pub uri: String,
    /// MIME type of `text`.
    pub mime_type: String,
    /// The rendered body.
    pub text: String,
}

struct Resource {
    descriptor: ResourceDescriptor,
    render: RenderFn,
}

/// Maps resource URIs to descriptors and renderers.
pub struct ResourceRegistry {
    host: Arc<dyn EditorHost>,
    resources: Vec<Resource>,
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.list_resources())
            .finish_non_exhaustive()
    }
}

impl ResourceRegistry {
    /// Creates a registry serving the editor-state resource from `host`.
    #[must_use]
    pub fn new(host: Arc<dyn EditorHost>) -> Self {
        let mut registry = Self::empty(host);
        registry.register(ResourceDescriptor::editor_state(), render_state);
        registry
    }

    /// Creates a registry with no resources.
    #[must_use]
    pub fn empty(host: Arc<dyn EditorHost>) -> Self {
        Self {
            host,
            resources: Vec::new(),
        }
    }

    /// Registers a resource, replacing any existing one with the same URI.
    pub fn register(&mut self, descriptor: ResourceDescriptor, render: RenderFn) {
        self.resources.retain(|r| r.descriptor.uri != descriptor.uri);
        self.resources.push(Resource { descriptor, render });
    }

    /// Descriptors of every registered resource, in registration order.
    #[must_use]
    pub fn list_resources(&self) -> Vec<ResourceDescriptor> {
        self.resources.iter().map(|r| r.descriptor.clone()).collect()
    }

    /// Renders the resource registered under `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownResource`] if nothing is registered
    /// under `uri`, or [`ResourceError::Serialize`] if the body cannot be
    /// encoded.
    pub fn read_resource(&self, uri: &str) -> Result<ResourceContents, ResourceError> {
        let resource = self
            .resources
            .iter()
            .find(|r| r.descriptor.uri == uri)
            .ok_or_else(|| ResourceError::UnknownResource {
                uri: Some(uri.to_string()),
            })?;

        let text = (resource.render)(self.host.as_ref()).map_err(|e| ResourceError::Serialize {
            uri: uri.to_string(),
            source: e,
        })?;

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: resource.descriptor.mime_type.clone(),
            text,
        })
    }
}

/// Renders a fresh snapshot as pretty-printed JSON.
fn render_state(host: &dyn EditorHost) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&build_snapshot(host))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{FixtureHost, HostState, ViewState, WindowState};

    fn registry() -> ResourceRegistry {
        let host = FixtureHost::new(HostState::new(vec![WindowState::new()
            .with_folder("/proj")
            .with_view(ViewState::file("/proj/a.rs"))
            .focused(0)]));
        ResourceRegistry::new(Arc::new(host))
    }

    #[test]
    fn lists_editor_state_resource() {
        let resources = registry().list_resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].uri, STATE_URI);
        assert_eq!(resources[0].mime_type, "application/json");
    }

    #[test]
    fn descriptor_uses_camel_case() {
        let value = serde_json::to_value(ResourceDescriptor::editor_state()).unwrap();
        assert_eq!(value["mimeType"], "application/json");
        assert_eq!(value["name"], "Editor State");
    }

    #[test]
    fn read_state_is_pretty_json() {
        let contents = registry().read_resource(STATE_URI).unwrap();
        assert_eq!(contents.uri, STATE_URI);
        assert!(contents.text.contains("\n  \"activeFiles\""));

        let value: serde_json::Value = serde_json::from_str(&contents.text).unwrap();
        assert_eq!(value["activeFiles"][0]["path"], "/proj/a.rs");
        assert_eq!(value["projectFolders"][0], "/proj");
    }

    #[test]
    fn unknown_uri_is_typed_error() {
        let err = registry().read_resource("sublime-context://other").unwrap_err();
        assert!(matches!(
            err,
            ResourceError::UnknownResource { uri: Some(ref uri) } if uri == "sublime-context://other"
        ));
    }

    #[test]
    fn register_replaces_same_uri() {
        fn render_empty(_: &dyn EditorHost) -> Result<String, serde_json::Error> {
            Ok("{}".to_string())
        }

        let mut registry = registry();
        registry.register(ResourceDescriptor::editor_state(), render_empty);
        assert_eq!(registry.list_resources().len(), 1);
        assert_eq!(registry.read_resource(STATE_URI).unwrap().text, "{}");
    }
}
