use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::container::ContainerSchema;
use crate::error::{SchemaError, SchemaResult};

/// The complete set of container schemas for one document set.
///
/// Descriptors are immutable once built. Share them with
/// `Arc<SchemaDescriptor>`; every content list holds an `Arc` of its own
/// container schema.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    /// Human-readable descriptor name (e.g. "wfs").
    pub name: String,
    /// Version of the document set the descriptor covers.
    pub version: String,
    #[serde(default)]
    pub containers: Vec<Arc<ContainerSchema>>,
}

impl Default for SchemaDescriptor {
    fn default() -> Self {
        Self::wfs20()
    }
}

impl SchemaDescriptor {
    /// An empty descriptor.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            containers: Vec::new(),
        }
    }

    pub fn with_container(mut self, container: ContainerSchema) -> Self {
        self.containers.push(Arc::new(container));
        self
    }

    /// Look up a container schema by type name.
    pub fn container(&self, name: &str) -> SchemaResult<&Arc<ContainerSchema>> {
        self.containers
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::UnknownContainer(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.containers.iter().any(|c| c.name == name)
    }

    /// Total number of groups across all containers.
    pub fn group_count(&self) -> usize {
        self.containers.iter().map(|c| c.groups.len()).sum()
    }

    /// Check structural consistency. See the crate docs for the rules.
    pub fn validate(&self) -> SchemaResult<()> {
        crate::validate::validate_descriptor(self)
    }

    // ---------------------------------------------------------------
    // TOML configuration
    // ---------------------------------------------------------------

    /// Parse and validate a descriptor from TOML text.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        let descriptor: Self =
            toml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        descriptor.validate()?;
        debug!(
            name = %descriptor.name,
            containers = descriptor.containers.len(),
            "loaded schema descriptor"
        );
        Ok(descriptor)
    }

    /// Read, parse and validate a descriptor file.
    pub fn load(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Render the descriptor as TOML.
    pub fn to_toml_string(&self) -> SchemaResult<String> {
        toml::to_string_pretty(self).map_err(|e| SchemaError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::container::{ContentModel, GroupDecl, ValueType};
    use wfs_types::FeatureKey;

    const MINIMAL: &str = r#"
name = "roads"
version = "1.0"

[[containers]]
name = "RoadType"
content = "mixed"

[[containers.groups]]
name = "surface"
members = [
    { key = { namespace = "urn:roads", name = "Asphalt", kind = "element" }, value = "text" },
    { key = { namespace = "urn:roads", name = "Gravel", kind = "element" }, value = "text" },
]

[[containers.attributes]]
key = { name = "lanes", kind = "attribute" }
type = "positive_integer"
default = "2"
unsettable = true
"#;

    #[test]
    fn load_minimal_toml() {
        let descriptor = SchemaDescriptor::from_toml_str(MINIMAL).unwrap();
        let road = descriptor.container("RoadType").unwrap();
        assert_eq!(road.content, ContentModel::Mixed);
        let surface = road.group("surface").unwrap();
        assert!(!surface.repeatable);
        assert!(surface.contains(&FeatureKey::element("urn:roads", "Gravel")));
        assert_eq!(surface.members[0].value, ValueType::Text);
        assert!(road.attribute("lanes").unwrap().unsettable);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let descriptor = SchemaDescriptor::load(file.path()).unwrap();
        assert_eq!(descriptor.name, "roads");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = SchemaDescriptor::load("/nonexistent/descriptor.toml").unwrap_err();
        assert!(matches!(err, SchemaError::Io(_)));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = SchemaDescriptor::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, SchemaError::Parse(_)));
    }

    #[test]
    fn builtin_survives_toml_roundtrip() {
        let builtin = SchemaDescriptor::wfs20();
        let text = builtin.to_toml_string().unwrap();
        let parsed = SchemaDescriptor::from_toml_str(&text).unwrap();
        assert_eq!(parsed, builtin);
    }

    #[test]
    fn unknown_container_lookup() {
        let descriptor = SchemaDescriptor::new("empty", "0")
            .with_container(ContainerSchema::new("A", ContentModel::Empty));
        assert!(descriptor.contains("A"));
        assert!(matches!(
            descriptor.container("B"),
            Err(SchemaError::UnknownContainer(name)) if name == "B"
        ));
    }

    #[test]
    fn group_count_sums_containers() {
        let descriptor = SchemaDescriptor::new("t", "0").with_container(
            ContainerSchema::new("A", ContentModel::ElementOnly)
                .with_group(GroupDecl::singleton(FeatureKey::wfs("X"), ValueType::Text))
                .with_group(GroupDecl::singleton(FeatureKey::wfs("Y"), ValueType::Text)),
        );
        assert_eq!(descriptor.group_count(), 2);
    }
}
