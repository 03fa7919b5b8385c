//! Structural checks applied to every loaded descriptor.
//!
//! - Container names are non-empty and unique.
//! - Group names are non-empty and unique within a container.
//! - Groups have at least one member, and every member is an `Element` key.
//! - A key belongs to at most one group per container.
//! - `Child` member values name a declared container.
//! - Attribute keys have kind `Attribute`, are unique, and their default
//!   literals parse against the declared type.

use std::collections::HashSet;

use wfs_types::FeatureKind;

use crate::container::{ContainerSchema, ValueType};
use crate::descriptor::SchemaDescriptor;
use crate::error::{SchemaError, SchemaResult};

pub(crate) fn validate_descriptor(descriptor: &SchemaDescriptor) -> SchemaResult<()> {
    let mut names = HashSet::new();
    for container in &descriptor.containers {
        if container.name.is_empty() {
            return Err(invalid(container, "container name must not be empty"));
        }
        if !names.insert(container.name.as_str()) {
            return Err(invalid(container, "duplicate container name"));
        }
    }

    for container in &descriptor.containers {
        validate_groups(descriptor, container)?;
        validate_attributes(container)?;
    }
    Ok(())
}

fn validate_groups(descriptor: &SchemaDescriptor, container: &ContainerSchema) -> SchemaResult<()> {
    let mut group_names = HashSet::new();
    let mut seen_keys = HashSet::new();

    for group in &container.groups {
        if group.name.is_empty() {
            return Err(invalid(container, "group name must not be empty"));
        }
        if !group_names.insert(group.name.as_str()) {
            return Err(invalid(container, format!("duplicate group {:?}", group.name)));
        }
        if group.members.is_empty() {
            return Err(invalid(container, format!("group {:?} has no members", group.name)));
        }

        for member in &group.members {
            if member.key.kind() != FeatureKind::Element {
                return Err(invalid(
                    container,
                    format!("group {:?} member {} is not an element key", group.name, member.key),
                ));
            }
            if !seen_keys.insert(&member.key) {
                return Err(invalid(
                    container,
                    format!("key {} belongs to more than one group", member.key),
                ));
            }
            if let ValueType::Child(target) = &member.value {
                if !descriptor.contains(target) {
                    return Err(SchemaError::UnknownContainer(target.clone()));
                }
            }
        }
    }
    Ok(())
}

fn validate_attributes(container: &ContainerSchema) -> SchemaResult<()> {
    let mut attribute_names = HashSet::new();

    for attribute in &container.attributes {
        if attribute.key.kind() != FeatureKind::Attribute {
            return Err(invalid(
                container,
                format!("{} is declared as an attribute but has kind {}", attribute.key, attribute.key.kind()),
            ));
        }
        if !attribute_names.insert(attribute.name()) {
            return Err(invalid(container, format!("duplicate attribute {:?}", attribute.name())));
        }
        attribute
            .default_value()
            .map_err(|source| SchemaError::BadDefault {
                container: container.name.clone(),
                attribute: attribute.name().to_string(),
                source,
            })?;
    }
    Ok(())
}

fn invalid(container: &ContainerSchema, reason: impl Into<String>) -> SchemaError {
    SchemaError::Invalid {
        container: container.name.clone(),
        reason: reason.into(),
    }
}
