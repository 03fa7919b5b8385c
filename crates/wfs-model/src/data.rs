//! Per-container node payloads.
//!
//! Every node carries a [`NodeData`] variant matching its container type.
//! Attributes are plain fields: optional attributes are `Option`s and
//! defaulted attributes are [`Unsettable`] slots seeded from the schema.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use wfs_schema::{wfs20, ContainerSchema};
use wfs_types::{AllSomeType, QName, Scalar, SlotState, TypeError, Unsettable};

use crate::error::ModelResult;

/// Attributes shared by every WFS request element.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestAttributes {
    pub service: Unsettable<String>,
    pub version: Unsettable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
}

impl RequestAttributes {
    fn from_schema(schema: &ContainerSchema) -> ModelResult<Self> {
        Ok(Self {
            service: string_default(schema, "service")?,
            version: string_default(schema, "version")?,
            handle: None,
        })
    }
}

/// Namespace bindings and schema locations of a document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRootData {
    /// `xmlns` prefix to namespace URI, in declaration order.
    #[serde(default)]
    pub prefixes: IndexMap<String, String>,
    /// `xsi:schemaLocation` namespace URI to location, in declaration order.
    #[serde(default)]
    pub schema_locations: IndexMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionData {
    pub request: RequestAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<String>,
    pub release_action: Unsettable<AllSomeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs_name: Option<String>,
}

/// Attributes of `wfs:Insert` and `wfs:Replace`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureActionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub input_format: Unsettable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<QName>,
    pub input_format: Unsettable<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srs_name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<QName>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_id: Option<String>,
    /// Required in documents; reads as `false` until assigned.
    pub safe_to_ignore: Unsettable<bool>,
}

/// Attributes shared by `wfs:LockFeature` and `wfs:GetFeatureWithLock`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockData {
    pub request: RequestAttributes,
    /// Lock duration in seconds.
    pub expiry: Unsettable<i64>,
    pub lock_action: Unsettable<AllSomeType>,
}

impl LockData {
    fn from_schema(schema: &ContainerSchema) -> ModelResult<Self> {
        Ok(Self {
            request: RequestAttributes::from_schema(schema)?,
            expiry: schema_default(schema, "expiry", 0, Scalar::as_integer)?,
            lock_action: all_some_default(schema, "lockAction")?,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockFeatureData {
    pub lock: LockData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_id: Option<String>,
}

/// Payload of containers without a typed model, `AnyType` included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericData {
    pub container: String,
    #[serde(default)]
    pub attributes: IndexMap<String, String>,
}

/// The payload of one node, tagged by container type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "container", content = "attributes")]
pub enum NodeData {
    DocumentRoot(DocumentRootData),
    #[serde(rename = "TransactionType")]
    Transaction(TransactionData),
    #[serde(rename = "InsertType")]
    Insert(FeatureActionData),
    #[serde(rename = "UpdateType")]
    Update(UpdateData),
    #[serde(rename = "DeleteType")]
    Delete(DeleteData),
    #[serde(rename = "ReplaceType")]
    Replace(FeatureActionData),
    #[serde(rename = "NativeType")]
    Native(NativeData),
    #[serde(rename = "ValueListType")]
    ValueList,
    #[serde(rename = "LockFeatureType")]
    LockFeature(LockFeatureData),
    #[serde(rename = "GetFeatureWithLockType")]
    GetFeatureWithLock(LockData),
    Generic(GenericData),
}

impl NodeData {
    /// A fresh payload for `schema`, with unsettable attributes seeded from
    /// the schema defaults.
    pub fn for_container(schema: &ContainerSchema) -> ModelResult<Self> {
        let data = match schema.name.as_str() {
            wfs20::DOCUMENT_ROOT => Self::DocumentRoot(DocumentRootData::default()),
            wfs20::TRANSACTION_TYPE => Self::Transaction(TransactionData {
                request: RequestAttributes::from_schema(schema)?,
                lock_id: None,
                release_action: all_some_default(schema, "releaseAction")?,
                srs_name: None,
            }),
            wfs20::INSERT_TYPE => Self::Insert(FeatureActionData::from_schema(schema)?),
            wfs20::UPDATE_TYPE => Self::Update(UpdateData {
                handle: None,
                type_name: None,
                input_format: string_default(schema, "inputFormat")?,
                srs_name: None,
            }),
            wfs20::DELETE_TYPE => Self::Delete(DeleteData::default()),
            wfs20::REPLACE_TYPE => Self::Replace(FeatureActionData::from_schema(schema)?),
            wfs20::NATIVE_TYPE => Self::Native(NativeData {
                vendor_id: None,
                safe_to_ignore: schema_default(schema, "safeToIgnore", false, Scalar::as_bool)?,
            }),
            wfs20::VALUE_LIST_TYPE => Self::ValueList,
            wfs20::LOCK_FEATURE_TYPE => Self::LockFeature(LockFeatureData {
                lock: LockData::from_schema(schema)?,
                lock_id: None,
            }),
            wfs20::GET_FEATURE_WITH_LOCK_TYPE => {
                Self::GetFeatureWithLock(LockData::from_schema(schema)?)
            }
            other => Self::Generic(GenericData {
                container: other.to_string(),
                attributes: IndexMap::new(),
            }),
        };
        Ok(data)
    }

    /// Name of the container type this payload belongs to.
    pub fn container_name(&self) -> &str {
        match self {
            Self::DocumentRoot(_) => wfs20::DOCUMENT_ROOT,
            Self::Transaction(_) => wfs20::TRANSACTION_TYPE,
            Self::Insert(_) => wfs20::INSERT_TYPE,
            Self::Update(_) => wfs20::UPDATE_TYPE,
            Self::Delete(_) => wfs20::DELETE_TYPE,
            Self::Replace(_) => wfs20::REPLACE_TYPE,
            Self::Native(_) => wfs20::NATIVE_TYPE,
            Self::ValueList => wfs20::VALUE_LIST_TYPE,
            Self::LockFeature(_) => wfs20::LOCK_FEATURE_TYPE,
            Self::GetFeatureWithLock(_) => wfs20::GET_FEATURE_WITH_LOCK_TYPE,
            Self::Generic(generic) => &generic.container,
        }
    }

    /// Every attribute that has a value, in schema order.
    pub fn attributes(&self) -> Vec<AttributeRow> {
        let mut rows = Vec::new();
        match self {
            Self::DocumentRoot(_) | Self::ValueList => {}
            Self::Transaction(t) => {
                request_rows(&mut rows, &t.request);
                optional(&mut rows, "lockId", t.lock_id.as_ref());
                unsettable(&mut rows, "releaseAction", &t.release_action);
                optional(&mut rows, "srsName", t.srs_name.as_ref());
            }
            Self::Insert(a) | Self::Replace(a) => {
                optional(&mut rows, "handle", a.handle.as_ref());
                unsettable(&mut rows, "inputFormat", &a.input_format);
                optional(&mut rows, "srsName", a.srs_name.as_ref());
            }
            Self::Update(u) => {
                optional(&mut rows, "handle", u.handle.as_ref());
                optional(&mut rows, "typeName", u.type_name.as_ref());
                unsettable(&mut rows, "inputFormat", &u.input_format);
                optional(&mut rows, "srsName", u.srs_name.as_ref());
            }
            Self::Delete(d) => {
                optional(&mut rows, "handle", d.handle.as_ref());
                optional(&mut rows, "typeName", d.type_name.as_ref());
            }
            Self::Native(n) => {
                optional(&mut rows, "vendorId", n.vendor_id.as_ref());
                unsettable(&mut rows, "safeToIgnore", &n.safe_to_ignore);
            }
            Self::LockFeature(l) => {
                lock_rows(&mut rows, &l.lock);
                optional(&mut rows, "lockId", l.lock_id.as_ref());
            }
            Self::GetFeatureWithLock(l) => lock_rows(&mut rows, l),
            Self::Generic(g) => rows.extend(g.attributes.iter().map(|(name, value)| AttributeRow {
                name: name.clone(),
                value: value.clone(),
                state: None,
            })),
        }
        rows
    }
}

impl FeatureActionData {
    fn from_schema(schema: &ContainerSchema) -> ModelResult<Self> {
        Ok(Self {
            handle: None,
            input_format: string_default(schema, "inputFormat")?,
            srs_name: None,
        })
    }
}

/// One attribute as rendered for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeRow {
    pub name: String,
    pub value: String,
    /// Provenance for unsettable attributes; `None` for plain ones.
    pub state: Option<SlotState>,
}

fn optional(rows: &mut Vec<AttributeRow>, name: &str, value: Option<&impl ToString>) {
    if let Some(value) = value {
        rows.push(AttributeRow {
            name: name.to_string(),
            value: value.to_string(),
            state: None,
        });
    }
}

fn unsettable<T: ToString>(rows: &mut Vec<AttributeRow>, name: &str, slot: &Unsettable<T>) {
    rows.push(AttributeRow {
        name: name.to_string(),
        value: slot.get().to_string(),
        state: Some(slot.state()),
    });
}

fn request_rows(rows: &mut Vec<AttributeRow>, request: &RequestAttributes) {
    unsettable(rows, "service", &request.service);
    unsettable(rows, "version", &request.version);
    optional(rows, "handle", request.handle.as_ref());
}

fn lock_rows(rows: &mut Vec<AttributeRow>, lock: &LockData) {
    request_rows(rows, &lock.request);
    unsettable(rows, "expiry", &lock.expiry);
    unsettable(rows, "lockAction", &lock.lock_action);
}

// ---------------------------------------------------------------
// Schema defaults
// ---------------------------------------------------------------

fn schema_default<T>(
    schema: &ContainerSchema,
    name: &str,
    fallback: T,
    convert: impl FnOnce(&Scalar) -> Option<T>,
) -> ModelResult<Unsettable<T>> {
    let default = match schema.attribute_default(name)? {
        Some(scalar) => convert(&scalar).ok_or_else(|| TypeError::InvalidLiteral {
            type_name: format!("{}@{name}", schema.name),
            literal: scalar.to_string(),
        })?,
        None => fallback,
    };
    Ok(Unsettable::new(default))
}

fn string_default(schema: &ContainerSchema, name: &str) -> ModelResult<Unsettable<String>> {
    schema_default(schema, name, String::new(), |s| s.as_str().map(str::to_string))
}

fn all_some_default(schema: &ContainerSchema, name: &str) -> ModelResult<Unsettable<AllSomeType>> {
    schema_default(schema, name, AllSomeType::default(), |s| {
        s.as_str().and_then(|literal| literal.parse().ok())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfs_schema::SchemaDescriptor;

    fn data_for(container: &str) -> NodeData {
        let schema = SchemaDescriptor::wfs20();
        NodeData::for_container(schema.container(container).unwrap()).unwrap()
    }

    #[test]
    fn transaction_defaults_come_from_schema() {
        let NodeData::Transaction(t) = data_for(wfs20::TRANSACTION_TYPE) else {
            panic!("expected transaction data");
        };
        assert_eq!(*t.release_action.get(), AllSomeType::All);
        assert!(!t.release_action.is_set());
        assert_eq!(t.request.service.get(), "WFS");
        assert_eq!(t.request.version.get(), "2.0.0");
    }

    #[test]
    fn lock_expiry_defaults_to_five_minutes() {
        let NodeData::GetFeatureWithLock(lock) = data_for(wfs20::GET_FEATURE_WITH_LOCK_TYPE) else {
            panic!("expected lock data");
        };
        assert_eq!(*lock.expiry.get(), 300);
        assert_eq!(*lock.lock_action.get(), AllSomeType::All);
    }

    #[test]
    fn native_safe_to_ignore_reads_false() {
        let NodeData::Native(native) = data_for(wfs20::NATIVE_TYPE) else {
            panic!("expected native data");
        };
        assert!(!*native.safe_to_ignore.get());
        assert_eq!(native.safe_to_ignore.state(), SlotState::Default);
    }

    #[test]
    fn unknown_containers_are_generic() {
        let data = data_for(wfs20::ANY_TYPE);
        assert_eq!(data.container_name(), wfs20::ANY_TYPE);
        assert!(data.attributes().is_empty());
    }

    #[test]
    fn attribute_rows_report_provenance() {
        let NodeData::Insert(mut insert) = data_for(wfs20::INSERT_TYPE) else {
            panic!("expected insert data");
        };
        insert.handle = Some("h1".into());
        insert.input_format.set("text/xml".into());
        let rows = NodeData::Insert(insert).attributes();
        let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["handle", "inputFormat"]);
        assert_eq!(rows[1].state, Some(SlotState::Set));
        assert_eq!(rows[1].value, "text/xml");
    }

    #[test]
    fn serde_tags_by_container_name() {
        let json = serde_json::to_value(data_for(wfs20::VALUE_LIST_TYPE)).unwrap();
        assert_eq!(json["container"], "ValueListType");
        let parsed: NodeData = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, NodeData::ValueList);
    }
}
