//! Built-in descriptor for the WFS 2.0 document set.
//!
//! Element and attribute names follow the WFS 2.0 XML Schema exactly so that
//! feature keys round-trip with documents produced elsewhere.

use wfs_types::{namespace, AllSomeType, FeatureKey, ScalarType};

use crate::container::{AttributeDecl, ContainerSchema, ContentModel, GroupDecl, MemberDecl, ValueType};
use crate::descriptor::SchemaDescriptor;

pub const DOCUMENT_ROOT: &str = "DocumentRoot";
pub const TRANSACTION_TYPE: &str = "TransactionType";
pub const INSERT_TYPE: &str = "InsertType";
pub const UPDATE_TYPE: &str = "UpdateType";
pub const DELETE_TYPE: &str = "DeleteType";
pub const REPLACE_TYPE: &str = "ReplaceType";
pub const NATIVE_TYPE: &str = "NativeType";
pub const VALUE_LIST_TYPE: &str = "ValueListType";
pub const LOCK_FEATURE_TYPE: &str = "LockFeatureType";
pub const GET_FEATURE_WITH_LOCK_TYPE: &str = "GetFeatureWithLockType";
/// Container type of arbitrary elements admitted by wildcards.
pub const ANY_TYPE: &str = "AnyType";

/// The single choice of document element under `DocumentRoot`.
pub const ROOT_ELEMENT: &str = "RootElement";
pub const ABSTRACT_TRANSACTION_ACTION: &str = "AbstractTransactionAction";
pub const ABSTRACT_QUERY_EXPRESSION: &str = "AbstractQueryExpression";
pub const VALUE: &str = "Value";
pub const PROPERTY: &str = "Property";
pub const FILTER: &str = "Filter";

pub const DEFAULT_FORMAT: &str = "application/gml+xml; version=3.2";
pub const DEFAULT_EXPIRY: &str = "300";

/// The transaction actions, in schema order, with their container types.
pub const TRANSACTION_ACTIONS: [(&str, &str); 5] = [
    ("Insert", INSERT_TYPE),
    ("Update", UPDATE_TYPE),
    ("Delete", DELETE_TYPE),
    ("Replace", REPLACE_TYPE),
    ("Native", NATIVE_TYPE),
];

/// Global elements that may appear as the document element, with their types.
pub const GLOBAL_ELEMENTS: [(&str, &str); 10] = [
    ("Transaction", TRANSACTION_TYPE),
    ("Insert", INSERT_TYPE),
    ("Update", UPDATE_TYPE),
    ("Delete", DELETE_TYPE),
    ("Replace", REPLACE_TYPE),
    ("Native", NATIVE_TYPE),
    ("ValueList", VALUE_LIST_TYPE),
    ("LockFeature", LOCK_FEATURE_TYPE),
    ("GetFeatureWithLock", GET_FEATURE_WITH_LOCK_TYPE),
    ("Value", ANY_TYPE),
];

/// The remaining global elements. None has a typed container here; each
/// holds an `AnyType` node. The abstract `AbstractTransactionAction` head is
/// left out since it never appears in an instance document.
pub const UNTYPED_GLOBAL_ELEMENTS: [&str; 32] = [
    "Abstract",
    "additionalObjects",
    "additionalValues",
    "boundedBy",
    "CreateStoredQuery",
    "CreateStoredQueryResponse",
    "DescribeFeatureType",
    "DescribeStoredQueries",
    "DescribeStoredQueriesResponse",
    "DropStoredQuery",
    "DropStoredQueryResponse",
    "Element",
    "FeatureCollection",
    "SimpleFeatureCollection",
    "FeatureTypeList",
    "GetCapabilities",
    "GetFeature",
    "GetPropertyValue",
    "ListStoredQueries",
    "ListStoredQueriesResponse",
    "LockFeatureResponse",
    "member",
    "Property",
    "PropertyName",
    "Query",
    "StoredQuery",
    "Title",
    "TransactionResponse",
    "truncatedResponse",
    "Tuple",
    "ValueCollection",
    "WFS_Capabilities",
];

fn all_some() -> ScalarType {
    ScalarType::Enumeration(AllSomeType::LITERALS.iter().map(|l| l.to_string()).collect())
}

fn child(container: &str) -> ValueType {
    ValueType::Child(container.to_string())
}

fn base_request(container: ContainerSchema) -> ContainerSchema {
    container
        .with_attribute(AttributeDecl::unsettable("service", ScalarType::String, Some("WFS")))
        .with_attribute(AttributeDecl::unsettable("version", ScalarType::String, Some("2.0.0")))
        .with_attribute(AttributeDecl::optional("handle", ScalarType::String))
}

fn filter_group() -> GroupDecl {
    GroupDecl::singleton(FeatureKey::element(namespace::FES, FILTER), ValueType::Any)
}

fn query_expressions() -> GroupDecl {
    GroupDecl::repeatable(
        ABSTRACT_QUERY_EXPRESSION,
        vec![
            MemberDecl::new(FeatureKey::wfs("Query"), ValueType::Any),
            MemberDecl::new(FeatureKey::wfs("StoredQuery"), ValueType::Any),
        ],
    )
}

fn lock_attributes(container: ContainerSchema) -> ContainerSchema {
    container
        .with_attribute(AttributeDecl::unsettable(
            "expiry",
            ScalarType::PositiveInteger,
            Some(DEFAULT_EXPIRY),
        ))
        .with_attribute(AttributeDecl::unsettable("lockAction", all_some(), Some("ALL")))
}

impl SchemaDescriptor {
    /// The built-in WFS 2.0 descriptor.
    pub fn wfs20() -> Self {
        let document_root = ContainerSchema::new(DOCUMENT_ROOT, ContentModel::Mixed).with_group(
            GroupDecl::choice(
                ROOT_ELEMENT,
                GLOBAL_ELEMENTS
                    .iter()
                    .map(|(name, container)| {
                        let value = if *container == ANY_TYPE { ValueType::Any } else { child(container) };
                        MemberDecl::new(FeatureKey::wfs(*name), value)
                    })
                    .chain(
                        UNTYPED_GLOBAL_ELEMENTS
                            .iter()
                            .map(|name| MemberDecl::new(FeatureKey::wfs(*name), ValueType::Any)),
                    )
                    .collect(),
            ),
        );

        let transaction = base_request(ContainerSchema::new(TRANSACTION_TYPE, ContentModel::ElementOnly))
            .with_group(GroupDecl::repeatable(
                ABSTRACT_TRANSACTION_ACTION,
                TRANSACTION_ACTIONS
                    .iter()
                    .map(|(name, container)| MemberDecl::new(FeatureKey::wfs(*name), child(container)))
                    .collect(),
            ))
            .with_attribute(AttributeDecl::optional("lockId", ScalarType::String))
            .with_attribute(AttributeDecl::unsettable("releaseAction", all_some(), Some("ALL")))
            .with_attribute(AttributeDecl::optional("srsName", ScalarType::AnyUri));

        let insert = ContainerSchema::new(INSERT_TYPE, ContentModel::ElementOnly)
            .with_attribute(AttributeDecl::optional("handle", ScalarType::String))
            .with_attribute(AttributeDecl::unsettable(
                "inputFormat",
                ScalarType::String,
                Some(DEFAULT_FORMAT),
            ))
            .with_attribute(AttributeDecl::optional("srsName", ScalarType::AnyUri));

        let update = ContainerSchema::new(UPDATE_TYPE, ContentModel::ElementOnly)
            .with_group(GroupDecl::repeatable(
                PROPERTY,
                vec![MemberDecl::new(FeatureKey::wfs(PROPERTY), ValueType::Any)],
            ))
            .with_group(filter_group())
            .with_attribute(AttributeDecl::optional("handle", ScalarType::String))
            .with_attribute(AttributeDecl::optional("typeName", ScalarType::QName))
            .with_attribute(AttributeDecl::unsettable(
                "inputFormat",
                ScalarType::String,
                Some(DEFAULT_FORMAT),
            ))
            .with_attribute(AttributeDecl::optional("srsName", ScalarType::AnyUri));

        let delete = ContainerSchema::new(DELETE_TYPE, ContentModel::ElementOnly)
            .with_group(filter_group())
            .with_attribute(AttributeDecl::optional("handle", ScalarType::String))
            .with_attribute(AttributeDecl::optional("typeName", ScalarType::QName));

        let replace = ContainerSchema::new(REPLACE_TYPE, ContentModel::ElementOnly)
            .with_group(filter_group())
            .with_attribute(AttributeDecl::optional("handle", ScalarType::String))
            .with_attribute(AttributeDecl::unsettable(
                "inputFormat",
                ScalarType::String,
                Some(DEFAULT_FORMAT),
            ))
            .with_attribute(AttributeDecl::optional("srsName", ScalarType::AnyUri));

        let native = ContainerSchema::new(NATIVE_TYPE, ContentModel::Mixed)
            .with_attribute(AttributeDecl::optional("vendorId", ScalarType::String))
            .with_attribute(AttributeDecl::unsettable("safeToIgnore", ScalarType::Boolean, None));

        let value_list = ContainerSchema::new(VALUE_LIST_TYPE, ContentModel::ElementOnly).with_group(
            GroupDecl::repeatable(VALUE, vec![MemberDecl::new(FeatureKey::wfs(VALUE), ValueType::Any)]),
        );

        let lock_feature = lock_attributes(base_request(ContainerSchema::new(
            LOCK_FEATURE_TYPE,
            ContentModel::ElementOnly,
        )))
        .with_group(query_expressions())
        .with_attribute(AttributeDecl::optional("lockId", ScalarType::String));

        let get_feature_with_lock = lock_attributes(base_request(ContainerSchema::new(
            GET_FEATURE_WITH_LOCK_TYPE,
            ContentModel::ElementOnly,
        )))
        .with_group(query_expressions());

        let any = ContainerSchema::new(ANY_TYPE, ContentModel::Mixed);

        Self::new("wfs", "2.0.0")
            .with_container(document_root)
            .with_container(transaction)
            .with_container(insert)
            .with_container(update)
            .with_container(delete)
            .with_container(replace)
            .with_container(native)
            .with_container(value_list)
            .with_container(lock_feature)
            .with_container(get_feature_with_lock)
            .with_container(any)
    }
}
