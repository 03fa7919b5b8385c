use std::sync::{Arc, Mutex};

use wfs_content::{Change, ContentError, Value};
use wfs_model::*;
use wfs_schema::wfs20;
use wfs_types::{AllSomeType, FeatureKey, QName};

fn recorder(tree: &mut ModelTree) -> Arc<Mutex<Vec<TreeEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    tree.subscribe(move |event: &TreeEvent| sink.lock().unwrap().push(event.clone()));
    events
}

#[test]
fn setting_an_action_slot_evicts_only_its_own_occupant() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let a = Insert::create(&mut tree).unwrap();
    let b = Delete::create(&mut tree).unwrap();
    let c = Update::create(&mut tree).unwrap();

    tx.set_action(&mut tree, 0, Some(a.into())).unwrap();
    tx.set_action(&mut tree, 1, Some(b.into())).unwrap();
    assert_eq!(
        tx.actions(&tree).unwrap(),
        [TransactionAction::Insert(a), TransactionAction::Delete(b)]
    );

    tx.set_action(&mut tree, 0, Some(c.into())).unwrap();
    assert_eq!(
        tx.actions(&tree).unwrap(),
        [TransactionAction::Delete(b), TransactionAction::Update(c)]
    );
    assert_eq!(tx.action(&tree, 0).unwrap(), Some(TransactionAction::Update(c)));
    assert_eq!(tx.action(&tree, 1).unwrap(), Some(TransactionAction::Delete(b)));
    assert!(tree.node(a.id()).unwrap().is_orphan());
    assert_eq!(tree.owner(b.id()).unwrap().unwrap().parent, tx.id());
}

#[test]
fn clearing_a_slot_keeps_siblings_in_order() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let first = Insert::create(&mut tree).unwrap();
    let second = Native::create(&mut tree).unwrap();
    let third = Delete::create(&mut tree).unwrap();
    for action in [TransactionAction::from(first), second.into(), third.into()] {
        tx.push_action(&mut tree, action).unwrap();
    }

    tx.set_action(&mut tree, 1, None).unwrap();
    assert_eq!(
        tx.actions(&tree).unwrap(),
        [TransactionAction::Insert(first), TransactionAction::Delete(third)]
    );
    assert_eq!(tx.action(&tree, 1).unwrap(), None);

    // Clearing an empty slot changes nothing.
    tx.set_action(&mut tree, 1, None).unwrap();
    assert_eq!(tx.actions(&tree).unwrap().len(), 2);
}

#[test]
fn wrong_kind_is_rejected_without_side_effects() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let insert = Insert::create(&mut tree).unwrap();
    tx.push_action(&mut tree, insert).unwrap();

    let list = ValueList::create(&mut tree).unwrap();
    let slot = wfs_content::SlotRef::nth(wfs20::ABSTRACT_TRANSACTION_ACTION, 0);
    let err = tree.set_slot(tx.id(), slot, Some(list.as_value())).unwrap_err();
    assert!(matches!(err, ModelError::Content(ContentError::TypeMismatch { .. })));

    assert_eq!(tx.actions(&tree).unwrap(), [TransactionAction::Insert(insert)]);
    assert!(tree.owner(list.id()).unwrap().is_none());
}

#[test]
fn grouped_keys_cannot_be_appended_raw() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let insert = Insert::create(&mut tree).unwrap();
    let err = tree.append(tx.id(), FeatureKey::wfs("Insert"), insert.as_value()).unwrap_err();
    assert!(matches!(err, ModelError::Content(ContentError::GroupedKey { .. })));
    assert!(tree.content(tx.id()).unwrap().is_empty());
}

#[test]
fn ownership_moves_with_reparent() {
    let mut tree = ModelTree::default();
    let first = Transaction::create(&mut tree).unwrap();
    let second = Transaction::create(&mut tree).unwrap();
    let delete = Delete::create(&mut tree).unwrap();
    first.push_action(&mut tree, delete).unwrap();

    let err = second.push_action(&mut tree, delete).unwrap_err();
    assert!(matches!(err, ModelError::OwnershipViolation { .. }));

    let slot = wfs_content::SlotRef::nth(wfs20::ABSTRACT_TRANSACTION_ACTION, 0);
    tree.reparent(delete.id(), second.id(), Placement::Slot(slot)).unwrap();
    assert!(first.actions(&tree).unwrap().is_empty());
    assert_eq!(second.actions(&tree).unwrap(), [TransactionAction::Delete(delete)]);
    assert_eq!(tree.owner(delete.id()).unwrap().unwrap().parent, second.id());
}

#[test]
fn a_document_cannot_contain_itself() {
    let mut tree = ModelTree::default();
    let outer = AnyNode::create(&mut tree).unwrap();
    let inner = AnyNode::create(&mut tree).unwrap();
    outer
        .append_element(&mut tree, FeatureKey::wildcard("urn:x", "inner"), inner)
        .unwrap();

    let err = tree
        .reparent(outer.id(), inner.id(), Placement::Raw(FeatureKey::wildcard("urn:x", "outer")))
        .unwrap_err();
    assert!(matches!(err, ModelError::CycleDetected { .. }));
    assert_eq!(tree.owner(inner.id()).unwrap().unwrap().parent, outer.id());
}

#[test]
fn evicted_subtrees_are_collected() {
    let mut tree = ModelTree::default();
    let doc = DocumentRoot::create(&mut tree).unwrap();
    let tx = Transaction::create(&mut tree).unwrap();
    let insert = Insert::create(&mut tree).unwrap();
    tx.push_action(&mut tree, insert).unwrap();
    doc.set_transaction(&mut tree, Some(tx)).unwrap();

    let list = ValueList::create(&mut tree).unwrap();
    doc.set_value_list(&mut tree, Some(list)).unwrap();
    assert_eq!(tree.len(), 4);

    assert_eq!(tree.collect_orphans(), 2);
    assert_eq!(tree.len(), 2);
    assert!(!tree.contains(insert.id()));
    assert_eq!(tree.roots(), vec![doc.id()]);
}

#[test]
fn listeners_observe_every_mutation() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let insert = Insert::create(&mut tree).unwrap();
    let update = Update::create(&mut tree).unwrap();
    let events = recorder(&mut tree);

    tx.push_action(&mut tree, insert).unwrap();
    tx.set_action(&mut tree, 0, Some(update.into())).unwrap();
    tx.set_release_action(&mut tree, AllSomeType::Some).unwrap();

    let events = events.lock().unwrap();
    let content: Vec<&Change> = events
        .iter()
        .filter_map(|e| match e {
            TreeEvent::Content { change, .. } => Some(change),
            _ => None,
        })
        .collect();
    assert_eq!(content.len(), 2);
    assert!(matches!(content[1], Change::SlotSet { evicted: 1, .. }));
    assert!(events
        .iter()
        .any(|e| matches!(e, TreeEvent::Detached { child, .. } if *child == insert.id())));
    assert!(matches!(
        events.last(),
        Some(TreeEvent::Attribute { name: "releaseAction", .. })
    ));
}

#[test]
fn listeners_do_not_change_the_outcome() {
    fn build(tree: &mut ModelTree) -> NodeSnapshot {
        let tx = Transaction::create(tree).unwrap();
        let native = Native::create(tree).unwrap();
        native.append_text(tree, "VACUUM").unwrap();
        tx.push_action(tree, native).unwrap();
        tx.set_handle(tree, Some("batch-1".into())).unwrap();
        tree.snapshot(tx.id()).unwrap()
    }

    let mut quiet = ModelTree::default();
    let mut observed = ModelTree::default();
    let events = recorder(&mut observed);
    assert_eq!(build(&mut quiet), build(&mut observed));
    assert!(!events.lock().unwrap().is_empty());

    let mut unsubscribed = ModelTree::default();
    let id = unsubscribed.subscribe(|_: &TreeEvent| panic!("listener was removed"));
    assert!(unsubscribed.unsubscribe(id));
    build(&mut unsubscribed);
}

#[test]
fn unsettable_attributes_report_provenance() {
    let mut tree = ModelTree::default();
    let tx = Transaction::create(&mut tree).unwrap();
    let rows = tree.data(tx.id()).unwrap().attributes();
    let release = rows.iter().find(|r| r.name == "releaseAction").unwrap();
    assert_eq!(release.value, "ALL");
    assert_eq!(release.state, Some(wfs_types::SlotState::Default));

    tx.set_release_action(&mut tree, AllSomeType::All).unwrap();
    assert!(tx.is_release_action_set(&tree).unwrap());
    let rows = tree.data(tx.id()).unwrap().attributes();
    let release = rows.iter().find(|r| r.name == "releaseAction").unwrap();
    assert_eq!(release.state, Some(wfs_types::SlotState::Set));
}

#[test]
fn full_request_survives_json() {
    let mut tree = ModelTree::default();
    let doc = DocumentRoot::create(&mut tree).unwrap();
    doc.set_prefix(&mut tree, "wfs", Some(wfs_types::namespace::WFS.into()))
        .unwrap();
    let tx = Transaction::create(&mut tree).unwrap();
    doc.set_transaction(&mut tree, Some(tx)).unwrap();

    let insert = Insert::create(&mut tree).unwrap();
    let road = AnyNode::create(&mut tree).unwrap();
    road.set_attribute(&mut tree, "gml:id", Some("road.1".into())).unwrap();
    insert.add_feature(&mut tree, QName::new("urn:roads", "Road"), road).unwrap();
    tx.push_action(&mut tree, insert).unwrap();

    let delete = Delete::create(&mut tree).unwrap();
    let filter = AnyNode::create(&mut tree).unwrap();
    delete.set_filter(&mut tree, Some(filter)).unwrap();
    delete
        .set_type_name(&mut tree, Some(QName::prefixed("roads", "Road")))
        .unwrap();
    tx.push_action(&mut tree, delete).unwrap();

    let snapshot = tree.snapshot(doc.id()).unwrap();
    assert_eq!(snapshot.node_count(), 6);
    let json = snapshot.to_json().unwrap();
    let parsed = NodeSnapshot::from_json(&json).unwrap();
    assert_eq!(parsed, snapshot);

    let mut other = ModelTree::default();
    let restored = DocumentRoot::wrap(other.restore(&parsed).unwrap());
    let restored_tx = restored.transaction(&other).unwrap().unwrap();
    let actions = restored_tx.actions(&other).unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[1].element_name(), "Delete");
    assert_eq!(other.snapshot(restored.id()).unwrap(), snapshot);
}

#[test]
fn values_hold_text_or_elements() {
    let mut tree = ModelTree::default();
    let list = ValueList::create(&mut tree).unwrap();
    list.push_value(&mut tree, Value::text("7")).unwrap();
    let err = list.value_as_child::<AnyNode>(&tree, 0).unwrap_err();
    assert!(matches!(err, ModelError::Content(ContentError::TypeMismatch { .. })));
}
