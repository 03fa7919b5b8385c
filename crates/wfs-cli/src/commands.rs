use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use wfs_content::Value;
use wfs_model::{
    AnyNode, Container, Delete, DocumentRoot, Insert, ModelTree, NodeSnapshot, Transaction, Update,
};
use wfs_schema::{ContainerSchema, SchemaDescriptor};
use wfs_types::{namespace, FeatureKey, NodeId, QName, SlotState};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Schema(args) => cmd_schema(args),
        Command::Check(args) => cmd_check(args),
        Command::Groups(args) => cmd_groups(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Demo(args) => cmd_demo(args),
    }
}

fn load_schema(path: Option<&Path>) -> anyhow::Result<SchemaDescriptor> {
    match path {
        Some(path) => SchemaDescriptor::load(path)
            .with_context(|| format!("failed to load schema descriptor {}", path.display())),
        None => Ok(SchemaDescriptor::wfs20()),
    }
}

fn cmd_schema(args: SchemaArgs) -> anyhow::Result<()> {
    let schema = load_schema(args.schema.as_deref())?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&schema)?),
        OutputFormat::Toml => print!("{}", schema.to_toml_string()?),
        OutputFormat::Text => {
            println!("{} {}", schema.name.bold(), schema.version.dimmed());
            for container in &schema.containers {
                print_container(container);
            }
        }
    }
    Ok(())
}

fn print_container(container: &ContainerSchema) {
    println!("\n{} ({:?})", container.name.cyan().bold(), container.content);
    for attribute in &container.attributes {
        let default = attribute
            .default
            .as_deref()
            .map(|d| format!(" = {d}"))
            .unwrap_or_default();
        let marker = if attribute.unsettable { " unsettable".dimmed().to_string() } else { String::new() };
        println!("  @{}: {}{}{}", attribute.name().yellow(), attribute.value_type, default, marker);
    }
    for group in &container.groups {
        print_group(group);
    }
}

fn print_group(group: &wfs_schema::GroupDecl) {
    let kind = if group.repeatable { "repeatable" } else { "choice" };
    println!("  {} [{}]", group.name.green(), kind.dimmed());
    for member in &group.members {
        println!("    {} -> {}", member.key, member.value);
    }
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let schema = load_schema(Some(args.file.as_path()))?;
    println!(
        "{} {} {} is valid",
        "✓".green().bold(),
        schema.name.bold(),
        schema.version
    );
    println!("  Containers: {}", schema.containers.len());
    println!("  Groups: {}", schema.group_count());
    Ok(())
}

fn cmd_groups(args: GroupsArgs) -> anyhow::Result<()> {
    let schema = load_schema(args.schema.as_deref())?;
    let container = schema.container(&args.container)?;
    if container.groups.is_empty() {
        println!("{} declares no groups.", container.name.cyan());
    }
    for group in &container.groups {
        print_group(group);
    }
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let schema = load_schema(args.schema.as_deref())?;
    let text = std::fs::read_to_string(&args.snapshot)
        .with_context(|| format!("failed to read {}", args.snapshot.display()))?;
    let snapshot = NodeSnapshot::from_json(&text)?;

    let mut tree = ModelTree::new(Arc::new(schema));
    let root = tree
        .restore(&snapshot)
        .with_context(|| format!("snapshot {} does not fit the schema", args.snapshot.display()))?;
    print_node(&tree, root, "document", 0)?;
    println!("\n{} nodes", tree.len().to_string().bold());
    Ok(())
}

fn cmd_demo(args: DemoArgs) -> anyhow::Result<()> {
    let (tree, doc) = build_demo()?;
    if args.json {
        println!("{}", tree.snapshot(doc)?.to_json()?);
    } else {
        print_node(&tree, doc, "document", 0)?;
    }
    Ok(())
}

/// A document holding a transaction whose first action was replaced.
fn build_demo() -> anyhow::Result<(ModelTree, NodeId)> {
    let mut tree = ModelTree::default();
    let doc = DocumentRoot::create(&mut tree)?;
    doc.set_prefix(&mut tree, "wfs", Some(namespace::WFS.into()))?;
    doc.set_prefix(&mut tree, "fes", Some(namespace::FES.into()))?;

    let tx = Transaction::create(&mut tree)?;
    tx.set_handle(&mut tree, Some("demo".into()))?;
    doc.set_transaction(&mut tree, Some(tx))?;

    let insert = Insert::create(&mut tree)?;
    let road = AnyNode::create(&mut tree)?;
    road.set_attribute(&mut tree, "gml:id", Some("road.1".into()))?;
    insert.add_feature(&mut tree, QName::new("urn:example:roads", "Road"), road)?;
    tx.push_action(&mut tree, insert)?;

    let delete = Delete::create(&mut tree)?;
    let filter = AnyNode::create(&mut tree)?;
    let rid = AnyNode::create(&mut tree)?;
    rid.set_attribute(&mut tree, "rid", Some("road.7".into()))?;
    filter.append_element(&mut tree, FeatureKey::wildcard(namespace::FES, "ResourceId"), rid)?;
    delete.set_filter(&mut tree, Some(filter))?;
    tx.push_action(&mut tree, delete)?;

    let update = Update::create(&mut tree)?;
    update.set_type_name(&mut tree, Some(QName::prefixed("roads", "Road")))?;
    let property = AnyNode::create(&mut tree)?;
    property.append_text(&mut tree, "lanes=4")?;
    update.push_property(&mut tree, property)?;
    tx.set_action(&mut tree, 0, Some(update.into()))?;

    tree.collect_orphans();
    Ok((tree, doc.id()))
}

fn print_node(tree: &ModelTree, id: NodeId, label: &str, depth: usize) -> anyhow::Result<()> {
    let node = tree.node(id)?;
    let indent = "  ".repeat(depth);
    println!("{indent}{} {}", label.bold(), format!("<{}>", node.container()).cyan());

    for row in node.data().attributes() {
        let marker = match row.state {
            Some(SlotState::Default) => " (default)".dimmed().to_string(),
            Some(SlotState::Cleared) => " (unset)".dimmed().to_string(),
            Some(SlotState::Set) | None => String::new(),
        };
        println!("{indent}  @{} = {}{}", row.name.yellow(), row.value, marker);
    }

    for entry in node.content() {
        let slot = entry
            .slot
            .as_ref()
            .map(|s| format!(" [{s}]").dimmed().to_string())
            .unwrap_or_default();
        match &entry.value {
            Value::Text(text) => println!("{indent}  {}", format!("{text:?}").green()),
            Value::Scalar(scalar) => println!("{indent}  {} = {}{}", entry.key.name(), scalar, slot),
            Value::Child(child) => {
                print_node(tree, child.id, &format!("{}{}", entry.key.name(), slot), depth + 1)?
            }
        }
    }
    Ok(())
}
