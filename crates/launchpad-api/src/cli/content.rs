//! Generated content commands.

use anyhow::{Context, Result, anyhow, bail};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde_json::{Map, Value};
use uuid::Uuid;

use launchpad_types::content::{ContentPatch, ContentType, GeneratedContent, NewContent};

use crate::cli::ContentCommand;
use crate::state::AppState;

/// Dispatch a `content` subcommand.
pub fn handle(state: &AppState, action: ContentCommand, json: bool) -> Result<()> {
    match action {
        ContentCommand::List { content_type } => list(state, content_type.as_deref(), json),
        ContentCommand::Add {
            content_type,
            title,
            content,
            metadata,
        } => add(state, &content_type, title, &content, metadata.as_deref(), json),
        ContentCommand::Show { id } => show(state, &id, json),
        ContentCommand::Update {
            id,
            content_type,
            title,
            content,
        } => {
            let patch = ContentPatch {
                content_type: content_type.as_deref().map(parse_type).transpose()?,
                title,
                content: content.as_deref().map(parse_payload),
                metadata: None,
            };
            update(state, &id, patch, json)
        }
        ContentCommand::Remove { id } => remove(state, &id, json),
        ContentCommand::Clear => clear(state, json),
    }
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_type(s: &str) -> Result<ContentType> {
    s.parse().map_err(|e: String| anyhow!(e))
}

fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).with_context(|| format!("'{s}' is not a content id"))
}

/// JSON when the text parses as JSON, a plain string otherwise.
fn parse_payload(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.to_string()))
}

fn parse_metadata(s: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(s).context("metadata must be valid JSON")? {
        Value::Object(map) => Ok(map),
        _ => bail!("metadata must be a JSON object"),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn list(state: &AppState, content_type: Option<&str>, json: bool) -> Result<()> {
    let records = match content_type {
        Some(t) => state.session.content_by_type(parse_type(t)?),
        None => state.session.all_content(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!();
        println!("  No generated content.");
        println!(
            "  Add some with: {}",
            style("lpad content add --type sitemap --title <title> --content <json>").dim()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::Cyan),
            Cell::new("Type"),
            Cell::new("Title"),
            Cell::new("Created"),
        ]);

    for record in &records {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.content_type),
            Cell::new(&record.title),
            Cell::new(record.created.format("%Y-%m-%d %H:%M")),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    Ok(())
}

fn add(
    state: &AppState,
    content_type: &str,
    title: String,
    content: &str,
    metadata: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut record = NewContent::new(parse_type(content_type)?, title, parse_payload(content));
    record.metadata = metadata.map(parse_metadata).transpose()?;

    let id = state.session.add_content(record);

    if json {
        println!("{}", serde_json::to_string_pretty(&state.session.content(id))?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Added {} {}",
        style("*").green().bold(),
        content_type,
        style(id).cyan()
    );
    println!();
    Ok(())
}

fn show(state: &AppState, id: &str, json: bool) -> Result<()> {
    let record = find(state, id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style("Title:").bold(), style(&record.title).cyan());
    println!("  Type:    {}", record.content_type);
    println!("  ID:      {}", record.id);
    println!("  Created: {}", record.created.to_rfc3339());
    if let Some(metadata) = &record.metadata {
        println!("  Metadata: {}", Value::Object(metadata.clone()));
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&record.content)?);
    println!();
    Ok(())
}

fn update(state: &AppState, id: &str, patch: ContentPatch, json: bool) -> Result<()> {
    let uuid = parse_id(id)?;
    if !state.session.update_content(uuid, patch) {
        bail!("content '{id}' not found");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&state.session.content(uuid))?);
        return Ok(());
    }

    println!();
    println!("  {} Updated {}", style("*").green().bold(), style(uuid).cyan());
    println!();
    Ok(())
}

fn remove(state: &AppState, id: &str, json: bool) -> Result<()> {
    let uuid = parse_id(id)?;
    let removed = state.session.remove_content(uuid);

    if json {
        let out = serde_json::json!({ "id": uuid, "removed": removed });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if !removed {
        bail!("content '{id}' not found");
    }
    println!();
    println!("  {} Removed {}", style("*").green().bold(), style(uuid).cyan());
    println!();
    Ok(())
}

fn clear(state: &AppState, json: bool) -> Result<()> {
    let count = state.session.all_content().len();
    state.session.clear_content();

    if json {
        let out = serde_json::json!({ "removed": count });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Removed {} content record(s).",
        style("*").green().bold(),
        count
    );
    println!();
    Ok(())
}

fn find(state: &AppState, id: &str) -> Result<GeneratedContent> {
    let uuid = parse_id(id)?;
    state
        .session
        .content(uuid)
        .ok_or_else(|| anyhow!("content '{id}' not found"))
}
