//! Progress commands: status, next, task set, navigate, reset.

use anyhow::{Context, Result, anyhow};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use launchpad_core::SectionRef;
use launchpad_types::progress::ProgressStatus;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Progress dashboard: overall percentage plus one row per task.
pub fn status(state: &AppState, json: bool) -> Result<()> {
    let session = &state.session;
    let catalog = session.catalog();

    if json {
        let sections: Vec<_> = catalog
            .sections()
            .map(|s| {
                let def = catalog.section_def(s);
                let tasks: Vec<_> = catalog
                    .tasks(s)
                    .map(|t| {
                        serde_json::json!({
                            "id": catalog.task_id(t),
                            "title": catalog.task_def(t).title,
                            "status": session.task_status(t),
                        })
                    })
                    .collect();
                serde_json::json!({
                    "id": def.id,
                    "title": def.title,
                    "status": session.section_status(s),
                    "tasks": tasks,
                })
            })
            .collect();
        let out = serde_json::json!({
            "overall_progress": session.overall_progress(),
            "sections": sections,
            "next": session.next_incomplete_task(),
            "data_dir": state.data_dir.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Launchpad progress: {}",
        style("⚡").bold(),
        style(format!("{}%", session.overall_progress())).bold()
    );
    println!();

    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Section").fg(Color::Cyan),
            Cell::new("Task"),
            Cell::new("Status"),
        ]);

    for section in catalog.sections() {
        let def = catalog.section_def(section);
        let label = match &def.icon {
            Some(icon) => format!("{icon} {}", def.title),
            None => def.title.clone(),
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(""),
            status_cell(session.section_status(section)),
        ]);
        for task in catalog.tasks(section) {
            table.add_row(vec![
                Cell::new(""),
                Cell::new(&catalog.task_def(task).title),
                status_cell(session.task_status(task)),
            ]);
        }
    }

    println!("{table}");
    println!();
    Ok(())
}

fn status_cell(status: ProgressStatus) -> Cell {
    let color = match status {
        ProgressStatus::Pending => Color::DarkGrey,
        ProgressStatus::InProgress => Color::Yellow,
        ProgressStatus::Completed => Color::Green,
        ProgressStatus::Error => Color::Red,
    };
    Cell::new(status).fg(color)
}

fn styled_status(status: ProgressStatus) -> String {
    match status {
        ProgressStatus::Pending => style(status).dim().to_string(),
        ProgressStatus::InProgress => style(status).yellow().to_string(),
        ProgressStatus::Completed => style(status).green().to_string(),
        ProgressStatus::Error => style(status).red().to_string(),
    }
}

// ---------------------------------------------------------------------------
// Next
// ---------------------------------------------------------------------------

pub fn next(state: &AppState, json: bool) -> Result<()> {
    let next = state.session.next_incomplete_task();

    if json {
        println!("{}", serde_json::to_string_pretty(&next)?);
        return Ok(());
    }

    println!();
    match next {
        Some(next) => println!(
            "  Next: {} {} {}",
            style(&next.section_title).cyan(),
            style("›").dim(),
            style(&next.task_title).bold()
        ),
        None => println!("  {} Every task is completed.", style("*").green().bold()),
    }
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Task set
// ---------------------------------------------------------------------------

pub fn set_task(
    state: &AppState,
    section: &str,
    task: &str,
    status: &str,
    json: bool,
) -> Result<()> {
    let status: ProgressStatus = status.parse().map_err(|e: String| anyhow!(e))?;
    let task_ref = state
        .session
        .catalog()
        .task(section, task)
        .context("cannot update task")?;

    let changed = state.session.update_task_status(task_ref, status);

    if json {
        let out = serde_json::json!({
            "section": section,
            "task": task,
            "status": status,
            "changed": changed,
            "section_status": state.session.section_status(task_ref.section()),
            "overall_progress": state.session.overall_progress(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    if changed {
        println!(
            "  {} {}/{} is now {}",
            style("*").green().bold(),
            style(section).cyan(),
            style(task).cyan(),
            styled_status(status)
        );
    } else {
        println!(
            "  {}/{} was already {}",
            style(section).cyan(),
            style(task).cyan(),
            styled_status(status)
        );
    }
    println!(
        "  Overall progress: {}",
        style(format!("{}%", state.session.overall_progress())).bold()
    );
    println!();
    Ok(())
}

// ---------------------------------------------------------------------------
// Navigate
// ---------------------------------------------------------------------------

/// Check the navigation gate from the active section to `section`.
pub fn navigate(state: &AppState, section: &str, json: bool) -> Result<()> {
    let target: SectionRef = state
        .session
        .catalog()
        .section(section)
        .context("cannot navigate")?;
    let result = state.session.navigate_to(target);

    if json {
        let out = serde_json::json!({
            "section": section,
            "allowed": result.is_ok(),
            "error": result.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return result.map_err(Into::into);
    }

    match result {
        Ok(()) => {
            println!();
            println!(
                "  {} Section '{}' is open.",
                style("*").green().bold(),
                style(section).cyan()
            );
            println!();
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

pub fn reset(state: &AppState, json: bool) -> Result<()> {
    state.session.reset_progress();

    if json {
        let out = serde_json::json!({ "reset": true });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Progress reset and generated content cleared.",
        style("*").green().bold()
    );
    println!();
    Ok(())
}
