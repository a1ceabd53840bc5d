use std::fs::File;
use std::path::Path;

use chrono::Utc;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use concord_core::{
    export_to_dir, Category, ItemCatalog, Nav, SessionController, SessionError, SessionPhase,
};

use crate::cli::args::CodeArgs;
use crate::exit_codes::{CONFIG_ERROR, INTERRUPTED, OK};

pub fn run(args: CodeArgs) -> anyhow::Result<i32> {
    // A session cannot start without a catalog; fail before any prompt.
    let catalog = match ItemCatalog::from_path(&args.data) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("error: {e}");
            return Ok(CONFIG_ERROR);
        }
    };
    println!("Loaded {} items from {}", catalog.len(), args.data.display());

    let mut session = SessionController::new(catalog);

    if let Some(path) = &args.resume {
        let result = File::open(path)
            .map_err(SessionError::from)
            .and_then(|file| session.resume_import(file));
        match result {
            Ok(report) => println!("{}", report.message),
            // Recoverable: report and continue with a fresh session.
            Err(e) => eprintln!("cannot load previous session ({e}); starting fresh"),
        }
    }

    match interactive_loop(&mut session, &args.output) {
        Ok(code) => Ok(code),
        Err(_) => {
            eprintln!("session aborted");
            Ok(INTERRUPTED)
        }
    }
}

fn interactive_loop(
    session: &mut SessionController,
    output_dir: &Path,
) -> dialoguer::Result<i32> {
    let theme = ColorfulTheme::default();

    while session.coder_id().is_none() {
        let name: String = Input::with_theme(&theme)
            .with_prompt("Your name (locked after first save)")
            .interact_text()?;
        if let Err(e) = session.set_coder_id(&name) {
            eprintln!("{e}");
        }
    }

    // Judgments imported via --resume are already on disk somewhere.
    let mut dirty = false;

    loop {
        match session.phase() {
            SessionPhase::Browsing => {
                let Some(item) = session.current_item().cloned() else {
                    session.navigate(Nav::Goto(0));
                    continue;
                };
                print_item(session, &item);

                let action = Select::with_theme(&theme)
                    .with_prompt("Action")
                    .items(&[
                        "Save judgment",
                        "Previous",
                        "Skip",
                        "Jump to item",
                        "Export results",
                        "Quit",
                    ])
                    .default(0)
                    .interact()?;

                match action {
                    0 => {
                        if prompt_and_save(session, &theme, &item.id)? {
                            dirty = true;
                        }
                    }
                    1 => {
                        session.navigate(Nav::Prev);
                    }
                    2 => {
                        session.navigate(Nav::Next);
                    }
                    3 => prompt_jump(session, &theme)?,
                    4 => {
                        if export(session, output_dir) {
                            dirty = false;
                        }
                    }
                    _ => {
                        if quit(session, &theme, output_dir, dirty)? {
                            return Ok(OK);
                        }
                    }
                }
            }
            SessionPhase::Exhausted => {
                let progress = session.progress();
                println!();
                println!(
                    "All {} items reviewed ({} coded).",
                    progress.total, progress.coded
                );
                let action = Select::with_theme(&theme)
                    .with_prompt("Action")
                    .items(&["Export results", "Review last item", "Jump to item", "Quit"])
                    .default(0)
                    .interact()?;
                match action {
                    0 => {
                        if export(session, output_dir) {
                            dirty = false;
                        }
                    }
                    1 => {
                        session.navigate(Nav::Prev);
                    }
                    2 => prompt_jump(session, &theme)?,
                    _ => {
                        if quit(session, &theme, output_dir, dirty)? {
                            return Ok(OK);
                        }
                    }
                }
            }
            // coder identity was locked above and never unlocks
            SessionPhase::AwaitingCoder => return Ok(OK),
        }
    }
}

fn print_item(session: &SessionController, item: &concord_core::Item) {
    let progress = session.progress();
    println!();
    println!(
        "[{}/{}] {} (coded {} of {})",
        progress.cursor + 1,
        progress.total,
        item.id,
        progress.coded,
        progress.total
    );
    if let Some(variable) = &item.variable {
        println!("Economic variable: {variable}");
    }
    if session.store().contains(&item.id) {
        println!("Already coded; saving again overwrites the earlier judgment.");
    }
    println!();
    println!("{}", item.text);
    if let Some(description) = &item.description {
        println!();
        println!("Description: {description}");
    }
    if let Some(explanation) = &item.explanation {
        println!("Explanation: {explanation}");
    }
}

/// Prompt for category and note, then save. Returns true when a judgment was
/// recorded.
fn prompt_and_save(
    session: &mut SessionController,
    theme: &ColorfulTheme,
    item_id: &str,
) -> dialoguer::Result<bool> {
    let previous = session.store().get(item_id).cloned();

    let labels: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{:<9} {}", c.as_str(), c.guidance()))
        .collect();
    let default_idx = previous
        .as_ref()
        .and_then(|j| Category::ALL.iter().position(|c| *c == j.category))
        .unwrap_or(Category::ALL.len() - 1); // "none" is the default choice

    let choice = Select::with_theme(theme)
        .with_prompt("Classification")
        .items(&labels)
        .default(default_idx)
        .interact()?;
    let category = Category::ALL[choice];

    let mut note_prompt = Input::<String>::with_theme(theme)
        .with_prompt("Notes (optional)")
        .allow_empty(true);
    if let Some(note) = previous.and_then(|j| j.note) {
        note_prompt = note_prompt.with_initial_text(note);
    }
    let note = note_prompt.interact_text()?;
    let note = if note.trim().is_empty() { None } else { Some(note) };

    match session.save(category, note) {
        Ok(()) => {
            println!("Saved ({} total)", session.progress().coded);
            Ok(true)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(false)
        }
    }
}

fn prompt_jump(session: &mut SessionController, theme: &ColorfulTheme) -> dialoguer::Result<()> {
    let total = session.progress().total;
    let target: usize = Input::with_theme(theme)
        .with_prompt(format!("Jump to item (1-{total})"))
        .interact_text()?;
    session.navigate(Nav::Goto(target.saturating_sub(1)));
    Ok(())
}

/// Returns true when the export produced a file.
fn export(session: &SessionController, output_dir: &Path) -> bool {
    if session.store().is_empty() {
        println!("Nothing to export yet.");
        return false;
    }
    let coder = session.coder_id().unwrap_or("coder");
    match export_to_dir(session.store(), output_dir, coder, Utc::now()) {
        Ok(path) => {
            println!("Results written to {}", path.display());
            true
        }
        Err(e) => {
            eprintln!("export failed: {e}");
            false
        }
    }
}

/// Returns true when the session should end.
fn quit(
    session: &SessionController,
    theme: &ColorfulTheme,
    output_dir: &Path,
    dirty: bool,
) -> dialoguer::Result<bool> {
    if dirty && !session.store().is_empty() {
        let export_first = Confirm::with_theme(theme)
            .with_prompt("You have unexported judgments. Export before quitting?")
            .default(true)
            .interact()
            .unwrap_or(false);
        if export_first {
            export(session, output_dir);
        }
    }
    Ok(true)
}
