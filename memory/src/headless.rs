//! Headless mode for the memory front-end.
//!
//! A line-oriented interface for scripts and automated testing: each input
//! line is either a `#command` or a chat query, and every response line
//! starts with a `[TAG]`.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

use memory_api::{Fact, ImportSource};
use memory_core::views::format_timestamp;
use memory_core::{ImportStatus, Page, Role, Router};

const DEFAULT_FACTS_LIMIT: usize = 20;
const MAX_LISTED: usize = 50;

/// Whether the session continues after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run the headless protocol over stdin and stdout.
pub async fn run_headless(mut router: Router) -> anyhow::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("=== Memory Headless Mode ===");
    print_help(&mut stdout)?;
    println!();
    println!("Enter questions or commands (one per line):");
    println!();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let flow = execute(&mut router, &line, &mut stdout).await?;
        stdout.flush()?;
        if flow == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Execute one input line, writing tagged output to `out`.
pub async fn execute<W: Write>(router: &mut Router, line: &str, out: &mut W) -> io::Result<Flow> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Flow::Continue);
    }

    let Some(command) = line.strip_prefix('#') else {
        ask(router, line, out).await?;
        return Ok(Flow::Continue);
    };

    let parts: Vec<&str> = command.split_whitespace().collect();
    match parts.first().copied() {
        Some("quit") | Some("exit") => {
            writeln!(out, "Goodbye!")?;
            return Ok(Flow::Quit);
        }
        Some("help") => {
            writeln!(out, "[HELP]")?;
            print_help(out)?;
        }
        Some("stats") => {
            show_dashboard(router).await;
            print_stats(router, out)?;
        }
        Some("health") => {
            show_dashboard(router).await;
            print_health(router, out)?;
        }
        Some("facts") => list_facts(router, &parts[1..], out).await?,
        Some("search") => {
            let text = argument_text(command, "search");
            show_memory(router).await;
            if let Some(browser) = router.memory_mut() {
                browser.set_search(text);
            }
            print_memory(router, out)?;
        }
        Some("category") => match parts.get(1).copied() {
            None => writeln!(out, "[ERROR] Usage: #category <goal|project|preference|other|none>")?,
            Some(name) => {
                show_memory(router).await;
                if let Some(browser) = router.memory_mut() {
                    if name.eq_ignore_ascii_case("none") {
                        browser.set_category(None);
                    } else {
                        browser.set_category(Some(name.to_lowercase()));
                    }
                }
                print_memory(router, out)?;
            }
        },
        Some("import") => import(router, argument_text(command, "import"), out).await?,
        _ => writeln!(out, "[ERROR] Unknown command. Type #help for help.")?,
    }

    Ok(Flow::Continue)
}

/// Everything after the command name, trimmed.
fn argument_text<'a>(command: &'a str, name: &str) -> &'a str {
    command
        .trim_start()
        .strip_prefix(name)
        .unwrap_or_default()
        .trim()
}

/// Split `#import` arguments into a path and an optional trailing provider.
/// The path may contain spaces.
fn split_import_args(args: &str) -> (&str, Option<ImportSource>) {
    if let Some((path, last)) = args.rsplit_once(char::is_whitespace) {
        if let Ok(source) = ImportSource::from_str(last) {
            return (path.trim_end(), Some(source));
        }
    }
    (args, None)
}

fn print_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "  #stats                      - Show store statistics")?;
    writeln!(out, "  #health                     - Check the backend")?;
    writeln!(out, "  #facts [limit] [offset]     - List stored facts")?;
    writeln!(out, "  #search <text>              - Filter memories by text")?;
    writeln!(out, "  #category <name|none>       - Filter memories by category")?;
    writeln!(out, "  #import <path> [chatgpt|claude] - Import a conversation export")?;
    writeln!(out, "  #help                       - Show this help")?;
    writeln!(out, "  #quit                       - Exit")?;
    writeln!(out, "  (anything else is asked as a question)")?;
    Ok(())
}

// ============================================================================
// Chat
// ============================================================================

async fn ask<W: Write>(router: &mut Router, question: &str, out: &mut W) -> io::Result<()> {
    router.navigate(Page::Chat);
    if let Some(input) = router.chat_mut().and_then(|chat| chat.input_mut()) {
        input.set(question);
    }
    if let Err(e) = router.submit_chat() {
        return writeln!(out, "[ERROR] {e}");
    }
    router.settle().await;

    let Some(reply) = router
        .chat()
        .and_then(|chat| chat.transcript().last())
        .filter(|message| message.role == Role::Assistant)
    else {
        return writeln!(out, "[ERROR] No answer received");
    };

    if let Some(error) = &reply.error {
        return writeln!(out, "[ERROR] {error}");
    }

    writeln!(out, "[ASSISTANT]")?;
    for para in reply.content.split("\n\n") {
        writeln!(out, "{para}")?;
    }
    if !reply.facts.is_empty() {
        writeln!(out, "[SOURCES] {}", reply.facts.len())?;
        for fact in &reply.facts {
            write_fact(out, fact)?;
        }
    }
    writeln!(out)
}

// ============================================================================
// Dashboard
// ============================================================================

async fn show_dashboard(router: &mut Router) {
    if router.page() == Page::Dashboard {
        router.reload();
    } else {
        router.navigate(Page::Dashboard);
    }
    router.settle().await;
}

fn print_stats<W: Write>(router: &Router, out: &mut W) -> io::Result<()> {
    let Some(dashboard) = router.dashboard() else {
        return Ok(());
    };
    if let Some(error) = dashboard.error() {
        writeln!(out, "[ERROR] {error}")?;
    }
    writeln!(out, "[STATS]")?;
    writeln!(out, "  Total memories: {}", dashboard.total_facts_label())?;
    writeln!(out, "  Storage type: {}", dashboard.storage_type_label())?;
    if let Some(index) = dashboard.index_name() {
        writeln!(out, "  Index: {index}")?;
    }
    Ok(())
}

fn print_health<W: Write>(router: &Router, out: &mut W) -> io::Result<()> {
    let Some(dashboard) = router.dashboard() else {
        return Ok(());
    };
    match dashboard.health().error() {
        Some(error) => writeln!(out, "[HEALTH] {} ({error})", dashboard.backend_label()),
        None => writeln!(out, "[HEALTH] {}", dashboard.backend_label()),
    }
}

// ============================================================================
// Memory
// ============================================================================

async fn show_memory(router: &mut Router) {
    if router.page() != Page::Memory {
        router.navigate(Page::Memory);
        router.settle().await;
    }
}

fn print_memory<W: Write>(router: &Router, out: &mut W) -> io::Result<()> {
    let Some(browser) = router.memory() else {
        return Ok(());
    };
    if let Some(error) = browser.facts().error() {
        return writeln!(out, "[ERROR] {error}");
    }

    writeln!(out, "[MEMORY] {}", browser.summary())?;
    let visible = browser.visible();
    for fact in visible.iter().take(MAX_LISTED) {
        write_fact(out, fact)?;
    }
    if visible.len() > MAX_LISTED {
        writeln!(out, "  ... and {} more", visible.len() - MAX_LISTED)?;
    }
    Ok(())
}

async fn list_facts<W: Write>(router: &Router, args: &[&str], out: &mut W) -> io::Result<()> {
    let parsed = (
        args.first().map_or(Ok(DEFAULT_FACTS_LIMIT), |s| s.parse::<usize>()),
        args.get(1).map_or(Ok(0), |s| s.parse::<usize>()),
    );
    let (Ok(limit), Ok(offset)) = parsed else {
        return writeln!(out, "[ERROR] Usage: #facts [limit] [offset]");
    };

    match router.backend().facts(limit, offset).await {
        Ok(facts) => {
            writeln!(out, "[FACTS] {} (offset {offset})", facts.len())?;
            for fact in &facts {
                write_fact(out, fact)?;
            }
            Ok(())
        }
        Err(e) => writeln!(out, "[ERROR] {e}"),
    }
}

fn write_fact<W: Write>(out: &mut W, fact: &Fact) -> io::Result<()> {
    match &fact.timestamp {
        Some(ts) => writeln!(
            out,
            "  - [{}] {} ({})",
            fact.category,
            fact.content,
            format_timestamp(ts)
        ),
        None => writeln!(out, "  - [{}] {}", fact.category, fact.content),
    }
}

// ============================================================================
// Import
// ============================================================================

async fn import<W: Write>(router: &mut Router, args: &str, out: &mut W) -> io::Result<()> {
    let (path, source) = split_import_args(args);
    if path.is_empty() {
        return writeln!(out, "[ERROR] Usage: #import <path> [chatgpt|claude]");
    }
    let source = source.unwrap_or_default();

    // A fresh form for every import.
    router.navigate(Page::Landing);
    router.navigate(Page::Import);

    let prepared = match router.choose_import_file(path).await {
        Ok(()) => router.set_import_source(source),
        Err(e) => Err(e),
    };
    if let Err(e) = prepared.and_then(|()| router.submit_import().map(|_| ())) {
        return writeln!(out, "[ERROR] {e}");
    }
    writeln!(out, "[IMPORTING] {path} as {}", source.label())?;
    router.settle().await;

    let Some(form) = router.import_form() else {
        return Ok(());
    };
    match form.status() {
        ImportStatus::Failed(reason) => writeln!(out, "[ERROR] Import failed: {reason}"),
        _ => writeln!(out, "[IMPORT] {}", form.status_line()),
    }
}
