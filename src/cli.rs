use anyhow::Result;
use chrono::Utc;
use std::env;

use crate::config;
use crate::models::parse_due_date;
use crate::query::{DueStatus, TaskQuery};
use crate::store::{TaskDraft, TaskStore};

/// Handle CLI commands.
/// Returns true when the server should start, false when a command was
/// handled and the process should exit.
pub fn handle_cli() -> Result<bool> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Ok(true);
    }

    match args[1].as_str() {
        "serve" => Ok(true),
        "add" => {
            if args.len() < 3 {
                eprintln!("usage: tdk add <content> [--priority <p>] [--due <date>]");
                std::process::exit(1);
            }
            cli_add(&args[2..])?;
            Ok(false)
        }
        "list" => {
            cli_list()?;
            Ok(false)
        }
        "config" => {
            if args.len() < 3 {
                config::show_config()?;
            } else {
                match args[2].as_str() {
                    "show" => config::show_config()?,
                    "bind" => {
                        if args.len() < 4 {
                            eprintln!("usage: tdk config bind <address>");
                            std::process::exit(1);
                        }
                        config::set_bind(args[3].clone())?;
                    }
                    "data-dir" => {
                        if args.len() < 4 {
                            eprintln!("usage: tdk config data-dir <path>");
                            std::process::exit(1);
                        }
                        config::set_data_dir(args[3].clone())?;
                    }
                    _ => {
                        eprintln!("unknown config option: {}", args[2]);
                        eprintln!("available options: show, bind, data-dir");
                        std::process::exit(1);
                    }
                }
            }
            Ok(false)
        }
        "--help" | "-h" => {
            print_help();
            Ok(false)
        }
        "--version" | "-V" | "-v" => {
            println!("tdk {}", env!("CARGO_PKG_VERSION"));
            Ok(false)
        }
        _ => {
            eprintln!("unknown command: {}", args[1]);
            eprintln!("use 'tdk --help' for usage");
            std::process::exit(1);
        }
    }
}

fn cli_add(args: &[String]) -> Result<()> {
    let mut content_parts: Vec<&str> = Vec::new();
    let mut priority = None;
    let mut due = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--priority" => priority = iter.next().cloned(),
            "--due" => due = iter.next().cloned(),
            other => content_parts.push(other),
        }
    }

    let due_date = match due.as_deref() {
        Some(raw) => match parse_due_date(raw) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                eprintln!("ignoring {err}");
                None
            }
        },
        None => None,
    };

    let config = config::load_config()?;
    let mut store = TaskStore::open(&config.data_dir)?;
    let task = store.add(TaskDraft {
        content: content_parts.join(" "),
        priority,
        due_date,
        created_date: Utc::now().naive_utc(),
    })?;

    println!("✓ added task {}: {}", task.id, task.content);
    Ok(())
}

fn cli_list() -> Result<()> {
    let config = config::load_config()?;
    let store = TaskStore::open(&config.data_dir)?;
    let tasks = store.all()?;

    if tasks.is_empty() {
        println!("No tasks yet.");
        return Ok(());
    }

    let now = Utc::now().naive_utc();
    let view = TaskQuery::new(now).run(&tasks);

    println!("{:>4}  {:^4}  {:<8}  {:<16}  CONTENT", "ID", "DONE", "PRIORITY", "DUE");
    println!("{:->4}  {:->4}  {:->8}  {:->16}  {:->30}", "", "", "", "", "");

    for task in view {
        let done = if task.completed { "x" } else { " " };
        let due = task
            .due_date
            .map(|due| due.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let flags = DueStatus::of(&task, now);
        let marker = if flags.overdue { " !" } else { "" };

        println!(
            "{:>4}  {:^4}  {:<8}  {:<16}  {}{}",
            task.id, done, task.priority, due, task.content, marker
        );
    }

    Ok(())
}

fn print_help() {
    println!(
        "taskdeck - a single-user task list over HTTP

USAGE:
    tdk [COMMAND]

COMMANDS:
    serve                 Start the HTTP server (default)
    add <content>         Add a task from the command line
        --priority <p>    low, medium, or high
        --due <date>      e.g. 2024-06-01 or \"2024-06-01 17:00\"
    list                  Print the current tasks
    config [show]         Print the configuration
    config bind <addr>    Set the server bind address
    config data-dir <p>   Set the task data directory
    --help, -h            Show this help
    --version, -V         Show the version

The server reads filters from query parameters: status, priority, due,
and sort. See the index page for the accepted values."
    );
}
