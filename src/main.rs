mod cli;
mod ui;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flowtask::{Config, CredentialStore, Report, Status, Task, TaskStore};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs::OpenOptions, io, sync::Mutex};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use ui::{App, Exit};

fn init_logging(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let file = OpenOptions::new().create(true).append(true).open(&config.log_file)?;
    let filter = EnvFilter::try_from_env("FLOWTASK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::new(cli.data_dir);
    config.ensure_dir()?;
    init_logging(&config)?;

    let users = CredentialStore::open(&config.users_file)?;
    let tasks = TaskStore::open(&config.tasks_file)?;

    match cli.command {
        Some(Command::Report { json }) => print_report(&Report::build(&tasks), json)?,
        Some(Command::List { status, assignee, json }) => {
            let mut list = match status {
                Some(status) => tasks.get_by_status(status),
                None => tasks.get_all(),
            };
            if let Some(assignee) = assignee {
                list.retain(|t| t.assigned_to == assignee);
            }
            print_tasks(&list, json)?;
        }
        None => run_interactive(App::new(users, tasks))?,
    }
    Ok(())
}

fn run_interactive(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    while ui::login(&mut app)? {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = ui::run_app(&mut terminal, &mut app);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        match result {
            Ok(Exit::Logout) => app.session.logout(),
            Ok(Exit::Quit) => break,
            Err(err) => {
                eprintln!("{:?}", err);
                break;
            }
        }
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    for status in Status::ALL {
        println!("{:<12} {}", status.label(), report.count(status));
    }
    println!();
    println!("Total tasks      {}", report.total);
    println!("Active tasks     {}", report.active);
    println!("Completion rate  {}%", report.completion_rate);
    println!("Team members     {}", report.members);
    if !report.by_assignee.is_empty() {
        println!();
        for row in &report.by_assignee {
            println!("{:<16} {:>3} tasks {}", row.assignee, row.count, ui::bar(row.bar_percent, 20));
        }
    }
    Ok(())
}

fn print_tasks(tasks: &[Task], json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(tasks)?);
        return Ok(());
    }
    for t in tasks {
        println!(
            "[#{}] {:<8} {} (@{}, {})",
            t.id,
            t.status,
            t.title,
            t.assigned_to,
            t.created_date_str()
        );
    }
    Ok(())
}
