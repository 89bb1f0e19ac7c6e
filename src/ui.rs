use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, is_raw_mode_enabled},
};
use flowtask::{
    forms::{LoginForm, PasswordChange, TaskForm},
    CredentialStore, Report, Session, Status, Task, TaskStore,
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

const HELP: &str =
    "a add  e edit  Enter advance  d delete  m mine  r report  p password  L logout  q quit";

pub enum Exit {
    Quit,
    Logout,
}

pub struct App {
    pub users: CredentialStore,
    pub tasks: TaskStore,
    pub session: Session,
    selected_status: usize,
    selected_task: usize,
    mine_only: bool,
    show_report: bool,
    message: Option<String>,
}

impl App {
    pub fn new(users: CredentialStore, tasks: TaskStore) -> Self {
        Self {
            users,
            tasks,
            session: Session::default(),
            selected_status: 0,
            selected_task: 0,
            mine_only: false,
            show_report: false,
            message: None,
        }
    }

    fn username(&self) -> String {
        self.session.current().map(|u| u.username.clone()).unwrap_or_default()
    }

    fn column(&self, status: Status) -> Vec<Task> {
        match (self.mine_only, self.session.current()) {
            (true, Some(user)) => self
                .tasks
                .get_by_assignee(&user.username)
                .into_iter()
                .filter(|t| t.status == status)
                .collect(),
            _ => self.tasks.get_by_status(status),
        }
    }

    fn selected(&self) -> Option<Task> {
        self.column(Status::ALL[self.selected_status])
            .get(self.selected_task)
            .cloned()
    }

    fn clamp_selection(&mut self) {
        let len = self.column(Status::ALL[self.selected_status]).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn show<T>(&mut self, result: flowtask::Result<T>, ok: impl FnOnce(T) -> String) {
        self.message = Some(match result {
            Ok(value) => ok(value),
            Err(err) => format!("Error: {err}"),
        });
        self.clamp_selection();
    }

    fn add_task(&mut self) {
        let status = Status::ALL[self.selected_status];
        let Some(title) = prompt("Title") else { return };
        let Some(description) = prompt("Description") else { return };
        let Some(assigned_to) = prompt_default("Assigned to", &self.username()) else { return };
        let Some(status) = prompt_default("Status (Pending/Progress/Done)", status.as_str()) else {
            return;
        };
        let form = TaskForm { title, description, status, assigned_to };
        let result = form.create(&mut self.tasks);
        self.show(result, |t| format!("Added task #{}", t.id));
    }

    fn edit_task(&mut self) {
        let Some(existing) = self.selected() else { return };
        let current = TaskForm::from_task(&existing);
        let Some(title) = prompt_default("Title", &current.title) else { return };
        let Some(description) = prompt_default("Description", &current.description) else { return };
        let Some(assigned_to) = prompt_default("Assigned to", &current.assigned_to) else { return };
        let Some(status) = prompt_default("Status (Pending/Progress/Done)", &current.status) else {
            return;
        };
        let form = TaskForm { title, description, status, assigned_to };
        let result = form.apply(&mut self.tasks, &existing);
        self.show(result, |t| format!("Updated task #{}", t.id));
    }

    fn advance_task(&mut self) {
        let Some(mut task) = self.selected() else { return };
        task.status = task.status.next();
        let (id, status) = (task.id, task.status);
        let result = self.tasks.update(task);
        self.show(result, |()| format!("Task #{id} moved to {status}"));
    }

    fn delete_task(&mut self) {
        let Some(task) = self.selected() else { return };
        let Some(answer) = prompt(&format!("Delete task #{} '{}'? (y/N)", task.id, task.title)) else {
            return;
        };
        if !answer.eq_ignore_ascii_case("y") {
            return;
        }
        let result = self.tasks.delete(task.id);
        self.show(result, |()| format!("Deleted task #{}", task.id));
    }

    fn change_password(&mut self) {
        let Some(current) = prompt("Current password") else { return };
        let Some(new) = prompt("New password") else { return };
        let Some(confirm) = prompt("Confirm new password") else { return };
        let change = PasswordChange { current, new, confirm };
        let result = change.submit(&self.users, &mut self.session);
        self.show(result, |()| "Password updated".to_string());
    }
}

/// Prompt for credentials until a login succeeds. Returns `false` when the
/// user leaves the username blank.
pub fn login(app: &mut App) -> io::Result<bool> {
    loop {
        println!("flowtask login (blank username quits, 'new' registers an account)");
        let Some(username) = prompt("Username") else { return Ok(false) };
        if username.is_empty() {
            return Ok(false);
        }
        if username == "new" {
            register(&app.users);
            continue;
        }
        let Some(password) = prompt("Password") else { return Ok(false) };
        match (LoginForm { username, password }).submit(&app.users, &mut app.session) {
            Ok(Some(_)) => {
                app.message = Some(format!("Welcome, {}", app.username()));
                return Ok(true);
            }
            Ok(None) => println!("Invalid username or password"),
            Err(err) => println!("{err}"),
        }
    }
}

fn register(users: &CredentialStore) {
    let (Some(username), Some(password)) = (prompt("New username"), prompt("New password")) else {
        return;
    };
    match (LoginForm { username, password }).register(users) {
        Ok(user) => println!("Account '{}' created", user.username),
        Err(err) => println!("{err}"),
    }
}

pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<Exit> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if app.show_report {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Char('r') | KeyCode::Esc) {
                app.show_report = false;
            }
            continue;
        }
        app.message = None;
        let prompted = matches!(key.code, KeyCode::Char('a' | 'e' | 'd' | 'p') | KeyCode::Delete);
        match key.code {
            KeyCode::Char('q') => return Ok(Exit::Quit),
            KeyCode::Char('L') => return Ok(Exit::Logout),
            KeyCode::Char('a') => app.add_task(),
            KeyCode::Char('e') => app.edit_task(),
            KeyCode::Char('d') | KeyCode::Delete => app.delete_task(),
            KeyCode::Char('p') => app.change_password(),
            KeyCode::Char('r') => app.show_report = true,
            KeyCode::Char('m') => {
                app.mine_only = !app.mine_only;
                app.clamp_selection();
            }
            KeyCode::Enter => app.advance_task(),
            KeyCode::Left => {
                if app.selected_status > 0 {
                    app.selected_status -= 1;
                    app.clamp_selection();
                }
            }
            KeyCode::Right => {
                if app.selected_status < Status::ALL.len() - 1 {
                    app.selected_status += 1;
                    app.clamp_selection();
                }
            }
            KeyCode::Up => {
                if app.selected_task > 0 {
                    app.selected_task -= 1;
                }
            }
            KeyCode::Down => {
                let max_tasks = app.column(Status::ALL[app.selected_status]).len();
                if app.selected_task + 1 < max_tasks {
                    app.selected_task += 1;
                }
            }
            _ => {}
        }
        // Prompts print over the alternate screen.
        if prompted {
            terminal.clear()?;
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(f.area());

    if app.show_report {
        draw_report(f, rows[0], &Report::build(&app.tasks));
    } else {
        draw_board(f, rows[0], app);
    }

    let status = match &app.message {
        Some(msg) => Line::from(Span::styled(msg.as_str(), Style::default().fg(Color::Yellow))),
        None => Line::from(format!(
            "{}{}",
            app.username(),
            if app.mine_only { " (my tasks)" } else { "" }
        )),
    };
    f.render_widget(Paragraph::new(status), rows[1]);
    let help = if app.show_report { "r/Esc back" } else { HELP };
    f.render_widget(Paragraph::new(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray)))), rows[2]);
}

fn draw_board(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for (i, status) in Status::ALL.iter().enumerate() {
        let tasks = app.column(*status);
        let items: Vec<ListItem> = tasks
            .iter()
            .map(|t| {
                ListItem::new(Line::from(vec![
                    Span::raw(format!("[#{}] ", t.id)),
                    Span::styled(t.title.as_str(), Style::default().fg(Color::White)),
                    Span::raw(format!(" @{} ({})", t.assigned_to, t.created_date_str())),
                ]))
            })
            .collect();

        let focused = app.selected_status == i;
        let list = List::new(items)
            .block(
                Block::default()
                    .title(format!("{} ({})", status, tasks.len()))
                    .borders(Borders::ALL)
                    .border_style(if focused {
                        Style::default().fg(Color::Cyan)
                    } else {
                        Style::default()
                    }),
            )
            .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

        let mut state = ListState::default();
        if focused && !tasks.is_empty() {
            state.select(Some(app.selected_task));
        }
        f.render_stateful_widget(list, chunks[i], &mut state);
    }
}

fn draw_report(f: &mut Frame, area: Rect, report: &Report) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let summary: Vec<Line> = Status::ALL
        .iter()
        .map(|&s| Line::from(format!("{:<12} {}", s.label(), report.count(s))))
        .chain(std::iter::once(Line::from(format!(
            "Total {}  Active {}  Members {}",
            report.total, report.active, report.members
        ))))
        .collect();
    f.render_widget(
        Paragraph::new(summary).block(Block::default().title("Overview").borders(Borders::ALL)),
        rows[0],
    );

    let gauge = Gauge::default()
        .block(Block::default().title("Completion").borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Green))
        .percent(report.completion_rate.min(100) as u16);
    f.render_widget(gauge, rows[1]);

    let members: Vec<Line> = report
        .by_assignee
        .iter()
        .map(|a| Line::from(format!("{:<16} {:>3} tasks {}", a.assignee, a.count, bar(a.bar_percent, 30))))
        .collect();
    f.render_widget(
        Paragraph::new(members).block(Block::default().title("Tasks by team member").borders(Borders::ALL)),
        rows[2],
    );
}

/// Text progress bar `width` cells wide.
pub fn bar(percent: usize, width: usize) -> String {
    let filled = percent.min(100) * width / 100;
    format!("{}{}", "#".repeat(filled), "-".repeat(width - filled))
}

fn prompt(message: &str) -> Option<String> {
    let raw = is_raw_mode_enabled().unwrap_or(false);
    if raw {
        disable_raw_mode().ok();
    }
    println!("{}", message);
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    if raw {
        enable_raw_mode().ok();
    }
    match read {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
    }
}

/// Like [`prompt`], but a blank answer keeps `current`.
fn prompt_default(message: &str, current: &str) -> Option<String> {
    let answer = prompt(&format!("{message} [{current}]"))?;
    Some(if answer.trim().is_empty() { current.to_string() } else { answer })
}
