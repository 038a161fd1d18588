use clap::{CommandFactory, Parser};
use flow_cli::cli::{Cli, Command, collect_overrides, parse_due_date};
use flow_cli::render;
use flow_core::assistant::assistant_from_config;
use flow_core::board::local_now;
use flow_core::config::{Config, Palette, load_config_with_fallback, merge_overrides, palette_for_theme};
use flow_core::error::AppError;
use flow_core::model::{NewTask, Priority, Task, TaskId, TaskPatch, TaskStatus};
use flow_core::notify::{NoopNotifier, Notifier, notifier_from_env};
use flow_core::seed::{demo_courses, demo_tasks};
use flow_core::{Board, BoardEvent, OptimizeOutcome};
use std::io::{self, BufRead};
use std::sync::Arc;
use tokio::runtime::Runtime;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

struct Session {
    board: Board,
    config: Config,
    palette: Palette,
}

fn init_tracing() {
    // Opt-in via RUST_LOG; stdout stays reserved for command output.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn build_session(raw_overrides: &[String]) -> Result<Session, AppError> {
    let loaded = load_config_with_fallback();
    if let Some(err) = loaded.error {
        eprintln!("WARNING: config ignored: {}", err);
    }
    let overrides = collect_overrides(raw_overrides)?;
    let config = merge_overrides(&loaded.config, &overrides);

    let tasks = if config.seed_demo {
        demo_tasks(local_now().date())
    } else {
        Vec::new()
    };
    let board = Board::new(demo_courses(), tasks, config.automation.settings());
    let palette = palette_for_theme(config.theme.as_deref());

    tracing::debug!(tasks = board.len(), seed_demo = config.seed_demo, "session started");
    Ok(Session {
        board,
        config,
        palette,
    })
}

fn parse_optional<T>(raw: Option<String>) -> Result<Option<T>, AppError>
where
    T: std::str::FromStr<Err = AppError>,
{
    raw.map(|value| value.parse()).transpose()
}

fn print_json(value: &serde_json::Value) {
    println!("{}", value);
}

fn print_task(verb: &str, task: &Task, json: bool) {
    if json {
        print_json(&render::task_json(task, local_now()));
    } else {
        println!("{} task: {} ({})", verb, task.title, task.id);
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn split_command_line(line: &str) -> Result<Vec<String>, AppError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(AppError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

fn expand_alias(args: Vec<String>, config: &Config) -> Result<Vec<String>, AppError> {
    let Some(expansion) = args.first().and_then(|head| config.aliases.get(head)) else {
        return Ok(args);
    };
    let mut expanded = split_command_line(expansion)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(
    runtime: &Runtime,
    session: &Session,
    command: Command,
    json: bool,
) -> Result<(), AppError> {
    let board = &session.board;

    match command {
        Command::Add {
            title,
            course,
            due,
            status,
            priority,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };
            let today = local_now().date();
            let course = course
                .or_else(|| board.courses().first().map(|course| course.name.clone()))
                .unwrap_or_default();
            let due_date = match due {
                Some(raw) => parse_due_date(&raw, today)?,
                None => today,
            };

            let task = board.add_task(NewTask {
                title,
                course,
                due_date,
                status: parse_optional(status)?.unwrap_or(TaskStatus::NotStarted),
                priority: parse_optional(priority)?.unwrap_or(Priority::Medium),
            })?;
            print_task("Added", &task, json);
        }
        Command::Update {
            id,
            title,
            course,
            due,
            status,
            priority,
        } => {
            let due_date = due
                .map(|raw| parse_due_date(&raw, local_now().date()))
                .transpose()?;
            let patch = TaskPatch {
                title,
                course,
                due_date,
                status: parse_optional(status)?,
                priority: parse_optional(priority)?,
            };
            if patch.is_empty() {
                return Err(AppError::invalid_input("nothing to update"));
            }

            let task = board
                .update_task(&TaskId::new(id.trim()), patch)?
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task("Updated", &task, json);
        }
        Command::Done { id } => {
            let task = board
                .update_task(&TaskId::new(id.trim()), TaskPatch::status(TaskStatus::Done))?
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task("Completed", &task, json);
        }
        Command::Delete { id } => {
            let task = board
                .delete_task(&TaskId::new(id.trim()))
                .ok_or_else(|| AppError::invalid_input("task not found"))?;
            print_task("Deleted", &task, json);
        }
        Command::List => {
            let tasks = board.tasks();
            let now = local_now();
            if json {
                print_json(&render::tasks_json(&tasks, now));
            } else {
                println!("{}", render::render_board(&tasks, now));
                if let Some(badge) = render::log_badge(board.log().len()) {
                    println!("{}", session.palette.mutedize(&badge));
                }
            }
        }
        Command::Stats => {
            let stats = board.stats();
            if json {
                let value = serde_json::to_value(stats)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                print_json(&value);
            } else {
                println!("{}", render::render_stats(&stats, &session.palette));
            }
        }
        Command::Log => {
            let entries = board.log();
            if json {
                let value = serde_json::to_value(&entries)
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                print_json(&value);
            } else {
                println!("{}", render::render_log(&entries, &session.palette));
            }
        }
        Command::Courses => {
            if json {
                let value = serde_json::to_value(board.courses())
                    .map_err(|err| AppError::invalid_data(err.to_string()))?;
                print_json(&value);
            } else {
                println!("{}", render::render_courses(board.courses(), &session.palette));
            }
        }
        Command::Optimize => {
            let assistant = assistant_from_config(&session.config.assistant)?;
            match runtime.block_on(board.optimize(assistant.as_ref()))? {
                OptimizeOutcome::Completed { insight } => {
                    if json {
                        print_json(&serde_json::json!({
                            "optimized": true,
                            "insight": insight,
                            "tasks": render::tasks_json(&board.tasks(), local_now()),
                        }));
                    } else {
                        println!("Board optimized.");
                        println!("Insight: {}", session.palette.accentize(&insight));
                    }
                }
                OptimizeOutcome::AlreadyRunning => {
                    if json {
                        print_json(&serde_json::json!({ "optimized": false }));
                    } else {
                        println!("Optimization already running.");
                    }
                }
            }
        }
        Command::Insight { dismiss } => {
            if dismiss {
                let dismissed = board.dismiss_insight();
                if json {
                    print_json(&serde_json::json!({ "dismissed": dismissed }));
                } else if dismissed {
                    println!("Insight dismissed.");
                } else {
                    println!("No insight to dismiss.");
                }
            } else {
                let insight = board.insight();
                if json {
                    print_json(&serde_json::json!({ "insight": insight }));
                } else {
                    match insight {
                        Some(text) => println!("Insight: {}", session.palette.accentize(&text)),
                        None => println!("No insight yet. Run `optimize` first."),
                    }
                }
            }
        }
    }

    Ok(())
}

fn toast_notifier(config: &Config) -> Arc<dyn Notifier> {
    if !config.notifications {
        return Arc::new(NoopNotifier);
    }
    match notifier_from_env() {
        Ok(notifier) => Arc::from(notifier),
        Err(err) => {
            eprintln!("WARNING: desktop notifications disabled: {}", err);
            Arc::new(NoopNotifier)
        }
    }
}

/// Prints every new automation log entry as it lands, reminders included.
fn spawn_toasts(runtime: &Runtime, session: &Session) {
    let mut events = session.board.subscribe();
    let palette = session.palette.clone();
    let notifier = toast_notifier(&session.config);

    runtime.spawn(async move {
        loop {
            match events.recv().await {
                Ok(BoardEvent::LogAppended(entry)) => {
                    println!("{}", render::toast_line(&entry, &palette));
                    let notifier = Arc::clone(&notifier);
                    tokio::task::spawn_blocking(move || {
                        if let Err(err) = notifier.notify(&entry) {
                            tracing::warn!(error = %err, "desktop notification failed");
                        }
                    });
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "toast feed fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

fn run_interactive(runtime: &Runtime, session: &Session, json: bool) -> Result<(), AppError> {
    spawn_toasts(runtime, session);

    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| AppError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line).and_then(|args| expand_alias(args, &session.config)) {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("studentflow".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        let Some(command) = cli.command else {
            print_help();
            continue;
        };

        if let Err(err) = run_command(runtime, session, command, json || cli.json) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    init_tracing();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if !err.use_stderr() => {
            // --help and --version
            let _ = err.print();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("ERROR: {}", AppError::io(err.to_string()));
            std::process::exit(1);
        }
    };
    let _context = runtime.enter();

    let session = match build_session(&cli.config_override) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        None => run_interactive(&runtime, &session, cli.json),
        Some(command) => run_command(&runtime, &session, command, cli.json),
    };

    if let Err(err) = result {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
