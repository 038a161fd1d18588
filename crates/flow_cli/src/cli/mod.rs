use clap::{Parser, Subcommand};
use flow_core::config::{ConfigOverrides, canonical_key};
use flow_core::error::AppError;
use time::macros::format_description;
use time::{Date, Duration};

#[derive(Parser, Debug)]
#[command(name = "studentflow", author, version, about, long_about = None)]
pub struct Cli {
    /// Command to run; starts an interactive session when omitted
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new assignment
    ///
    /// Example: studentflow add "Essay" --course "History 101" --due 2025-03-14 --priority high
    Add {
        title: Option<String>,
        #[arg(long)]
        course: Option<String>,
        /// Due date (YYYY-MM-DD, today or tomorrow)
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Change fields of an assignment
    ///
    /// Example: studentflow update 2 --status stuck --priority critical
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
    },
    /// Mark an assignment as done
    ///
    /// Example: studentflow done 1
    Done { id: String },
    /// Delete an assignment
    ///
    /// Example: studentflow delete 1
    Delete { id: String },
    /// Show the board
    List,
    /// Show progress and counts
    Stats,
    /// Show the automation log, most recent first
    Log,
    /// List known courses
    Courses,
    /// Let the assistant re-prioritize the board and summarize the workload
    Optimize,
    /// Show or dismiss the latest assistant insight
    ///
    /// Example: studentflow insight --dismiss
    Insight {
        #[arg(long)]
        dismiss: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    Notifications,
    SeedDemo,
    AssistantModel,
    AssistantApiBase,
    ReminderDelayMs,
    DueSoonDays,
    CancelRemindersOnDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }
    let sub_field = remainder.map(canonical_key);

    let target = match (canonical_field.as_str(), sub_field.as_deref()) {
        ("theme", None) => ConfigOverrideTarget::Theme,
        ("theme", Some(_)) => return Err("theme override cannot have subfields".to_string()),
        ("aliases" | "alias", _) => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            ConfigOverrideTarget::Alias(alias_name.to_string())
        }
        ("notifications", None) => ConfigOverrideTarget::Notifications,
        ("seed_demo", None) => ConfigOverrideTarget::SeedDemo,
        ("assistant", Some("model")) => ConfigOverrideTarget::AssistantModel,
        ("assistant", Some("api_base")) => ConfigOverrideTarget::AssistantApiBase,
        ("automation", Some("reminder_delay_ms")) => ConfigOverrideTarget::ReminderDelayMs,
        ("automation", Some("due_soon_days")) => ConfigOverrideTarget::DueSoonDays,
        ("automation", Some("cancel_reminders_on_delete")) => {
            ConfigOverrideTarget::CancelRemindersOnDelete
        }
        (field, Some(sub)) => return Err(format!("unknown config field '{field}.{sub}'")),
        (field, None) => return Err(format!("unknown config field '{field}'")),
    };

    Ok(ParsedConfigOverride { target, value })
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        let value = parsed.value;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, value);
            }
            ConfigOverrideTarget::Notifications => {
                overrides.notifications = Some(parse_flag(&value)?)
            }
            ConfigOverrideTarget::SeedDemo => overrides.seed_demo = Some(parse_flag(&value)?),
            ConfigOverrideTarget::AssistantModel => overrides.assistant_model = Some(value),
            ConfigOverrideTarget::AssistantApiBase => overrides.assistant_api_base = Some(value),
            ConfigOverrideTarget::ReminderDelayMs => {
                overrides.reminder_delay_ms = Some(parse_number(&value)?)
            }
            ConfigOverrideTarget::DueSoonDays => {
                overrides.due_soon_days = Some(parse_number(&value)?)
            }
            ConfigOverrideTarget::CancelRemindersOnDelete => {
                overrides.cancel_reminders_on_delete = Some(parse_flag(&value)?)
            }
        }
    }
    Ok(overrides)
}

fn parse_flag(value: &str) -> Result<bool, AppError> {
    match canonical_key(value).as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(AppError::invalid_input(format!(
            "expected true or false, got '{value}'"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T, AppError> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::invalid_input(format!("expected a number, got '{value}'")))
}

/// Accepts `YYYY-MM-DD`, `today` and `tomorrow`.
pub fn parse_due_date(raw: &str, today: Date) -> Result<Date, AppError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today.saturating_add(Duration::days(1))),
        _ => {}
    }

    Date::parse(trimmed, format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::invalid_input("due date must be YYYY-MM-DD"))
}
