use flow_core::config::Palette;
use flow_core::metrics::{self, BoardStats};
use flow_core::model::{Course, LogEntry, Task, TaskStatus};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

const PROGRESS_WIDTH: usize = 20;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Assignment")]
    title: String,
    #[tabled(rename = "Course")]
    course: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
}

pub fn status_text(task: &Task, now: OffsetDateTime) -> String {
    if metrics::is_overdue(task, now) {
        format!("{} (overdue)", task.status)
    } else {
        task.status.to_string()
    }
}

pub fn render_board(tasks: &[Task], now: OffsetDateTime) -> String {
    if tasks.is_empty() {
        return "No assignments on the board.".to_string();
    }

    let rows = tasks.iter().map(|task| TaskRow {
        id: task.id.to_string(),
        title: task.title.clone(),
        course: task.course.clone(),
        due: task.due_date.to_string(),
        status: status_text(task, now),
        priority: task.priority.to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

pub fn progress_bar(ratio: f64) -> String {
    let filled = ((ratio.clamp(0.0, 1.0) * PROGRESS_WIDTH as f64).round()) as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled)
    )
}

pub fn render_stats(stats: &BoardStats, palette: &Palette) -> String {
    let mut parts = vec![format!("Total: {}", stats.total)];
    for status in TaskStatus::ALL {
        parts.push(format!("{}: {}", status, stats.counts.get(status)));
    }
    parts.push(format!("Overdue: {}", stats.overdue));

    let percent = (stats.completion_ratio * 100.0).round() as u32;
    format!(
        "{}\nProgress: {} {}",
        parts.join(" | "),
        palette.accentize(&format!("{percent}%")),
        progress_bar(stats.completion_ratio)
    )
}

pub fn toast_line(entry: &LogEntry, palette: &Palette) -> String {
    format!(
        "{} {}",
        palette.mutedize(&format!("[{}]", entry.kind)),
        entry.message
    )
}

/// Shown under the board while the automation log has entries.
pub fn log_badge(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 automation update (see `log`)".to_string()),
        n => Some(format!("{n} automation updates (see `log`)")),
    }
}

pub fn render_log(entries: &[LogEntry], palette: &Palette) -> String {
    if entries.is_empty() {
        return "No automation activity yet.".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let timestamp = entry
                .timestamp
                .format(&Rfc3339)
                .unwrap_or_else(|_| "-".to_string());
            format!("{} {}", palette.mutedize(&timestamp), toast_line(entry, palette))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_courses(courses: &[Course], palette: &Palette) -> String {
    courses
        .iter()
        .map(|course| format!("{} | {}", course.id, palette.course(&course.name, &course.color)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn task_json(task: &Task, now: OffsetDateTime) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "course": task.course,
        "due_date": task.due_date.to_string(),
        "status": task.status,
        "priority": task.priority,
        "overdue": metrics::is_overdue(task, now),
    })
}

pub fn tasks_json(tasks: &[Task], now: OffsetDateTime) -> serde_json::Value {
    serde_json::Value::Array(tasks.iter().map(|task| task_json(task, now)).collect())
}

#[cfg(test)]
mod tests {
    use super::{log_badge, progress_bar, render_board, render_log, render_stats, status_text, task_json};
    use flow_core::config::palette_for_theme;
    use flow_core::metrics::board_stats;
    use flow_core::model::{LogEntry, LogKind, Priority, Task, TaskId, TaskStatus};
    use time::macros::{date, datetime};

    fn task(id: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::new(id),
            title: "Lab report".to_string(),
            course: "CS 305".to_string(),
            due_date: date!(2025 - 06 - 01),
            status,
            priority: Priority::High,
        }
    }

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0.0), format!("[{}]", "-".repeat(20)));
        assert_eq!(progress_bar(1.0), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(0.25), format!("[{}{}]", "#".repeat(5), "-".repeat(15)));
    }

    #[test]
    fn status_text_marks_overdue() {
        let now = datetime!(2025-06-03 08:00 UTC);
        assert_eq!(status_text(&task("1", TaskStatus::Stuck), now), "Stuck (overdue)");
        assert_eq!(status_text(&task("2", TaskStatus::Done), now), "Done");
    }

    #[test]
    fn render_board_lists_every_task() {
        let now = datetime!(2025-05-20 08:00 UTC);
        let rendered = render_board(
            &[task("1", TaskStatus::InProgress), task("2", TaskStatus::Done)],
            now,
        );

        assert!(rendered.contains("Assignment"));
        assert!(rendered.contains("Working on it"));
        assert!(rendered.contains("2025-06-01"));
        assert_eq!(render_board(&[], now), "No assignments on the board.");
    }

    #[test]
    fn render_stats_shows_percentage() {
        let now = datetime!(2025-05-20 08:00 UTC);
        let stats = board_stats(
            &[task("1", TaskStatus::Done), task("2", TaskStatus::Stuck)],
            now,
        );
        let rendered = render_stats(&stats, &palette_for_theme(None));

        assert!(rendered.contains("Total: 2"));
        assert!(rendered.contains("Stuck: 1"));
        assert!(rendered.contains("Progress: 50%"));
    }

    #[test]
    fn render_log_prefixes_kind() {
        let entries = vec![LogEntry::new("Reminder drafted", LogKind::Email)];
        let rendered = render_log(&entries, &palette_for_theme(None));

        assert!(rendered.contains("[email] Reminder drafted"));
        assert_eq!(render_log(&[], &palette_for_theme(None)), "No automation activity yet.");
    }

    #[test]
    fn log_badge_hidden_when_empty() {
        assert_eq!(log_badge(0), None);
        assert_eq!(log_badge(1).as_deref(), Some("1 automation update (see `log`)"));
        assert_eq!(log_badge(5).as_deref(), Some("5 automation updates (see `log`)"));
    }

    #[test]
    fn task_json_uses_display_labels() {
        let json = task_json(&task("1", TaskStatus::InProgress), datetime!(2025-05-20 08:00 UTC));

        assert_eq!(json["status"], "Working on it");
        assert_eq!(json["priority"], "High");
        assert_eq!(json["due_date"], "2025-06-01");
        assert_eq!(json["overdue"], false);
    }
}
