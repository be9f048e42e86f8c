use autoschedule::{
    InMemoryTaskStore, LeaveInterval, LeaveStatus, Priority, SchedulableTask, ScheduleOutcome,
    ScheduleRequest, SchedulingMode, TaskDateStore, TaskDuration, apply_schedule,
    load_request_from_json, save_request_to_json, save_results_to_csv, save_results_to_json,
};
use autoschedule::calendar::CalendarConfig;
use chrono::{Local, NaiveDate};
use std::fs;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "AUTOSCHEDULE_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_id_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_weekday_numbers(s: &str) -> Option<Vec<u8>> {
    s.split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect()
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if ci < widths.len() && cell.len() > widths[ci] {
                widths[ci] = cell.len();
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out.push('\n');
    out
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        let pad = widths.get(ci).copied().unwrap_or(0).saturating_sub(cell.len());
        if pad > 0 {
            line.push_str(&" ".repeat(pad));
        }
        line.push_str(" |");
    }
    line
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn render_tasks(request: &ScheduleRequest, store: &InMemoryTaskStore) -> String {
    let rows: Vec<Vec<String>> = request
        .tasks
        .iter()
        .map(|task| {
            let stored = store.stored_dates(&task.id).unwrap_or_default();
            vec![
                task.id.clone(),
                task.name.clone(),
                task.priority.as_str().to_string(),
                task.duration.map(|d| d.to_string()).unwrap_or_default(),
                task.assignee_ids.iter().cloned().collect::<Vec<_>>().join(","),
                format_date(task.start_date),
                task.dependencies.join(","),
                format_date(stored.start_date),
                format_date(stored.due_date),
            ]
        })
        .collect();
    render_text_table(
        &[
            "id", "name", "priority", "duration", "assignees", "pinned", "deps", "start", "due",
        ],
        &rows,
    )
}

fn render_results(outcome: &ScheduleOutcome) -> String {
    let rows: Vec<Vec<String>> = outcome
        .results
        .iter()
        .map(|r| {
            vec![
                r.task_id.clone(),
                r.start_date.to_string(),
                r.due_date.to_string(),
                r.working_days_used.to_string(),
                r.lane.to_string(),
            ]
        })
        .collect();
    render_text_table(&["task_id", "start_date", "due_date", "days", "lane"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  show                               Show tasks with their stored dates\n  task <id> <priority> <duration> [assignees_csv|-] [start]\n                                     Upsert a task (duration like 90m, 16h, 3d, 1w)\n  name <id> <text...>                Set task name\n  deps <id> <csv|->                  Set task dependencies\n  delete <id>                        Delete a task\n  leave <employee> <start> <end> [status]\n                                     Add a leave interval (default approved)\n  leaves                             List leave intervals\n  anchor <YYYY-MM-DD>                Set the anchor date\n  calendar show                      Display calendar configuration\n  calendar days <csv>                Set working weekdays (0=Sun..6=Sat)\n  calendar holiday <YYYY-MM-DD>      Add a holiday\n  calendar hours <HH:MM> <HH:MM>     Set working hours\n  calendar set <json_path>           Load calendar config from JSON file\n  calendar save <json_path>          Save calendar config to JSON file\n  mode sequential|parallel <n>       Choose scheduling mode\n  force <true|false>                 Overwrite previously stored dates\n  schedule                           Run the scheduler and store the dates\n  results                            Show the last run's results\n  save <path>                        Save the request as JSON\n  load <path>                        Load a request from JSON\n  export <json|csv> <path>           Export the last run's results\n  quit|exit                          Exit"
    );
}

fn print_calendar_info(config: &CalendarConfig) {
    let working_days = match config.working_days() {
        Ok(days) => days.iter().map(|wd| wd.to_string()).collect::<Vec<_>>().join(", "),
        Err(e) => format!("invalid ({e})"),
    };
    let holidays = config
        .holidays
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let hours = match config.working_hours_per_day() {
        Ok(h) => h.to_string(),
        Err(e) => format!("invalid ({e})"),
    };
    println!("Working days       : {}", working_days);
    println!("Holidays           : {}", holidays);
    println!("Hours per day      : {}", hours);
    println!("Days per week      : {}", config.days_per_week);
}

fn main() {
    init_tracing();

    let mut request = ScheduleRequest::new(Local::now().date_naive());
    let mut store = InMemoryTaskStore::new();
    let mut last: Option<ScheduleOutcome> = None;

    println!("Auto-schedule (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "show" => println!("{}", render_tasks(&request, &store)),
            "task" => {
                let id_s = parts.next();
                let prio_s = parts.next();
                let dur_s = parts.next();
                let assignees_s = parts.next();
                let start_s = parts.next();
                match (id_s, prio_s, dur_s) {
                    (Some(id), Some(prio_s), Some(dur_s)) => {
                        let priority = match Priority::parse(prio_s) {
                            Some(p) => p,
                            None => {
                                println!("Invalid priority (urgent|high|medium|low|none)");
                                continue;
                            }
                        };
                        let duration: TaskDuration = match dur_s.parse() {
                            Ok(d) => d,
                            Err(e) => {
                                println!("{}", e);
                                continue;
                            }
                        };
                        let mut task = SchedulableTask::new(id, duration).with_priority(priority);
                        if let Some(existing) = request.find_task(id) {
                            task.name = existing.name.clone();
                            task.dependencies = existing.dependencies.clone();
                        }
                        if let Some(a) = assignees_s.filter(|a| *a != "-") {
                            task.assignee_ids = parse_id_list(a).into_iter().collect();
                        }
                        if let Some(s) = start_s {
                            match parse_date(s) {
                                Some(date) => task.start_date = Some(date),
                                None => {
                                    println!("Invalid date (YYYY-MM-DD)");
                                    continue;
                                }
                            }
                        }
                        request.upsert_task(task);
                        println!("Task {} saved.", id);
                        println!("{}", render_tasks(&request, &store));
                    }
                    _ => println!("Usage: task <id> <priority> <duration> [assignees_csv|-] [start]"),
                }
            }
            "name" => {
                let id_s = parts.next();
                let rest = parts.collect::<Vec<_>>().join(" ");
                match id_s {
                    Some(id) => match request.tasks.iter_mut().find(|t| t.id == id) {
                        Some(task) => {
                            task.name = rest;
                            println!("Task {} renamed.", id);
                        }
                        None => println!("Task {} not found.", id),
                    },
                    None => println!("Usage: name <id> <text...>"),
                }
            }
            "deps" => {
                let id_s = parts.next();
                let csv_s = parts.next();
                match (id_s, csv_s) {
                    (Some(id), Some(csv_s)) => match request.tasks.iter_mut().find(|t| t.id == id) {
                        Some(task) => {
                            task.dependencies = if csv_s == "-" {
                                Vec::new()
                            } else {
                                parse_id_list(csv_s)
                            };
                            println!("Dependencies of {} set.", id);
                        }
                        None => println!("Task {} not found.", id),
                    },
                    _ => println!("Usage: deps <id> <csv|->"),
                }
            }
            "delete" => match parts.next() {
                Some(id) => {
                    if request.delete_task(id) {
                        store.remove(id);
                        println!("Deleted task {id}.");
                        println!("{}", render_tasks(&request, &store));
                    } else {
                        println!("Task {id} not found.");
                    }
                }
                None => println!("Usage: delete <id>"),
            },
            "leave" => {
                let employee = parts.next();
                let start_s = parts.next();
                let end_s = parts.next();
                let status_s = parts.next();
                match (employee, start_s.and_then(parse_date), end_s.and_then(parse_date)) {
                    (Some(employee), Some(start), Some(end)) => {
                        if end < start {
                            println!("Leave must end on or after its start.");
                            continue;
                        }
                        let status = match status_s {
                            Some(s) => match LeaveStatus::parse(s) {
                                Some(status) => status,
                                None => {
                                    println!("Invalid status (pending|approved|rejected|cancelled)");
                                    continue;
                                }
                            },
                            None => LeaveStatus::Approved,
                        };
                        let mut leave = LeaveInterval::approved(employee, start, end);
                        leave.status = status;
                        request.leaves.push(leave);
                        println!("Leave added for {} ({} to {}).", employee, start, end);
                    }
                    _ => println!("Usage: leave <employee> <YYYY-MM-DD> <YYYY-MM-DD> [status]"),
                }
            }
            "leaves" => {
                let rows: Vec<Vec<String>> = request
                    .leaves
                    .iter()
                    .map(|l| {
                        vec![
                            l.employee_id.clone(),
                            l.start_date.to_string(),
                            l.end_date.to_string(),
                            l.status.as_str().to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    render_text_table(&["employee", "start", "end", "status"], &rows)
                );
            }
            "anchor" => match parts.next().and_then(parse_date) {
                Some(date) => {
                    request.anchor_date = date;
                    println!("Anchor date set to {}.", date);
                }
                None => println!("Usage: anchor <YYYY-MM-DD>"),
            },
            "calendar" => match parts.next() {
                Some("show") | None => print_calendar_info(&request.calendar),
                Some("days") => match parts.next().and_then(parse_weekday_numbers) {
                    Some(days) => {
                        let mut candidate = request.calendar.clone();
                        candidate.working_days_of_week = days;
                        match candidate.working_days() {
                            Ok(_) => {
                                request.calendar = candidate;
                                print_calendar_info(&request.calendar);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    None => println!("Usage: calendar days <csv of 0..6>"),
                },
                Some("holiday") => match parts.next().and_then(parse_date) {
                    Some(date) => {
                        if !request.calendar.holidays.contains(&date) {
                            request.calendar.holidays.push(date);
                            request.calendar.holidays.sort();
                        }
                        println!("Holiday {} added.", date);
                    }
                    None => println!("Usage: calendar holiday <YYYY-MM-DD>"),
                },
                Some("hours") => match (parts.next(), parts.next()) {
                    (Some(start), Some(end)) => {
                        let candidate = request.calendar.clone().with_working_hours(start, end);
                        match candidate.working_hours_per_day() {
                            Ok(hours) => {
                                request.calendar = candidate;
                                println!("Working hours set ({} hours per day).", hours);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: calendar hours <HH:MM> <HH:MM>"),
                },
                Some("set") => match parts.next() {
                    Some(path) => match fs::read_to_string(path) {
                        Ok(contents) => match serde_json::from_str::<CalendarConfig>(&contents) {
                            Ok(config) => match autoschedule::WorkCalendar::from_config(&config) {
                                Ok(_) => {
                                    request.calendar = config;
                                    println!("Calendar updated from {}.", path);
                                    print_calendar_info(&request.calendar);
                                }
                                Err(e) => println!("Error applying calendar: {}", e),
                            },
                            Err(e) => println!("Invalid calendar JSON: {}", e),
                        },
                        Err(e) => println!("Error reading {}: {}", path, e),
                    },
                    None => println!("Usage: calendar set <json_path>"),
                },
                Some("save") => match parts.next() {
                    Some(path) => match serde_json::to_string_pretty(&request.calendar) {
                        Ok(json) => match fs::write(path, json) {
                            Ok(_) => println!("Calendar saved to {}.", path),
                            Err(e) => println!("Error writing {}: {}", path, e),
                        },
                        Err(e) => println!("Error serializing calendar: {}", e),
                    },
                    None => println!("Usage: calendar save <json_path>"),
                },
                Some(other) => {
                    println!("Unknown calendar command '{}'.", other);
                    println!("Usage: calendar show|days|holiday|hours|set|save");
                }
            },
            "mode" => match (parts.next(), parts.next()) {
                (Some("sequential"), _) => {
                    request.options.mode = SchedulingMode::Sequential;
                    println!("Mode set to sequential.");
                }
                (Some("parallel"), Some(n_s)) => match n_s.parse::<usize>() {
                    Ok(n) if n >= 1 => {
                        request.options.mode = SchedulingMode::Parallel;
                        request.options.max_parallel = n;
                        println!("Mode set to parallel with {} lanes.", n);
                    }
                    _ => println!("Lane count must be a positive integer"),
                },
                _ => println!("Usage: mode sequential|parallel <n>"),
            },
            "force" => match parts.next().map(|s| s.to_ascii_lowercase()) {
                Some(v) if v == "true" || v == "false" => {
                    request.options.force_reschedule = v == "true";
                    println!("force_reschedule set to {}.", v);
                }
                _ => println!("Usage: force <true|false>"),
            },
            "schedule" => match request.run() {
                Ok(outcome) => {
                    let report = apply_schedule(&mut store, &outcome);
                    println!("Schedule computed: {}", outcome.to_cli_summary());
                    println!("Stored dates: {}", report.to_cli_summary());
                    for failure in &outcome.failures {
                        println!("  {} failed: {}", failure.task_id, failure.reason);
                    }
                    if !outcome.ineligible.is_empty() {
                        println!("  without duration: {}", outcome.ineligible.join(", "));
                    }
                    println!("{}", render_results(&outcome));
                    last = Some(outcome);
                }
                Err(e) => println!("Error: {}", e),
            },
            "results" => match &last {
                Some(outcome) => println!("{}", render_results(outcome)),
                None => println!("No schedule computed yet. Run 'schedule' first."),
            },
            "save" => match parts.next() {
                Some(path) => match save_request_to_json(&request, path) {
                    Ok(_) => println!("Request saved to {}.", path),
                    Err(e) => println!("Error saving request: {}", e),
                },
                None => println!("Usage: save <path>"),
            },
            "load" => match parts.next() {
                Some(path) => match load_request_from_json(path) {
                    Ok(loaded) => {
                        request = loaded;
                        store.clear();
                        last = None;
                        println!("Request loaded from {}.", path);
                        println!("{}", render_tasks(&request, &store));
                    }
                    Err(e) => println!("Error loading request: {}", e),
                },
                None => println!("Usage: load <path>"),
            },
            "export" => {
                let fmt = parts.next();
                let path = parts.next();
                match (&last, fmt, path) {
                    (None, _, _) => println!("No schedule computed yet. Run 'schedule' first."),
                    (Some(outcome), Some("json"), Some(path)) => {
                        match save_results_to_json(outcome, path) {
                            Ok(_) => println!("Results exported to {}.", path),
                            Err(e) => println!("Error exporting results: {}", e),
                        }
                    }
                    (Some(outcome), Some("csv"), Some(path)) => {
                        match save_results_to_csv(&outcome.results, path) {
                            Ok(_) => println!("Results exported to {}.", path),
                            Err(e) => println!("Error exporting results: {}", e),
                        }
                    }
                    _ => println!("Usage: export <json|csv> <path>"),
                }
            }
            _ => println!("Unknown command. Type 'help'."),
        }
    }
}
