use std::env;
use std::fs;
use std::io::{self, Write};

use attendance_tool::persistence::{MemoryBackend, load_map_from_json, save_map_to_json};
use attendance_tool::projection::{CellKind, DayCell};
use attendance_tool::session::{
    CalendarView, Intent, NavigateDirection, Outcome, Session, dispatch,
};
use attendance_tool::{AttendanceStatus, AttendanceStore, Roster, StoreError};
use chrono::{Datelike, Local, NaiveDate};

fn load_roster() -> Roster {
    match env::var("ATTENDANCE_ROSTER") {
        Ok(raw) => {
            let members: Vec<String> = raw
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if members.is_empty() {
                Roster::default()
            } else {
                Roster::new(members)
            }
        }
        Err(_) => Roster::default(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_date_list(s: &str) -> Option<Vec<NaiveDate>> {
    s.split(',').map(|part| parse_date(part.trim())).collect()
}

fn format_cell(cell: &Option<DayCell>) -> String {
    match cell {
        None => " ".repeat(7),
        Some(cell) => {
            let marker = match cell.kind {
                CellKind::Future => " . ".to_string(),
                CellKind::Resolved(status) => {
                    let letter = status.letter();
                    if letter.is_empty() {
                        "[ ]".to_string()
                    } else {
                        format!("[{letter}]")
                    }
                }
            };
            format!("{:>3} {marker}", cell.date.day())
        }
    }
}

fn render_calendar(view: &CalendarView) -> String {
    let mut out = String::new();
    out.push_str(&format!("Calendar for {}\n", view.member));
    for grid in &view.months {
        out.push_str(&grid.label);
        out.push('\n');
        let mut header = String::new();
        for name in ["Mon", "Tue", "Wed", "Thu", "Fri"] {
            header.push_str(&format!("{name:^7} "));
        }
        out.push_str(header.trim_end());
        out.push('\n');
        for week in &grid.weeks {
            let mut line = String::new();
            for cell in week {
                line.push_str(&format_cell(cell));
                line.push(' ');
            }
            out.push_str(line.trim_end());
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(
        "Legend: [W] work from home  [O] in office  [M] external meeting  [L] leave  [ ] not marked  . upcoming",
    );
    out
}

fn print_updated(view: &CalendarView, save_warning: Option<String>) {
    if let Some(message) = save_warning {
        println!("Warning: {message}");
    }
    println!("{}", render_calendar(view));
}

fn print_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Calendar(view) => println!("{}", render_calendar(&view)),
        Outcome::AwaitingStatus { member, date } => {
            println!("Selected {date} for {member}. Choose a status to finish.");
        }
        Outcome::BulkPrompt { member, eligible } => {
            println!("Eligible dates for {member}:");
            for date in eligible {
                println!("  {date}");
            }
        }
        Outcome::Updated {
            view,
            applied: _,
            save_warning,
        } => print_updated(&view, save_warning),
        Outcome::History { member, entries } => {
            if entries.is_empty() {
                println!("No attendance records for {member}.");
            } else {
                for entry in entries {
                    println!("{}  {}", entry.date, entry.status.label());
                }
            }
        }
        Outcome::Overview { rows } => {
            for row in rows {
                println!("{:<12} {}", row.member, row.status.label());
            }
        }
        Outcome::Stats { member, counts } => {
            println!("Year-to-date counts for {member}:");
            for status in AttendanceStatus::REPORT_COLUMNS {
                println!("  {:<18} {}", status.label(), counts.get(status));
            }
        }
        Outcome::Report { .. } | Outcome::NoReportData => {}
    }
}

fn mark_day(
    store: &mut AttendanceStore,
    session: &mut Session,
    member: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    today: NaiveDate,
) -> Result<Outcome, StoreError> {
    dispatch(
        store,
        session,
        Intent::SelectDay {
            member: member.to_string(),
            date,
        },
        today,
    )?;
    dispatch(store, session, Intent::ChooseStatus { status }, today)
}

fn print_help() {
    println!(
        "Commands:\n  help                                Show this help\n  roster                              List team members\n  show <member>                       Show the three-month calendar\n  nav <member> <back|forward>         Move the calendar window\n  mark <member> <YYYY-MM-DD> <status> Set attendance for a day\n  today <member> <status>             Set attendance for today\n  clear <member> <YYYY-MM-DD>         Clear a marked day\n  eligible <member>                   List dates open for bulk marking\n  bulk <member> <status> <dates_csv>  Mark several days at once (dates like 2024-03-04,2024-03-05)\n  history <member> [month]            Show marked days, newest first\n  overview                            Show everyone's status for today\n  stats <member>                      Show year-to-date counts\n  report [path]                       Write the team report CSV\n  export <member> [path]              Write one member's report CSV\n  save json <path>                    Persist attendance to disk\n  load json <path>                    Load attendance from disk\n  quit|exit                           Exit\n\nStatuses: work-from-home | in-office | external-meeting | leave | not-marked"
    );
}

fn main() {
    let roster = load_roster();
    let mut store = AttendanceStore::new(roster, MemoryBackend::new());
    let mut session = Session::new();

    println!("Attendance Tool (CLI) - type 'help' for commands\n");
    println!("Team: {}", store.roster().members().join(", "));

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

        // One clock read per command; every decision below sees the same date.
        let today = Local::now().date_naive();

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "roster" => {
                for member in store.roster().members() {
                    println!("{member}");
                }
            }
            "show" => match parts.next() {
                Some(member) => {
                    let intent = Intent::ShowCalendar {
                        member: member.to_string(),
                    };
                    match dispatch(&mut store, &mut session, intent, today) {
                        Ok(outcome) => print_outcome(outcome),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: show <member>"),
            },
            "nav" => {
                let member = parts.next();
                let dir_s = parts.next();
                match (member, dir_s) {
                    (Some(member), Some(dir_s)) => {
                        let direction = match dir_s {
                            "back" => NavigateDirection::Back,
                            "forward" => NavigateDirection::Forward,
                            _ => {
                                println!("Invalid direction (back|forward)");
                                continue;
                            }
                        };
                        let intent = Intent::Navigate {
                            member: member.to_string(),
                            direction,
                        };
                        match dispatch(&mut store, &mut session, intent, today) {
                            Ok(outcome) => print_outcome(outcome),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: nav <member> <back|forward>"),
                }
            }
            "mark" => {
                let member = parts.next();
                let date_s = parts.next();
                let status_s = parts.next();
                match (member, date_s, status_s) {
                    (Some(member), Some(date_s), Some(status_s)) => {
                        let date = match parse_date(date_s) {
                            Some(d) => d,
                            None => {
                                println!("Invalid date (YYYY-MM-DD)");
                                continue;
                            }
                        };
                        let status = match AttendanceStatus::from_str(status_s) {
                            Some(s) => s,
                            None => {
                                println!("Unknown status '{}'", status_s);
                                continue;
                            }
                        };
                        match mark_day(&mut store, &mut session, member, date, status, today) {
                            Ok(outcome) => {
                                println!("Marked {} on {} as {}.", member, date, status.label());
                                print_outcome(outcome);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: mark <member> <YYYY-MM-DD> <status>"),
                }
            }
            "today" => {
                let member = parts.next();
                let status_s = parts.next();
                match (member, status_s) {
                    (Some(member), Some(status_s)) => {
                        let status = match AttendanceStatus::from_str(status_s) {
                            Some(s) => s,
                            None => {
                                println!("Unknown status '{}'", status_s);
                                continue;
                            }
                        };
                        match mark_day(&mut store, &mut session, member, today, status, today) {
                            Ok(outcome) => {
                                println!("Marked {} on {} as {}.", member, today, status.label());
                                print_outcome(outcome);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: today <member> <status>"),
                }
            }
            "clear" => {
                let member = parts.next();
                let date_s = parts.next();
                match (member, date_s) {
                    (Some(member), Some(date_s)) => {
                        let date = match parse_date(date_s) {
                            Some(d) => d,
                            None => {
                                println!("Invalid date (YYYY-MM-DD)");
                                continue;
                            }
                        };
                        let intent = Intent::ClearDay {
                            member: member.to_string(),
                            date,
                        };
                        match dispatch(&mut store, &mut session, intent, today) {
                            Ok(outcome) => {
                                println!("Cleared {} on {}.", member, date);
                                print_outcome(outcome);
                            }
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: clear <member> <YYYY-MM-DD>"),
                }
            }
            "eligible" => match parts.next() {
                Some(member) => {
                    let intent = Intent::OpenBulk {
                        member: member.to_string(),
                    };
                    match dispatch(&mut store, &mut session, intent, today) {
                        Ok(outcome) => print_outcome(outcome),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: eligible <member>"),
            },
            "bulk" => {
                let member = parts.next();
                let status_s = parts.next();
                let dates_s = parts.next();
                match (member, status_s, dates_s) {
                    (Some(member), Some(status_s), Some(dates_s)) => {
                        let status = match AttendanceStatus::from_str(status_s) {
                            Some(s) => s,
                            None => {
                                println!("Unknown status '{}'", status_s);
                                continue;
                            }
                        };
                        let dates = match parse_date_list(dates_s) {
                            Some(d) => d,
                            None => {
                                println!("Invalid dates (YYYY-MM-DD,YYYY-MM-DD,...)");
                                continue;
                            }
                        };
                        let intent = Intent::ApplyBulk {
                            member: member.to_string(),
                            dates,
                            status,
                        };
                        match dispatch(&mut store, &mut session, intent, today) {
                            Ok(Outcome::Updated {
                                view,
                                applied,
                                save_warning,
                            }) => {
                                println!("Marked {} day(s) for {}.", applied, member);
                                print_updated(&view, save_warning);
                            }
                            Ok(outcome) => print_outcome(outcome),
                            Err(e) => println!("Error: {}", e),
                        }
                    }
                    _ => println!("Usage: bulk <member> <status> <dates_csv>"),
                }
            }
            "history" => match parts.next() {
                Some(member) => {
                    let month = match parts.next() {
                        Some(raw) => match raw.parse::<u32>() {
                            Ok(m) if (1..=12).contains(&m) => Some(m),
                            _ => {
                                println!("Invalid month (1-12)");
                                continue;
                            }
                        },
                        None => None,
                    };
                    let intent = Intent::ShowHistory {
                        member: member.to_string(),
                        month,
                    };
                    match dispatch(&mut store, &mut session, intent, today) {
                        Ok(outcome) => print_outcome(outcome),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: history <member> [month]"),
            },
            "overview" => match dispatch(&mut store, &mut session, Intent::TeamToday, today) {
                Ok(outcome) => print_outcome(outcome),
                Err(e) => println!("Error: {}", e),
            },
            "stats" => match parts.next() {
                Some(member) => {
                    let intent = Intent::ShowStats {
                        member: member.to_string(),
                    };
                    match dispatch(&mut store, &mut session, intent, today) {
                        Ok(outcome) => print_outcome(outcome),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: stats <member>"),
            },
            "report" => {
                let path = parts.next();
                match dispatch(&mut store, &mut session, Intent::DownloadReport, today) {
                    Ok(Outcome::Report { filename, csv }) => {
                        let target = path.map(str::to_string).unwrap_or(filename);
                        match fs::write(&target, csv) {
                            Ok(_) => println!("Report saved to {}.", target),
                            Err(e) => println!("Error writing {}: {}", target, e),
                        }
                    }
                    Ok(Outcome::NoReportData) => println!("No attendance data to download."),
                    Ok(outcome) => print_outcome(outcome),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "export" => match parts.next() {
                Some(member) => {
                    let path = parts.next();
                    let intent = Intent::DownloadMemberReport {
                        member: member.to_string(),
                    };
                    match dispatch(&mut store, &mut session, intent, today) {
                        Ok(Outcome::Report { filename, csv }) => {
                            let target = path.map(str::to_string).unwrap_or(filename);
                            match fs::write(&target, csv) {
                                Ok(_) => println!("Report saved to {}.", target),
                                Err(e) => println!("Error writing {}: {}", target, e),
                            }
                        }
                        Ok(Outcome::NoReportData) => println!("No attendance data to download."),
                        Ok(outcome) => print_outcome(outcome),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                None => println!("Usage: export <member> [path]"),
            },
            "save" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match save_map_to_json(store.map(), path) {
                        Ok(_) => println!("Attendance saved to {}.", path),
                        Err(e) => println!("Error saving attendance: {}", e),
                    },
                    _ => println!("Usage: save json <path>"),
                }
            }
            "load" => {
                let fmt = parts.next();
                let path = parts.next();
                match (fmt, path) {
                    (Some("json"), Some(path)) => match load_map_from_json(path) {
                        Ok(map) => match store.apply_snapshot(map) {
                            Ok(_) => println!("Attendance loaded from {}.", path),
                            Err(e) => println!("Error loading attendance: {}", e),
                        },
                        Err(e) => println!("Error loading attendance: {}", e),
                    },
                    _ => println!("Usage: load json <path>"),
                }
            }
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
