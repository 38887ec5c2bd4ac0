#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::net::SocketAddr;

    use attendance_tool::http_api;

    let addr: SocketAddr = std::env::var("ATTENDANCE_HTTP_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string())
        .parse()?;

    let mut store = build_store(load_roster());
    match store.hydrate() {
        Ok(records) => println!("loaded {records} attendance record(s)"),
        Err(err) => eprintln!("starting with empty attendance data: {err}"),
    }

    println!("attendance-tool HTTP API listening on http://{addr}");
    http_api::serve(addr, store).await?;
    Ok(())
}

#[cfg(feature = "http_api")]
fn load_roster() -> attendance_tool::Roster {
    use attendance_tool::Roster;

    match std::env::var("ATTENDANCE_ROSTER") {
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

/// Picks the backend from the environment. `ATTENDANCE_DB` selects SQLite
/// when that feature is compiled in, `ATTENDANCE_FILE` selects a JSON file,
/// otherwise state lives in memory for the lifetime of the process.
#[cfg(feature = "http_api")]
fn build_store(roster: attendance_tool::Roster) -> attendance_tool::AttendanceStore {
    use attendance_tool::AttendanceStore;
    use attendance_tool::persistence::{JsonFileBackend, MemoryBackend};

    #[cfg(feature = "sqlite")]
    if let Ok(path) = std::env::var("ATTENDANCE_DB") {
        match attendance_tool::SqliteAttendanceBackend::new(&path) {
            Ok(backend) => return AttendanceStore::new(roster, backend),
            Err(err) => eprintln!("could not open sqlite database {path}: {err}"),
        }
    }

    if let Ok(path) = std::env::var("ATTENDANCE_FILE") {
        return AttendanceStore::new(roster, JsonFileBackend::new(path));
    }

    AttendanceStore::new(roster, MemoryBackend::new())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
