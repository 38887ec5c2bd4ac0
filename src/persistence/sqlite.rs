use super::{AttendanceBackend, AttendanceMap, PersistenceError, PersistenceResult};
use crate::status::AttendanceStatus;
use chrono::NaiveDate;
use rusqlite::{Connection, params};
use std::collections::BTreeMap;
use std::sync::Mutex;

pub struct SqliteAttendanceBackend {
    connection: Mutex<Connection>,
}

impl SqliteAttendanceBackend {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            CREATE TABLE IF NOT EXISTS attendance (
                member TEXT NOT NULL,
                day TEXT NOT NULL,
                status TEXT NOT NULL,
                PRIMARY KEY (member, day)
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }
}

impl AttendanceBackend for SqliteAttendanceBackend {
    fn save(&self, map: &AttendanceMap) -> PersistenceResult<()> {
        let mut conn = self.connection.lock().expect("sqlite mutex poisoned");
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM attendance", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO attendance (member, day, status) VALUES (?1, ?2, ?3)")?;
            for (member, days) in map {
                for (day, status) in days {
                    stmt.execute(params![
                        member,
                        day.format("%Y-%m-%d").to_string(),
                        status.as_str()
                    ])?;
                }
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn load(&self) -> PersistenceResult<Option<AttendanceMap>> {
        let conn = self.connection.lock().expect("sqlite mutex poisoned");
        let mut stmt =
            conn.prepare("SELECT member, day, status FROM attendance ORDER BY member, day")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut map: AttendanceMap = BTreeMap::new();
        let mut seen_rows = false;
        for row in rows {
            let (member, day, status) = row?;
            seen_rows = true;
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{day}': {e}")))?;
            let status = AttendanceStatus::from_str(&status).ok_or_else(|| {
                PersistenceError::InvalidData(format!("invalid status '{status}'"))
            })?;
            map.entry(member).or_default().insert(date, status);
        }

        if seen_rows { Ok(Some(map)) } else { Ok(None) }
    }
}
