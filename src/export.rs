use crate::error::Result;
use crate::session::{PracticeSession, DATE_FORMAT, TIME_FORMAT};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct SessionRow<'a> {
    id: i64,
    date: String,
    time: String,
    location: &'a str,
    instructor: &'a str,
    style: &'a str,
    poses: String,
    satisfaction: u8,
    reflection: &'a str,
    notes: &'a str,
    media: String,
}

impl<'a> From<&'a PracticeSession> for SessionRow<'a> {
    fn from(s: &'a PracticeSession) -> Self {
        Self {
            id: s.id.0,
            date: s.date.format(DATE_FORMAT).to_string(),
            time: s.time.format(TIME_FORMAT).to_string(),
            location: &s.location,
            instructor: &s.instructor,
            style: &s.style,
            poses: s.poses.join("; "),
            satisfaction: s.satisfaction.get(),
            reflection: &s.reflection,
            notes: &s.notes,
            media: s.media_refs.join("; "),
        }
    }
}

/// Write sessions as CSV with a header row.
pub fn export_sessions_csv<W: Write>(sessions: &[PracticeSession], writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for session in sessions {
        csv.serialize(SessionRow::from(session))?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{Satisfaction, SessionId};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_writes_header_and_rows() {
        let session = PracticeSession {
            id: SessionId(1),
            date: NaiveDate::from_ymd_opt(2025, 11, 5).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            location: "Riverside, 2F".to_string(),
            instructor: "Mina".to_string(),
            poses: vec!["Plank".to_string(), "Cobra".to_string()],
            style: "Vinyasa".to_string(),
            reflection: "steady".to_string(),
            notes: String::new(),
            satisfaction: Satisfaction::new(5).unwrap(),
            media_refs: vec![],
        };

        let mut out = Vec::new();
        export_sessions_csv(&[session], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some("id,date,time,location,instructor,style,poses,satisfaction,reflection,notes,media")
        );
        assert_eq!(
            lines.next(),
            Some("1,2025-11-05,10:00,\"Riverside, 2F\",Mina,Vinyasa,Plank; Cobra,5,steady,,")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_empty_export_writes_nothing() {
        let mut out = Vec::new();
        export_sessions_csv(&[], &mut out).unwrap();
        assert!(out.is_empty());
    }
}
