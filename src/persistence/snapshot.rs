//! Snapshot codec: JSON-record dumps of the user directory and registry.
//!
//! Meetings are written one JSON object per line:
//!
//! ```json
//! {"title":"sync","host":"alice","participants":["alice","bob"],"start":"2024-03-15","end":"2024-03-16"}
//! ```
//!
//! Dates are stored at day granularity, so time of day does not survive a
//! round trip. The reader accepts any whitespace-separated stream of
//! records. Restore trusts the dump (no conflict or uniqueness checks) but
//! refuses records naming unknown users or unparsable dates; any error
//! aborts the whole restore.

use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::time_range::{format_ymd, parse_ymd};
use crate::domain::{Meeting, MeetingRegistry, User, UserDirectory};
use crate::error::SnapshotError;

/// Flat, username-referencing form of a [`Meeting`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingRecord {
    /// Meeting title.
    pub title: String,
    /// Host username.
    pub host: String,
    /// Participant usernames, sorted. May omit the host.
    pub participants: Vec<String>,
    /// Start date, `YYYY-MM-DD`.
    pub start: String,
    /// End date, `YYYY-MM-DD`.
    pub end: String,
}

impl From<&Meeting> for MeetingRecord {
    fn from(meeting: &Meeting) -> Self {
        Self {
            title: meeting.title.clone(),
            host: meeting.host.clone(),
            participants: meeting.participants.iter().cloned().collect(),
            start: format_ymd(meeting.start),
            end: format_ymd(meeting.end),
        }
    }
}

impl MeetingRecord {
    /// Rebuilds the meeting, resolving every username against `users`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::UnknownUser`] or
    /// [`SnapshotError::InvalidDate`], tagged with `record`.
    pub fn into_meeting(
        self,
        record: usize,
        users: &UserDirectory,
    ) -> Result<Meeting, SnapshotError> {
        let resolve = |username: &str| {
            if users.contains(username) {
                Ok(())
            } else {
                Err(SnapshotError::UnknownUser {
                    record,
                    username: username.to_string(),
                })
            }
        };
        resolve(&self.host)?;
        for participant in &self.participants {
            resolve(participant)?;
        }

        let date = |value: &str| {
            parse_ymd(value).map_err(|_| SnapshotError::InvalidDate {
                record,
                value: value.to_string(),
            })
        };
        let start = date(&self.start)?;
        let end = date(&self.end)?;

        Ok(Meeting::new(
            self.title,
            self.host,
            self.participants,
            start,
            end,
        ))
    }
}

/// Writes one record per meeting, ordered by title. Returns the count.
///
/// # Errors
///
/// Returns [`SnapshotError`] if encoding or writing fails.
pub fn write_meetings<W: Write>(
    registry: &MeetingRegistry,
    writer: W,
) -> Result<usize, SnapshotError> {
    let mut records: Vec<MeetingRecord> = registry.iter().map(MeetingRecord::from).collect();
    records.sort_by(|a, b| a.title.cmp(&b.title));
    write_records(&records, writer)
}

/// Restores a registry from a meeting record stream.
///
/// # Errors
///
/// Returns the first [`SnapshotError`] encountered; no partial registry is
/// produced.
pub fn read_meetings<R: Read>(
    reader: R,
    users: &UserDirectory,
) -> Result<MeetingRegistry, SnapshotError> {
    let mut registry = MeetingRegistry::new();
    for (index, record) in read_records::<MeetingRecord, _>(reader).enumerate() {
        let meeting = record?.into_meeting(index + 1, users)?;
        registry.restore(meeting);
    }
    Ok(registry)
}

/// Writes one record per user, ordered by username. Returns the count.
///
/// # Errors
///
/// Returns [`SnapshotError`] if encoding or writing fails.
pub fn write_users<W: Write>(users: &UserDirectory, writer: W) -> Result<usize, SnapshotError> {
    let mut records: Vec<&User> = users.iter().collect();
    records.sort_by(|a, b| a.username.cmp(&b.username));
    write_records(&records, writer)
}

/// Restores a user directory from a user record stream. Later records
/// with a repeated username are ignored.
///
/// # Errors
///
/// Returns the first [`SnapshotError`] encountered.
pub fn read_users<R: Read>(reader: R) -> Result<UserDirectory, SnapshotError> {
    read_records::<User, _>(reader).collect()
}

/// In-memory encoding of a full snapshot, ready to be written to storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedSnapshot {
    /// User records.
    pub users: Vec<u8>,
    /// Meeting records.
    pub meetings: Vec<u8>,
    /// Number of user records.
    pub user_count: usize,
    /// Number of meeting records.
    pub meeting_count: usize,
}

impl EncodedSnapshot {
    /// Encodes a directory and registry.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Encode`] if a record cannot be encoded.
    pub fn encode(
        users: &UserDirectory,
        registry: &MeetingRegistry,
    ) -> Result<Self, SnapshotError> {
        let mut user_buf = Vec::new();
        let user_count = write_users(users, &mut user_buf)?;
        let mut meeting_buf = Vec::new();
        let meeting_count = write_meetings(registry, &mut meeting_buf)?;
        Ok(Self {
            users: user_buf,
            meetings: meeting_buf,
            user_count,
            meeting_count,
        })
    }

    /// Decodes users first, then meetings against those users.
    ///
    /// # Errors
    ///
    /// Returns the first [`SnapshotError`] from either stream.
    pub fn decode(&self) -> Result<(UserDirectory, MeetingRegistry), SnapshotError> {
        let users = read_users(self.users.as_slice())?;
        let registry = read_meetings(self.meetings.as_slice(), &users)?;
        Ok((users, registry))
    }
}

fn write_records<T: Serialize, W: Write>(
    records: &[T],
    mut writer: W,
) -> Result<usize, SnapshotError> {
    for (idx, record) in records.iter().enumerate() {
        serde_json::to_writer(&mut writer, record).map_err(|source| {
            if source.is_io() {
                SnapshotError::Io(source.into())
            } else {
                SnapshotError::Encode {
                    record: idx + 1,
                    source,
                }
            }
        })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(records.len())
}

fn read_records<T: DeserializeOwned, R: Read>(
    reader: R,
) -> impl Iterator<Item = Result<T, SnapshotError>> {
    serde_json::Deserializer::from_reader(reader)
        .into_iter::<T>()
        .map(|item| {
            item.map_err(|source| {
                if source.is_io() {
                    SnapshotError::Io(source.into())
                } else {
                    SnapshotError::Json {
                        line: source.line(),
                        source,
                    }
                }
            })
        })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        let Some(t) = Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).single() else {
            panic!("valid timestamp");
        };
        t
    }

    fn directory(names: &[&str]) -> UserDirectory {
        names.iter().map(|n| User::new(*n)).collect()
    }

    fn sample_registry() -> MeetingRegistry {
        let mut reg = MeetingRegistry::new();
        let meetings = [
            Meeting::new("planning", "alice", ["alice", "bob"], at(4, 9), at(5, 17)),
            Meeting::new("retro", "bob", ["carol"], at(6, 14), at(7, 10)),
        ];
        for m in meetings {
            let Ok(()) = reg.host(m) else {
                panic!("sample meeting rejected");
            };
        }
        reg
    }

    #[test]
    fn record_uses_ymd_dates() {
        let m = Meeting::new("sync", "alice", ["bob"], at(15, 10), at(16, 11));
        let record = MeetingRecord::from(&m);
        assert_eq!(record.start, "2024-03-15");
        assert_eq!(record.end, "2024-03-16");
        assert_eq!(record.participants, vec!["bob"]);
        let json = serde_json::to_string(&record).unwrap_or_default();
        assert!(json.starts_with(r#"{"title":"sync","host":"alice","participants":["bob"]"#));
    }

    #[test]
    fn round_trip_preserves_meetings_at_day_granularity() {
        let original = sample_registry();
        let users = directory(&["alice", "bob", "carol"]);

        let mut buf = Vec::new();
        let Ok(count) = write_meetings(&original, &mut buf) else {
            panic!("serialize failed");
        };
        assert_eq!(count, 2);

        let Ok(restored) = read_meetings(buf.as_slice(), &users) else {
            panic!("deserialize failed");
        };
        assert_eq!(restored.len(), original.len());
        for m in original.iter() {
            let Some(r) = restored.lookup(&m.title) else {
                panic!("missing {}", m.title);
            };
            assert_eq!(r.host, m.host);
            assert_eq!(r.participants, m.participants);
            assert_eq!(format_ymd(r.start), format_ymd(m.start));
            assert_eq!(format_ymd(r.end), format_ymd(m.end));
        }
        assert_eq!(restored.related("bob").len(), 2);
        assert_eq!(restored.related("carol").len(), 1);
    }

    #[test]
    fn reads_concatenated_records_and_blank_lines() {
        let input = concat!(
            r#"{"title":"a","host":"u","participants":["u"],"start":"2024-01-01","end":"2024-01-02"}"#,
            r#"{"title":"b","host":"u","participants":[],"start":"2024-01-03","end":"2024-01-04"}"#,
            "\n\n",
        );
        let Ok(reg) = read_meetings(input.as_bytes(), &directory(&["u"])) else {
            panic!("deserialize failed");
        };
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.related("u").len(), 2);
    }

    #[test]
    fn empty_input_yields_empty_registry() {
        let Ok(reg) = read_meetings(&b""[..], &UserDirectory::new()) else {
            panic!("deserialize failed");
        };
        assert!(reg.is_empty());
    }

    #[test]
    fn unknown_user_aborts_restore() {
        let input = concat!(
            r#"{"title":"a","host":"u","participants":["u"],"start":"2024-01-01","end":"2024-01-02"}"#,
            "\n",
            r#"{"title":"b","host":"u","participants":["ghost"],"start":"2024-01-03","end":"2024-01-04"}"#,
            "\n",
        );
        let result = read_meetings(input.as_bytes(), &directory(&["u"]));
        let Err(SnapshotError::UnknownUser { record, username }) = result else {
            panic!("expected unknown user, got {result:?}");
        };
        assert_eq!(record, 2);
        assert_eq!(username, "ghost");
    }

    #[test]
    fn unknown_host_aborts_restore() {
        let input =
            r#"{"title":"a","host":"ghost","participants":["u"],"start":"2024-01-01","end":"2024-01-02"}"#;
        let result = read_meetings(input.as_bytes(), &directory(&["u"]));
        assert!(matches!(result, Err(SnapshotError::UnknownUser { .. })));
    }

    #[test]
    fn bad_date_aborts_restore() {
        let input =
            r#"{"title":"a","host":"u","participants":["u"],"start":"2024-13-01","end":"2024-01-02"}"#;
        let result = read_meetings(input.as_bytes(), &directory(&["u"]));
        let Err(SnapshotError::InvalidDate { record, value }) = result else {
            panic!("expected invalid date, got {result:?}");
        };
        assert_eq!(record, 1);
        assert_eq!(value, "2024-13-01");
    }

    #[test]
    fn malformed_json_aborts_restore() {
        let input = "{\"title\":\"a\",\n\"host\":";
        let result = read_meetings(input.as_bytes(), &directory(&["u"]));
        assert!(matches!(result, Err(SnapshotError::Json { line: 2, .. })));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn encode_failure_names_the_record() {
        let mut buf = Vec::new();
        let result = write_records(&[User::new("ok")], &mut buf)
            .and_then(|_| write_records(&[Unencodable], &mut buf));
        let Err(err) = result else {
            panic!("expected encode error");
        };
        assert!(matches!(err, SnapshotError::Encode { record: 1, .. }));
        assert!(err.to_string().starts_with("cannot encode snapshot record 1"));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_failure_is_io() {
        let result = write_users(&directory(&["alice"]), BrokenPipe);
        assert!(matches!(result, Err(SnapshotError::Io(_))));
    }

    #[test]
    fn users_round_trip() {
        let mut users = directory(&["bob", "alice"]);
        let mut carol = User::new("carol");
        carol.email = Some("carol@example.com".to_string());
        users.add(carol.clone());

        let mut buf = Vec::new();
        let Ok(3) = write_users(&users, &mut buf) else {
            panic!("serialize failed");
        };
        let text = String::from_utf8(buf.clone()).unwrap_or_default();
        assert!(text.starts_with(r#"{"username":"alice"}"#));

        let Ok(restored) = read_users(buf.as_slice()) else {
            panic!("deserialize failed");
        };
        assert_eq!(restored.len(), 3);
        assert_eq!(restored.lookup("carol"), Some(&carol));
    }

    #[test]
    fn encoded_snapshot_decodes_users_before_meetings() {
        let users = directory(&["alice", "bob", "carol"]);
        let Ok(encoded) = EncodedSnapshot::encode(&users, &sample_registry()) else {
            panic!("encode failed");
        };
        assert_eq!((encoded.user_count, encoded.meeting_count), (3, 2));

        let Ok((restored_users, restored)) = encoded.decode() else {
            panic!("decode failed");
        };
        assert_eq!(restored_users.len(), 3);
        assert!(restored.has("planning"));
        assert!(restored.has("retro"));
    }
}
