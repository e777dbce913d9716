//! Mapping profile repository.
//!
//! Profiles are reusable across jobs: a job only references a profile
//! id and loads the code table read-only at extraction time.

use rusqlite::params;

use crate::mapping::{CodeMapping, CodeMappingEntry};

use super::{Database, DatabaseError};

#[derive(Debug, Clone)]
pub struct MappingProfile {
    pub id: String,
    pub name: String,
    pub entries: Vec<CodeMappingEntry>,
}

/// Creates a profile with its entries and returns its id.
pub fn create(
    db: &Database,
    name: &str,
    entries: &[CodeMappingEntry],
) -> Result<String, DatabaseError> {
    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO mapping_profiles (id, name, created_at) VALUES (?1, ?2, ?3)",
            params![id, name, created_at],
        )?;
        for entry in entries {
            conn.execute(
                "INSERT INTO attendance_code_mappings (profile_id, source_code, target_status)
                 VALUES (?1, ?2, ?3)",
                params![id, entry.source_code, entry.target_status],
            )?;
        }
        Ok(())
    })?;

    Ok(id)
}

/// Loads a profile with its entries.
pub fn find_by_id(db: &Database, id: &str) -> Result<Option<MappingProfile>, DatabaseError> {
    db.with_conn(|conn| {
        let name: Option<String> = conn
            .query_row(
                "SELECT name FROM mapping_profiles WHERE id = ?1",
                params![id],
                |r| r.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        let Some(name) = name else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT source_code, target_status FROM attendance_code_mappings
             WHERE profile_id = ?1 ORDER BY id",
        )?;
        let entries = stmt
            .query_map(params![id], |row| {
                Ok(CodeMappingEntry {
                    source_code: row.get(0)?,
                    target_status: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(MappingProfile {
            id: id.to_string(),
            name,
            entries,
        }))
    })
}

/// Loads a profile directly as a lookup-ready [`CodeMapping`].
pub fn load_mapping(db: &Database, id: &str) -> Result<Option<CodeMapping>, DatabaseError> {
    Ok(find_by_id(db, id)?.map(|profile| CodeMapping::from_entries(profile.entries)))
}

/// Deletes a profile and its entries. Returns whether it existed.
pub fn delete(db: &Database, id: &str) -> Result<bool, DatabaseError> {
    db.with_conn(|conn| {
        let changed = conn.execute("DELETE FROM mapping_profiles WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::IGNORE;

    fn entries() -> Vec<CodeMappingEntry> {
        vec![
            CodeMappingEntry {
                source_code: "A".into(),
                target_status: "Absent".into(),
            },
            CodeMappingEntry {
                source_code: "P".into(),
                target_status: IGNORE.into(),
            },
        ]
    }

    #[test]
    fn create_and_load_profile() {
        let db = Database::open_in_memory().unwrap();
        let id = create(&db, "Gretis codes", &entries()).unwrap();

        let profile = find_by_id(&db, &id).unwrap().unwrap();
        assert_eq!(profile.name, "Gretis codes");
        assert_eq!(profile.entries.len(), 2);

        let mapping = load_mapping(&db, &id).unwrap().unwrap();
        assert_eq!(mapping.actionable_status("a"), Some("Absent"));
        assert_eq!(mapping.actionable_status("P"), None);
    }

    #[test]
    fn delete_cascades_to_entries() {
        let db = Database::open_in_memory().unwrap();
        let id = create(&db, "tmp", &entries()).unwrap();
        assert!(delete(&db, &id).unwrap());
        assert!(find_by_id(&db, &id).unwrap().is_none());

        db.with_conn(|conn| {
            let count: u32 = conn.query_row(
                "SELECT COUNT(*) FROM attendance_code_mappings",
                [],
                |r| r.get(0),
            )?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn unknown_profile_is_none() {
        let db = Database::open_in_memory().unwrap();
        assert!(find_by_id(&db, "nope").unwrap().is_none());
        assert!(load_mapping(&db, "nope").unwrap().is_none());
    }
}
