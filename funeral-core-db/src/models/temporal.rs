use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;
use crate::utils::hash_as_i64;

/// Identifier that survives every version of one logical entity.
pub type BusinessKey = HeaplessString<64>;

/// Generates a fresh business key for a newly created entity.
pub fn new_business_key() -> BusinessKey {
    let mut key = BusinessKey::new();
    // a simple-formatted v4 uuid is 32 ascii chars
    let _ = key.push_str(&Uuid::new_v4().simple().to_string());
    key
}

pub fn parse_business_key(value: &str) -> ApiResult<BusinessKey> {
    if value.is_empty() {
        return Err(ApiError::validation("business key must not be empty"));
    }
    BusinessKey::from_str(value)
        .map_err(|_| ApiError::validation(format!("business key '{value}' is too long (max 64 chars)")))
}

/// Content types persisted under the SCD2 convention.
pub trait TemporalEntity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Entity name used in error messages and logs
    const ENTITY: &'static str;
}

/// Version metadata carried by every row of a temporal table.
///
/// For a given business key, the versions partition time into contiguous,
/// non-overlapping `[valid_from, valid_to)` intervals and at most one version
/// is open (`valid_to = None`, `is_current = true`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalMeta {
    /// Row id, unique per version
    pub id: Uuid,
    pub business_key: BusinessKey,
    /// 1-based, incremented by one on every mutation
    pub version: i32,
    pub valid_from: DateTime<Utc>,
    pub valid_to: Option<DateTime<Utc>>,
    pub is_current: bool,
    /// Content hash of the business fields at this version
    pub hash: i64,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TemporalMeta {
    pub fn initial(business_key: BusinessKey, actor: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_key,
            version: 1,
            valid_from: now,
            valid_to: None,
            is_current: true,
            hash: 0,
            created_by: actor,
            updated_by: actor,
            created_at: now,
            updated_at: now,
        }
    }

    /// Metadata of the version that supersedes this one.
    pub fn successor(&self, actor: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            business_key: self.business_key.clone(),
            version: self.version + 1,
            valid_from: now,
            valid_to: None,
            is_current: true,
            hash: 0,
            created_by: self.created_by,
            updated_by: actor,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    pub fn close(&mut self, now: DateTime<Utc>) {
        self.valid_to = Some(now);
        self.is_current = false;
    }

    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }

    /// Whether this version was the valid one at `instant`.
    pub fn covers(&self, instant: DateTime<Utc>) -> bool {
        self.valid_from <= instant && self.valid_to.map_or(true, |to| instant < to)
    }
}

/// One version of a temporal entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Versioned<T> {
    pub meta: TemporalMeta,
    pub data: T,
}

/// Result of superseding a current version: the closed row and its successor.
#[derive(Debug, Clone)]
pub struct Supersession<T> {
    pub closed: TemporalMeta,
    pub next: Versioned<T>,
}

impl<T: TemporalEntity> Versioned<T> {
    /// Builds version 1 of a new entity.
    pub fn create(
        business_key: BusinessKey,
        data: T,
        actor: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        let mut meta = TemporalMeta::initial(business_key, actor, now);
        meta.hash = hash_as_i64(&data)?;
        Ok(Self { meta, data })
    }

    pub fn business_key(&self) -> &BusinessKey {
        &self.meta.business_key
    }

    pub fn content_hash(&self) -> Result<i64, String> {
        hash_as_i64(&self.data)
    }

    /// Same version metadata, new content. Saving the result creates the next version.
    pub fn with_data(&self, data: T) -> Self {
        Self {
            meta: self.meta.clone(),
            data,
        }
    }

    /// Computes the close-then-insert step for a save.
    ///
    /// `self.meta` must describe the version being superseded and `self.data`
    /// the new content. Returns `None` when the content is unchanged.
    pub fn supersede(&self, actor: Uuid, now: DateTime<Utc>) -> Result<Option<Supersession<T>>, String> {
        if !self.meta.is_current {
            return Err(format!(
                "{} '{}' version {} is not current",
                T::ENTITY,
                self.meta.business_key,
                self.meta.version
            ));
        }
        let hash = self.content_hash()?;
        if hash == self.meta.hash {
            return Ok(None);
        }
        let mut closed = self.meta.clone();
        closed.close(now);
        let mut next_meta = self.meta.successor(actor, now);
        next_meta.hash = hash;
        Ok(Some(Supersession {
            closed,
            next: Versioned {
                meta: next_meta,
                data: self.data.clone(),
            },
        }))
    }
}

impl<T> Identifiable for Versioned<T> {
    fn get_id(&self) -> Uuid {
        self.meta.id
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryViolation {
    #[error("history of '{0}' mixes business keys")]
    MixedBusinessKeys(String),
    #[error("expected version {expected}, found {found}")]
    VersionGap { expected: i32, found: i32 },
    #[error("version {version} is not contiguous with its successor")]
    NonContiguous { version: i32 },
    #[error("version {version} has an empty or inverted validity interval")]
    InvertedInterval { version: i32 },
    #[error("version {version} is open but superseded")]
    OpenNotLast { version: i32 },
    #[error("version {version} has is_current inconsistent with valid_to")]
    CurrentFlagMismatch { version: i32 },
}

/// Checks the SCD2 invariants over the full history of one business key.
///
/// `versions` must be ordered oldest first.
pub fn verify_history<T>(versions: &[Versioned<T>]) -> Result<(), HistoryViolation> {
    let Some(first) = versions.first() else {
        return Ok(());
    };
    let key = &first.meta.business_key;

    for (idx, item) in versions.iter().enumerate() {
        let meta = &item.meta;
        if &meta.business_key != key {
            return Err(HistoryViolation::MixedBusinessKeys(key.to_string()));
        }
        let expected = idx as i32 + 1;
        if meta.version != expected {
            return Err(HistoryViolation::VersionGap {
                expected,
                found: meta.version,
            });
        }
        if meta.is_current != meta.is_open() {
            return Err(HistoryViolation::CurrentFlagMismatch {
                version: meta.version,
            });
        }
        if let Some(valid_to) = meta.valid_to {
            if valid_to < meta.valid_from {
                return Err(HistoryViolation::InvertedInterval {
                    version: meta.version,
                });
            }
        }
        if let Some(next) = versions.get(idx + 1) {
            match meta.valid_to {
                None => {
                    return Err(HistoryViolation::OpenNotLast {
                        version: meta.version,
                    })
                }
                Some(valid_to) if valid_to != next.meta.valid_from => {
                    return Err(HistoryViolation::NonContiguous {
                        version: meta.version,
                    })
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

/// Picks the version valid at `instant` from a history.
pub fn version_as_of<T>(versions: &[Versioned<T>], instant: DateTime<Utc>) -> Option<&Versioned<T>> {
    versions.iter().find(|v| v.meta.covers(instant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl TemporalEntity for Note {
        const ENTITY: &'static str = "Note";
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    fn history(len: usize) -> Vec<Versioned<Note>> {
        let actor = Uuid::new_v4();
        let start = Utc::now();
        let mut current = Versioned::create(parse_business_key("bk-1").unwrap(), note("v1"), actor, start).unwrap();
        let mut out = Vec::new();
        for i in 1..len {
            let step = current
                .with_data(note(&format!("v{}", i + 1)))
                .supersede(actor, start + Duration::minutes(i as i64))
                .unwrap()
                .unwrap();
            out.push(Versioned {
                meta: step.closed,
                data: current.data.clone(),
            });
            current = step.next;
        }
        out.push(current);
        out
    }

    #[test]
    fn test_initial_version() {
        let v = Versioned::create(new_business_key(), note("a"), Uuid::new_v4(), Utc::now()).unwrap();
        assert_eq!(v.meta.version, 1);
        assert!(v.meta.is_current);
        assert!(v.meta.valid_to.is_none());
        assert_eq!(v.meta.hash, v.content_hash().unwrap());
        assert_eq!(v.meta.business_key.len(), 32);
    }

    #[test]
    fn test_supersede_closes_and_increments() {
        let actor = Uuid::new_v4();
        let editor = Uuid::new_v4();
        let t0 = Utc::now();
        let t1 = t0 + Duration::hours(1);
        let v1 = Versioned::create(parse_business_key("bk-1").unwrap(), note("a"), actor, t0).unwrap();

        let step = v1.with_data(note("b")).supersede(editor, t1).unwrap().unwrap();
        assert_eq!(step.closed.valid_to, Some(t1));
        assert!(!step.closed.is_current);
        assert_eq!(step.next.meta.version, 2);
        assert_eq!(step.next.meta.valid_from, t1);
        assert_eq!(step.next.meta.created_by, actor);
        assert_eq!(step.next.meta.updated_by, editor);
        assert_ne!(step.next.meta.id, v1.meta.id);
        assert_eq!(step.next.meta.business_key, v1.meta.business_key);
    }

    #[test]
    fn test_supersede_unchanged_content_is_noop() {
        let v1 = Versioned::create(new_business_key(), note("a"), Uuid::new_v4(), Utc::now()).unwrap();
        assert!(v1.with_data(note("a")).supersede(Uuid::new_v4(), Utc::now()).unwrap().is_none());
    }

    #[test]
    fn test_supersede_rejects_closed_version() {
        let mut v1 = Versioned::create(new_business_key(), note("a"), Uuid::new_v4(), Utc::now()).unwrap();
        v1.meta.close(Utc::now());
        assert!(v1.with_data(note("b")).supersede(Uuid::new_v4(), Utc::now()).is_err());
    }

    #[test]
    fn test_verify_history_accepts_chain() {
        let versions = history(4);
        assert_eq!(verify_history(&versions), Ok(()));
        assert_eq!(versions.iter().filter(|v| v.meta.is_current).count(), 1);
        assert!(versions.last().unwrap().meta.is_open());
    }

    #[test]
    fn test_verify_history_accepts_soft_deleted_chain() {
        let mut versions = history(2);
        let now = Utc::now() + Duration::days(1);
        versions.last_mut().unwrap().meta.close(now);
        assert_eq!(verify_history(&versions), Ok(()));
    }

    #[test]
    fn test_verify_history_detects_violations() {
        let mut gap = history(3);
        gap.remove(1);
        assert!(matches!(verify_history(&gap), Err(HistoryViolation::VersionGap { expected: 2, found: 3 })));

        let mut two_open = history(2);
        two_open[0].meta.valid_to = None;
        two_open[0].meta.is_current = true;
        assert_eq!(verify_history(&two_open), Err(HistoryViolation::OpenNotLast { version: 1 }));

        let mut hole = history(2);
        hole[0].meta.valid_to = Some(hole[1].meta.valid_from - Duration::seconds(1));
        assert_eq!(verify_history(&hole), Err(HistoryViolation::NonContiguous { version: 1 }));

        let mut flag = history(2);
        flag[1].meta.is_current = false;
        assert_eq!(verify_history(&flag), Err(HistoryViolation::CurrentFlagMismatch { version: 2 }));
    }

    #[test]
    fn test_version_as_of() {
        let versions = history(3);
        let second_from = versions[1].meta.valid_from;
        let found = version_as_of(&versions, second_from).unwrap();
        assert_eq!(found.meta.version, 2);
        let before = versions[0].meta.valid_from - Duration::seconds(1);
        assert!(version_as_of(&versions, before).is_none());
        let latest = version_as_of(&versions, Utc::now() + Duration::days(365)).unwrap();
        assert_eq!(latest.meta.version, 3);
    }

    #[test]
    fn test_parse_business_key() {
        assert!(parse_business_key("").is_err());
        assert!(parse_business_key(&"x".repeat(65)).is_err());
        assert_eq!(parse_business_key("bk-1").unwrap().as_str(), "bk-1");
    }
}
