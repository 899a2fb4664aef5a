//! The resume store: sole owner of every resume in the session.
//!
//! Every content mutation works on a copy of the resume, bumps `updated_at`,
//! swaps the copy in and appends it to that resume's history. Operations that
//! address an unknown resume or entry return an error and leave state untouched.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::persistence::{PersistError, SlotStorage};
use crate::resume::history::{History, DEFAULT_HISTORY_LIMIT};
use crate::resume::models::{
    Contact, EducationPatch, EntryId, ExperiencePatch, NewEducation, NewExperience, NewSkill,
    Resume, ResumeId, ResumePatch, SectionOrder, SkillPatch,
};
use crate::resume::scoring::{compute_score, compute_score_report, ScoreReport};

/// Handle shared by every consumer of the store.
pub type SharedStore = Arc<RwLock<ResumeStore>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("resume {0} not found")]
    ResumeNotFound(ResumeId),

    #[error("entry {entry_id} not found in resume {resume_id}")]
    EntryNotFound {
        resume_id: ResumeId,
        entry_id: EntryId,
    },

    #[error("resume {0} has nothing to undo")]
    NothingToUndo(ResumeId),
}

/// Serialized form of the whole store, written to a single slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStore {
    #[serde(default)]
    pub resumes: Vec<Resume>,
    #[serde(default)]
    pub current_resume_id: Option<ResumeId>,
    #[serde(default)]
    pub resume_history: BTreeMap<ResumeId, Vec<Resume>>,
}

#[derive(Debug, Clone)]
pub struct ResumeStore {
    resumes: Vec<Resume>,
    current_resume_id: Option<ResumeId>,
    history: BTreeMap<ResumeId, History>,
    history_limit: usize,
}

impl Default for ResumeStore {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

/// Strictly after `previous`, normally the wall clock.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

impl ResumeStore {
    pub fn new(history_limit: usize) -> Self {
        Self {
            resumes: Vec::new(),
            current_resume_id: None,
            history: BTreeMap::new(),
            history_limit,
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(RwLock::new(self))
    }

    // ── Reads ────────────────────────────────────────────────────────────────

    /// All resumes in creation order.
    pub fn resumes(&self) -> &[Resume] {
        &self.resumes
    }

    pub fn get(&self, id: ResumeId) -> Option<&Resume> {
        self.resumes.iter().find(|r| r.id == id)
    }

    pub fn current_resume_id(&self) -> Option<ResumeId> {
        self.current_resume_id
    }

    /// Number of snapshots held for `id`; 0 when unknown.
    pub fn history_len(&self, id: ResumeId) -> usize {
        self.history.get(&id).map_or(0, History::len)
    }

    /// Completeness score; 0 for an unknown resume.
    pub fn resume_score(&self, id: ResumeId) -> u8 {
        self.get(id).map_or(0, compute_score)
    }

    pub fn score_report(&self, id: ResumeId) -> Result<ScoreReport, StoreError> {
        self.get(id)
            .map(compute_score_report)
            .ok_or(StoreError::ResumeNotFound(id))
    }

    // ── Resume lifecycle ─────────────────────────────────────────────────────

    pub fn create_resume(&mut self, name: impl Into<String>, template: impl Into<String>) -> ResumeId {
        let id = loop {
            let candidate = ResumeId::new();
            if self.get(candidate).is_none() {
                break candidate;
            }
        };

        let resume = Resume::new(id, name.into(), template.into(), Utc::now());
        self.history
            .insert(id, History::seeded(resume.clone(), self.history_limit));
        self.resumes.push(resume);
        self.current_resume_id = Some(id);

        info!("Created resume {id}");
        id
    }

    pub fn update_resume(&mut self, id: ResumeId, patch: ResumePatch) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            patch.apply(resume);
            Ok(())
        })
    }

    /// Removes the resume and its history, and clears the current pointer if it pointed here.
    pub fn delete_resume(&mut self, id: ResumeId) -> Result<(), StoreError> {
        let index = self.position(id)?;
        self.resumes.remove(index);
        self.history.remove(&id);
        if self.current_resume_id == Some(id) {
            self.current_resume_id = None;
        }
        info!("Deleted resume {id}");
        Ok(())
    }

    pub fn set_current_resume(&mut self, id: Option<ResumeId>) -> Result<(), StoreError> {
        if let Some(id) = id {
            self.position(id)?;
        }
        self.current_resume_id = id;
        Ok(())
    }

    /// Forgets every resume, all history and the current pointer.
    pub fn clear(&mut self) {
        let count = self.resumes.len();
        self.resumes.clear();
        self.history.clear();
        self.current_resume_id = None;
        info!("Cleared session ({count} resumes)");
    }

    // ── Section mutations ────────────────────────────────────────────────────

    pub fn update_contact(&mut self, id: ResumeId, contact: Contact) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            resume.contact = contact;
            Ok(())
        })
    }

    pub fn update_summary(&mut self, id: ResumeId, summary: String) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            resume.summary = Some(summary);
            Ok(())
        })
    }

    pub fn update_section_order(
        &mut self,
        id: ResumeId,
        section_order: SectionOrder,
    ) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            resume.section_order = section_order;
            Ok(())
        })
    }

    pub fn add_experience(
        &mut self,
        id: ResumeId,
        experience: NewExperience,
    ) -> Result<EntryId, StoreError> {
        self.mutate(id, |resume| {
            let entry_id = EntryId::fresh(resume.experiences.iter().map(|e| e.id));
            resume.experiences.push(experience.into_entry(entry_id));
            Ok(entry_id)
        })
    }

    pub fn update_experience(
        &mut self,
        id: ResumeId,
        entry_id: EntryId,
        patch: ExperiencePatch,
    ) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            let entry = resume
                .experiences
                .iter_mut()
                .find(|e| e.id == entry_id)
                .ok_or(StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                })?;
            patch.apply(entry);
            Ok(())
        })
    }

    pub fn delete_experience(&mut self, id: ResumeId, entry_id: EntryId) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            remove_entry(&mut resume.experiences, |e| e.id == entry_id).ok_or(
                StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                },
            )
        })
    }

    pub fn add_education(
        &mut self,
        id: ResumeId,
        education: NewEducation,
    ) -> Result<EntryId, StoreError> {
        self.mutate(id, |resume| {
            let entry_id = EntryId::fresh(resume.education.iter().map(|e| e.id));
            resume.education.push(education.into_entry(entry_id));
            Ok(entry_id)
        })
    }

    pub fn update_education(
        &mut self,
        id: ResumeId,
        entry_id: EntryId,
        patch: EducationPatch,
    ) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            let entry = resume
                .education
                .iter_mut()
                .find(|e| e.id == entry_id)
                .ok_or(StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                })?;
            patch.apply(entry);
            Ok(())
        })
    }

    pub fn delete_education(&mut self, id: ResumeId, entry_id: EntryId) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            remove_entry(&mut resume.education, |e| e.id == entry_id).ok_or(
                StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                },
            )
        })
    }

    pub fn add_skill(&mut self, id: ResumeId, skill: NewSkill) -> Result<EntryId, StoreError> {
        self.mutate(id, |resume| {
            let entry_id = EntryId::fresh(resume.skills.iter().map(|s| s.id));
            resume.skills.push(skill.into_entry(entry_id));
            Ok(entry_id)
        })
    }

    pub fn update_skill(
        &mut self,
        id: ResumeId,
        entry_id: EntryId,
        patch: SkillPatch,
    ) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            let entry = resume
                .skills
                .iter_mut()
                .find(|s| s.id == entry_id)
                .ok_or(StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                })?;
            patch.apply(entry);
            Ok(())
        })
    }

    pub fn delete_skill(&mut self, id: ResumeId, entry_id: EntryId) -> Result<(), StoreError> {
        self.mutate(id, |resume| {
            remove_entry(&mut resume.skills, |s| s.id == entry_id).ok_or(
                StoreError::EntryNotFound {
                    resume_id: id,
                    entry_id,
                },
            )
        })
    }

    // ── History ──────────────────────────────────────────────────────────────

    /// Reverts the resume to its previous snapshot. There is no redo.
    pub fn undo(&mut self, id: ResumeId) -> Result<(), StoreError> {
        let index = self.position(id)?;
        let history = self
            .history
            .get_mut(&id)
            .ok_or(StoreError::NothingToUndo(id))?;
        let previous = history.undo().cloned().ok_or(StoreError::NothingToUndo(id))?;
        self.resumes[index] = previous;
        debug!("Undo on resume {id}, {} snapshots left", history.len());
        Ok(())
    }

    // ── Persistence ──────────────────────────────────────────────────────────

    pub fn to_persisted(&self) -> PersistedStore {
        PersistedStore {
            resumes: self.resumes.clone(),
            current_resume_id: self.current_resume_id,
            resume_history: self
                .history
                .iter()
                .map(|(id, history)| (*id, history.to_vec()))
                .collect(),
        }
    }

    /// Rebuilds a store from its serialized form, repairing what would break invariants:
    /// duplicate resume ids are dropped, resumes without history are re-seeded, orphaned
    /// histories are discarded and a dangling current id is cleared.
    pub fn from_persisted(persisted: PersistedStore, history_limit: usize) -> Self {
        let PersistedStore {
            resumes: persisted_resumes,
            current_resume_id,
            mut resume_history,
        } = persisted;

        let mut seen = HashSet::new();
        let mut resumes = Vec::with_capacity(persisted_resumes.len());
        let mut history = BTreeMap::new();

        for resume in persisted_resumes {
            if !seen.insert(resume.id) {
                warn!("Dropping duplicate resume {} from persisted state", resume.id);
                continue;
            }
            let snapshots = resume_history.remove(&resume.id).unwrap_or_default();
            let restored = History::from_snapshots(snapshots, history_limit).unwrap_or_else(|| {
                warn!("Resume {} had no history; seeding from its current state", resume.id);
                History::seeded(resume.clone(), history_limit)
            });
            history.insert(resume.id, restored);
            resumes.push(resume);
        }

        if !resume_history.is_empty() {
            warn!(
                "Discarding history for {} resumes that no longer exist",
                resume_history.len()
            );
        }

        let current_resume_id = current_resume_id.filter(|id| seen.contains(id));

        Self {
            resumes,
            current_resume_id,
            history,
            history_limit,
        }
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string(&self.to_persisted())?)
    }

    /// Replaces the in-memory state with the contents of `key`.
    /// Returns `false` (and leaves the store as is) when the slot is empty.
    pub fn rehydrate(&mut self, storage: &dyn SlotStorage, key: &str) -> Result<bool, PersistError> {
        let Some(blob) = storage.read(key)? else {
            info!("Slot '{key}' is empty; starting with an empty store");
            return Ok(false);
        };
        let persisted: PersistedStore = serde_json::from_str(&blob)?;
        *self = Self::from_persisted(persisted, self.history_limit);
        info!(
            "Rehydrated {} resumes from slot '{key}'",
            self.resumes.len()
        );
        Ok(true)
    }

    // ── Internals ────────────────────────────────────────────────────────────

    fn position(&self, id: ResumeId) -> Result<usize, StoreError> {
        self.resumes
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::ResumeNotFound(id))
    }

    /// Applies `op` to a copy of the resume; commits only if `op` succeeds.
    fn mutate<T>(
        &mut self,
        id: ResumeId,
        op: impl FnOnce(&mut Resume) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let index = self.position(id)?;
        let mut next = self.resumes[index].clone();
        let output = op(&mut next)?;
        next.updated_at = next_timestamp(self.resumes[index].updated_at);

        match self.history.get_mut(&id) {
            Some(history) => history.push(next.clone()),
            None => {
                self.history
                    .insert(id, History::seeded(next.clone(), self.history_limit));
            }
        }
        self.resumes[index] = next;

        debug!("Mutated resume {id}");
        Ok(output)
    }
}

fn remove_entry<T>(entries: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> Option<()> {
    let index = entries.iter().position(matches)?;
    entries.remove(index);
    Some(())
}
