use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeId(Uuid);

impl ResumeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ResumeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an experience, education or skill entry.
/// Unique within its containing list only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns an id not present in `taken`.
    pub fn fresh<I>(taken: I) -> Self
    where
        I: IntoIterator<Item = EntryId> + Clone,
    {
        loop {
            let candidate = Self::new();
            if !taken.clone().into_iter().any(|id| id == candidate) {
                return candidate;
            }
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Contact,
    Summary,
    Experience,
    Education,
    Skills,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Contact,
        SectionKind::Summary,
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Contact => "contact",
            SectionKind::Summary => "summary",
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skills => "skills",
        }
    }

    /// Heading used by the preview.
    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Contact => "Contact",
            SectionKind::Summary => "Professional Summary",
            SectionKind::Experience => "Experience",
            SectionKind::Education => "Education",
            SectionKind::Skills => "Skills",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionOrderError {
    #[error("section '{0}' appears more than once in the section order")]
    Duplicate(SectionKind),
}

/// Display order of a resume's sections. Never contains the same section twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SectionKind>", into = "Vec<SectionKind>")]
pub struct SectionOrder(Vec<SectionKind>);

impl SectionOrder {
    pub fn new(sections: Vec<SectionKind>) -> Result<Self, SectionOrderError> {
        for (i, section) in sections.iter().enumerate() {
            if sections[..i].contains(section) {
                return Err(SectionOrderError::Duplicate(*section));
            }
        }
        Ok(Self(sections))
    }

    pub fn as_slice(&self) -> &[SectionKind] {
        &self.0
    }
}

impl Default for SectionOrder {
    fn default() -> Self {
        Self(SectionKind::ALL.to_vec())
    }
}

impl TryFrom<Vec<SectionKind>> for SectionOrder {
    type Error = SectionOrderError;

    fn try_from(sections: Vec<SectionKind>) -> Result<Self, Self::Error> {
        Self::new(sections)
    }
}

impl From<SectionOrder> for Vec<SectionKind> {
    fn from(order: SectionOrder) -> Self {
        order.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resume aggregate
// ────────────────────────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default = "default_true")]
    pub show_location: bool,
    #[serde(default = "default_true")]
    pub show_phone: bool,
}

impl Default for Contact {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            phone: None,
            website: None,
            linkedin: None,
            city: None,
            state: None,
            country: None,
            show_location: true,
            show_phone: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: EntryId,
    pub role: String,
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_month: String,
    pub start_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_month: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<String>,
    /// When set, the end date is ignored by rendering but kept as entered.
    #[serde(default)]
    pub currently_working: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: EntryId,
    pub degree: String,
    pub institution: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start_year: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<String>,
    #[serde(default)]
    pub currently_studying: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpa: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "showGPA", default = "default_true")]
    pub show_gpa: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: EntryId,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: ResumeId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub contact: Contact,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub section_order: SectionOrder,
    pub template: String,
    /// Last score written through a generic update. Not authoritative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

impl Resume {
    pub fn new(id: ResumeId, name: String, template: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at: now,
            updated_at: now,
            contact: Contact::default(),
            summary: None,
            experiences: Vec::new(),
            education: Vec::new(),
            skills: Vec::new(),
            section_order: SectionOrder::default(),
            template,
            score: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// New entries (entries without an id)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExperience {
    pub role: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_month: String,
    pub start_year: String,
    #[serde(default)]
    pub end_month: Option<String>,
    #[serde(default)]
    pub end_year: Option<String>,
    #[serde(default)]
    pub currently_working: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewExperience {
    pub fn into_entry(self, id: EntryId) -> Experience {
        Experience {
            id,
            role: self.role,
            company: self.company,
            location: self.location,
            start_month: self.start_month,
            start_year: self.start_year,
            end_month: self.end_month,
            end_year: self.end_year,
            currently_working: self.currently_working,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEducation {
    pub degree: String,
    pub institution: String,
    #[serde(default)]
    pub location: Option<String>,
    pub start_year: String,
    #[serde(default)]
    pub end_year: Option<String>,
    #[serde(default)]
    pub currently_studying: bool,
    #[serde(default)]
    pub gpa: Option<String>,
    #[serde(default)]
    pub activities: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "showGPA", default = "default_true")]
    pub show_gpa: bool,
}

impl Default for NewEducation {
    fn default() -> Self {
        Self {
            degree: String::new(),
            institution: String::new(),
            location: None,
            start_year: String::new(),
            end_year: None,
            currently_studying: false,
            gpa: None,
            activities: None,
            description: None,
            show_gpa: true,
        }
    }
}

impl NewEducation {
    pub fn into_entry(self, id: EntryId) -> Education {
        Education {
            id,
            degree: self.degree,
            institution: self.institution,
            location: self.location,
            start_year: self.start_year,
            end_year: self.end_year,
            currently_studying: self.currently_studying,
            gpa: self.gpa,
            activities: self.activities,
            description: self.description,
            show_gpa: self.show_gpa,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSkill {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub level: Option<String>,
}

impl NewSkill {
    pub fn into_entry(self, id: EntryId) -> Skill {
        Skill {
            id,
            name: self.name,
            category: self.category,
            level: self.level,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Partial updates
//
// `None` leaves a field untouched. For optional fields `Some(None)` clears the
// value, which on the wire is an explicit `null`.
// ────────────────────────────────────────────────────────────────────────────

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub template: Option<String>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default, deserialize_with = "double_option")]
    pub summary: Option<Option<String>>,
    #[serde(default)]
    pub section_order: Option<SectionOrder>,
    #[serde(default, deserialize_with = "double_option")]
    pub score: Option<Option<u8>>,
}

impl ResumePatch {
    pub fn apply(self, resume: &mut Resume) {
        merge(&mut resume.name, self.name);
        merge(&mut resume.template, self.template);
        merge(&mut resume.contact, self.contact);
        merge(&mut resume.summary, self.summary);
        merge(&mut resume.section_order, self.section_order);
        merge(&mut resume.score, self.score);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperiencePatch {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default)]
    pub start_month: Option<String>,
    #[serde(default)]
    pub start_year: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_month: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_year: Option<Option<String>>,
    #[serde(default)]
    pub currently_working: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl ExperiencePatch {
    pub fn apply(self, entry: &mut Experience) {
        merge(&mut entry.role, self.role);
        merge(&mut entry.company, self.company);
        merge(&mut entry.location, self.location);
        merge(&mut entry.start_month, self.start_month);
        merge(&mut entry.start_year, self.start_year);
        merge(&mut entry.end_month, self.end_month);
        merge(&mut entry.end_year, self.end_year);
        merge(&mut entry.currently_working, self.currently_working);
        merge(&mut entry.description, self.description);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPatch {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub location: Option<Option<String>>,
    #[serde(default)]
    pub start_year: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub end_year: Option<Option<String>>,
    #[serde(default)]
    pub currently_studying: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub gpa: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub activities: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(rename = "showGPA", default)]
    pub show_gpa: Option<bool>,
}

impl EducationPatch {
    pub fn apply(self, entry: &mut Education) {
        merge(&mut entry.degree, self.degree);
        merge(&mut entry.institution, self.institution);
        merge(&mut entry.location, self.location);
        merge(&mut entry.start_year, self.start_year);
        merge(&mut entry.end_year, self.end_year);
        merge(&mut entry.currently_studying, self.currently_studying);
        merge(&mut entry.gpa, self.gpa);
        merge(&mut entry.activities, self.activities);
        merge(&mut entry.description, self.description);
        merge(&mut entry.show_gpa, self.show_gpa);
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub level: Option<Option<String>>,
}

impl SkillPatch {
    pub fn apply(self, entry: &mut Skill) {
        merge(&mut entry.name, self.name);
        merge(&mut entry.category, self.category);
        merge(&mut entry.level, self.level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_section_order() {
        let order = SectionOrder::default();
        assert_eq!(order.as_slice(), &SectionKind::ALL);
    }

    #[test]
    fn test_section_order_rejects_duplicates() {
        let err = SectionOrder::new(vec![SectionKind::Skills, SectionKind::Summary, SectionKind::Skills])
            .unwrap_err();
        assert_eq!(err, SectionOrderError::Duplicate(SectionKind::Skills));
    }

    #[test]
    fn test_section_order_may_omit_sections() {
        let order = SectionOrder::new(vec![SectionKind::Skills, SectionKind::Contact]).unwrap();
        assert_eq!(order.as_slice(), &[SectionKind::Skills, SectionKind::Contact]);
    }

    #[test]
    fn test_section_order_deserialize_rejects_duplicates() {
        let parsed: Result<SectionOrder, _> = serde_json::from_value(json!(["contact", "contact"]));
        assert!(parsed.is_err());
        let parsed: Result<SectionOrder, _> = serde_json::from_value(json!(["contact", "projects"]));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_contact_wire_shape() {
        let contact = Contact {
            full_name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..Contact::default()
        };
        let value = serde_json::to_value(&contact).unwrap();
        assert_eq!(
            value,
            json!({
                "fullName": "Ada Lovelace",
                "email": "ada@example.com",
                "showLocation": true,
                "showPhone": true
            })
        );
    }

    #[test]
    fn test_education_show_gpa_rename() {
        let entry = NewEducation {
            degree: "BSc".to_string(),
            show_gpa: false,
            ..NewEducation::default()
        }
        .into_entry(EntryId::new());
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["showGPA"], json!(false));
    }

    #[test]
    fn test_patch_null_clears_optional_field() {
        let mut entry = NewExperience {
            role: "Engineer".to_string(),
            description: Some("Built things".to_string()),
            location: Some("Berlin".to_string()),
            ..NewExperience::default()
        }
        .into_entry(EntryId::new());

        let patch: ExperiencePatch =
            serde_json::from_value(json!({ "description": null, "company": "Acme" })).unwrap();
        patch.apply(&mut entry);

        assert_eq!(entry.description, None);
        assert_eq!(entry.company, "Acme");
        assert_eq!(entry.location.as_deref(), Some("Berlin"));
        assert_eq!(entry.role, "Engineer");
    }

    #[test]
    fn test_resume_patch_leaves_absent_fields() {
        let mut resume = Resume::new(
            ResumeId::new(),
            "Draft".to_string(),
            "basic".to_string(),
            Utc::now(),
        );
        resume.summary = Some("Hello".to_string());

        let patch: ResumePatch = serde_json::from_value(json!({ "name": "Final" })).unwrap();
        patch.apply(&mut resume);

        assert_eq!(resume.name, "Final");
        assert_eq!(resume.summary.as_deref(), Some("Hello"));
        assert_eq!(resume.template, "basic");
    }

    #[test]
    fn test_fresh_entry_id_avoids_taken() {
        let taken = [EntryId::new(), EntryId::new()];
        let id = EntryId::fresh(taken.iter().copied());
        assert!(!taken.contains(&id));
    }
}
