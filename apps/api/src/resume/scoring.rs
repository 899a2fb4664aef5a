//! Completeness scoring: a 0–100 heuristic of how filled-out a resume is.
//!
//! Points per section:
//! - contact:    name 5, email 5, phone 3, linkedin 4, city + state 3
//! - summary:    >300 chars 15, >200 12, >100 8, any 5
//! - experience: count (≥3 15, ≥2 10, ≥1 5) + per entry description (>200 5, >100 3, any 1)
//! - education:  count (≥2 10, ≥1 8) + per entry (degree + institution 2, GPA 1, activities 2)
//! - skills:     count (≥15 20, ≥10 15, ≥5 10, ≥1 5)
//!
//! The experience and education bonuses are uncapped; only the grand total is
//! clamped to 100. It is not an ATS or quality measure.

use serde::{Deserialize, Serialize};

use crate::resume::models::{Resume, SectionKind};

pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Strong,
    Moderate,
    Weak,
    Missing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionScore {
    pub section: SectionKind,
    pub points: u32,
    /// Nominal ceiling; bonus terms may push `points` past it.
    pub max_points: u32,
    pub entry_count: usize,
    pub status: SectionStatus,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub total: u8,
    pub sections: Vec<SectionScore>,
    pub missing_sections: Vec<SectionKind>,
}

/// Counts Unicode scalar values, so accented text is not over-rewarded.
fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn present(value: &str) -> bool {
    !value.is_empty()
}

fn present_opt(value: Option<&str>) -> bool {
    value.is_some_and(present)
}

fn status_for(points: u32, max_points: u32) -> SectionStatus {
    if points == 0 {
        return SectionStatus::Missing;
    }
    let ratio = f64::from(points.min(max_points)) / f64::from(max_points);
    match ratio {
        r if r >= 0.8 => SectionStatus::Strong,
        r if r >= 0.5 => SectionStatus::Moderate,
        _ => SectionStatus::Weak,
    }
}

fn section(
    section: SectionKind,
    points: u32,
    max_points: u32,
    entry_count: usize,
    recommendations: Vec<String>,
) -> SectionScore {
    SectionScore {
        section,
        points,
        max_points,
        entry_count,
        status: status_for(points, max_points),
        recommendations,
    }
}

fn score_contact(resume: &Resume) -> SectionScore {
    let contact = &resume.contact;
    let mut points = 0;
    let mut recommendations = Vec::new();

    if present(&contact.full_name) {
        points += 5;
    } else {
        recommendations.push("Add your full name".to_string());
    }
    if present(&contact.email) {
        points += 5;
    } else {
        recommendations.push("Add an email address".to_string());
    }
    if present_opt(contact.phone.as_deref()) {
        points += 3;
    } else {
        recommendations.push("Add a phone number".to_string());
    }
    if present_opt(contact.linkedin.as_deref()) {
        points += 4;
    } else {
        recommendations.push("Add your LinkedIn profile".to_string());
    }
    if present_opt(contact.city.as_deref()) && present_opt(contact.state.as_deref()) {
        points += 3;
    } else {
        recommendations.push("Add your city and state".to_string());
    }

    section(SectionKind::Contact, points, 20, 1, recommendations)
}

fn score_summary(resume: &Resume) -> SectionScore {
    let length = resume.summary.as_deref().map(char_len).unwrap_or(0);
    let points = match length {
        0 => 0,
        l if l > 300 => 15,
        l if l > 200 => 12,
        l if l > 100 => 8,
        _ => 5,
    };

    let mut recommendations = Vec::new();
    if length == 0 {
        recommendations.push("Write a professional summary".to_string());
    } else if length <= 300 {
        recommendations
            .push("Expand your summary past 300 characters to highlight key strengths".to_string());
    }

    section(
        SectionKind::Summary,
        points,
        15,
        usize::from(length > 0),
        recommendations,
    )
}

fn score_experience(resume: &Resume) -> SectionScore {
    let count = resume.experiences.len();
    let mut points = match count {
        c if c >= 3 => 15,
        2 => 10,
        1 => 5,
        _ => 0,
    };

    let mut undescribed = 0;
    for entry in &resume.experiences {
        let length = entry.description.as_deref().map(char_len).unwrap_or(0);
        points += match length {
            0 => {
                undescribed += 1;
                0
            }
            l if l > 200 => 5,
            l if l > 100 => 3,
            _ => 1,
        };
    }

    let mut recommendations = Vec::new();
    if count == 0 {
        recommendations.push("Add at least one work experience entry".to_string());
    } else if count < 3 {
        recommendations.push("Add more experience entries to build a complete picture".to_string());
    }
    if undescribed > 0 {
        recommendations.push(format!(
            "{undescribed} experience entries have no description"
        ));
    }

    section(SectionKind::Experience, points, 30, count, recommendations)
}

fn score_education(resume: &Resume) -> SectionScore {
    let count = resume.education.len();
    let mut points = match count {
        c if c >= 2 => 10,
        1 => 8,
        _ => 0,
    };

    for entry in &resume.education {
        if present(&entry.degree) && present(&entry.institution) {
            points += 2;
        }
        if present_opt(entry.gpa.as_deref()) {
            points += 1;
        }
        if present_opt(entry.activities.as_deref()) {
            points += 2;
        }
    }

    let mut recommendations = Vec::new();
    if count == 0 {
        recommendations.push("Add your education".to_string());
    } else if resume
        .education
        .iter()
        .all(|e| !present_opt(e.activities.as_deref()))
    {
        recommendations.push("List activities or honors for your education".to_string());
    }

    section(SectionKind::Education, points, 15, count, recommendations)
}

fn score_skills(resume: &Resume) -> SectionScore {
    let count = resume.skills.len();
    let points = match count {
        c if c >= 15 => 20,
        c if c >= 10 => 15,
        c if c >= 5 => 10,
        c if c >= 1 => 5,
        _ => 0,
    };

    let mut recommendations = Vec::new();
    if count < 15 {
        recommendations.push(format!(
            "Add {} more skills to reach the full skills score",
            15 - count
        ));
    }

    section(SectionKind::Skills, points, 20, count, recommendations)
}

/// Computes the per-section breakdown and the clamped total.
pub fn compute_score_report(resume: &Resume) -> ScoreReport {
    let sections = vec![
        score_contact(resume),
        score_summary(resume),
        score_experience(resume),
        score_education(resume),
        score_skills(resume),
    ];

    let raw: u32 = sections.iter().map(|s| s.points).sum();
    let total = u8::try_from(raw.min(MAX_SCORE)).unwrap_or(u8::MAX);

    let missing_sections = sections
        .iter()
        .filter(|s| s.status == SectionStatus::Missing)
        .map(|s| s.section)
        .collect();

    ScoreReport {
        total,
        sections,
        missing_sections,
    }
}

pub fn compute_score(resume: &Resume) -> u8 {
    compute_score_report(resume).total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{EntryId, NewEducation, NewExperience, NewSkill, ResumeId};
    use chrono::Utc;

    fn empty_resume() -> Resume {
        Resume::new(ResumeId::new(), "Draft".to_string(), "basic".to_string(), Utc::now())
    }

    fn with_skills(n: usize) -> Resume {
        let mut resume = empty_resume();
        for i in 0..n {
            resume.skills.push(
                NewSkill {
                    name: format!("skill-{i}"),
                    category: "Technical".to_string(),
                    level: None,
                }
                .into_entry(EntryId::new()),
            );
        }
        resume
    }

    fn experience(description: Option<String>) -> crate::resume::models::Experience {
        NewExperience {
            role: "Engineer".to_string(),
            company: "Acme".to_string(),
            start_month: "Jan".to_string(),
            start_year: "2020".to_string(),
            currently_working: true,
            description,
            ..NewExperience::default()
        }
        .into_entry(EntryId::new())
    }

    #[test]
    fn test_empty_resume_scores_zero() {
        let report = compute_score_report(&empty_resume());
        assert_eq!(report.total, 0);
        assert_eq!(report.missing_sections.len(), 5);
    }

    #[test]
    fn test_name_and_email_score_ten() {
        let mut resume = empty_resume();
        resume.contact.full_name = "Ada Lovelace".to_string();
        resume.contact.email = "ada@example.com".to_string();
        assert_eq!(compute_score(&resume), 10);
    }

    #[test]
    fn test_full_contact_scores_twenty() {
        let mut resume = empty_resume();
        resume.contact.full_name = "Ada".to_string();
        resume.contact.email = "ada@example.com".to_string();
        resume.contact.phone = Some("555".to_string());
        resume.contact.linkedin = Some("in/ada".to_string());
        resume.contact.city = Some("London".to_string());
        resume.contact.state = Some("LDN".to_string());
        let report = compute_score_report(&resume);
        assert_eq!(report.total, 20);
        assert_eq!(report.sections[0].status, SectionStatus::Strong);
        assert!(report.sections[0].recommendations.is_empty());
    }

    #[test]
    fn test_city_without_state_scores_nothing() {
        let mut resume = empty_resume();
        resume.contact.city = Some("London".to_string());
        assert_eq!(compute_score(&resume), 0);
    }

    #[test]
    fn test_skill_bands() {
        for (n, expected) in [(0, 0), (4, 5), (9, 10), (14, 15), (20, 20)] {
            assert_eq!(compute_score(&with_skills(n)), expected, "{n} skills");
        }
    }

    #[test]
    fn test_summary_bands() {
        for (len, expected) in [(0, 0), (1, 5), (100, 5), (101, 8), (201, 12), (301, 15)] {
            let mut resume = empty_resume();
            if len > 0 {
                resume.summary = Some("a".repeat(len));
            }
            assert_eq!(compute_score(&resume), expected, "summary of {len} chars");
        }
    }

    #[test]
    fn test_empty_summary_string_scores_nothing() {
        let mut resume = empty_resume();
        resume.summary = Some(String::new());
        assert_eq!(compute_score(&resume), 0);
    }

    #[test]
    fn test_summary_length_counts_chars_not_bytes() {
        let mut resume = empty_resume();
        // 60 chars, 120 bytes
        resume.summary = Some("é".repeat(60));
        assert_eq!(compute_score(&resume), 5);
    }

    #[test]
    fn test_single_experience_without_description_scores_five() {
        let mut resume = empty_resume();
        resume.experiences.push(experience(None));
        assert_eq!(compute_score(&resume), 5);
    }

    #[test]
    fn test_experience_description_bonus_is_uncapped() {
        let mut resume = empty_resume();
        for _ in 0..5 {
            resume.experiences.push(experience(Some("x".repeat(250))));
        }
        let report = compute_score_report(&resume);
        // 15 count + 5 * 5 descriptions
        assert_eq!(report.sections[2].points, 40);
        assert_eq!(report.total, 40);
        assert_eq!(report.sections[2].status, SectionStatus::Strong);
    }

    #[test]
    fn test_education_bonuses() {
        let mut resume = empty_resume();
        resume.education.push(
            NewEducation {
                degree: "BSc".to_string(),
                institution: "MIT".to_string(),
                start_year: "2015".to_string(),
                gpa: Some("3.9".to_string()),
                activities: Some("Robotics".to_string()),
                ..NewEducation::default()
            }
            .into_entry(EntryId::new()),
        );
        // 8 count + 2 + 1 + 2
        assert_eq!(compute_score(&resume), 13);
    }

    #[test]
    fn test_total_clamped_to_hundred() {
        let mut resume = with_skills(20);
        resume.contact.full_name = "Ada".to_string();
        resume.contact.email = "ada@example.com".to_string();
        resume.contact.phone = Some("555".to_string());
        resume.contact.linkedin = Some("in/ada".to_string());
        resume.contact.city = Some("London".to_string());
        resume.contact.state = Some("LDN".to_string());
        resume.summary = Some("s".repeat(400));
        for _ in 0..10 {
            resume.experiences.push(experience(Some("x".repeat(250))));
        }
        assert_eq!(compute_score(&resume), 100);
    }
}
