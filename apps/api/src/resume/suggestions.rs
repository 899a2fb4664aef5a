//! Enhancement tips for the editor side panel.
//!
//! All content is fixed text chosen by simple checks on the resume; nothing
//! here calls a model.

use serde::Serialize;

use crate::resume::models::{Resume, SectionKind};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionKind {
    Improvement,
    Strength,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub title: &'static str,
    pub detail: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<&'static str>,
}

const SUGGESTED_SKILLS: &[(&str, &[&str])] = &[
    (
        "Technical",
        &[
            "JavaScript",
            "React",
            "Node.js",
            "TypeScript",
            "CSS",
            "HTML",
            "Python",
            "SQL",
            "AWS",
            "Docker",
        ],
    ),
    (
        "Soft Skills",
        &[
            "Leadership",
            "Communication",
            "Problem Solving",
            "Teamwork",
            "Time Management",
            "Adaptability",
        ],
    ),
    (
        "Languages",
        &["English", "Spanish", "French", "German", "Mandarin", "Japanese"],
    ),
    (
        "Tools",
        &["Git", "VS Code", "Figma", "Adobe XD", "Jira", "Slack", "Photoshop"],
    ),
    (
        "Certifications",
        &[
            "AWS Certified",
            "Google Cloud",
            "Microsoft Azure",
            "Scrum Master",
            "PMP",
        ],
    ),
    (
        "Other",
        &[
            "Project Management",
            "Research",
            "Content Writing",
            "SEO",
            "Digital Marketing",
        ],
    ),
];

fn improvement(title: &'static str, detail: &'static str) -> Suggestion {
    Suggestion {
        kind: SuggestionKind::Improvement,
        title,
        detail,
        before: None,
        example: None,
    }
}

fn strength(title: &'static str, detail: &'static str) -> Suggestion {
    Suggestion {
        kind: SuggestionKind::Strength,
        title,
        detail,
        before: None,
        example: None,
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Tips for one section of `resume`.
pub fn suggestions_for(section: SectionKind, resume: &Resume) -> Vec<Suggestion> {
    let mut tips = Vec::new();
    match section {
        SectionKind::Contact => {
            let contact = &resume.contact;
            if !has_text(contact.linkedin.as_deref()) {
                tips.push(improvement(
                    "Add your LinkedIn profile",
                    "Recruiters routinely check LinkedIn; a profile link makes that one click away.",
                ));
            }
            if !has_text(contact.phone.as_deref()) {
                tips.push(improvement(
                    "Add a phone number",
                    "Give recruiters a direct way to reach you.",
                ));
            }
            if tips.is_empty() {
                tips.push(strength(
                    "Complete contact details",
                    "Your contact section has everything a recruiter needs.",
                ));
            }
        }
        SectionKind::Summary => {
            let length = resume.summary.as_deref().map_or(0, |s| s.chars().count());
            if length == 0 {
                tips.push(improvement(
                    "Write a professional summary",
                    "Open with two or three sentences on who you are and the value you bring.",
                ));
            } else if length <= 200 {
                tips.push(Suggestion {
                    example: Some(
                        "Results-driven developer with 7+ years of experience building responsive, \
                         user-centered web applications, with a track record of cutting load times by 40%.",
                    ),
                    ..improvement(
                        "Expand your summary",
                        "Mention your years of experience, specialties and one measurable result.",
                    )
                });
            } else {
                tips.push(strength(
                    "Strong summary",
                    "Your summary gives a clear overview of your experience.",
                ));
            }
        }
        SectionKind::Experience => {
            if resume.experiences.is_empty() {
                tips.push(improvement(
                    "Add your work experience",
                    "List your most recent roles first with a short description of each.",
                ));
            } else {
                let unquantified = resume.experiences.iter().any(|e| {
                    !e.description
                        .as_deref()
                        .is_some_and(|d| d.chars().any(|c| c.is_ascii_digit() || c == '%'))
                });
                if unquantified {
                    tips.push(Suggestion {
                        example: Some(
                            "Increased website conversion rate by 37% through A/B testing and UI optimizations",
                        ),
                        ..improvement(
                            "Add more quantifiable achievements",
                            "Your experience descriptions could be stronger by adding specific metrics and results.",
                        )
                    });
                }
                tips.push(Suggestion {
                    before: Some("Was responsible for managing the team's projects"),
                    example: Some(
                        "Orchestrated cross-functional team projects, ensuring on-time delivery \
                         and 100% client satisfaction",
                    ),
                    ..improvement(
                        "Use more powerful action verbs",
                        "Replace generic verbs with stronger action verbs to make your achievements stand out.",
                    )
                });
            }
        }
        SectionKind::Education => {
            if resume.education.is_empty() {
                tips.push(improvement(
                    "Add your education",
                    "Include your degree, institution and graduation year.",
                ));
            } else if !resume
                .education
                .iter()
                .any(|e| has_text(e.activities.as_deref()))
            {
                tips.push(improvement(
                    "Highlight activities and honors",
                    "Clubs, leadership roles and awards help an early-career resume stand out.",
                ));
            } else {
                tips.push(strength(
                    "Well-rounded education section",
                    "Your education entries include activities alongside the degree.",
                ));
            }
        }
        SectionKind::Skills => {
            if resume.skills.len() >= 10 {
                tips.push(strength(
                    "Strong skills section",
                    "Your skills section is well-organized and includes relevant technical skills.",
                ));
            } else {
                tips.push(improvement(
                    "Add more relevant skills",
                    "Aim for at least ten skills across technical and soft-skill categories.",
                ));
            }
        }
    }
    tips
}

/// Fixed suggestions for `category`, minus skills the resume already lists
/// (case-insensitive). Unknown categories yield nothing.
pub fn suggested_skills(category: &str, resume: Option<&Resume>) -> Vec<&'static str> {
    let Some((_, skills)) = SUGGESTED_SKILLS
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(category))
    else {
        return Vec::new();
    };

    skills
        .iter()
        .copied()
        .filter(|candidate| {
            resume.map_or(true, |r| {
                !r.skills
                    .iter()
                    .any(|s| s.name.trim().eq_ignore_ascii_case(candidate))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{EntryId, NewExperience, NewSkill, ResumeId};
    use chrono::Utc;

    fn resume() -> Resume {
        Resume::new(ResumeId::new(), "Draft".to_string(), "basic".to_string(), Utc::now())
    }

    #[test]
    fn test_suggested_skills_filters_existing() {
        let mut r = resume();
        r.skills.push(
            NewSkill {
                name: "react".to_string(),
                category: "Technical".to_string(),
                level: None,
            }
            .into_entry(EntryId::new()),
        );
        let skills = suggested_skills("technical", Some(&r));
        assert!(!skills.contains(&"React"));
        assert!(skills.contains(&"JavaScript"));
        assert_eq!(skills.len(), 9);
    }

    #[test]
    fn test_suggested_skills_unknown_category() {
        assert!(suggested_skills("Juggling", None).is_empty());
        assert_eq!(suggested_skills("Languages", None).len(), 6);
    }

    #[test]
    fn test_experience_tips_flag_missing_metrics() {
        let mut r = resume();
        r.experiences.push(
            NewExperience {
                role: "Engineer".to_string(),
                company: "Acme".to_string(),
                description: Some("Worked on the website".to_string()),
                ..NewExperience::default()
            }
            .into_entry(EntryId::new()),
        );
        let tips = suggestions_for(SectionKind::Experience, &r);
        assert!(tips
            .iter()
            .any(|t| t.title == "Add more quantifiable achievements"));

        r.experiences[0].description = Some("Cut latency by 40%".to_string());
        let tips = suggestions_for(SectionKind::Experience, &r);
        assert!(!tips
            .iter()
            .any(|t| t.title == "Add more quantifiable achievements"));
        assert!(tips.iter().any(|t| t.before.is_some()));
    }

    #[test]
    fn test_skills_strength_after_ten() {
        let mut r = resume();
        assert_eq!(
            suggestions_for(SectionKind::Skills, &r)[0].kind,
            SuggestionKind::Improvement
        );
        for i in 0..10 {
            r.skills.push(
                NewSkill {
                    name: format!("s{i}"),
                    category: "Other".to_string(),
                    level: None,
                }
                .into_entry(EntryId::new()),
            );
        }
        assert_eq!(
            suggestions_for(SectionKind::Skills, &r)[0].kind,
            SuggestionKind::Strength
        );
    }

    #[test]
    fn test_empty_summary_asks_for_one() {
        let tips = suggestions_for(SectionKind::Summary, &resume());
        assert_eq!(tips.len(), 1);
        assert_eq!(tips[0].title, "Write a professional summary");
    }
}
