use crate::resume::models::{Contact, Education, Experience, Resume, SectionKind, Skill};

/// Renders a resume as Markdown for the live preview.
///
/// Sections follow `section_order`; empty sections are skipped. Phone and
/// location honor the contact visibility flags, GPA honors `show_gpa`.
pub fn render_markdown(resume: &Resume) -> String {
    let title = if resume.contact.full_name.is_empty() {
        resume.name.as_str()
    } else {
        resume.contact.full_name.as_str()
    };
    let mut md = format!("# {title}\n\n");

    for section in resume.section_order.as_slice() {
        let body = match section {
            SectionKind::Contact => render_contact(&resume.contact),
            SectionKind::Summary => resume
                .summary
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!("{s}\n"))
                .unwrap_or_default(),
            SectionKind::Experience => render_experiences(&resume.experiences),
            SectionKind::Education => render_education(&resume.education),
            SectionKind::Skills => render_skills(&resume.skills),
        };
        if body.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", section.title()));
        md.push_str(&body);
        md.push('\n');
    }
    md
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn render_contact(contact: &Contact) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !contact.email.is_empty() {
        parts.push(contact.email.clone());
    }
    if contact.show_phone {
        if let Some(phone) = non_empty(contact.phone.as_deref()) {
            parts.push(phone.to_string());
        }
    }
    if contact.show_location {
        let location: Vec<&str> = [&contact.city, &contact.state, &contact.country]
            .into_iter()
            .filter_map(|v| non_empty(v.as_deref()))
            .collect();
        if !location.is_empty() {
            parts.push(location.join(", "));
        }
    }
    for link in [&contact.linkedin, &contact.website] {
        if let Some(link) = non_empty(link.as_deref()) {
            parts.push(link.to_string());
        }
    }

    if parts.is_empty() {
        String::new()
    } else {
        format!("{}\n", parts.join(" · "))
    }
}

fn date_range(start: String, end: Option<String>, current: bool) -> String {
    let end = if current {
        "Present".to_string()
    } else {
        end.unwrap_or_default()
    };
    match (start.trim().is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => end,
        (false, true) => start.trim().to_string(),
        (false, false) => format!("{} – {end}", start.trim()),
    }
}

fn render_experiences(entries: &[Experience]) -> String {
    let mut md = String::new();
    for entry in entries {
        md.push_str(&format!("### {} — {}\n", entry.role, entry.company));
        let end = match (entry.end_month.as_deref(), entry.end_year.as_deref()) {
            (None, None) => None,
            (month, year) => Some(
                format!("{} {}", month.unwrap_or_default(), year.unwrap_or_default())
                    .trim()
                    .to_string(),
            ),
        };
        let dates = date_range(
            format!("{} {}", entry.start_month, entry.start_year),
            end,
            entry.currently_working,
        );
        let mut meta = Vec::new();
        if !dates.is_empty() {
            meta.push(dates);
        }
        if let Some(location) = non_empty(entry.location.as_deref()) {
            meta.push(location.to_string());
        }
        if !meta.is_empty() {
            md.push_str(&format!("*{}*\n", meta.join(" | ")));
        }
        if let Some(description) = non_empty(entry.description.as_deref()) {
            md.push_str(&format!("\n{description}\n"));
        }
        md.push('\n');
    }
    md
}

fn render_education(entries: &[Education]) -> String {
    let mut md = String::new();
    for entry in entries {
        md.push_str(&format!("### {} — {}\n", entry.degree, entry.institution));
        let dates = date_range(
            entry.start_year.clone(),
            entry.end_year.clone(),
            entry.currently_studying,
        );
        let mut meta = Vec::new();
        if !dates.is_empty() {
            meta.push(dates);
        }
        if let Some(location) = non_empty(entry.location.as_deref()) {
            meta.push(location.to_string());
        }
        if !meta.is_empty() {
            md.push_str(&format!("*{}*\n", meta.join(" | ")));
        }
        if entry.show_gpa {
            if let Some(gpa) = non_empty(entry.gpa.as_deref()) {
                md.push_str(&format!("- **GPA:** {gpa}\n"));
            }
        }
        if let Some(activities) = non_empty(entry.activities.as_deref()) {
            md.push_str(&format!("- **Activities:** {activities}\n"));
        }
        if let Some(description) = non_empty(entry.description.as_deref()) {
            md.push_str(&format!("\n{description}\n"));
        }
        md.push('\n');
    }
    md
}

fn render_skills(skills: &[Skill]) -> String {
    // Categories in first-seen order.
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for skill in skills {
        let label = match non_empty(skill.level.as_deref()) {
            Some(level) => format!("{} ({level})", skill.name),
            None => skill.name.clone(),
        };
        match groups.iter_mut().find(|(c, _)| *c == skill.category) {
            Some((_, items)) => items.push(label),
            None => groups.push((skill.category.as_str(), vec![label])),
        }
    }

    groups
        .into_iter()
        .map(|(category, items)| format!("- **{category}:** {}\n", items.join(", ")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{
        EntryId, NewEducation, NewExperience, NewSkill, ResumeId, SectionOrder,
    };
    use chrono::Utc;

    fn resume() -> Resume {
        let mut resume = Resume::new(
            ResumeId::new(),
            "Draft".to_string(),
            "basic".to_string(),
            Utc::now(),
        );
        resume.contact.full_name = "Charles Bloomberg".to_string();
        resume.contact.email = "charles@example.com".to_string();
        resume.contact.phone = Some("(621) 799-5548".to_string());
        resume.contact.city = Some("New York".to_string());
        resume.contact.state = Some("NY".to_string());
        resume
    }

    #[test]
    fn test_title_falls_back_to_resume_name() {
        let mut r = resume();
        r.contact.full_name.clear();
        assert!(render_markdown(&r).starts_with("# Draft\n"));
    }

    #[test]
    fn test_contact_visibility_flags() {
        let mut r = resume();
        let md = render_markdown(&r);
        assert!(md.contains("(621) 799-5548"));
        assert!(md.contains("New York, NY"));

        r.contact.show_phone = false;
        r.contact.show_location = false;
        let md = render_markdown(&r);
        assert!(!md.contains("(621) 799-5548"));
        assert!(!md.contains("New York"));
        assert!(md.contains("charles@example.com"));
    }

    #[test]
    fn test_sections_follow_order_and_skip_empty() {
        let mut r = resume();
        r.summary = Some("Results-driven developer.".to_string());
        r.skills.push(
            NewSkill {
                name: "Rust".to_string(),
                category: "Technical".to_string(),
                level: Some("expert".to_string()),
            }
            .into_entry(EntryId::new()),
        );
        r.section_order = SectionOrder::new(vec![
            SectionKind::Skills,
            SectionKind::Experience,
            SectionKind::Summary,
        ])
        .unwrap();

        let md = render_markdown(&r);
        let skills = md.find("## Skills").unwrap();
        let summary = md.find("## Professional Summary").unwrap();
        assert!(skills < summary);
        assert!(!md.contains("## Experience"));
        assert!(!md.contains("## Contact"));
        assert!(md.contains("- **Technical:** Rust (expert)"));
    }

    #[test]
    fn test_current_job_renders_present() {
        let mut r = resume();
        r.experiences.push(
            NewExperience {
                role: "Marketing Analyst".to_string(),
                company: "Google".to_string(),
                start_month: "May".to_string(),
                start_year: "2023".to_string(),
                end_month: Some("Jun".to_string()),
                end_year: Some("2024".to_string()),
                currently_working: true,
                ..NewExperience::default()
            }
            .into_entry(EntryId::new()),
        );
        let md = render_markdown(&r);
        assert!(md.contains("### Marketing Analyst — Google"));
        assert!(md.contains("May 2023 – Present"));
        assert!(!md.contains("2024"));
    }

    #[test]
    fn test_gpa_hidden_when_flag_off() {
        let mut r = resume();
        r.education.push(
            NewEducation {
                degree: "BSc Economics".to_string(),
                institution: "University of Wisconsin".to_string(),
                start_year: "2021".to_string(),
                end_year: Some("2025".to_string()),
                gpa: Some("3.82".to_string()),
                show_gpa: false,
                ..NewEducation::default()
            }
            .into_entry(EntryId::new()),
        );
        let md = render_markdown(&r);
        assert!(md.contains("2021 – 2025"));
        assert!(!md.contains("3.82"));

        r.education[0].show_gpa = true;
        assert!(render_markdown(&r).contains("- **GPA:** 3.82"));
    }

    #[test]
    fn test_skills_grouped_by_first_seen_category() {
        let mut r = resume();
        for (name, category) in [("Rust", "Technical"), ("Jira", "Tools"), ("Go", "Technical")] {
            r.skills.push(
                NewSkill {
                    name: name.to_string(),
                    category: category.to_string(),
                    level: None,
                }
                .into_entry(EntryId::new()),
            );
        }
        let md = render_skills(&r.skills);
        assert_eq!(md, "- **Technical:** Rust, Go\n- **Tools:** Jira\n");
    }
}
