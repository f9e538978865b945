// src/matching/overlap.rs
//! Skill overlap by case-insensitive substring containment.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    /// Distinct, non-blank required skills considered.
    pub required_count: usize,
    /// Required skills (original spelling) with at least one candidate hit.
    pub matched_skills: Vec<String>,
    /// matched / required × 100, or 0 when nothing is required.
    pub percentage: f64,
}

impl SkillOverlap {
    pub fn matched_count(&self) -> usize {
        self.matched_skills.len()
    }

    pub fn rounded(&self) -> i64 {
        self.percentage.round() as i64
    }

    /// Inclusive threshold check on the unrounded percentage.
    pub fn meets(&self, threshold: f64) -> bool {
        self.required_count > 0 && self.percentage >= threshold
    }
}

fn normalize(skill: &str) -> Option<String> {
    let trimmed = skill.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Count required skills that contain, or are contained in, any candidate skill.
///
/// "Node" matches "Node.js" in either direction. Required skills that are
/// equal ignoring case count once.
pub fn estimate_overlap<R, C>(required: &[R], candidate: &[C]) -> SkillOverlap
where
    R: AsRef<str>,
    C: AsRef<str>,
{
    let mut seen = HashSet::new();
    let required: Vec<(&str, String)> = required
        .iter()
        .filter_map(|skill| {
            let normalized = normalize(skill.as_ref())?;
            seen.insert(normalized.clone())
                .then(|| (skill.as_ref().trim(), normalized))
        })
        .collect();

    let candidate: Vec<String> = candidate
        .iter()
        .filter_map(|skill| normalize(skill.as_ref()))
        .collect();

    if required.is_empty() {
        return SkillOverlap {
            required_count: 0,
            matched_skills: Vec::new(),
            percentage: 0.0,
        };
    }

    let matched_skills: Vec<String> = required
        .iter()
        .filter(|(_, needle)| {
            candidate
                .iter()
                .any(|have| have.contains(needle.as_str()) || needle.contains(have.as_str()))
        })
        .map(|(original, _)| original.to_string())
        .collect();

    let percentage = matched_skills.len() as f64 / required.len() as f64 * 100.0;

    SkillOverlap {
        required_count: required.len(),
        matched_skills,
        percentage,
    }
}

/// Merge skill lists keeping the first spelling seen of each skill.
pub fn union_skills<'a, I, S>(lists: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a [S]>,
    S: AsRef<str> + 'a,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for list in lists {
        for skill in list {
            if let Some(key) = normalize(skill.as_ref()) {
                if seen.insert(key) {
                    merged.push(skill.as_ref().trim().to_string());
                }
            }
        }
    }
    merged
}
