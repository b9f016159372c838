//! Folder naming for cached meetings: `{YYYY-MM-DD}_{sanitized-title}`.

use crate::api::MeetingSummary;

/// Maximum length of the title part of a folder name
pub const MAX_SLUG_LEN: usize = 50;

/// Make a title safe to use as a folder name.
///
/// Path-hostile characters become `-`, runs of whitespace and dashes collapse
/// into one `-`, and the result is trimmed and capped at `max_len` chars.
pub fn sanitize_title(name: &str, max_len: usize) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '-',
            c if c.is_whitespace() => '-',
            c => c,
        })
        .collect();

    let mut collapsed = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }

    let trimmed = collapsed.trim_matches(|c| c == '-' || c == ' ');
    let slug: String = if trimmed.chars().count() > max_len {
        let cut: String = trimmed.chars().take(max_len).collect();
        cut.trim_end_matches(|c| c == '-' || c == ' ').to_string()
    } else {
        trimmed.to_string()
    };

    if slug.is_empty() {
        "Untitled".to_string()
    } else {
        slug
    }
}

/// Base folder name for a meeting, before collision handling.
pub fn folder_name(meeting: &MeetingSummary) -> String {
    let date = meeting
        .created_at
        .as_deref()
        .and_then(|c| c.get(..10))
        .filter(|d| !d.is_empty())
        .unwrap_or("unknown-date");
    let title = sanitize_title(meeting.title.as_deref().unwrap_or("Untitled"), MAX_SLUG_LEN);
    format!("{}_{}", date, title)
}

/// Folder name with the disambiguating id suffix.
pub fn suffixed_folder_name(meeting: &MeetingSummary) -> String {
    let id_prefix: String = meeting.id.chars().take(8).collect();
    format!("{}_{}", folder_name(meeting), id_prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sanitize_basic() {
        assert_eq!(sanitize_title("Team Standup", 50), "Team-Standup");
        assert_eq!(sanitize_title("Q1: Plan / Review?", 50), "Q1-Plan-Review");
        assert_eq!(sanitize_title("  -- spaced --  ", 50), "spaced");
        assert_eq!(sanitize_title("a  -  b", 50), "a-b");
    }

    #[test]
    fn test_sanitize_empty_is_untitled() {
        assert_eq!(sanitize_title("", 50), "Untitled");
        assert_eq!(sanitize_title("???", 50), "Untitled");
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let long = "Réunion hebdomadaire de l'équipe produit avec les partenaires";
        let slug = sanitize_title(long, 20);
        assert!(slug.chars().count() <= 20);
        assert!(!slug.ends_with('-'));
        assert!(slug.starts_with("Réunion"));
    }

    #[test]
    fn test_folder_name() {
        let meeting = MeetingSummary::from_value(json!({
            "id": "0123456789abcdef",
            "title": "Team Standup",
            "created_at": "2025-01-15T09:00:00Z"
        }))
        .unwrap();
        assert_eq!(folder_name(&meeting), "2025-01-15_Team-Standup");
        assert_eq!(suffixed_folder_name(&meeting), "2025-01-15_Team-Standup_01234567");
    }

    #[test]
    fn test_folder_name_without_date_or_title() {
        let meeting = MeetingSummary::from_value(json!({"id": "x"})).unwrap();
        assert_eq!(folder_name(&meeting), "unknown-date_Untitled");
    }
}
