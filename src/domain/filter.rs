use crate::domain::card::{Priority, TaskCard};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Search and filter settings persisted alongside the cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardFilters {
    pub search_query: String,
    #[serde(deserialize_with = "required_nullable")]
    pub filter_tag: Option<String>,
    #[serde(deserialize_with = "required_nullable")]
    pub filter_priority: Option<Priority>,
}

/// The key must be present; `null` is the only way to say "unset"
fn required_nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

impl BoardFilters {
    /// True when no filter narrows the board
    pub fn is_empty(&self) -> bool {
        self.search_query.trim().is_empty()
            && self.active_tag().is_none()
            && self.filter_priority.is_none()
    }

    /// The tag filter, unless it is unset or empty
    pub fn active_tag(&self) -> Option<&str> {
        self.filter_tag.as_deref().filter(|tag| !tag.is_empty())
    }

    /// Checks a single card against all three predicates
    ///
    /// Priority must match exactly, the tag case-insensitively, and the
    /// trimmed query must appear (case-insensitive) in `title + " " + description`.
    pub fn matches(&self, card: &TaskCard) -> bool {
        if let Some(priority) = self.filter_priority {
            if card.priority != priority {
                return false;
            }
        }

        if let Some(tag) = self.active_tag() {
            let tag = tag.to_lowercase();
            match &card.project_tag {
                Some(card_tag) if card_tag.to_lowercase() == tag => {}
                _ => return false,
            }
        }

        let query = self.search_query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }

        let text = format!(
            "{} {}",
            card.title,
            card.description.as_deref().unwrap_or_default()
        );
        text.to_lowercase().contains(&query)
    }
}

/// Cards passing the filters, in board order
pub fn visible_cards(cards: &[TaskCard], filters: &BoardFilters) -> Vec<TaskCard> {
    cards
        .iter()
        .filter(|card| filters.matches(card))
        .cloned()
        .collect()
}

/// Distinct non-empty project tags, trimmed and sorted
pub fn tag_options(cards: &[TaskCard]) -> Vec<String> {
    cards
        .iter()
        .filter_map(|card| card.project_tag.as_deref())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::card::{create_task, CardId, CardInput, ColumnId};
    use chrono::{TimeZone, Utc};

    fn sample_cards() -> Vec<TaskCard> {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        vec![
            create_task(
                CardInput::new("Task 1")
                    .with_description("alpha")
                    .with_project_tag("app")
                    .with_priority(Priority::Low),
                now,
                CardId::new("1"),
            )
            .unwrap(),
            create_task(
                CardInput::new("Task 2")
                    .with_description("beta")
                    .with_project_tag("infra")
                    .with_priority(Priority::High)
                    .in_column(ColumnId::Todo),
                now,
                CardId::new("2"),
            )
            .unwrap(),
        ]
    }

    #[test]
    fn test_search_and_filters_combine() {
        let filters = BoardFilters {
            search_query: "task".to_string(),
            filter_tag: Some("app".to_string()),
            filter_priority: Some(Priority::Low),
        };

        let visible = visible_cards(&sample_cards(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "1");
    }

    #[test]
    fn test_empty_filters_show_everything() {
        let filters = BoardFilters::default();
        assert!(filters.is_empty());
        assert_eq!(visible_cards(&sample_cards(), &filters).len(), 2);
    }

    #[test]
    fn test_search_matches_description_case_insensitive() {
        let filters = BoardFilters {
            search_query: "  BETA ".to_string(),
            ..Default::default()
        };

        let visible = visible_cards(&sample_cards(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "2");
    }

    #[test]
    fn test_search_spans_title_and_description() {
        let filters = BoardFilters {
            search_query: "1 alpha".to_string(),
            ..Default::default()
        };
        assert_eq!(visible_cards(&sample_cards(), &filters).len(), 1);
    }

    #[test]
    fn test_tag_filter_is_case_insensitive() {
        let filters = BoardFilters {
            filter_tag: Some("INFRA".to_string()),
            ..Default::default()
        };

        let visible = visible_cards(&sample_cards(), &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id.as_str(), "2");
    }

    #[test]
    fn test_empty_tag_filter_is_unset() {
        let filters = BoardFilters {
            filter_tag: Some(String::new()),
            ..Default::default()
        };

        assert!(filters.is_empty());
        assert_eq!(visible_cards(&sample_cards(), &filters).len(), 2);
    }

    #[test]
    fn test_filter_keys_are_required_but_nullable() {
        let filters: BoardFilters = serde_json::from_str(
            r#"{"searchQuery":"","filterTag":null,"filterPriority":"low"}"#,
        )
        .unwrap();
        assert_eq!(filters.filter_tag, None);
        assert_eq!(filters.filter_priority, Some(Priority::Low));

        let missing_tag =
            serde_json::from_str::<BoardFilters>(r#"{"searchQuery":"","filterPriority":null}"#);
        assert!(missing_tag.is_err());

        let missing_priority =
            serde_json::from_str::<BoardFilters>(r#"{"searchQuery":"","filterTag":null}"#);
        assert!(missing_priority.is_err());
    }

    #[test]
    fn test_tag_filter_excludes_untagged_cards() {
        let now = Utc::now();
        let untagged = create_task(CardInput::new("No tag"), now, CardId::new("3")).unwrap();
        let filters = BoardFilters {
            filter_tag: Some("app".to_string()),
            ..Default::default()
        };
        assert!(!filters.matches(&untagged));
    }

    #[test]
    fn test_tag_options_distinct_and_sorted() {
        let now = Utc::now();
        let mut cards = sample_cards();
        cards.push(
            create_task(
                CardInput::new("Another").with_project_tag("app"),
                now,
                CardId::new("3"),
            )
            .unwrap(),
        );
        cards.push(create_task(CardInput::new("Untagged"), now, CardId::new("4")).unwrap());

        assert_eq!(tag_options(&cards), vec!["app", "infra"]);
    }
}
