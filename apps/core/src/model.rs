use serde::{Deserialize, Serialize};

/// Identifier of the sentinel "create new" row appended to the dropdown when
/// record creation is enabled.
pub const CREATE_NEW_ID: &str = "create-new";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Record {
    pub fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subtitle: None,
            icon: None,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon = Some(icon.to_string());
        self
    }
}

/// Query form used for change detection: trimmed, `*` wildcards removed,
/// lower-cased.
pub fn normalize_query(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '*')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Looser form used when ranking titles: alphanumerics only, lower-cased.
pub fn normalize_for_search(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{normalize_for_search, normalize_query, Record};

    #[test]
    fn query_normalization_trims_strips_wildcards_and_lowercases() {
        assert_eq!(normalize_query("  Acme  "), "acme");
        assert_eq!(normalize_query("*Ac*me*"), "acme");
        assert_eq!(normalize_query("   "), "");
        assert_eq!(normalize_query("Big Co"), "big co");
    }

    #[test]
    fn search_normalization_drops_punctuation() {
        assert_eq!(normalize_for_search("Acme, Inc."), "acmeinc");
    }

    #[test]
    fn record_serializes_without_empty_optionals() {
        let encoded = serde_json::to_string(&Record::new("1", "Acme")).unwrap();
        assert_eq!(encoded, r#"{"id":"1","title":"Acme"}"#);

        let decoded: Record =
            serde_json::from_str(r#"{"id":"2","title":"Globex","subtitle":"Energy"}"#).unwrap();
        assert_eq!(decoded, Record::new("2", "Globex").with_subtitle("Energy"));
    }
}
