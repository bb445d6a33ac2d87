//! Keyword relevance filter

use crate::crawler::ExtractedJobRecord;

/// Splits a query into lower-cased keywords
///
/// Whitespace, `,`, `，`, `、` and `·` all separate keywords.
///
/// # Examples
///
/// ```
/// use jobtrawl::crawler::keywords;
///
/// assert_eq!(keywords("Java, Python"), vec!["java", "python"]);
/// assert_eq!(keywords("后端·Go，Rust"), vec!["后端", "go", "rust"]);
/// assert!(keywords("   ").is_empty());
/// ```
pub fn keywords(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || matches!(c, ',' | '，' | '、' | '·'))
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns true if the record matches any keyword of the query
///
/// A blank query matches everything. Otherwise the lower-cased title and
/// description are searched and one matching keyword is enough.
pub fn is_relevant(record: &ExtractedJobRecord, query: &str) -> bool {
    let keywords = keywords(query);
    if keywords.is_empty() {
        return true;
    }

    let content = format!(
        "{} {}",
        record.title.as_deref().unwrap_or_default(),
        record.description.as_deref().unwrap_or_default()
    )
    .to_lowercase();

    if content.trim().is_empty() {
        return true;
    }

    keywords.iter().any(|keyword| content.contains(keyword.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, description: &str) -> ExtractedJobRecord {
        ExtractedJobRecord {
            url: "https://www.zhipin.com/job_detail/3f2a9c1b7d8e4a6f.html".to_string(),
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            ..ExtractedJobRecord::default()
        }
    }

    #[test]
    fn test_keywords_split() {
        assert_eq!(keywords("java,python"), vec!["java", "python"]);
        assert_eq!(keywords(" Java  Spring、MySQL "), vec!["java", "spring", "mysql"]);
        assert!(keywords("").is_empty());
        assert!(keywords(" , ，").is_empty());
    }

    #[test]
    fn test_any_keyword_matches() {
        let query = "java,python";
        assert!(is_relevant(&record("Senior Java Engineer", ""), query));
        assert!(is_relevant(&record("Data Engineer", "We use Python daily"), query));
        assert!(!is_relevant(&record("Graphic Designer", "Photoshop and Figma"), query));
    }

    #[test]
    fn test_blank_query_matches_everything() {
        assert!(is_relevant(&record("Graphic Designer", ""), ""));
        assert!(is_relevant(&record("Graphic Designer", ""), "   "));
    }

    #[test]
    fn test_match_is_case_insensitive_substring() {
        assert!(is_relevant(&record("JAVASCRIPT developer", ""), "java"));
        assert!(is_relevant(&record("后端开发工程师", ""), "后端"));
    }

    #[test]
    fn test_record_without_text_passes() {
        let empty = ExtractedJobRecord {
            url: "https://www.zhipin.com/job_detail/3f2a9c1b7d8e4a6f.html".to_string(),
            ..ExtractedJobRecord::default()
        };
        assert!(is_relevant(&empty, "java"));
    }
}
