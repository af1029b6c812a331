use application::SearchRequest;
use domain::{Author, Document, Timestamp};
use tracing::trace;

/// Checks whether a document satisfies every dimension of the request.
pub fn matches_request(doc: &Document, request: &SearchRequest) -> bool {
    let matched = matches_prefix(doc.title(), request.title_prefixes.as_deref())
        && matches_substring(doc.content(), request.contains_contents.as_deref())
        && matches_author(doc.author(), request.author_ids.as_deref())
        && matches_date_range(doc.created(), request.created_from, request.created_to);
    trace!(doc_id = ?doc.id(), matched, "Evaluated search criteria");
    matched
}

/// Title starts with at least one prefix.
fn matches_prefix(field: Option<&str>, prefixes: Option<&[String]>) -> bool {
    match prefixes {
        None | Some([]) => true,
        Some(prefixes) => field.is_some_and(|f| prefixes.iter().any(|p| f.starts_with(p.as_str()))),
    }
}

/// Content contains at least one substring.
fn matches_substring(field: Option<&str>, substrings: Option<&[String]>) -> bool {
    match substrings {
        None | Some([]) => true,
        Some(substrings) => {
            field.is_some_and(|f| substrings.iter().any(|s| f.contains(s.as_str())))
        }
    }
}

fn matches_author(author: Option<&Author>, author_ids: Option<&[String]>) -> bool {
    match author_ids {
        None | Some([]) => true,
        Some(ids) => author.is_some_and(|a| ids.contains(&a.id)),
    }
}

/// Both bounds are inclusive. A document without a creation time fails any
/// bound that is set.
fn matches_date_range(
    created: Option<Timestamp>,
    from: Option<Timestamp>,
    to: Option<Timestamp>,
) -> bool {
    let after_from = from.is_none_or(|from| created.is_some_and(|c| c >= from));
    let before_to = to.is_none_or(|to| created.is_some_and(|c| c <= to));
    after_from && before_to
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn at(hour: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn prefix_without_criteria_matches_anything() {
        assert!(matches_prefix(None, None));
        assert!(matches_prefix(None, Some(&[])));
        assert!(matches_prefix(Some("Title"), Some(&[])));
    }

    #[test]
    fn prefix_matches_any_of_the_set() {
        let prefixes = strings(&["Report", "Title O"]);
        assert!(matches_prefix(Some("Title One"), Some(&prefixes)));
        assert!(!matches_prefix(Some("Title Two"), Some(&prefixes)));
        assert!(!matches_prefix(None, Some(&prefixes)));
    }

    #[test]
    fn prefix_match_is_case_sensitive() {
        let prefixes = strings(&["title"]);
        assert!(!matches_prefix(Some("Title One"), Some(&prefixes)));
    }

    #[test]
    fn substring_matches_anywhere_in_content() {
        let substrings = strings(&["needle"]);
        assert!(matches_substring(Some("hay needle hay"), Some(&substrings)));
        assert!(!matches_substring(Some("hay only"), Some(&substrings)));
        assert!(!matches_substring(None, Some(&substrings)));
        assert!(matches_substring(None, None));
    }

    #[test]
    fn author_requires_present_author_in_set() {
        let ids = strings(&["author1", "author3"]);
        let author1 = Author::new("author1", "One");
        let author2 = Author::new("author2", "Two");
        assert!(matches_author(Some(&author1), Some(&ids)));
        assert!(!matches_author(Some(&author2), Some(&ids)));
        assert!(!matches_author(None, Some(&ids)));
        assert!(matches_author(None, Some(&[])));
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        assert!(matches_date_range(Some(at(10)), Some(at(10)), Some(at(12))));
        assert!(matches_date_range(Some(at(12)), Some(at(10)), Some(at(12))));
        assert!(!matches_date_range(Some(at(9)), Some(at(10)), Some(at(12))));
        assert!(!matches_date_range(Some(at(13)), Some(at(10)), Some(at(12))));
    }

    #[test]
    fn date_range_with_single_bound() {
        assert!(matches_date_range(Some(at(1)), None, Some(at(2))));
        assert!(matches_date_range(Some(at(23)), Some(at(2)), None));
        assert!(!matches_date_range(Some(at(1)), Some(at(2)), None));
    }

    #[test]
    fn missing_created_fails_any_set_bound() {
        assert!(matches_date_range(None, None, None));
        assert!(!matches_date_range(None, Some(at(1)), None));
        assert!(!matches_date_range(None, None, Some(at(1))));
    }

    #[test]
    fn request_is_conjunction_across_dimensions() {
        let doc = Document::new()
            .with_title("Title A")
            .with_content("Content A")
            .with_author(Author::new("author1", "Author One"))
            .with_created(at(10));

        let matching = SearchRequest::new()
            .with_title_prefixes(["Title"])
            .with_author_ids(["author1"])
            .with_created_from(at(9));
        assert!(matches_request(&doc, &matching));

        let wrong_author = matching.clone().with_author_ids(["author2"]);
        assert!(!matches_request(&doc, &wrong_author));

        assert!(matches_request(&doc, &SearchRequest::new()));
    }
}
