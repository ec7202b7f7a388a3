//! Reader for the delimited sample format.
//!
//! Labels are interned in first-seen order, so the dense IDs a store hands
//! to the splitter are stable for a given file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexSet;
use percent_encoding::percent_decode_str;

use crate::constants::record::MISSING_RATING;
use crate::data::{Interaction, InteractionStore};
use crate::errors::SplitError;

/// Parse a sample file into an interaction store with its dictionaries.
pub fn read_sample_file(path: impl AsRef<Path>) -> Result<InteractionStore, SplitError> {
    let file = File::open(path.as_ref())?;
    let reader = BufReader::new(file);
    let mut dictionaries = Dictionaries::default();
    let mut interactions = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        interactions.push(parse_line(&line, idx + 1, &mut dictionaries)?);
    }
    Ok(dictionaries.into_store(interactions))
}

#[derive(Default)]
struct Dictionaries {
    users: IndexSet<String>,
    resources: IndexSet<String>,
    tags: IndexSet<String>,
    categories: IndexSet<String>,
}

impl Dictionaries {
    fn into_store(self, interactions: Vec<Interaction>) -> InteractionStore {
        InteractionStore::with_dictionaries(
            interactions,
            self.users.into_iter().collect(),
            self.resources.into_iter().collect(),
            self.tags.into_iter().collect(),
            self.categories.into_iter().collect(),
        )
    }
}

fn parse_line(
    line: &str,
    line_no: usize,
    dictionaries: &mut Dictionaries,
) -> Result<Interaction, SplitError> {
    let fields = split_fields(line, line_no)?;
    if fields.len() < 4 {
        return Err(SplitError::Parse {
            line: line_no,
            reason: format!("expected at least 4 fields, found {}", fields.len()),
        });
    }
    let user = dictionaries.users.insert_full(fields[0].to_string()).0;
    let resource = dictionaries.resources.insert_full(fields[1].to_string()).0;
    let timestamp = fields[2].to_string();
    let tags = parse_tokens(fields[3], line_no)?
        .into_iter()
        .map(|token| dictionaries.tags.insert_full(token).0)
        .collect();
    let categories = match fields.get(4).copied() {
        Some(group) => parse_tokens(group, line_no)?
            .into_iter()
            .map(|token| dictionaries.categories.insert_full(token).0)
            .collect(),
        None => Vec::new(),
    };
    let rating = match fields.get(5) {
        Some(raw) => raw.parse::<f64>().map_err(|err| SplitError::Parse {
            line: line_no,
            reason: format!("invalid rating '{raw}': {err}"),
        })?,
        None => MISSING_RATING,
    };
    Ok(Interaction::new(
        user, resource, tags, timestamp, rating, categories,
    ))
}

/// Split one `"a";"b";"c"` line into unquoted field strings.
fn split_fields(line: &str, line_no: usize) -> Result<Vec<&str>, SplitError> {
    let trimmed = line.trim();
    let inner = trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| SplitError::Parse {
            line: line_no,
            reason: "line is not quote-delimited".to_string(),
        })?;
    Ok(inner.split("\";\"").collect())
}

fn parse_tokens(group: &str, line_no: usize) -> Result<Vec<String>, SplitError> {
    if group.is_empty() {
        return Ok(Vec::new());
    }
    group
        .split(',')
        .map(|token| {
            percent_decode_str(token)
                .decode_utf8()
                .map(|decoded| decoded.into_owned())
                .map_err(|err| SplitError::Parse {
                    line: line_no,
                    reason: format!("invalid token encoding '{token}': {err}"),
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_fixture(lines: &[&str]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        (dir, path)
    }

    #[test]
    fn reads_records_and_interns_labels_in_first_seen_order() {
        let (_dir, path) = write_fixture(&[
            "\"alice\";\"page_a\";\"2011-01-01\";\"rust,systems%20lang\";\"\";\"4\"",
            "\"bob\";\"page_a\";\"2011-01-02\";\"rust\";\"dev\"",
        ]);
        let store = read_sample_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.user_label(0).unwrap(), "alice");
        assert_eq!(store.user_label(1).unwrap(), "bob");
        assert_eq!(store.tag_label(1).unwrap(), "systems lang");
        assert_eq!(store.resource_counts(), &[2]);
        let first = &store.data()[0];
        assert!(first.has_rating());
        assert_eq!(first.rating, 4.0);
        let second = &store.data()[1];
        assert!(!second.has_rating());
        assert_eq!(second.categories, vec![0]);
    }

    #[test]
    fn rejects_unquoted_lines() {
        let (_dir, path) = write_fixture(&["alice;page_a;2011"]);
        let err = read_sample_file(&path).unwrap_err();
        assert!(matches!(err, SplitError::Parse { line: 1, .. }));
    }

    #[test]
    fn rejects_bad_ratings() {
        let (_dir, path) =
            write_fixture(&["\"a\";\"r\";\"t\";\"x\";\"\";\"not-a-number\""]);
        let err = read_sample_file(&path).unwrap_err();
        assert!(matches!(err, SplitError::Parse { line: 1, .. }));
    }

    #[test]
    fn skips_blank_lines() {
        let (_dir, path) = write_fixture(&["", "\"a\";\"r\";\"t\";\"x\";\"\"", ""]);
        let store = read_sample_file(&path).unwrap();
        assert_eq!(store.len(), 1);
    }
}
