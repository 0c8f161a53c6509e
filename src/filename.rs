use crate::report::ReportRecord;
use std::collections::{HashMap, HashSet};

const EXTENSION: &str = "pdf";

/// Keeps letters, digits, `_` and `-`; whitespace runs become one `_`.
pub fn sanitize(name: &str) -> String {
    let safe = name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_");
    if safe.is_empty() {
        "unknown".to_owned()
    } else {
        safe
    }
}

fn stem(record: &ReportRecord) -> String {
    format!(
        "{}_{}",
        sanitize(&record.identity.short_code),
        sanitize(&record.identity.name)
    )
}

/// Names every record, index-aligned with `records`.
///
/// Records that share a short code, or would share a name, are numbered in the order they
/// appear: the first keeps the plain name, then `_2`, `_3`, ... A numbered name that is
/// already taken moves on to the next number, so no two records ever get the same name.
pub fn allocate(records: &[ReportRecord]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();

    records
        .iter()
        .map(|record| {
            let base = stem(record);
            let group = record.identity.short_code.to_uppercase();
            let count = seen.entry(group).or_insert(0);
            *count += 1;
            let mut n = *count;
            loop {
                let filename = if n == 1 {
                    format!("{}.{}", base, EXTENSION)
                } else {
                    format!("{}_{}.{}", base, n, EXTENSION)
                };
                // compare case-insensitively so names stay distinct on any filesystem
                if taken.insert(filename.to_lowercase()) {
                    return filename;
                }
                n += 1;
            }
        })
        .collect()
}

/// Path of a report inside the archive the packaging step builds.
pub fn archive_path(container: &str, filename: &str) -> String {
    format!("{}/{}", container.trim_end_matches('/'), filename)
}
