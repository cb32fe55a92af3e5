use crate::spreadsheet::RawCell;
use std::collections::HashSet;

/// Name used for blank header cells
pub const PLACEHOLDER_HEADER: &str = "Column";

/// Trims a header, collapses whitespace runs into `_` and substitutes the
/// placeholder for an empty result.
fn clean_header(text: &str) -> String {
    let name = text.split_whitespace().collect::<Vec<&str>>().join("_");
    if name.is_empty() {
        PLACEHOLDER_HEADER.to_owned()
    } else {
        name
    }
}

/// Turns the header row into unique column names, keeping order and length.
///
/// Later duplicates of a name (compared case-insensitively) get `_2`, `_3`,
/// ... appended; the first occurrence keeps its name. A suffix is never
/// chosen if that name appears anywhere in the row itself, so normalizing
/// an already normalized row changes nothing.
pub fn normalize_headers(cells: &[RawCell]) -> Vec<String> {
    let names: Vec<String> = cells.iter().map(|cell| clean_header(&cell.to_text())).collect();
    let reserved: HashSet<String> = names.iter().map(|name| name.to_lowercase()).collect();
    let mut used = HashSet::<String>::new();
    let mut headers = Vec::with_capacity(names.len());
    for name in names {
        if used.insert(name.to_lowercase()) {
            headers.push(name);
            continue;
        }
        let mut count = 2usize;
        let unique = loop {
            let candidate = format!("{name}_{count}");
            let key = candidate.to_lowercase();
            if !reserved.contains(&key) && used.insert(key) {
                break candidate;
            }
            count += 1;
        };
        headers.push(unique);
    }
    headers
}
