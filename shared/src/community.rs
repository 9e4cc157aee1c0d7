/// Community ids are opaque digit strings; upstream never issues anything
/// longer than this.
pub const MAX_COMMUNITY_ID_LEN: usize = 20;

/// Minimum digit-run length accepted when falling back to a bare number scan,
/// so short numerals inside names ("Z9-Market") don't match.
const MIN_BARE_DIGIT_RUN: usize = 3;

/// Pull a community id out of a free-form input: a full community URL, a
/// legacy group URL, or a bare numeric id. Returns `None` when nothing in the
/// input looks like an id, which is a normal negative result, not an error.
pub fn extract_community_id(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    for marker in ["/communities/", "/groups/"] {
        if let Some(id) = digit_run_after(trimmed, marker) {
            return Some(id);
        }
    }

    first_digit_run(trimmed, MIN_BARE_DIGIT_RUN)
}

fn digit_run_after(haystack: &str, marker: &str) -> Option<String> {
    let start = haystack.find(marker)? + marker.len();
    let digits: String = haystack[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    valid_id(digits)
}

fn first_digit_run(haystack: &str, min_len: usize) -> Option<String> {
    let mut run = String::new();
    for ch in haystack.chars() {
        if ch.is_ascii_digit() {
            run.push(ch);
        } else {
            if run.len() >= min_len {
                return valid_id(run);
            }
            run.clear();
        }
    }
    if run.len() >= min_len {
        return valid_id(run);
    }
    None
}

fn valid_id(digits: String) -> Option<String> {
    if digits.is_empty() || digits.len() > MAX_COMMUNITY_ID_LEN {
        return None;
    }
    Some(digits)
}
