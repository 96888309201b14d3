/// Converts a 1-based column index to its letter name (1 -> "A", 28 -> "AB").
#[must_use]
pub fn index_to_col_name(index: usize) -> String {
    let mut col_name = String::new();
    let mut n = index;

    while n > 0 {
        let remainder = (n - 1) % 26;
        col_name.insert(0, (b'A' + remainder as u8) as char);
        n = (n - 1) / 26;
    }

    if col_name.is_empty() {
        col_name.push('A');
    }

    col_name
}

/// Converts a column letter name to its 1-based index ("A" -> 1, "ab" -> 28).
#[must_use]
pub fn col_name_to_index(name: &str) -> Option<usize> {
    if name.is_empty() {
        return None;
    }

    let mut result: usize = 0;

    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }

        let val = (c.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        result = result.checked_mul(26)?.checked_add(val)?;
    }

    Some(result)
}

// Split "$B$12" into ("B", 12)
#[must_use]
pub fn split_cell_reference(reference: &str) -> Option<(&str, u32)> {
    let reference = reference.trim();
    let letters_end = reference
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_alphabetic() || *c == '$'))
        .map(|(i, _)| i)?;

    let letters = reference[..letters_end].trim_matches('$');
    let digits = &reference[letters_end..];
    if letters.is_empty() || letters.contains('$') || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let row = digits.parse::<u32>().ok()?;
    Some((letters, row))
}
