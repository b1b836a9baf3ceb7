use std::collections::HashMap;

use crate::error::{WordcloudError, WordcloudResult, WordlistIssue};
use crate::stream::TextInput;

const SEPARATOR: char = ';';

pub type Frequencies = HashMap<String, u64>;

/// Parses `word;count` lines into a frequency table.
///
/// Blank lines are skipped. The first malformed line aborts the parse and no
/// partial table is returned. Later duplicates overwrite earlier ones. The
/// input is consumed and released before returning.
pub fn parse_wordlist(input: TextInput) -> WordcloudResult<Frequencies> {
    let lines = input.lines();
    let label = lines.label().to_string();
    let mut frequencies = Frequencies::new();

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let (word, count) = parse_entry(trimmed).map_err(|reason| WordcloudError::Wordlist {
            label: label.clone(),
            line_number: idx + 1,
            line: trimmed.to_string(),
            reason,
        })?;
        frequencies.insert(word.to_string(), count);
    }

    Ok(frequencies)
}

fn parse_entry(line: &str) -> Result<(&str, u64), WordlistIssue> {
    let (word, count) = line
        .split_once(SEPARATOR)
        .ok_or(WordlistIssue::MissingSeparator)?;
    if count.contains(SEPARATOR) {
        return Err(WordlistIssue::ExtraSeparator);
    }

    let count = count.trim();
    let parsed = count
        .parse::<u64>()
        .map_err(|_| WordlistIssue::InvalidCount(count.to_string()))?;
    Ok((word.trim(), parsed))
}
