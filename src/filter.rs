use crate::model::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub min_level: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadThreshold(pub String);

/// Reads the level dropdown value. Blank clears the filter; otherwise the
/// leading integer counts, so `"3"` and `" 3 "` both mean level 3.
pub fn parse_level_threshold(raw: &str) -> Result<Option<i64>, BadThreshold> {
    let t = raw.trim();
    if t.is_empty() {
        return Ok(None);
    }
    let end = t
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(t.len());
    t[..end]
        .parse::<i64>()
        .map(Some)
        .map_err(|_| BadThreshold(raw.to_string()))
}

fn search_matches(record: &Record, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let name = format!(
        "{} {}",
        record.full_name.first_name, record.full_name.last_name
    );
    let fields = [
        name.as_str(),
        record.email.as_str(),
        record.phone_number.as_deref().unwrap_or(""),
    ];
    let hit = fields
        .iter()
        .any(|field| field.to_lowercase().contains(needle));
    hit
}

pub fn record_matches(record: &Record, needle: &str, min_level: Option<i64>) -> bool {
    let level_ok = min_level.map_or(true, |t| record.resolved_level() >= t);
    level_ok && search_matches(record, needle)
}

/// Applies search and the cumulative level threshold, keeping input order.
pub fn filter_records<'a>(records: &'a [Record], criteria: &FilterCriteria) -> Vec<&'a Record> {
    let needle = criteria.search.to_lowercase();
    records
        .iter()
        .filter(|r| record_matches(r, &needle, criteria.min_level))
        .collect()
}
