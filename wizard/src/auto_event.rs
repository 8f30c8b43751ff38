use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::models::AutoEvent;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    #[default]
    Ms,
    S,
    M,
    H,
}

impl FrequencyUnit {
    /// Also the order units are searched for when splitting a frequency string
    pub const ALL: [FrequencyUnit; 4] = [FrequencyUnit::Ms, FrequencyUnit::S, FrequencyUnit::M, FrequencyUnit::H];

    pub fn as_str(self) -> &'static str {
        match self {
            FrequencyUnit::Ms => "ms",
            FrequencyUnit::S => "s",
            FrequencyUnit::M => "m",
            FrequencyUnit::H => "h",
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrequencyUnit {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s)
            .ok_or_else(|| format!("Unknown frequency unit: {}", s))
    }
}

/// Split a wire frequency such as "10ms" into magnitude and unit.
///
/// Units are looked up as substrings anywhere in the value, in the order
/// ms, s, m, h; the first hit wins and the magnitude is everything before
/// it. A value with no unit keeps the whole string as magnitude and
/// defaults to milliseconds.
pub fn split_frequency(frequency: &str) -> (String, FrequencyUnit) {
    for unit in FrequencyUnit::ALL {
        if let Some(index) = frequency.find(unit.as_str()) {
            return (frequency[..index].to_string(), unit);
        }
    }
    (frequency.to_string(), FrequencyUnit::default())
}

/// Leading integer of a value: optional whitespace, optional sign, digits.
///
/// Read as `f64` so digit runs longer than any machine integer still parse.
pub fn parse_int_prefix(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let sign_len = usize::from(trimmed.starts_with(['-', '+']));
    let digits_end = trimmed[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed.len(), |end| sign_len + end);
    if digits_end == sign_len {
        return None;
    }
    // "-0" becomes 0
    trimmed[..digits_end].parse::<f64>().ok().map(|magnitude| magnitude + 0.0)
}

/// True when the value reads as a finite number equal to its own integer prefix.
///
/// "5" and " +5" pass, "5.5", "1e3", "abc" and "" do not.
pub fn is_integer_frequency(value: &str) -> bool {
    let trimmed = value.trim();
    let Some(number) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) else {
        return false;
    };
    parse_int_prefix(trimmed).is_some_and(|integer| integer == number)
}

/// One editable row of the auto-event step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoEventEntry {
    pub id: u64,
    pub frequency_value: String,
    pub unit: FrequencyUnit,
    pub on_change: bool,
    pub resource_name: String,
}

impl AutoEventEntry {
    /// Ready to leave the step: resource chosen and frequency integral
    pub fn is_ready(&self) -> bool {
        !self.resource_name.is_empty() && is_integer_frequency(&self.frequency_value)
    }

    /// Wire form; the magnitude is truncated to its integer prefix and left
    /// out when there is none, so "" with ms is sent as "ms".
    pub fn to_auto_event(&self) -> AutoEvent {
        let magnitude = parse_int_prefix(&self.frequency_value)
            .map(|magnitude| magnitude.to_string())
            .unwrap_or_default();

        AutoEvent {
            frequency: format!("{}{}", magnitude, self.unit),
            on_change: self.on_change,
            source_name: self.resource_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AutoEventList {
    entries: Vec<AutoEventEntry>,
    next_id: u64,
}

impl AutoEventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// List holding a single blank row, the state the wizard opens with
    pub fn with_blank() -> Self {
        let mut list = Self::new();
        list.append_blank();
        list
    }

    pub fn entries(&self) -> &[AutoEventEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_mut(&mut self, id: u64) -> Option<&mut AutoEventEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    fn push(&mut self, frequency_value: String, unit: FrequencyUnit, on_change: bool, resource_name: String) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(AutoEventEntry {
            id,
            frequency_value,
            unit,
            on_change,
            resource_name,
        });
        id
    }

    pub fn append_blank(&mut self) -> u64 {
        self.push(String::new(), FrequencyUnit::Ms, false, String::new())
    }

    /// Append rows decoded from existing wire auto events
    pub fn load_from_existing(&mut self, events: &[AutoEvent]) {
        for event in events {
            let (magnitude, unit) = split_frequency(&event.frequency);
            self.push(magnitude, unit, event.on_change, event.source_name.clone());
        }
        debug!("Loaded {} existing auto events, list now holds {}", events.len(), self.entries.len());
    }

    /// Unknown ids are ignored
    pub fn remove(&mut self, id: u64) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn all_ready(&self) -> bool {
        self.entries.iter().all(AutoEventEntry::is_ready)
    }

    pub fn to_auto_events(&self) -> Vec<AutoEvent> {
        self.entries.iter().map(AutoEventEntry::to_auto_event).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(frequency: &str, on_change: bool, source_name: &str) -> AutoEvent {
        AutoEvent {
            frequency: frequency.to_string(),
            on_change,
            source_name: source_name.to_string(),
        }
    }

    #[test]
    fn test_is_integer_frequency() {
        assert!(is_integer_frequency("5"));
        assert!(is_integer_frequency("120"));
        assert!(!is_integer_frequency("5.5"));
        assert!(!is_integer_frequency("abc"));
        assert!(!is_integer_frequency(""));
        assert!(!is_integer_frequency("5ms"));
    }

    #[test]
    fn test_is_integer_frequency_is_numeric_not_textual() {
        assert!(is_integer_frequency(" 5"));
        assert!(is_integer_frequency("+5"));
        assert!(is_integer_frequency("-5"));
        assert!(is_integer_frequency("5.0"));
        assert!(!is_integer_frequency("1e3"));
        assert!(!is_integer_frequency("inf"));
        assert!(!is_integer_frequency("NaN"));
    }

    #[test]
    fn test_is_integer_frequency_beyond_machine_integers() {
        assert!(is_integer_frequency("99999999999999999999"));
        assert!(is_integer_frequency("-99999999999999999999"));
        assert_eq!(parse_int_prefix("12abc"), Some(12.0));
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix("+"), None);
    }

    #[test]
    fn test_split_frequency_units() {
        assert_eq!(split_frequency("10ms"), ("10".to_string(), FrequencyUnit::Ms));
        assert_eq!(split_frequency("30s"), ("30".to_string(), FrequencyUnit::S));
        assert_eq!(split_frequency("10m"), ("10".to_string(), FrequencyUnit::M));
        assert_eq!(split_frequency("2h"), ("2".to_string(), FrequencyUnit::H));
        assert_eq!(split_frequency("15"), ("15".to_string(), FrequencyUnit::Ms));
    }

    #[test]
    fn test_split_frequency_searches_in_unit_order() {
        // "s" is found before "h" is considered, even though "h" is the suffix
        assert_eq!(split_frequency("1s2h"), ("1".to_string(), FrequencyUnit::S));
        assert_eq!(split_frequency("5mss"), ("5".to_string(), FrequencyUnit::Ms));
    }

    #[test]
    fn test_load_then_assemble_round_trip() {
        let mut list = AutoEventList::new();
        list.load_from_existing(&[event("10m", true, "temp"), event("500ms", false, "humidity")]);

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].frequency_value, "10");
        assert_eq!(list.entries()[0].unit, FrequencyUnit::M);
        assert!(list.entries()[0].on_change);
        assert_eq!(list.entries()[0].resource_name, "temp");

        let events = list.to_auto_events();
        assert_eq!(events, vec![event("10m", true, "temp"), event("500ms", false, "humidity")]);
    }

    #[test]
    fn test_load_appends_after_existing_rows() {
        let mut list = AutoEventList::with_blank();
        list.load_from_existing(&[event("1h", false, "pressure")]);

        assert_eq!(list.len(), 2);
        assert_eq!(list.entries()[0].resource_name, "");
        assert_eq!(list.entries()[1].resource_name, "pressure");
        assert_ne!(list.entries()[0].id, list.entries()[1].id);
    }

    #[test]
    fn test_append_blank_defaults() {
        let mut list = AutoEventList::new();
        let id = list.append_blank();

        let entry = &list.entries()[0];
        assert_eq!(entry.id, id);
        assert_eq!(entry.frequency_value, "");
        assert_eq!(entry.unit, FrequencyUnit::Ms);
        assert!(!entry.on_change);
        assert_eq!(entry.resource_name, "");
        assert!(!entry.is_ready());
    }

    #[test]
    fn test_remove_by_id() {
        let mut list = AutoEventList::new();
        let first = list.append_blank();
        let second = list.append_blank();

        assert!(list.remove(first));
        assert_eq!(list.entries()[0].id, second);
        assert!(!list.remove(first));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_assembly_truncates_fraction() {
        let mut list = AutoEventList::new();
        let id = list.append_blank();
        let entry = list.entry_mut(id).unwrap();
        entry.frequency_value = "5.9".to_string();
        entry.resource_name = "temp".to_string();

        assert!(!list.all_ready());
        assert_eq!(list.to_auto_events()[0].frequency, "5ms");
    }

    #[test]
    fn test_assembly_omits_missing_magnitude() {
        let mut list = AutoEventList::with_blank();
        let id = list.append_blank();
        let entry = list.entry_mut(id).unwrap();
        entry.frequency_value = "abc".to_string();
        entry.unit = FrequencyUnit::S;
        entry.resource_name = "temp".to_string();

        assert!(!list.all_ready());
        let events = list.to_auto_events();
        assert_eq!(events[0], event("ms", false, ""));
        assert_eq!(events[1], event("s", false, "temp"));
    }

    #[test]
    fn test_assembly_normalises_integer_prefix() {
        let mut list = AutoEventList::new();
        for value in ["+7", " 007", "-0", "99999999999999999999"] {
            let id = list.append_blank();
            list.entry_mut(id).unwrap().frequency_value = value.to_string();
        }

        let frequencies: Vec<String> = list.to_auto_events().into_iter().map(|e| e.frequency).collect();
        assert_eq!(frequencies, vec!["7ms", "7ms", "0ms", "100000000000000000000ms"]);
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("h".parse::<FrequencyUnit>().unwrap(), FrequencyUnit::H);
        assert!("d".parse::<FrequencyUnit>().is_err());
    }
}
