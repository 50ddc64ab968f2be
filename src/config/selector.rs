//! Pattern selection of model names.
//!
//! Keys are `/regex/`, globs containing `*`, or literal names. Regex and glob
//! keys are optional matchers; literal keys must name a known model.

use crate::config::{Merge, Selection};
use crate::error::ConfigError;
use glob::Pattern;
use regex::Regex;
use std::collections::BTreeMap;

enum Matcher {
    Regex(Regex),
    Glob(Pattern),
    Literal,
}

impl Matcher {
    fn classify(key: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidPattern {
            key: key.to_string(),
            reason,
        };
        if key.len() >= 2 && key.starts_with('/') && key.ends_with('/') {
            let regex = Regex::new(&key[1..key.len() - 1]).map_err(|e| invalid(e.to_string()))?;
            Ok(Matcher::Regex(regex))
        } else if key.contains('*') {
            let pattern = Pattern::new(key).map_err(|e| invalid(e.to_string()))?;
            Ok(Matcher::Glob(pattern))
        } else {
            Ok(Matcher::Literal)
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            Matcher::Regex(regex) => regex.is_match(name),
            Matcher::Glob(pattern) => pattern.matches(name),
            Matcher::Literal => false,
        }
    }
}

fn apply<T: Merge + Clone>(previous: Option<Selection<T>>, picked: &Selection<T>) -> Selection<T> {
    match (previous, picked) {
        (Some(Selection::Setting(old)), Selection::Setting(new)) => Selection::Setting(old.merge(new.clone())),
        (_, picked) => picked.clone(),
    }
}

/// Resolve `pickers` (in order) against `names`. Names whose final selection is
/// `false` are left out of the result.
pub fn select<T>(pickers: &[(String, Selection<T>)], names: &[String]) -> Result<BTreeMap<String, Selection<T>>, ConfigError>
where
    T: Merge + Clone,
{
    let mut selected: BTreeMap<String, Selection<T>> = BTreeMap::new();
    for (key, picked) in pickers {
        match Matcher::classify(key)? {
            Matcher::Literal => {
                if !names.iter().any(|n| n == key) {
                    return Err(ConfigError::UnknownModel {
                        key: key.clone(),
                        known: names.to_vec(),
                    });
                }
                let merged = apply(selected.remove(key), picked);
                selected.insert(key.clone(), merged);
            }
            matcher => {
                for name in names.iter().filter(|n| matcher.matches(n)) {
                    let merged = apply(selected.remove(name), picked);
                    selected.insert(name.clone(), merged);
                }
            }
        }
    }
    selected.retain(|_, selection| selection.is_enabled());
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelOptions;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn pick(key: &str, selection: Selection<ModelOptions>) -> (String, Selection<ModelOptions>) {
        (key.to_string(), selection)
    }

    #[test]
    fn literal_key_must_exist() {
        let err = select(&[pick("Ghost", Selection::Flag(true))], &names(&["PhoneBook"])).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModel { ref key, .. } if key == "Ghost"));
    }

    #[test]
    fn patterns_without_matches_are_fine() {
        let pickers = [pick("Ghost*", Selection::Flag(true)), pick("/^Zz/", Selection::Flag(true))];
        let selected = select(&pickers, &names(&["PhoneBook"])).unwrap();
        assert!(selected.is_empty());
    }

    #[test]
    fn glob_and_regex_select_matching_names() {
        let all = names(&["PhoneBook", "Phone", "Test", "Other"]);
        let selected = select(&[pick("Phone*", Selection::Flag(true))], &all).unwrap();
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["Phone", "PhoneBook"]);
        let selected = select(&[pick("/^(Test|Other)$/", Selection::Flag(true))], &all).unwrap();
        assert_eq!(selected.keys().collect::<Vec<_>>(), vec!["Other", "Test"]);
    }

    #[test]
    fn delimited_key_with_star_is_a_regex() {
        let selected = select(&[pick("/Book*/", Selection::Flag(true))], &names(&["PhoneBoo", "Cat"])).unwrap();
        assert!(selected.contains_key("PhoneBoo"));
    }

    #[test]
    fn overlapping_settings_merge_with_second_writer_winning() {
        let pickers = [
            pick("*", Selection::Setting(ModelOptions::new().singular("one").plural("first"))),
            pick("PhoneBook", Selection::Setting(ModelOptions::new().plural("second"))),
        ];
        let selected = select(&pickers, &names(&["PhoneBook"])).unwrap();
        assert_eq!(
            selected["PhoneBook"],
            Selection::Setting(ModelOptions::new().singular("one").plural("second"))
        );
    }

    #[test]
    fn later_flag_replaces_setting_and_false_drops() {
        let pickers = [
            pick("*", Selection::Setting(ModelOptions::new().singular("x"))),
            pick("Secret", Selection::Flag(false)),
            pick("Open", Selection::Flag(true)),
        ];
        let selected = select(&pickers, &names(&["Secret", "Open", "Other"])).unwrap();
        assert!(!selected.contains_key("Secret"));
        assert_eq!(selected["Open"], Selection::Flag(true));
        assert_eq!(selected["Other"], Selection::Setting(ModelOptions::new().singular("x")));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = select(&[pick("/(unclosed/", Selection::Flag(true))], &names(&["A"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
