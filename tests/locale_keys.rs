use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use regex::Regex;
use serde_yaml::Value;

const LOCALES: &[&str] = &["en", "ja"];

fn flatten(prefix: &str, value: &Value, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let key = match k {
                    Value::String(s) => s.clone(),
                    other => panic!("non-string key {other:?} under {prefix}"),
                };
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, v, out);
            }
        }
        Value::String(s) => {
            out.insert(prefix.to_string(), s.clone());
        }
        other => panic!("unexpected value {other:?} at {prefix}"),
    }
}

fn load_locale(name: &str) -> BTreeMap<String, String> {
    let path = format!("locales/{name}.yml");
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path}: {e}"));
    let value: Value =
        serde_yaml::from_str(&text).unwrap_or_else(|e| panic!("Failed to parse {path}: {e}"));
    let mut out = BTreeMap::new();
    flatten("", &value, &mut out);
    out
}

fn collect_sources(dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            collect_sources(&path, out);
        } else if path.extension().is_some_and(|e| e == "rs") {
            out.push(fs::read_to_string(&path).unwrap());
        }
    }
}

fn used_keys() -> BTreeSet<String> {
    let re = Regex::new(r#"\bt!\(\s*"([a-z0-9_.]+)""#).unwrap();
    let mut sources = Vec::new();
    collect_sources(Path::new("src"), &mut sources);
    sources
        .iter()
        .flat_map(|src| re.captures_iter(src).map(|c| c[1].to_string()).collect::<Vec<_>>())
        .collect()
}

fn placeholders(text: &str) -> BTreeSet<String> {
    let re = Regex::new(r"%\{(\w+)\}").unwrap();
    re.captures_iter(text).map(|c| c[1].to_string()).collect()
}

#[test]
fn every_used_key_is_translated() {
    let keys = used_keys();
    assert!(keys.contains("quiz.correct"), "key scan found nothing useful: {keys:?}");
    for locale in LOCALES {
        let catalogue = load_locale(locale);
        let missing: Vec<&String> = keys.iter().filter(|k| !catalogue.contains_key(*k)).collect();
        assert!(missing.is_empty(), "{locale} is missing {missing:?}");
    }
}

#[test]
fn catalogues_have_the_same_keys() {
    let en: BTreeSet<String> = load_locale("en").into_keys().collect();
    for locale in LOCALES.iter().filter(|l| **l != "en") {
        let other: BTreeSet<String> = load_locale(locale).into_keys().collect();
        let only_en: Vec<_> = en.difference(&other).collect();
        let only_other: Vec<_> = other.difference(&en).collect();
        assert!(only_en.is_empty(), "{locale} lacks {only_en:?}");
        assert!(only_other.is_empty(), "{locale} has extra {only_other:?}");
    }
}

#[test]
fn placeholders_match_across_locales() {
    let en = load_locale("en");
    for locale in LOCALES.iter().filter(|l| **l != "en") {
        let other = load_locale(locale);
        for (key, text) in &en {
            if let Some(translated) = other.get(key) {
                assert_eq!(
                    placeholders(text),
                    placeholders(translated),
                    "placeholder mismatch for {key} in {locale}"
                );
            }
        }
    }
}

#[test]
fn answer_messages_name_the_correct_meaning() {
    for locale in LOCALES {
        let catalogue = load_locale(locale);
        for key in ["quiz.incorrect", "quiz.timeout"] {
            assert!(
                placeholders(&catalogue[key]).contains("answer"),
                "{locale}:{key} does not show the answer"
            );
        }
    }
}
