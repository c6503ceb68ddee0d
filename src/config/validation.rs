//! Config validation: unknown-key detection with Levenshtein suggestions.
//!
//! The raw TOML is parsed into a `toml::Table`, its section keys are listed and
//! compared against the known field names. Unknown keys become warnings with a
//! "did you mean?" hint; they never fail the load.

use std::collections::HashSet;

/// A key in the config file that `ServiceConfig` does not define.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey {
    /// Dotted path, e.g. `subsystems.brake.stratgy`.
    pub path: String,
    /// Closest known path, if one is near enough.
    pub suggestion: Option<String>,
}

impl std::fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.suggestion {
            Some(s) => write!(f, "Unknown config key '{}', did you mean '{s}'?", self.path),
            None => write!(f, "Unknown config key '{}'", self.path),
        }
    }
}

const SUBSYSTEM_KEYS: [&str; 4] = ["strategy", "model_path", "baseline_path", "deviation_scale"];

/// Complete set of valid dotted key paths for `ServiceConfig`.
///
/// Must be kept in step with the structs in `service_config.rs`.
pub fn known_config_keys() -> HashSet<String> {
    let mut keys: HashSet<String> = [
        "server",
        "server.addr",
        "server.cors_origins",
        "server.body_limit_bytes",
        "logging",
        "logging.format",
        "request",
        "request.reject_unrecognized",
        "scoring",
        "scoring.failure_policy",
        "scoring.fallback_rul_km",
        "scoring.std_epsilon",
        "subsystems",
    ]
    .iter()
    .map(|k| (*k).to_string())
    .collect();

    for subsystem in crate::types::Subsystem::ALL {
        let table = format!("subsystems.{subsystem}");
        for key in SUBSYSTEM_KEYS {
            keys.insert(format!("{table}.{key}"));
        }
        keys.insert(table);
    }
    keys
}

/// Dotted key paths present in a parsed config document.
///
/// Sections contribute their own path and their direct keys. Under
/// `[subsystems]` only tables named after a known subsystem are opened; an
/// unknown subsystem table is reported once as a whole.
pub fn config_key_paths(root: &toml::Table) -> Vec<String> {
    let mut paths = Vec::new();
    for (section, body) in root {
        paths.push(section.clone());
        let Some(table) = body.as_table() else {
            continue;
        };
        for (key, value) in table {
            let path = format!("{section}.{key}");
            let opens_subsystem = section == "subsystems"
                && key.parse::<crate::types::Subsystem>().is_ok();
            if let (true, Some(fields)) = (opens_subsystem, value.as_table()) {
                paths.extend(fields.keys().map(|field| format!("{path}.{field}")));
            }
            paths.push(path);
        }
    }
    paths
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<String>) -> Option<String> {
    known
        .iter()
        .map(|k| (k, levenshtein(unknown, k)))
        .filter(|(_, d)| *d <= 3)
        .min_by(|(ka, da), (kb, db)| da.cmp(db).then_with(|| ka.cmp(kb)))
        .map(|(k, _)| k.clone())
}

/// Every key in `raw_toml` that `ServiceConfig` does not know, sorted by path.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<UnknownKey> {
    // parse errors are reported by serde later
    let Ok(root) = raw_toml.parse::<toml::Table>() else {
        return Vec::new();
    };

    let known = known_config_keys();
    let mut unknown: Vec<UnknownKey> = config_key_paths(&root)
        .into_iter()
        .filter(|path| !known.contains(path))
        .map(|path| UnknownKey {
            suggestion: suggest_correction(&path, &known),
            path,
        })
        .collect();
    unknown.sort_by(|a, b| a.path.cmp(&b.path));
    unknown
}
