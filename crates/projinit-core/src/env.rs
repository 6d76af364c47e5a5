//! `$NAME` expansion against the process environment.
//!
//! The environment is captured the first time [`expand`] is called and never
//! refreshed afterwards, so every command and path in a run sees the same
//! values.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

static PROCESS_ENV: LazyLock<Arc<EnvTable>> =
    LazyLock::new(|| Arc::new(EnvTable::from_process()));

/// Replace every `$NAME` in `template` with the value of the environment
/// variable `NAME`. Unknown names are left untouched.
pub fn expand(template: &str) -> String {
    PROCESS_ENV.expand(template)
}

/// The per-process snapshot used by [`expand`]
pub fn process_env() -> Arc<EnvTable> {
    Arc::clone(&PROCESS_ENV)
}

/// Immutable lookup table of environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvTable {
    vars: HashMap<String, String>,
    longest_name: usize,
}

impl EnvTable {
    /// Snapshot the current process environment
    pub fn from_process() -> Self {
        Self::from_vars(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// Build a table from explicit name/value pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .filter(|(k, _)| !k.is_empty())
            .collect();
        let longest_name = vars.keys().map(String::len).max().unwrap_or(0);
        Self { vars, longest_name }
    }

    /// Look up a single variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Expand `$NAME` tokens.
    ///
    /// The longest defined name starting right after the `$` wins, so with
    /// only `HOME` defined `$HOMEDIR` becomes `<home>DIR`.
    pub fn expand(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            match self.match_name(after) {
                Some((name_len, value)) => {
                    out.push_str(value);
                    rest = &after[name_len..];
                }
                None => {
                    out.push('$');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }

    fn match_name<'a>(&'a self, text: &str) -> Option<(usize, &'a str)> {
        let run = text
            .char_indices()
            .take_while(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
            .count();
        let run = run.min(self.longest_name);

        (1..=run)
            .rev()
            .find_map(|len| self.get(&text[..len]).map(|value| (len, value)))
    }
}
