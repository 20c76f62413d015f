//! Path-expansion context for package-declared patterns
//!
//! Force-delete patterns and venv mkdir entries refer to managed
//! directories through a small fixed variable set. The context is built
//! once per operation from the path table and passed to each consumer;
//! process environment variables are a fallback, and unknown variables
//! are left untouched so a bad pattern expands to a path that does not
//! exist instead of something deletable.

use std::path::PathBuf;

use crate::vfs::PathTable;

/// Fixed variable set seeded from the path table for one package
#[derive(Debug, Clone)]
pub struct ExpandContext {
    vars: Vec<(&'static str, String)>,
}

impl ExpandContext {
    /// Build the context for a package
    pub fn for_package(table: &PathTable, name: &str) -> Self {
        let pkg_root = table.package_root(name).display().to_string();
        let vars = vec![
            ("KEG_ROOT", table.base.display().to_string()),
            ("KEG_VFS", table.user_vfs_root.display().to_string()),
            ("KEG_USER_VFS", table.user_vfs_root.display().to_string()),
            ("KEG_PKGROOT", pkg_root.clone()),
            ("KEG_PACKAGE_ROOT", pkg_root),
        ];
        Self { vars }
    }

    /// Expand `$VAR` and `${VAR}` occurrences in a pattern
    pub fn expand(&self, pattern: &str) -> PathBuf {
        let mut out = String::with_capacity(pattern.len());
        let mut i = 0;
        while i < pattern.len() {
            let rest = &pattern[i..];
            let Some(tail) = rest.strip_prefix('$') else {
                let Some(c) = rest.chars().next() else { break };
                out.push(c);
                i += c.len_utf8();
                continue;
            };
            let (name, consumed) = if let Some(braced) = tail.strip_prefix('{') {
                match braced.find('}') {
                    Some(end) => (&braced[..end], end + 2),
                    None => ("", 0),
                }
            } else {
                let end = tail
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(tail.len());
                (&tail[..end], end)
            };
            if name.is_empty() {
                out.push('$');
                i += 1;
                continue;
            }
            match self.lookup(name) {
                Some(value) => {
                    out.push_str(&value);
                    i += 1 + consumed;
                }
                None => {
                    out.push('$');
                    i += 1;
                }
            }
        }
        PathBuf::from(out)
    }

    fn lookup(&self, name: &str) -> Option<String> {
        if let Some((_, value)) = self.vars.iter().find(|(key, _)| *key == name) {
            return Some(value.clone());
        }
        // env::var rejects '=' and NUL loudly; only plain names fall through
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return None;
        }
        std::env::var(name).ok()
    }
}
