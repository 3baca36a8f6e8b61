//! Dictionary package built from the selected splits and the external
//! breakup annotations.

pub mod stardict;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::config::DictionaryMeta;
use crate::core::ResultMapping;
use crate::error::{Result, SandhiError};

pub use stardict::{build_stardict, write_stardict_zip, StarDictFiles};

/// One headword of the exported dictionary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: String,
    pub definition_html: String,
    #[serde(default)]
    pub definition_plain: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}

/// Package header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryInfo {
    pub bookname: String,
    pub author: String,
    pub description: String,
    pub website: String,
    pub created: DateTime<Utc>,
    pub word_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryPackage {
    pub info: DictionaryInfo,
    pub entries: Vec<DictionaryEntry>,
}

impl DictionaryPackage {
    pub fn new(meta: &DictionaryMeta, entries: Vec<DictionaryEntry>) -> Self {
        Self {
            info: DictionaryInfo {
                bookname: meta.bookname.clone(),
                author: meta.author.clone(),
                description: meta.description.clone(),
                website: meta.website.clone(),
                created: Utc::now(),
                word_count: entries.len(),
            },
            entries,
        }
    }

    /// Write as JSON. The target is only replaced once the whole package has
    /// been written.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            writer.flush()?;
        }
        temp.persist(path)
            .map_err(|e| SandhiError::Export(format!("{}: {}", path.display(), e)))?;

        tracing::info!("📦 Wrote {} entries to {}", self.entries.len(), path.display());
        Ok(())
    }

    /// Write as a zipped StarDict dictionary
    pub fn write_stardict(&self, path: impl AsRef<Path>) -> Result<()> {
        let files = build_stardict(&self.info, &self.entries)?;
        write_stardict_zip(&files, path.as_ref())
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Build one entry per selected word, followed by entries for words that
/// only have a breakup annotation.
///
/// `css` is inlined at the start of every definition.
pub fn build_entries(
    mapping: &ResultMapping,
    breakups: &HashMap<String, String>,
    css: &str,
) -> Vec<DictionaryEntry> {
    let mut entries = Vec::with_capacity(mapping.len() + breakups.len());

    for (word, splits) in mapping.iter() {
        let mut html = String::from(css);
        html.push_str("<body><div class='sandhi'><p class='sandhi'>");
        html.push_str(&splits.join("<br>"));
        html.push_str("</p></div>");
        if let Some(breakup) = breakups.get(word) {
            html.push_str(breakup);
        }
        html.push_str("</body>");
        entries.push(entry(word, html));
    }

    // sorted so the package is identical between runs
    let mut extra: Vec<(&String, &String)> = breakups
        .iter()
        .filter(|(word, _)| !mapping.contains_word(word))
        .collect();
    extra.sort_by(|a, b| a.0.cmp(b.0));

    for (word, breakup) in extra {
        entries.push(entry(word, format!("{}<body>{}</body>", css, breakup)));
    }

    entries
}

fn entry(word: &str, definition_html: String) -> DictionaryEntry {
    DictionaryEntry {
        word: word.to_string(),
        definition_html,
        definition_plain: String::new(),
        synonyms: Vec::new(),
    }
}

/// Collapse a stylesheet onto one line.
///
/// Comments are dropped and whitespace runs become one space, except next to
/// `{`, `}` and `;` where they are dropped. Quoted strings are copied as is.
pub fn minify_css(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut pending_space = false;

    while let Some(c) = chars.next() {
        match c {
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for c in chars.by_ref() {
                    if prev == '*' && c == '/' {
                        break;
                    }
                    prev = c;
                }
            }
            c if c.is_whitespace() => pending_space = true,
            '"' | '\'' => {
                push_token(&mut out, &mut pending_space, c);
                let mut escaped = false;
                for inner in chars.by_ref() {
                    out.push(inner);
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == c {
                        break;
                    }
                }
            }
            c => push_token(&mut out, &mut pending_space, c),
        }
    }
    out
}

fn push_token(out: &mut String, pending_space: &mut bool, c: char) {
    let tight = |c: char| matches!(c, '{' | '}' | ';');
    if *pending_space && !tight(c) && out.chars().last().map_or(false, |last| !tight(last)) {
        out.push(' ');
    }
    *pending_space = false;
    out.push(c);
}

/// Wrap a minified stylesheet for inlining
pub fn style_block(css: &str) -> String {
    if css.trim().is_empty() {
        return String::new();
    }
    format!("<style>{}</style>", minify_css(css))
}
