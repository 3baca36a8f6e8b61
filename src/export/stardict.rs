//! StarDict packaging: `.ifo` header, `.idx` index and `.dict` body, zipped.
//!
//! `.idx` entries are `word\0` followed by the big-endian u32 offset and
//! size of the definition in `.dict`, ordered the way StarDict readers
//! binary-search them.

use std::cmp::Ordering;
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{DictionaryEntry, DictionaryInfo};
use crate::error::{Result, SandhiError};

/// The three files of one StarDict dictionary
#[derive(Debug, Clone)]
pub struct StarDictFiles {
    pub ifo: String,
    pub idx: Vec<u8>,
    pub dict: Vec<u8>,
}

/// ASCII case-insensitive first, then bytewise
pub fn stardict_cmp(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.bytes().map(|c| c.to_ascii_lowercase()).collect::<Vec<_>>();
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

pub fn build_stardict(
    info: &DictionaryInfo,
    entries: &[DictionaryEntry],
) -> Result<StarDictFiles> {
    let mut sorted: Vec<&DictionaryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| stardict_cmp(&a.word, &b.word));

    let mut idx = Vec::new();
    let mut dict = Vec::new();
    for entry in sorted {
        let body = entry.definition_html.as_bytes();
        let offset = u32::try_from(dict.len())
            .map_err(|_| SandhiError::Export("dictionary body exceeds 4 GiB".into()))?;
        let size = u32::try_from(body.len()).map_err(|_| {
            SandhiError::Export(format!("definition of '{}' too large", entry.word))
        })?;

        dict.extend_from_slice(body);
        idx.extend_from_slice(entry.word.as_bytes());
        idx.push(0);
        idx.extend_from_slice(&offset.to_be_bytes());
        idx.extend_from_slice(&size.to_be_bytes());
    }

    let ifo = format!(
        "StarDict's dict ifo file\n\
         version=2.4.2\n\
         bookname={}\n\
         wordcount={}\n\
         idxfilesize={}\n\
         author={}\n\
         description={}\n\
         website={}\n\
         date={}\n\
         sametypesequence=h\n",
        ifo_value(&info.bookname),
        entries.len(),
        idx.len(),
        ifo_value(&info.author),
        ifo_value(&info.description),
        ifo_value(&info.website),
        info.created.format("%Y.%m.%d"),
    );

    Ok(StarDictFiles { ifo, idx, dict })
}

// .ifo values are single-line
fn ifo_value(value: &str) -> String {
    value.trim().replace("\r\n", "<br>").replace('\n', "<br>")
}

/// Zip the three files as `<stem>.ifo`, `<stem>.idx` and `<stem>.dict`,
/// where `<stem>` is the archive's file stem. The archive replaces `path`
/// only once it is complete.
pub fn write_stardict_zip(files: &StarDictFiles, path: &Path) -> Result<()> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SandhiError::Export(format!("bad archive name: {}", path.display())))?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    {
        let mut zip = ZipWriter::new(BufWriter::new(temp.as_file()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        zip.start_file(format!("{}.ifo", stem), options)?;
        zip.write_all(files.ifo.as_bytes())?;
        zip.start_file(format!("{}.idx", stem), options)?;
        zip.write_all(&files.idx)?;
        zip.start_file(format!("{}.dict", stem), options)?;
        zip.write_all(&files.dict)?;

        let mut writer = zip.finish()?;
        writer.flush()?;
    }
    temp.persist(path)
        .map_err(|e| SandhiError::Export(format!("{}: {}", path.display(), e)))?;

    tracing::info!("📚 Wrote StarDict archive {}", path.display());
    Ok(())
}
