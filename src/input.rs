//! Reading delimited text inputs, plain, gzip or bgzip-compressed
use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use noodles::bgzf;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::coord_map::CoordMap;
use crate::error::ParseError;
use crate::record::Record;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Compression {
    None,
    Gzip,
    Bgzf,
}

/// Classify a file from its first bytes. BGZF is gzip with a `BC` extra
/// subfield right after the fixed header.
fn detect_compression(header: &[u8]) -> Compression {
    if !header.starts_with(&GZIP_MAGIC) {
        return Compression::None;
    }
    let has_extra = header.get(3).is_some_and(|flags| flags & 0x04 != 0);
    if has_extra && header.get(12..14) == Some(b"BC".as_slice()) {
        Compression::Bgzf
    } else {
        Compression::Gzip
    }
}

/// Open a file and detect compression from its magic bytes, returning a boxed BufRead
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let header = reader
        .fill_buf()
        .with_context(|| format!("Failed to read {}", path.display()))?;

    match detect_compression(header) {
        Compression::Bgzf => Ok(Box::new(BufReader::new(bgzf::io::reader::Reader::new(reader)))),
        Compression::Gzip => Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader)))),
        Compression::None => Ok(Box::new(reader)),
    }
}

fn is_data_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Visit every data line of a file in order. Blank and `#` lines are skipped.
pub fn for_each_record<P, F>(path: P, mut visit: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(&Record<'_>) -> Result<()>,
{
    let path = path.as_ref();
    let label = path.display().to_string();
    let reader = open_input(path)?;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {label}"))?;
        if !is_data_line(&line) {
            continue;
        }
        visit(&Record::new(&label, idx + 1, &line))?;
    }

    Ok(())
}

/// Load a keyed file into a coordinate map; the first record for a site wins.
pub fn load_coord_map<P, T, F>(path: P, mut parse: F) -> Result<CoordMap<T>>
where
    P: AsRef<Path>,
    F: FnMut(&Record<'_>) -> Result<T, ParseError>,
{
    let mut map = CoordMap::new();
    for_each_record(path, |rec| {
        let (chrom, pos) = rec.site_key()?;
        let value = parse(rec)?;
        map.insert_first(chrom, pos, value);
        Ok(())
    })?;
    Ok(map)
}

/// Load the (chromosome, position) keys of a site list, ignoring other columns
pub fn load_site_set<P: AsRef<Path>>(path: P) -> Result<CoordMap<()>> {
    load_coord_map(path, |_| Ok(()))
}
