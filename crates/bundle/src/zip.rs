//! Minimal in-memory zip container support.
//!
//! Only what the bundle format needs: stored and deflated entries, a central
//! directory, and the end-of-central-directory record. Everything operates on
//! byte slices; nothing is streamed.

use miniz_oxide::deflate::{compress_to_vec, CompressionLevel};
use miniz_oxide::inflate::decompress_to_vec_with_limit;

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_RECORD_SIG: u32 = 0x0605_4b50;

const END_RECORD_LEN: usize = 22;
const MAX_COMMENT_LEN: usize = u16::MAX as usize;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

#[derive(Debug, thiserror::Error)]
pub enum ZipError {
    #[error("archive is truncated")]
    Truncated,
    #[error("end of central directory record not found")]
    MissingEndRecord,
    #[error("bad record signature")]
    BadSignature,
    #[error("entry name is not valid UTF-8")]
    NameNotUtf8,
    #[error("unsupported compression method {0}")]
    UnsupportedMethod(u16),
    #[error("deflate stream is corrupt")]
    Inflate,
    #[error("CRC mismatch in entry {0:?}")]
    CrcMismatch(String),
    #[error("no entry named {0:?}")]
    EntryNotFound(String),
}

#[derive(Debug, Clone)]
struct EntryRecord {
    name: String,
    method: u16,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    local_offset: u32,
}

/// Read-only view over a zip byte buffer. Entry payloads are inflated on
/// demand by [`ZipArchive::read`].
#[derive(Debug)]
pub struct ZipArchive<'a> {
    data: &'a [u8],
    entries: Vec<EntryRecord>,
}

impl<'a> ZipArchive<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ZipError> {
        let end_offset = find_end_record(data)?;
        let entry_count = read_u16(data, end_offset + 10)? as usize;
        let directory_offset = read_u32(data, end_offset + 16)? as usize;

        let mut entries = Vec::with_capacity(entry_count);
        let mut cursor = directory_offset;

        for _ in 0..entry_count {
            if read_u32(data, cursor)? != CENTRAL_HEADER_SIG {
                return Err(ZipError::BadSignature);
            }

            let method = read_u16(data, cursor + 10)?;
            let crc32 = read_u32(data, cursor + 16)?;
            let compressed_size = read_u32(data, cursor + 20)?;
            let uncompressed_size = read_u32(data, cursor + 24)?;
            let name_len = read_u16(data, cursor + 28)? as usize;
            let extra_len = read_u16(data, cursor + 30)? as usize;
            let comment_len = read_u16(data, cursor + 32)? as usize;
            let local_offset = read_u32(data, cursor + 42)?;

            let name_bytes =
                data.get(cursor + 46..cursor + 46 + name_len).ok_or(ZipError::Truncated)?;
            let name =
                std::str::from_utf8(name_bytes).map_err(|_| ZipError::NameNotUtf8)?.to_owned();

            entries.push(EntryRecord {
                name,
                method,
                crc32,
                compressed_size,
                uncompressed_size,
                local_offset,
            });

            cursor += 46 + name_len + extra_len + comment_len;
        }

        Ok(Self { data, entries })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|entry| entry.name == name)
    }

    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Inflates and returns the payload of the named entry, verifying the
    /// recorded CRC-32.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ZipError> {
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ZipError::EntryNotFound(name.to_owned()))?;

        let local_offset = entry.local_offset as usize;
        if read_u32(self.data, local_offset)? != LOCAL_HEADER_SIG {
            return Err(ZipError::BadSignature);
        }

        let name_len = read_u16(self.data, local_offset + 26)? as usize;
        let extra_len = read_u16(self.data, local_offset + 28)? as usize;
        let data_start = local_offset + 30 + name_len + extra_len;
        let raw = self
            .data
            .get(data_start..data_start + entry.compressed_size as usize)
            .ok_or(ZipError::Truncated)?;

        let payload = match entry.method {
            METHOD_STORED => raw.to_vec(),
            METHOD_DEFLATED => decompress_to_vec_with_limit(raw, entry.uncompressed_size as usize)
                .map_err(|_| ZipError::Inflate)?,
            other => return Err(ZipError::UnsupportedMethod(other)),
        };

        if payload.len() != entry.uncompressed_size as usize
            || crc32fast::hash(&payload) != entry.crc32
        {
            return Err(ZipError::CrcMismatch(entry.name.clone()));
        }

        Ok(payload)
    }
}

fn find_end_record(data: &[u8]) -> Result<usize, ZipError> {
    if data.len() < END_RECORD_LEN {
        return Err(ZipError::Truncated);
    }

    let latest = data.len() - END_RECORD_LEN;
    let earliest = latest.saturating_sub(MAX_COMMENT_LEN);

    for offset in (earliest..=latest).rev() {
        if read_u32(data, offset)? == END_RECORD_SIG {
            return Ok(offset);
        }
    }

    Err(ZipError::MissingEndRecord)
}

fn read_u16(data: &[u8], offset: usize) -> Result<u16, ZipError> {
    let bytes = data.get(offset..offset + 2).ok_or(ZipError::Truncated)?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32, ZipError> {
    let bytes = data.get(offset..offset + 4).ok_or(ZipError::Truncated)?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Builds a zip byte buffer entirely in memory. Entries are deflated at
/// maximum compression, falling back to stored when deflate does not shrink
/// the payload.
#[derive(Debug, Default)]
pub struct ZipWriter {
    out: Vec<u8>,
    directory: Vec<EntryRecord>,
}

impl ZipWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, name: &str, data: &[u8]) {
        let crc32 = crc32fast::hash(data);
        let compressed = compress_to_vec(data, CompressionLevel::BestCompression as u8);

        let (method, payload): (u16, &[u8]) = if compressed.len() < data.len() {
            (METHOD_DEFLATED, &compressed)
        } else {
            (METHOD_STORED, data)
        };

        let local_offset = self.out.len() as u32;

        push_u32(&mut self.out, LOCAL_HEADER_SIG);
        push_u16(&mut self.out, 20); // version needed to extract
        push_u16(&mut self.out, 0); // general purpose flags
        push_u16(&mut self.out, method);
        push_u16(&mut self.out, 0); // modification time
        push_u16(&mut self.out, 0); // modification date
        push_u32(&mut self.out, crc32);
        push_u32(&mut self.out, payload.len() as u32);
        push_u32(&mut self.out, data.len() as u32);
        push_u16(&mut self.out, name.len() as u16);
        push_u16(&mut self.out, 0); // extra field length
        self.out.extend_from_slice(name.as_bytes());
        self.out.extend_from_slice(payload);

        self.directory.push(EntryRecord {
            name: name.to_owned(),
            method,
            crc32,
            compressed_size: payload.len() as u32,
            uncompressed_size: data.len() as u32,
            local_offset,
        });
    }

    pub fn finish(mut self) -> Vec<u8> {
        let directory_offset = self.out.len() as u32;

        for entry in &self.directory {
            push_u32(&mut self.out, CENTRAL_HEADER_SIG);
            push_u16(&mut self.out, 20); // version made by
            push_u16(&mut self.out, 20); // version needed to extract
            push_u16(&mut self.out, 0); // general purpose flags
            push_u16(&mut self.out, entry.method);
            push_u16(&mut self.out, 0); // modification time
            push_u16(&mut self.out, 0); // modification date
            push_u32(&mut self.out, entry.crc32);
            push_u32(&mut self.out, entry.compressed_size);
            push_u32(&mut self.out, entry.uncompressed_size);
            push_u16(&mut self.out, entry.name.len() as u16);
            push_u16(&mut self.out, 0); // extra field length
            push_u16(&mut self.out, 0); // comment length
            push_u16(&mut self.out, 0); // disk number start
            push_u16(&mut self.out, 0); // internal attributes
            push_u32(&mut self.out, 0); // external attributes
            push_u32(&mut self.out, entry.local_offset);
            self.out.extend_from_slice(entry.name.as_bytes());
        }

        let directory_size = self.out.len() as u32 - directory_offset;
        let entry_count = self.directory.len() as u16;

        push_u32(&mut self.out, END_RECORD_SIG);
        push_u16(&mut self.out, 0); // disk number
        push_u16(&mut self.out, 0); // directory start disk
        push_u16(&mut self.out, entry_count);
        push_u16(&mut self.out, entry_count);
        push_u32(&mut self.out, directory_size);
        push_u32(&mut self.out, directory_offset);
        push_u16(&mut self.out, 0); // comment length

        self.out
    }
}

fn push_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}
