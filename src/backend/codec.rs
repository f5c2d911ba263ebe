//! Self-describing trailer codec for cache entry files
//!
//! A live entry file is `data ++ trailer`, where the trailer is
//! `[expiry time: 14 chars][tags: space-joined][data size: 10 chars]`.
//! The trailing size field always equals `len(data)`, which is also the
//! byte offset at which the trailer starts, so reading the last ten bytes
//! of a file locates both the payload and the metadata.
//!
//! This module is pure; decode errors carry a reason string which callers
//! attach to the offending path.

use std::str::FromStr;

/// Width of the expiry-time field, in ASCII characters
pub(crate) const EXPIRY_TIME_LENGTH: usize = 14;

/// Width of the data-size field, in ASCII characters
pub(crate) const DATA_SIZE_DIGITS: usize = 10;

/// Smallest decodable trailer block: expiry field plus size field, no tags
pub(crate) const MIN_TRAILER_LENGTH: usize = EXPIRY_TIME_LENGTH + DATA_SIZE_DIGITS;

/// Build the trailer appended after an entry's payload.
///
/// Integer fields are left-aligned and space-padded to their fixed widths.
/// Tags are joined with single spaces; tags containing spaces or newlines
/// would corrupt the format and must be rejected by the caller.
pub(crate) fn encode_trailer(expiry_time: i64, tags: &[String], data_length: usize) -> Vec<u8> {
    let mut trailer = format!("{expiry_time:<width$}", width = EXPIRY_TIME_LENGTH);
    trailer.push_str(&tags.join(" "));
    trailer.push_str(&format!("{data_length:<width$}", width = DATA_SIZE_DIGITS));
    trailer.into_bytes()
}

/// Parse the payload length from the final bytes of an entry file.
///
/// `file_tail` must contain at least the last [`DATA_SIZE_DIGITS`] bytes of
/// the file; only those final bytes are inspected.
pub(crate) fn decode_data_length(file_tail: &[u8]) -> Result<usize, String> {
    if file_tail.len() < DATA_SIZE_DIGITS {
        return Err(format!(
            "file tail is {} bytes, need at least {}",
            file_tail.len(),
            DATA_SIZE_DIGITS
        ));
    }
    parse_padded(&file_tail[file_tail.len() - DATA_SIZE_DIGITS..])
}

/// Decode a full trailer block (expiry time, tags, size) into its parts.
///
/// The tag section length is whatever remains between the two fixed-width
/// integer fields.
pub(crate) fn decode_trailer(block: &[u8]) -> Result<(i64, Vec<String>), String> {
    if block.len() < MIN_TRAILER_LENGTH {
        return Err(format!(
            "trailer block is {} bytes, need at least {}",
            block.len(),
            MIN_TRAILER_LENGTH
        ));
    }
    let expiry_time: i64 = parse_padded(&block[..EXPIRY_TIME_LENGTH])?;
    let tag_bytes = &block[EXPIRY_TIME_LENGTH..block.len() - DATA_SIZE_DIGITS];
    let tag_section = std::str::from_utf8(tag_bytes)
        .map_err(|_| "tag section is not valid UTF-8".to_string())?;
    let tags = tag_section
        .split(' ')
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect();
    Ok((expiry_time, tags))
}

fn parse_padded<T: FromStr>(bytes: &[u8]) -> Result<T, String> {
    let text = std::str::from_utf8(bytes)
        .map_err(|_| "integer field is not valid UTF-8".to_string())?;
    text.trim()
        .parse()
        .map_err(|_| format!("integer field {:?} is not a number", text))
}
