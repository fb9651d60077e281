//! Parser for Outlook `.msg` files (MAPI properties in an OLE compound file).
//!
//! Only the pieces needed for header analysis are read:
//! - the transport headers string property (`PR_TRANSPORT_MESSAGE_HEADERS`),
//! - the client submit time from the top-level property stream,
//! - a handful of envelope properties used when a message has no transport
//!   headers at all (unsent drafts, some exports).

use std::io::{Cursor, Read, Seek};

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::header::{decode_header_bytes, split_header_lines, unfold_headers};
use super::Extracted;
use crate::error::{AnalyzeError, Result};
use crate::model::headers::HeaderSet;
use crate::model::report::SubmitTime;

/// Top-level fixed-size property stream.
const PROPERTIES_STREAM: &str = "/__properties_version1.0";
/// Size of the top-level property stream header, before the first entry.
const PROPERTIES_HEADER_LEN: usize = 32;
const PROPERTY_ENTRY_LEN: usize = 16;

const PT_STRING8: u16 = 0x001E;
const PT_UNICODE: u16 = 0x001F;
const PT_SYSTIME: u16 = 0x0040;

const PR_SUBJECT: u16 = 0x0037;
const PR_CLIENT_SUBMIT_TIME: u16 = 0x0039;
const PR_TRANSPORT_MESSAGE_HEADERS: u16 = 0x007D;
const PR_SENDER_NAME: u16 = 0x0C1A;
const PR_SENDER_EMAIL_ADDRESS: u16 = 0x0C1F;
const PR_DISPLAY_BCC: u16 = 0x0E02;
const PR_DISPLAY_CC: u16 = 0x0E03;
const PR_DISPLAY_TO: u16 = 0x0E04;
const PR_INTERNET_MESSAGE_ID: u16 = 0x1035;
const PR_SENDER_SMTP_ADDRESS: u16 = 0x5D01;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;

/// Extract headers from an Outlook `.msg` file.
///
/// The transport header block is split line by line on the first colon
/// unless `unfold` is set, in which case folded lines are rejoined first.
pub fn extract_msg(data: &[u8], unfold: bool) -> Result<Extracted> {
    let mut comp = cfb::CompoundFile::open(Cursor::new(data))
        .map_err(|e| AnalyzeError::Format(format!("not an OLE compound file: {e}")))?;

    let has_properties = comp.is_stream(PROPERTIES_STREAM);
    let transport = read_string_property(&mut comp, PR_TRANSPORT_MESSAGE_HEADERS)?;

    if !has_properties && transport.is_none() {
        return Err(AnalyzeError::Format(
            "compound file does not contain an Outlook message".into(),
        ));
    }

    let headers = match transport {
        Some(text) if !text.trim().is_empty() => {
            if unfold {
                HeaderSet::from_pairs(unfold_headers(&text))
            } else {
                HeaderSet::from_pairs(split_header_lines(&text))
            }
        }
        _ => {
            debug!("No transport headers, using message properties");
            envelope_headers(&mut comp)?
        }
    };

    let native_time = if has_properties {
        read_submit_time(&mut comp)?
    } else {
        None
    };
    let submit_time = native_time
        .map(SubmitTime::Native)
        .or_else(|| headers.get("Date").map(|d| SubmitTime::Header(d.to_string())));

    Ok(Extracted {
        headers,
        submit_time,
    })
}

/// Build headers from the message's own properties.
fn envelope_headers<F: Read + Seek>(comp: &mut cfb::CompoundFile<F>) -> Result<HeaderSet> {
    let mut pairs: Vec<(&str, String)> = Vec::new();

    let name = read_string_property(comp, PR_SENDER_NAME)?;
    let address = match read_string_property(comp, PR_SENDER_SMTP_ADDRESS)? {
        Some(a) => Some(a),
        None => read_string_property(comp, PR_SENDER_EMAIL_ADDRESS)?,
    };
    let from = match (name, address) {
        (Some(n), Some(a)) if n != a => Some(format!("{n} <{a}>")),
        (Some(n), _) => Some(n),
        (None, a) => a,
    };
    if let Some(from) = from {
        pairs.push(("From", from));
    }

    for (header, id) in [
        ("To", PR_DISPLAY_TO),
        ("Cc", PR_DISPLAY_CC),
        ("Bcc", PR_DISPLAY_BCC),
        ("Subject", PR_SUBJECT),
        ("Message-ID", PR_INTERNET_MESSAGE_ID),
    ] {
        if let Some(value) = read_string_property(comp, id)? {
            pairs.push((header, value));
        }
    }

    Ok(HeaderSet::from_pairs(pairs))
}

/// Read a top-level string property, preferring the Unicode stream.
///
/// Empty values are reported as absent.
fn read_string_property<F: Read + Seek>(
    comp: &mut cfb::CompoundFile<F>,
    id: u16,
) -> Result<Option<String>> {
    let unicode = substg_path(id, PT_UNICODE);
    let text = if comp.is_stream(&unicode) {
        decode_utf16le(&read_stream(comp, &unicode)?)
    } else {
        let ansi = substg_path(id, PT_STRING8);
        if !comp.is_stream(&ansi) {
            return Ok(None);
        }
        decode_header_bytes(&read_stream(comp, &ansi)?)
    };

    let text = text.trim_end_matches('\0').trim().to_string();
    Ok((!text.is_empty()).then_some(text))
}

/// Find `PR_CLIENT_SUBMIT_TIME` in the top-level property stream.
fn read_submit_time<F: Read + Seek>(
    comp: &mut cfb::CompoundFile<F>,
) -> Result<Option<DateTime<Utc>>> {
    let data = read_stream(comp, PROPERTIES_STREAM)?;
    if data.len() < PROPERTIES_HEADER_LEN {
        return Err(AnalyzeError::Format(format!(
            "property stream is {} bytes, expected at least {PROPERTIES_HEADER_LEN}",
            data.len()
        )));
    }

    let wanted = property_tag(PR_CLIENT_SUBMIT_TIME, PT_SYSTIME);
    let time = data[PROPERTIES_HEADER_LEN..]
        .chunks_exact(PROPERTY_ENTRY_LEN)
        .find(|entry| LittleEndian::read_u32(&entry[0..4]) == wanted)
        .and_then(|entry| filetime_to_utc(LittleEndian::read_u64(&entry[8..16])));
    Ok(time)
}

fn read_stream<F: Read + Seek>(comp: &mut cfb::CompoundFile<F>, path: &str) -> Result<Vec<u8>> {
    let mut stream = comp
        .open_stream(path)
        .map_err(|e| AnalyzeError::Format(format!("cannot open stream {path}: {e}")))?;
    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .map_err(|e| AnalyzeError::Format(format!("cannot read stream {path}: {e}")))?;
    Ok(buf)
}

fn substg_path(id: u16, kind: u16) -> String {
    format!("/__substg1.0_{id:04X}{kind:04X}")
}

fn property_tag(id: u16, kind: u16) -> u32 {
    (u32::from(id) << 16) | u32::from(kind)
}

fn decode_utf16le(bytes: &[u8]) -> String {
    let mut units = vec![0u16; bytes.len() / 2];
    LittleEndian::read_u16_into(&bytes[..units.len() * 2], &mut units);
    String::from_utf16_lossy(&units)
}

/// Convert a Windows FILETIME (100 ns ticks since 1601) to UTC.
///
/// Zero means "not set".
fn filetime_to_utc(ticks: u64) -> Option<DateTime<Utc>> {
    if ticks == 0 {
        return None;
    }
    let secs = (ticks / FILETIME_TICKS_PER_SECOND) as i64 - FILETIME_UNIX_OFFSET;
    let nanos = ((ticks % FILETIME_TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    /// 2024-01-04 10:00:00 UTC as FILETIME.
    const JAN_4_2024: u64 = (1_704_362_400 + 11_644_473_600) * 10_000_000;

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(u16::to_le_bytes).collect()
    }

    fn properties(submit: Option<u64>) -> Vec<u8> {
        let mut data = vec![0u8; PROPERTIES_HEADER_LEN];
        // An unrelated PT_LONG entry first
        data.extend_from_slice(&0x0E07_0003u32.to_le_bytes());
        data.extend_from_slice(&6u32.to_le_bytes());
        data.extend_from_slice(&[0u8; 8]);
        if let Some(ft) = submit {
            data.extend_from_slice(&property_tag(PR_CLIENT_SUBMIT_TIME, PT_SYSTIME).to_le_bytes());
            data.extend_from_slice(&6u32.to_le_bytes());
            data.extend_from_slice(&ft.to_le_bytes());
        }
        data
    }

    fn build(streams: &[(String, Vec<u8>)]) -> Vec<u8> {
        let mut comp = cfb::CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        for (path, data) in streams {
            let mut stream = comp.create_stream(path).unwrap();
            stream.write_all(data).unwrap();
            stream.flush().unwrap();
        }
        comp.flush().unwrap();
        comp.into_inner().into_inner()
    }

    const TRANSPORT: &str = "Received: from mx.example.com\r\n\tby relay.example.net; Thu, 04 Jan 2024 10:00:00 +0000\r\nMessage-ID: <abc@example.com>\r\nDate: Thu, 04 Jan 2024 10:00:00 +0000\r\n";

    #[test]
    fn test_filetime_to_utc() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 4, 10, 0, 0).unwrap();
        assert_eq!(filetime_to_utc(JAN_4_2024), Some(expected));
        assert_eq!(filetime_to_utc(0), None);
    }

    #[test]
    fn test_substg_path() {
        assert_eq!(
            substg_path(PR_TRANSPORT_MESSAGE_HEADERS, PT_UNICODE),
            "/__substg1.0_007D001F"
        );
    }

    #[test]
    fn test_transport_headers_split_naively() {
        let data = build(&[
            (PROPERTIES_STREAM.to_string(), properties(Some(JAN_4_2024))),
            (
                substg_path(PR_TRANSPORT_MESSAGE_HEADERS, PT_UNICODE),
                utf16(TRANSPORT),
            ),
        ]);
        let extracted = extract_msg(&data, false).unwrap();
        let headers = &extracted.headers;
        assert_eq!(headers.get("received"), Some("from mx.example.com"));
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.message_id(), "<abc@example.com>");
        assert_eq!(
            extracted.submit_time,
            Some(SubmitTime::Native(
                Utc.with_ymd_and_hms(2024, 1, 4, 10, 0, 0).unwrap()
            ))
        );
    }

    #[test]
    fn test_transport_headers_unfolded_when_enabled() {
        let data = build(&[
            (PROPERTIES_STREAM.to_string(), properties(None)),
            (
                substg_path(PR_TRANSPORT_MESSAGE_HEADERS, PT_UNICODE),
                utf16(TRANSPORT),
            ),
        ]);
        let extracted = extract_msg(&data, true).unwrap();
        assert_eq!(extracted.headers.len(), 3);
        assert!(extracted
            .headers
            .get("Received")
            .unwrap()
            .ends_with("10:00:00 +0000"));
        // No native time: falls back to the Date header
        assert_eq!(
            extracted.submit_time,
            Some(SubmitTime::Header("Thu, 04 Jan 2024 10:00:00 +0000".into()))
        );
    }

    #[test]
    fn test_ansi_transport_headers() {
        let data = build(&[(
            substg_path(PR_TRANSPORT_MESSAGE_HEADERS, PT_STRING8),
            b"Subject: caf\xe9\r\n\0".to_vec(),
        )]);
        let extracted = extract_msg(&data, false).unwrap();
        assert_eq!(extracted.headers.subject(), "café");
        assert_eq!(extracted.submit_time, None);
    }

    #[test]
    fn test_draft_uses_envelope_properties() {
        let data = build(&[
            (PROPERTIES_STREAM.to_string(), properties(None)),
            (substg_path(PR_SENDER_NAME, PT_UNICODE), utf16("Alice")),
            (
                substg_path(PR_SENDER_SMTP_ADDRESS, PT_UNICODE),
                utf16("alice@example.com"),
            ),
            (substg_path(PR_DISPLAY_TO, PT_UNICODE), utf16("Bob")),
            (substg_path(PR_SUBJECT, PT_UNICODE), utf16("Draft plan\0")),
        ]);
        let extracted = extract_msg(&data, false).unwrap();
        let headers = &extracted.headers;
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, ["From", "To", "Subject"]);
        assert_eq!(headers.sender(), "Alice <alice@example.com>");
        assert_eq!(headers.subject(), "Draft plan");
        assert_eq!(headers.message_id(), "N/A");
    }

    #[test]
    fn test_not_a_compound_file() {
        let err = extract_msg(b"From: a@b.com\r\n\r\nhello", false).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_compound_file_without_message() {
        let data = build(&[("/Other".to_string(), b"x".to_vec())]);
        let err = extract_msg(&data, false).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_truncated_property_stream() {
        let data = build(&[(PROPERTIES_STREAM.to_string(), vec![0u8; 8])]);
        let err = extract_msg(&data, false).unwrap_err();
        assert!(err.is_format_error());
    }
}
