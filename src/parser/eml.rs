//! Parser for `.eml` files (RFC 5322 messages).

use tracing::debug;

use super::header::{decode_encoded_words, decode_header_bytes, unfold_headers};
use super::Extracted;
use crate::error::Result;
use crate::model::headers::HeaderSet;
use crate::model::report::SubmitTime;

/// Extract the top-level headers of an `.eml` message.
///
/// Header names keep the case they were written in. Each line is decoded
/// on its own (UTF-8, else Windows-1252), so a stray 8-bit byte never costs
/// a header. Folded values are unfolded and encoded-words decoded. Repeated
/// headers are all kept. The `Date` header stands in for the submission time.
///
/// A message without any header lines yields an empty header set.
pub fn extract_eml(data: &[u8]) -> Result<Extracted> {
    let header_end = find_header_end(data).unwrap_or(data.len());
    let block = header_block(&data[..header_end]);

    let pairs: Vec<(String, String)> = unfold_headers(&block)
        .into_iter()
        .map(|(name, value)| (name, decode_encoded_words(&value)))
        .collect();

    if pairs.is_empty() {
        debug!("No header lines found");
    }

    let headers = HeaderSet::from_pairs(pairs);
    let submit_time = headers
        .get("Date")
        .map(|d| SubmitTime::Header(d.to_string()));

    Ok(Extracted {
        headers,
        submit_time,
    })
}

/// Find the byte offset where headers end (position of the first blank line).
fn find_header_end(data: &[u8]) -> Option<usize> {
    if data.starts_with(b"\n") || data.starts_with(b"\r\n") {
        return Some(0);
    }
    for i in 0..data.len().saturating_sub(1) {
        if data[i] == b'\n' && data[i + 1] == b'\n' {
            return Some(i);
        }
        if i + 3 < data.len()
            && data[i] == b'\r'
            && data[i + 1] == b'\n'
            && data[i + 2] == b'\r'
            && data[i + 3] == b'\n'
        {
            return Some(i);
        }
    }
    None
}

/// Decode the header block line by line, stopping at the first line that is
/// neither a header nor a continuation (the body started without a blank
/// line). A leading mbox `From ` separator is skipped.
fn header_block(bytes: &[u8]) -> String {
    let mut block = String::with_capacity(bytes.len());

    for (i, raw) in bytes.split(|&b| b == b'\n').enumerate() {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if i == 0 && raw.starts_with(b"From ") {
            continue;
        }
        let line = decode_header_bytes(raw);
        let continuation = line.starts_with(' ') || line.starts_with('\t');
        if !continuation && !is_header_line(&line) {
            debug!(line = %line, "Header block ends at a non-header line");
            break;
        }
        block.push_str(&line);
        block.push('\n');
    }

    block
}

/// `true` when the line starts with a field name followed by a colon.
fn is_header_line(line: &str) -> bool {
    line.split_once(':')
        .is_some_and(|(name, _)| !name.is_empty() && !name.contains(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, verdict};
    use crate::model::verdict::VerdictKind;

    const SAMPLE: &[u8] = b"Received: from mx1.example.com\r\n\tby mx2.example.net; Thu, 04 Jan 2024 10:00:00 +0000\r\n\
Received: from client.example.com by mx1.example.com\r\n\
From: =?UTF-8?B?Sm9zw6k=?= <jose@example.com>\r\n\
To: bob@example.net\r\n\
Subject: Hello\r\n\
Date: Thu, 04 Jan 2024 10:00:00 +0000\r\n\
Message-ID: <msg001@example.com>\r\n\
\r\n\
Body text.\r\n";

    #[test]
    fn test_find_header_end_crlf() {
        let data = b"From: a@b.com\r\nSubject: Hi\r\n\r\nBody\r\n";
        assert_eq!(find_header_end(data), Some(26));
    }

    #[test]
    fn test_find_header_end_leading_blank_line() {
        assert_eq!(find_header_end(b"\r\nJust a body\r\n"), Some(0));
        assert_eq!(find_header_end(b"\nJust a body\n"), Some(0));
    }

    #[test]
    fn test_extract_eml_headers() {
        let extracted = extract_eml(SAMPLE).unwrap();
        let headers = &extracted.headers;
        assert_eq!(headers.len(), 7);
        assert_eq!(headers.get_all("received").count(), 2);
        assert_eq!(headers.subject(), "Hello");
        assert_eq!(headers.message_id(), "<msg001@example.com>");
        assert_eq!(headers.bcc(), "N/A");
    }

    #[test]
    fn test_folded_value_is_unfolded() {
        let extracted = extract_eml(SAMPLE).unwrap();
        let first = extracted.headers.get_all("Received").next().unwrap();
        assert_eq!(
            first,
            "from mx1.example.com by mx2.example.net; Thu, 04 Jan 2024 10:00:00 +0000"
        );
    }

    #[test]
    fn test_encoded_words_decoded() {
        let extracted = extract_eml(SAMPLE).unwrap();
        assert!(extracted.headers.sender().starts_with("José"));
        assert!(extracted.headers.sender().contains("<jose@example.com>"));
    }

    #[test]
    fn test_date_is_submit_time() {
        let extracted = extract_eml(SAMPLE).unwrap();
        assert_eq!(
            extracted.submit_time,
            Some(SubmitTime::Header("Thu, 04 Jan 2024 10:00:00 +0000".into()))
        );
    }

    #[test]
    fn test_latin1_received_header_is_kept() {
        let data = b"Received: from relay.ex\xe9mple.com by mx.example.net\r\n\
Message-ID: <a@b>\r\n\
Subject: caf\xe9\r\n\
\r\n\
body";
        let extracted = extract_eml(data).unwrap();
        let headers = &extracted.headers;
        assert_eq!(
            headers.get("Received"),
            Some("from relay.exémple.com by mx.example.net")
        );
        assert_eq!(headers.subject(), "café");

        let auth = classify(headers);
        assert_eq!(verdict(headers, &auth).kind, VerdictKind::Legitimate);
    }

    #[test]
    fn test_invalid_utf8_does_not_affect_other_lines() {
        let data = b"Received: from \xff\xfe x\r\nSubject: Gr\xc3\xbc\xc3\x9fe\r\n\r\n";
        let extracted = extract_eml(data).unwrap();
        assert_eq!(extracted.headers.get("Received"), Some("from ÿþ x"));
        assert_eq!(extracted.headers.subject(), "Grüße");
    }

    #[test]
    fn test_header_names_keep_their_case() {
        let data = b"received: from x\r\nMESSAGE-ID: <a@b>\r\nMessage-Id: <c@d>\r\nDkim-Signature: v=1\r\n\r\n";
        let extracted = extract_eml(data).unwrap();
        let names: Vec<&str> = extracted.headers.iter().map(|(k, _)| k).collect();
        assert_eq!(
            names,
            ["received", "MESSAGE-ID", "Message-Id", "Dkim-Signature"]
        );
        assert_eq!(extracted.headers.message_id(), "<c@d>");
    }

    #[test]
    fn test_body_without_blank_line_is_not_headers() {
        let data = b"Subject: Hi\r\nhello world\r\nX-Looks-Like: a header\r\n";
        let extracted = extract_eml(data).unwrap();
        assert_eq!(extracted.headers.len(), 1);
        assert_eq!(extracted.headers.subject(), "Hi");
    }

    #[test]
    fn test_headerless_input_is_possibly_fake() {
        for data in [&b""[..], b"\r\nJust a body\r\n", b"hello world\r\n"] {
            let extracted = extract_eml(data).unwrap();
            assert!(extracted.headers.is_empty());
            assert_eq!(extracted.submit_time, None);

            let auth = classify(&extracted.headers);
            let result = verdict(&extracted.headers, &auth);
            assert_eq!(result.kind, VerdictKind::PossiblyFake);
            assert_eq!(result.reasons.len(), 5);
        }
    }
}
