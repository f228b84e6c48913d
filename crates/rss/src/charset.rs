// ABOUTME: Byte-stream decoding for feeds that are not UTF-8.
// ABOUTME: Resolves the charset from a caller label, the XML declaration, or detection.

use encoding_rs::Encoding;

/// Decodes feed bytes into a string.
///
/// A caller-supplied label (usually the HTTP `Content-Type` charset
/// parameter) wins; otherwise the XML declaration's `encoding` attribute is
/// honored; otherwise the charset is detected from the bytes themselves.
pub(crate) fn decode_bytes(data: &[u8], label: Option<&str>) -> String {
    let encoding = label
        .and_then(|label| Encoding::for_label(label.trim().as_bytes()))
        .or_else(|| declared_encoding(data));
    if let Some(encoding) = encoding {
        let (text, _, _) = encoding.decode(data);
        return text.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(data, true);
    let (text, _, _) = detector.guess(None, true).decode(data);
    text.into_owned()
}

/// Reads the `encoding` attribute out of an `<?xml ...?>` prolog, if any.
fn declared_encoding(data: &[u8]) -> Option<&'static Encoding> {
    let prefix = String::from_utf8_lossy(&data[..data.len().min(1024)]);
    let declaration = prefix.trim_start_matches('\u{feff}').split("?>").next()?;
    if !declaration.starts_with("<?xml") {
        return None;
    }
    let rest = &declaration[declaration.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value = &rest[1..];
    Encoding::for_label(value[..value.find(quote)?].as_bytes())
}
