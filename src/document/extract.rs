//! Text extraction per source format

use std::io::{Cursor, Read};
use std::sync::LazyLock;

use regex::Regex;

use super::SourceFormat;

/// Main document part inside a `.docx` package
const DOCX_BODY_PART: &str = "word/document.xml";

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<w:p[ >].*?</w:p>").expect("valid paragraph regex"));

// run content: text, tab, or line break
static TEXT_RUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:(tab)\s*/>|<w:(br|cr)(?:\s[^>]*)?/>")
        .expect("valid text run regex")
});

static CHAR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(?:x([0-9a-fA-F]+)|([0-9]+));").expect("valid char ref regex"));

/// Convert raw bytes of the given format to UTF-8 text.
///
/// The error string describes why the content could not be read.
pub fn extract_text(format: SourceFormat, bytes: &[u8]) -> Result<String, String> {
    match format {
        SourceFormat::Text => plain_text(bytes),
        SourceFormat::WordProcessor => docx_text(bytes),
        SourceFormat::Pdf => pdf_text(bytes),
    }
}

fn plain_text(bytes: &[u8]) -> Result<String, String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| format!("not valid UTF-8: {}", e))
}

fn pdf_text(bytes: &[u8]) -> Result<String, String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| {
        let msg = e.to_string();
        if msg.to_lowercase().contains("encrypt") || msg.to_lowercase().contains("password") {
            "PDF is password-protected".to_string()
        } else {
            format!("PDF text extraction failed: {}", msg)
        }
    })
}

fn docx_text(bytes: &[u8]) -> Result<String, String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a valid .docx package: {}", e))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY_PART)
        .map_err(|e| format!("missing {}: {}", DOCX_BODY_PART, e))?
        .read_to_string(&mut xml)
        .map_err(|e| format!("failed to read {}: {}", DOCX_BODY_PART, e))?;

    Ok(docx_xml_to_text(&xml))
}

/// Flatten WordprocessingML into one line per non-empty paragraph.
///
/// Table cells hold their own paragraphs, so cell text comes out as lines too.
pub fn docx_xml_to_text(xml: &str) -> String {
    PARAGRAPH_RE
        .find_iter(xml)
        .map(|p| {
            TEXT_RUN_RE
                .captures_iter(p.as_str())
                .map(|c| {
                    if let Some(text) = c.get(1) {
                        unescape_xml(text.as_str())
                    } else if c.get(2).is_some() {
                        "\t".to_string()
                    } else {
                        "\n".to_string()
                    }
                })
                .collect::<String>()
        })
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn unescape_xml(text: &str) -> String {
    let text = CHAR_REF_RE.replace_all(text, |c: &regex::Captures| {
        let code = match (c.get(1), c.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| c[0].to_string())
    });
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
