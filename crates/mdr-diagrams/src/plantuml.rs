//! `PlantUML` source encoding for server-side rendering.
//!
//! The public `PlantUML` HTTP scheme encodes diagram source as raw
//! deflate output re-encoded with a custom base64-like alphabet, placed
//! directly in the URL path (`{server}/svg/{encoded}`).

use std::io::Write;

use flate2::Compression;
use flate2::write::DeflateEncoder;

/// The `PlantUML` base64-like alphabet (digits, upper, lower, `-`, `_`).
const ALPHABET: &[u8; 64] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-_";

/// Encode `PlantUML` source text for use in a server URL path.
///
/// Compresses with raw deflate (no zlib header or checksum) and encodes
/// the result with the `PlantUML` alphabet.
///
/// # Errors
///
/// Returns an error if deflate compression fails.
pub fn encode_diagram_source(source: &str) -> std::io::Result<String> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(source.as_bytes())?;
    let compressed = encoder.finish()?;
    Ok(encode64(&compressed))
}

/// Build the rendered-image URL for a `PlantUML` source block.
///
/// Wraps the source in `@startuml`/`@enduml` when no `@start` directive
/// is present, mirroring how the public server expects bare diagrams.
///
/// # Errors
///
/// Returns an error if deflate compression fails.
pub fn plantuml_url(server: &str, source: &str) -> std::io::Result<String> {
    let source = source.trim();
    let wrapped;
    let source = if source.starts_with("@start") {
        source
    } else {
        wrapped = format!("@startuml\n{source}\n@enduml");
        &wrapped
    };

    let encoded = encode_diagram_source(source)?;
    Ok(format!("{}/svg/{encoded}", server.trim_end_matches('/')))
}

/// Encode bytes with the `PlantUML` alphabet (3 bytes → 4 characters).
fn encode64(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len().div_ceil(3) * 4);

    for chunk in data.chunks(3) {
        match *chunk {
            [b1, b2, b3] => {
                result.push(ALPHABET[usize::from(b1 >> 2)] as char);
                result.push(ALPHABET[usize::from(((b1 & 0x3) << 4) | (b2 >> 4))] as char);
                result.push(ALPHABET[usize::from(((b2 & 0xF) << 2) | (b3 >> 6))] as char);
                result.push(ALPHABET[usize::from(b3 & 0x3F)] as char);
            }
            [b1, b2] => {
                result.push(ALPHABET[usize::from(b1 >> 2)] as char);
                result.push(ALPHABET[usize::from(((b1 & 0x3) << 4) | (b2 >> 4))] as char);
                result.push(ALPHABET[usize::from((b2 & 0xF) << 2)] as char);
            }
            [b1] => {
                result.push(ALPHABET[usize::from(b1 >> 2)] as char);
                result.push(ALPHABET[usize::from((b1 & 0x3) << 4)] as char);
            }
            _ => unreachable!("chunks(3) yields 1-3 bytes"),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::DeflateDecoder;
    use pretty_assertions::assert_eq;

    use super::*;

    /// Reverse of [`encode64`], for round-trip testing.
    fn decode64(text: &str) -> Vec<u8> {
        let index = |c: char| {
            ALPHABET
                .iter()
                .position(|&a| a as char == c)
                .expect("character in alphabet") as u8
        };
        let vals: Vec<u8> = text.chars().map(index).collect();
        let mut out = Vec::new();
        for chunk in vals.chunks(4) {
            match *chunk {
                [a, b, c, d] => {
                    out.push((a << 2) | (b >> 4));
                    out.push((b << 4) | (c >> 2));
                    out.push((c << 6) | d);
                }
                [a, b, c] => {
                    out.push((a << 2) | (b >> 4));
                    out.push((b << 4) | (c >> 2));
                }
                [a, b] => {
                    out.push((a << 2) | (b >> 4));
                }
                _ => panic!("dangling character"),
            }
        }
        out
    }

    #[test]
    fn test_encode64_known_bytes() {
        assert_eq!(encode64(b"ABC"), "GK93");
        assert_eq!(encode64(&[0]), "00");
        assert_eq!(encode64(&[]), "");
    }

    #[test]
    fn test_encode64_uses_alphabet_only() {
        let encoded = encode64(b"arbitrary input \xff\x00\x7f");
        assert!(encoded.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn test_encode_round_trip() {
        let source = "@startuml\nAlice -> Bob: Hello\n@enduml";
        let encoded = encode_diagram_source(source).unwrap();

        let compressed = decode64(&encoded);
        let mut decoder = DeflateDecoder::new(compressed.as_slice());
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();

        assert_eq!(decompressed, source);
    }

    #[test]
    fn test_plantuml_url_wraps_bare_source() {
        let url = plantuml_url("https://plantuml.example/plantuml", "Alice -> Bob: Hello").unwrap();
        assert!(url.starts_with("https://plantuml.example/plantuml/svg/"));

        // The encoded payload decodes to a wrapped diagram
        let encoded = url.rsplit('/').next().unwrap();
        let compressed = decode64(encoded);
        let mut decoder = DeflateDecoder::new(compressed.as_slice());
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert!(decompressed.starts_with("@startuml\n"));
        assert!(decompressed.ends_with("\n@enduml"));
    }

    #[test]
    fn test_plantuml_url_preserves_start_directive() {
        let url = plantuml_url(
            "https://plantuml.example/plantuml/",
            "@startmindmap\n* root\n@endmindmap",
        )
        .unwrap();

        let encoded = url.rsplit('/').next().unwrap();
        let compressed = decode64(encoded);
        let mut decoder = DeflateDecoder::new(compressed.as_slice());
        let mut decompressed = String::new();
        decoder.read_to_string(&mut decompressed).unwrap();
        assert!(decompressed.starts_with("@startmindmap"));
        assert!(!decompressed.contains("@startuml"));
    }
}
