//! Text clean-up for content read back from the Git items API.

/// Undoes UTF-8 text that was decoded as Latin-1 somewhere upstream
/// (`AtualizaÃ§Ã£o` → `Atualização`).
///
/// Only applies when the text shows the telltale `Ã` and every char fits in a
/// single Latin-1 byte; anything that does not re-decode as UTF-8 is returned
/// unchanged.
pub fn repair_mojibake(content: &str) -> String {
    if !content.contains('Ã') {
        return content.to_string();
    }

    let bytes: Option<Vec<u8>> = content
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();

    bytes
        .and_then(|b| String::from_utf8(b).ok())
        .unwrap_or_else(|| content.to_string())
}
