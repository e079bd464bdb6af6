pub mod commands;

/// Parse one `<file> <function>` pair from a batch config line.
///
/// The separator is the first space; lines without both parts yield `None`
/// and are skipped by the batch driver.
pub fn parse_multi_line(line: &str) -> Option<(String, String)> {
    let (file, func) = line.trim().split_once(' ')?;
    let func = func.trim();
    if file.is_empty() || func.is_empty() {
        return None;
    }
    Some((file.to_string(), func.to_string()))
}
