//! Extraction of generated code from completion text.

use regex::Regex;

/// Pull the Python source out of the first fenced ```python block.
///
/// The contract asks the model for exactly one block; if it wraps the block
/// in prose or emits several, the first one wins. Returns `None` when no
/// block is present, which the loop counts as a failed attempt.
pub fn extract_python_block(response: &str) -> Option<String> {
    let re = Regex::new(r"```python\n([\s\S]*?)```").ok()?;
    re.captures(response)
        .and_then(|caps| caps.get(1))
        .map(|code| code.as_str().trim().to_string())
}
