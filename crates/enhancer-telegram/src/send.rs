//! Message splitting for the Telegram adapter.
//!
//! Telegram rejects messages over 4096 characters. Enhancement results carry
//! both the original and the rewritten text, so they can exceed that.

/// Telegram's hard per-message limit.
pub const TELEGRAM_MAX: usize = 4096;

/// Line-preserving message splitter.
///
/// Lengths are counted in bytes, which never undercounts characters, so a
/// text the router accepted against the same budget is never split. Chunks
/// break on line boundaries and carry the text unchanged: messages are plain
/// text, so nothing is added to re-balance markup. Always returns at least
/// one chunk.
pub fn split_chunks_smart(text: &str, max: usize) -> Vec<String> {
    let max = max.clamp(16, TELEGRAM_MAX);
    if text.len() <= max {
        return vec![text.to_string()];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for line in text.split('\n') {
        let cost = if current.is_empty() {
            line.len()
        } else {
            1 + line.len()
        };

        if !current.is_empty() && current.len() + cost > max {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    // Lines longer than `max` still need a hard split.
    let mut result = Vec::new();
    for chunk in chunks {
        let mut remaining = chunk.as_str();
        while remaining.len() > max {
            let window = &remaining[..floor_char_boundary(remaining, max)];
            let split_at = window
                .rfind('\n')
                .or_else(|| window.rfind(' '))
                .filter(|&i| i > 0)
                .unwrap_or(window.len());
            result.push(remaining[..split_at].to_string());
            remaining = remaining[split_at..].trim_start();
        }
        if !remaining.is_empty() {
            result.push(remaining.to_string());
        }
    }

    if result.is_empty() {
        result.push(String::new());
    }
    result
}

/// Largest index `<= max` that falls on a UTF-8 boundary of `s`.
fn floor_char_boundary(s: &str, max: usize) -> usize {
    if max >= s.len() {
        return s.len();
    }
    let mut i = max;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
