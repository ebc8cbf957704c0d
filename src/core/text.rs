//! Text clean-up applied to model output before it reaches state.

/// Collapse every run of three or more `\n` into exactly two.
///
/// Runs are counted on raw `\n` characters; `\r\n` sequences are left alone.
///
/// ```
/// use bible_expert::core::text::collapse_newlines;
///
/// assert_eq!(collapse_newlines("a\n\n\n\nb"), "a\n\nb");
/// assert_eq!(collapse_newlines("a\n\nb"), "a\n\nb");
/// ```
pub fn collapse_newlines(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    push_collapsed(&mut out, input);
    out
}

/// Append `chunk` to already-collapsed `out`, continuing any newline run
/// that `out` ends with. Only the new text is scanned.
///
/// ```
/// use bible_expert::core::text::push_collapsed;
///
/// let mut reply = String::from("Psalm 23\n\n");
/// push_collapsed(&mut reply, "\n\nThe Lord");
/// assert_eq!(reply, "Psalm 23\n\nThe Lord");
/// ```
pub fn push_collapsed(out: &mut String, chunk: &str) {
    let mut run = out.bytes().rev().take_while(|b| *b == b'\n').count();
    for ch in chunk.chars() {
        if ch == '\n' {
            run += 1;
            if run <= 2 {
                out.push(ch);
            }
        } else {
            run = 0;
            out.push(ch);
        }
    }
}

/// Turn a raw model reply into a sidebar title.
///
/// Quotes are stripped and anything longer than five words is cut to five
/// words followed by `...`. Returns an empty string when nothing is left.
pub fn clean_title(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '"' && *c != '\'')
        .collect();
    let words: Vec<&str> = stripped.split_whitespace().collect();
    if words.len() > 5 {
        format!("{}...", words[..5].join(" "))
    } else {
        stripped.trim().to_string()
    }
}
