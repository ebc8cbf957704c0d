//! Cleanup for text typed or pasted into the terminal.

/// Strip control characters that would corrupt the TUI. Tabs become four
/// spaces and carriage returns become newlines.
pub fn sanitize_text_input(text: &str) -> String {
    let mut sanitized = String::with_capacity(text.len());
    for c in text.replace("\r\n", "\n").chars() {
        match c {
            '\t' => sanitized.push_str("    "),
            '\r' | '\n' => sanitized.push('\n'),
            _ if !c.is_control() => sanitized.push(c),
            _ => {}
        }
    }
    sanitized
}

/// Sanitize for the single-line input box: line breaks collapse into a
/// single space each.
pub fn sanitize_single_line(text: &str) -> String {
    sanitize_text_input(text)
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_expand_and_controls_drop() {
        assert_eq!(sanitize_text_input("Ps\t23\x07"), "Ps    23");
    }

    #[test]
    fn crlf_counts_as_one_break() {
        assert_eq!(sanitize_text_input("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn pasted_verses_become_one_line() {
        assert_eq!(
            sanitize_single_line("The Lord is my shepherd;\r\n\r\nI shall not want.\n"),
            "The Lord is my shepherd; I shall not want."
        );
    }

    #[test]
    fn blank_paste_is_empty() {
        assert_eq!(sanitize_single_line("\n\t\n"), "");
    }
}
