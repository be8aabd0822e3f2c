//! Removal of the tool's own license banner from generated text.
//!
//! Templates carry the same banner as the rest of the tool's sources; it
//! must not leak into Dockerfiles and configs shipped in images.

use std::sync::LazyLock;

use regex::Regex;

const FRAME: &str = "# --------------------------------------------------------------------------- #";
const TITLE: &str = "#   Proofscape Manage                                                         #";
const BLANK: &str = "#                                                                             #";

static LICENSE_HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?ms)^{frame}\n{title}\n{blank}\n#   Copyright .+?\n{frame}\n",
        frame = regex::escape(FRAME),
        title = regex::escape(TITLE),
        blank = regex::escape(BLANK),
    );
    Regex::new(&pattern).unwrap()
});

/// Strip every license banner block from `text`.
///
/// A block is the framed `Proofscape Manage` title, a blank framed line, a
/// `Copyright` line, and everything up to the next closing frame. Framed
/// comment blocks with any other title are left alone.
pub fn strip_headers(text: &str) -> String {
    LICENSE_HEADER_PATTERN.replace_all(text, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn license_header() -> String {
        [
            FRAME,
            TITLE,
            BLANK,
            "#   Copyright (c) 2021-2022 Proofscape contributors                           #",
            BLANK,
            "#   Licensed under the Apache License, Version 2.0 (the \"License\");           #",
            FRAME,
            "",
        ]
        .join("\n")
    }

    #[test]
    fn removes_header_and_keeps_body() {
        let text = format!("{}FROM redis:6.2.1\nCOPY tmp/redis.conf /usr/local/etc/redis/\n", license_header());
        assert_eq!(
            strip_headers(&text),
            "FROM redis:6.2.1\nCOPY tmp/redis.conf /usr/local/etc/redis/\n"
        );
    }

    #[test]
    fn removes_header_in_the_middle_of_text() {
        let text = format!("FROM nginx\n{}RUN true\n", license_header());
        assert_eq!(strip_headers(&text), "FROM nginx\nRUN true\n");
    }

    #[test]
    fn leaves_other_framed_blocks_alone() {
        let other_title = "#   Proofscape ISE".to_owned() + &" ".repeat(60) + "#";
        let block = [
            FRAME,
            other_title.as_str(),
            BLANK,
            "#   Copyright (c) 2020 somebody else                                          #",
            FRAME,
            "",
        ]
        .join("\n");
        let text = format!("{block}FROM python:3.8\n");
        assert_eq!(strip_headers(&text), text);
    }

    #[test]
    fn requires_copyright_line() {
        let block = [FRAME, TITLE, BLANK, "#   Not a copyright line", FRAME, ""].join("\n");
        assert_eq!(strip_headers(&block), block);
    }

    #[test]
    fn lazy_match_stops_at_first_closing_frame() {
        let text = format!("{}keep me\n{FRAME}\n", license_header());
        assert_eq!(strip_headers(&text), format!("keep me\n{FRAME}\n"));
    }

    #[test]
    fn text_without_header_is_unchanged() {
        assert_eq!(strip_headers("FROM scratch\n"), "FROM scratch\n");
        assert_eq!(strip_headers(""), "");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn idempotent(body in "[ -~\n]{0,200}", with_header in any::<bool>()) {
                let text = if with_header {
                    format!("{}{body}", license_header())
                } else {
                    body
                };
                let once = strip_headers(&text);
                prop_assert_eq!(strip_headers(&once), once.clone());
            }
        }
    }
}
