use lazy_static::lazy_static;
use regex::Regex;

use crate::config::MarkupPolicy;

lazy_static! {
    // A tag only opens at `<` followed by a letter, `/`, `!` or `?`.
    static ref TAGS: Regex = Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z][^>]*>|<[!?][^>]*>")
        .expect("Tag regex error");
}

/// Text content of a markup fragment, tags dropped and entities decoded.
pub fn html_to_text(html: &str) -> String {
    let stripped = TAGS.replace_all(html, "");
    html_escape::decode_html_entities(&stripped).into_owned()
}

pub fn render_comment_markup(policy: MarkupPolicy, text: &str) -> String {
    match policy {
        MarkupPolicy::Trusted => text.to_owned(),
        MarkupPolicy::Sanitized => ammonia::clean(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_strips_markup() {
        assert_eq!(html_to_text("<b>Hi</b> there"), "Hi there");
    }

    #[test]
    fn it_leaves_plain_text_alone() {
        assert_eq!(html_to_text("Hi there"), "Hi there");
        assert_eq!(html_to_text(&html_to_text("<b>Hi</b> there")), "Hi there");
    }

    #[test]
    fn it_decodes_entities() {
        assert_eq!(
            html_to_text("<p>A &amp; B &lt;3 &#65;&#x42;</p>"),
            "A & B <3 AB"
        );
    }

    #[test]
    fn it_decodes_typographic_entities() {
        assert_eq!(
            html_to_text("A &mdash; B &laquo;x&raquo;&hellip; it&rsquo;s"),
            "A \u{2014} B \u{00ab}x\u{00bb}\u{2026} it\u{2019}s"
        );
    }

    #[test]
    fn it_keeps_bare_angle_brackets() {
        assert_eq!(html_to_text("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
        assert_eq!(html_to_text("<b>1 < 2</b> and 3 > 2"), "1 < 2 and 3 > 2");
    }

    #[test]
    fn it_drops_comments_and_attributes() {
        assert_eq!(
            html_to_text("<!-- hidden --><a href=\"/blog\" title=\"x\">Round #1</a>"),
            "Round #1"
        );
    }

    #[test]
    fn it_trusts_markup_verbatim_by_default() {
        let text = "<i>hello</i><script>alert(1)</script>";
        assert_eq!(render_comment_markup(MarkupPolicy::default(), text), text);
    }

    #[test]
    fn it_sanitizes_when_asked() {
        let text = "<i>hello</i><script>alert(1)</script>";
        assert_eq!(
            render_comment_markup(MarkupPolicy::Sanitized, text),
            "<i>hello</i>"
        );
    }
}
