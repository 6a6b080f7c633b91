use models::{blog_entry_url, RecentAction};

/// Raw comment markup, or empty when the record carries no comment.
pub fn extract_comment(record: &RecentAction) -> &str {
    record
        .comment
        .as_ref()
        .map(|c| c.text.as_str())
        .unwrap_or_default()
}

/// Permalink to the comment on its blog entry. Needs both halves of the record.
pub fn extract_comment_link(record: &RecentAction) -> Option<String> {
    match (&record.blog_entry, &record.comment) {
        (Some(blog), Some(comment)) => Some(format!(
            "{}#comment-{}",
            blog_entry_url(blog.id),
            comment.id
        )),
        _ => None,
    }
}

/// `<blog>_<comment>`, or empty for incomplete records. Empty identifiers collide.
pub fn get_identifier(record: &RecentAction) -> String {
    match (&record.blog_entry, &record.comment) {
        (Some(blog), Some(comment)) => format!("{}_{}", blog.id, comment.id),
        _ => String::new(),
    }
}
