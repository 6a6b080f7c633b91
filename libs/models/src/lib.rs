use serde::{Deserialize, Serialize};

pub const CODEFORCES_URL: &str = "https://codeforces.com";

const RELATIVE_HREF: &str = "href=\"/";

/// A blog entry as returned by the Codeforces API.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlogEntry {
    pub id: i64,
    #[serde(default)]
    pub original_locale: String,
    #[serde(default)]
    pub creation_time_seconds: i64,
    pub author_handle: String,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub modification_time_seconds: i64,
    #[serde(default)]
    pub allow_view_history: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub rating: i64,
}

/// A comment on a Codeforces blog entry. The `text` is raw markup.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    #[serde(default)]
    pub creation_time_seconds: i64,
    pub commentator_handle: String,
    #[serde(default)]
    pub locale: String,
    pub text: String,
    #[serde(default)]
    pub parent_comment_id: i64,
    #[serde(default)]
    pub rating: i64,
}

/// One activity on a blog or comment. Either side may be missing.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecentAction {
    #[serde(default)]
    pub time_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blog_entry: Option<BlogEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<Comment>,
}

impl RecentAction {
    pub fn blog_id(&self) -> Option<i64> {
        self.blog_entry.as_ref().map(|b| b.id)
    }

    /// Both a blog entry and a comment are present.
    pub fn is_complete(&self) -> bool {
        self.blog_entry.is_some() && self.comment.is_some()
    }

    pub fn absolutize_links(&mut self) {
        if let Some(comment) = self.comment.as_mut() {
            comment.text = absolutize_links(&comment.text);
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub uuid: String,
    pub username: String,
    #[serde(default, skip_serializing)]
    pub hashed_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codeforces_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subscribed_blogs: Vec<i64>,
}

impl User {
    pub fn is_subscribed_to(&self, blog_id: i64) -> bool {
        self.subscribed_blogs.contains(&blog_id)
    }
}

/// Rewrites site-relative links in comment markup so they point at Codeforces.
pub fn absolutize_links(markup: &str) -> String {
    markup.replace(RELATIVE_HREF, &format!("href=\"{}/", CODEFORCES_URL))
}

pub fn profile_url(handle: &str) -> String {
    format!("{}/profile/{}", CODEFORCES_URL, handle)
}

pub fn blog_entry_url(id: i64) -> String {
    format!("{}/blog/entry/{}", CODEFORCES_URL, id)
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;

    use super::*;

    #[test]
    fn it_decodes_comment_only_actions() -> Result<()> {
        let action: RecentAction = serde_json::from_value(json!({
            "timeSeconds": 1690000000,
            "comment": {
                "id": 2,
                "commentatorHandle": "b",
                "text": "<i>hello</i>"
            }
        }))?;

        assert_eq!(action.blog_entry, None);
        assert_eq!(action.comment.as_ref().map(|c| c.id), Some(2));
        assert!(!action.is_complete());

        Ok(())
    }

    #[test]
    fn it_rejects_comments_without_text() {
        let decoded = serde_json::from_value::<RecentAction>(json!({
            "timeSeconds": 1,
            "comment": { "id": 2, "commentatorHandle": "b" }
        }));

        assert!(decoded.is_err());
    }

    #[test]
    fn it_omits_missing_sub_records() {
        let action = RecentAction {
            time_seconds: 1,
            blog_entry: None,
            comment: None,
        };

        insta::assert_json_snapshot!(action, @r###"
        {
          "timeSeconds": 1
        }
        "###);
    }

    #[test]
    fn it_never_serializes_password_hashes() -> Result<()> {
        let user = User {
            uuid: "f84d38d4".to_owned(),
            username: "jacob".to_owned(),
            hashed_password: "$argon2id$secret".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&user)?,
            json!({ "uuid": "f84d38d4", "username": "jacob" })
        );

        Ok(())
    }

    #[test]
    fn it_absolutizes_relative_links() {
        let mut action = RecentAction {
            time_seconds: 1,
            blog_entry: None,
            comment: Some(Comment {
                id: 1,
                commentator_handle: "b".to_owned(),
                text: r#"see <a href="/blog/entry/5">this</a> and <a href="https://x.org/">that</a>"#
                    .to_owned(),
                ..Default::default()
            }),
        };

        action.absolutize_links();

        assert_eq!(
            action.comment.unwrap().text,
            r#"see <a href="https://codeforces.com/blog/entry/5">this</a> and <a href="https://x.org/">that</a>"#
        );
    }
}
