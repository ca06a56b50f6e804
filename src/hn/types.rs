use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Hacker News story listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryFeed {
    Top,
    New,
    Best,
    Ask,
    Show,
    Job,
}

impl StoryFeed {
    pub const ALL: [StoryFeed; 6] = [
        StoryFeed::Top,
        StoryFeed::New,
        StoryFeed::Best,
        StoryFeed::Ask,
        StoryFeed::Show,
        StoryFeed::Job,
    ];

    /// Path of the id-list endpoint, relative to the API base.
    pub const fn endpoint(self) -> &'static str {
        match self {
            StoryFeed::Top => "topstories.json",
            StoryFeed::New => "newstories.json",
            StoryFeed::Best => "beststories.json",
            StoryFeed::Ask => "askstories.json",
            StoryFeed::Show => "showstories.json",
            StoryFeed::Job => "jobstories.json",
        }
    }
}

/// An item from `/item/{id}.json`: a story, comment, job or poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: u64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub by: Option<String>,
    /// Unix seconds.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub descendants: Option<u32>,
    #[serde(default)]
    pub kids: Vec<u64>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

impl Item {
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time, 0)
    }

    /// Deleted and dead items carry no content worth showing.
    pub fn is_visible(&self) -> bool {
        !self.deleted && !self.dead
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_story() {
        let item: Item = serde_json::from_str(
            r#"{"by":"dhouston","descendants":71,"id":8863,"kids":[8952,9224],"score":111,
                "time":1175714200,"title":"My YC app: Dropbox","type":"story","url":"http://www.getdropbox.com/u/2/screencast.html"}"#,
        )
        .unwrap();

        assert_eq!(item.id, 8863);
        assert_eq!(item.kind.as_deref(), Some("story"));
        assert_eq!(item.kids, vec![8952, 9224]);
        assert!(item.is_visible());
        assert_eq!(item.published_at().unwrap().timestamp(), 1175714200);
    }

    #[test]
    fn decode_deleted_comment() {
        let item: Item = serde_json::from_str(r#"{"id":1,"deleted":true,"parent":2,"time":0}"#).unwrap();
        assert!(!item.is_visible());
        assert_eq!(item.parent, Some(2));
    }
}
