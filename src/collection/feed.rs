use crate::domain::model::Record;
use serde::Deserialize;
use serde_json::Value;

/// 排程來源的一筆資料
#[derive(Debug, Clone, Deserialize)]
pub struct FeedRecord {
    pub venue: FeedVenue,
    pub date: String,
    #[serde(default)]
    pub open_time: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub performance_name: Option<String>,
    #[serde(default)]
    pub presale_price: Option<u32>,
    #[serde(default)]
    pub door_price: Option<u32>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub performers: FeedPerformers,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedVenue {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub name_romaji: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub opened_date: Option<String>,
}

/// 表演者可以是一段文字，或文字與物件混合的陣列
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedPerformers {
    Text(String),
    List(Vec<FeedPerformer>),
}

impl Default for FeedPerformers {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FeedPerformer {
    Name(String),
    Detail(FeedPerformerDetail),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedPerformerDetail {
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub name_romaji: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social_links: Vec<FeedSocialLink>,
    #[serde(default)]
    pub songs: Vec<FeedSong>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSocialLink {
    pub platform: String,
    #[serde(default)]
    pub platform_id: Option<String>,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedSong {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub youtube_video_id: String,
    #[serde(default)]
    pub youtube_url: String,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre: String,
}

/// 將來源 JSON 拆成記錄；單一物件視為只有一筆的陣列，非物件元素略過
pub fn split_feed(body: Value) -> Vec<Record> {
    let items = match body {
        Value::Array(items) => items,
        Value::Object(_) => vec![body],
        other => {
            tracing::warn!("⚠️ Feed body is neither an array nor an object: {}", other);
            Vec::new()
        }
    };

    items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(obj) => Some(Record {
                data: obj.into_iter().collect(),
            }),
            other => {
                tracing::warn!("⚠️ Skipping non-object feed item: {}", other);
                None
            }
        })
        .collect()
}

impl TryFrom<&Record> for FeedRecord {
    type Error = serde_json::Error;

    fn try_from(record: &Record) -> Result<Self, Self::Error> {
        let object: serde_json::Map<String, Value> = record
            .data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(Value::Object(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_feed_wraps_single_object() {
        let records = split_feed(json!({"date": "2025-11-03", "venue": {"name": "Shelter"}}));
        assert_eq!(records.len(), 1);
        assert!(records[0].data.contains_key("venue"));

        let records = split_feed(json!([{"a": 1}, 2, {"b": 3}]));
        assert_eq!(records.len(), 2);

        assert!(split_feed(json!("text")).is_empty());
    }

    #[test]
    fn test_mixed_performer_list_decodes() {
        let records = split_feed(json!([{
            "venue": {"name": "Shelter", "website": "https://shelter.example.jp", "capacity": 250},
            "date": "2025-11-03",
            "performers": [
                "Alpha, Beta",
                {"name": "Gamma", "social_links": [{"platform": "twitter", "url": "https://x.com/gamma"}],
                 "songs": [{"title": "Song", "youtube_video_id": "vid1", "view_count": 1200}]}
            ]
        }]));
        let record = FeedRecord::try_from(&records[0]).unwrap();

        assert_eq!(record.venue.capacity, Some(250));
        match record.performers {
            FeedPerformers::List(items) => {
                assert_eq!(items.len(), 2);
                assert!(matches!(&items[0], FeedPerformer::Name(name) if name == "Alpha, Beta"));
                match &items[1] {
                    FeedPerformer::Detail(detail) => {
                        assert_eq!(detail.songs[0].view_count, Some(1200));
                        assert_eq!(detail.social_links[0].platform_id, None);
                    }
                    other => panic!("unexpected performer: {:?}", other),
                }
            }
            other => panic!("unexpected performers: {:?}", other),
        }
    }

    #[test]
    fn test_performer_text_and_missing_venue() {
        let records = split_feed(json!([
            {"venue": {"name": "Shelter"}, "date": "2025-11-03", "performers": "Alpha/Beta"},
            {"date": "2025-11-03"}
        ]));
        let first = FeedRecord::try_from(&records[0]).unwrap();
        assert!(matches!(first.performers, FeedPerformers::Text(ref t) if t == "Alpha/Beta"));
        assert!(FeedRecord::try_from(&records[1]).is_err());
    }
}
