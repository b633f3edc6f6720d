//! Built-in catalog shown on first run, before anything has been saved.

use chrono::{DateTime, Utc};

use crate::category::Category;
use crate::id::{CategoryId, StoryId};
use crate::story::Story;

// (id, name, description, icon, color)
const CATEGORIES: &[(&str, &str, &str, &str, &str)] = &[
    ("bedtime", "睡前故事", "温柔的故事，陪伴宝贝进入梦乡", "fa-moon", "bg-indigo-400"),
    ("fairy-tale", "童话故事", "经典童话，点亮孩子的想象力", "fa-hat-wizard", "bg-pink-400"),
    ("animal", "动物故事", "森林里的小伙伴们", "fa-paw", "bg-green-400"),
    ("science", "科普故事", "在故事里认识世界", "fa-flask", "bg-yellow-400"),
];

// (id, title, category, minutes, age range, views, created at unix seconds)
const STORIES: &[(&str, &str, &str, u32, &str, u64, i64)] = &[
    ("1", "月亮船", "bedtime", 6, "3-6岁", 1280, 1_704_067_200),
    ("2", "小星星的晚安曲", "bedtime", 5, "2-5岁", 964, 1_704_153_600),
    ("3", "睡不着的小熊", "bedtime", 8, "3-6岁", 1532, 1_704_240_000),
    ("4", "丑小鸭", "fairy-tale", 12, "4-8岁", 2210, 1_704_326_400),
    ("5", "小红帽", "fairy-tale", 10, "4-8岁", 1876, 1_704_412_800),
    ("6", "狐狸和乌鸦", "animal", 7, "3-7岁", 745, 1_704_499_200),
    ("7", "森林音乐会", "animal", 9, "3-6岁", 633, 1_704_585_600),
    ("8", "水滴去旅行", "science", 11, "5-9岁", 412, 1_704_672_000),
];

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// Default categories.
#[must_use]
pub fn default_categories() -> Vec<Category> {
    CATEGORIES
        .iter()
        .map(|&(id, name, description, icon, color)| Category {
            id: CategoryId::new(id),
            name: name.to_string(),
            description: description.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
        })
        .collect()
}

/// Default stories. Every story references a default category.
#[must_use]
pub fn default_stories() -> Vec<Story> {
    STORIES
        .iter()
        .map(|&(id, title, category, duration, age_range, views, created)| Story {
            id: StoryId::new(id),
            title: title.to_string(),
            category_id: CategoryId::new(category),
            duration,
            age_range: age_range.to_string(),
            views,
            created_at: timestamp(created),
        })
        .collect()
}
