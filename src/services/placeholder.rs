// 上游不可用时浏览页使用的占位数据

use crate::models::{
    ContentRating, Demographic, MangaStatistics, MangaSummary, MangaTag, PublicationStatus,
    RatingStatistics,
};

const DEFAULT_TAG_NAMES: [&str; 10] = [
    "Action",
    "Romance",
    "Comedy",
    "Drama",
    "Fantasy",
    "Adventure",
    "Slice of Life",
    "Supernatural",
    "School Life",
    "Isekai",
];

/// 固定的默认标签列表
pub fn default_tags() -> Vec<MangaTag> {
    DEFAULT_TAG_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| MangaTag::new(format!("tag-{}", i + 1), *name))
        .collect()
}

/// 生成 `count` 条占位漫画
pub fn placeholder_manga(count: usize) -> Vec<MangaSummary> {
    const STATUSES: [PublicationStatus; 3] = [
        PublicationStatus::Ongoing,
        PublicationStatus::Completed,
        PublicationStatus::Hiatus,
    ];

    let tags = default_tags();

    (0..count)
        .map(|i| MangaSummary {
            id: format!("mock-{}", i),
            display_title: format!("Manga Title {}", i + 1),
            display_description: format!(
                "This is a placeholder description for manga {}.",
                i + 1
            ),
            status: Some(STATUSES[i % STATUSES.len()]),
            demographic: Some(Demographic::ALL[i % Demographic::ALL.len()]),
            content_rating: ContentRating::Safe,
            tags: tags.iter().skip(i % tags.len()).take(3).cloned().collect(),
            cover_image_ref: Some(format!("mock-cover-{}.jpg", i)),
            year: None,
            authors: Vec::new(),
            artists: Vec::new(),
            last_chapter: None,
        })
        .collect()
}

/// 统计接口失败时的占位统计
pub fn placeholder_statistics() -> MangaStatistics {
    MangaStatistics {
        rating: RatingStatistics {
            average: Some(8.5),
            bayesian: Some(8.2),
        },
        follows: 12_500,
    }
}
