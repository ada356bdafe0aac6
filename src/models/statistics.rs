use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 评分统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingStatistics {
    pub average: Option<f64>,
    pub bayesian: Option<f64>,
}

/// 单部漫画的统计信息
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MangaStatistics {
    #[serde(default)]
    pub rating: RatingStatistics,
    #[serde(default)]
    pub follows: u64,
}

/// 上游 `/statistics/manga/{id}` 响应，按漫画 id 索引
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatisticsResponse {
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub statistics: HashMap<String, MangaStatistics>,
}

impl StatisticsResponse {
    pub fn for_manga(manga_id: &str, stats: MangaStatistics) -> Self {
        Self {
            result: "ok".to_string(),
            statistics: HashMap::from([(manga_id.to_string(), stats)]),
        }
    }
}
