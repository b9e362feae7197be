use serde::Serialize;

/// 星等顯示的格數
pub const STAR_SEGMENTS: u8 = 10;

/// 算術平均；空輸入回傳 0
pub fn average_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    ratings.iter().sum::<f64>() / ratings.len() as f64
}

/// 四捨五入到 10 格星等（x.5 進位）
pub fn rounded_stars(average: f64) -> u8 {
    if !average.is_finite() || average <= 0.0 {
        return 0;
    }
    let rounded = (average + 0.5).floor();
    rounded.min(STAR_SEGMENTS as f64) as u8
}

/// 每一格是否點亮
pub fn star_segments(filled: u8) -> Vec<bool> {
    (1..=STAR_SEGMENTS).map(|star| star <= filled).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub rounded: u8,
    pub count: usize,
    pub stars: Vec<bool>,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[f64]) -> Self {
        let average = average_rating(ratings);
        let rounded = rounded_stars(average);
        Self {
            average,
            rounded,
            count: ratings.len(),
            stars: star_segments(rounded),
        }
    }
}
