use rand::Rng;
use rand::seq::SliceRandom;

/// Number of recommendation cards shown on the landing page.
pub const DEFAULT_CARD_COUNT: usize = 4;

/// Canned search phrases offered as one-click queries.
pub const BUILTIN_RECOMMENDATIONS: &[&str] = &[
    "서초동 분위기 좋은 카페",
    "남자 4명이서 가는 가성비 있는 강남역 고깃집",
    "부모님과 갈 만한 송파동 식당",
    "썸남과 갈만한 분위기 좋은 잠실 맛집",
    "홍대 데이트 코스",
    "이태원 브런치 맛집",
    "강남 직장인 회식 장소",
    "한강공원 근처 피크닉 스팟",
    "을지로 힙한 카페",
    "성수동 인스타 감성 카페",
    "광화문 역사 투어 코스",
    "청담동 럭셔리 다이닝",
    "종로 전통 한식당",
    "명동 쇼핑 후 식사할 곳",
    "여의도 한강뷰 레스토랑",
];

/// Fixed, ordered pool of recommendation phrases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationPool {
    phrases: Vec<String>,
}

impl Default for RecommendationPool {
    fn default() -> Self {
        Self::new(BUILTIN_RECOMMENDATIONS.iter().copied())
    }
}

impl RecommendationPool {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Draw `count` distinct phrases in uniformly random order.
    ///
    /// Uses a partial Fisher–Yates shuffle over pool indices, so the pool
    /// itself is never reordered. `count` larger than the pool is clamped,
    /// yielding a full permutation.
    pub fn sample<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&str> {
        let take = count.min(self.phrases.len());
        let mut indices: Vec<usize> = (0..self.phrases.len()).collect();
        let (picked, _) = indices.partial_shuffle(rng, take);
        picked
            .iter()
            .map(|&i| self.phrases[i].as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn letters() -> RecommendationPool {
        RecommendationPool::new(["A", "B", "C", "D", "E"])
    }

    #[test]
    fn sample_returns_distinct_pool_members() {
        let pool = letters();
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            let picked = pool.sample(3, &mut rng);
            assert_eq!(picked.len(), 3);
            let unique: HashSet<&str> = picked.iter().copied().collect();
            assert_eq!(unique.len(), 3, "duplicate in {picked:?}");
            assert!(picked.iter().all(|p| pool.phrases().iter().any(|q| q == p)));
        }
    }

    #[test]
    fn full_pool_sample_is_permutation() {
        let pool = letters();
        let mut rng = SmallRng::seed_from_u64(42);
        let mut picked = pool.sample(pool.len(), &mut rng);
        picked.sort_unstable();
        assert_eq!(picked, vec!["A", "B", "C", "D", "E"]);
    }

    #[test]
    fn oversized_sample_is_clamped() {
        let pool = letters();
        let mut rng = SmallRng::seed_from_u64(1);
        assert_eq!(pool.sample(12, &mut rng).len(), 5);
        assert!(RecommendationPool::new(Vec::<String>::new())
            .sample(3, &mut rng)
            .is_empty());
    }

    #[test]
    fn sampling_leaves_pool_order_untouched() {
        let pool = RecommendationPool::default();
        let before = pool.phrases().to_vec();
        let mut rng = SmallRng::seed_from_u64(3);
        let _ = pool.sample(DEFAULT_CARD_COUNT, &mut rng);
        assert_eq!(pool.phrases(), before.as_slice());
        assert_eq!(pool.len(), 15);
    }

    #[test]
    fn every_position_sees_every_phrase() {
        // A biased comparator shuffle tends to pin elements near their origin;
        // Fisher–Yates should put each letter first at least occasionally.
        let pool = letters();
        let mut rng = SmallRng::seed_from_u64(99);
        let mut firsts = HashSet::new();
        for _ in 0..500 {
            firsts.insert(pool.sample(2, &mut rng)[0]);
        }
        assert_eq!(firsts.len(), 5);
    }
}
