//! Board organization: partitioning features into buckets.
//!
//! Two views share the same feature snapshot:
//! - **Quadrant view** (`organize_quadrants`): the four impact/effort
//!   quadrants plus a separate `blocked` bucket, each row carrying its raw score.
//! - **Kanban view** (`organize_kanban`): one column per workflow status.
//!
//! Both views apply an optional [`StatusFilter`] before bucketing. All sorts
//! are stable, so ties keep input order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{Feature, FeatureStatus, Quadrant};

/// Status allowlist. An empty filter lets everything through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusFilter {
    selected: BTreeSet<FeatureStatus>,
}

impl StatusFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter selecting exactly these statuses.
    pub fn from_statuses(statuses: impl IntoIterator<Item = FeatureStatus>) -> Self {
        Self {
            selected: statuses.into_iter().collect(),
        }
    }

    /// Add the status if absent, remove it if present.
    pub fn toggle(&mut self, status: FeatureStatus) {
        if !self.selected.remove(&status) {
            self.selected.insert(status);
        }
    }

    pub fn is_selected(&self, status: FeatureStatus) -> bool {
        self.selected.contains(&status)
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Whether a feature passes the filter.
    pub fn matches(&self, feature: &Feature) -> bool {
        self.selected.is_empty() || self.selected.contains(&feature.status)
    }

    pub fn statuses(&self) -> impl Iterator<Item = FeatureStatus> + '_ {
        self.selected.iter().copied()
    }
}

/// A feature paired with its raw RICE score for one render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredFeature {
    #[serde(flatten)]
    pub feature: Feature,
    pub score: f64,
}

impl ScoredFeature {
    pub fn new(feature: &Feature) -> Self {
        Self {
            score: feature.raw_score(),
            feature: feature.clone(),
        }
    }

    pub fn id(&self) -> &str {
        &self.feature.id
    }
}

/// Bucket key of the matrix: a quadrant, or the blocked list.
///
/// Serialized as its snake_case name ("quick_wins", "blocked", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BucketKey {
    Quadrant(Quadrant),
    Blocked,
}

impl BucketKey {
    /// Every bucket the matrix can scroll.
    pub const ALL: [BucketKey; 5] = [
        BucketKey::Quadrant(Quadrant::QuickWins),
        BucketKey::Quadrant(Quadrant::HighValue),
        BucketKey::Quadrant(Quadrant::Foundation),
        BucketKey::Quadrant(Quadrant::Strategic),
        BucketKey::Blocked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BucketKey::Quadrant(q) => q.as_str(),
            BucketKey::Blocked => "blocked",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        if s.trim().eq_ignore_ascii_case("blocked") {
            return Some(BucketKey::Blocked);
        }
        Quadrant::parse(s).map(BucketKey::Quadrant)
    }
}

impl Serialize for BucketKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BucketKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        BucketKey::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown bucket: {}", s)))
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Features partitioned for the matrix view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuadrantBoard {
    pub high_value: Vec<ScoredFeature>,
    pub quick_wins: Vec<ScoredFeature>,
    pub strategic: Vec<ScoredFeature>,
    pub foundation: Vec<ScoredFeature>,
    /// Blocked features, in input order
    pub blocked: Vec<ScoredFeature>,
}

impl QuadrantBoard {
    pub fn quadrant(&self, quadrant: Quadrant) -> &[ScoredFeature] {
        match quadrant {
            Quadrant::HighValue => &self.high_value,
            Quadrant::QuickWins => &self.quick_wins,
            Quadrant::Strategic => &self.strategic,
            Quadrant::Foundation => &self.foundation,
        }
    }

    fn quadrant_mut(&mut self, quadrant: Quadrant) -> &mut Vec<ScoredFeature> {
        match quadrant {
            Quadrant::HighValue => &mut self.high_value,
            Quadrant::QuickWins => &mut self.quick_wins,
            Quadrant::Strategic => &mut self.strategic,
            Quadrant::Foundation => &mut self.foundation,
        }
    }

    pub fn bucket(&self, key: BucketKey) -> &[ScoredFeature] {
        match key {
            BucketKey::Quadrant(q) => self.quadrant(q),
            BucketKey::Blocked => &self.blocked,
        }
    }

    /// Total number of features across all buckets.
    pub fn len(&self) -> usize {
        BucketKey::ALL.iter().map(|k| self.bucket(*k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Partition features into quadrants plus the blocked bucket.
///
/// Filtering happens first. Blocked features are pulled out regardless of
/// where they would classify. Quadrant buckets are sorted by raw score,
/// highest first.
pub fn organize_quadrants(features: &[Feature], filter: &StatusFilter) -> QuadrantBoard {
    let mut board = QuadrantBoard::default();

    for feature in features.iter().filter(|f| filter.matches(f)) {
        let scored = ScoredFeature::new(feature);
        if feature.is_blocked {
            board.blocked.push(scored);
        } else {
            board.quadrant_mut(feature.quadrant()).push(scored);
        }
    }

    for quadrant in Quadrant::ALL {
        board
            .quadrant_mut(quadrant)
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    }

    board
}

/// A kanban card: a feature with its normalized RICE score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KanbanCard {
    #[serde(flatten)]
    pub feature: Feature,
    /// Normalized RICE score rounded to one decimal
    pub rice_score: f64,
}

/// Features partitioned by workflow status.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KanbanBoard {
    pub columns: BTreeMap<FeatureStatus, Vec<KanbanCard>>,
}

impl KanbanBoard {
    pub fn column(&self, status: FeatureStatus) -> &[KanbanCard] {
        self.columns.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Kanban ordering: unblocked first, then priority weight descending, then
/// rounded RICE score descending.
pub fn kanban_order(a: &KanbanCard, b: &KanbanCard) -> Ordering {
    a.feature
        .is_blocked
        .cmp(&b.feature.is_blocked)
        .then_with(|| b.feature.priority_weight().cmp(&a.feature.priority_weight()))
        .then_with(|| {
            b.rice_score
                .partial_cmp(&a.rice_score)
                .unwrap_or(Ordering::Equal)
        })
}

/// Partition features into the four status columns.
pub fn organize_kanban(features: &[Feature], filter: &StatusFilter) -> KanbanBoard {
    let mut columns: BTreeMap<FeatureStatus, Vec<KanbanCard>> = FeatureStatus::ALL
        .iter()
        .map(|status| (*status, Vec::new()))
        .collect();

    for feature in features.iter().filter(|f| filter.matches(f)) {
        let card = KanbanCard {
            rice_score: feature.score_inputs().rounded(),
            feature: feature.clone(),
        };
        columns.entry(feature.status).or_default().push(card);
    }

    for cards in columns.values_mut() {
        cards.sort_by(kanban_order);
    }

    KanbanBoard { columns }
}

/// Summary counts over a feature collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub blocked: usize,
    pub by_status: BTreeMap<FeatureStatus, usize>,
}

/// Count features in total, blocked, and per status.
pub fn collection_stats(features: &[Feature]) -> BoardStats {
    let mut by_status: BTreeMap<FeatureStatus, usize> =
        FeatureStatus::ALL.iter().map(|s| (*s, 0)).collect();
    for feature in features {
        *by_status.entry(feature.status).or_default() += 1;
    }
    BoardStats {
        total: features.len(),
        blocked: features.iter().filter(|f| f.is_blocked).count(),
        by_status,
    }
}
