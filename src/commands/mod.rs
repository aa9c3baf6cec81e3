//! Command implementations for the rmap CLI.
//!
//! Each command opens the feature store named by the resolved config, runs
//! against it and returns a result that implements [`Output`]. Mutations go
//! through the same [`FeatureCommand`] path the matrix and kanban views use:
//! - `feature_*` - Feature CRUD, blocking and status moves
//! - `matrix` - Quadrant/blocked view with scroll and click resolution
//! - `kanban`, `stats` - Status columns and counts
//! - `config_*` - Inspect and edit config.kdl

use crate::board::{
    BoardStats, BucketKey, KanbanBoard, ScoredFeature, StatusFilter, collection_stats,
    organize_kanban,
};
use crate::cli::{FeatureFields, MatrixArgs};
use crate::config::{
    self, CONFIG_KEYS, ConfigOverrides, ResolvedConfig, ValueSource, resolve_config,
};
use crate::gui::shared::{
    ApproximateMeasure, MatrixView, Position, RenderCommand, ViewMode, Viewport, apply_edit,
    delete_feature, drag_start, drop_on_status, toggle_block,
};
use crate::models::scoring::{format_score, round1, thresholds};
use crate::models::{
    Feature, FeatureCommand, FeatureDraft, FeatureStatus, Priority, Quadrant, format_date,
    parse_date,
};
use crate::storage::{FeatureStore, validate_feature_id};
use crate::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

fn json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e))
}

/// Data directory and resolved config shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: PathBuf,
    pub config: ResolvedConfig,
}

impl Context {
    /// Resolve config.kdl in `data_dir` against CLI overrides.
    pub fn new(data_dir: PathBuf, overrides: &ConfigOverrides) -> Result<Self> {
        let config = resolve_config(&data_dir, overrides)?;
        Ok(Self { data_dir, config })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Whether results should be printed for humans.
    pub fn human(&self) -> bool {
        self.config.output_format() == config::OutputFormat::Human
    }

    fn open_store(&self) -> Result<FeatureStore> {
        FeatureStore::open_in(&self.data_dir, self.config.storage_key())
    }
}

// === Argument parsing ===

fn parse_status(value: &str) -> Result<FeatureStatus> {
    FeatureStatus::parse(value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "unknown status {:?} (expected BACKLOG, TODO, IN_PROGRESS or DONE)",
            value
        ))
    })
}

fn parse_filter(values: &[String]) -> Result<StatusFilter> {
    let statuses = values
        .iter()
        .map(|v| parse_status(v))
        .collect::<Result<Vec<_>>>()?;
    Ok(StatusFilter::from_statuses(statuses))
}

fn parse_priority(value: &str) -> Result<Priority> {
    Priority::parse(value).ok_or_else(|| {
        Error::InvalidInput(format!(
            "unknown priority {:?} (expected low, medium, high or urgent)",
            value
        ))
    })
}

/// An empty deadline clears it.
fn parse_deadline(value: &str) -> Result<Option<NaiveDate>> {
    if value.trim().is_empty() {
        return Ok(None);
    }
    parse_date(value).map(Some).ok_or_else(|| {
        Error::InvalidInput(format!("invalid deadline {:?} (expected YYYY-MM-DD)", value))
    })
}

/// Parse `X,Y` surface coordinates.
fn parse_point(value: &str) -> Result<Position> {
    let invalid = || Error::InvalidInput(format!("invalid point {:?} (expected X,Y)", value));
    let (x, y) = value.split_once(',').ok_or_else(invalid)?;
    let x: f64 = x.trim().parse().map_err(|_| invalid())?;
    let y: f64 = y.trim().parse().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(Position::new(x, y))
}

/// Parse a `BUCKET=PX` scroll request.
fn parse_scroll(value: &str) -> Result<(BucketKey, f64)> {
    let invalid = || {
        Error::InvalidInput(format!(
            "invalid scroll {:?} (expected BUCKET=PX, e.g. quick_wins=120)",
            value
        ))
    };
    let (bucket, offset) = value.split_once('=').ok_or_else(invalid)?;
    let bucket = BucketKey::parse(bucket).ok_or_else(invalid)?;
    let offset: f64 = offset.trim().parse().map_err(|_| invalid())?;
    Ok((bucket, offset))
}

/// Field values checked before anything is stored.
struct ParsedFields {
    status: Option<FeatureStatus>,
    priority: Option<Priority>,
    deadline: Option<Option<NaiveDate>>,
}

impl ParsedFields {
    fn parse(fields: &FeatureFields) -> Result<Self> {
        Ok(Self {
            status: fields.status.as_deref().map(parse_status).transpose()?,
            priority: fields.priority.as_deref().map(parse_priority).transpose()?,
            deadline: fields.deadline.as_deref().map(parse_deadline).transpose()?,
        })
    }
}

fn build_draft(name: &str, fields: &FeatureFields) -> Result<FeatureDraft> {
    let parsed = ParsedFields::parse(fields)?;
    let mut draft = FeatureDraft::new(name.trim());
    draft.reach = fields.reach.unwrap_or(draft.reach);
    draft.impact = fields.impact.unwrap_or(draft.impact);
    draft.confidence = fields.confidence.unwrap_or(draft.confidence);
    draft.effort = fields.effort.unwrap_or(draft.effort);
    if draft.effort.is_nan() || draft.effort < thresholds::MIN_EFFORT {
        draft.effort = thresholds::MIN_EFFORT;
    }
    draft.business_impact = fields.business_impact.unwrap_or(draft.business_impact);
    draft.urgency = fields.urgency.unwrap_or(draft.urgency);
    draft.status = parsed.status.unwrap_or(draft.status);
    if parsed.priority.is_some() {
        draft.priority = parsed.priority;
    }
    if let Some(deadline) = parsed.deadline {
        draft.deadline = deadline;
    }
    Ok(draft)
}

fn edit_feature(feature: &mut Feature, name: Option<&str>, fields: &FeatureFields) -> Result<()> {
    let parsed = ParsedFields::parse(fields)?;
    if let Some(name) = name {
        feature.name = name.trim().to_string();
    }
    feature.reach = fields.reach.unwrap_or(feature.reach);
    feature.impact = fields.impact.unwrap_or(feature.impact);
    feature.confidence = fields.confidence.unwrap_or(feature.confidence);
    feature.effort = fields.effort.unwrap_or(feature.effort);
    feature.business_impact = fields.business_impact.unwrap_or(feature.business_impact);
    feature.urgency = fields.urgency.unwrap_or(feature.urgency);
    feature.status = parsed.status.unwrap_or(feature.status);
    if parsed.priority.is_some() {
        feature.priority = parsed.priority;
    }
    if let Some(deadline) = parsed.deadline {
        feature.deadline = deadline;
    }
    Ok(())
}

/// Apply a command to the store, surfacing any rejection as an error.
/// Returns the feature as stored (or as removed).
fn commit(store: &mut FeatureStore, command: FeatureCommand) -> Result<Feature> {
    match command {
        FeatureCommand::Update(feature) => {
            store.update(feature.clone())?;
            Ok(feature)
        }
        FeatureCommand::Delete(id) => store.delete(&id),
    }
}

fn lookup(store: &FeatureStore, id: &str) -> Result<Feature> {
    validate_feature_id(id)?;
    store.get(id).cloned()
}

// === Feature results ===

/// A feature with its derived scores.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureView {
    #[serde(flatten)]
    pub feature: Feature,
    pub quadrant: Quadrant,
    /// Raw RICE score used by the matrix
    pub raw_score: f64,
    /// Normalized RICE score (0-100) shown on the kanban board
    pub rice_score: f64,
    /// Simple value/effort score (0-100)
    pub simple_score: f64,
    #[serde(skip)]
    deadline_label: Option<String>,
}

impl FeatureView {
    pub fn new(feature: Feature, date_format: &str) -> Self {
        Self {
            quadrant: feature.quadrant(),
            raw_score: feature.raw_score(),
            rice_score: feature.score_inputs().rounded(),
            simple_score: round1(feature.simple_score()),
            deadline_label: feature.deadline.map(|d| format_date(d, date_format)),
            feature,
        }
    }

    fn summary_line(&self) -> String {
        let f = &self.feature;
        let mut line = format!(
            "{}  {:<11}  {:<10}  {:>7}  {}",
            f.id,
            f.status.as_str(),
            self.quadrant.as_str(),
            format_score(self.raw_score),
            f.name
        );
        if f.is_blocked {
            line.push_str(&format!("  [BLOCKED: {}]", f.block_reason));
        }
        line
    }
}

impl Output for FeatureView {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let f = &self.feature;
        let mut lines = vec![
            format!("{} {} [{}]", f.id, f.name, f.status.label()),
            format!(
                "  Quadrant: {} ({})",
                self.quadrant.label(),
                self.quadrant.description()
            ),
            format!(
                "  RICE: reach {}, impact {}, confidence {}%, effort {}",
                f.reach, f.impact, f.confidence, f.effort
            ),
            format!(
                "  Score: {} (normalized {:.1}, simple {:.1})",
                format_score(self.raw_score),
                self.rice_score,
                self.simple_score
            ),
        ];
        if let Some(priority) = f.priority {
            lines.push(format!("  Priority: {}", priority));
        }
        if let Some(ref deadline) = self.deadline_label {
            lines.push(format!("  Deadline: {}", deadline));
        }
        if f.is_blocked {
            lines.push(format!("  Blocked: {}", f.block_reason));
        }
        lines.join("\n")
    }
}

/// Features matching a list request.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureList {
    pub count: usize,
    pub features: Vec<FeatureView>,
}

impl Output for FeatureList {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        if self.features.is_empty() {
            return "No features found.".to_string();
        }
        let mut lines = vec![format!("{} feature(s):", self.count)];
        lines.extend(self.features.iter().map(FeatureView::summary_line));
        lines.join("\n")
    }
}

/// What a mutating feature command did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureAction {
    Added,
    Updated,
    Blocked,
    Unblocked,
    Moved,
    Deleted,
}

impl FeatureAction {
    fn verb(&self) -> &'static str {
        match self {
            Self::Added => "Added",
            Self::Updated => "Updated",
            Self::Blocked => "Blocked",
            Self::Unblocked => "Unblocked",
            Self::Moved => "Moved",
            Self::Deleted => "Deleted",
        }
    }
}

/// Result of a mutating feature command.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureChange {
    pub action: FeatureAction,
    /// False when the command was a no-op (e.g. moving to the current status)
    pub changed: bool,
    pub feature: FeatureView,
}

impl Output for FeatureChange {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let f = &self.feature.feature;
        if !self.changed {
            return match self.action {
                FeatureAction::Moved => format!("{} is already {}", f.id, f.status.as_str()),
                FeatureAction::Unblocked => format!("{} is not blocked", f.id),
                _ => format!("No change to {}", f.id),
            };
        }
        let detail = match self.action {
            FeatureAction::Moved => format!(" -> {}", f.status.as_str()),
            FeatureAction::Blocked => format!(" ({})", f.block_reason),
            _ => String::new(),
        };
        format!("{} {}: {}{}", self.action.verb(), f.id, f.name, detail)
    }
}

// === Feature commands ===

/// Add a feature.
pub fn feature_add(ctx: &Context, name: &str, fields: &FeatureFields) -> Result<FeatureChange> {
    let draft = build_draft(name, fields)?;
    let mut store = ctx.open_store()?;
    let feature = store.add(draft)?;
    Ok(FeatureChange {
        action: FeatureAction::Added,
        changed: true,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

/// List features in stored order, optionally filtered by status.
pub fn feature_list(ctx: &Context, statuses: &[String]) -> Result<FeatureList> {
    let filter = parse_filter(statuses)?;
    let store = ctx.open_store()?;
    let features: Vec<FeatureView> = store
        .features()
        .iter()
        .filter(|f| filter.matches(f))
        .map(|f| FeatureView::new(f.clone(), ctx.config.date_format()))
        .collect();
    Ok(FeatureList {
        count: features.len(),
        features,
    })
}

/// Show one feature.
pub fn feature_show(ctx: &Context, id: &str) -> Result<FeatureView> {
    let store = ctx.open_store()?;
    let feature = lookup(&store, id)?;
    Ok(FeatureView::new(feature, ctx.config.date_format()))
}

/// Replace a feature with an edited copy. Flags not given keep their value.
pub fn feature_update(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    fields: &FeatureFields,
) -> Result<FeatureChange> {
    let mut store = ctx.open_store()?;
    let original = lookup(&store, id)?;
    let mut edited = original.clone();
    edit_feature(&mut edited, name, fields)?;
    let changed = edited != original;
    let feature = commit(&mut store, apply_edit(&original, edited))?;
    Ok(FeatureChange {
        action: FeatureAction::Updated,
        changed,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

/// Block a feature with a reason.
pub fn feature_block(ctx: &Context, id: &str, reason: &str) -> Result<FeatureChange> {
    let mut store = ctx.open_store()?;
    let feature = lookup(&store, id)?;
    if feature.is_blocked {
        return Err(Error::InvalidInput(format!(
            "feature {} is already blocked: {}",
            id, feature.block_reason
        )));
    }
    let mut prompt = |_: &Feature| -> Option<String> { Some(reason.to_string()) };
    let command = toggle_block(&feature, &mut prompt)
        .ok_or_else(|| Error::InvalidInput("block reason must not be empty".to_string()))?;
    let feature = commit(&mut store, command)?;
    Ok(FeatureChange {
        action: FeatureAction::Blocked,
        changed: true,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

/// Unblock a feature. Unblocking an unblocked feature changes nothing.
pub fn feature_unblock(ctx: &Context, id: &str) -> Result<FeatureChange> {
    let mut store = ctx.open_store()?;
    let feature = lookup(&store, id)?;
    if !feature.is_blocked {
        return Ok(FeatureChange {
            action: FeatureAction::Unblocked,
            changed: false,
            feature: FeatureView::new(feature, ctx.config.date_format()),
        });
    }
    let mut no_prompt = |_: &Feature| -> Option<String> { None };
    let command = toggle_block(&feature, &mut no_prompt)
        .ok_or_else(|| Error::Other(format!("could not unblock {}", id)))?;
    let feature = commit(&mut store, command)?;
    Ok(FeatureChange {
        action: FeatureAction::Unblocked,
        changed: true,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

/// Move a feature to a status column, the way a kanban drop does.
pub fn feature_move(ctx: &Context, id: &str, status: &str) -> Result<FeatureChange> {
    let target = parse_status(status)?;
    let mut store = ctx.open_store()?;
    let feature = lookup(&store, id)?;
    let data = drag_start(&feature);
    let (feature, changed) = match drop_on_status(&data, target) {
        Some(command) => (commit(&mut store, command)?, true),
        None => (feature, false),
    };
    Ok(FeatureChange {
        action: FeatureAction::Moved,
        changed,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

/// Delete a feature.
pub fn feature_delete(ctx: &Context, id: &str) -> Result<FeatureChange> {
    validate_feature_id(id)?;
    let mut store = ctx.open_store()?;
    let feature = commit(&mut store, delete_feature(id))?;
    Ok(FeatureChange {
        action: FeatureAction::Deleted,
        changed: true,
        feature: FeatureView::new(feature, ctx.config.date_format()),
    })
}

// === Matrix ===

/// One row of a matrix bucket.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub id: String,
    pub name: String,
    pub status: FeatureStatus,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub block_reason: String,
}

impl MatrixRow {
    fn new(item: &ScoredFeature, date_format: &str) -> Self {
        let f = &item.feature;
        Self {
            id: f.id.clone(),
            name: f.name.clone(),
            status: f.status,
            score: item.score,
            deadline: f.deadline.map(|d| format_date(d, date_format)),
            block_reason: f.block_reason.clone(),
        }
    }
}

/// One list of the matrix with its scroll state.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixBucket {
    pub key: BucketKey,
    pub label: &'static str,
    pub count: usize,
    /// Rows drawn in the window at the current scroll offset
    pub visible: usize,
    pub scroll: f64,
    pub max_scroll: f64,
    pub features: Vec<MatrixRow>,
}

/// Outcome of a `--click`.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixClick {
    pub x: f64,
    pub y: f64,
    /// The clicked row, or null when the click hit nothing
    pub feature: Option<MatrixRow>,
}

/// A rendered matrix.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixResult {
    pub mode: ViewMode,
    pub viewport: Viewport,
    pub buckets: Vec<MatrixBucket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click: Option<MatrixClick>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<RenderCommand>>,
}

fn bucket_label(key: BucketKey) -> &'static str {
    match key {
        BucketKey::Quadrant(q) => q.label(),
        BucketKey::Blocked => "BLOCKED",
    }
}

fn bucket_description(key: BucketKey) -> &'static str {
    match key {
        BucketKey::Quadrant(q) => q.description(),
        BucketKey::Blocked => "Waiting on something outside the team",
    }
}

impl Output for MatrixResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Matrix {}x{} @{}x",
            self.viewport.width, self.viewport.height, self.viewport.device_pixel_ratio
        )];
        for bucket in &self.buckets {
            let mut header = format!(
                "{} - {} ({})",
                bucket.label,
                bucket_description(bucket.key),
                bucket.count
            );
            if bucket.max_scroll > 0.0 {
                header.push_str(&format!(
                    "  scroll {}/{}",
                    bucket.scroll, bucket.max_scroll
                ));
            }
            lines.push(header);
            if bucket.features.is_empty() {
                let empty = match bucket.key {
                    BucketKey::Blocked => "  No blocked features",
                    BucketKey::Quadrant(_) => "  (none)",
                };
                lines.push(empty.to_string());
            }
            for row in &bucket.features {
                let mut line = format!("  {:>7}  {}  {}", format_score(row.score), row.id, row.name);
                if let Some(ref deadline) = row.deadline {
                    line.push_str(&format!("  (due {})", deadline));
                }
                if !row.block_reason.is_empty() {
                    line.push_str(&format!("  - {}", row.block_reason));
                }
                lines.push(line);
            }
        }
        if let Some(ref click) = self.click {
            lines.push(match click.feature {
                Some(ref row) => format!("Clicked ({}, {}): {} {}", click.x, click.y, row.id, row.name),
                None => format!("Clicked ({}, {}): nothing", click.x, click.y),
            });
        }
        if let Some(ref commands) = self.commands {
            lines.push(format!("{} drawing commands", commands.len()));
        }
        lines.join("\n")
    }
}

/// Render the matrix, apply scroll requests and resolve a click.
pub fn matrix(ctx: &Context, args: &MatrixArgs) -> Result<MatrixResult> {
    let filter = parse_filter(&args.status)?;
    let scrolls = args
        .scroll
        .iter()
        .map(|s| parse_scroll(s))
        .collect::<Result<Vec<_>>>()?;
    let click_at = args.click.as_deref().map(parse_point).transpose()?;

    let store = ctx.open_store()?;
    let date_format = ctx.config.date_format();
    let mut view = MatrixView::new(ctx.config.viewport())
        .with_date_format(date_format)
        .with_filter(filter);
    let mode = if args.blocked {
        ViewMode::BlockedOnly
    } else {
        ViewMode::Quadrants
    };
    view.set_mode(mode);

    let measure = ApproximateMeasure::default();
    view.render(store.features(), &measure);
    if !scrolls.is_empty() {
        for (bucket, offset) in scrolls {
            view.scroll_to(bucket, offset);
        }
        view.render(store.features(), &measure);
    }
    tracing::debug!(
        features = store.len(),
        commands = view.frame().commands.len(),
        hits = view.frame().hits.len(),
        "rendered matrix"
    );

    let keys: Vec<BucketKey> = match mode {
        ViewMode::Quadrants => Quadrant::ALL.iter().map(|q| BucketKey::Quadrant(*q)).collect(),
        ViewMode::BlockedOnly => vec![BucketKey::Blocked],
    };
    let frame = view.frame();
    let buckets = keys
        .into_iter()
        .map(|key| {
            let rows = view.board().bucket(key);
            MatrixBucket {
                key,
                label: bucket_label(key),
                count: rows.len(),
                visible: frame.hits.iter().filter(|h| h.bucket == key).count(),
                scroll: view.scroll().offset(key),
                max_scroll: frame.scroll_limits.get(&key).copied().unwrap_or(0.0),
                features: rows.iter().map(|r| MatrixRow::new(r, date_format)).collect(),
            }
        })
        .collect();

    let click = click_at.map(|point| MatrixClick {
        x: point.x,
        y: point.y,
        feature: view.click(point).map(|item| MatrixRow::new(&item, date_format)),
    });

    Ok(MatrixResult {
        mode,
        viewport: *view.viewport(),
        buckets,
        click,
        commands: args.commands.then(|| frame.commands.clone()),
    })
}

// === Kanban and stats ===

/// Kanban columns in board order.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct KanbanResult {
    pub board: KanbanBoard,
}

impl Output for KanbanResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = Vec::new();
        for status in FeatureStatus::ALL {
            let cards = self.board.column(status);
            lines.push(format!("{} ({})", status.label(), cards.len()));
            for card in cards {
                let f = &card.feature;
                let priority = f.priority.map(|p| p.as_str()).unwrap_or("-");
                let mut line = format!(
                    "  {}  [{}]  {:>5.1}  {}",
                    f.id, priority, card.rice_score, f.name
                );
                if f.is_blocked {
                    line.push_str(&format!("  [BLOCKED: {}]", f.block_reason));
                }
                lines.push(line);
            }
        }
        lines.join("\n")
    }
}

/// Organize features into status columns.
pub fn kanban(ctx: &Context, statuses: &[String]) -> Result<KanbanResult> {
    let filter = parse_filter(statuses)?;
    let store = ctx.open_store()?;
    Ok(KanbanResult {
        board: organize_kanban(store.features(), &filter),
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct StatsResult {
    pub stats: BoardStats,
}

impl Output for StatsResult {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Total: {}", self.stats.total),
            format!("Blocked: {}", self.stats.blocked),
        ];
        for (status, count) in &self.stats.by_status {
            lines.push(format!("  {}: {}", status.label(), count));
        }
        lines.join("\n")
    }
}

/// Count features per status.
pub fn stats(ctx: &Context) -> Result<StatsResult> {
    let store = ctx.open_store()?;
    Ok(StatsResult {
        stats: collection_stats(store.features()),
    })
}

// === Config ===

/// Every setting with its resolved value and source.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigShow {
    pub data_dir: String,
    pub config_file: String,
    #[serde(flatten)]
    pub config: ResolvedConfig,
}

fn source_line(key: &str, value: impl std::fmt::Display, source: ValueSource) -> String {
    format!("{} = {} ({})", key, value, source)
}

impl Output for ConfigShow {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        let c = &self.config;
        [
            format!("Data dir: {}", self.data_dir),
            format!("Config file: {}", self.config_file),
            source_line("storage-key", &c.storage_key.value, c.storage_key.source),
            source_line("output-format", c.output_format.value, c.output_format.source),
            source_line("canvas-width", c.canvas_width.value, c.canvas_width.source),
            source_line("canvas-height", c.canvas_height.value, c.canvas_height.source),
            source_line(
                "device-pixel-ratio",
                c.device_pixel_ratio.value,
                c.device_pixel_ratio.source,
            ),
            source_line("date-format", &c.date_format.value, c.date_format.source),
        ]
        .join("\n")
    }
}

/// Show the resolved configuration.
pub fn config_show(ctx: &Context) -> ConfigShow {
    ConfigShow {
        data_dir: ctx.data_dir.display().to_string(),
        config_file: config::config_kdl_path(&ctx.data_dir).display().to_string(),
        config: ctx.config.clone(),
    }
}

/// A single config.kdl entry.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue {
    pub key: String,
    pub value: Option<String>,
}

impl Output for ConfigValue {
    fn to_json(&self) -> String {
        json(self)
    }

    fn to_human(&self) -> String {
        match self.value {
            Some(ref value) => format!("{} = {}", self.key, value),
            None => format!("{} is not set", self.key),
        }
    }
}

fn check_config_key(key: &str) -> Result<()> {
    if CONFIG_KEYS.contains(&key) {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "unknown config key {:?} (expected one of: {})",
            key,
            CONFIG_KEYS.join(", ")
        )))
    }
}

/// Read a key from config.kdl.
pub fn config_get(data_dir: &Path, key: &str) -> Result<ConfigValue> {
    check_config_key(key)?;
    let file = config::read_config(data_dir)?;
    Ok(ConfigValue {
        key: key.to_string(),
        value: file.get(key),
    })
}

/// Set a key in config.kdl.
pub fn config_set(data_dir: &Path, key: &str, value: &str) -> Result<ConfigValue> {
    let mut file = config::read_config(data_dir)?;
    file.set(key, value).map_err(Error::Config)?;
    config::write_config(data_dir, &file)?;
    Ok(ConfigValue {
        key: key.to_string(),
        value: file.get(key),
    })
}
