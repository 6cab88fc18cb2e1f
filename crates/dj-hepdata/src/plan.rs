//! Declarative HepData makers.
//!
//! A maker plan names the result files to read, the objects to take from them
//! and how to arrange those objects into tables. Paths in a plan are relative
//! to the directory of the plan file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use dj_core::errors::{DjError, ErrorInfo};
use dj_hist::{
    broadcast_first, select_group, trim, trim_edges, BinEdges, BinnedSeries, Graph, Hist1D,
    ResultFile, TrimCuts,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::{KeywordValue, Submission, Table, Uncertainty, Variable};

/// Additional resource shown on the record page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    /// Link text.
    pub description: String,
    /// Target URL.
    pub url: String,
}

/// External record of the publication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIdSpec {
    /// Record number.
    pub id: u64,
    /// Record system; `inspire` unless given.
    #[serde(default = "RecordIdSpec::default_kind")]
    pub kind: String,
}

impl RecordIdSpec {
    fn default_kind() -> String {
        "inspire".to_string()
    }
}

/// Object kinds a source can list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// One-dimensional histograms.
    Hist1d,
    /// Graphs.
    Graph,
}

/// An ordered list of same-kind objects read from one result file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Result file, relative to the plan.
    pub file: PathBuf,
    /// Kind every listed object must have.
    pub kind: SourceKind,
    /// Object names in source order.
    pub names: Vec<String>,
}

/// Selects one block of consecutive source members for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Members per block.
    pub size: usize,
    /// Block to use, counted from zero.
    pub index: usize,
}

/// Independent axis of a table. Exactly one of `from_source` and `bins` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Header name.
    pub name: String,
    /// Units; empty when dimensionless.
    #[serde(default)]
    pub units: String,
    /// Take the bins of the first (grouped) member of this source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_source: Option<String>,
    /// Explicit bins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bins: Option<Vec<BinEdges>>,
    /// Emit bin centres (graph points) instead of bins.
    #[serde(default = "AxisSpec::default_binned")]
    pub binned: bool,
}

impl AxisSpec {
    fn default_binned() -> bool {
        true
    }
}

/// How the systematic uncertainty of a series is taken from its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystMode {
    /// One systematic value per bin.
    #[default]
    PerBin,
    /// A single value, quoted once for the whole series.
    FirstValue,
}

/// One dependent variable of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Header name.
    pub name: String,
    /// Units; empty when dimensionless.
    #[serde(default)]
    pub units: String,
    /// Source holding the values and statistical errors.
    pub source: String,
    /// Index within the (grouped) source; defaults to the series position in the table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<usize>,
    /// Source whose errors are the systematic uncertainty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syst_source: Option<String>,
    /// How the systematic errors map onto bins.
    #[serde(default)]
    pub syst_mode: SystMode,
    /// Qualifiers added after the table's common ones.
    #[serde(default)]
    pub qualifiers: Vec<(String, String)>,
    /// Label of the statistical uncertainty.
    #[serde(default = "SeriesSpec::default_stat_label")]
    pub stat_label: String,
    /// Label of the systematic uncertainty.
    #[serde(default = "SeriesSpec::default_syst_label")]
    pub syst_label: String,
}

impl SeriesSpec {
    fn default_stat_label() -> String {
        "stat".to_string()
    }

    fn default_syst_label() -> String {
        "sys".to_string()
    }
}

/// One published figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    /// Table name.
    pub name: String,
    /// Caption.
    #[serde(default)]
    pub description: String,
    /// Where the figure appears in the paper.
    #[serde(default)]
    pub location: String,
    /// Table keywords.
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<KeywordValue>>,
    /// Independent axis.
    pub x: AxisSpec,
    /// Analysis range applied to the axis and every series.
    #[serde(default)]
    pub trim: TrimCuts,
    /// Block of each source this table reads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupSpec>,
    /// Qualifiers added to every series before its own.
    #[serde(default)]
    pub common_qualifiers: Vec<(String, String)>,
    /// Dependent variables in column order.
    pub series: Vec<SeriesSpec>,
}

/// Complete description of one HepData maker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MakerPlan {
    /// File whose contents become the submission comment.
    #[serde(default, rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_file: Option<PathBuf>,
    /// Inline comment, used when no abstract file is given.
    #[serde(default)]
    pub comment: String,
    /// Additional resources.
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    /// External records.
    #[serde(default)]
    pub record_ids: Vec<RecordIdSpec>,
    /// Keywords set on every table after all tables are built.
    #[serde(default)]
    pub common_keywords: BTreeMap<String, Vec<KeywordValue>>,
    /// Named object lists the tables refer to.
    #[serde(default)]
    pub sources: BTreeMap<String, SourceSpec>,
    /// Tables in publication order.
    pub tables: Vec<TableSpec>,
    /// Output directory used when the caller does not choose one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<PathBuf>,
}

impl MakerPlan {
    /// Loads a plan from YAML and returns it with the directory its paths are relative to.
    pub fn load(path: &Path) -> Result<(Self, PathBuf), DjError> {
        let raw = fs::read_to_string(path)
            .map_err(|err| DjError::io("dj_hepdata.plan_read", path, err))?;
        let plan: MakerPlan = serde_yaml::from_str(&raw).map_err(|err| {
            DjError::Serde(ErrorInfo::new("dj_hepdata.plan_parse", err.to_string()).with_path(path))
        })?;
        let base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok((plan, base))
    }

    /// Every result file the plan reads, resolved against `base`, without duplicates.
    pub fn input_files(&self, base: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .sources
            .values()
            .map(|source| base.join(&source.file))
            .collect();
        if let Some(path) = &self.abstract_file {
            files.push(base.join(path));
        }
        files.sort();
        files.dedup();
        files
    }
}

fn plan_error(code: &str, table: &str, message: impl Into<String>) -> DjError {
    DjError::Table(ErrorInfo::new(code, message).with_context("table", table))
}

/// One object read for a source.
#[derive(Debug, Clone)]
enum SourceItem {
    Hist(Hist1D),
    Graph(Graph),
}

impl SourceItem {
    fn edges(&self) -> Vec<BinEdges> {
        match self {
            SourceItem::Hist(hist) => hist.x_edges.clone(),
            SourceItem::Graph(graph) => graph.edges(),
        }
    }

    fn errors(&self) -> &[f64] {
        match self {
            SourceItem::Hist(hist) => &hist.dy,
            SourceItem::Graph(graph) => &graph.dy,
        }
    }

    fn to_series(&self, syst: &[f64]) -> Result<BinnedSeries, DjError> {
        match self {
            SourceItem::Hist(hist) => hist.to_series(syst),
            SourceItem::Graph(graph) => graph.to_series(syst),
        }
    }
}

/// Result files and sources already read; each file and source is read once.
struct SourceCache<'p> {
    plan: &'p MakerPlan,
    base: PathBuf,
    files: BTreeMap<PathBuf, ResultFile>,
    sources: BTreeMap<String, Vec<SourceItem>>,
}

impl<'p> SourceCache<'p> {
    fn new(plan: &'p MakerPlan, base: &Path) -> Self {
        Self {
            plan,
            base: base.to_path_buf(),
            files: BTreeMap::new(),
            sources: BTreeMap::new(),
        }
    }

    fn items(&mut self, table: &str, name: &str) -> Result<&[SourceItem], DjError> {
        if !self.sources.contains_key(name) {
            let plan = self.plan;
            let spec = plan.sources.get(name).ok_or_else(|| {
                plan_error(
                    "dj_hepdata.unknown_source",
                    table,
                    format!("table `{table}` refers to undefined source `{name}`"),
                )
            })?;
            let path = self.base.join(&spec.file);
            if !self.files.contains_key(&path) {
                let file =
                    ResultFile::open(&path).map_err(|err| in_table(err, table, "source", name))?;
                self.files.insert(path.clone(), file);
            }
            let file = &self.files[&path];
            let items = spec
                .names
                .iter()
                .map(|object| match spec.kind {
                    SourceKind::Hist1d => file.read_hist_1d(object).map(SourceItem::Hist),
                    SourceKind::Graph => file.read_graph(object).map(SourceItem::Graph),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| in_table(err, table, "source", name))?;
            info!(source = name, file = %path.display(), objects = items.len(), "loaded source");
            self.sources.insert(name.to_string(), items);
        }
        Ok(&self.sources[name])
    }

    /// Source items visible to a table, after its group selection.
    fn grouped(&mut self, table: &TableSpec, name: &str) -> Result<Vec<SourceItem>, DjError> {
        let items = self.items(&table.name, name)?;
        match table.group {
            Some(group) => select_group(items, group.size, group.index)
                .map(<[SourceItem]>::to_vec)
                .map_err(|err| in_table(err, &table.name, "source", name)),
            None => Ok(items.to_vec()),
        }
    }
}

fn member<'a>(
    items: &'a [SourceItem],
    index: usize,
    table: &str,
    source: &str,
) -> Result<&'a SourceItem, DjError> {
    items.get(index).ok_or_else(|| {
        DjError::Table(
            ErrorInfo::new(
                "dj_hepdata.member_out_of_range",
                format!(
                    "source `{source}` has {} objects, table `{table}` asks for index {index}",
                    items.len()
                ),
            )
            .with_context("table", table)
            .with_context("source", source),
        )
    })
}

fn in_table(err: DjError, table: &str, key: &str, value: &str) -> DjError {
    err.with_context("table", table).with_context(key, value)
}

fn build_axis(cache: &mut SourceCache<'_>, spec: &TableSpec) -> Result<Variable, DjError> {
    let axis = &spec.x;
    let mut edges = match (&axis.from_source, &axis.bins) {
        (Some(source), None) => {
            let items = cache.grouped(spec, source)?;
            member(&items, 0, &spec.name, source)?.edges()
        }
        (None, Some(bins)) => bins.clone(),
        _ => {
            return Err(plan_error(
                "dj_hepdata.axis_source",
                &spec.name,
                format!(
                    "x axis of table `{}` needs exactly one of `from_source` or `bins`",
                    spec.name
                ),
            ))
        }
    };
    if !spec.trim.is_noop() {
        trim_edges(&mut edges, &spec.trim)
            .map_err(|err| in_table(err, &spec.name, "axis", &axis.name))?;
    }
    Ok(if axis.binned {
        Variable::independent_binned(&axis.name, &axis.units, edges)
    } else {
        let centres = edges.iter().map(|(lo, hi)| 0.5 * (lo + hi)).collect();
        Variable::independent_points(&axis.name, &axis.units, centres)
    })
}

fn build_series(
    cache: &mut SourceCache<'_>,
    spec: &TableSpec,
    position: usize,
    series: &SeriesSpec,
) -> Result<Variable, DjError> {
    let index = series.member.unwrap_or(position);
    let values = cache.grouped(spec, &series.source)?;
    let item = member(&values, index, &spec.name, &series.source)?;

    let bins = item.edges().len();
    let syst = match &series.syst_source {
        Some(name) => {
            let errors = cache.grouped(spec, name)?;
            let errors = member(&errors, index, &spec.name, name)?.errors().to_vec();
            match series.syst_mode {
                SystMode::PerBin => errors,
                SystMode::FirstValue => broadcast_first(&errors, bins)
                    .map_err(|err| in_table(err, &spec.name, "source", name))?,
            }
        }
        None => vec![0.0; bins],
    };

    let mut binned = item
        .to_series(&syst)
        .map_err(|err| in_table(err, &spec.name, "series", &series.name))?;
    if !spec.trim.is_noop() {
        let report = trim(&mut binned, &spec.trim)
            .map_err(|err| in_table(err, &spec.name, "series", &series.name))?;
        debug!(
            table = %spec.name,
            series = %series.name,
            under = report.under,
            over = report.over,
            "applied analysis range"
        );
    }

    let mut variable = Variable::dependent(&series.name, &series.units, binned.values);
    for (name, value) in spec.common_qualifiers.iter().chain(&series.qualifiers) {
        variable.add_qualifier(name, value);
    }
    variable.add_uncertainty(Uncertainty::symmetric(&series.stat_label, binned.stat))?;
    if series.syst_source.is_some() {
        variable.add_uncertainty(Uncertainty::symmetric(&series.syst_label, binned.syst))?;
    }
    Ok(variable)
}

fn build_table(cache: &mut SourceCache<'_>, spec: &TableSpec) -> Result<Table, DjError> {
    let mut table = Table::new(&spec.name);
    table.description = spec.description.clone();
    table.location = spec.location.clone();
    table.keywords = spec.keywords.clone();
    table.add_variable(build_axis(cache, spec)?);
    for (position, series) in spec.series.iter().enumerate() {
        table.add_variable(build_series(cache, spec, position, series)?);
    }
    table.validate()?;
    info!(table = %table.name, variables = table.variables.len(), "built table");
    Ok(table)
}

/// Reads every source the plan names and assembles the submission.
pub fn build_submission(plan: &MakerPlan, base: &Path) -> Result<Submission, DjError> {
    let mut submission = Submission::new();
    match &plan.abstract_file {
        Some(path) => submission.read_abstract(&base.join(path))?,
        None => submission.comment = plan.comment.clone(),
    }
    for link in &plan.links {
        submission.add_link(&link.description, &link.url);
    }
    for record in &plan.record_ids {
        submission.add_record_id(record.id, &record.kind);
    }

    let mut cache = SourceCache::new(plan, base);
    for spec in &plan.tables {
        submission.add_table(build_table(&mut cache, spec)?);
    }
    for (key, values) in &plan.common_keywords {
        submission.set_common_keyword(key, values.clone());
    }
    submission.validate()?;
    Ok(submission)
}
