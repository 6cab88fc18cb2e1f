//! In-memory HepData submission: tables of independent and dependent
//! variables with uncertainties and free-text qualifiers.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use dj_core::errors::{DjError, ErrorInfo};
use dj_hist::BinEdges;
use serde::{Deserialize, Serialize};
use tracing::warn;

fn table_error(code: &str, message: impl Into<String>) -> DjError {
    DjError::Table(ErrorInfo::new(code, message))
}

/// A keyword value. HepData expects numbers for some keywords (`cmenergies`)
/// and text for the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordValue {
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Text value.
    Text(String),
}

impl From<&str> for KeywordValue {
    fn from(value: &str) -> Self {
        KeywordValue::Text(value.to_string())
    }
}

impl From<i64> for KeywordValue {
    fn from(value: i64) -> Self {
        KeywordValue::Int(value)
    }
}

/// Free-text key/value metadata attached to a variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qualifier {
    /// Qualifier name, e.g. `centrality`.
    pub name: String,
    /// Qualifier value.
    pub value: String,
}

/// Error values of one uncertainty source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum UncertaintyValues {
    /// One `±` value per point.
    Symmetric(Vec<f64>),
    /// `(minus, plus)` pairs, both given as signed shifts.
    Asymmetric(Vec<(f64, f64)>),
}

impl UncertaintyValues {
    /// Number of points covered.
    pub fn len(&self) -> usize {
        match self {
            UncertaintyValues::Symmetric(values) => values.len(),
            UncertaintyValues::Asymmetric(values) => values.len(),
        }
    }

    /// True when no point is covered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A labelled uncertainty source of a dependent variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Uncertainty {
    /// Label shown next to the error, e.g. `stat` or `sys`.
    pub label: String,
    /// Per-point error values.
    pub values: UncertaintyValues,
}

impl Uncertainty {
    /// Symmetric uncertainty.
    pub fn symmetric(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            values: UncertaintyValues::Symmetric(values),
        }
    }

    /// Asymmetric uncertainty from `(minus, plus)` pairs.
    pub fn asymmetric(label: impl Into<String>, values: Vec<(f64, f64)>) -> Self {
        Self {
            label: label.into(),
            values: UncertaintyValues::Asymmetric(values),
        }
    }

    /// True for [`UncertaintyValues::Symmetric`].
    pub fn is_symmetric(&self) -> bool {
        matches!(self.values, UncertaintyValues::Symmetric(_))
    }
}

/// Values carried by a variable: bins for binned axes, points otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VariableValues {
    /// `(low, high)` bins.
    Binned(Vec<BinEdges>),
    /// Single values.
    Points(Vec<f64>),
}

impl VariableValues {
    /// Number of bins or points.
    pub fn len(&self) -> usize {
        match self {
            VariableValues::Binned(bins) => bins.len(),
            VariableValues::Points(points) => points.len(),
        }
    }

    /// True when there are no bins or points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Header name, usually LaTeX.
    pub name: String,
    /// Units; empty when dimensionless.
    pub units: String,
    /// True for the x axis.
    pub is_independent: bool,
    /// Bins or points.
    pub values: VariableValues,
    /// Qualifiers in insertion order.
    pub qualifiers: Vec<Qualifier>,
    /// Uncertainty sources; only point values carry them.
    pub uncertainties: Vec<Uncertainty>,
}

impl Variable {
    /// Binned independent variable, the x axis of a histogram table.
    pub fn independent_binned(
        name: impl Into<String>,
        units: impl Into<String>,
        bins: Vec<BinEdges>,
    ) -> Self {
        Self::new(name, units, true, VariableValues::Binned(bins))
    }

    /// Unbinned independent variable, the x axis of a point table.
    pub fn independent_points(
        name: impl Into<String>,
        units: impl Into<String>,
        points: Vec<f64>,
    ) -> Self {
        Self::new(name, units, true, VariableValues::Points(points))
    }

    /// Dependent variable holding measured values.
    pub fn dependent(name: impl Into<String>, units: impl Into<String>, values: Vec<f64>) -> Self {
        Self::new(name, units, false, VariableValues::Points(values))
    }

    fn new(
        name: impl Into<String>,
        units: impl Into<String>,
        is_independent: bool,
        values: VariableValues,
    ) -> Self {
        Self {
            name: name.into(),
            units: units.into(),
            is_independent,
            values,
            qualifiers: Vec::new(),
            uncertainties: Vec::new(),
        }
    }

    /// True when the values are bins.
    pub fn is_binned(&self) -> bool {
        matches!(self.values, VariableValues::Binned(_))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the variable has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Appends a qualifier; insertion order is kept in the output.
    pub fn add_qualifier(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if value.trim().is_empty() {
            warn!(variable = %self.name, qualifier = %name, "qualifier has an empty value");
        }
        self.qualifiers.push(Qualifier { name, value });
    }

    /// Attaches an uncertainty with one entry per value.
    pub fn add_uncertainty(&mut self, uncertainty: Uncertainty) -> Result<(), DjError> {
        if uncertainty.values.len() != self.len() {
            return Err(DjError::Table(
                ErrorInfo::new(
                    "dj_hepdata.uncertainty_length",
                    format!(
                        "uncertainty `{}` has {} entries but variable `{}` has {}",
                        uncertainty.label,
                        uncertainty.values.len(),
                        self.name,
                        self.len()
                    ),
                )
                .with_context("variable", self.name.clone()),
            ));
        }
        self.uncertainties.push(uncertainty);
        Ok(())
    }
}

/// One published figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, unique within the submission.
    pub name: String,
    /// Caption.
    pub description: String,
    /// Where the figure appears in the paper.
    pub location: String,
    /// Search keywords such as `cmenergies` or `observables`.
    pub keywords: BTreeMap<String, Vec<KeywordValue>>,
    /// Independent and dependent variables in insertion order.
    pub variables: Vec<Variable>,
}

impl Table {
    /// Empty table with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            location: String::new(),
            keywords: BTreeMap::new(),
            variables: Vec::new(),
        }
    }

    /// Appends a variable.
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.push(variable);
    }

    /// Independent variables in insertion order.
    pub fn independent_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|var| var.is_independent)
    }

    /// Dependent variables in insertion order.
    pub fn dependent_variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter().filter(|var| !var.is_independent)
    }

    /// Name of the data file this table is written to.
    pub fn data_file_name(&self) -> String {
        let stem: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{stem}.yaml")
    }

    /// Checks that the table has an x axis, that every variable describes
    /// the same number of points and that only dependent point values carry
    /// uncertainties.
    pub fn validate(&self) -> Result<(), DjError> {
        let with_table = |err: ErrorInfo| DjError::Table(err.with_context("table", self.name.clone()));
        if self.name.trim().is_empty() {
            return Err(with_table(ErrorInfo::new(
                "dj_hepdata.table_name",
                "table name is empty",
            )));
        }
        let Some(first) = self.independent_variables().next() else {
            return Err(with_table(ErrorInfo::new(
                "dj_hepdata.no_independent",
                format!("table `{}` has no independent variable", self.name),
            )));
        };
        let expected = first.len();
        if expected == 0 {
            return Err(with_table(ErrorInfo::new(
                "dj_hepdata.empty_table",
                format!("table `{}` has no points", self.name),
            )));
        }
        for variable in &self.variables {
            if variable.len() != expected {
                return Err(with_table(
                    ErrorInfo::new(
                        "dj_hepdata.variable_length",
                        format!(
                            "variable `{}` has {} values, expected {expected}",
                            variable.name,
                            variable.len()
                        ),
                    )
                    .with_context("variable", variable.name.clone()),
                ));
            }
            if variable.is_binned() && !variable.is_independent {
                return Err(with_table(
                    ErrorInfo::new(
                        "dj_hepdata.binned_dependent",
                        format!(
                            "dependent variable `{}` holds bins instead of values",
                            variable.name
                        ),
                    )
                    .with_context("variable", variable.name.clone()),
                ));
            }
            if variable.is_binned() && !variable.uncertainties.is_empty() {
                return Err(with_table(
                    ErrorInfo::new(
                        "dj_hepdata.binned_uncertainty",
                        format!(
                            "binned variable `{}` cannot carry uncertainties",
                            variable.name
                        ),
                    )
                    .with_context("variable", variable.name.clone()),
                ));
            }
            for uncertainty in &variable.uncertainties {
                if uncertainty.values.len() != expected {
                    return Err(with_table(
                        ErrorInfo::new(
                            "dj_hepdata.uncertainty_length",
                            format!(
                                "uncertainty `{}` of `{}` has {} values, expected {expected}",
                                uncertainty.label,
                                variable.name,
                                uncertainty.values.len()
                            ),
                        )
                        .with_context("variable", variable.name.clone()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A link shown on the record page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link text.
    pub description: String,
    /// URL.
    pub location: String,
}

/// Identifier of the publication in an external record system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordId {
    /// Record number.
    pub id: u64,
    /// Record system, e.g. `inspire`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// The complete submission: paper metadata plus tables.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Submission {
    /// Abstract or free-text comment.
    pub comment: String,
    /// Additional resources.
    pub links: Vec<Link>,
    /// External record identifiers.
    pub record_ids: Vec<RecordId>,
    /// Tables in publication order.
    pub tables: Vec<Table>,
}

impl Submission {
    /// Empty submission.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses the contents of `path` as the submission comment (the abstract).
    pub fn read_abstract(&mut self, path: &Path) -> Result<(), DjError> {
        let text =
            fs::read_to_string(path).map_err(|err| DjError::io("dj_hepdata.abstract", path, err))?;
        self.comment = text.trim_end().to_string();
        Ok(())
    }

    /// Adds an additional resource link.
    pub fn add_link(&mut self, description: impl Into<String>, location: impl Into<String>) {
        self.links.push(Link {
            description: description.into(),
            location: location.into(),
        });
    }

    /// Adds an external record identifier.
    pub fn add_record_id(&mut self, id: u64, kind: impl Into<String>) {
        self.record_ids.push(RecordId {
            id,
            kind: kind.into(),
        });
    }

    /// Appends a table.
    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    /// Sets a keyword on every table added so far.
    pub fn set_common_keyword(&mut self, key: &str, values: Vec<KeywordValue>) {
        for table in &mut self.tables {
            table.keywords.insert(key.to_string(), values.clone());
        }
    }

    /// Validates every table and checks that table names and data file names
    /// are unique.
    pub fn validate(&self) -> Result<(), DjError> {
        if self.tables.is_empty() {
            return Err(table_error(
                "dj_hepdata.no_tables",
                "submission has no tables",
            ));
        }
        let mut names = BTreeSet::new();
        let mut files = BTreeSet::new();
        for table in &self.tables {
            table.validate()?;
            if !names.insert(table.name.as_str()) {
                return Err(DjError::Table(
                    ErrorInfo::new(
                        "dj_hepdata.duplicate_table",
                        format!("table `{}` is defined twice", table.name),
                    )
                    .with_context("table", table.name.clone()),
                ));
            }
            let file = table.data_file_name();
            if file == "submission.yaml" || !files.insert(file.clone()) {
                return Err(DjError::Table(
                    ErrorInfo::new(
                        "dj_hepdata.duplicate_data_file",
                        format!("table `{}` maps to data file `{file}` which is already taken", table.name),
                    )
                    .with_context("table", table.name.clone())
                    .with_hint("rename the table so its data file name is unique"),
                ));
            }
        }
        Ok(())
    }
}
