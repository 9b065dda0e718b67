//! JSON interchange of form trees.
//!
//! Reading accepts the legacy shapes (bare-integer spans, bare-string
//! options, fields without grid coordinates) and migrates them; writing
//! always produces the current shape.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::FormError;
use crate::grid::coords::{compact_rows, migrate_legacy, resolve_overlaps};
use crate::grid::naming::copy_name;
use crate::schema::{FieldDefinition, FormDefinition};

/// Counts of repairs made by [`normalize_definition`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Fields that received grid coordinates
    pub migrated: usize,
    /// Shifts needed to clear overlaps
    pub shifted: usize,
    /// Fields renamed to resolve name collisions
    pub renamed: usize,
    /// Sections whose rows were renumbered
    pub compacted: usize,
}

impl NormalizeReport {
    pub fn is_clean(&self) -> bool {
        *self == NormalizeReport::default()
    }
}

fn io_error(context: &str, error: std::io::Error) -> FormError {
    FormError::Io(format!("{}: {}", context, error))
}

/// Parses a form tree from JSON.
pub fn from_json_str(json: &str) -> Result<FormDefinition, FormError> {
    serde_json::from_str(json).map_err(|e| FormError::Parse(e.to_string()))
}

/// Serializes a form tree as pretty-printed JSON.
pub fn to_json_string(form: &FormDefinition) -> Result<String, FormError> {
    serde_json::to_string_pretty(form).map_err(|e| FormError::Parse(e.to_string()))
}

/// Gives grid coordinates to every unplaced field of every section.
///
/// # Returns
/// Number of fields migrated.
pub fn migrate_definition(form: &mut FormDefinition) -> usize {
    let mut migrated = 0;
    form.for_each_section_mut(&mut |section| {
        let count = migrate_legacy(&mut section.fields);
        if count > 0 {
            tracing::debug!(
                "Migrated {} legacy fields in section {}",
                count,
                section.id
            );
        }
        migrated += count;
    });
    migrated
}

/// Pushes overlapping fields apart in reading order, section by section.
///
/// # Returns
/// Number of shifts made.
pub fn resolve_definition_overlaps(form: &mut FormDefinition) -> usize {
    let mut shifted = 0;
    form.for_each_section_mut(&mut |section| {
        shifted += resolve_section_overlaps(&mut section.fields);
    });
    shifted
}

fn resolve_section_overlaps(fields: &mut [FieldDefinition]) -> usize {
    let mut anchors: Vec<usize> = (0..fields.len()).collect();
    anchors.sort_by_key(|&i| (fields[i].grid_row, fields[i].grid_column));
    resolve_overlaps(fields, &anchors, None)
}

/// Repairs every section so it satisfies the grid invariants.
///
/// Migrates unplaced fields, pushes overlapping fields apart in reading
/// order, renames repeated field names with a copy suffix and compacts
/// rows. List order is preserved.
pub fn normalize_definition(form: &mut FormDefinition) -> NormalizeReport {
    let mut report = NormalizeReport {
        migrated: migrate_definition(form),
        ..NormalizeReport::default()
    };

    form.for_each_section_mut(&mut |section| {
        let fields = &mut section.fields;
        report.shifted += resolve_section_overlaps(fields);

        for index in 1..fields.len() {
            let (earlier, rest) = fields.split_at_mut(index);
            let field = &mut rest[0];
            if earlier.iter().any(|f| f.name == field.name) {
                let renamed = copy_name(&field.name, earlier.iter().map(|f| f.name.as_str()));
                tracing::debug!(
                    "Renamed field {} from {} to {} in section {}",
                    field.id,
                    field.name,
                    renamed,
                    section.id
                );
                field.name = renamed;
                report.renamed += 1;
            }
        }

        if compact_rows(fields) {
            report.compacted += 1;
        }
    });
    report
}

/// Reads a form file and migrates legacy fields.
///
/// # Arguments
/// * `path` - JSON file holding a form tree
///
/// # Returns
/// `Result<FormDefinition, FormError>`
pub fn load_form(path: impl AsRef<Path>) -> Result<FormDefinition, FormError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| io_error(&format!("Failed to read {}", path.display()), e))?;
    let mut form = from_json_str(&json)?;
    let migrated = migrate_definition(&mut form);
    tracing::debug!(
        "Loaded form {} from {} ({} fields migrated)",
        form.id,
        path.display(),
        migrated
    );
    Ok(form)
}

/// Writes a form file through a temporary file and an atomic rename.
pub fn save_form(path: impl AsRef<Path>, form: &FormDefinition) -> Result<(), FormError> {
    let path = path.as_ref();
    let json = to_json_string(form)?;

    let temp_path = temp_path_for(path);
    let mut file = File::create(&temp_path)
        .map_err(|e| io_error(&format!("Failed to create {}", temp_path.display()), e))?;
    file.write_all(json.as_bytes())
        .map_err(|e| io_error("Failed to write form", e))?;
    file.sync_all()
        .map_err(|e| io_error("Failed to sync form", e))?;

    fs::rename(&temp_path, path)
        .map_err(|e| io_error(&format!("Failed to rename to {}", path.display()), e))?;

    tracing::debug!("Saved form {} to {}", form.id, path.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "form.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
