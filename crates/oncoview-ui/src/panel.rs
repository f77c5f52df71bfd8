//! Mode panel
//!
//! Severity-sorted summaries of the active analysis mode and the detail
//! view of the selected entity. Everything here is derived on demand from
//! the entity model; nothing is cached between calls.

use oncoview_core::{AnalysisMode, EntityId, EntityKind, EntityModel, EntityRef, Rgb};
use oncoview_visualizer::colorizer::radiation_appearance;
use oncoview_visualizer::{color_for, tumor_appearance, ColorizerConfig};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One row of a mode summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryEntry {
    /// Entity the row describes
    pub entity: EntityId,
    /// Kind of entity
    pub kind: EntityKind,
    /// Display title
    pub title: String,
    /// Severity value the list is sorted by
    pub value: f32,
    /// Formatted severity, e.g. "45.0 Gy"
    pub value_label: String,
    /// Swatch color, as the scene shows the entity in this mode
    pub color: Rgb,
}

/// Summary list for one analysis mode, most severe first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeSummary {
    /// Mode the summary was built for
    pub mode: AnalysisMode,
    /// Panel heading
    pub heading: String,
    /// Rows, sorted by descending value, ties by id
    pub entries: Vec<SummaryEntry>,
}

impl ModeSummary {
    /// Most severe entry
    pub fn top(&self) -> Option<&SummaryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the summary of `mode` for `model`.
///
/// - Radiation: regions with a recorded dose, by dose
/// - Damage: affected regions, by damage level
/// - Tumor: tumors, by malignancy
pub fn summarize(model: &EntityModel, mode: AnalysisMode, cfg: &ColorizerConfig) -> ModeSummary {
    let mut entries: Vec<SummaryEntry> = match mode {
        AnalysisMode::Radiation => model
            .regions()
            .iter()
            .filter_map(|region| {
                let dose = region.radiation_dose?;
                Some(SummaryEntry {
                    entity: region.id.clone(),
                    kind: EntityKind::Region,
                    title: region.name.clone(),
                    value: dose,
                    value_label: format!("{:.1} Gy", dose),
                    color: color_for(region, mode, cfg).color,
                })
            })
            .collect(),
        AnalysisMode::Damage => model
            .regions()
            .iter()
            .filter(|region| region.is_affected)
            .map(|region| SummaryEntry {
                entity: region.id.clone(),
                kind: EntityKind::Region,
                title: region.name.clone(),
                value: region.damage_level,
                value_label: format!("{}% damage", percent(region.damage_level)),
                color: color_for(region, mode, cfg).color,
            })
            .collect(),
        AnalysisMode::Tumor => model
            .tumors()
            .iter()
            .map(|tumor| {
                let region = model
                    .region(&tumor.region_id)
                    .map(|r| r.name.as_str())
                    .unwrap_or_else(|| tumor.region_id.as_str());
                SummaryEntry {
                    entity: tumor.id.clone(),
                    kind: EntityKind::Tumor,
                    title: format!("{} ({})", tumor_name(&tumor.tumor_type, &tumor.id), region),
                    value: tumor.malignancy,
                    value_label: format!("{}% malignancy", percent(tumor.malignancy)),
                    color: tumor_appearance(tumor, mode, cfg).color,
                }
            })
            .collect(),
    };

    entries.sort_by(by_severity);

    ModeSummary {
        mode,
        heading: mode.title().to_string(),
        entries,
    }
}

fn by_severity(a: &SummaryEntry, b: &SummaryEntry) -> Ordering {
    b.value
        .total_cmp(&a.value)
        .then_with(|| a.entity.cmp(&b.entity))
}

/// One labelled value of the detail view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailField {
    /// Field label
    pub label: String,
    /// Formatted value
    pub value: String,
}

impl DetailField {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

/// Detail view of a single entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Entity shown
    pub entity: EntityId,
    /// Kind of entity
    pub kind: EntityKind,
    /// Display name
    pub name: String,
    /// Swatch color
    pub color: Rgb,
    /// Labelled values, in display order
    pub fields: Vec<DetailField>,
}

impl EntityDetail {
    /// Value of the field labelled `label`
    pub fn field(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// Detail view of entity `id`, colored as `mode` shows it.
pub fn detail_for(
    model: &EntityModel,
    id: &EntityId,
    mode: AnalysisMode,
    cfg: &ColorizerConfig,
) -> Option<EntityDetail> {
    let entity = model.get(id)?;
    let (color, fields) = match entity {
        EntityRef::Region(region) => {
            let mut fields = vec![
                DetailField::new("Position", format_vec(region.position.to_array())),
                DetailField::new("Size", format_vec(region.extent.to_array())),
            ];
            fields.push(DetailField::new(
                "Dose",
                match region.radiation_dose {
                    Some(dose) => format!("{:.1} Gy", dose),
                    None => "none recorded".to_string(),
                },
            ));
            if region.is_affected {
                fields.push(DetailField::new(
                    "Damage",
                    format!("{}%", percent(region.damage_level)),
                ));
            }
            let tumors = model.tumors_in(&region.id).count();
            fields.push(DetailField::new("Tumors", tumors.to_string()));
            (color_for(region, mode, cfg).color, fields)
        }
        EntityRef::Tumor(tumor) => {
            let region = model
                .region(&tumor.region_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| tumor.region_id.to_string());
            let mut fields = vec![DetailField::new("Region", region)];
            if !tumor.stage.is_empty() {
                fields.push(DetailField::new("Stage", tumor.stage.clone()));
            }
            fields.push(DetailField::new("Size", format!("{:.2}", tumor.size)));
            fields.push(DetailField::new(
                "Growth rate",
                format!("{}%", percent(tumor.growth_rate)),
            ));
            fields.push(DetailField::new(
                "Malignancy",
                format!("{}%", percent(tumor.malignancy)),
            ));
            (tumor_appearance(tumor, mode, cfg).color, fields)
        }
        EntityRef::Radiation(sample) => {
            let fields = vec![
                DetailField::new("Target", sample.target_area.clone()),
                DetailField::new("Intensity", format!("{}%", percent(sample.intensity))),
                DetailField::new("Dose", format!("{:.1} Gy", sample.dose)),
            ];
            (radiation_appearance(sample, cfg).color, fields)
        }
    };

    let name = match entity {
        EntityRef::Tumor(tumor) => tumor_name(&tumor.tumor_type, &tumor.id).to_string(),
        other => other.display_name().to_string(),
    };

    Some(EntityDetail {
        entity: id.clone(),
        kind: entity.kind(),
        name,
        color,
        fields,
    })
}

fn tumor_name<'a>(tumor_type: &'a str, id: &'a EntityId) -> &'a str {
    if tumor_type.is_empty() {
        id.as_str()
    } else {
        tumor_type
    }
}

fn percent(fraction: f32) -> i32 {
    (fraction * 100.0).round() as i32
}

fn format_vec(v: [f32; 3]) -> String {
    format!("({:.2}, {:.2}, {:.2})", v[0], v[1], v[2])
}
