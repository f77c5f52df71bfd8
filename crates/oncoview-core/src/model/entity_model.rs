//! Read-only store of the anatomical entities of one visualization session.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::ids::{EntityId, EntityKind};
use super::patient::PatientContext;
use super::radiation::RadiationSample;
use super::region::AnatomicalRegion;
use super::tumor::Tumor;
use crate::error::ValidationError;

/// Clinical values supplied by the caller when a session opens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicalSnapshot {
    pub regions: Vec<AnatomicalRegion>,
    pub tumors: Vec<Tumor>,
    pub radiation: Vec<RadiationSample>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Region(usize),
    Tumor(usize),
    Radiation(usize),
}

/// Borrowed view of any entity in the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Region(&'a AnatomicalRegion),
    Tumor(&'a Tumor),
    Radiation(&'a RadiationSample),
}

impl<'a> EntityRef<'a> {
    pub fn id(&self) -> &'a EntityId {
        match self {
            EntityRef::Region(r) => &r.id,
            EntityRef::Tumor(t) => &t.id,
            EntityRef::Radiation(s) => &s.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            EntityRef::Region(_) => EntityKind::Region,
            EntityRef::Tumor(_) => EntityKind::Tumor,
            EntityRef::Radiation(_) => EntityKind::RadiationSample,
        }
    }

    pub fn position(&self) -> Vec3 {
        match self {
            EntityRef::Region(r) => r.position,
            EntityRef::Tumor(t) => t.position,
            EntityRef::Radiation(s) => s.position,
        }
    }

    /// Display name: region name, tumor type or radiation target.
    pub fn display_name(&self) -> &'a str {
        match self {
            EntityRef::Region(r) => &r.name,
            EntityRef::Tumor(t) => &t.tumor_type,
            EntityRef::Radiation(s) => &s.target_area,
        }
    }
}

/// Validated, immutable entity store with O(1) id lookup.
///
/// There are no mutators: colors and animation are derived from the model,
/// never written back into it.
#[derive(Debug, Clone)]
pub struct EntityModel {
    patient: PatientContext,
    regions: Vec<AnatomicalRegion>,
    tumors: Vec<Tumor>,
    radiation: Vec<RadiationSample>,
    index: HashMap<EntityId, Slot>,
}

impl EntityModel {
    /// Validate `snapshot` and build the model.
    ///
    /// Fails on the first invalid value; nothing is clamped.
    pub fn build(
        patient: PatientContext,
        snapshot: ClinicalSnapshot,
    ) -> Result<Self, ValidationError> {
        let ClinicalSnapshot {
            regions,
            tumors,
            radiation,
        } = snapshot;

        let mut index = HashMap::with_capacity(regions.len() + tumors.len() + radiation.len());
        let mut insert = |id: &EntityId, slot: Slot| -> Result<(), ValidationError> {
            if index.insert(id.clone(), slot).is_some() {
                return Err(ValidationError::DuplicateId { id: id.to_string() });
            }
            Ok(())
        };

        for (i, region) in regions.iter().enumerate() {
            region.validate()?;
            insert(&region.id, Slot::Region(i))?;
        }
        for (i, tumor) in tumors.iter().enumerate() {
            tumor.validate()?;
            insert(&tumor.id, Slot::Tumor(i))?;
        }
        for (i, sample) in radiation.iter().enumerate() {
            sample.validate()?;
            insert(&sample.id, Slot::Radiation(i))?;
        }

        for tumor in &tumors {
            let region = match index.get(&tumor.region_id) {
                Some(Slot::Region(i)) => &regions[*i],
                _ => {
                    return Err(ValidationError::UnknownRegion {
                        tumor: tumor.id.to_string(),
                        region: tumor.region_id.to_string(),
                    })
                }
            };
            if !region.contains(tumor.position) {
                return Err(ValidationError::TumorOutsideRegion {
                    tumor: tumor.id.to_string(),
                    region: region.id.to_string(),
                });
            }
            if !region.tumor_present {
                warn!(
                    "Tumor {} placed in region {} which is not flagged tumor_present",
                    tumor.id, region.id
                );
            }
        }

        debug!(
            "Entity model built for patient {}: {} regions, {} tumors, {} radiation samples",
            patient.id,
            regions.len(),
            tumors.len(),
            radiation.len()
        );

        Ok(Self {
            patient,
            regions,
            tumors,
            radiation,
            index,
        })
    }

    pub fn patient(&self) -> &PatientContext {
        &self.patient
    }

    pub fn regions(&self) -> &[AnatomicalRegion] {
        &self.regions
    }

    pub fn tumors(&self) -> &[Tumor] {
        &self.tumors
    }

    pub fn radiation_samples(&self) -> &[RadiationSample] {
        &self.radiation
    }

    /// Look up any entity by id.
    pub fn get(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        self.index.get(id).map(|slot| match *slot {
            Slot::Region(i) => EntityRef::Region(&self.regions[i]),
            Slot::Tumor(i) => EntityRef::Tumor(&self.tumors[i]),
            Slot::Radiation(i) => EntityRef::Radiation(&self.radiation[i]),
        })
    }

    pub fn region(&self, id: &EntityId) -> Option<&AnatomicalRegion> {
        match self.index.get(id) {
            Some(Slot::Region(i)) => Some(&self.regions[*i]),
            _ => None,
        }
    }

    pub fn tumor(&self, id: &EntityId) -> Option<&Tumor> {
        match self.index.get(id) {
            Some(Slot::Tumor(i)) => Some(&self.tumors[*i]),
            _ => None,
        }
    }

    pub fn radiation_sample(&self, id: &EntityId) -> Option<&RadiationSample> {
        match self.index.get(id) {
            Some(Slot::Radiation(i)) => Some(&self.radiation[*i]),
            _ => None,
        }
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Tumors that reference `region_id`, in model order.
    pub fn tumors_in<'a>(&'a self, region_id: &'a EntityId) -> impl Iterator<Item = &'a Tumor> {
        self.tumors.iter().filter(move |t| &t.region_id == region_id)
    }

    /// Total number of entities across all collections.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Axis-aligned bounds of all regions, or `None` for an empty model.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut iter = self.regions.iter();
        let first = iter.next()?;
        let init = (
            first.position - first.half_extent(),
            first.position + first.half_extent(),
        );
        Some(iter.fold(init, |(min, max), r| {
            (
                min.min(r.position - r.half_extent()),
                max.max(r.position + r.half_extent()),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::color::Rgb;

    fn patient() -> PatientContext {
        PatientContext::new("P-001", "Jane Doe", 54, "NSCLC")
    }

    fn snapshot() -> ClinicalSnapshot {
        ClinicalSnapshot {
            regions: vec![
                AnatomicalRegion::new(
                    "lungs",
                    "Lungs",
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(1.0, 0.8, 0.6),
                    Rgb::from_u32(0xffb6c1),
                )
                .with_tumor()
                .with_dose(45.0),
                AnatomicalRegion::new(
                    "liver",
                    "Liver",
                    Vec3::new(0.3, 0.3, 0.0),
                    Vec3::new(0.6, 0.3, 0.4),
                    Rgb::from_u32(0x8b4513),
                )
                .with_damage(0.4),
            ],
            tumors: vec![Tumor::new("t1", "lungs", Vec3::new(0.2, 1.1, 0.0), 0.15)
                .with_malignancy(0.95)],
            radiation: vec![RadiationSample::new(
                "rad-1",
                Vec3::new(0.2, 1.1, 0.0),
                0.9,
                45.0,
                "Lung tumor",
            )],
        }
    }

    #[test]
    fn test_build_and_lookup() {
        let model = EntityModel::build(patient(), snapshot()).expect("valid model");
        assert_eq!(model.len(), 4);
        assert_eq!(model.patient().id, "P-001");

        let lungs = EntityId::from("lungs");
        assert_eq!(model.region(&lungs).map(|r| r.name.as_str()), Some("Lungs"));
        assert!(model.tumor(&lungs).is_none());
        assert_eq!(
            model.get(&EntityId::from("t1")).map(|e| e.kind()),
            Some(EntityKind::Tumor)
        );
        assert_eq!(model.tumors_in(&lungs).count(), 1);
        assert!(model.get(&EntityId::from("missing")).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut snap = snapshot();
        snap.radiation[0].id = EntityId::from("liver");
        let err = EntityModel::build(patient(), snap).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicateId {
                id: "liver".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_region_rejected() {
        let mut snap = snapshot();
        snap.tumors[0].region_id = EntityId::from("pancreas");
        assert!(matches!(
            EntityModel::build(patient(), snap),
            Err(ValidationError::UnknownRegion { .. })
        ));
    }

    #[test]
    fn test_tumor_outside_region_rejected() {
        let mut snap = snapshot();
        snap.tumors[0].position = Vec3::new(5.0, 5.0, 5.0);
        assert!(matches!(
            EntityModel::build(patient(), snap),
            Err(ValidationError::TumorOutsideRegion { .. })
        ));
    }

    #[test]
    fn test_invalid_value_halts_build() {
        let mut snap = snapshot();
        snap.radiation[0].dose = -3.0;
        assert!(EntityModel::build(patient(), snap).is_err());
    }

    #[test]
    fn test_bounds() {
        let model = EntityModel::build(patient(), snapshot()).unwrap();
        let (min, max) = model.bounds().unwrap();
        assert!(min.abs_diff_eq(Vec3::new(-0.5, 0.15, -0.3), 1e-6));
        assert!(max.abs_diff_eq(Vec3::new(0.6, 1.4, 0.3), 1e-6));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_out_of_range_damage_is_rejected(
                level in prop_oneof![-10.0f32..-0.001, 1.001f32..10.0]
            ) {
                let mut snap = snapshot();
                snap.regions[0].damage_level = level;
                let rejected = matches!(
                    EntityModel::build(patient(), snap),
                    Err(ValidationError::OutOfRange { field: "damage_level", .. })
                );
                prop_assert!(rejected);
            }

            #[test]
            fn prop_in_range_values_build(level in 0.0f32..=1.0, malignancy in 0.0f32..=1.0) {
                let mut snap = snapshot();
                snap.regions[0].damage_level = level;
                snap.tumors[0].malignancy = malignancy;
                let model = EntityModel::build(patient(), snap).unwrap();
                prop_assert_eq!(model.regions()[0].damage_level, level);
            }
        }
    }
}
