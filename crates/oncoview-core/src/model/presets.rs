//! Reference anatomy shown by the dashboard.
//!
//! The dashboard has no imaging backend; every patient is displayed on the
//! same procedural body with illustrative clinical values. Coordinates are
//! Y-up world units with the feet near `y = -1.3` and the head near `y = 2.9`.

use glam::Vec3;

use super::color::Rgb;
use super::entity_model::ClinicalSnapshot;
use super::patient::PatientContext;
use super::radiation::RadiationSample;
use super::region::AnatomicalRegion;
use super::tumor::Tumor;

const SKIN: Rgb = Rgb::from_u32(0xffdbac);
const LUNG: Rgb = Rgb::from_u32(0xffb6c1);
const HEART: Rgb = Rgb::from_u32(0xdc143c);
const LIVER: Rgb = Rgb::from_u32(0x8b4513);
const STOMACH: Rgb = Rgb::from_u32(0xdda0dd);
const KIDNEY: Rgb = Rgb::from_u32(0x8b0000);
const BONE: Rgb = Rgb::from_u32(0xf5f5dc);

/// Build the reference dataset for `patient`.
///
/// The primary lung tumor is labelled with the patient's condition.
pub fn reference_anatomy(patient: &PatientContext) -> ClinicalSnapshot {
    let regions = vec![
        AnatomicalRegion::new(
            "head",
            "Head",
            Vec3::new(0.0, 2.6, 0.0),
            Vec3::new(0.5, 0.6, 0.5),
            SKIN,
        ),
        AnatomicalRegion::new(
            "torso",
            "Torso",
            Vec3::new(0.0, 1.4, 0.0),
            Vec3::new(1.2, 1.6, 0.6),
            SKIN,
        )
        .with_opacity(0.3),
        AnatomicalRegion::new(
            "left-lung",
            "Left Lung",
            Vec3::new(-0.28, 1.65, 0.0),
            Vec3::new(0.4, 0.7, 0.4),
            LUNG,
        )
        .with_dose(45.0)
        .with_damage(0.6)
        .with_tumor(),
        AnatomicalRegion::new(
            "right-lung",
            "Right Lung",
            Vec3::new(0.28, 1.65, 0.0),
            Vec3::new(0.4, 0.7, 0.4),
            LUNG,
        )
        .with_dose(38.0)
        .with_damage(0.35),
        AnatomicalRegion::new(
            "heart",
            "Heart",
            Vec3::new(0.05, 1.5, 0.1),
            Vec3::new(0.25, 0.3, 0.2),
            HEART,
        )
        .with_opacity(0.9)
        .with_dose(18.0)
        .with_damage(0.2),
        AnatomicalRegion::new(
            "liver",
            "Liver",
            Vec3::new(0.25, 0.95, 0.05),
            Vec3::new(0.5, 0.3, 0.35),
            LIVER,
        )
        .with_dose(30.0)
        .with_damage(0.45)
        .with_tumor(),
        AnatomicalRegion::new(
            "stomach",
            "Stomach",
            Vec3::new(-0.2, 0.95, 0.05),
            Vec3::new(0.3, 0.25, 0.25),
            STOMACH,
        ),
        AnatomicalRegion::new(
            "left-kidney",
            "Left Kidney",
            Vec3::new(-0.2, 0.7, -0.1),
            Vec3::new(0.15, 0.25, 0.15),
            KIDNEY,
        ),
        AnatomicalRegion::new(
            "right-kidney",
            "Right Kidney",
            Vec3::new(0.2, 0.7, -0.1),
            Vec3::new(0.15, 0.25, 0.15),
            KIDNEY,
        ),
        AnatomicalRegion::new(
            "spine",
            "Spine",
            Vec3::new(0.0, 1.3, -0.25),
            Vec3::new(0.12, 1.9, 0.12),
            BONE,
        )
        .with_opacity(0.9)
        .with_dose(12.0)
        .with_damage(0.1),
        AnatomicalRegion::new(
            "pelvis",
            "Pelvis",
            Vec3::new(0.0, 0.45, 0.0),
            Vec3::new(0.9, 0.3, 0.5),
            BONE,
        )
        .with_opacity(0.6),
        AnatomicalRegion::new(
            "left-arm",
            "Left Arm",
            Vec3::new(-0.8, 1.5, 0.0),
            Vec3::new(0.2, 1.2, 0.2),
            SKIN,
        )
        .with_opacity(0.5),
        AnatomicalRegion::new(
            "right-arm",
            "Right Arm",
            Vec3::new(0.8, 1.5, 0.0),
            Vec3::new(0.2, 1.2, 0.2),
            SKIN,
        )
        .with_opacity(0.5),
        AnatomicalRegion::new(
            "left-leg",
            "Left Leg",
            Vec3::new(-0.25, -0.5, 0.0),
            Vec3::new(0.25, 1.6, 0.25),
            SKIN,
        )
        .with_opacity(0.5),
        AnatomicalRegion::new(
            "right-leg",
            "Right Leg",
            Vec3::new(0.25, -0.5, 0.0),
            Vec3::new(0.25, 1.6, 0.25),
            SKIN,
        )
        .with_opacity(0.5),
    ];

    let primary_type = if patient.condition.trim().is_empty() {
        "Adenocarcinoma".to_string()
    } else {
        patient.condition.clone()
    };

    let tumors = vec![
        Tumor::new(
            "tumor-primary",
            "left-lung",
            Vec3::new(-0.3, 1.75, 0.05),
            0.15,
        )
        .with_classification(primary_type, "IIIA")
        .with_growth_rate(0.3)
        .with_malignancy(0.95),
        Tumor::new("tumor-metastasis", "liver", Vec3::new(0.3, 0.95, 0.1), 0.08)
            .with_classification("Metastatic lesion", "IV")
            .with_growth_rate(0.15)
            .with_malignancy(0.70),
    ];

    let radiation = vec![
        RadiationSample::new(
            "field-lung",
            Vec3::new(-0.3, 1.75, 0.05),
            0.9,
            45.0,
            "Primary tumor",
        ),
        RadiationSample::new(
            "field-liver",
            Vec3::new(0.3, 0.95, 0.1),
            0.6,
            30.0,
            "Liver metastasis",
        ),
        RadiationSample::new(
            "field-mediastinum",
            Vec3::new(0.0, 1.55, 0.05),
            0.4,
            20.0,
            "Mediastinal nodes",
        ),
        RadiationSample::new(
            "field-spine",
            Vec3::new(0.0, 1.6, -0.25),
            0.25,
            12.0,
            "Spinal cord (OAR)",
        ),
    ];

    ClinicalSnapshot {
        regions,
        tumors,
        radiation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityModel;

    #[test]
    fn test_reference_anatomy_is_valid() {
        let patient = PatientContext::new("P-1", "A", 60, "NSCLC");
        let snapshot = reference_anatomy(&patient);
        let model = EntityModel::build(patient, snapshot).expect("preset must validate");
        assert_eq!(model.regions().len(), 15);
        assert_eq!(model.tumors().len(), 2);
        assert_eq!(model.radiation_samples().len(), 4);
        assert_eq!(model.tumors()[0].tumor_type, "NSCLC");
    }
}
