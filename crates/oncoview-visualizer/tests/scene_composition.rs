//! Composition, picking and posing over the reference anatomy and
//! generated models.

use glam::{Vec2, Vec3};
use oncoview_core::{
    reference_anatomy, AnalysisMode, AnatomicalRegion, ClinicalSnapshot, EntityId, EntityModel,
    PatientContext, RadiationSample, Rgb, Tumor, ViewState,
};
use oncoview_visualizer::{
    compose, pick_ray, pose, ColorizerConfig, Layer, OrbitController, PickOptions, Ray, Role,
};
use proptest::prelude::*;

fn reference_model() -> EntityModel {
    let patient = PatientContext::new("P-2024-001", "Sarah Johnson", 58, "Adenocarcinoma");
    let snapshot = reference_anatomy(&patient);
    EntityModel::build(patient, snapshot).expect("reference anatomy validates")
}

#[test]
fn test_mode_exclusivity_on_reference_anatomy() {
    let model = reference_model();
    let cfg = ColorizerConfig::default();

    for mode in AnalysisMode::ALL {
        let scene = compose(&model, &ViewState::new(mode), &cfg);
        let radiation = scene.in_layer(Layer::Radiation).count();
        let damage = scene.in_layer(Layer::Damage).count();
        let active_tumors = scene
            .with_role(Role::TumorCore)
            .filter(|p| !p.dimmed)
            .count();

        match mode {
            AnalysisMode::Radiation => {
                assert!(radiation > 0);
                assert_eq!(damage, 0);
                assert_eq!(active_tumors, 0);
            }
            AnalysisMode::Damage => {
                assert_eq!(radiation, 0);
                assert!(damage > 0);
                assert_eq!(active_tumors, 0);
            }
            AnalysisMode::Tumor => {
                assert_eq!(radiation, 0);
                assert_eq!(damage, 0);
                assert_eq!(active_tumors, model.tumors().len());
            }
        }
        assert_eq!(
            scene.with_role(Role::RegionBody).count(),
            model.regions().len()
        );
    }
}

#[test]
fn test_scene_order_is_stable_across_modes() {
    let model = reference_model();
    let cfg = ColorizerConfig::default();
    let radiation = compose(&model, &ViewState::new(AnalysisMode::Radiation), &cfg);
    let tumor = compose(&model, &ViewState::new(AnalysisMode::Tumor), &cfg);

    let bodies = |scene: &oncoview_visualizer::SceneDescription| -> Vec<EntityId> {
        scene
            .with_role(Role::RegionBody)
            .map(|p| p.entity.clone())
            .collect()
    };
    assert_eq!(bodies(&radiation), bodies(&tumor));
    assert_eq!(
        bodies(&radiation),
        model.regions().iter().map(|r| r.id.clone()).collect::<Vec<_>>()
    );
}

#[test]
fn test_click_through_camera_picks_head() {
    let model = reference_model();
    let scene = compose(
        &model,
        &ViewState::new(AnalysisMode::Tumor),
        &ColorizerConfig::default(),
    );

    let mut controller = OrbitController::default();
    controller.set_viewport(800.0, 600.0);
    let camera = *controller.camera();
    let head = model.region(&EntityId::from("head")).unwrap();
    let screen = camera.project(head.position, 800.0, 600.0).unwrap();

    let ray = controller.screen_ray(screen).unwrap();
    let hit = pick_ray(&scene, ray, PickOptions::default()).unwrap();
    assert_eq!(hit.entity, EntityId::from("head"));
}

#[test]
fn test_click_on_empty_space_misses() {
    let model = reference_model();
    let scene = compose(
        &model,
        &ViewState::new(AnalysisMode::Radiation),
        &ColorizerConfig::default(),
    );
    let mut controller = OrbitController::default();
    controller.set_viewport(800.0, 600.0);
    let ray = controller.screen_ray(Vec2::new(2.0, 2.0)).unwrap();
    assert!(pick_ray(&scene, ray, PickOptions::default()).is_none());
}

#[test]
fn test_posed_tumor_stays_inside_its_region() {
    let model = reference_model();
    let scene = compose(
        &model,
        &ViewState::new(AnalysisMode::Tumor),
        &ColorizerConfig::default(),
    );
    for i in 0..120 {
        let posed = pose(&scene, i as f64 / 30.0);
        for item in posed.items.iter().filter(|i| i.primitive.role == Role::TumorCore) {
            let tumor = model.tumor(&item.primitive.entity).unwrap();
            let region = model.region(&tumor.region_id).unwrap();
            let centre = item.world.transform_point3(Vec3::ZERO);
            // breathing moves everything by at most 1%
            assert!(centre.distance(tumor.position) <= tumor.position.length() * 0.011);
            assert!(region.contains(tumor.position));
        }
    }
}

fn arb_snapshot() -> impl Strategy<Value = ClinicalSnapshot> {
    proptest::collection::vec(
        (
            proptest::option::of(0.0f32..80.0),
            proptest::option::of(0.0f32..=1.0),
            0.0f32..=1.0,
            0.0f32..=1.0,
        ),
        1..12,
    )
    .prop_map(|rows| {
        let mut snapshot = ClinicalSnapshot::default();
        for (i, (dose, damage, malignancy, intensity)) in rows.into_iter().enumerate() {
            let position = Vec3::new(i as f32 * 1.5, 0.0, 0.0);
            let mut region = AnatomicalRegion::new(
                format!("r{}", i),
                format!("Region {}", i),
                position,
                Vec3::ONE,
                Rgb::from_u32(0x808080),
            );
            region.radiation_dose = dose;
            if let Some(level) = damage {
                region = region.with_damage(level);
            }
            if i % 2 == 0 {
                region = region.with_tumor();
                snapshot.tumors.push(
                    Tumor::new(format!("t{}", i), format!("r{}", i), position, 0.2)
                        .with_malignancy(malignancy),
                );
            }
            snapshot.regions.push(region);
            snapshot.radiation.push(RadiationSample::new(
                format!("f{}", i),
                position,
                intensity,
                dose.unwrap_or(0.0),
                format!("Target {}", i),
            ));
        }
        snapshot
    })
}

proptest! {
    #[test]
    fn prop_overlays_never_mix(snapshot in arb_snapshot(), labels in any::<bool>()) {
        let patient = PatientContext::new("P", "Prop", 40, "");
        let model = EntityModel::build(patient, snapshot).unwrap();
        let cfg = ColorizerConfig::default();

        for mode in AnalysisMode::ALL {
            let mut view = ViewState::new(mode);
            view.show_labels = labels;
            let scene = compose(&model, &view, &cfg);

            for p in scene.iter() {
                prop_assert!((0.0..=1.0).contains(&p.appearance.opacity));
                prop_assert!((0.0..=1.0).contains(&p.appearance.emissive));
                match p.layer() {
                    Layer::Radiation => prop_assert_eq!(mode, AnalysisMode::Radiation),
                    Layer::Damage => prop_assert_eq!(mode, AnalysisMode::Damage),
                    Layer::Tumor if mode != AnalysisMode::Tumor => {
                        prop_assert!(p.dimmed);
                        prop_assert!(p.appearance.opacity <= 0.3);
                    }
                    _ => {}
                }
            }
            if !labels {
                prop_assert_eq!(scene.labels().count(), 0);
            } else if mode == AnalysisMode::Radiation {
                prop_assert_eq!(scene.labels().count(), model.radiation_samples().len());
            }
            prop_assert_eq!(&compose(&model, &view, &cfg), &scene);
        }
    }

    #[test]
    fn prop_rays_from_inside_a_region_hit_it(x in -0.45f32..0.45, y in -0.45f32..0.45) {
        let white = Rgb::from_u32(0xffffff);
        let region = AnatomicalRegion::new("solo", "Solo", Vec3::ZERO, Vec3::ONE, white);
        let snapshot = ClinicalSnapshot { regions: vec![region], ..Default::default() };
        let model = EntityModel::build(PatientContext::new("P", "Q", 1, ""), snapshot).unwrap();
        let view = ViewState::new(AnalysisMode::Tumor);
        let scene = compose(&model, &view, &ColorizerConfig::default());
        let ray = Ray::new(Vec3::new(x, y, 5.0), Vec3::NEG_Z).unwrap();
        let hit = pick_ray(&scene, ray, PickOptions::default()).unwrap();
        prop_assert_eq!(hit.entity, EntityId::from("solo"));
        prop_assert!((hit.distance - 4.5).abs() < 1e-4);
    }
}
