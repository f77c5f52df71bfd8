//! # Colorizer
//!
//! Pure mapping from clinical values and the active analysis mode to the
//! appearance of a primitive. Nothing here touches the entity model; every
//! function returns a fresh [`Appearance`].

use oncoview_core::{AnalysisMode, AnatomicalRegion, RadiationSample, Rgb, Tumor, ValidationError};
use serde::{Deserialize, Serialize};

/// Color, opacity and emissive strength of one primitive.
///
/// Opacity and emissive are always inside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub color: Rgb,
    pub opacity: f32,
    pub emissive: f32,
}

impl Appearance {
    pub fn new(color: Rgb, opacity: f32, emissive: f32) -> Self {
        Self {
            color,
            opacity: unit(opacity),
            emissive: unit(emissive),
        }
    }

    /// Multiply the opacity by `factor`.
    pub fn scaled_opacity(self, factor: f32) -> Self {
        Self::new(self.color, self.opacity * factor, self.emissive)
    }

    /// Add a selection glow on top of the current emissive strength.
    pub fn highlighted(self, boost: f32) -> Self {
        Self::new(self.color, self.opacity, self.emissive + boost)
    }

    /// RGBA as linear floats, for GPU upload.
    pub fn rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.color.to_f32();
        [r, g, b, self.opacity]
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Color ramps and thresholds used by the colorizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorizerConfig {
    /// Dose at which the radiation ramp saturates (Gy)
    pub dose_ceiling_gy: f32,
    /// End of the radiation ramp
    pub warning_color: Rgb,
    /// End of the damage ramp
    pub alarm_color: Rgb,
    /// Start of the damage-marker ramp
    pub marker_color: Rgb,
    /// Tumor color at or above `critical_malignancy`
    pub tumor_critical_color: Rgb,
    /// Tumor color below `critical_malignancy`
    pub tumor_color: Rgb,
    pub critical_malignancy: f32,
    /// Radiation field color at intensity 0
    pub field_low_color: Rgb,
    /// Radiation field color at intensity 1
    pub field_high_color: Rgb,
    /// Opacity of overlays that are present but inactive
    pub dim_opacity: f32,
    pub dim_emissive: f32,
    /// Emissive strength at the top of every ramp
    pub max_emissive: f32,
    /// Extra emissive added to the selected entity
    pub selection_emissive: f32,
}

impl Default for ColorizerConfig {
    fn default() -> Self {
        Self {
            dose_ceiling_gy: 50.0,
            warning_color: Rgb::from_u32(0xff4500),
            alarm_color: Rgb::from_u32(0xff0000),
            marker_color: Rgb::from_u32(0xffa500),
            tumor_critical_color: Rgb::from_u32(0xff0000),
            tumor_color: Rgb::from_u32(0xff6600),
            critical_malignancy: 0.8,
            field_low_color: Rgb::from_u32(0xffff00),
            field_high_color: Rgb::from_u32(0xff0000),
            dim_opacity: 0.3,
            dim_emissive: 0.1,
            max_emissive: 0.6,
            selection_emissive: 0.35,
        }
    }
}

impl ColorizerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        const OWNER: &str = "colorizer";
        ValidationError::check_positive(OWNER, "dose_ceiling_gy", self.dose_ceiling_gy)?;
        ValidationError::check_range(
            OWNER,
            "critical_malignancy",
            self.critical_malignancy,
            0.0,
            1.0,
            "[0, 1]",
        )?;
        ValidationError::check_range(OWNER, "dim_opacity", self.dim_opacity, 0.0, 0.3, "[0, 0.3]")?;
        for (field, value) in [
            ("dim_emissive", self.dim_emissive),
            ("max_emissive", self.max_emissive),
            ("selection_emissive", self.selection_emissive),
        ] {
            ValidationError::check_range(OWNER, field, value, 0.0, 1.0, "[0, 1]")?;
        }
        for (field, color) in [
            ("warning_color", self.warning_color),
            ("alarm_color", self.alarm_color),
            ("marker_color", self.marker_color),
            ("tumor_critical_color", self.tumor_critical_color),
            ("tumor_color", self.tumor_color),
            ("field_low_color", self.field_low_color),
            ("field_high_color", self.field_high_color),
        ] {
            if !color.is_valid() {
                return Err(ValidationError::InvalidColor {
                    entity: format!("{}.{}", OWNER, field),
                    value: format!("{:?}", color),
                });
            }
        }
        Ok(())
    }

    /// Normalized dose in `[0, 1]`.
    pub fn dose_fraction(&self, dose_gy: f32) -> f32 {
        unit(dose_gy / self.dose_ceiling_gy)
    }

    /// Body color of a tumor, chosen by malignancy.
    pub fn tumor_color_for(&self, malignancy: f32) -> Rgb {
        if malignancy >= self.critical_malignancy {
            self.tumor_critical_color
        } else {
            self.tumor_color
        }
    }
}

/// Appearance of an anatomical region box under `mode`.
///
/// Radiation mode ramps regions with a dose toward the warning color,
/// damage mode ramps affected regions toward the alarm color, and tumor
/// mode leaves the base color untouched.
pub fn color_for(
    region: &AnatomicalRegion,
    mode: AnalysisMode,
    cfg: &ColorizerConfig,
) -> Appearance {
    let ramp = match mode {
        AnalysisMode::Radiation => region
            .radiation_dose
            .map(|dose| (cfg.warning_color, cfg.dose_fraction(dose))),
        AnalysisMode::Damage if region.is_affected => {
            Some((cfg.alarm_color, unit(region.damage_level)))
        }
        AnalysisMode::Damage | AnalysisMode::Tumor => None,
    };

    match ramp {
        Some((target, t)) => Appearance::new(
            region.color.lerp(target, t),
            region.base_opacity,
            t * cfg.max_emissive,
        ),
        None => Appearance::new(region.color, region.base_opacity, 0.0),
    }
}

/// Appearance of a tumor core sphere. Dim unless `mode` is tumor analysis.
pub fn tumor_appearance(tumor: &Tumor, mode: AnalysisMode, cfg: &ColorizerConfig) -> Appearance {
    let color = cfg.tumor_color_for(tumor.malignancy);
    if mode == AnalysisMode::Tumor {
        Appearance::new(color, 0.9, 0.3 + 0.3 * tumor.malignancy)
    } else {
        Appearance::new(color, cfg.dim_opacity, cfg.dim_emissive)
    }
}

/// Appearance of the translucent shell around a tumor.
pub fn tumor_glow_appearance(
    tumor: &Tumor,
    mode: AnalysisMode,
    cfg: &ColorizerConfig,
) -> Appearance {
    let color = cfg.tumor_color_for(tumor.malignancy);
    if mode == AnalysisMode::Tumor {
        Appearance::new(color, 0.3, 0.2 + 0.2 * tumor.malignancy)
    } else {
        Appearance::new(color, cfg.dim_opacity * 0.5, cfg.dim_emissive * 0.5)
    }
}

/// Appearance of a radiation field sphere, driven by intensity.
pub fn radiation_appearance(sample: &RadiationSample, cfg: &ColorizerConfig) -> Appearance {
    let t = unit(sample.intensity);
    Appearance::new(
        cfg.field_low_color.lerp(cfg.field_high_color, t),
        0.2 + 0.3 * t,
        t * cfg.max_emissive,
    )
}

/// Appearance of the beam running from a radiation field down to its target.
pub fn radiation_beam_appearance(sample: &RadiationSample, cfg: &ColorizerConfig) -> Appearance {
    let t = unit(sample.intensity);
    Appearance::new(
        cfg.field_low_color.lerp(cfg.field_high_color, t),
        0.15 + 0.2 * t,
        0.5 * t * cfg.max_emissive,
    )
}

/// Appearance of the particle cluster marking a damaged region.
pub fn damage_marker_appearance(region: &AnatomicalRegion, cfg: &ColorizerConfig) -> Appearance {
    let t = unit(region.damage_level);
    Appearance::new(
        cfg.marker_color.lerp(cfg.alarm_color, t),
        0.8,
        t * cfg.max_emissive,
    )
}

/// Appearance of the wireframe box around a damaged region.
pub fn damage_bounds_appearance(region: &AnatomicalRegion, cfg: &ColorizerConfig) -> Appearance {
    let t = unit(region.damage_level);
    Appearance::new(cfg.alarm_color, 0.2 + 0.5 * t, 0.5 * t * cfg.max_emissive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use oncoview_core::EntityId;
    use proptest::prelude::*;

    fn region() -> AnatomicalRegion {
        AnatomicalRegion::new(
            "left-lung",
            "Left Lung",
            Vec3::new(-0.3, 1.7, 0.0),
            Vec3::new(0.4, 0.6, 0.3),
            Rgb::from_u32(0xffb6c1),
        )
    }

    #[test]
    fn test_radiation_ramp_saturates_at_ceiling() {
        let cfg = ColorizerConfig::default();
        let at_ceiling = color_for(&region().with_dose(50.0), AnalysisMode::Radiation, &cfg);
        let above = color_for(&region().with_dose(80.0), AnalysisMode::Radiation, &cfg);
        assert_eq!(at_ceiling, above);
        assert_eq!(at_ceiling.color, cfg.warning_color);
        assert!((at_ceiling.emissive - cfg.max_emissive).abs() < 1e-6);
    }

    #[test]
    fn test_radiation_without_dose_keeps_base_color() {
        let cfg = ColorizerConfig::default();
        let a = color_for(&region(), AnalysisMode::Radiation, &cfg);
        assert_eq!(a.color, region().color);
        assert_eq!(a.emissive, 0.0);
        assert!((a.opacity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_damage_mode_only_ramps_affected_regions() {
        let cfg = ColorizerConfig::default();
        let healthy = color_for(&region(), AnalysisMode::Damage, &cfg);
        assert_eq!(healthy.color, region().color);

        let damaged = color_for(&region().with_damage(1.0), AnalysisMode::Damage, &cfg);
        assert_eq!(damaged.color, cfg.alarm_color);
    }

    #[test]
    fn test_tumor_mode_uses_base_color() {
        let cfg = ColorizerConfig::default();
        let r = region().with_dose(45.0).with_damage(0.6);
        assert_eq!(color_for(&r, AnalysisMode::Tumor, &cfg).color, r.color);
    }

    #[test]
    fn test_tumor_palette_and_dimming() {
        let cfg = ColorizerConfig::default();
        let tumor = Tumor::new("t", "left-lung", Vec3::new(-0.3, 1.7, 0.0), 0.1);

        let critical = tumor.clone().with_malignancy(0.95);
        let moderate = tumor.with_malignancy(0.7);
        assert_eq!(
            tumor_appearance(&critical, AnalysisMode::Tumor, &cfg).color,
            cfg.tumor_critical_color
        );
        assert_eq!(
            tumor_appearance(&moderate, AnalysisMode::Tumor, &cfg).color,
            cfg.tumor_color
        );

        let dim = tumor_appearance(&critical, AnalysisMode::Radiation, &cfg);
        assert!(dim.opacity <= 0.3);
        assert!(tumor_glow_appearance(&critical, AnalysisMode::Damage, &cfg).opacity <= 0.3);
    }

    #[test]
    fn test_radiation_field_intensity_ramp() {
        let cfg = ColorizerConfig::default();
        let mut sample = RadiationSample::new("f", Vec3::ZERO, 0.0, 10.0, "Spine");
        assert_eq!(radiation_appearance(&sample, &cfg).color, cfg.field_low_color);
        sample.intensity = 1.0;
        let hot = radiation_appearance(&sample, &cfg);
        assert_eq!(hot.color, cfg.field_high_color);
        assert!((hot.opacity - 0.5).abs() < 1e-6);
        assert_eq!(sample.id, EntityId::from("f"));
    }

    #[test]
    fn test_config_validation() {
        let mut cfg = ColorizerConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.dim_opacity = 0.5;
        assert!(cfg.validate().is_err());
        cfg = ColorizerConfig {
            dose_ceiling_gy: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_rejects_out_of_range_palette() {
        let cfg = ColorizerConfig {
            warning_color: Rgb::new(2.0, 0.27, 0.0),
            ..Default::default()
        };
        match cfg.validate() {
            Err(ValidationError::InvalidColor { entity, .. }) => {
                assert_eq!(entity, "colorizer.warning_color")
            }
            other => panic!("expected invalid color, got {:?}", other),
        }

        let cfg = ColorizerConfig {
            field_low_color: Rgb::new(1.0, f32::NAN, 0.0),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    fn any_mode() -> impl Strategy<Value = AnalysisMode> {
        prop_oneof![
            Just(AnalysisMode::Radiation),
            Just(AnalysisMode::Damage),
            Just(AnalysisMode::Tumor),
        ]
    }

    proptest! {
        #[test]
        fn prop_region_appearance_is_bounded(
            dose in proptest::option::of(0.0f32..500.0),
            damage in 0.0f32..=1.0,
            opacity in 0.0f32..=1.0,
            mode in any_mode(),
        ) {
            let cfg = ColorizerConfig::default();
            let mut r = region().with_opacity(opacity).with_damage(damage);
            r.radiation_dose = dose;
            let a = color_for(&r, mode, &cfg);
            prop_assert!((0.0..=1.0).contains(&a.opacity));
            prop_assert!((0.0..=1.0).contains(&a.emissive));
        }

        #[test]
        fn prop_dose_ramp_is_monotonic(a in 0.0f32..100.0, b in 0.0f32..100.0) {
            let cfg = ColorizerConfig::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let e_lo = color_for(&region().with_dose(lo), AnalysisMode::Radiation, &cfg).emissive;
            let e_hi = color_for(&region().with_dose(hi), AnalysisMode::Radiation, &cfg).emissive;
            prop_assert!(e_lo <= e_hi + 1e-6);
        }

        #[test]
        fn prop_dim_tumors_stay_dim(malignancy in 0.0f32..=1.0) {
            let cfg = ColorizerConfig::default();
            let t = Tumor::new("t", "r", Vec3::ZERO, 0.1).with_malignancy(malignancy);
            for mode in [AnalysisMode::Radiation, AnalysisMode::Damage] {
                prop_assert!(tumor_appearance(&t, mode, &cfg).opacity <= 0.3);
            }
        }
    }
}
