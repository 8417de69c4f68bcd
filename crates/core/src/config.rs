//! Construction-time configuration for both rendering modes.
//!
//! Every struct has a `Default` carrying the tuned constants, serializes to
//! JSON for inspection, and builds from a partial JSON override object via
//! `from_json` (missing or mistyped keys keep their defaults). Range checks
//! live in `validate`, which scene constructors call before building a field.

use crate::color::Srgb;
use crate::error::FieldError;
use crate::params::{param_color, param_f64, param_pair, param_string, param_string_list, param_usize};
use serde::{Deserialize, Serialize};
use serde_json::Value;

static NO_OVERRIDES: Value = Value::Null;

fn section<'a>(params: &'a Value, name: &str) -> &'a Value {
    params.get(name).unwrap_or(&NO_OVERRIDES)
}

fn invalid(name: &str, reason: &str) -> FieldError {
    FieldError::InvalidConfig {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<(), FieldError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(name, "must lie in [0, 1]"))
    }
}

fn check_positive(name: &str, value: f64) -> Result<(), FieldError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be positive"))
    }
}

/// Physics constants for glyph particles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlyphPhysics {
    /// Spring factor pulling an idle particle toward its breathing target.
    pub ease: f64,
    /// Velocity retained per tick while the pointer is inside the radius.
    pub interaction_friction: f64,
    /// Velocity retained per tick while idle.
    pub idle_friction: f64,
    /// Lower bound of the per-particle repulsion density.
    pub density_base: f64,
    /// Width of the random range added on top of `density_base`.
    pub density_random: f64,
    pub interaction_radius: f64,
    /// Idle clock increment per tick.
    pub breathing_speed: f64,
    pub breathing_position: f64,
    pub breathing_size: f64,
    /// Phase advance per unit of origin y, spreading the breath into a wave.
    pub breathing_frequency: f64,
    /// Upper bound of the random per-particle phase offset, in radians.
    pub phase_jitter: f64,
}

impl Default for GlyphPhysics {
    fn default() -> Self {
        Self {
            ease: 0.005,
            interaction_friction: 0.46,
            idle_friction: 0.90,
            density_base: 25.0,
            density_random: 3.0,
            interaction_radius: 100.0,
            breathing_speed: 0.03,
            breathing_position: 2.5,
            breathing_size: 1.0,
            breathing_frequency: 0.05,
            phase_jitter: 0.5,
        }
    }
}

impl GlyphPhysics {
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            ease: param_f64(params, "ease", d.ease),
            interaction_friction: param_f64(params, "interaction_friction", d.interaction_friction),
            idle_friction: param_f64(params, "idle_friction", d.idle_friction),
            density_base: param_f64(params, "density_base", d.density_base),
            density_random: param_f64(params, "density_random", d.density_random),
            interaction_radius: param_f64(params, "interaction_radius", d.interaction_radius),
            breathing_speed: param_f64(params, "breathing_speed", d.breathing_speed),
            breathing_position: param_f64(params, "breathing_position", d.breathing_position),
            breathing_size: param_f64(params, "breathing_size", d.breathing_size),
            breathing_frequency: param_f64(params, "breathing_frequency", d.breathing_frequency),
            phase_jitter: param_f64(params, "phase_jitter", d.phase_jitter),
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_unit_interval("ease", self.ease)?;
        // Friction of exactly 1 never settles.
        if !(0.0..1.0).contains(&self.interaction_friction) {
            return Err(invalid("interaction_friction", "must lie in [0, 1)"));
        }
        if !(0.0..1.0).contains(&self.idle_friction) {
            return Err(invalid("idle_friction", "must lie in [0, 1)"));
        }
        if self.density_base < 0.0 || self.density_random < 0.0 {
            return Err(invalid("density", "must be non-negative"));
        }
        check_positive("interaction_radius", self.interaction_radius)?;
        if self.phase_jitter < 0.0 {
            return Err(invalid("phase_jitter", "must be non-negative"));
        }
        Ok(())
    }
}

/// Configuration of the 2-D text field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlyphFieldConfig {
    pub text: String,
    pub font_size: f64,
    /// Class names of the hosting element, carried into log output.
    pub class_name: String,
    /// Glyphs particles are drawn with; each char is one symbol.
    pub alphabet: String,
    pub base_color: Srgb,
    pub hover_color: Srgb,
    pub shadow_color: Srgb,
    pub base_size: f64,
    /// Sampling step in surface pixels.
    pub gap: usize,
    /// Alpha above which a raster cell counts as covered.
    pub alpha_threshold: u8,
    pub shadow_offset: [f64; 2],
    /// Shortest glyph swap interval in frames.
    pub swap_interval_min: usize,
    /// Width of the random range added to `swap_interval_min`.
    pub swap_interval_span: usize,
    pub physics: GlyphPhysics,
}

impl Default for GlyphFieldConfig {
    fn default() -> Self {
        Self {
            text: "NXL".to_string(),
            font_size: 128.0,
            class_name: String::new(),
            alphabet: "NXL".to_string(),
            base_color: Srgb::WHITE,
            hover_color: Srgb::WHITE,
            shadow_color: Srgb {
                r: 68.0 / 255.0,
                g: 68.0 / 255.0,
                b: 68.0 / 255.0,
            },
            base_size: 4.0,
            gap: 2,
            alpha_threshold: 128,
            shadow_offset: [2.0, 2.0],
            swap_interval_min: 10,
            swap_interval_span: 100,
            physics: GlyphPhysics::default(),
        }
    }
}

impl GlyphFieldConfig {
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        let threshold = param_usize(params, "alpha_threshold", d.alpha_threshold as usize);
        Self {
            text: param_string(params, "text", &d.text),
            font_size: param_f64(params, "font_size", d.font_size),
            class_name: param_string(params, "class_name", &d.class_name),
            alphabet: param_string(params, "alphabet", &d.alphabet),
            base_color: param_color(params, "base_color", d.base_color),
            hover_color: param_color(params, "hover_color", d.hover_color),
            shadow_color: param_color(params, "shadow_color", d.shadow_color),
            base_size: param_f64(params, "base_size", d.base_size),
            gap: param_usize(params, "gap", d.gap),
            alpha_threshold: u8::try_from(threshold).unwrap_or(d.alpha_threshold),
            shadow_offset: param_pair(params, "shadow_offset", d.shadow_offset),
            swap_interval_min: param_usize(params, "swap_interval_min", d.swap_interval_min),
            swap_interval_span: param_usize(params, "swap_interval_span", d.swap_interval_span),
            physics: GlyphPhysics::from_json(section(params, "physics")),
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.gap == 0 {
            return Err(invalid("gap", "must be at least 1"));
        }
        if self.alphabet.is_empty() {
            return Err(invalid("alphabet", "must contain at least one glyph"));
        }
        if self.swap_interval_min == 0 {
            return Err(invalid("swap_interval_min", "must be at least 1"));
        }
        check_positive("font_size", self.font_size)?;
        check_positive("base_size", self.base_size)?;
        self.physics.validate()
    }

    /// The glyph alphabet as individual symbols.
    pub fn glyphs(&self) -> Vec<char> {
        self.alphabet.chars().collect()
    }
}

/// Physics constants for point particles.
///
/// Points approach their target with `velocity = velocity * retention +
/// (target - position) * ease`; a retention of 0 makes each tick a plain lerp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPhysics {
    pub ease: f64,
    pub retention: f64,
    /// Radius in pointer space (normalized device coordinates scaled by 2).
    pub interaction_radius: f64,
    /// Push distance at zero pointer distance.
    pub push: f64,
    pub wave_amplitude: f64,
    pub wave_frequency: f64,
    pub wave_speed: f64,
    /// Idle clock increment per tick, in seconds at 60 frames per second.
    pub clock_step: f64,
    pub phase_jitter: f64,
}

impl Default for PointPhysics {
    fn default() -> Self {
        Self {
            ease: 0.1,
            retention: 0.0,
            interaction_radius: 0.5,
            push: 0.2,
            wave_amplitude: 0.1,
            wave_frequency: 0.5,
            wave_speed: 0.7,
            clock_step: 1.0 / 60.0,
            phase_jitter: 0.0,
        }
    }
}

impl PointPhysics {
    /// Defaults for asset singletons, which drift slower than the ambient cloud.
    pub fn assets() -> Self {
        Self {
            wave_speed: 0.5,
            ..Self::default()
        }
    }

    pub fn from_json(params: &Value, defaults: Self) -> Self {
        let d = defaults;
        Self {
            ease: param_f64(params, "ease", d.ease),
            retention: param_f64(params, "retention", d.retention),
            interaction_radius: param_f64(params, "interaction_radius", d.interaction_radius),
            push: param_f64(params, "push", d.push),
            wave_amplitude: param_f64(params, "wave_amplitude", d.wave_amplitude),
            wave_frequency: param_f64(params, "wave_frequency", d.wave_frequency),
            wave_speed: param_f64(params, "wave_speed", d.wave_speed),
            clock_step: param_f64(params, "clock_step", d.clock_step),
            phase_jitter: param_f64(params, "phase_jitter", d.phase_jitter),
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        check_unit_interval("ease", self.ease)?;
        if !(0.0..1.0).contains(&self.retention) {
            return Err(invalid("retention", "must lie in [0, 1)"));
        }
        check_positive("interaction_radius", self.interaction_radius)?;
        check_positive("clock_step", self.clock_step)?;
        if self.phase_jitter < 0.0 {
            return Err(invalid("phase_jitter", "must be non-negative"));
        }
        Ok(())
    }
}

/// Configuration of the 3-D point cloud.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointCloudConfig {
    pub ambient_count: usize,
    pub shell_inner_radius: f64,
    pub shell_thickness: f64,
    /// Gradient color at y = -1.5.
    pub gradient_low: Srgb,
    /// Gradient color at y = +1.5.
    pub gradient_high: Srgb,
    pub point_size: f64,
    pub opacity: f64,
    pub asset_size: f64,
    pub asset_opacity: f64,
    /// Full extents of the box asset singletons are scattered in.
    pub asset_box: [f64; 3],
    pub assets: Vec<String>,
    pub camera_fov_degrees: f64,
    pub camera_distance: f64,
    /// Cloud rotation about y, in radians per unit of idle time.
    pub spin: f64,
    pub ambient: PointPhysics,
    pub asset_physics: PointPhysics,
}

impl Default for PointCloudConfig {
    fn default() -> Self {
        Self {
            ambient_count: 20_000,
            shell_inner_radius: 1.0,
            shell_thickness: 2.0,
            gradient_low: Srgb {
                r: 0x5e as f64 / 255.0,
                g: 0x72 as f64 / 255.0,
                b: 0xe4 as f64 / 255.0,
            },
            gradient_high: Srgb {
                r: 0x89 as f64 / 255.0,
                g: 0x65 as f64 / 255.0,
                b: 0xe0 as f64 / 255.0,
            },
            point_size: 0.012,
            opacity: 0.8,
            asset_size: 0.2,
            asset_opacity: 0.8,
            asset_box: [10.0, 6.0, 4.0],
            assets: Vec::new(),
            camera_fov_degrees: 75.0,
            camera_distance: 3.0,
            spin: 0.05,
            ambient: PointPhysics::default(),
            asset_physics: PointPhysics::assets(),
        }
    }
}

impl PointCloudConfig {
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        let asset_box = params
            .get("asset_box")
            .and_then(Value::as_array)
            .and_then(|items| match items.as_slice() {
                [x, y, z] => Some([x.as_f64()?, y.as_f64()?, z.as_f64()?]),
                _ => None,
            })
            .unwrap_or(d.asset_box);
        Self {
            ambient_count: param_usize(params, "ambient_count", d.ambient_count),
            shell_inner_radius: param_f64(params, "shell_inner_radius", d.shell_inner_radius),
            shell_thickness: param_f64(params, "shell_thickness", d.shell_thickness),
            gradient_low: param_color(params, "gradient_low", d.gradient_low),
            gradient_high: param_color(params, "gradient_high", d.gradient_high),
            point_size: param_f64(params, "point_size", d.point_size),
            opacity: param_f64(params, "opacity", d.opacity),
            asset_size: param_f64(params, "asset_size", d.asset_size),
            asset_opacity: param_f64(params, "asset_opacity", d.asset_opacity),
            asset_box,
            assets: param_string_list(params, "assets", &d.assets),
            camera_fov_degrees: param_f64(params, "camera_fov_degrees", d.camera_fov_degrees),
            camera_distance: param_f64(params, "camera_distance", d.camera_distance),
            spin: param_f64(params, "spin", d.spin),
            ambient: PointPhysics::from_json(section(params, "ambient"), d.ambient),
            asset_physics: PointPhysics::from_json(section(params, "asset_physics"), d.asset_physics),
        }
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        if self.shell_inner_radius < 0.0 || self.shell_thickness < 0.0 {
            return Err(invalid("shell", "radius and thickness must be non-negative"));
        }
        check_unit_interval("opacity", self.opacity)?;
        check_unit_interval("asset_opacity", self.asset_opacity)?;
        check_positive("point_size", self.point_size)?;
        check_positive("asset_size", self.asset_size)?;
        check_positive("camera_distance", self.camera_distance)?;
        if !(1.0..179.0).contains(&self.camera_fov_degrees) {
            return Err(invalid("camera_fov_degrees", "must lie in [1, 179)"));
        }
        if self.asset_box.iter().any(|e| *e < 0.0 || !e.is_finite()) {
            return Err(invalid("asset_box", "extents must be finite and non-negative"));
        }
        self.ambient.validate()?;
        self.asset_physics.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn glyph_defaults_validate() {
        assert!(GlyphFieldConfig::default().validate().is_ok());
    }

    #[test]
    fn point_defaults_validate() {
        assert!(PointCloudConfig::default().validate().is_ok());
    }

    #[test]
    fn glyph_from_empty_json_equals_default() {
        assert_eq!(GlyphFieldConfig::from_json(&json!({})), GlyphFieldConfig::default());
    }

    #[test]
    fn point_from_empty_json_equals_default() {
        assert_eq!(PointCloudConfig::from_json(&json!({})), PointCloudConfig::default());
    }

    #[test]
    fn glyph_from_json_applies_nested_physics_overrides() {
        let cfg = GlyphFieldConfig::from_json(&json!({
            "text": "HELLO",
            "gap": 4,
            "shadow_color": "#101010",
            "physics": {"interaction_radius": 60, "idle_friction": 0.8}
        }));
        assert_eq!(cfg.text, "HELLO");
        assert_eq!(cfg.gap, 4);
        assert_eq!(cfg.shadow_color.to_hex(), "#101010");
        assert!((cfg.physics.interaction_radius - 60.0).abs() < f64::EPSILON);
        assert!((cfg.physics.idle_friction - 0.8).abs() < f64::EPSILON);
        assert!((cfg.physics.ease - 0.005).abs() < f64::EPSILON);
    }

    #[test]
    fn alpha_threshold_out_of_u8_range_keeps_default() {
        let cfg = GlyphFieldConfig::from_json(&json!({"alpha_threshold": 300}));
        assert_eq!(cfg.alpha_threshold, 128);
    }

    #[test]
    fn zero_gap_is_rejected() {
        let cfg = GlyphFieldConfig {
            gap: 0,
            ..GlyphFieldConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(FieldError::InvalidConfig { .. })));
    }

    #[test]
    fn empty_alphabet_is_rejected() {
        let cfg = GlyphFieldConfig {
            alphabet: String::new(),
            ..GlyphFieldConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn friction_of_one_is_rejected() {
        let physics = GlyphPhysics {
            idle_friction: 1.0,
            ..GlyphPhysics::default()
        };
        assert!(physics.validate().is_err());
    }

    #[test]
    fn non_positive_radius_is_rejected() {
        let physics = PointPhysics {
            interaction_radius: 0.0,
            ..PointPhysics::default()
        };
        assert!(physics.validate().is_err());
    }

    #[test]
    fn asset_physics_defaults_drift_slower() {
        let cfg = PointCloudConfig::default();
        assert!(cfg.asset_physics.wave_speed < cfg.ambient.wave_speed);
    }

    #[test]
    fn point_from_json_reads_assets_and_box() {
        let cfg = PointCloudConfig::from_json(&json!({
            "assets": ["a.png", "b.png"],
            "asset_box": [2, 2, 2],
            "ambient": {"wave_speed": 1.5}
        }));
        assert_eq!(cfg.assets.len(), 2);
        assert_eq!(cfg.asset_box, [2.0, 2.0, 2.0]);
        assert!((cfg.ambient.wave_speed - 1.5).abs() < f64::EPSILON);
        assert!((cfg.asset_physics.wave_speed - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn asset_opacity_defaults_and_validates() {
        let cfg = PointCloudConfig::default();
        assert!((cfg.asset_opacity - 0.8).abs() < f64::EPSILON);
        let cfg = PointCloudConfig::from_json(&json!({"asset_opacity": 0.5}));
        assert!((cfg.asset_opacity - 0.5).abs() < f64::EPSILON);
        let bad = PointCloudConfig::from_json(&json!({"asset_opacity": 1.5}));
        assert!(bad.validate().is_err());
    }

    #[test]
    fn glyph_config_json_round_trip() {
        let cfg = GlyphFieldConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: GlyphFieldConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.text, cfg.text);
        assert_eq!(back.gap, cfg.gap);
        assert_eq!(back.shadow_color.to_hex(), "#444444");
    }
}
