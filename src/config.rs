//! Simulation settings and scene descriptions
//!
//! Everything here is plain data loaded from TOML through serde. Derived
//! quantities (grid spacing, time step) are computed on demand so that a settings
//! value never goes stale.

use crate::error::{PstdError, Result};
use crate::geometry::{Direction, Point, Rect};
use crate::utilities::{grid_spacing, impedance_from_alpha};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Density used for a side with no neighbour (hard reflection)
pub const MAX_RHO: f64 = 1e10;

/// Density assigned to acoustically rigid domains
pub const RIGID_RHO: f64 = 1e200;

/// Impedance above which a domain is treated as rigid
pub const RIGID_IMPEDANCE: f64 = 1000.0;

/// Global simulation settings, immutable for the duration of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PstdSettings {
    /// Speed of sound in air (m/s)
    pub sound_speed: f64,
    /// Density of air (kg/m^3)
    pub density_of_air: f64,
    /// Highest frequency the grid must resolve (Hz)
    pub max_frequency: f64,
    /// Explicit grid spacing (m); derived from `max_frequency` when absent
    pub grid_spacing: Option<f64>,
    /// Courant number used to derive the time step
    pub cfl: f64,
    /// Thickness of generated PML domains, in cells
    pub pml_cells: usize,
    /// Peak attenuation coefficient inside a PML
    pub pml_attenuation: f64,
    /// Half width of the spectral window, in cells
    pub window_size: usize,
    /// Attenuation of the window edges (dB)
    pub patch_error: f64,
    /// Low-storage Runge-Kutta stage coefficients
    pub rk_coefficients: Vec<f64>,
    /// Simulated time (s) when no step count is given
    pub render_time: f64,
    /// Report every n-th frame
    pub save_nth_frame: usize,
    /// Bandwidth of the initial Gaussian pressure pulse
    pub gaussian_bandwidth: f64,
}

impl Default for PstdSettings {
    fn default() -> Self {
        Self {
            sound_speed: 340.0,
            density_of_air: 1.2,
            max_frequency: 5000.0,
            grid_spacing: None,
            cfl: 0.5,
            pml_cells: 50,
            pml_attenuation: 20000.0,
            window_size: 32,
            patch_error: 70.0,
            rk_coefficients: vec![0.25, 1.0 / 3.0, 0.5, 1.0],
            render_time: 1.0,
            save_nth_frame: 1,
            gaussian_bandwidth: 200.0,
        }
    }
}

impl PstdSettings {
    /// Grid spacing in metres
    pub fn grid_spacing(&self) -> f64 {
        self.grid_spacing
            .unwrap_or_else(|| grid_spacing(self.sound_speed, self.max_frequency))
    }

    /// Time step in seconds
    pub fn time_step(&self) -> f64 {
        self.cfl * self.grid_spacing() / self.sound_speed
    }

    /// Number of timesteps covering `render_time`
    pub fn time_steps(&self) -> usize {
        (self.render_time / self.time_step()).ceil() as usize
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("sound_speed", self.sound_speed),
            ("density_of_air", self.density_of_air),
            ("max_frequency", self.max_frequency),
            ("cfl", self.cfl),
            ("patch_error", self.patch_error),
            ("gaussian_bandwidth", self.gaussian_bandwidth),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(PstdError::invalid_settings(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if let Some(dx) = self.grid_spacing {
            if !(dx.is_finite() && dx > 0.0) {
                return Err(PstdError::invalid_settings(format!(
                    "grid_spacing must be positive, got {}",
                    dx
                )));
            }
        }
        if !(self.pml_attenuation.is_finite() && self.pml_attenuation >= 0.0) {
            return Err(PstdError::invalid_settings(
                "pml_attenuation must be non-negative",
            ));
        }
        if self.render_time < 0.0 {
            return Err(PstdError::invalid_settings("render_time must be non-negative"));
        }
        if self.pml_cells == 0 {
            return Err(PstdError::invalid_settings("pml_cells must be at least 1"));
        }
        if self.window_size == 0 {
            return Err(PstdError::invalid_settings("window_size must be at least 1"));
        }
        if self.save_nth_frame == 0 {
            return Err(PstdError::invalid_settings("save_nth_frame must be at least 1"));
        }
        if self.rk_coefficients.is_empty() {
            return Err(PstdError::invalid_settings(
                "rk_coefficients must not be empty",
            ));
        }
        Ok(())
    }
}

/// Boundary treatment of one domain edge where no other domain touches it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeParameters {
    /// Absorption coefficient of the edge, 0 = rigid, 1 = fully absorbing
    pub alpha: f64,
    /// Model the edge as a locally reacting impedance instead of a PML
    pub locally_reacting: bool,
}

impl Default for EdgeParameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            locally_reacting: false,
        }
    }
}

impl EdgeParameters {
    pub fn rigid() -> Self {
        Self {
            alpha: 0.0,
            locally_reacting: false,
        }
    }

    /// Vacant parts of this edge are covered by generated PML domains
    pub fn needs_pml(&self) -> bool {
        !self.locally_reacting && self.alpha > 0.0
    }

    /// Density seen through a vacant part of this edge
    pub fn boundary_density(&self, density_of_air: f64) -> f64 {
        if self.locally_reacting {
            MAX_RHO.min(density_of_air * impedance_from_alpha(self.alpha))
        } else {
            MAX_RHO
        }
    }
}

/// Edge parameters for the four sides of a domain
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainEdges {
    pub left: EdgeParameters,
    pub right: EdgeParameters,
    pub top: EdgeParameters,
    pub bottom: EdgeParameters,
}

impl DomainEdges {
    pub fn uniform(edge: EdgeParameters) -> Self {
        Self {
            left: edge,
            right: edge,
            top: edge,
            bottom: edge,
        }
    }

    pub fn get(&self, direction: Direction) -> EdgeParameters {
        match direction {
            Direction::Left => self.left,
            Direction::Right => self.right,
            Direction::Top => self.top,
            Direction::Bottom => self.bottom,
        }
    }
}

/// One rectangular domain of a scene, in grid cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainConfig {
    pub id: String,
    /// Grid position of the top left cell `[x, y]`
    pub top_left: [i64; 2],
    /// Size in cells `[width, height]`
    pub size: [i64; 2],
    /// Absorption of the domain material
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default)]
    pub edges: DomainEdges,
}

fn default_alpha() -> f64 {
    1.0
}

impl DomainConfig {
    pub fn new(id: impl Into<String>, top_left: [i64; 2], size: [i64; 2]) -> Self {
        Self {
            id: id.into(),
            top_left,
            size,
            alpha: 1.0,
            edges: DomainEdges::default(),
        }
    }

    pub fn with_edges(mut self, edges: DomainEdges) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            Point::xy(self.top_left[0], self.top_left[1]),
            Point::xy(self.size[0], self.size[1]),
        )
    }
}

/// Initial pressure pulse, in grid coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeakerConfig {
    pub position: [f64; 2],
}

/// Complete scene: settings, domains and speakers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub settings: PstdSettings,
    #[serde(default, rename = "domain")]
    pub domains: Vec<DomainConfig>,
    #[serde(default, rename = "speaker")]
    pub speakers: Vec<SpeakerConfig>,
}

impl SceneConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PstdError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.settings.validate()?;

        if self.domains.is_empty() {
            return Err(PstdError::invalid_settings("scene contains no domains"));
        }

        let mut seen = HashSet::new();
        for domain in &self.domains {
            if domain.size[0] <= 0 || domain.size[1] <= 0 {
                return Err(PstdError::invalid_domain(
                    &domain.id,
                    format!("size must be positive, got {:?}", domain.size),
                ));
            }
            if !(0.0..=1.0).contains(&domain.alpha) {
                return Err(PstdError::invalid_domain(
                    &domain.id,
                    format!("alpha must lie in [0, 1], got {}", domain.alpha),
                ));
            }
            for direction in Direction::ALL {
                let alpha = domain.edges.get(direction).alpha;
                if !(0.0..=1.0).contains(&alpha) {
                    return Err(PstdError::invalid_domain(
                        &domain.id,
                        format!("{} edge alpha must lie in [0, 1], got {}", direction, alpha),
                    ));
                }
            }
            if !seen.insert(domain.id.as_str()) {
                return Err(PstdError::invalid_domain(&domain.id, "duplicate domain id"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = PstdSettings::default();
        assert!(settings.validate().is_ok());
        assert_relative_eq!(settings.grid_spacing(), 0.034, epsilon = 1e-12);
        assert_relative_eq!(settings.time_step(), 0.5 * 0.034 / 340.0, epsilon = 1e-15);
    }

    #[test]
    fn test_explicit_grid_spacing_overrides() {
        let settings = PstdSettings {
            grid_spacing: Some(0.05),
            ..Default::default()
        };
        assert_relative_eq!(settings.grid_spacing(), 0.05);
    }

    #[test]
    fn test_invalid_settings() {
        let settings = PstdSettings {
            sound_speed: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(PstdError::InvalidSettings(_))
        ));

        let settings = PstdSettings {
            rk_coefficients: Vec::new(),
            ..Default::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_edge_boundary_density() {
        let reflecting = EdgeParameters::default();
        assert_eq!(reflecting.boundary_density(1.2), MAX_RHO);
        assert!(reflecting.needs_pml());

        let local = EdgeParameters {
            alpha: 1.0,
            locally_reacting: true,
        };
        assert!(!local.needs_pml());
        assert_relative_eq!(local.boundary_density(1.2), 1.2);

        let hard = EdgeParameters {
            alpha: 0.0,
            locally_reacting: true,
        };
        assert_eq!(hard.boundary_density(1.2), MAX_RHO);
    }

    #[test]
    fn test_parse_scene_toml() {
        let config = SceneConfig::from_toml_str(
            r#"
            [settings]
            max_frequency = 500.0
            pml_cells = 20

            [[domain]]
            id = "room"
            top_left = [0, 0]
            size = [64, 48]

            [domain.edges.left]
            alpha = 0.0

            [[speaker]]
            position = [32.0, 24.0]
            "#,
        )
        .unwrap();

        assert_eq!(config.settings.pml_cells, 20);
        assert_eq!(config.settings.window_size, 32);
        assert_eq!(config.domains.len(), 1);
        assert_eq!(config.domains[0].edges.left.alpha, 0.0);
        assert_eq!(config.domains[0].edges.right.alpha, 1.0);
        assert_eq!(config.speakers[0].position, [32.0, 24.0]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let config = SceneConfig {
            domains: vec![
                DomainConfig::new("a", [0, 0], [10, 10]),
                DomainConfig::new("a", [10, 0], [10, 10]),
            ],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PstdError::InvalidDomain { .. })
        ));
    }
}
