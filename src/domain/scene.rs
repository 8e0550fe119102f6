//! Scene assembly and the per-timestep update
//!
//! A scene owns every domain in an arena. Construction follows a fixed order:
//! domains are added, linked wherever two rectangles share an edge, surrounded
//! by PML domains on their absorbing edges, relinked, and finally initialised
//! so that derived topology, rho tables and PML multipliers are in place before
//! the first timestep.

use super::fields::LValues;
use super::pstd_domain::{Domain, DomainId, KernelContext};
use crate::config::{DomainEdges, EdgeParameters, PstdSettings, SceneConfig, SpeakerConfig};
use crate::engine::array::{max_abs, norm_squared};
use crate::error::{PstdError, Result};
use crate::geometry::{Direction, Point, Rect};
use crate::utilities::gaussian_pulse;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Collection of linked domains sharing one kernel context
#[derive(Debug)]
pub struct Scene {
    context: Arc<KernelContext>,
    domains: Vec<Domain>,
    speakers: Vec<SpeakerConfig>,
}

impl Scene {
    /// Scene without domains, for assembling layouts by hand
    pub fn empty(settings: PstdSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            context: Arc::new(KernelContext::new(settings)),
            domains: Vec::new(),
            speakers: Vec::new(),
        })
    }

    /// Build, surround with PML and initialise a scene from its description
    pub fn new(config: &SceneConfig) -> Result<Self> {
        config.validate()?;
        let mut scene = Self::empty(config.settings.clone())?;

        for domain in &config.domains {
            let domain = Domain::new(
                Arc::clone(&scene.context),
                domain.id.clone(),
                domain.alpha,
                domain.rect(),
                false,
                domain.edges,
                &[],
            );
            scene.add_domain(domain)?;
        }
        scene.check_overlaps()?;
        scene.link_neighbours();
        let added = scene.add_pml_domains()?;
        debug!("Added {} PML domains", added.len());
        scene.initialize()?;

        for speaker in &config.speakers {
            scene.add_speaker(*speaker);
        }

        info!(
            "Scene ready: {} domains, dx = {:.5} m, dt = {:.3e} s",
            scene.domains.len(),
            scene.context.grid_spacing,
            scene.context.time_step
        );
        Ok(scene)
    }

    pub fn context(&self) -> &Arc<KernelContext> {
        &self.context
    }

    pub fn settings(&self) -> &PstdSettings {
        &self.context.settings
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn domain(&self, handle: DomainId) -> &Domain {
        &self.domains[handle.0]
    }

    pub fn domain_mut(&mut self, handle: DomainId) -> &mut Domain {
        &mut self.domains[handle.0]
    }

    pub fn domain_by_id(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn speakers(&self) -> &[SpeakerConfig] {
        &self.speakers
    }

    /// Take ownership of `domain` and assign its arena handle
    pub fn add_domain(&mut self, mut domain: Domain) -> Result<DomainId> {
        if self.domain_by_id(&domain.id).is_some() {
            return Err(PstdError::invalid_domain(&domain.id, "duplicate domain id"));
        }
        let handle = DomainId(self.domains.len());
        domain.handle = handle;
        self.domains.push(domain);
        Ok(handle)
    }

    /// Reject any two domains covering the same cell
    pub fn check_overlaps(&self) -> Result<()> {
        for (i, a) in self.domains.iter().enumerate() {
            for b in &self.domains[i + 1..] {
                if a.rect().overlaps(&b.rect()) {
                    return Err(PstdError::OverlappingDomains {
                        first: a.id.clone(),
                        second: b.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Rebuild all neighbour links from the domain rectangles
    ///
    /// Every link is added together with its inverse.
    pub fn link_neighbours(&mut self) {
        for domain in self.domains.iter_mut() {
            domain.clear_neighbours();
        }

        let mut links = 0;
        for j in 1..self.domains.len() {
            let (head, tail) = self.domains.split_at_mut(j);
            let b = &mut tail[0];
            for a in head.iter_mut() {
                if let Some((direction, _)) = a.rect().contact(&b.rect()) {
                    a.add_neighbour_at(b, direction);
                    b.add_neighbour_at(a, direction.opposite());
                    links += 1;
                }
            }
        }
        debug!("Linked {} neighbour pairs", links);
    }

    /// Cover the vacant absorbing edges of every air domain with PML domains
    ///
    /// Primary PMLs are placed on each vacant range of an edge that needs one.
    /// A corner PML is added wherever two primary PMLs of the same parent meet
    /// at a corner of that parent. Neighbour links must be current.
    pub fn add_pml_domains(&mut self) -> Result<Vec<DomainId>> {
        let cells = self.context.settings.pml_cells as i64;
        let parents: Vec<DomainId> = self
            .domains
            .iter()
            .filter(|d| !d.is_pml && !d.is_rigid())
            .map(|d| d.handle)
            .collect();

        let mut added = Vec::new();
        for parent in parents {
            let (parent_rect, parent_id, edges) = {
                let domain = &self.domains[parent.0];
                (domain.rect(), domain.id.clone(), domain.edges)
            };
            let mut primaries: Vec<(Direction, DomainId)> = Vec::new();

            for direction in Direction::ALL {
                if !edges.get(direction).needs_pml() {
                    continue;
                }
                let vacant = self.domains[parent.0].get_vacant_range(direction);
                for (k, range) in vacant.into_iter().enumerate() {
                    let id = format!("{}_pml_{}_{}", parent_id, direction.name(), k);
                    let length = range.end - range.start;
                    let rect = pml_rect(parent_rect, direction, range.start, length, cells);
                    self.check_pml_placement(&id, rect)?;
                    let pml = Domain::new(
                        Arc::clone(&self.context),
                        id,
                        1.0,
                        rect,
                        true,
                        DomainEdges::uniform(EdgeParameters::rigid()),
                        &[&self.domains[parent.0]],
                    );
                    let handle = self.add_domain(pml)?;
                    primaries.push((direction, handle));
                    added.push(handle);
                }
            }

            for horizontal in [Direction::Left, Direction::Right] {
                for vertical in [Direction::Top, Direction::Bottom] {
                    let corner = self.add_corner_pml(parent, &primaries, horizontal, vertical)?;
                    if let Some(handle) = corner {
                        added.push(handle);
                    }
                }
            }
        }

        self.check_overlaps()?;
        Ok(added)
    }

    /// Reject a primary PML rectangle that runs into an existing domain
    fn check_pml_placement(&self, id: &str, rect: Rect) -> Result<()> {
        let Some(other) = self.domains.iter().find(|d| d.rect().overlaps(&rect)) else {
            return Ok(());
        };
        let reason = if other.is_pml {
            "absorbing edges meet at a concave corner of the outline, \
             which generated PML cannot cover; fill the corner or make both edges rigid"
        } else {
            "the gap to that domain is narrower than the PML"
        };
        Err(PstdError::PmlCollision {
            pml: id.to_string(),
            other: other.id.clone(),
            reason: reason.to_string(),
        })
    }

    fn add_corner_pml(
        &mut self,
        parent: DomainId,
        primaries: &[(Direction, DomainId)],
        horizontal: Direction,
        vertical: Direction,
    ) -> Result<Option<DomainId>> {
        let cells = self.context.settings.pml_cells as i64;
        let parent_rect = self.domains[parent.0].rect();

        // The primary on each side must reach the shared corner of the parent
        let reaches = |side: Direction, across: Direction| {
            let axis = across.axis();
            let corner = if across.is_lower() {
                parent_rect.top_left.get(axis)
            } else {
                parent_rect.bottom_right().get(axis)
            };
            primaries
                .iter()
                .filter(|(direction, _)| *direction == side)
                .map(|&(_, handle)| handle)
                .find(|handle| {
                    let extent = self.domains[handle.0].get_range(axis);
                    if across.is_lower() {
                        extent.start == corner
                    } else {
                        extent.end == corner
                    }
                })
        };
        let pair = (reaches(horizontal, vertical), reaches(vertical, horizontal));
        let (Some(h_pml), Some(v_pml)) = pair else {
            return Ok(None);
        };

        let x = if horizontal.is_lower() {
            parent_rect.top_left.x - cells
        } else {
            parent_rect.bottom_right().x
        };
        let y = if vertical.is_lower() {
            parent_rect.top_left.y - cells
        } else {
            parent_rect.bottom_right().y
        };
        let rect = Rect::new(Point::xy(x, y), Point::xy(cells, cells));

        let parent_id = &self.domains[parent.0].id;
        let id = format!("{}_pml_{}_{}", parent_id, horizontal.name(), vertical.name());
        if let Some(other) = self.domains.iter().find(|d| d.rect().overlaps(&rect)) {
            warn!("Skipping corner PML '{}': it would overlap '{}'", id, other.id);
            return Ok(None);
        }

        let corner = Domain::new(
            Arc::clone(&self.context),
            id,
            1.0,
            rect,
            true,
            DomainEdges::uniform(EdgeParameters::rigid()),
            &[&self.domains[h_pml.0], &self.domains[v_pml.0]],
        );
        self.add_domain(corner).map(Some)
    }

    /// Link all domains and derive the state every timestep relies on
    ///
    /// Secondary PMLs inherit attenuation from their PML parents, so domains
    /// are initialised air first, then primary PMLs, then secondary PMLs.
    pub fn initialize(&mut self) -> Result<()> {
        self.check_overlaps()?;
        self.link_neighbours();

        let rank = |d: &Domain| match (d.is_pml, d.is_secondary_pml) {
            (false, _) => 0,
            (true, false) => 1,
            (true, true) => 2,
        };
        let mut order: Vec<usize> = (0..self.domains.len()).collect();
        order.sort_by_key(|&i| rank(&self.domains[i]));

        for i in order {
            let layout = self.domains[i].attenuation_layout(&self.domains);
            self.domains[i].post_initialization(layout);
        }
        for domain in self.domains.iter_mut() {
            domain.compute_rho_arrays();
            domain.compute_pml_matrices();
        }

        self.check_topology()
    }

    /// Verify link symmetry and the PML neighbour preconditions
    pub fn check_topology(&self) -> Result<()> {
        for domain in &self.domains {
            for (direction, neighbour) in domain.all_neighbours() {
                let other = self.domain(neighbour.handle);
                let mirrored = other
                    .neighbours(direction.opposite())
                    .iter()
                    .any(|n| n.handle == domain.handle);
                if !mirrored {
                    return Err(PstdError::inconsistent_topology(
                        &domain.id,
                        format!(
                            "'{}' is a {} neighbour but does not link back on its {} side",
                            other.id,
                            direction,
                            direction.opposite()
                        ),
                    ));
                }
                if !matches!(domain.rect().contact(&other.rect()), Some((d, _)) if d == direction) {
                    return Err(PstdError::inconsistent_topology(
                        &domain.id,
                        format!(
                            "'{}' is linked on the {} side but does not touch it",
                            other.id, direction
                        ),
                    ));
                }
            }
            if domain.is_pml && domain.attenuation.iter().all(Option::is_none) {
                return Err(PstdError::inconsistent_topology(
                    &domain.id,
                    "PML without an attenuation direction",
                ));
            }
            domain
                .pml_precondition()
                .map_err(|reason| PstdError::inconsistent_topology(&domain.id, reason))?;
        }
        Ok(())
    }

    /// Add a Gaussian pressure pulse to every air domain
    pub fn add_speaker(&mut self, speaker: SpeakerConfig) {
        let dx = self.context.grid_spacing;
        let bandwidth = self.context.settings.gaussian_bandwidth;
        for domain in self.domains.iter_mut().filter(|d| !d.is_pml && !d.is_rigid()) {
            let pulse = gaussian_pulse(
                speaker.position,
                domain.top_left,
                domain.shape(),
                dx,
                bandwidth,
            );
            domain.current_values.px0.scaled_add(0.5, &pulse);
            domain.current_values.py0.scaled_add(0.5, &pulse);
        }
        debug!("Speaker at {:?}", speaker.position);
        self.speakers.push(speaker);
    }

    /// Snapshot current fields of every domain
    pub fn push_values(&mut self) {
        for domain in self.domains.iter_mut() {
            domain.push_values();
        }
    }

    /// Commit one Runge-Kutta stage; `l_values` is indexed like the domains
    pub fn update_fields(&mut self, l_values: Vec<LValues>, coefficient: f64) {
        assert_eq!(
            l_values.len(),
            self.domains.len(),
            "one set of derivatives per domain expected"
        );
        for (domain, l) in self.domains.iter_mut().zip(l_values) {
            domain.update_fields(l, coefficient);
        }
    }

    pub fn apply_pml(&mut self) {
        for domain in self.domains.iter_mut().filter(|d| d.is_pml) {
            domain.apply_pml_matrices();
        }
    }

    /// Sum of squared pressure over the air domains
    pub fn total_pressure_energy(&self) -> f64 {
        self.domains
            .iter()
            .filter(|d| !d.is_pml)
            .map(|d| norm_squared(&d.current_values.pressure()))
            .sum()
    }

    /// Largest absolute pressure anywhere in the scene
    pub fn max_pressure(&self) -> f64 {
        self.domains
            .iter()
            .map(|d| max_abs(&d.current_values.pressure()))
            .fold(0.0, f64::max)
    }
}

/// Rectangle of a primary PML on side `direction` of `parent`
fn pml_rect(parent: Rect, direction: Direction, start: i64, length: i64, cells: i64) -> Rect {
    let (top_left, size) = match direction {
        Direction::Left => (Point::xy(parent.top_left.x - cells, start), Point::xy(cells, length)),
        Direction::Right => (Point::xy(parent.bottom_right().x, start), Point::xy(cells, length)),
        Direction::Top => (Point::xy(start, parent.top_left.y - cells), Point::xy(length, cells)),
        Direction::Bottom => (Point::xy(start, parent.bottom_right().y), Point::xy(length, cells)),
    };
    Rect::new(top_left, size)
}
