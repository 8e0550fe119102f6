//! Rectangular PSTD domain: geometry, material, topology and field state
//!
//! Domains live in an arena owned by the [`Scene`](super::scene::Scene) and
//! refer to each other through [`DomainId`] handles. A neighbour link stores a
//! small snapshot of the other domain so that rho tables and segment ranges can
//! be built without touching the arena.

use super::fields::{FieldValues, LValues, PmlArrays};
use super::pml::Ramp;
use super::rho::{RhoArray, RhoKey};
use crate::config::{DomainEdges, PstdSettings, RIGID_IMPEDANCE, RIGID_RHO};
use crate::geometry::{intersect, subtract_ranges, Axis, Direction, Point, Rect};
use crate::utilities::{impedance_from_alpha, window, WaveNumberDiscretizer};
use ndarray::Array1;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Handle of a domain inside its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomainId(pub usize);

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Settings-derived state shared by every domain of a scene
#[derive(Debug)]
pub struct KernelContext {
    pub settings: PstdSettings,
    pub grid_spacing: f64,
    pub time_step: f64,
    /// Tapering window, `2 * window_size + 1` values
    pub window: Array1<f64>,
    pub discretizer: WaveNumberDiscretizer,
}

impl KernelContext {
    pub fn new(settings: PstdSettings) -> Self {
        let grid_spacing = settings.grid_spacing();
        let time_step = settings.time_step();
        let window = window(settings.window_size, settings.patch_error);
        Self {
            settings,
            grid_spacing,
            time_step,
            window,
            discretizer: WaveNumberDiscretizer::new(),
        }
    }
}

/// Snapshot of a linked domain as seen from one side
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbour {
    pub handle: DomainId,
    pub rho: f64,
    pub is_pml: bool,
    /// Extent of the neighbour along the shared edge
    pub extent: Range<i64>,
}

/// Part of an edge covered by one neighbour, or vacant
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<'a> {
    pub neighbour: Option<&'a Neighbour>,
    pub extent: Range<i64>,
}

impl Segment<'_> {
    pub fn handle(&self) -> Option<DomainId> {
        self.neighbour.map(|n| n.handle)
    }
}

/// One rectangular sub-domain of the scene
#[derive(Debug)]
pub struct Domain {
    pub id: String,
    /// Arena handle, assigned when the domain is added to a scene
    pub handle: DomainId,
    pub top_left: Point,
    pub size: Point,
    pub bottom_right: Point,
    pub alpha: f64,
    pub impedance: f64,
    pub rho: f64,
    pub is_pml: bool,
    pub is_secondary_pml: bool,
    pub is_corner_domain: bool,
    pub has_horizontal_attenuation: bool,
    pub has_vertical_attenuation: bool,
    pub edges: DomainEdges,
    /// Domains this PML attenuates for
    pub pml_for_domain_list: Vec<DomainId>,
    pub num_neighbour_domains: usize,
    pub num_pml_neighbour_domains: usize,
    /// Update passes along `[x, y]`
    pub should_update: [bool; 2],
    pub current_values: FieldValues,
    pub previous_values: FieldValues,
    pub l_values: LValues,
    pub pml_arrays: PmlArrays,
    pub(crate) attenuation: [Option<Ramp>; 2],
    pub(crate) rho_arrays: HashMap<RhoKey, RhoArray>,
    pub(crate) context: Arc<KernelContext>,
    neighbours: [Vec<Neighbour>; 4],
}

impl Domain {
    /// Create a domain; neighbour dependent state waits for [`Domain::post_initialization`]
    ///
    /// `pml_parents` are the domains a PML attenuates for and must already
    /// belong to the scene.
    pub fn new(
        context: Arc<KernelContext>,
        id: impl Into<String>,
        alpha: f64,
        rect: Rect,
        is_pml: bool,
        edges: DomainEdges,
        pml_parents: &[&Domain],
    ) -> Self {
        let impedance = impedance_from_alpha(alpha);
        let rho = if impedance > RIGID_IMPEDANCE {
            RIGID_RHO
        } else {
            context.settings.density_of_air
        };
        let (nx, ny) = (rect.size.x.max(0) as usize, rect.size.y.max(0) as usize);

        Self {
            id: id.into(),
            handle: DomainId(0),
            top_left: rect.top_left,
            size: rect.size,
            bottom_right: rect.bottom_right(),
            alpha,
            impedance,
            rho,
            is_pml,
            is_secondary_pml: is_pml && pml_parents.iter().any(|p| p.is_pml),
            is_corner_domain: false,
            has_horizontal_attenuation: false,
            has_vertical_attenuation: false,
            edges,
            pml_for_domain_list: pml_parents.iter().map(|p| p.handle).collect(),
            num_neighbour_domains: 0,
            num_pml_neighbour_domains: 0,
            should_update: [false, false],
            current_values: FieldValues::zeros(nx, ny),
            previous_values: FieldValues::zeros(nx, ny),
            l_values: LValues::zeros(nx, ny),
            pml_arrays: PmlArrays::zeros(nx, ny),
            attenuation: [None, None],
            rho_arrays: HashMap::new(),
            context,
            neighbours: Default::default(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.top_left, self.size)
    }

    /// Grid size `(nx, ny)`
    pub fn shape(&self) -> (usize, usize) {
        (self.size.x as usize, self.size.y as usize)
    }

    /// Rigid domains carry the sentinel density and never update
    pub fn is_rigid(&self) -> bool {
        self.rho >= RIGID_RHO
    }

    pub fn settings(&self) -> &PstdSettings {
        &self.context.settings
    }

    /// Link `other` as a neighbour on side `direction`
    ///
    /// The inverse link is the caller's responsibility.
    pub fn add_neighbour_at(&mut self, other: &Domain, direction: Direction) {
        self.neighbours[direction.index()].push(Neighbour {
            handle: other.handle,
            rho: other.rho,
            is_pml: other.is_pml,
            extent: other.get_range(direction.axis().orthogonal()),
        });
    }

    pub fn clear_neighbours(&mut self) {
        for list in self.neighbours.iter_mut() {
            list.clear();
        }
        self.rho_arrays.clear();
    }

    pub fn neighbours(&self, direction: Direction) -> &[Neighbour] {
        &self.neighbours[direction.index()]
    }

    pub fn all_neighbours(&self) -> impl Iterator<Item = (Direction, &Neighbour)> + '_ {
        Direction::ALL
            .into_iter()
            .flat_map(move |d| self.neighbours(d).iter().map(move |n| (d, n)))
    }

    /// Side on which `handle` is linked, if any
    pub fn direction_of(&self, handle: DomainId) -> Option<Direction> {
        self.all_neighbours()
            .find(|(_, n)| n.handle == handle)
            .map(|(d, _)| d)
    }

    /// Grid indices covered along `axis`
    pub fn get_range(&self, axis: Axis) -> Range<i64> {
        self.top_left.get(axis)..self.bottom_right.get(axis)
    }

    /// Shared indices with `other` along the edge normal to `direction`
    pub fn get_intersection_with(&self, other: &Domain, direction: Direction) -> Range<i64> {
        let along = direction.axis().orthogonal();
        intersect(&self.get_range(along), &other.get_range(along))
    }

    /// Parts of the `direction` edge not covered by a neighbour
    pub fn get_vacant_range(&self, direction: Direction) -> Vec<Range<i64>> {
        let edge = self.get_range(direction.axis().orthogonal());
        let covered: Vec<Range<i64>> = self
            .neighbours(direction)
            .iter()
            .map(|n| n.extent.clone())
            .collect();
        subtract_ranges(&edge, &covered)
    }

    /// Neighbours and vacant ranges along one edge
    pub(crate) fn segments(&self, direction: Direction) -> Vec<Segment<'_>> {
        let mut segments: Vec<Segment<'_>> = self
            .neighbours(direction)
            .iter()
            .map(|n| Segment {
                neighbour: Some(n),
                extent: n.extent.clone(),
            })
            .collect();
        segments.extend(
            self.get_vacant_range(direction)
                .into_iter()
                .map(|extent| Segment {
                    neighbour: None,
                    extent,
                }),
        );
        segments
    }

    /// Derive topology counters, attenuation flags and update passes
    ///
    /// Runs once all links are in place. `attenuation` comes from
    /// [`Domain::attenuation_layout`].
    pub fn post_initialization(&mut self, attenuation: [Option<Ramp>; 2]) {
        self.num_neighbour_domains = self.neighbours.iter().map(Vec::len).sum();
        self.num_pml_neighbour_domains = self.all_neighbours().filter(|(_, n)| n.is_pml).count();

        self.attenuation = attenuation;
        self.has_horizontal_attenuation = attenuation[Axis::X.index()].is_some();
        self.has_vertical_attenuation = attenuation[Axis::Y.index()].is_some();
        self.is_corner_domain = self.has_horizontal_attenuation && self.has_vertical_attenuation;

        self.should_update = if self.is_rigid() {
            [false, false]
        } else if self.is_pml {
            [self.has_horizontal_attenuation, self.has_vertical_attenuation]
        } else {
            [true, true]
        };
    }

    /// Number of linked domains that are not PMLs
    pub fn num_non_pml_neighbour_domains(&self) -> usize {
        self.num_neighbour_domains - self.num_pml_neighbour_domains
    }

    /// Snapshot the current fields as the base of the next timestep
    pub fn push_values(&mut self) {
        self.previous_values.clone_from(&self.current_values);
    }

    pub fn clear_fields(&mut self) {
        let (nx, ny) = self.shape();
        self.current_values = FieldValues::zeros(nx, ny);
        self.previous_values = FieldValues::zeros(nx, ny);
    }

    pub fn clear_matrices(&mut self) {
        let (nx, ny) = self.shape();
        self.l_values = LValues::zeros(nx, ny);
    }

    pub fn clear_pml_arrays(&mut self) {
        let (nx, ny) = self.shape();
        self.pml_arrays = PmlArrays::zeros(nx, ny);
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {} size {}",
            if self.is_pml { "PML" } else { "domain" },
            self.id,
            self.top_left,
            self.size
        )
    }
}
