use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use crate::error::Result;
use crate::operations::boolean::CsgEvaluator;
use crate::operations::modification::HalfSpace;
use crate::operations::repair::{RepairMesh, RepairReport};
use crate::topology::{MeshStore, SolidId};

use super::assemble::{AssembleKeys, AssemblyReport, KeyMode};
use super::config::BeadConfig;
use super::hemisphere::BuildHemisphere;
use super::key::BeadLayout;
use super::placement::PlaceKeys;

/// Receives finished bead halves.
pub trait BeadSink {
    /// Writes one finished half under `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the half could not be written. The generator
    /// logs and counts it; the run continues.
    fn export(&mut self, store: &MeshStore, solid: SolidId, file_name: &str) -> Result<()>;
}

/// What happened to one bead.
#[derive(Debug, Clone, PartialEq)]
pub struct BeadReport {
    /// Keys shared by both halves.
    pub layout: BeadLayout,
    /// Keys requested but not placed.
    pub shortfall: usize,
    /// Key booleans that failed across both halves.
    pub boolean_failures: usize,
    /// Halves left open or non-manifold after repair.
    pub repair_warnings: usize,
    /// Halves the sink failed to write.
    pub export_failures: usize,
}

/// What happened during a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Completed beads, in order.
    pub beads: Vec<BeadReport>,
    /// Error that stopped the run early, if any.
    pub aborted: Option<String>,
}

impl RunSummary {
    /// Total failed key booleans.
    #[must_use]
    pub fn boolean_failures(&self) -> usize {
        self.beads.iter().map(|b| b.boolean_failures).sum()
    }

    /// Total halves the sink failed to write.
    #[must_use]
    pub fn export_failures(&self) -> usize {
        self.beads.iter().map(|b| b.export_failures).sum()
    }

    /// Returns `true` if every bead ran and nothing degraded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.aborted.is_none()
            && self.beads.iter().all(|b| {
                b.shortfall == 0
                    && b.boolean_failures == 0
                    && b.repair_warnings == 0
                    && b.export_failures == 0
            })
    }
}

/// Drives a whole run: `bead_count` pairs of mating halves.
///
/// Per bead, keys are placed once and the same slice is used to fuse pegs
/// into the top half and cut sockets into the bottom half. The RNG is
/// seeded once per run and consumed only by placement, one call per bead.
/// Recoverable problems are logged and counted; any other error stops the
/// run, is logged with its bead number, and ends up in
/// [`RunSummary::aborted`].
pub struct BeadGenerator<'a> {
    config: &'a BeadConfig,
}

impl<'a> BeadGenerator<'a> {
    /// Creates a new `BeadGenerator`.
    #[must_use]
    pub fn new(config: &'a BeadConfig) -> Self {
        Self { config }
    }

    /// Executes the run.
    pub fn execute(
        &self,
        evaluator: &mut dyn CsgEvaluator,
        sink: &mut dyn BeadSink,
    ) -> RunSummary {
        let config = self.config;
        let mut rng = Pcg64Mcg::seed_from_u64(config.seed);
        let planner = PlaceKeys::new(
            config.key_shapes.len(),
            config.usable_radius(),
            config.min_separation(),
            config.max_placement_attempts,
        );

        let mut summary = RunSummary::default();
        for index in 1..=config.bead_count {
            let positions = planner.execute(&mut rng);
            let layout = BeadLayout::new(index, &config.key_shapes, &positions);
            let shortfall = config.key_shapes.len() - layout.keys.len();
            if shortfall > 0 {
                tracing::warn!(
                    bead = index,
                    placed = layout.keys.len(),
                    requested = config.key_shapes.len(),
                    "placement budget exhausted; proceeding with fewer keys"
                );
            }

            match self.build_bead(layout, shortfall, evaluator, sink) {
                Ok(report) => summary.beads.push(report),
                Err(err) => {
                    tracing::error!(bead = index, error = %err, "bead generation failed; stopping run");
                    summary.aborted = Some(format!("bead {index}: {err}"));
                    break;
                }
            }
        }

        tracing::info!(
            beads = summary.beads.len(),
            boolean_failures = summary.boolean_failures(),
            export_failures = summary.export_failures(),
            aborted = summary.aborted.is_some(),
            "run finished"
        );
        summary
    }

    fn build_bead(
        &self,
        layout: BeadLayout,
        shortfall: usize,
        evaluator: &mut dyn CsgEvaluator,
        sink: &mut dyn BeadSink,
    ) -> Result<BeadReport> {
        let index = layout.index;
        let mut store = MeshStore::new();
        let mut report = BeadReport {
            layout,
            shortfall,
            boolean_failures: 0,
            repair_warnings: 0,
            export_failures: 0,
        };

        let mut halves: Vec<(SolidId, &'static str)> = Vec::with_capacity(2);
        for (half, mode) in [
            (HalfSpace::Top, KeyMode::Peg),
            (HalfSpace::Bottom, KeyMode::Socket),
        ] {
            tracing::info!(bead = index, half = half.label(), "generating half");
            let (assembly, repair) =
                self.build_half(&mut store, half, mode, &report.layout, evaluator)?;
            report.boolean_failures += assembly.failed;
            if !repair.is_clean() {
                report.repair_warnings += 1;
            }
            halves.push((assembly.solid, half.label()));
        }

        for (solid, label) in halves {
            let file_name = format!("bead_{index}_{label}.stl");
            match sink.export(&store, solid, &file_name) {
                Ok(()) => tracing::info!(bead = index, file = %file_name, "exported"),
                Err(err) => {
                    report.export_failures += 1;
                    tracing::warn!(bead = index, file = %file_name, error = %err, "export failed");
                }
            }
            store.remove_solid(solid)?;
        }

        tracing::info!("bead {index} layout:");
        for key in &report.layout.keys {
            tracing::info!(
                "  {:8}  (x={:.1}, y={:.1}) mm",
                key.shape,
                key.position.x,
                key.position.y
            );
        }
        Ok(report)
    }

    fn build_half(
        &self,
        store: &mut MeshStore,
        half: HalfSpace,
        mode: KeyMode,
        layout: &BeadLayout,
        evaluator: &mut dyn CsgEvaluator,
    ) -> Result<(AssemblyReport, RepairReport)> {
        let base = BuildHemisphere::new(self.config, half).execute(store)?;
        let assembly = AssembleKeys::new(base, &layout.keys, mode, self.config)
            .execute(store, evaluator)?;
        tracing::debug!(
            half = half.label(),
            merged = assembly.merged,
            failed = assembly.failed,
            "keys assembled"
        );
        let repair = RepairMesh::new(assembly.solid, self.config.weld_epsilon).execute(store)?;
        Ok((assembly, repair))
    }
}
