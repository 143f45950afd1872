use crate::error::Result;
use crate::topology::{MeshStore, SolidId};

use super::engine::boolean_execute;
use super::select::BooleanOp;

/// A pluggable CSG backend.
///
/// Implementations read both operands from the store, leave them in place,
/// and insert the result as a new base solid. A failed evaluation must not
/// insert anything.
pub trait CsgEvaluator {
    /// Evaluates `base <op> tool`.
    ///
    /// # Errors
    ///
    /// Returns an error if the operation cannot produce a usable solid.
    fn evaluate(
        &mut self,
        store: &mut MeshStore,
        base: SolidId,
        tool: SolidId,
        op: BooleanOp,
    ) -> Result<SolidId>;
}

/// The built-in BSP-tree evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BspEvaluator;

impl CsgEvaluator for BspEvaluator {
    fn evaluate(
        &mut self,
        store: &mut MeshStore,
        base: SolidId,
        tool: SolidId,
        op: BooleanOp,
    ) -> Result<SolidId> {
        boolean_execute(store, base, tool, op)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::MakeBox;
    use crate::operations::query::Volume;
    use crate::topology::SolidData;
    use approx::assert_relative_eq;

    #[test]
    fn evaluator_adds_result_as_base() {
        let mut store = MeshStore::new();
        let base = MakeBox::new(Vector3::new(2.0, 2.0, 2.0)).execute().unwrap();
        let mut tool = MakeBox::new(Vector3::new(1.0, 1.0, 1.0)).execute().unwrap();
        tool.translate(&Vector3::new(0.0, 0.0, 2.0));
        let base = store.add_solid(SolidData::base("block", base));
        let tool = store.add_solid(SolidData::tool("notch", tool));

        let mut evaluator = BspEvaluator;
        let out = evaluator
            .evaluate(&mut store, base, tool, BooleanOp::Subtract)
            .unwrap();
        let result = store.solid(out).unwrap();
        assert_eq!(result.role, crate::topology::SolidRole::Base);
        assert_relative_eq!(Volume::new(&result.mesh).execute(), 64.0 - 4.0, epsilon = 1e-6);
    }
}
