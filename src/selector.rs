//! Framework selection by requirement-tag compatibility scoring.

use crate::framework::Framework;
use crate::registry::Registry;

/// Outcome of framework selection. Callers must handle the no-framework case
/// explicitly; there is no silent default.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection<'a> {
    Selected { framework: &'a Framework, score: i64 },
    NoCompatibleFramework,
}

/// Matches a proposition's declared requirement tags to the best-fitting
/// registered framework.
#[derive(Debug, Clone)]
pub struct FrameworkSelector<'a> {
    registry: &'a Registry,
}

impl<'a> FrameworkSelector<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    /// Rank every compatible framework: a candidate must satisfy all
    /// requirement tags; its score is the satisfied-tag count minus its
    /// declared incompatibility count. Ordering is by descending score with
    /// ties broken lexically by framework id.
    pub fn rank(&self, requirements: &[String]) -> Vec<(&'a Framework, i64)> {
        let mut ranked: Vec<(&Framework, i64)> = self
            .registry
            .frameworks()
            .filter(|fw| requirements.iter().all(|tag| fw.satisfies(tag)))
            .map(|fw| {
                let satisfied = requirements.iter().filter(|tag| fw.satisfies(tag)).count();
                (fw, satisfied as i64 - fw.conflicts().len() as i64)
            })
            .collect();
        ranked.sort_by(|(a, sa), (b, sb)| sb.cmp(sa).then_with(|| a.id().cmp(b.id())));
        ranked
    }

    /// Select the highest-scoring compatible framework.
    pub fn select(&self, requirements: &[String]) -> Selection<'a> {
        match self.rank(requirements).first() {
            Some((framework, score)) => Selection::Selected {
                framework,
                score: *score,
            },
            None => Selection::NoCompatibleFramework,
        }
    }
}
