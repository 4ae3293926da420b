//! The planner's output: a costed chain of copier invocations.

use std::fmt;
use std::sync::Arc;

use porter_core::Conversion;

use crate::copier::Capability;

/// One hop of a planned copy: the copier to invoke, the conversion it
/// performs, and its cost priced at the plan's expected record count.
pub struct CopyEdge<C: ?Sized> {
    pub copier: Arc<C>,
    pub conversion: Conversion,
    pub cost: f64,
}

impl<C: ?Sized> Clone for CopyEdge<C> {
    fn clone(&self) -> Self {
        Self {
            copier: Arc::clone(&self.copier),
            conversion: self.conversion,
            cost: self.cost,
        }
    }
}

/// An ordered, contiguous sequence of copy edges. Empty when source and
/// target storage-format coincide.
pub struct CopyPath<C: ?Sized> {
    pub edges: Vec<CopyEdge<C>>,
    pub expected_records: u64,
}

impl<C: ?Sized> CopyPath<C> {
    pub fn empty(expected_records: u64) -> Self {
        Self {
            edges: Vec::new(),
            expected_records,
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn total_cost(&self) -> f64 {
        self.edges.iter().map(|edge| edge.cost).sum()
    }

    /// Consecutive edges must connect: each edge starts where the
    /// previous one ended.
    pub fn is_contiguous(&self) -> bool {
        self.edges
            .windows(2)
            .all(|pair| pair[0].conversion.to == pair[1].conversion.from)
    }

    pub fn conversions(&self) -> impl Iterator<Item = &Conversion> {
        self.edges.iter().map(|edge| &edge.conversion)
    }
}

impl<C: ?Sized> Clone for CopyPath<C> {
    fn clone(&self) -> Self {
        Self {
            edges: self.edges.clone(),
            expected_records: self.expected_records,
        }
    }
}

impl<C: ?Sized + Capability> fmt::Debug for CopyEdge<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyEdge")
            .field("copier", &self.copier.name())
            .field("conversion", &self.conversion)
            .field("cost", &self.cost)
            .finish()
    }
}

impl<C: ?Sized + Capability> fmt::Debug for CopyPath<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyPath")
            .field("edges", &self.edges)
            .field("expected_records", &self.expected_records)
            .finish()
    }
}
