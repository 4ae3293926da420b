//! Hop-by-hop execution of a planned copy path.

use std::sync::Arc;

use porter_core::{
    DatabaseStorage as _, FilesystemStorage as _, MemoryStorage as _, ObjectRef, Storage,
    StorageClass, StorageError, StorageEngine,
};
use porter_plan::{Capability, CopyPath};
use tracing::{info, warn};

use crate::copier::{Copier, CopyContext, HopRequest};
use crate::error::CopyError;
use crate::handler::HandlerRegistry;
use crate::request::{CopyRequest, WriteDisposition};

/// An intermediate object the executor named and must release once the
/// following hop has consumed it.
struct Scratch {
    storage: Arc<dyn Storage>,
    name: String,
}

/// Walk the path in order, materializing each hop's destination before
/// the next hop begins. An empty path is a completed no-op: source and
/// destination storage-format already coincide and no copier runs.
pub(crate) fn execute(
    request: &CopyRequest,
    path: &CopyPath<dyn Copier>,
    storages: &[Arc<dyn Storage>],
    handlers: &HandlerRegistry,
) -> Result<(), CopyError> {
    if path.is_empty() {
        return Ok(());
    }
    let mut scratch = None;
    let result = run_hops(request, path, storages, handlers, &mut scratch);
    // On failure or cancellation the pending intermediate is still ours.
    if let Some(pending) = scratch.take() {
        release_scratch(pending.storage.as_ref(), &pending.name);
    }
    result
}

fn run_hops(
    request: &CopyRequest,
    path: &CopyPath<dyn Copier>,
    storages: &[Arc<dyn Storage>],
    handlers: &HandlerRegistry,
    scratch: &mut Option<Scratch>,
) -> Result<(), CopyError> {
    let ctx = CopyContext {
        handlers,
        cast: &request.cast,
    };
    let mut current_storage = Arc::clone(&request.source.storage);
    let mut current_name = request.source.name.clone();
    let last = path.len() - 1;

    for (i, edge) in path.edges.iter().enumerate() {
        if request.cancel.is_cancelled() {
            return Err(CopyError::Cancelled { hop: i });
        }

        let landing = landing_storage(request, storages, edge.conversion.to.engine)?;
        let is_last = i == last;
        let dest_name = if is_last {
            request.dest.name.clone()
        } else {
            format!("{}~hop{i}", request.dest.name)
        };

        let hop = HopRequest {
            source: ObjectRef::new(current_storage.as_ref(), &current_name),
            dest: ObjectRef::new(landing.as_ref(), &dest_name),
            target_format: edge.conversion.to.format,
            schema: request.schema.as_ref(),
            disposition: if is_last {
                request.disposition
            } else {
                WriteDisposition::Overwrite
            },
        };
        edge.copier.copy(&hop, &ctx)?;
        info!(
            copier = edge.copier.name(),
            conversion = %edge.conversion,
            "completed hop"
        );

        // The previous intermediate has now been consumed.
        if let Some(consumed) = scratch.take() {
            release_scratch(consumed.storage.as_ref(), &consumed.name);
        }
        if !is_last {
            *scratch = Some(Scratch {
                storage: Arc::clone(&landing),
                name: dest_name.clone(),
            });
        }
        current_storage = landing;
        current_name = dest_name;
    }
    Ok(())
}

/// Concrete storage for a hop's landing: the request's destination
/// storage when its engine matches (avoids an extra transfer), else the
/// first available storage of that engine. The planner only emits edges
/// over available engines, so a miss is a defect.
fn landing_storage(
    request: &CopyRequest,
    storages: &[Arc<dyn Storage>],
    engine: StorageEngine,
) -> Result<Arc<dyn Storage>, CopyError> {
    if request.dest.storage.engine() == engine {
        return Ok(Arc::clone(&request.dest.storage));
    }
    storages
        .iter()
        .find(|storage| storage.engine() == engine)
        .cloned()
        .ok_or_else(|| CopyError::Internal {
            detail: format!("no available storage for engine '{engine}'"),
        })
}

/// Release failures are logged, not propagated: the copy itself already
/// committed (or already failed).
fn release_scratch(storage: &dyn Storage, name: &str) {
    let outcome: Result<(), StorageError> = match storage.engine().class() {
        StorageClass::Memory => {
            if let Some(memory) = storage.as_memory() {
                memory.remove(name);
            }
            Ok(())
        }
        StorageClass::Filesystem => match storage.as_filesystem() {
            Some(fs) => fs.remove(name),
            None => Ok(()),
        },
        StorageClass::Database => match storage.as_database() {
            Some(db) => db.drop_table(name),
            None => Ok(()),
        },
    };
    match outcome {
        Ok(()) => info!(name, storage = storage.label(), "released intermediate object"),
        Err(error) => warn!(%error, name, "failed to release intermediate object"),
    }
}
