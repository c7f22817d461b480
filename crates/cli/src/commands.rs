//! Subcommand execution.

use anyhow::Result;
use resolver::TaxonomyService;
use serde_json::{json, Value};
use taxonomy::{TaxonomyCode, TaxonomyError, TaxonomyTransport};

use crate::args::Command;

/// Exit status for lookups of codes the taxonomy does not contain.
pub const EXIT_NOT_FOUND: u8 = 2;

/// Runs `command` against `service` and returns the JSON to print.
#[tracing::instrument(skip(service))]
pub async fn execute<T: TaxonomyTransport>(
    command: Command,
    service: &TaxonomyService<T>,
) -> Result<Value> {
    let output = match command {
        Command::Version => serde_json::to_value(service.version_info().await?)?,
        Command::Attribute { code } => {
            serde_json::to_value(service.attribute(TaxonomyCode::new(code)).await?)?
        }
        Command::Entity { code } => {
            serde_json::to_value(service.entity(TaxonomyCode::new(code)).await?)?
        }
        Command::ParentEntity { code } => {
            serde_json::to_value(service.parent_entity(TaxonomyCode::new(code)).await?)?
        }
        Command::HasHierarchicalValues { code } => {
            let hierarchical = service
                .has_hierarchical_value_list(TaxonomyCode::new(code))
                .await?;
            json!({ "attribute": code, "hierarchical": hierarchical })
        }
        Command::ValueList { code } => {
            serde_json::to_value(service.value_list(TaxonomyCode::new(code)).await?)?
        }
    };
    Ok(output)
}

/// Process exit status for a failed command.
pub fn exit_status(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TaxonomyError>() {
        Some(TaxonomyError::NotFound { .. }) => EXIT_NOT_FOUND,
        _ => 1,
    }
}
