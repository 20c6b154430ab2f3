//! Generic CRUD commands shared by every resource subcommand.
//!
//! `apqp <resource> list|get|create|update|delete|filter`. Which operations a
//! resource accepts is decided by the core's marker traits: read-only
//! resources go through [`execute_read_only`], resources without delete
//! through [`execute_mutable`], everything else through [`execute_full`].

use anyhow::{bail, Context, Result};
use apqp_core::models::Id;
use apqp_core::resources::{Api, Deletable, Mutable, Resource};
use clap::{Args, Subcommand};
use serde_json::Value;

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ResourceCommands {
    /// List all items
    List,

    /// Show one item
    Get {
        /// Item ID
        id: Id,
    },

    /// List items whose field matches a value (e.g. `filter status active`)
    Filter {
        /// Field name
        field: String,
        /// Value to match
        value: String,
    },

    /// Create an item from JSON
    Create(DataArgs),

    /// Replace an item with JSON
    Update {
        /// Item ID
        id: Id,
        #[command(flatten)]
        data: DataArgs,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: Id,
    },
}

impl ResourceCommands {
    fn name(&self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Get { .. } => "get",
            Self::Filter { .. } => "filter",
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Request body, inline or from a file.
#[derive(Args)]
pub struct DataArgs {
    /// JSON object, e.g. '{"name": "Bracket launch"}'
    #[arg(short, long, conflicts_with = "file", required_unless_present = "file")]
    pub data: Option<String>,

    /// Path to a JSON file
    #[arg(short, long)]
    pub file: Option<String>,
}

impl DataArgs {
    pub fn into_value(self) -> Result<Value> {
        let raw = match (self.data, self.file) {
            (Some(data), _) => data,
            (None, Some(file)) => std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file))?,
            (None, None) => bail!("Provide --data or --file"),
        };
        let value: Value = serde_json::from_str(&raw).context("Request body is not valid JSON")?;
        if !value.is_object() {
            bail!("Request body must be a JSON object");
        }
        Ok(value)
    }
}

/// List, get and filter.
pub async fn execute_read_only<R: Resource>(
    cmd: ResourceCommands,
    api: &Api,
    format: OutputFormat,
) -> Result<()> {
    let resource = api.resource::<R>();
    match cmd {
        ResourceCommands::List => {
            let items = resource.list().await?;
            output::print_records(&items, format)?;
        }
        ResourceCommands::Get { id } => {
            let item = resource.get(id).await?;
            output::print_item(&item, format)?;
        }
        ResourceCommands::Filter { field, value } => {
            let items = resource.filter(&field, &value).await?;
            output::print_records(&items, format)?;
        }
        other => bail!("{} does not support {}", R::PATH, other.name()),
    }
    Ok(())
}

/// Read operations plus create and update.
pub async fn execute_mutable<R: Mutable>(
    cmd: ResourceCommands,
    api: &Api,
    format: OutputFormat,
) -> Result<()> {
    let resource = api.resource::<R>();
    match cmd {
        ResourceCommands::Create(data) => {
            let item = resource.create(&data.into_value()?).await?;
            let fallback = format!("Created {}", R::ENTITY);
            created_or_updated(item.as_ref(), "Created", &fallback, format)
        }
        ResourceCommands::Update { id, data } => {
            let item = resource.update(id, &data.into_value()?).await?;
            let fallback = format!("Updated {} #{}", R::ENTITY, id);
            created_or_updated(item.as_ref(), "Updated", &fallback, format)
        }
        other => execute_read_only::<R>(other, api, format).await,
    }
}

/// Every operation.
pub async fn execute_full<R: Mutable + Deletable>(
    cmd: ResourceCommands,
    api: &Api,
    format: OutputFormat,
) -> Result<()> {
    match cmd {
        ResourceCommands::Delete { id } => {
            api.resource::<R>().delete(id).await?;
            match format {
                OutputFormat::Table => {
                    output::print_success(&format!("Deleted {} #{}", R::ENTITY, id))
                }
                _ => output::print_item(&serde_json::json!({ "deleted": id }), format)?,
            }
            Ok(())
        }
        other => execute_mutable::<R>(other, api, format).await,
    }
}

/// `fallback` is shown when the backend answered without echoing the item.
fn created_or_updated<T>(
    item: Option<&T>,
    verb: &str,
    fallback: &str,
    format: OutputFormat,
) -> Result<()>
where
    T: apqp_core::models::Record + serde::Serialize,
{
    match (item, format) {
        (Some(item), OutputFormat::Table) => {
            output::print_success(&format!("{} #{} {}", verb, item.id(), item.label()));
            Ok(())
        }
        (Some(item), _) => output::print_item(item, format),
        (None, OutputFormat::Table) => {
            output::print_success(fallback);
            Ok(())
        }
        (None, _) => output::print_item(&serde_json::json!({}), format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_data() {
        let args = DataArgs {
            data: Some(r#"{"name": "Bracket"}"#.to_string()),
            file: None,
        };
        assert_eq!(args.into_value().unwrap()["name"], "Bracket");
    }

    #[test]
    fn test_data_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todo.json");
        std::fs::write(&path, r#"{"title": "Run MSA"}"#).unwrap();

        let args = DataArgs {
            data: None,
            file: Some(path.to_string_lossy().into_owned()),
        };
        assert_eq!(args.into_value().unwrap()["title"], "Run MSA");
    }

    #[test]
    fn test_non_object_body_rejected() {
        let args = DataArgs {
            data: Some("[1, 2]".to_string()),
            file: None,
        };
        assert!(args.into_value().is_err());
    }
}
