//! Relationship actions that do not fit plain CRUD.

use anyhow::Result;
use apqp_core::models::Id;
use apqp_core::resources::Api;
use clap::Subcommand;

use crate::output::{self, OutputFormat};

#[derive(Subcommand)]
pub enum ActionCommands {
    /// Add a person to a team
    AddMember { team: Id, person: Id },

    /// Remove a person from a team
    RemoveMember { team: Id, person: Id },

    /// Add a person to a team, from the person's side
    AddToTeam { person: Id, team: Id },

    /// Assign an authorization profile to a user
    Assign { user: Id, authorization: Id },

    /// Move a to-do to another status
    ChangeStatus { todo: Id, status: String },

    /// Reassign a to-do to another person
    Reassign { todo: Id, person: Id },

    /// Clone a phase template
    ClonePhaseTemplate {
        template: Id,
        /// Name of the copy
        #[arg(long)]
        name: Option<String>,
    },

    /// Clone an output template
    CloneOutputTemplate {
        template: Id,
        /// Name of the copy
        #[arg(long)]
        name: Option<String>,
    },

    /// Create the standard element set for a PPAP
    SeedElements { ppap: Id },
}

pub async fn execute(cmd: ActionCommands, api: &Api, format: OutputFormat) -> Result<()> {
    let (summary, reply) = match cmd {
        ActionCommands::AddMember { team, person } => (
            format!("Added person #{} to team #{}", person, team),
            api.teams().add_member(team, person).await?,
        ),
        ActionCommands::RemoveMember { team, person } => (
            format!("Removed person #{} from team #{}", person, team),
            api.teams().remove_member(team, person).await?,
        ),
        ActionCommands::AddToTeam { person, team } => (
            format!("Added person #{} to team #{}", person, team),
            api.persons().add_to_team(person, team).await?,
        ),
        ActionCommands::Assign {
            user,
            authorization,
        } => (
            format!("Assigned authorization #{} to user #{}", authorization, user),
            api.authorizations().assign(user, authorization).await?,
        ),
        ActionCommands::ChangeStatus { todo, status } => (
            format!("To-do #{} is now {}", todo, status),
            api.todos().change_status(todo, &status).await?,
        ),
        ActionCommands::Reassign { todo, person } => (
            format!("To-do #{} reassigned to person #{}", todo, person),
            api.todos().reassign(todo, person).await?,
        ),
        ActionCommands::ClonePhaseTemplate { template, name } => (
            format!("Cloned phase template #{}", template),
            api.phase_templates()
                .clone_template(template, name.as_deref())
                .await?,
        ),
        ActionCommands::CloneOutputTemplate { template, name } => (
            format!("Cloned output template #{}", template),
            api.output_templates()
                .clone_template(template, name.as_deref())
                .await?,
        ),
        ActionCommands::SeedElements { ppap } => (
            format!("Seeded elements for PPAP #{}", ppap),
            api.ppaps().seed_elements(ppap).await?,
        ),
    };

    match format {
        OutputFormat::Table => output::print_success(&summary),
        _ => output::print_item(&reply, format)?,
    }
    Ok(())
}
