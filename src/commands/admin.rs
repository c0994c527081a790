//! Admin command - creates admin panel accounts from the shell.

use std::sync::Arc;

use crate::cli::args::{AdminAction, AdminArgs};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Database, Persistence};
use crate::services::{AdminManager, AdminService};

pub async fn execute(args: AdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let admins = AdminManager::new(Arc::new(Persistence::new(db.get_connection())), config);

    match args.action {
        AdminAction::Create { username, password } => {
            let admin = admins.create(username, password).await?;
            println!("Created admin {} (id {})", admin.username, admin.id);
        }
    }

    Ok(())
}
