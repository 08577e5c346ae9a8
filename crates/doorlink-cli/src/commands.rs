//! Subcommand handlers.
//!
//! `arm`/`disarm` render their result through the session's sink, the
//! same path a pushed event takes. Destructive system operations ask
//! for confirmation first, as the original page's dialogs did.

use dialoguer::Confirm;

use doorlink_api::codec::SystemOp;
use doorlink_core::AlarmSession;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

pub async fn dispatch(
    command: Command,
    session: &AlarmSession,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match command {
        Command::Arm => {
            session.set_armed(true).await?;
            Ok(())
        }

        Command::Disarm => {
            session.set_armed(false).await?;
            Ok(())
        }

        Command::Watch => watch(session).await,

        Command::Shutdown => {
            if !confirm("Are you sure you want to shut down the appliance?", global.yes)? {
                return Ok(());
            }
            let result = session.system_operation(SystemOp::Shutdown).await?;
            eprintln!("{result}");
            Ok(())
        }

        Command::Reboot => {
            if !confirm("Are you sure you want to reboot the appliance?", global.yes)? {
                return Ok(());
            }
            let result = session.system_operation(SystemOp::Reboot).await?;
            eprintln!("{result}");
            Ok(())
        }

        Command::CheckUpdates => {
            // The notice fires before the response arrives -- immediate
            // feedback, since the appliance may restart mid-request.
            eprintln!("Checking for updates, the appliance will restart if a new version is available.");
            let result = session.system_operation(SystemOp::CheckUpdates).await?;
            tracing::info!(result = %result, "update check requested");
            Ok(())
        }
    }
}

/// Follow live state until interrupted.
async fn watch(session: &AlarmSession) -> Result<(), CliError> {
    let mut link = session.link_state();
    tokio::spawn(async move {
        while link.changed().await.is_ok() {
            let state = *link.borrow_and_update();
            tracing::info!(%state, "push channel link");
        }
    });

    session.connect();
    eprintln!("Watching appliance state, press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    session.shutdown();
    Ok(())
}

fn confirm(prompt: &str, yes: bool) -> Result<bool, CliError> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
