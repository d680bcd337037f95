use std::time::Duration;

use clap::Args;
use randblem_app::SessionOrigin;
use randblem_bungie::PollConfig;
use tokio::sync::watch;

use crate::cli::common::{CliContext, SessionArgs};

#[derive(Debug, Args)]
pub(crate) struct RunCommand {
    #[command(flatten)]
    session: SessionArgs,

    /// Delay between poll cycles.
    #[arg(long, default_value_t = 5)]
    interval_secs: u64,

    /// Upper bound for the delay after repeated failed cycles.
    #[arg(long, default_value_t = 60)]
    max_backoff_secs: u64,
}

impl RunCommand {
    pub(crate) async fn run(&self, ctx: &CliContext) -> anyhow::Result<()> {
        let app = ctx.open_app()?;
        let (client, origin) = self.session.connect(&app).await?;
        match origin {
            SessionOrigin::Restored => println!("Using stored login."),
            SessionOrigin::Exchanged => println!("Logged in; refresh token saved."),
        }

        let config = self.poll_config();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let app_for_task = app.clone();
        let mut poll_task = tokio::spawn(async move {
            app_for_task
                .run_until_shutdown(client, config, shutdown_rx)
                .await
        });

        println!("Watching for orbit. Press Ctrl+C to stop.");

        let mut updates = app.subscribe();
        loop {
            tokio::select! {
                outcome = &mut poll_task => {
                    let metrics = outcome?;
                    eprintln!("Poll loop exited after {} equips.", metrics.equips);
                    return Ok(());
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("Stopping...");
                    let _ = shutdown_tx.send(true);
                    break;
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    match (&snapshot.last_equipped, snapshot.last_orbit_entry) {
                        (Some(equipped), Some(entered)) if equipped.orbit_entered_at == entered => {
                            println!(
                                "equipped emblem {} on character {} ({} total)",
                                equipped.item_instance_id, equipped.character_id, snapshot.equips
                            );
                        }
                        (_, Some(entered)) => println!("entered orbit at {entered}"),
                        _ => {}
                    }
                }
            }
        }

        let metrics = poll_task.await?;
        println!("Equipped {} emblems this session.", metrics.equips);
        Ok(())
    }

    fn poll_config(&self) -> PollConfig {
        let interval = Duration::from_secs(self.interval_secs.max(1));
        PollConfig {
            interval,
            failure_backoff_initial: interval,
            failure_backoff_max: Duration::from_secs(self.max_backoff_secs).max(interval),
        }
    }
}
