//! `listen`: follow the event stream until Ctrl-C or `--count` events.

use tracing::{debug, info};

use unifi_events_core::{EventClient, Notification, Topic};

use crate::cli::{GlobalOpts, ListenArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &EventClient,
    args: ListenArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filters = args.filters;
    let color = output::should_color(global.color);

    // Subscribe before starting so nothing published early is missed.
    let mut notifications = client.subscribe(Topic::All);
    client.start().await?;
    info!(
        filters = %filters.iter().map(ToString::to_string).collect::<Vec<_>>().join(","),
        "listening for events"
    );

    let mut events_seen = 0_u64;
    loop {
        let note = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                debug!("interrupted");
                break;
            }
            note = notifications.recv() => match note {
                Some(note) => note,
                None => break,
            },
        };

        if !filters.iter().any(|topic| topic.matches(&note)) {
            continue;
        }

        output::print_output(
            &output::render_notification(global.output, &note, color),
            global.quiet,
        );

        if matches!(*note, Notification::Event(_)) {
            events_seen += 1;
            if args.count.is_some_and(|limit| events_seen >= limit) {
                break;
            }
        }
    }

    client.shutdown().await;
    Ok(())
}
