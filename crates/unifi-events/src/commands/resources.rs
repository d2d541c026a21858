//! Resource listing handlers. Print the envelope's `data` array.

use serde_json::Value;

use unifi_events_core::{EventClient, data_of};

use crate::cli::{ClientArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn sites(client: &EventClient, global: &GlobalOpts) -> Result<(), CliError> {
    let body = client.list_sites().await?;
    print_data(&body, global);
    Ok(())
}

pub async fn site_stats(client: &EventClient, global: &GlobalOpts) -> Result<(), CliError> {
    let body = client.site_stats().await?;
    print_data(&body, global);
    Ok(())
}

pub async fn clients(client: &EventClient, global: &GlobalOpts) -> Result<(), CliError> {
    let body = client.list_clients().await?;
    print_data(&body, global);
    Ok(())
}

pub async fn client(
    client: &EventClient,
    args: ClientArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = client.get_client(&args.mac).await?;
    match data_of(&body).first() {
        Some(found) => {
            output::print_output(&output::render_value(global.output, found), global.quiet);
            Ok(())
        }
        None => Err(CliError::NotFound {
            status: 404,
            message: format!("no client with MAC {}", args.mac),
            hint: "run `unifi-events clients` to list active clients".into(),
        }),
    }
}

fn print_data(body: &Value, global: &GlobalOpts) {
    let data = Value::Array(data_of(body).to_vec());
    output::print_output(&output::render_value(global.output, &data), global.quiet);
}
