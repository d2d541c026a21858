//! Generic site-scoped request handlers. Print the full response body.

use std::path::Path;

use serde_json::Value;

use unifi_events_core::EventClient;

use crate::cli::{GlobalOpts, PathArgs, PostArgs};
use crate::error::CliError;
use crate::output;

pub async fn get(client: &EventClient, args: PathArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let body = client.get(&args.path).await?;
    print(&body, global);
    Ok(())
}

pub async fn post(client: &EventClient, args: PostArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let payload = parse_body(&args.data)?;
    let body = client.post(&args.path, &payload).await?;
    print(&body, global);
    Ok(())
}

pub async fn delete(
    client: &EventClient,
    args: PathArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let body = client.delete(&args.path).await?;
    print(&body, global);
    Ok(())
}

fn print(body: &Value, global: &GlobalOpts) {
    output::print_output(&output::render_value(global.output, body), global.quiet);
}

/// Inline JSON, or `@path` to read it from a file.
fn parse_body(data: &str) -> Result<Value, CliError> {
    let text = match data.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))?,
        None => data.to_owned(),
    };
    let value: Value = serde_json::from_str(&text)?;
    if !value.is_object() {
        return Err(CliError::Validation {
            field: "--data".into(),
            reason: "request body must be a JSON object".into(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn inline_body_parses() {
        let value = parse_body(r#"{"cmd":"kick-sta","mac":"aa:bb:cc:dd:ee:ff"}"#).unwrap();
        assert_eq!(value["cmd"], "kick-sta");
    }

    #[test]
    fn file_body_parses() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"name":"lab"}"#).unwrap();
        let value = parse_body(&format!("@{}", file.path().display())).unwrap();
        assert_eq!(value["name"], "lab");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(parse_body("[1,2]"), Err(CliError::Validation { .. })));
        assert!(matches!(parse_body("{oops"), Err(CliError::Json(_))));
    }
}
