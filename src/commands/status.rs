//! Status command implementation.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::probe::snapshot;
use crate::cli::InputArgs;
use crate::domain::SetupError;
use crate::infra::warp_cli::WarpCli;

/// Probe settings and status once and print what they say.
///
/// # Errors
///
/// Returns an error if the organization is missing or the platform is
/// unsupported.
pub async fn run(app: &AppContext, args: &InputArgs) -> Result<()> {
    let organization = args
        .organization()
        .ok_or(SetupError::MissingInput("organization"))?;
    let platform = args.target_platform()?;
    let client = WarpCli::for_platform(platform);
    let snap = snapshot(&client, organization).await;

    if app.is_json() {
        let out = serde_json::json!({
            "organization": organization,
            "platform": platform.as_str(),
            "registration": snap.registration.to_string(),
            "connection": snap.connection.to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        app.output.kv("organization", organization);
        app.output.kv("registration", &snap.registration.to_string());
        app.output.kv("connection", &snap.connection.to_string());
    }
    Ok(())
}
