use serde_json::json;

use crate::cli::context::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::guard::{ComponentGuard, GuardState};
use crate::routes;

/// Run the component guard for `path` without opening anything
pub async fn handle(ctx: &CliContext, path: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    if routes::is_bypassed(path) || routes::required_roles(path).is_empty() {
        return output_success(
            &output_format,
            &format!("{} is a public page", path),
            Some(json!({ "path": path, "allowed": true })),
        );
    }

    ctx.initialize().await;

    let guard = ComponentGuard::for_path(path).login_path(ctx.client().login_path());
    match guard.check(ctx.store(), ctx.navigator()).await {
        GuardState::Allowed => output_success(
            &output_format,
            &format!("{} is open to you", path),
            Some(json!({ "path": path, "allowed": true })),
        ),
        GuardState::Denied { redirect } => output_success(
            &output_format,
            &format!("{} is not open to you; go to {}", path, redirect),
            Some(json!({ "path": path, "allowed": false, "redirect": redirect })),
        ),
        GuardState::Checking => Err(anyhow::anyhow!("Session is still initializing")),
    }
}
