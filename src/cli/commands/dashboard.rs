use crate::cli::context::CliContext;
use crate::cli::utils::output_data;
use crate::cli::OutputFormat;
use crate::types::Role;

/// The dashboard of whichever role is logged in
pub async fn handle(ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    ctx.initialize().await;

    let role = ctx.store().user().map(|u| u.role);
    let path = role.map(|r| r.landing_path()).unwrap_or("/dashboard");

    let data = ctx
        .guarded(path, move || async move {
            let client = ctx.client();
            let data = match role {
                Some(Role::Admin) => client.admin().dashboard().await?,
                Some(Role::Owner) => client.owner().dashboard().await?,
                _ => client.users().dashboard().await?,
            };
            Ok(data)
        })
        .await?;

    output_data(&output_format, &format!("Dashboard ({})", path), data)
}
