use clap::Args;

use filegate::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.app_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!("  port:         {}", state.config.port));
                lines.push(format!("  root:         {}", state.config.root_dir.display()));
                let auth = if state.config.auth_code.as_deref().is_some_and(|c| !c.is_empty()) {
                    "enabled"
                } else {
                    "disabled"
                };
                lines.push(format!("  auth:         {}", auth));
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Probe the running server
        lines.push(String::new());
        lines.push(format!("Server ({}):", ctx.remote));

        for (label, path) in [("livez: ", "/_status/livez"), ("readyz:", "/_status/readyz")] {
            match ctx.client.get(ctx.endpoint(path)).send().await {
                Ok(resp) if resp.status().is_success() => {
                    lines.push(format!("  {} OK", label));
                }
                Ok(resp) => {
                    lines.push(format!("  {} UNHEALTHY ({})", label, resp.status()));
                }
                Err(_) => {
                    lines.push(format!("  {} NOT REACHABLE", label));
                }
            }
        }

        Ok(lines.join("\n"))
    }
}
