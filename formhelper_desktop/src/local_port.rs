use async_trait::async_trait;
use formhelper_backend::commands::CommandRouter;
use formhelper_backend::database::Database;
use formhelper_frontend::port::{CommandError, RemoteCommandPort};
use serde_json::Value;

/// Dispatches commands straight into the backend router, without HTTP.
#[derive(Clone)]
pub struct LocalCommandPort {
    router: CommandRouter,
}

impl LocalCommandPort {
    pub fn new(database: Database) -> Self {
        Self {
            router: CommandRouter::new(database),
        }
    }
}

#[async_trait]
impl RemoteCommandPort for LocalCommandPort {
    async fn invoke(&self, command: &str, args: Value) -> Result<Value, CommandError> {
        let router = self.router.clone();
        let name = command.to_string();
        // SQLite calls block; keep them off the async workers.
        let result = tokio::task::spawn_blocking(move || router.dispatch(&name, args))
            .await
            .map_err(|err| CommandError::Transport(format!("command task failed: {err}")))?;
        result.map_err(|failure| CommandError::Application {
            kind: failure.kind().to_string(),
            message: failure.to_string(),
        })
    }
}
