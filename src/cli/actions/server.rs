//! Server action: load the provider registry and run the API.

use crate::api::{self, AppState};
use crate::cli::actions::Action;
use crate::federation::{MemoryBacking, StaticResolver};
use anyhow::{Context, Result};
use std::{fs::File, io::BufReader, path::Path, sync::Arc};
use tracing::info;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server { port, providers } => {
            let resolver = load_registry(&providers)?;
            let backing = Arc::new(MemoryBacking::new());
            let state = Arc::new(AppState::new(backing, Arc::new(resolver)));

            api::new(port, state).await?;
        }
    }

    Ok(())
}

fn load_registry(path: &Path) -> Result<StaticResolver> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open provider registry: {}", path.display()))?;
    let resolver: StaticResolver =
        serde_json::from_reader(BufReader::new(file)).context("Failed to parse provider registry")?;

    info!("Loaded {} providers", resolver.len());

    Ok(resolver)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn registry_loads_from_disk() {
        let path = std::env::temp_dir().join("federado-registry-test.json");
        let mut file = File::create(&path).unwrap();
        file.write_all(
            br#"{"https://idp.example.com": {"authorization_url": "https://idp.example.com/authorize",
                 "callback_url": "https://rp.example.com/cb"}}"#,
        )
        .unwrap();

        let resolver = load_registry(&path).unwrap();
        assert_eq!(resolver.len(), 1);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_registry_is_an_error() {
        let err = load_registry(Path::new("/nonexistent/providers.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to open provider registry"));
    }
}
