use std::sync::Arc;

use burrow_core::{CreateParams, Credential, LinkStore, Registry, RegistryError, Token};
use burrow_registry::{RegistryConfig, RegistryService};
use burrow_storage::{FileLinkStore, InMemoryLinkStore, SqliteLinkStore};

fn config() -> RegistryConfig {
    RegistryConfig::builder().seed("s1").build()
}

async fn create_resolve_delete<S: LinkStore>(registry: &RegistryService<S>) {
    let record = registry
        .create(CreateParams::new("https://example.com"))
        .await
        .unwrap();
    assert!(!record.token.as_str().is_empty());
    assert!(!record.credential.is_empty());
    assert_ne!(record.credential.as_str(), record.token.as_str());

    let resolved = registry.resolve(&record.token).await.unwrap();
    assert_eq!(resolved.target, "https://example.com");

    registry
        .delete(&record.token, &record.credential)
        .await
        .unwrap();
    assert!(matches!(
        registry.resolve(&record.token).await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.delete(&record.token, &record.credential).await,
        Err(RegistryError::NotFound(_))
    ));
}

async fn wrong_credential_never_deletes<S: LinkStore>(registry: &RegistryService<S>) {
    let record = registry
        .create(CreateParams::new("https://example.com/keep").with_token("keep"))
        .await
        .unwrap();

    for wrong in ["", "nope", &record.credential.as_str()[1..]] {
        let err = registry
            .delete(&record.token, &Credential::new(wrong))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(_)));
    }

    assert_eq!(registry.resolve(&record.token).await.unwrap(), record);
}

async fn racing_requested_tokens<S: LinkStore>(registry: Arc<RegistryService<S>>) {
    let mut handles = Vec::new();
    for i in 0..2 {
        let registry = Arc::clone(&registry);
        handles.push(tokio::spawn(async move {
            registry
                .create(
                    CreateParams::new(format!("https://racer{i}.example")).with_token("contested"),
                )
                .await
        }));
    }

    let mut created = Vec::new();
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(record) => created.push(record),
            Err(RegistryError::AlreadyExists(token)) => {
                assert_eq!(token, "contested");
                rejected += 1;
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    assert_eq!(created.len(), 1);
    assert_eq!(rejected, 1);
    let stored = registry
        .resolve(&Token::new("contested").unwrap())
        .await
        .unwrap();
    assert_eq!(stored, created[0]);
}

async fn repeated_target_never_overwrites<S: LinkStore>(registry: &RegistryService<S>) {
    let first = registry
        .create(CreateParams::new("https://example.com/a"))
        .await
        .unwrap();
    let second = registry
        .create(CreateParams::new("https://example.com/a"))
        .await
        .unwrap();

    assert_ne!(first.token, second.token);
    assert_eq!(registry.resolve(&first.token).await.unwrap(), first);
    assert_eq!(registry.resolve(&second.token).await.unwrap(), second);

    // The first owner's credential still works and only removes its own record.
    registry
        .delete(&first.token, &first.credential)
        .await
        .unwrap();
    assert_eq!(registry.resolve(&second.token).await.unwrap(), second);
}

macro_rules! registry_tests {
    ($backend:ident, $store:expr) => {
        mod $backend {
            use super::*;

            #[tokio::test]
            async fn lifecycle() {
                let (_dir, store) = $store;
                let registry = RegistryService::new(store, config()).unwrap();
                create_resolve_delete(&registry).await;
            }

            #[tokio::test]
            async fn wrong_credential() {
                let (_dir, store) = $store;
                let registry = RegistryService::new(store, config()).unwrap();
                wrong_credential_never_deletes(&registry).await;
            }

            #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
            async fn racing_requested() {
                let (_dir, store) = $store;
                let registry = Arc::new(RegistryService::new(store, config()).unwrap());
                racing_requested_tokens(registry).await;
            }

            #[tokio::test]
            async fn repeated_target() {
                let (_dir, store) = $store;
                let registry = RegistryService::new(store, config()).unwrap();
                repeated_target_never_overwrites(&registry).await;
            }
        }
    };
}

registry_tests!(in_memory, (None::<tempfile::TempDir>, InMemoryLinkStore::new()));
registry_tests!(sqlite, {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLinkStore::open(dir.path().join("links.db"))
        .await
        .unwrap();
    (Some(dir), store)
});
registry_tests!(files, {
    let dir = tempfile::tempdir().unwrap();
    let store = FileLinkStore::open(dir.path()).await.unwrap();
    (Some(dir), store)
});
