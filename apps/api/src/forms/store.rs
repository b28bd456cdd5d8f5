use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::forms::session::FormSession;

/// In-memory registry of live forms. Each form owns its session behind its
/// own lock, so work on one form never blocks another.
#[derive(Debug, Default)]
pub struct FormStore {
    forms: RwLock<HashMap<Uuid, Arc<Mutex<FormSession>>>>,
}

impl FormStore {
    pub async fn create(&self) -> (Uuid, Arc<Mutex<FormSession>>) {
        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(FormSession::default()));
        self.forms.write().await.insert(id, Arc::clone(&session));
        (id, session)
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<FormSession>>> {
        self.forms.read().await.get(&id).cloned()
    }

    /// Drops the form. Requests already holding its session finish normally.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.forms.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.forms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_get_returns_same_session() {
        let store = FormStore::default();
        let (id, session) = store.create().await;
        session.lock().await.form.title = Some("Java案件".to_string());

        let fetched = store.get(id).await.unwrap();
        assert!(Arc::ptr_eq(&session, &fetched));
        assert_eq!(fetched.lock().await.form.title.as_deref(), Some("Java案件"));
    }

    #[tokio::test]
    async fn test_unknown_id_is_none() {
        let store = FormStore::default();
        store.create().await;
        assert!(store.get(Uuid::new_v4()).await.is_none());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_forgets_form() {
        let store = FormStore::default();
        let (id, _) = store.create().await;
        assert!(store.remove(id).await);
        assert!(store.get(id).await.is_none());
        assert!(!store.remove(id).await);
        assert_eq!(store.len().await, 0);
    }
}
