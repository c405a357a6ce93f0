use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Todo, TodoPatch, User};
use super::{Store, StoreError};

#[derive(Default)]
struct MemoryInner {
    users: HashMap<Uuid, User>,
    todos: HashMap<Uuid, Todo>,
}

/// Ephemeral backend holding the whole dataset behind one RwLock; every
/// operation completes under a single guard, which gives the same
/// per-record atomicity the Postgres statements provide.
pub struct MemoryStore {
    inner: RwLock<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryInner::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::DuplicateEmail);
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .get(&id)
            .filter(|u| u.tokens.iter().any(|t| t == token))
            .cloned())
    }

    async fn update_user(&self, id: Uuid, email: &str, password_hash: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.id != id && u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = inner.users.get_mut(&id).ok_or(StoreError::UserMissing)?;
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&id).ok_or(StoreError::UserMissing)?;
        user.tokens.push(token.to_string());
        Ok(())
    }

    async fn remove_token(&self, id: Uuid, token: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&id) {
            if let Some(position) = user.tokens.iter().position(|t| t == token) {
                user.tokens.remove(position);
            }
        }
        Ok(())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(user) = inner.users.get_mut(&id) {
            user.tokens.clear();
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner.users.remove(&id);
        inner.todos.retain(|_, todo| todo.owner != id);
        Ok(())
    }

    async fn create_todo(&self, todo: Todo) -> Result<Todo, StoreError> {
        let mut inner = self.inner.write().await;
        inner.todos.insert(todo.id, todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self, owner: Uuid) -> Result<Vec<Todo>, StoreError> {
        let inner = self.inner.read().await;
        let mut todos: Vec<Todo> = inner
            .todos
            .values()
            .filter(|t| t.owner == owner)
            .cloned()
            .collect();
        todos.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(todos)
    }

    async fn find_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.todos.get(&id).filter(|t| t.owner == owner).cloned())
    }

    async fn update_todo(&self, owner: Uuid, id: Uuid, patch: TodoPatch) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;
        let todo = match inner.todos.get_mut(&id).filter(|t| t.owner == owner) {
            Some(todo) => todo,
            None => return Ok(None),
        };

        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        if let Some(date) = patch.date {
            todo.date = date;
        }
        Ok(Some(todo.clone()))
    }

    async fn delete_todo(&self, owner: Uuid, id: Uuid) -> Result<Option<Todo>, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.todos.get(&id).map(|t| t.owner) != Some(owner) {
            return Ok(None);
        }
        Ok(inner.todos.remove(&id))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
