use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::models::{BookingDraft, Role, User};

/// One signed-in user context. The draft belongs to the session and dies with it.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user: User,
    pub draft: BookingDraft,
    pub started_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session with an empty draft and returns its token.
    pub fn open(&mut self, user: User) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.sessions.insert(
            token.clone(),
            Session {
                token: token.clone(),
                user,
                draft: BookingDraft::new(),
                started_at: Utc::now().naive_utc(),
            },
        );
        token
    }

    pub fn get(&self, token: &str) -> Option<&Session> {
        self.sessions.get(token)
    }

    pub fn get_mut(&mut self, token: &str) -> Option<&mut Session> {
        self.sessions.get_mut(token)
    }

    pub fn close(&mut self, token: &str) -> Option<Session> {
        self.sessions.remove(token)
    }

    pub fn set_role(&mut self, token: &str, role: Role) -> Option<&User> {
        let session = self.sessions.get_mut(token)?;
        session.user.role = role;
        Some(&session.user)
    }

    /// Propagates a profile change to every session of the user.
    pub fn refresh_user(&mut self, user: &User) {
        for session in self.sessions.values_mut() {
            if session.user.id == user.id {
                let role = session.user.role;
                session.user = User {
                    role,
                    ..user.clone()
                };
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
