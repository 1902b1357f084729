//! Client-side session state.
//!
//! The tokens live here as plain values; every transition is an explicit
//! method so the protocol layer never mutates fields directly.

/// What the currently held tokens entitle the client to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolState {
    /// No anti-forgery token. Only plain GETs are possible.
    Anonymous,
    /// Holds a CSRF token but no session. May register or attempt login.
    TokenAcquired,
    /// Holds both tokens. May rate and log out.
    Authenticated,
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub base_url: Option<String>,
    pub csrf_token: Option<String>,
    pub session_id: Option<String>,
}

impl SessionState {
    pub fn state(&self) -> ProtocolState {
        match (&self.csrf_token, &self.session_id) {
            (Some(_), Some(_)) => ProtocolState::Authenticated,
            (Some(_), None) => ProtocolState::TokenAcquired,
            _ => ProtocolState::Anonymous,
        }
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = Some(url.trim_end_matches('/').to_owned());
    }

    pub fn token_acquired(&mut self, csrf_token: String) {
        self.csrf_token = Some(csrf_token);
    }

    pub fn authenticated(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }

    /// Failed credentials invalidate the token; a fresh one must be
    /// fetched before the next attempt.
    pub fn login_failed(&mut self) {
        self.csrf_token = None;
        self.session_id = None;
    }

    pub fn logged_out(&mut self) {
        self.csrf_token = None;
        self.session_id = None;
    }

    /// The `Cookie` header for the currently held tokens.
    pub fn cookie_header(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(token) = &self.csrf_token {
            pairs.push(format!("csrftoken={token}"));
        }
        if let Some(id) = &self.session_id {
            pairs.push(format!("sessionid={id}"));
        }
        pairs.join("; ")
    }
}
