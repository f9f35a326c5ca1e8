use crate::auth::Identity;
use crate::error::ApiError;

/// The task operation being authorized. Only used to shape denial messages
/// and log lines; the rule itself is identical for every action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionKind {
    Create,
    List,
    Get,
    Update,
    Delete,
    Complete,
}

impl ActionKind {
    fn denial_message(self) -> &'static str {
        match self {
            ActionKind::Create => "Cannot create tasks for other users",
            ActionKind::List | ActionKind::Get => "Cannot access other users' tasks",
            ActionKind::Update => "Cannot update other users' tasks",
            ActionKind::Delete => "Cannot delete other users' tasks",
            ActionKind::Complete => "Cannot modify other users' tasks",
        }
    }
}

/// Path-level authorization: the user id declared in the URL must exactly
/// match the authenticated identity. Exact, case-sensitive string equality.
///
/// This guard runs before any repository access. It does NOT authorize access
/// to an arbitrary task id under one's own path; the repository re-checks
/// per-row ownership independently.
pub fn authorize(path_user_id: &str, identity: &Identity, action: ActionKind) -> Result<(), ApiError> {
    if identity.id == path_user_id {
        return Ok(());
    }

    tracing::warn!(
        "Ownership denied: token identity '{}' attempted {:?} under path user '{}'",
        identity.id,
        action,
        path_user_id
    );
    Err(ApiError::forbidden(action.denial_message()))
}
