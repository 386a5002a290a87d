//! Navigation rules the client pages apply to the user object they keep in
//! local storage under [`STORAGE_KEY`].
//!
//! None of this is enforced by the API: any caller that can reach the
//! endpoints can use all of them.

use serde::{Deserialize, Serialize};

use crate::{auth::password::is_long_enough, users::repo_types::Role};

pub const STORAGE_KEY: &str = "user";

/// The object the client stored after logging in. Login responses carry no
/// role, so `role` is usually `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub role: Option<i64>,
}

impl StoredUser {
    /// Reads the stored value; anything unparseable counts as logged out.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        serde_json::from_str(raw?).ok()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(i64::from(Role::Admin))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Login,
    Register,
    Company,
    Dashboard,
    AdminUsers,
    AdminAddUser,
    AdminEditUser(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Audience {
    Anyone,
    LoggedIn,
    Admin,
}

impl Page {
    pub fn path(&self) -> String {
        match self {
            Page::Login => "/login".into(),
            Page::Register => "/register".into(),
            Page::Company => "/company".into(),
            Page::Dashboard => "/dashboard".into(),
            Page::AdminUsers => "/admin/users".into(),
            Page::AdminAddUser => "/admin/users/add".into(),
            Page::AdminEditUser(id) => format!("/admin/users/edit?id={id}"),
        }
    }

    fn audience(&self) -> Audience {
        match self {
            Page::Login | Page::Register | Page::Company => Audience::Anyone,
            Page::Dashboard => Audience::LoggedIn,
            Page::AdminUsers | Page::AdminAddUser | Page::AdminEditUser(_) => Audience::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Allow,
    RedirectTo(Page),
}

/// Decision a page makes on mount, given the raw stored value.
pub fn gate(page: Page, stored: Option<&str>) -> Gate {
    let audience = page.audience();
    if audience == Audience::Anyone {
        return Gate::Allow;
    }
    match StoredUser::parse(stored) {
        None => Gate::RedirectTo(Page::Login),
        Some(user) if audience == Audience::Admin && !user.is_admin() => {
            Gate::RedirectTo(Page::Dashboard)
        }
        Some(_) => Gate::Allow,
    }
}

/// The user list disables delete on the viewer's own row.
pub fn can_delete(current: &StoredUser, target_id: i64) -> bool {
    current.id != target_id
}

/// The dashboard links to user management for admins only.
pub fn shows_admin_link(current: &StoredUser) -> bool {
    current.is_admin()
}

/// Checks the add-user form runs before it posts anything. The confirmation
/// is compared first, so a short mismatched pair reports the mismatch.
pub fn validate_new_user(password: &str, confirm: &str) -> Result<(), &'static str> {
    if password != confirm {
        return Err("Password tidak sama");
    }
    if !is_long_enough(password) {
        return Err("Password minimal 6 karakter");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    LoggedIn,
    Registered,
    UserSaved,
    LoggedOut,
}

/// What happens to local storage after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageChange {
    Keep,
    Store(StoredUser),
    Clear,
}

/// Where the client goes after a successful action, and what it does to the
/// stored user on the way.
pub fn after(action: Action, login_user: Option<StoredUser>) -> (Page, StorageChange) {
    match action {
        Action::LoggedIn => (
            Page::Dashboard,
            login_user.map_or(StorageChange::Keep, StorageChange::Store),
        ),
        Action::Registered => (Page::Login, StorageChange::Keep),
        Action::UserSaved => (Page::AdminUsers, StorageChange::Keep),
        Action::LoggedOut => (Page::Login, StorageChange::Clear),
    }
}
