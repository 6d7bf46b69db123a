//! Role-gated navigation
//!
//! Views are modelled as an explicit [`Route`] and every request for a view
//! goes through [`resolve`], which applies the access rules for the current
//! [`AuthState`]:
//!
//! - anonymous users may visit the landing, login and signup views; anything
//!   else redirects to login
//! - signed-in users are sent to their home view from the public views, and
//!   from the other role's dashboard
//! - any signed-in user may open a course chat

use crate::account::{AuthState, Role};
use std::fmt;

/// A view of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Signup,
    /// Teacher dashboard (course management)
    Dashboard,
    /// Student course list
    Student,
    /// Chat grounded in one course
    CourseChat { course_id: String },
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landing => write!(f, "/"),
            Self::Login => write!(f, "/login"),
            Self::Signup => write!(f, "/signup"),
            Self::Dashboard => write!(f, "/dashboard"),
            Self::Student => write!(f, "/student"),
            Self::CourseChat { course_id } => write!(f, "/course/{}", course_id),
        }
    }
}

/// Home view for a role, used after login and for redirects
pub fn home_route(role: Role) -> Route {
    match role {
        Role::Teacher => Route::Dashboard,
        Role::Student => Route::Student,
    }
}

/// Resolves the view actually shown for a requested route
///
/// # Examples
///
/// ```
/// use aita::account::AuthState;
/// use aita::navigation::{resolve, Route};
///
/// assert_eq!(resolve(Route::Dashboard, &AuthState::Anonymous), Route::Login);
/// ```
pub fn resolve(requested: Route, auth: &AuthState) -> Route {
    match (auth.role(), requested) {
        (None, route @ (Route::Landing | Route::Login | Route::Signup)) => route,
        (None, _) => Route::Login,
        (Some(role), Route::Landing | Route::Login | Route::Signup) => home_route(role),
        (Some(Role::Teacher), Route::Student) => Route::Dashboard,
        (Some(Role::Student), Route::Dashboard) => Route::Student,
        (Some(_), route) => route,
    }
}
