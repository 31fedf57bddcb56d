//! Relative paths of the backend endpoints.
//!
//! Paths are joined onto the configured base URL by the client, so none of
//! them carry a leading slash.

/// Page size used by both listings.
pub const PAGE_LIMIT: u32 = 6;

pub const AUTH_LOGIN: &str = "auth/login";
pub const AUTH_REGISTER: &str = "auth/register";
pub const AUTH_GOOGLE: &str = "auth/google";
pub const AUTH_LOGOUT: &str = "auth/logout";

pub const CODE_CREATE: &str = "code/create";
pub const CODE_ALL: &str = "code/all";
pub const CODE_ALL_PUBLIC: &str = "code/all/public";

pub const REVIEW_ALL: &str = "review/all";

pub const USER_GET: &str = "user/get";
pub const USER_UPDATE: &str = "user/update";
pub const USER_DELETE: &str = "user/delete";

pub const FEEDBACK_CREATE: &str = "feedback/create";

pub fn code_get(slug: &str) -> String {
    format!("code/get/{}", slug)
}

pub fn code_get_public(slug: &str) -> String {
    format!("code/get/public/{}", slug)
}

pub fn code_update(slug: &str) -> String {
    format!("code/update/{}", slug)
}

pub fn code_delete(slug: &str) -> String {
    format!("code/delete/{}", slug)
}

pub fn code_re_review(slug: &str) -> String {
    format!("code/re-review/{}", slug)
}

/// `id` is the submission id.
pub fn review_submit(id: &str) -> String {
    format!("review/submit/{}", id)
}

/// `id` is the comment id.
pub fn review_update(id: &str) -> String {
    format!("review/update/{}", id)
}

/// `id` is the comment id.
pub fn review_delete(id: &str) -> String {
    format!("review/delete/{}", id)
}

pub fn like_add(id: &str) -> String {
    format!("like/add/{}", id)
}

/// Join `base` and `path` with exactly one slash between them.
pub fn join(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
