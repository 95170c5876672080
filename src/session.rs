//! Cookie-backed admin sessions and one-shot flash notices.

use serde::Serialize;
use sha2::{Digest, Sha512};
use tower_cookies::{Cookie, Cookies, Key, cookie::SameSite};

use crate::forms::AnswerError;

pub const SESSION_COOKIE: &str = "mindcheck-session";
pub const FLASH_COOKIE: &str = "mindcheck-flash";

/// Signing keys must be 64 bytes; any secret is stretched to that with SHA-512.
pub fn signing_key(secret: &str) -> Key {
    let digest = Sha512::digest(secret.as_bytes());
    Key::from(digest.as_slice())
}

pub fn login(cookies: &Cookies, key: &Key, admin_id: i64) {
    let cookie = Cookie::build((SESSION_COOKIE, admin_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookies.signed(key).add(cookie);
}

pub fn logout(cookies: &Cookies) {
    cookies.remove(Cookie::build(SESSION_COOKIE).path("/").build());
}

/// The admin id carried by a correctly signed session cookie, if any.
pub fn current_admin_id(cookies: &Cookies, key: &Key) -> Option<i64> {
    cookies
        .signed(key)
        .get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    IncompleteAnswers,
    InvalidAnswer,
    LoggedIn,
    LoggedOut,
    LoginRequired,
    InvalidCredentials,
}

impl Flash {
    const ALL: [Flash; 6] = [
        Flash::IncompleteAnswers,
        Flash::InvalidAnswer,
        Flash::LoggedIn,
        Flash::LoggedOut,
        Flash::LoginRequired,
        Flash::InvalidCredentials,
    ];

    fn code(self) -> &'static str {
        match self {
            Flash::IncompleteAnswers => "incomplete_answers",
            Flash::InvalidAnswer => "invalid_answer",
            Flash::LoggedIn => "logged_in",
            Flash::LoggedOut => "logged_out",
            Flash::LoginRequired => "login_required",
            Flash::InvalidCredentials => "invalid_credentials",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flash| flash.code() == code)
    }

    pub fn notice(self) -> Notice {
        let (level, message) = match self {
            Flash::IncompleteAnswers => ("danger", "Please answer all questions."),
            Flash::InvalidAnswer => ("danger", "Invalid answer detected."),
            Flash::LoggedIn => ("success", "Logged in successfully!"),
            Flash::LoggedOut => ("info", "Logged out successfully."),
            Flash::LoginRequired => ("info", "Please log in to access this page."),
            Flash::InvalidCredentials => ("danger", "Error: Invalid credentials."),
        };
        Notice { level, message }
    }
}

impl From<AnswerError> for Flash {
    fn from(err: AnswerError) -> Self {
        match err {
            AnswerError::Unanswered { .. } => Flash::IncompleteAnswers,
            AnswerError::OutOfRange { .. } => Flash::InvalidAnswer,
        }
    }
}

/// Queues a notice for the next rendered page.
pub fn set_flash(cookies: &Cookies, flash: Flash) {
    let cookie = Cookie::build((FLASH_COOKIE, flash.code()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    cookies.add(cookie);
}

/// Reads and clears the pending flash notice.
pub fn take_notices(cookies: &Cookies) -> Vec<Notice> {
    let Some(cookie) = cookies.get(FLASH_COOKIE) else {
        return Vec::new();
    };
    cookies.remove(Cookie::build(FLASH_COOKIE).path("/").build());

    Flash::from_code(cookie.value())
        .map(Flash::notice)
        .into_iter()
        .collect()
}
