//! One-shot notices carried across a redirect in a signed cookie.

use axum_extra::extract::cookie::{Cookie, SameSite, SignedCookieJar};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    Info,
    Warning,
    Danger,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Success => "success",
            Category::Info => "info",
            Category::Warning => "warning",
            Category::Danger => "danger",
        }
    }

    fn parse(value: &str) -> Self {
        match value {
            "success" => Category::Success,
            "warning" => Category::Warning,
            "danger" => Category::Danger,
            _ => Category::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: Category,
    pub message: String,
}

impl Flash {
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Category::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Category::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Category::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Category::Danger, message)
    }
}

/// Queue a notice for the next rendered page. A notice identical to one
/// already queued is not added again.
pub fn push(jar: SignedCookieJar, flash: Flash) -> SignedCookieJar {
    let mut pending = pending(&jar);
    if pending.contains(&flash) {
        return jar;
    }
    pending.push(flash);

    let pairs: Vec<(&str, &str)> = pending
        .iter()
        .map(|f| (f.category.as_str(), f.message.as_str()))
        .collect();
    let value = serde_urlencoded::to_string(&pairs).unwrap_or_default();

    jar.add(
        Cookie::build((FLASH_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

/// Remove and return all queued notices.
pub fn take(jar: SignedCookieJar) -> (SignedCookieJar, Vec<Flash>) {
    let pending = pending(&jar);
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, pending);
    }
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), pending)
}

fn pending(jar: &SignedCookieJar) -> Vec<Flash> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| serde_urlencoded::from_str::<Vec<(String, String)>>(cookie.value()).ok())
        .unwrap_or_default()
        .into_iter()
        .map(|(category, message)| Flash::new(Category::parse(&category), message))
        .collect()
}
