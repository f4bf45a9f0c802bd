//! Navigation surface: `/`, `/upload` and `/dashboard/{model_version}`.

use std::fmt;

/// A resolved navigation target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/` entry page with the demo and upload links
    Landing,
    /// `/upload` registration form
    Upload,
    /// `/dashboard/{model_version}` monitoring view; the version is opaque
    Dashboard { model_version: String },
    NotFound { path: String },
}

impl Route {
    pub fn dashboard(model_version: impl Into<String>) -> Self {
        Route::Dashboard {
            model_version: model_version.into(),
        }
    }

    /// Resolve a path. Query strings, fragments and a trailing slash are ignored.
    pub fn parse(path: &str) -> Self {
        let trimmed = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let segments: Vec<&str> = trimmed
            .strip_prefix('/')
            .unwrap_or(trimmed)
            .split('/')
            .collect();

        match segments.as_slice() {
            [""] => Route::Landing,
            ["upload"] => Route::Upload,
            ["dashboard", version] if !version.is_empty() => Route::dashboard(*version),
            _ => Route::NotFound {
                path: path.to_string(),
            },
        }
    }

    /// Canonical path for this route.
    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Upload => "/upload".to_string(),
            Route::Dashboard { model_version } => format!("/dashboard/{}", model_version),
            Route::NotFound { path } => path.clone(),
        }
    }

    pub fn model_version(&self) -> Option<&str> {
        match self {
            Route::Dashboard { model_version } => Some(model_version),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
