//! Error types for the documentation generator
//!
//! Errors close to the network boundary are usually degraded by the caller
//! (see `resolve` and `catalog`); only `DocgenError` reaches the operator.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Profile;

/// Repository access failed (transport, HTTP status or payload decoding)
#[derive(Error, Debug, Clone)]
pub enum RemoteError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("repository returned {status} for {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    #[error("node {profile}/{id} not found")]
    NotFound { profile: String, id: String },
}

/// A reference could not be resolved against the fetched snapshot
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no {profile} node with id '{id}'")]
    NotFound { profile: Profile, id: String },

    #[error("empty reference")]
    Empty,
}

/// Template registration, rendering or output failure
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("template '{0}' is not registered")]
    UnknownTemplate(String),

    #[error("invalid template '{name}': {source}")]
    Template {
        name: String,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration could not be loaded or is invalid
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid base url '{value}': {source}")]
    BaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Top-level error for one generation run or one document family
#[derive(Error, Debug)]
pub enum DocgenError {
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("no {profile} node found")]
    MissingRoot { profile: Profile },

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DocgenError>;
