//! Request and response values exchanged with the HTTP front end
//!
//! The front end parses the transport request, including multipart file
//! parts, into a [`Request`] and writes the returned [`Response`] back out.

use annal_core::{AnnalError, UNKNOWN_USER_ID, UNKNOWN_USER_URI};
use annal_models::UploadedFile;
use annal_render::FormInput;
use serde::Serialize;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// The authenticated user, as established by the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub user_id: String,
    pub user_uri: String,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, user_uri: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            user_uri: user_uri.into(),
        }
    }

    pub fn anonymous() -> Self {
        Self::new(UNKNOWN_USER_ID, UNKNOWN_USER_URI)
    }
}

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Absolute path, without query
    pub path: String,
    pub query: Vec<(String, String)>,
    pub accept: String,
    pub user: UserIdentity,
    pub form: FormInput,
}

impl Request {
    fn new(method: Method, path_and_query: &str) -> Self {
        let (path, query) = match path_and_query.split_once('?') {
            Some((path, query)) => (path, query),
            None => (path_and_query, ""),
        };
        Self {
            method,
            path: path.to_string(),
            query: form_urlencoded::parse(query.as_bytes()).into_owned().collect(),
            accept: "text/html".to_string(),
            user: UserIdentity::anonymous(),
            form: FormInput::new(),
        }
    }

    pub fn get(path_and_query: &str) -> Self {
        Self::new(Method::Get, path_and_query)
    }

    pub fn post(path_and_query: &str) -> Self {
        Self::new(Method::Post, path_and_query)
    }

    pub fn with_accept(mut self, accept: &str) -> Self {
        self.accept = accept.to_string();
        self
    }

    pub fn with_user(mut self, user_id: &str, user_uri: &str) -> Self {
        self.user = UserIdentity::new(user_id, user_uri);
        self
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.form.add(name, value);
        self
    }

    pub fn with_file(mut self, name: &str, file: UploadedFile) -> Self {
        self.form.add_file(name, file);
        self
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Continuation URL from the query or the form
    pub fn continuation_url(&self) -> Option<&str> {
        self.query_param("continuation_url")
            .or_else(|| self.form.get("continuation_url"))
            .filter(|s| !s.is_empty())
    }
}

/// Error details reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    pub status: u16,
    pub reason: String,
    pub detail: String,
    pub continuation_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn html(body: String) -> Self {
        Self::new(200, "text/html; charset=utf-8", body)
    }

    pub fn bytes(content_type: &str, body: Vec<u8>) -> Self {
        Self::new(200, content_type, body)
    }

    pub fn redirect(location: &str) -> Self {
        Self::new(302, "text/plain; charset=utf-8", Vec::new()).with_header("Location", location)
    }

    pub fn from_error(e: &AnnalError, continuation_url: Option<&str>) -> Self {
        let info = ErrorInfo {
            status: e.http_status(),
            reason: reason_phrase(e.http_status()).to_string(),
            detail: e.to_string(),
            continuation_url: continuation_url.map(str::to_string),
        };
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>{0} {1}</title></head><body><h1>{0} {1}</h1><p>{2}</p></body></html>\n",
            info.status,
            annal_render::renderers::html::escape(&info.reason),
            annal_render::renderers::html::escape(&info.detail)
        );
        Self::new(info.status, "text/html; charset=utf-8", body)
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        _ => "Internal Server Error",
    }
}
