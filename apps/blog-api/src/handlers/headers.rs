//! Alert headers attached to entity write responses.
//!
//! A successful write carries `X-<app>-alert` (a human-readable message) and
//! `X-<app>-params` (the entity id). A rejected write carries
//! `X-<app>-error` (`error.<key>`) and `X-<app>-params` (the entity name).

use actix_web::HttpResponseBuilder;

/// A set of response headers describing the outcome of a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    headers: Vec<(String, String)>,
}

impl Alert {
    #[cfg(test)]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn apply(&self, builder: &mut HttpResponseBuilder) {
        for (name, value) in &self.headers {
            builder.insert_header((name.clone(), value.clone()));
        }
    }
}

/// Builds alert headers namespaced by the application name.
#[derive(Debug, Clone)]
pub struct AlertHeaders {
    app_name: String,
}

impl AlertHeaders {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
        }
    }

    fn header(&self, suffix: &str) -> String {
        format!("X-{}-{}", self.app_name, suffix)
    }

    fn alert(&self, message: String, param: String) -> Alert {
        Alert {
            headers: vec![(self.header("alert"), message), (self.header("params"), param)],
        }
    }

    pub fn entity_creation(&self, entity: &str, id: i64) -> Alert {
        self.alert(
            format!("A new {entity} is created with identifier {id}"),
            id.to_string(),
        )
    }

    pub fn entity_update(&self, entity: &str, id: i64) -> Alert {
        self.alert(
            format!("A {entity} is updated with identifier {id}"),
            id.to_string(),
        )
    }

    pub fn entity_deletion(&self, entity: &str, id: i64) -> Alert {
        self.alert(
            format!("A {entity} is deleted with identifier {id}"),
            id.to_string(),
        )
    }

    pub fn failure(&self, entity: &str, error_key: &str, message: &str) -> Alert {
        tracing::warn!(entity, error_key, "Entity processing failed: {}", message);
        Alert {
            headers: vec![
                (self.header("error"), format!("error.{error_key}")),
                (self.header("params"), entity.to_string()),
            ],
        }
    }
}
