//! Resource client facade.
//!
//! One typed client per backend collection, all built on [`ApiClient`]. Every
//! resource lives under `/api/<path>/` and shares the same operations:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list`    | `GET /api/<path>/` |
//! | `get`     | `GET /api/<path>/<id>/` |
//! | `filter`  | `GET /api/<path>/by_<field>/?<field>=<value>` |
//! | `create`  | `POST /api/<path>/` |
//! | `update`  | `PUT /api/<path>/<id>/` |
//! | `delete`  | `DELETE /api/<path>/<id>/` |
//!
//! `create`/`update` exist only for [`Mutable`] resources and `delete` only for
//! [`Deletable`] ones, so calling them on the history log does not compile.
//! Relationship actions (team membership, to-do reassignment, template cloning
//! and so on) are inherent methods on the specific resource client.
//!
//! Failures from the request core are returned unchanged. An empty success
//! body (`{}` after normalization) is not a failure: lists come back empty and
//! `create`/`update` return `None`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::client::{decode, ApiClient, Method};
use crate::error::Result;
use crate::models::{self, Id, ListPayload, Record};

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Traits
// ═══════════════════════════════════════════════════════════════════════════════

/// A backend collection.
pub trait Resource {
    /// Path segment under `/api/`.
    const PATH: &'static str;
    /// Entity type name used by permission sets.
    const ENTITY: &'static str;
    /// Decoded representation of one item.
    type Model: DeserializeOwned + Serialize + Record + Send;
}

/// Resources that accept create and update.
pub trait Mutable: Resource {}

/// Resources that accept delete.
pub trait Deletable: Resource {}

macro_rules! resource {
    ($(#[$meta:meta])* $name:ident, $path:literal, $entity:literal, $model:ty $(, $marker:ident)*) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub enum $name {}

        impl Resource for $name {
            const PATH: &'static str = $path;
            const ENTITY: &'static str = $entity;
            type Model = $model;
        }

        $(impl $marker for $name {})*
    };
}

resource!(Projects, "projects", "project", models::Project, Mutable, Deletable);
resource!(Ppaps, "ppaps", "ppap", models::Ppap, Mutable, Deletable);
resource!(Phases, "phases", "phase", models::Phase, Mutable, Deletable);
resource!(Outputs, "outputs", "output", models::Output, Mutable, Deletable);
resource!(Documents, "documents", "document", models::Document, Mutable, Deletable);
resource!(Teams, "teams", "team", models::Team, Mutable, Deletable);
resource!(Persons, "persons", "person", models::Person, Mutable, Deletable);
resource!(Departments, "departments", "department", models::Department, Mutable, Deletable);
resource!(Contacts, "contacts", "contact", models::Contact, Mutable, Deletable);
resource!(Clients, "clients", "client", models::Client, Mutable, Deletable);
resource!(
    PhaseTemplates,
    "phase-templates",
    "phase_template",
    models::PhaseTemplate,
    Mutable,
    Deletable
);
resource!(
    OutputTemplates,
    "output-templates",
    "output_template",
    models::OutputTemplate,
    Mutable,
    Deletable
);
resource!(Elements, "elements", "element", models::Element, Mutable, Deletable);
resource!(Todos, "todos", "todo", models::Todo, Mutable, Deletable);
resource!(
    /// Audit log. Read-only.
    History,
    "history",
    "history",
    models::HistoryEntry
);
resource!(
    /// User accounts. Deactivated rather than deleted.
    Users,
    "users",
    "user",
    models::User,
    Mutable
);
resource!(
    Authorizations,
    "authorizations",
    "authorization",
    models::Authorization,
    Mutable,
    Deletable
);

// ═══════════════════════════════════════════════════════════════════════════════
// Resource Client
// ═══════════════════════════════════════════════════════════════════════════════

/// Typed operations on one resource, borrowing the shared [`ApiClient`].
pub struct ResourceClient<'a, R> {
    client: &'a ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceClient<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceClient<'_, R> {}

impl<'a, R: Resource> ResourceClient<'a, R> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// `/api/<path>/`
    pub fn collection_path(&self) -> String {
        format!("/api/{}/", R::PATH)
    }

    /// `/api/<path>/<id>/`
    pub fn item_path(&self, id: Id) -> String {
        format!("/api/{}/{}/", R::PATH, id)
    }

    /// `/api/<path>/by_<field>/?<field>=<value>` with `value` URL-encoded.
    pub fn filter_path(&self, field: &str, value: &str) -> String {
        format!(
            "/api/{}/by_{}/?{}={}",
            R::PATH,
            field,
            field,
            urlencoding::encode(value)
        )
    }

    /// Fetch every item. Paginated responses yield the first page's results.
    pub async fn list(&self) -> Result<Vec<R::Model>> {
        Ok(self.list_page().await?.into_items())
    }

    /// Fetch the collection keeping the page envelope, if any.
    pub async fn list_page(&self) -> Result<ListPayload<R::Model>> {
        self.fetch_list(&self.collection_path()).await
    }

    pub async fn get(&self, id: Id) -> Result<R::Model> {
        self.client.get(&self.item_path(id)).await
    }

    /// Fetch items matching `field == value` through the `by_<field>` route.
    pub async fn filter(&self, field: &str, value: &str) -> Result<Vec<R::Model>> {
        let payload = self.fetch_list(&self.filter_path(field, value)).await?;
        Ok(payload.into_items())
    }

    async fn fetch_list(&self, endpoint: &str) -> Result<ListPayload<R::Model>> {
        let value = self.client.request(Method::Get, endpoint, None).await?;
        Ok(decode_optional(value, endpoint)?.unwrap_or(ListPayload::Items(Vec::new())))
    }

    /// POST a relationship action and return the backend's reply as-is.
    async fn action(&self, id: Option<Id>, name: &str, body: Value) -> Result<Value> {
        let endpoint = match id {
            Some(id) => format!("/api/{}/{}/{}/", R::PATH, id, name),
            None => format!("/api/{}/{}/", R::PATH, name),
        };
        debug!(resource = R::PATH, action = name, "Resource action");
        self.client.post(&endpoint, &body).await
    }
}

impl<R: Mutable> ResourceClient<'_, R> {
    /// Create an item. `None` when the backend accepted it without echoing it.
    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Option<R::Model>> {
        self.write(Method::Post, &self.collection_path(), data).await
    }

    /// Replace an item. `None` when the backend answered with an empty body.
    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: Id,
        data: &B,
    ) -> Result<Option<R::Model>> {
        self.write(Method::Put, &self.item_path(id), data).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        data: &B,
    ) -> Result<Option<R::Model>> {
        let body = serde_json::to_value(data)?;
        let value = self.client.request(method, endpoint, Some(&body)).await?;
        decode_optional(value, endpoint)
    }
}

impl<R: Deletable> ResourceClient<'_, R> {
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.client.delete(&self.item_path(id)).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Named filters
// ─────────────────────────────────────────────────────────────────────────────

impl ResourceClient<'_, Projects> {
    pub async fn by_status(&self, status: &str) -> Result<Vec<models::Project>> {
        self.filter("status", status).await
    }
}

impl ResourceClient<'_, Ppaps> {
    pub async fn by_status(&self, status: &str) -> Result<Vec<models::Ppap>> {
        self.filter("status", status).await
    }

    pub async fn by_level(&self, level: u8) -> Result<Vec<models::Ppap>> {
        self.filter("level", &level.to_string()).await
    }

    /// Create the standard element set for a PPAP.
    pub async fn seed_elements(&self, ppap: Id) -> Result<Value> {
        self.action(Some(ppap), "seed_elements", json!({ "ppap_id": ppap }))
            .await
    }
}

impl ResourceClient<'_, Outputs> {
    pub async fn by_phase(&self, phase: Id) -> Result<Vec<models::Output>> {
        self.filter("phase", &phase.to_string()).await
    }
}

impl ResourceClient<'_, Documents> {
    pub async fn by_type(&self, document_type: &str) -> Result<Vec<models::Document>> {
        self.filter("type", document_type).await
    }

    pub async fn by_element(&self, element: Id) -> Result<Vec<models::Document>> {
        self.filter("element", &element.to_string()).await
    }
}

impl ResourceClient<'_, Contacts> {
    pub async fn by_type(&self, contact_type: &str) -> Result<Vec<models::Contact>> {
        self.filter("type", contact_type).await
    }
}

impl ResourceClient<'_, History> {
    pub async fn by_type(&self, entity_type: &str) -> Result<Vec<models::HistoryEntry>> {
        self.filter("type", entity_type).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Relationship actions
// ─────────────────────────────────────────────────────────────────────────────

impl ResourceClient<'_, Teams> {
    pub async fn add_member(&self, team: Id, person: Id) -> Result<Value> {
        self.action(Some(team), "add_member", json!({ "person_id": person }))
            .await
    }

    pub async fn remove_member(&self, team: Id, person: Id) -> Result<Value> {
        self.action(Some(team), "remove_member", json!({ "person_id": person }))
            .await
    }
}

impl ResourceClient<'_, Persons> {
    pub async fn add_to_team(&self, person: Id, team: Id) -> Result<Value> {
        self.action(Some(person), "add_to_team", json!({ "team_id": team }))
            .await
    }
}

impl ResourceClient<'_, Todos> {
    pub async fn by_status(&self, status: &str) -> Result<Vec<models::Todo>> {
        self.filter("status", status).await
    }

    pub async fn by_person(&self, person: Id) -> Result<Vec<models::Todo>> {
        self.filter("person", &person.to_string()).await
    }

    pub async fn change_status(&self, todo: Id, status: &str) -> Result<Value> {
        self.action(Some(todo), "change_status", json!({ "status": status }))
            .await
    }

    pub async fn reassign(&self, todo: Id, person: Id) -> Result<Value> {
        self.action(Some(todo), "reassign", json!({ "person_id": person }))
            .await
    }
}

impl ResourceClient<'_, Authorizations> {
    pub async fn by_level(&self, level: &str) -> Result<Vec<models::Authorization>> {
        self.filter("level", level).await
    }

    /// Assign an authorization profile to a user.
    pub async fn assign(&self, user: Id, authorization: Id) -> Result<Value> {
        self.action(
            None,
            "assign",
            json!({ "user_id": user, "authorization_id": authorization }),
        )
        .await
    }
}

/// Decode a normalized payload, treating an empty object as no content.
fn decode_optional<T: DeserializeOwned>(value: Value, endpoint: &str) -> Result<Option<T>> {
    match &value {
        Value::Object(map) if map.is_empty() => Ok(None),
        _ => decode(value, endpoint).map(Some),
    }
}

/// Body for template clone actions; the name is omitted when not given.
fn clone_body(name: Option<&str>) -> Value {
    match name {
        Some(name) => json!({ "name": name }),
        None => json!({}),
    }
}

impl ResourceClient<'_, PhaseTemplates> {
    pub async fn clone_template(&self, template: Id, name: Option<&str>) -> Result<Value> {
        self.action(Some(template), "clone", clone_body(name)).await
    }
}

impl ResourceClient<'_, OutputTemplates> {
    pub async fn clone_template(&self, template: Id, name: Option<&str>) -> Result<Value> {
        self.action(Some(template), "clone", clone_body(name)).await
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Facade
// ═══════════════════════════════════════════════════════════════════════════════

/// Entry point to every resource client.
#[derive(Debug, Clone)]
pub struct Api {
    client: ApiClient,
}

impl Api {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying request core.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn resource<R: Resource>(&self) -> ResourceClient<'_, R> {
        ResourceClient::new(&self.client)
    }

    pub fn projects(&self) -> ResourceClient<'_, Projects> {
        self.resource()
    }

    pub fn ppaps(&self) -> ResourceClient<'_, Ppaps> {
        self.resource()
    }

    pub fn phases(&self) -> ResourceClient<'_, Phases> {
        self.resource()
    }

    pub fn outputs(&self) -> ResourceClient<'_, Outputs> {
        self.resource()
    }

    pub fn documents(&self) -> ResourceClient<'_, Documents> {
        self.resource()
    }

    pub fn teams(&self) -> ResourceClient<'_, Teams> {
        self.resource()
    }

    pub fn persons(&self) -> ResourceClient<'_, Persons> {
        self.resource()
    }

    pub fn departments(&self) -> ResourceClient<'_, Departments> {
        self.resource()
    }

    pub fn contacts(&self) -> ResourceClient<'_, Contacts> {
        self.resource()
    }

    pub fn clients(&self) -> ResourceClient<'_, Clients> {
        self.resource()
    }

    pub fn phase_templates(&self) -> ResourceClient<'_, PhaseTemplates> {
        self.resource()
    }

    pub fn output_templates(&self) -> ResourceClient<'_, OutputTemplates> {
        self.resource()
    }

    pub fn elements(&self) -> ResourceClient<'_, Elements> {
        self.resource()
    }

    pub fn todos(&self) -> ResourceClient<'_, Todos> {
        self.resource()
    }

    pub fn history(&self) -> ResourceClient<'_, History> {
        self.resource()
    }

    pub fn users(&self) -> ResourceClient<'_, Users> {
        self.resource()
    }

    pub fn authorizations(&self) -> ResourceClient<'_, Authorizations> {
        self.resource()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api() -> Api {
        Api::new(ApiClient::new("http://localhost:8000").unwrap())
    }

    #[test]
    fn test_paths() {
        let api = api();
        assert_eq!(api.projects().collection_path(), "/api/projects/");
        assert_eq!(api.projects().item_path(42), "/api/projects/42/");
        assert_eq!(api.phase_templates().item_path(3), "/api/phase-templates/3/");
        assert_eq!(api.history().collection_path(), "/api/history/");
    }

    #[test]
    fn test_filter_value_is_encoded() {
        let api = api();
        assert_eq!(
            api.projects().filter_path("status", "on hold"),
            "/api/projects/by_status/?status=on%20hold"
        );
        assert_eq!(
            api.documents().filter_path("type", "PSW&FMEA"),
            "/api/documents/by_type/?type=PSW%26FMEA"
        );
    }

    #[test]
    fn test_entity_names() {
        assert_eq!(Projects::ENTITY, "project");
        assert_eq!(OutputTemplates::ENTITY, "output_template");
        assert_eq!(OutputTemplates::PATH, "output-templates");
    }

    #[test]
    fn test_empty_object_is_no_content() {
        let empty: Option<models::Todo> = decode_optional(json!({}), "/api/todos/9/").unwrap();
        assert!(empty.is_none());

        let todo: Option<models::Todo> =
            decode_optional(json!({"id": 9, "title": "Run MSA"}), "/api/todos/9/").unwrap();
        assert_eq!(todo.map(|t| t.id), Some(9));

        let bad = decode_optional::<models::Todo>(json!({"title": "no id"}), "/api/todos/9/");
        assert!(bad.is_err());
    }

    #[test]
    fn test_clone_body_omits_missing_name() {
        assert_eq!(clone_body(None), json!({}));
        assert_eq!(clone_body(Some("PPAP L3")), json!({"name": "PPAP L3"}));
    }
}
