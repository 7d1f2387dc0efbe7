//! Request dispatch
//!
//! ```text
//! Request ─► parse_route ─► authorize (per-request PermissionCache)
//!                              │
//!              ┌───────────────┼────────────────┐
//!              ▼               ▼                ▼
//!           lists        entity GET/POST    attachment / context
//!              │               │
//!              └─ negotiate ───┴─► HTML │ JSON-LD │ Turtle
//! ```
//!
//! Permission checks come before any existence check, so a caller who may
//! not see a resource gets the same answer whether or not it exists.

use std::collections::BTreeSet;

use annal_core::vocab::{annal, rdfs};
use annal_core::{
    AltScope, AnnalError, AnnalResult, EntityKind, EntityValues, INITIAL_VALUES_ID, Permission, check_id,
    make_type_entity_id,
};
use annal_models::attachments::{copy_attachments, discard_unsaved, read_resource};
use annal_models::{Collection, Entity, EntityParent, PermissionCache, Site, check_type_rename, resources};
use annal_render::{
    EntityFinder, Extras, PendingResource, RenderMode, RendererRegistry, SelectorContext, TargetEntity,
    TargetError, TargetResolver, ViewDescription, apply_resources, decode_form, describe_list,
    describe_view, render_list_html, render_view_html,
};
use serde_json::{Value, json};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::actions::{Action, SiteAction, required_permission};
use crate::http::{Method, Request, Response};
use crate::negotiate::{Representation, negotiate};
use crate::pages::{PageFrame, edit_form, entity_view, link_list};
use crate::routes::{Route, parse_route};
use crate::turtle::TurtleWriter;

const JSONLD_CONTEXT_REL: &str = "http://www.w3.org/ns/json-ld#context";

/// Resolves reference targets only where the user may view them
struct PermittedTargets<'a> {
    coll: &'a Collection,
    granted: BTreeSet<Permission>,
}

impl TargetResolver for PermittedTargets<'_> {
    fn resolve_target(&self, type_id: &str, entity_id: &str) -> Result<Option<TargetEntity>, TargetError> {
        if !self.granted.contains(&required_permission(type_id, Action::View)) {
            return Err(TargetError::NotPermitted {
                type_id: type_id.to_string(),
                entity_id: entity_id.to_string(),
            });
        }
        self.coll.resolve_target(type_id, entity_id)
    }
}

/// The request adapter for one site
pub struct Annalist {
    site: Site,
    registry: RendererRegistry,
    base_path: String,
}

impl Annalist {
    pub fn new(site: Site) -> Self {
        let base_path = site.url().path().to_string();
        Self {
            site,
            registry: RendererRegistry::standard(),
            base_path,
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Handle one request; failures become error responses
    pub fn handle(&self, req: &Request) -> Response {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "request",
            request_id = %request_id,
            user_id = req.user.user_id.as_str(),
            path = req.path.as_str()
        );
        let _guard = span.enter();

        let mut perms = PermissionCache::new(&req.user.user_id, &req.user.user_uri);
        let response = match self.dispatch(req, &mut perms) {
            Ok(response) => response,
            Err(e) => {
                let status = e.http_status();
                if status >= 500 {
                    error!(error = %e, "request failed");
                } else {
                    debug!(status, error = %e, "request refused");
                }
                Response::from_error(&e, req.continuation_url())
            }
        };
        info!(status = response.status, "request complete");
        response
    }

    fn dispatch(&self, req: &Request, perms: &mut PermissionCache) -> AnnalResult<Response> {
        let route = parse_route(&self.base_path, &req.path)
            .ok_or_else(|| AnnalError::RouteNotFound(req.path.clone()))?;
        debug!(?route, "resolved route");
        match (req.method, route) {
            (Method::Get, Route::Site) => self.site_home(req, perms),
            (Method::Post, Route::Site) => self.site_action(req, perms),
            (Method::Get, Route::TypeList { coll_id }) => self.type_list(req, perms, &coll_id),
            (Method::Get, Route::EntityList { coll_id, type_id }) => match req.query_param("action") {
                Some("new") => self.entity_form(req, perms, &coll_id, &type_id, None, Action::New),
                _ => self.entity_list(req, perms, &coll_id, &type_id),
            },
            (Method::Post, Route::EntityList { coll_id, type_id }) => {
                self.entity_post(req, perms, &coll_id, &type_id, None)
            }
            (Method::Get, Route::Entity { coll_id, type_id, entity_id }) => {
                let action = match req.query_param("action") {
                    Some(a) => Action::parse(a)?,
                    None => Action::View,
                };
                match action {
                    Action::Edit | Action::Copy => {
                        self.entity_form(req, perms, &coll_id, &type_id, Some(&entity_id), action)
                    }
                    _ => self.entity_get(req, perms, &coll_id, &type_id, &entity_id),
                }
            }
            (Method::Post, Route::Entity { coll_id, type_id, entity_id }) => {
                self.entity_post(req, perms, &coll_id, &type_id, Some(&entity_id))
            }
            (Method::Get, Route::Attachment { coll_id, type_id, entity_id, name }) => {
                self.attachment(perms, &coll_id, &type_id, &entity_id, &name)
            }
            (Method::Get, Route::Context { coll_id }) => self.context(perms, &coll_id),
            (Method::Post, _) => Err(AnnalError::RouteNotFound(req.path.clone())),
        }
    }

    // ========================================================================
    // Access
    // ========================================================================

    /// Open a collection the user holds `required` in.
    ///
    /// A missing collection is checked against the site data first.
    fn open_collection(&self, perms: &mut PermissionCache, coll_id: &str, required: Permission) -> AnnalResult<Collection> {
        match self.site.collection(coll_id)? {
            Some(coll) => {
                perms.authorize(&coll, required)?;
                Ok(coll)
            }
            None => {
                perms.authorize(&self.site.site_data()?, required)?;
                Err(AnnalError::CollectionNotFound(coll_id.to_string()))
            }
        }
    }

    fn resolver<'c>(&self, perms: &mut PermissionCache, coll: &'c Collection) -> AnnalResult<PermittedTargets<'c>> {
        Ok(PermittedTargets {
            coll,
            granted: perms.permissions(coll)?.clone(),
        })
    }

    fn representation(req: &Request) -> Representation {
        req.query_param("type")
            .and_then(Representation::from_query)
            .unwrap_or_else(|| negotiate(&req.accept))
    }

    fn frame<'a>(&'a self, req: &'a Request, title: &'a str, coll: Option<&'a Collection>) -> PageFrame<'a> {
        PageFrame {
            title,
            site_path: &self.base_path,
            collection: coll.map(|c| (c.id(), c.entity().url().path().to_string())),
            user_id: &req.user.user_id,
        }
    }

    fn continuation_or(req: &Request, fallback: &str) -> Response {
        Response::redirect(req.continuation_url().unwrap_or(fallback))
    }

    // ========================================================================
    // Site
    // ========================================================================

    fn site_home(&self, req: &Request, perms: &mut PermissionCache) -> AnnalResult<Response> {
        let sitedata = self.site.site_data()?;
        perms.authorize(&sitedata, Permission::View)?;
        let ids = self.site.collection_ids()?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(coll) = self.site.collection(&id)? {
                items.push((coll.entity().url().path().to_string(), coll.label().to_string()));
            }
        }
        match Self::representation(req) {
            Representation::Html => Ok(Response::html(
                self.frame(req, "Collections", None).page(&link_list(&items)),
            )),
            _ => {
                let list: Vec<Value> = items
                    .iter()
                    .map(|(href, label)| json!({"@id": href, (rdfs::LABEL): label}))
                    .collect();
                json_response(&json!({ "annal:collection_list": list }))
            }
        }
    }

    fn site_action(&self, req: &Request, perms: &mut PermissionCache) -> AnnalResult<Response> {
        let action = match req.form.get("action") {
            Some("create_collection") => SiteAction::CreateCollection,
            Some("delete_collection") => SiteAction::DeleteCollection,
            other => {
                return Err(AnnalError::BadRequest(format!(
                    "unknown site action '{}'",
                    other.unwrap_or("")
                )));
            }
        };
        perms.authorize(&self.site.site_data()?, action.required_permission())?;
        let coll_id = req.form.get("coll_id").unwrap_or("");
        match action {
            SiteAction::CreateCollection => {
                let mut values = EntityValues::new();
                if let Some(label) = req.form.get("coll_label").filter(|l| !l.is_empty()) {
                    values.insert(rdfs::LABEL.to_string(), Value::from(label));
                }
                self.site.create_collection(coll_id, values)?;
            }
            SiteAction::DeleteCollection => self.site.remove_collection(coll_id)?,
        }
        Ok(Self::continuation_or(req, &self.base_path))
    }

    // ========================================================================
    // Lists
    // ========================================================================

    fn type_list(&self, req: &Request, perms: &mut PermissionCache, coll_id: &str) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, Permission::View)?;
        let home = coll.entity().url().path().to_string();
        let items: Vec<(String, String)> = coll
            .types()?
            .iter()
            .map(|t| (format!("{}d/{}/", home, t.id()), t.label().to_string()))
            .collect();
        match Self::representation(req) {
            Representation::Html => Ok(Response::html(
                self.frame(req, coll.label(), Some(&coll)).page(&link_list(&items)),
            )),
            _ => {
                let list: Vec<Value> = items
                    .iter()
                    .map(|(href, label)| json!({"@id": href, (rdfs::LABEL): label}))
                    .collect();
                json_response(&json!({ "annal:type_list": list }))
            }
        }
    }

    fn entity_list(&self, req: &Request, perms: &mut PermissionCache, coll_id: &str, type_id: &str) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, required_permission(type_id, Action::List))?;
        let altscope = req.query_param("scope").and_then(AltScope::parse);
        let record_type = coll.get_type(type_id)?;
        let list_id = req
            .query_param("list")
            .or_else(|| record_type.as_ref().and_then(|t| t.default_list()))
            .unwrap_or("Default_list")
            .to_string();
        let list = describe_list(&coll, &list_id)?;
        let finder = EntityFinder::with_expression(&coll, &list.entity_selector)?;
        let mut context = SelectorContext::new();
        if let Some(list_record) = coll.get_list(&list_id)? {
            context.insert("list".to_string(), list_record.entity().values().clone());
        }
        let search = req.query_param("search").filter(|s| !s.is_empty());
        let entities = finder.get_entities(type_id, altscope, &context, search)?;
        debug!(coll_id, type_id, list_id = list_id.as_str(), count = entities.len(), "listed entities");

        match Self::representation(req) {
            Representation::Html => {
                let resolver = self.resolver(perms, &coll)?;
                let extras = Extras {
                    request_url: req.path.clone(),
                    continuation_url: req.continuation_url().unwrap_or("").to_string(),
                    ..Default::default()
                };
                let table = render_list_html(&self.registry, &list, &entities, &extras, &resolver);
                let title = record_type
                    .as_ref()
                    .map(|t| t.label().to_string())
                    .unwrap_or_else(|| list.label.clone());
                Ok(Response::html(self.frame(req, &title, Some(&coll)).page(&table)))
            }
            _ => {
                let list: Vec<Value> = entities
                    .iter()
                    .map(|e| {
                        json!({
                            "@id": e.view_url().path(),
                            (annal::ID): e.id(),
                            (annal::TYPE_ID): e.type_id(),
                            (rdfs::LABEL): e.label(),
                        })
                    })
                    .collect();
                json_response(&json!({ "annal:entity_list": list }))
            }
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    fn view_for(&self, req: &Request, coll: &Collection, type_id: &str) -> AnnalResult<ViewDescription> {
        let from_type = coll.get_type(type_id)?;
        let view_id = req
            .query_param("view")
            .or_else(|| from_type.as_ref().and_then(|t| t.default_view()))
            .unwrap_or("Default_view")
            .to_string();
        describe_view(coll, &view_id)
    }

    fn entity_get(
        &self,
        req: &Request,
        perms: &mut PermissionCache,
        coll_id: &str,
        type_id: &str,
        entity_id: &str,
    ) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, required_permission(type_id, Action::View))?;
        let entity = coll
            .load_entity(type_id, entity_id, Some(AltScope::All))?
            .ok_or_else(|| AnnalError::not_found(type_id, entity_id))?;

        match Self::representation(req) {
            Representation::JsonLd => {
                let link = format!(
                    "<{}>; rel=\"{}\"; type=\"application/ld+json\"",
                    coll.context_url()?,
                    JSONLD_CONTEXT_REL
                );
                Ok(json_response(&Value::Object(entity.values().clone()))?.with_header("Link", &link))
            }
            Representation::Turtle => {
                let context = read_context(&coll)?;
                let writer = TurtleWriter::from_context(&context, entity.view_url().clone());
                Ok(Response::new(
                    200,
                    Representation::Turtle.content_type(),
                    writer.write(entity.values()),
                ))
            }
            Representation::Html => {
                let view = self.view_for(req, &coll, type_id)?;
                let resolver = self.resolver(perms, &coll)?;
                let extras = self.extras(req, &entity);
                let fields = render_view_html(
                    &self.registry,
                    &view,
                    entity.values(),
                    &extras,
                    RenderMode::View,
                    &resolver,
                );
                let title = if entity.label().is_empty() { entity.id() } else { entity.label() };
                let content = entity_view(&fields, entity.view_url().path());
                Ok(Response::html(self.frame(req, title, Some(&coll)).page(&content)))
            }
        }
    }

    fn extras(&self, req: &Request, entity: &Entity) -> Extras {
        Extras {
            request_url: req.path.clone(),
            continuation_url: req.continuation_url().unwrap_or("").to_string(),
            values: EntityValues::new(),
            entity_url: Some(entity.view_url().clone()),
        }
    }

    /// Edit form for a new, copied or existing entity
    fn entity_form(
        &self,
        req: &Request,
        perms: &mut PermissionCache,
        coll_id: &str,
        type_id: &str,
        entity_id: Option<&str>,
        action: Action,
    ) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, required_permission(type_id, action))?;
        let (mut values, entity_url) = match entity_id {
            Some(id) => {
                let entity = coll
                    .load_entity(type_id, id, Some(AltScope::All))?
                    .ok_or_else(|| AnnalError::not_found(type_id, id))?;
                let url = entity.view_url().clone();
                (entity.into_values(), Some(url))
            }
            None => {
                let initial = coll.load_entity(type_id, INITIAL_VALUES_ID, Some(AltScope::All))?;
                (initial.map(Entity::into_values).unwrap_or_default(), None)
            }
        };
        if action == Action::Copy {
            values.remove(annal::URI);
        }
        if action != Action::Edit {
            values.insert(annal::ID.to_string(), Value::from(coll.allocate_entity_id(type_id)));
            values.insert(annal::TYPE_ID.to_string(), Value::from(type_id));
        }
        let orig_id = entity_id.unwrap_or("");
        self.render_form(req, perms, &coll, type_id, action, orig_id, &values, entity_url)
    }

    #[allow(clippy::too_many_arguments)]
    fn render_form(
        &self,
        req: &Request,
        perms: &mut PermissionCache,
        coll: &Collection,
        type_id: &str,
        action: Action,
        orig_id: &str,
        values: &EntityValues,
        entity_url: Option<url::Url>,
    ) -> AnnalResult<Response> {
        let view = self.view_for(req, coll, type_id)?;
        let resolver = self.resolver(perms, coll)?;
        let extras = Extras {
            request_url: req.path.clone(),
            continuation_url: req.continuation_url().unwrap_or("").to_string(),
            values: EntityValues::new(),
            entity_url,
        };
        let fields = render_view_html(&self.registry, &view, values, &extras, RenderMode::Edit, &resolver);
        let form = edit_form(
            action.as_str(),
            &req.path,
            orig_id,
            req.continuation_url().unwrap_or(""),
            &fields,
        );
        let title = format!("{} {}", view.label, make_type_entity_id(type_id, orig_id));
        Ok(Response::html(self.frame(req, &title, Some(coll)).page(&form)))
    }

    /// Apply a submitted form: create, copy, update or delete an entity
    fn entity_post(
        &self,
        req: &Request,
        perms: &mut PermissionCache,
        coll_id: &str,
        type_id: &str,
        route_entity_id: Option<&str>,
    ) -> AnnalResult<Response> {
        let action = Action::parse(req.form.get("action").unwrap_or("edit"))?;
        let coll = self.open_collection(perms, coll_id, required_permission(type_id, action))?;
        let type_path = format!("{}d/{}/", coll.entity().url().path(), type_id);
        if req.form.contains("cancel") {
            return Ok(Self::continuation_or(req, &type_path));
        }
        let orig_id = route_entity_id
            .or_else(|| req.form.get("orig_id").filter(|s| !s.is_empty()))
            .map(str::to_string);

        if action == Action::Delete {
            let entity_id = orig_id.ok_or_else(|| AnnalError::BadRequest("no entity to delete".to_string()))?;
            if !coll.entity_exists(type_id, &entity_id) {
                return Err(AnnalError::not_found(type_id, &entity_id));
            }
            coll.remove_entity(type_id, &entity_id)?;
            info!(coll_id, type_id, entity_id = entity_id.as_str(), "deleted entity");
            return Ok(Self::continuation_or(req, &type_path));
        }

        let original = match (&orig_id, action) {
            (Some(id), Action::Edit | Action::Copy) => Some(
                coll.load_entity(type_id, id, Some(AltScope::All))?
                    .ok_or_else(|| AnnalError::not_found(type_id, id))?,
            ),
            _ => None,
        };
        let mut previous = original.as_ref().map(|e| e.values().clone()).unwrap_or_default();
        if action == Action::Copy {
            previous.remove(annal::URI);
        }
        let view = self.view_for(req, &coll, type_id)?;
        let decoded = decode_form(&view.fields, &req.form, &previous);

        let new_id = match req.form.get("entity_id").map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => id.to_string(),
            None => match (&orig_id, action) {
                (Some(id), Action::Edit) => id.clone(),
                _ => coll.allocate_entity_id(type_id),
            },
        };
        check_id(&new_id)?;

        let new_type_id = req
            .form
            .get("entity_type")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(type_id);
        if new_type_id != type_id {
            check_id(new_type_id)?;
            if is_type_record(type_id) || is_type_record(new_type_id) {
                return Err(AnnalError::BadRequest(
                    "a type record cannot change its type".to_string(),
                ));
            }
            perms.authorize(&coll, required_permission(new_type_id, action))?;
        }

        if decoded.continue_editing {
            let entity_url = original.as_ref().map(|e| e.view_url().clone());
            let orig = orig_id.as_deref().unwrap_or("");
            return self.render_form(req, perms, &coll, type_id, action, orig, &decoded.values, entity_url);
        }

        let saved = match (action, &original) {
            (Action::Edit, Some(entity)) => {
                save_edit(&coll, entity, new_type_id, &new_id, decoded.values, &decoded.resources)?
            }
            (Action::Copy, Some(entity)) => {
                save_new(&coll, Some(entity), new_type_id, &new_id, decoded.values, &decoded.resources)?
            }
            _ => save_new(&coll, None, new_type_id, &new_id, decoded.values, &decoded.resources)?,
        };
        info!(
            coll_id,
            type_id = new_type_id,
            entity_id = new_id.as_str(),
            action = action.as_str(),
            "saved entity"
        );
        Ok(Self::continuation_or(req, saved.view_url().path()))
    }

    // ========================================================================
    // Attachments and context
    // ========================================================================

    fn attachment(
        &self,
        perms: &mut PermissionCache,
        coll_id: &str,
        type_id: &str,
        entity_id: &str,
        name: &str,
    ) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, required_permission(type_id, Action::View))?;
        let entity = coll
            .load_entity(type_id, entity_id, Some(AltScope::All))?
            .ok_or_else(|| AnnalError::not_found(type_id, entity_id))?;
        let data = read_resource(&entity, name)?;
        Ok(Response::bytes(resources::mime_for_filename(name), data))
    }

    fn context(&self, perms: &mut PermissionCache, coll_id: &str) -> AnnalResult<Response> {
        let coll = self.open_collection(perms, coll_id, Permission::View)?;
        let context = read_context(&coll)?;
        let mut response = json_response(&context)?;
        response.content_type = "application/ld+json".to_string();
        Ok(response)
    }
}

fn is_type_record(type_id: &str) -> bool {
    EntityKind::for_type_id(type_id) == EntityKind::Type
}

/// Prepare an entity at its final location with all of its attachments in
/// place. Nothing is written to the body file, so a failure here leaves any
/// stored values unchanged.
fn stage(
    coll: &Collection,
    type_id: &str,
    entity_id: &str,
    values: EntityValues,
    attachments_from: Option<&Entity>,
    resources: &[PendingResource],
) -> AnnalResult<Entity> {
    let mut staged = coll.locate_entity(type_id, entity_id)?;
    *staged.values_mut() = values;
    let unsaved = !staged.body_path().is_file();
    if let Err(e) = attach(&mut staged, attachments_from, resources) {
        if unsaved {
            if let Err(cleanup) = discard_unsaved(&staged) {
                warn!(entity_id, error = %cleanup, "could not discard unsaved entity");
            }
        }
        return Err(e);
    }
    Ok(staged)
}

fn attach(staged: &mut Entity, from: Option<&Entity>, resources: &[PendingResource]) -> AnnalResult<()> {
    // Entities loaded from another collection (or stored under another id)
    // bring their attachments along.
    if let Some(from) = from.filter(|f| f.dir() != staged.dir()) {
        copy_attachments(from, staged)?;
    }
    apply_resources(staged, resources)
}

fn save_new(
    coll: &Collection,
    original: Option<&Entity>,
    type_id: &str,
    entity_id: &str,
    mut values: EntityValues,
    resources: &[PendingResource],
) -> AnnalResult<Entity> {
    if coll.entity_exists(type_id, entity_id) {
        return Err(AnnalError::exists(type_id, entity_id));
    }
    if let Some(orig) = original.filter(|o| o.type_id() != type_id) {
        coll.retype_values(&mut values, orig.type_id(), type_id)?;
    }
    let staged = stage(coll, type_id, entity_id, values, original, resources)?;
    coll.create_entity(type_id, entity_id, staged.into_values())
}

/// Save an edited entity, moving it when its id or type changed.
///
/// Renaming a type record moves the type's instances too. The old entity is
/// removed only once the new one is stored.
fn save_edit(
    coll: &Collection,
    original: &Entity,
    type_id: &str,
    entity_id: &str,
    mut values: EntityValues,
    resources: &[PendingResource],
) -> AnnalResult<Entity> {
    let (old_type_id, old_id) = (original.type_id(), original.id());
    if old_type_id == type_id && old_id == entity_id {
        let staged = stage(coll, type_id, entity_id, values, Some(original), resources)?;
        return coll.update_entity(type_id, entity_id, staged.into_values());
    }
    if coll.entity_exists(type_id, entity_id) {
        return Err(AnnalError::exists(type_id, entity_id));
    }
    let renaming_type = is_type_record(type_id);
    if renaming_type {
        check_type_rename(old_id, entity_id)?;
    }
    if old_type_id != type_id {
        coll.retype_values(&mut values, old_type_id, type_id)?;
    }
    let stored_here = coll.entity_exists(old_type_id, old_id);
    let staged = stage(coll, type_id, entity_id, values, Some(original), resources)?;
    let saved = coll.create_entity(type_id, entity_id, staged.into_values())?;
    if renaming_type {
        coll.move_instances(old_id, entity_id)?;
    }
    if stored_here {
        coll.remove_entity(old_type_id, old_id)?;
    }
    info!(
        coll_id = coll.id(),
        old_type_id,
        old_id,
        type_id,
        entity_id,
        "moved entity"
    );
    Ok(saved)
}

/// The collection's context document, regenerated if the file is missing
fn read_context(coll: &Collection) -> AnnalResult<Value> {
    let path = coll.context_path();
    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(serde_json::from_str(&text)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(coll_id = coll.id(), "context file missing, regenerating");
            coll.regenerate_context()
        }
        Err(e) => Err(AnnalError::FileRead {
            path,
            message: e.to_string(),
        }),
    }
}

fn json_response(value: &Value) -> AnnalResult<Response> {
    Ok(Response::bytes(
        Representation::JsonLd.content_type(),
        serde_json::to_vec_pretty(value)?,
    ))
}
