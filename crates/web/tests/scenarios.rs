//! End-to-end request scenarios against a freshly initialised site

use annal_core::vocab::annal;
use annal_core::{EntityValues, Permission, RenderType, ValueMode};
use annal_models::{Collection, FieldRef, RecordField, RecordType, RecordView, Site, UploadedFile, UserPermissions};
use annal_web::{Annalist, Request, Response};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use tempfile::TempDir;

const COLL: &str = "/annalist/c/testcoll/";
const BOB_URI: &str = "mailto:bob@example.org";

fn setup() -> (TempDir, Annalist) {
    let tmp = TempDir::new().unwrap();
    let site = Site::new(tmp.path(), "http://test.example.com/annalist/").unwrap();
    site.initialize().unwrap();
    let coll = site.create_collection("testcoll", EntityValues::new()).unwrap();
    coll.create_entity(
        "_user",
        "bob",
        UserPermissions::values("Bob", "Collection admin", BOB_URI, Permission::all()).build(),
    )
    .unwrap();
    (tmp, Annalist::new(site))
}

fn as_bob(req: Request) -> Request {
    req.with_user("bob", BOB_URI)
}

fn json_body(resp: &Response) -> Value {
    serde_json::from_slice(&resp.body).unwrap()
}

#[test]
fn test_created_entity_served_as_json_ld() {
    let (_tmp, app) = setup();
    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/_type/", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "testtype")
            .with_field("Entity_label", "Test type")
            .with_field("Type_uri", "test:testtype")
            .with_field("Type_supertype_uris__0__Type_supertype_uri", "test:super"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "entity1")
            .with_field("Entity_label", "Entity 1"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    assert_eq!(resp.header("Location"), Some("/annalist/c/testcoll/d/testtype/entity1/"));

    let resp = app.handle(
        &Request::get(&format!("{}d/testtype/entity1/", COLL)).with_accept("application/ld+json"),
    );
    assert_eq!(resp.status, 200);
    assert!(resp.header("Link").unwrap().contains("coll_context.jsonld"));
    let body = json_body(&resp);
    assert_eq!(body["annal:id"], json!("entity1"));
    assert_eq!(body["rdfs:label"], json!("Entity 1"));
    let types = body["@type"].as_array().unwrap();
    assert!(types.contains(&json!("annal:EntityData")));
    assert!(types.contains(&json!("test:testtype")));

    let ttl = app.handle(
        &Request::get(&format!("{}d/testtype/entity1/", COLL)).with_accept("text/turtle"),
    );
    assert_eq!(ttl.status, 200);
    assert!(ttl.text().contains("rdfs:label \"Entity 1\""));
}

#[test]
fn test_type_list_with_site_scope() {
    let (_tmp, app) = setup();
    let list = |query: &str| {
        let resp = app.handle(
            &Request::get(&format!("{}d/_type/{}", COLL, query)).with_accept("application/json"),
        );
        assert_eq!(resp.status, 200, "{}", resp.text());
        let body = json_body(&resp);
        body["annal:entity_list"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["annal:id"].as_str().unwrap().to_string())
            .collect::<Vec<_>>()
    };

    assert!(list("").is_empty());
    let all = list("?scope=all");
    for builtin in ["_coll", "_field", "_type", "_view", "_list", "_group", "_user", "_vocab"] {
        assert!(all.iter().any(|id| id == builtin), "missing {}", builtin);
    }
}

#[test]
fn test_duplicate_fields_in_edit_form() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    let fields = [
        FieldRef::new("Entity_id").with_placement("small:0,6"),
        FieldRef::new("Entity_id").with_placement("small:6,6"),
    ];
    coll.create_entity("_view", "V", RecordView::values("V", "", &fields).build())
        .unwrap();

    let resp = app.handle(&as_bob(Request::get(&format!("{}d/testtype/?action=new&view=V", COLL))));
    assert_eq!(resp.status, 200, "{}", resp.text());
    let html = resp.text();
    assert!(html.contains("name=\"entity_id\""));
    assert!(html.contains("name=\"entity_id__2\""));
}

#[test]
fn test_view_only_user_cannot_create() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity(
        "_user",
        "alice",
        UserPermissions::values("Alice", "Viewer", "mailto:alice@example.org", &[Permission::View]).build(),
    )
    .unwrap();
    coll.create_entity("testtype", "entity1", EntityValues::new()).unwrap();
    let alice = |req: Request| req.with_user("alice", "mailto:alice@example.org");

    let resp = app.handle(&alice(
        Request::post(&format!("{}d/testtype/", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "entity2"),
    ));
    assert_eq!(resp.status, 403);
    assert!(!coll.entity_exists("testtype", "entity2"));

    let resp = app.handle(&alice(Request::get(&format!("{}d/testtype/entity1/", COLL))));
    assert_eq!(resp.status, 200);
}

#[test]
fn test_anonymous_denied_without_fallback_permissions() {
    let (_tmp, app) = setup();
    let sitedata = app.site().site_data().unwrap();
    sitedata.remove_entity("_user", "_unknown_user_perms").unwrap();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity("testtype", "entity1", EntityValues::new()).unwrap();

    let existing = app.handle(&Request::get(&format!("{}d/testtype/entity1/", COLL)));
    let missing = app.handle(&Request::get(&format!("{}d/testtype/nosuch/", COLL)));
    assert_eq!(existing.status, 401);
    assert_eq!(missing.status, 401);
}

fn image_view(coll: &Collection) {
    coll.create_entity(
        "_field",
        "img_field",
        RecordField::values("Image", RenderType::RefImage, "test:image", "small:0,12")
            .with(annal::FIELD_VALUE_MODE, RecordField::value_mode_value(ValueMode::Upload))
            .with(annal::FIELD_VALUE_TYPE, "annal:Image")
            .build(),
    )
    .unwrap();
    let fields = [FieldRef::new("Entity_id"), FieldRef::new("Entity_label"), FieldRef::new("img_field")];
    coll.create_entity("_view", "img_view", RecordView::values("Image view", "", &fields).build())
        .unwrap();
}

#[test]
fn test_uploaded_image_follows_rename() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    image_view(&coll);
    let image = UploadedFile {
        filename: "test-image.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        data: b"\xff\xd8\xff\xe0 not really a jpeg".to_vec(),
    };

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/?view=img_view", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "e1")
            .with_file("img_field", image.clone()),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/e1/?view=img_view", COLL))
            .with_field("action", "edit")
            .with_field("entity_id", "e1_new"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    assert!(!coll.entity_exists("testtype", "e1"));

    let resp = app.handle(&Request::get(&format!("{}d/testtype/e1_new/img_field.jpg", COLL)));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.content_type, "image/jpeg");
    assert_eq!(resp.body, image.data);
}

#[test]
fn test_reference_choices_ordered_by_label() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity("_type", "T", RecordType::values("T", "test:T", &[]).build())
        .unwrap();
    coll.create_entity(
        "_field",
        "F",
        RecordField::values("F", RenderType::Enum, "test:ref", "small:0,12")
            .with(annal::FIELD_REF_TYPE, "T")
            .with(annal::FIELD_REF_RESTRICTION, "ALL")
            .build(),
    )
    .unwrap();
    coll.create_entity(
        "_view",
        "F_view",
        RecordView::values("F view", "", &[FieldRef::new("Entity_id"), FieldRef::new("F")]).build(),
    )
    .unwrap();
    coll.create_entity("T", "b", json!({"rdfs:label": "Beta"}).as_object().cloned().unwrap())
        .unwrap();
    coll.create_entity("T", "a", json!({"rdfs:label": "Alpha"}).as_object().cloned().unwrap())
        .unwrap();

    let resp = app.handle(&as_bob(Request::get(&format!("{}d/testtype/?action=new&view=F_view", COLL))));
    assert_eq!(resp.status, 200, "{}", resp.text());
    let html = resp.text();
    let alpha = html.find("value=\"T/a\"").expect("Alpha offered");
    let beta = html.find("value=\"T/b\"").expect("Beta offered");
    assert!(alpha < beta);
    assert!(html.contains("Alpha (a)"));
}

#[test]
fn test_failed_upload_keeps_stored_values() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    image_view(&coll);
    let e1 = coll
        .create_entity("testtype", "e1", json!({"rdfs:label": "Old"}).as_object().cloned().unwrap())
        .unwrap();
    std::fs::create_dir_all(e1.dir().join("img_field.jpg")).unwrap();
    let image = UploadedFile {
        filename: "test-image.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        data: b"jpeg".to_vec(),
    };

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/e1/?view=img_view", COLL))
            .with_field("action", "edit")
            .with_field("entity_id", "e1")
            .with_field("Entity_label", "New")
            .with_file("img_field", image.clone()),
    ));
    assert_eq!(resp.status, 500);
    let stored = coll.load_entity("testtype", "e1", None).unwrap().unwrap();
    assert_eq!(stored.label(), "Old");

    let e3 = coll.locate_entity("testtype", "e3").unwrap();
    std::fs::create_dir_all(e3.dir().join("img_field.jpg")).unwrap();
    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/?view=img_view", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "e3")
            .with_file("img_field", image),
    ));
    assert_eq!(resp.status, 500);
    assert!(!coll.entity_exists("testtype", "e3"));
    assert!(!e3.dir().exists());
}

#[test]
fn test_failed_import_saves_entity_without_attachment() {
    let (tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity(
        "_field",
        "imp_field",
        RecordField::values("Import", RenderType::UriImport, "test:import", "small:0,12")
            .with(annal::FIELD_VALUE_MODE, RecordField::value_mode_value(ValueMode::Import))
            .build(),
    )
    .unwrap();
    let fields = [FieldRef::new("Entity_id"), FieldRef::new("imp_field")];
    coll.create_entity("_view", "imp_view", RecordView::values("Import view", "", &fields).build())
        .unwrap();
    let missing = format!("file://{}", tmp.path().join("missing.png").display());

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/testtype/?view=imp_view", COLL))
            .with_field("action", "new")
            .with_field("entity_id", "e2")
            .with_field("imp_field", &missing),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    let stored = coll.load_entity("testtype", "e2", None).unwrap().unwrap();
    assert!(stored.get("test:import").is_none());
}

#[test]
fn test_renamed_type_carries_instances() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity("_type", "testtype", RecordType::values("Test type", "test:testtype", &[]).build())
        .unwrap();
    let e1 = coll
        .create_entity("testtype", "entity1", json!({"rdfs:label": "Entity 1"}).as_object().cloned().unwrap())
        .unwrap();
    std::fs::write(e1.dir().join("notes.txt"), b"notes").unwrap();

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/_type/testtype/", COLL))
            .with_field("action", "edit")
            .with_field("entity_id", "newtype")
            .with_field("Entity_label", "Renamed type"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    assert_eq!(resp.header("Location"), Some("/annalist/c/testcoll/d/_type/newtype/"));
    assert!(!coll.entity_exists("_type", "testtype"));
    assert!(!coll.entity_exists("testtype", "entity1"));

    let moved = coll.load_entity("newtype", "entity1", None).unwrap().unwrap();
    assert_eq!(moved.get(annal::TYPE_ID), Some(&json!("newtype")));
    assert_eq!(moved.type_uri(), "test:testtype");
    assert_eq!(moved.label(), "Entity 1");

    let resp = app.handle(&Request::get(&format!("{}d/newtype/entity1/notes.txt", COLL)));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"notes");
}

#[test]
fn test_type_rename_restrictions() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity("_type", "testtype", RecordType::values("Test type", "test:testtype", &[]).build())
        .unwrap();
    let edit = |path: &str, field: &str, value: &str| {
        app.handle(&as_bob(
            Request::post(&format!("{}{}", COLL, path))
                .with_field("action", "edit")
                .with_field(field, value),
        ))
    };

    let resp = edit("d/_type/_view/", "entity_id", "myview");
    assert_eq!(resp.status, 400);
    assert!(!coll.entity_exists("_type", "myview"));
    assert_eq!(edit("d/_type/testtype/", "entity_id", "_mytype").status, 400);
    assert_eq!(edit("d/_type/testtype/", "entity_type", "othertype").status, 400);
    assert!(coll.entity_exists("_type", "testtype"));
    assert!(!coll.entity_exists("othertype", "testtype"));
}

#[test]
fn test_copied_type_gets_fresh_uri() {
    let (_tmp, app) = setup();
    let coll = app.site().require_collection("testcoll").unwrap();
    coll.create_entity("_type", "testtype", RecordType::values("Test type", "test:testtype", &[]).build())
        .unwrap();

    let form = app.handle(&as_bob(Request::get(&format!("{}d/_type/testtype/?action=copy", COLL))));
    assert_eq!(form.status, 200, "{}", form.text());
    assert!(!form.text().contains("value=\"test:testtype\""));

    let resp = app.handle(&as_bob(
        Request::post(&format!("{}d/_type/testtype/", COLL))
            .with_field("action", "copy")
            .with_field("entity_id", "copytype"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    let copy = coll.get_type("copytype").unwrap().unwrap();
    assert_ne!(copy.uri(), "test:testtype");
    let owner = coll
        .with_types(|types| types.get_type_by_uri("test:testtype").map(|t| t.id().to_string()))
        .unwrap();
    assert_eq!(owner.as_deref(), Some("testtype"));
}

#[test]
fn test_edit_of_inherited_entity_keeps_attachments() {
    let (_tmp, app) = setup();
    let base = app.site().create_collection("base", EntityValues::new()).unwrap();
    let e1 = base
        .create_entity("testtype", "e1", json!({"rdfs:label": "Base"}).as_object().cloned().unwrap())
        .unwrap();
    std::fs::write(e1.dir().join("notes.txt"), b"notes").unwrap();
    let child = app
        .site()
        .create_collection("child", json!({"annal:inherit_from": ["base"]}).as_object().cloned().unwrap())
        .unwrap();
    child
        .create_entity(
            "_user",
            "bob",
            UserPermissions::values("Bob", "Collection admin", BOB_URI, Permission::all()).build(),
        )
        .unwrap();

    let resp = app.handle(&as_bob(
        Request::post("/annalist/c/child/d/testtype/e1/")
            .with_field("action", "edit")
            .with_field("entity_id", "e1_new"),
    ));
    assert_eq!(resp.status, 302, "{}", resp.text());
    assert!(child.entity_exists("testtype", "e1_new"));
    assert!(base.entity_exists("testtype", "e1"));

    let resp = app.handle(&Request::get("/annalist/c/child/d/testtype/e1_new/notes.txt"));
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, b"notes");
}

#[test]
fn test_unknown_paths_are_not_found() {
    let (_tmp, app) = setup();
    assert_eq!(app.handle(&Request::get("/annalist/x/")).status, 404);
    assert_eq!(app.handle(&Request::get(&format!("{}d/testtype/nosuch/", COLL))).status, 404);
    assert_eq!(app.handle(&Request::get("/annalist/c/nocoll/d/testtype/e1/")).status, 404);
}
