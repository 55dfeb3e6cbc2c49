//! End-to-end update document scenarios

use attach_core::{
    process_attachments_and_body, process_zipped_attachments_and_body, Body, ProcessorRegistry,
    RegistryBuilder, RoutingTable, ZipTable,
};
use serde_json::{json, Value};

const UPLOADS: &str = "http://localhost:1231/public/uploads";

fn registry() -> ProcessorRegistry {
    ProcessorRegistry::with_defaults(UPLOADS)
}

fn body(value: Value) -> Body {
    serde_json::from_value(value).expect("body must be an object")
}

fn image(name: &str, order: usize) -> Value {
    json!({
        "image_id": name,
        "order": order,
        "url": format!("{UPLOADS}/{name}"),
        "thumbnail_url": format!("{UPLOADS}/thumbnails/{name}"),
    })
}

fn image_with_description(name: &str, order: usize, description: &str) -> Value {
    let mut record = image(name, order);
    record["description"] = json!(description);
    record
}

fn gallery_tables() -> (RoutingTable, ZipTable) {
    (
        RoutingTable::new()
            .route("images", ["images"])
            .route("description", ["description"]),
        ZipTable::new().zip("mis_images", ["images", "description"]),
    )
}

#[test]
fn attachments_and_extra_fields_share_set() {
    let routing = RoutingTable::new().route("images", ["images"]);
    let doc = process_attachments_and_body(
        &registry(),
        &routing,
        &body(json!({"name": "bla", "images": ["000perro.jpg"]})),
    )
    .unwrap();

    assert_eq!(
        doc.into_value(),
        json!({
            "$set": {
                "name": "bla",
                "attachments.images": [image("000perro.jpg", 0)],
            }
        })
    );
}

#[test]
fn attachments_only() {
    let routing = RoutingTable::new().route("images", ["images"]);
    let doc = process_attachments_and_body(
        &registry(),
        &routing,
        &body(json!({"images": ["000perro.jpg"]})),
    )
    .unwrap();

    assert_eq!(
        doc.into_value(),
        json!({"$set": {"attachments.images": [image("000perro.jpg", 0)]}})
    );
}

#[test]
fn extra_fields_only() {
    let routing = RoutingTable::new().route("images", ["images"]);
    let doc =
        process_attachments_and_body(&registry(), &routing, &body(json!({"name": "bla"}))).unwrap();

    assert_eq!(doc.into_value(), json!({"$set": {"name": "bla"}}));
}

#[test]
fn zipped_images_carry_descriptions() {
    let (routing, zip) = gallery_tables();
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["000perro.jpg", "000gato.jpg"],
            "description": ["es un perro", "es un gato"],
        })),
    )
    .unwrap();

    assert_eq!(
        doc.into_value(),
        json!({
            "$set": {
                "attachments.mis_images": [
                    image_with_description("000perro.jpg", 0, "es un perro"),
                    image_with_description("000gato.jpg", 1, "es un gato"),
                ]
            }
        })
    );
}

#[test]
fn zipping_keeps_plain_fields_alongside() {
    let (routing, zip) = gallery_tables();
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["000perro.jpg", "000gato.jpg"],
            "description": ["es un perro", "es un gato"],
            "title": "mis images",
        })),
    )
    .unwrap();

    assert_eq!(doc.set["title"], json!("mis images"));
    assert_eq!(doc.set["attachments.mis_images"].as_array().unwrap().len(), 2);
    assert_eq!(doc.set.len(), 2);
}

#[test]
fn nested_fields_pass_through_unflattened() {
    let (routing, zip) = gallery_tables();
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["000perro.jpg", "000gato.jpg"],
            "description": ["es un perro", "es un gato"],
            "title": "mis images",
            "address": {"street1": "a", "street2": "b"},
        })),
    )
    .unwrap();

    assert_eq!(doc.set["address"], json!({"street1": "a", "street2": "b"}));
    assert!(!doc.set.contains_key("address.street1"));
}

#[test]
fn zipping_truncates_to_shortest_input() {
    let (routing, zip) = gallery_tables();
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["000perro.jpg", "000gato.jpg"],
            "description": ["es un perro", "es un gato", "es un lagarto"],
            "title": "mis images",
        })),
    )
    .unwrap();

    assert_eq!(
        doc.set["attachments.mis_images"],
        json!([
            image_with_description("000perro.jpg", 0, "es un perro"),
            image_with_description("000gato.jpg", 1, "es un gato"),
        ])
    );
}

#[test]
fn empty_image_name_yields_empty_urls_in_zip() {
    let (routing, zip) = gallery_tables();
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["000perro.jpg", "000gato.jpg", ""],
            "description": ["es un perro", "es un gato", "es un lagarto"],
            "title": "mis images",
        })),
    )
    .unwrap();

    assert_eq!(
        doc.set["attachments.mis_images"][2],
        json!({
            "image_id": "",
            "order": 2,
            "url": "",
            "thumbnail_url": "",
            "description": "es un lagarto",
        })
    );
}

#[test]
fn unzipped_attachments_pass_through_next_to_zipped_ones() {
    let routing = RoutingTable::new()
        .route("images", ["images", "cover"])
        .route("description", ["description"]);
    let zip = ZipTable::new().zip("gallery", ["images", "description"]);
    let doc = process_zipped_attachments_and_body(
        &registry(),
        &routing,
        &zip,
        &body(json!({
            "images": ["a.jpg"],
            "cover": "c.jpg",
            "description": ["a"],
        })),
    )
    .unwrap();

    assert_eq!(doc.set["attachments.cover"], json!([image("c.jpg", 0)]));
    assert!(doc.set.contains_key("attachments.gallery"));
    assert!(!doc.set.contains_key("attachments.images"));
    assert!(!doc.set.contains_key("attachments.description"));
}

#[test]
fn registered_text_field_zips_with_images() {
    let registry = RegistryBuilder::with_defaults(UPLOADS)
        .register_text("caption")
        .build();
    let routing = RoutingTable::new()
        .route("images", ["images"])
        .route("caption", ["caption"]);
    let zip = ZipTable::new().zip("photos", ["images", "caption"]);

    let doc = process_zipped_attachments_and_body(
        &registry,
        &routing,
        &zip,
        &body(json!({"images": "a.jpg", "caption": "sunset"})),
    )
    .unwrap();

    assert_eq!(doc.set["attachments.photos"][0]["caption"], json!("sunset"));
    assert_eq!(doc.set["attachments.photos"][0]["order"], json!(0));
}
